/**
 * Authentication Routes
 * JWT-based registration and login gating the admin-only endpoints
 */
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::IntoResponse,
};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::User;
use crate::error::{AppError, is_unique_violation};
use crate::routes::{AppJson, created, ok, pool};

// ============================================================================
// Configuration
// ============================================================================

lazy_static::lazy_static! {
    /// JWT secret key from environment
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "default-jwt-secret-change-in-production".to_string());
}

/// Access token expiry in days
const TOKEN_EXPIRY_DAYS: i64 = 7;

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: Uuid,      // User ID
    pub email: String, // User email
    pub role: String,  // User role
    pub exp: i64,      // Expiry timestamp
    pub iat: i64,      // Issued at timestamp
}

/// User info returned to the frontend
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload placed in the success envelope for both register and login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: UserInfo,
    pub token: String,
}

// ============================================================================
// Token Helpers
// ============================================================================

/// Create access token
pub fn create_access_token(
    id: Uuid,
    email: &str,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::days(TOKEN_EXPIRY_DAYS);

    let claims = Claims {
        id,
        email: email.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Verify and decode access token
pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

// ============================================================================
// Extractor
// ============================================================================

/// Authenticated caller, extracted from `Authorization: Bearer <token>`.
///
/// Add this as a handler parameter to require a valid token (missing or
/// invalid tokens reject with 401 before the handler body runs). Role checks
/// happen via `require_admin()` inside the handler.
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    /// Returns `Ok(())` for admins, `Err(Forbidden)` for everyone else.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == "admin" {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = verify_access_token(token).map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_register(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register - Create a regular user account
///
/// Registration never produces admins; those are provisioned by operators
/// with the hash-password utility.
pub async fn register(
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register(&payload)?;

    let pool = pool()?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(&payload.email)
            .fetch_optional(pool.as_ref())
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // Hash password off the async executor; bcrypt is CPU-bound.
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, 'user')
        RETURNING id, name, email, password_hash, role, created_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.email)
    .bind(&password_hash)
    .fetch_one(pool.as_ref())
    .await
    .map_err(|e| {
        // Two concurrent registrations can slip past the existence check;
        // the unique index on email settles it.
        if is_unique_violation(&e) {
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    let token = create_access_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::Internal(format!("failed to create token: {}", e)))?;

    tracing::info!(email = %user.email, "user registered");

    Ok(created(AuthData {
        user: user.into(),
        token,
    }))
}

/// POST /api/auth/login - Verify credentials and return a token
pub async fn login(AppJson(payload): AppJson<LoginRequest>) -> Result<impl IntoResponse, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let pool = pool()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, role, created_at
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    // Verify password off the async executor; bcrypt is CPU-bound.
    let password = payload.password.clone();
    let hash_clone = user.password_hash.clone();
    let password_ok =
        tokio::task::spawn_blocking(move || verify(&password, &hash_clone).unwrap_or(false))
            .await
            .map_err(|e| AppError::Internal(format!("password verify task failed: {}", e)))?;
    if !password_ok {
        tracing::warn!(email = %user.email, "failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let token = create_access_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::Internal(format!("failed to create token: {}", e)))?;

    tracing::info!(email = %user.email, "successful login");

    Ok(ok(AuthData {
        user: user.into(),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::{get, post};
    use tower::ServiceExt;

    fn auth_router() -> Router {
        Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
    }

    async fn admin_only(user: AuthUser) -> Result<impl IntoResponse, AppError> {
        user.require_admin()?;
        Ok(ok("admin"))
    }

    fn gated_router() -> Router {
        Router::new().route("/gated", get(admin_only))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: &impl serde::Serialize,
    ) -> (StatusCode, axum::body::Bytes) {
        let body = Body::from(serde_json::to_vec(json).unwrap());
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    async fn get_with_auth(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
        let mut builder = Request::get(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {}", t));
        }
        let res = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        res.status()
    }

    #[test]
    fn test_token_round_trip_preserves_claims() {
        let id = Uuid::new_v4();
        let token = create_access_token(id, "editor@ledgerpen.com", "admin").unwrap();
        let claims = verify_access_token(&token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.email, "editor@ledgerpen.com");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expires_in_seven_days() {
        let token = create_access_token(Uuid::new_v4(), "a@b.c", "user").unwrap();
        let claims = verify_access_token(&token).unwrap();
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_verify_access_token_invalid_returns_err() {
        assert!(verify_access_token("invalid.jwt.token").is_err());
    }

    #[test]
    fn test_verify_rejects_token_signed_with_other_secret() {
        let claims = Claims {
            id: Uuid::new_v4(),
            email: "a@b.c".to_string(),
            role: "admin".to_string(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let forged = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();
        assert!(verify_access_token(&forged).is_err());
    }

    #[tokio::test]
    async fn test_register_missing_name_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(),
            "/api/auth/register",
            &RegisterRequest {
                name: "".to_string(),
                email: "a@b.c".to_string(),
                password: "longenough".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_invalid_email_returns_bad_request() {
        let (status, bytes) = post_json(
            auth_router(),
            "/api/auth/register",
            &RegisterRequest {
                name: "Jo".to_string(),
                email: "no-at-sign".to_string(),
                password: "longenough".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_register_short_password_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(),
            "/api/auth/register",
            &RegisterRequest {
                name: "Jo".to_string(),
                email: "a@b.c".to_string(),
                password: "short".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_without_database_returns_unavailable() {
        let (status, _) = post_json(
            auth_router(),
            "/api/auth/register",
            &RegisterRequest {
                name: "Jo".to_string(),
                email: "a@b.c".to_string(),
                password: "longenough".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(),
            "/api/auth/login",
            &LoginRequest {
                email: "".to_string(),
                password: "password123".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_gated_route_without_token_returns_unauthorized() {
        let status = get_with_auth(gated_router(), "/gated", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_gated_route_with_garbage_token_returns_unauthorized() {
        let status = get_with_auth(gated_router(), "/gated", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_gated_route_with_user_token_returns_forbidden() {
        let token = create_access_token(Uuid::new_v4(), "user@b.c", "user").unwrap();
        let status = get_with_auth(gated_router(), "/gated", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_gated_route_with_admin_token_succeeds() {
        let token = create_access_token(Uuid::new_v4(), "admin@b.c", "admin").unwrap();
        let status = get_with_auth(gated_router(), "/gated", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

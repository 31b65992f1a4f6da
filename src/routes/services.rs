/**
 * Service Routes
 * CRUD for the agency's service offerings, keyed by slug
 */
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::models::Service;
use crate::error::{AppError, is_unique_violation};
use crate::routes::{AppJson, auth::AuthUser, clamp_limit, created, ok, pool};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServiceListQuery {
    pub limit: Option<i64>,
}

/// Request body for POST /api/services (create). `id` is the slug the
/// frontend routes on.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub full_description: Option<String>,
    pub benefits: Option<Vec<String>>,
    pub process_steps: Option<Vec<String>>,
    pub image_src: Option<String>,
}

/// Request body for PUT/PATCH /api/services/{id} (update). The slug itself
/// is immutable.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub full_description: Option<String>,
    pub benefits: Option<Vec<String>>,
    pub process_steps: Option<Vec<String>>,
    pub image_src: Option<String>,
}

/// Wire shape of a service. The slug goes out as `id`; the surrogate UUID
/// stays internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub full_description: Option<String>,
    pub benefits: Vec<String>,
    pub process_steps: Vec<String>,
    pub image_src: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        ServiceResponse {
            id: s.slug,
            title: s.title,
            description: s.description,
            icon: s.icon,
            full_description: s.full_description,
            benefits: s.benefits,
            process_steps: s.process_steps,
            image_src: s.image_src,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

fn validate_create(payload: &CreateServiceRequest) -> Result<(), AppError> {
    if !is_valid_slug(&payload.id) {
        return Err(AppError::Validation(
            "Service id must contain only lowercase letters, numbers, and hyphens".to_string(),
        ));
    }
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required".to_string()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/services - List services, newest first
pub async fn list_services(
    Query(query): Query<ServiceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;
    let limit = clamp_limit(query.limit, 100);

    let services = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, slug, title, description, icon, full_description,
               benefits, process_steps, image_src, created_at, updated_at
        FROM services
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool.as_ref())
    .await?;

    let services: Vec<ServiceResponse> = services.into_iter().map(Into::into).collect();
    Ok(ok(services))
}

/// GET /api/services/{id} - Fetch a single service by slug
pub async fn get_service(Path(slug): Path<String>) -> Result<impl IntoResponse, AppError> {
    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(
            "Service id must contain only lowercase letters, numbers, and hyphens".to_string(),
        ));
    }

    let pool = pool()?;

    let service = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, slug, title, description, icon, full_description,
               benefits, process_steps, image_src, created_at, updated_at
        FROM services
        WHERE slug = $1
        "#,
    )
    .bind(&slug)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    Ok(ok(ServiceResponse::from(service)))
}

/// POST /api/services - Create a service (admin)
pub async fn create_service(
    user: AuthUser,
    AppJson(payload): AppJson<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    validate_create(&payload)?;

    let pool = pool()?;

    let service = sqlx::query_as::<_, Service>(
        r#"
        INSERT INTO services (slug, title, description, icon, full_description,
                              benefits, process_steps, image_src)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, slug, title, description, icon, full_description,
                  benefits, process_steps, image_src, created_at, updated_at
        "#,
    )
    .bind(&payload.id)
    .bind(payload.title.trim())
    .bind(payload.description.trim())
    .bind(&payload.icon)
    .bind(&payload.full_description)
    .bind(payload.benefits.unwrap_or_default())
    .bind(payload.process_steps.unwrap_or_default())
    .bind(&payload.image_src)
    .fetch_one(pool.as_ref())
    .await
    .map_err(|e| {
        // The frontend treats a duplicate slug as a form error, so this is a
        // 400 rather than a 409.
        if is_unique_violation(&e) {
            AppError::Validation("Service with this id already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    Ok(created(ServiceResponse::from(service)))
}

/// PUT/PATCH /api/services/{id} - Partial update by slug (admin)
pub async fn update_service(
    user: AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(
            "Service id must contain only lowercase letters, numbers, and hyphens".to_string(),
        ));
    }

    let pool = pool()?;

    let existing = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, slug, title, description, icon, full_description,
               benefits, process_steps, image_src, created_at, updated_at
        FROM services
        WHERE slug = $1
        "#,
    )
    .bind(&slug)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let title = payload.title.unwrap_or(existing.title);
    let description = payload.description.unwrap_or(existing.description);
    let icon = payload.icon.or(existing.icon);
    let full_description = payload.full_description.or(existing.full_description);
    let benefits = payload.benefits.unwrap_or(existing.benefits);
    let process_steps = payload.process_steps.unwrap_or(existing.process_steps);
    let image_src = payload.image_src.or(existing.image_src);

    let service = sqlx::query_as::<_, Service>(
        r#"
        UPDATE services
        SET title = $1, description = $2, icon = $3, full_description = $4,
            benefits = $5, process_steps = $6, image_src = $7, updated_at = now()
        WHERE slug = $8
        RETURNING id, slug, title, description, icon, full_description,
                  benefits, process_steps, image_src, created_at, updated_at
        "#,
    )
    .bind(&title)
    .bind(&description)
    .bind(&icon)
    .bind(&full_description)
    .bind(&benefits)
    .bind(&process_steps)
    .bind(&image_src)
    .bind(&slug)
    .fetch_one(pool.as_ref())
    .await?;

    Ok(ok(ServiceResponse::from(service)))
}

/// DELETE /api/services/{id} - Hard delete by slug (admin)
pub async fn delete_service(
    user: AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(
            "Service id must contain only lowercase letters, numbers, and hyphens".to_string(),
        ));
    }

    let pool = pool()?;

    let result = sqlx::query("DELETE FROM services WHERE slug = $1")
        .bind(&slug)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Service not found".to_string()));
    }

    Ok(ok(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::auth::create_access_token;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn service_router() -> Router {
        Router::new()
            .route("/api/services", get(list_services).post(create_service))
            .route(
                "/api/services/{id}",
                get(get_service)
                    .put(update_service)
                    .delete(delete_service),
            )
    }

    fn admin_token() -> String {
        create_access_token(Uuid::new_v4(), "admin@ledgerpen.com", "admin").unwrap()
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        json: Option<serde_json::Value>,
    ) -> (StatusCode, axum::body::Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {}", t));
        }
        let body = match json {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("content-strategy"));
        assert!(is_valid_slug("seo"));
        assert!(is_valid_slug("brand-design-2"));
        assert!(!is_valid_slug("Content-Strategy"));
        assert!(!is_valid_slug("email marketing"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug(""));
    }

    #[tokio::test]
    async fn test_create_invalid_slug_returns_bad_request() {
        let (status, bytes) = send(
            service_router(),
            "POST",
            "/api/services",
            Some(&admin_token()),
            Some(serde_json::json!({
                "id": "Not A Slug",
                "title": "Content Strategy",
                "description": "Editorial planning for financial brands"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_create_missing_title_returns_bad_request() {
        let (status, _) = send(
            service_router(),
            "POST",
            "/api/services",
            Some(&admin_token()),
            Some(serde_json::json!({
                "id": "content-strategy",
                "title": "  ",
                "description": "Editorial planning"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_without_token_returns_unauthorized() {
        let (status, _) = send(
            service_router(),
            "POST",
            "/api/services",
            None,
            Some(serde_json::json!({
                "id": "content-strategy",
                "title": "Content Strategy",
                "description": "Editorial planning"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_with_invalid_slug_returns_bad_request() {
        let (status, _) = send(
            service_router(),
            "GET",
            "/api/services/NOT_A_SLUG",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_without_database_returns_unavailable() {
        let (status, _) = send(
            service_router(),
            "GET",
            "/api/services/content-strategy",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_duplicate_slug_maps_to_validation_error() {
        // Non-unique sqlx errors stay as Database errors.
        let err = sqlx::Error::PoolClosed;
        assert!(!is_unique_violation(&err));
    }
}

/**
 * Testimonial Routes
 * CRUD for client quotes; deletes only deactivate
 */
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::Testimonial;
use crate::error::AppError;
use crate::routes::{AppJson, auth::AuthUser, clamp_limit, created, ok, pool};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TestimonialListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestimonialRequest {
    pub content: String,
    pub client_name: String,
    pub client_position: Option<String>,
    pub client_company: Option<String>,
    pub rating: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, serde::Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonialRequest {
    pub content: Option<String>,
    pub client_name: Option<String>,
    pub client_position: Option<String>,
    pub client_company: Option<String>,
    pub rating: Option<i32>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_rating(rating: i32) -> Result<(), AppError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/testimonials - List active testimonials, newest first
///
/// Soft-deleted rows stay in the table but never reach the public site.
pub async fn list_testimonials(
    Query(query): Query<TestimonialListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;
    let limit = clamp_limit(query.limit, 100);

    let testimonials = sqlx::query_as::<_, Testimonial>(
        r#"
        SELECT id, content, client_name, client_position, client_company,
               rating, is_active, image_url, created_at, updated_at
        FROM testimonials
        WHERE is_active = true
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(ok(testimonials))
}

/// POST /api/testimonials - Create a testimonial (admin)
pub async fn create_testimonial(
    user: AuthUser,
    AppJson(payload): AppJson<CreateTestimonialRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    if payload.client_name.trim().is_empty() {
        return Err(AppError::Validation("Client name is required".to_string()));
    }
    let rating = payload.rating.unwrap_or(5);
    validate_rating(rating)?;

    let pool = pool()?;

    let testimonial = sqlx::query_as::<_, Testimonial>(
        r#"
        INSERT INTO testimonials (content, client_name, client_position,
                                  client_company, rating, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, content, client_name, client_position, client_company,
                  rating, is_active, image_url, created_at, updated_at
        "#,
    )
    .bind(payload.content.trim())
    .bind(payload.client_name.trim())
    .bind(&payload.client_position)
    .bind(&payload.client_company)
    .bind(rating)
    .bind(&payload.image_url)
    .fetch_one(pool.as_ref())
    .await?;

    Ok(created(testimonial))
}

/// PUT/PATCH /api/testimonials/{id} - Partial update (admin)
///
/// `isActive` can be flipped here to restore a soft-deleted testimonial.
pub async fn update_testimonial(
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTestimonialRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid id".to_string()))?;

    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
    }

    let pool = pool()?;

    let existing = sqlx::query_as::<_, Testimonial>(
        r#"
        SELECT id, content, client_name, client_position, client_company,
               rating, is_active, image_url, created_at, updated_at
        FROM testimonials
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("Testimonial not found".to_string()))?;

    let content = payload.content.unwrap_or(existing.content);
    let client_name = payload.client_name.unwrap_or(existing.client_name);
    let client_position = payload.client_position.or(existing.client_position);
    let client_company = payload.client_company.or(existing.client_company);
    let rating = payload.rating.unwrap_or(existing.rating);
    let is_active = payload.is_active.unwrap_or(existing.is_active);
    let image_url = payload.image_url.or(existing.image_url);

    let testimonial = sqlx::query_as::<_, Testimonial>(
        r#"
        UPDATE testimonials
        SET content = $1, client_name = $2, client_position = $3,
            client_company = $4, rating = $5, is_active = $6, image_url = $7,
            updated_at = now()
        WHERE id = $8
        RETURNING id, content, client_name, client_position, client_company,
                  rating, is_active, image_url, created_at, updated_at
        "#,
    )
    .bind(&content)
    .bind(&client_name)
    .bind(&client_position)
    .bind(&client_company)
    .bind(rating)
    .bind(is_active)
    .bind(&image_url)
    .bind(id)
    .fetch_one(pool.as_ref())
    .await?;

    Ok(ok(testimonial))
}

/// DELETE /api/testimonials/{id} - Soft delete (admin)
pub async fn delete_testimonial(
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid id".to_string()))?;

    let pool = pool()?;

    let result = sqlx::query(
        r#"
        UPDATE testimonials
        SET is_active = false, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool.as_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Testimonial not found".to_string()));
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

    fn testimonial_router() -> Router {
        Router::new()
            .route(
                "/api/testimonials",
                get(list_testimonials).post(create_testimonial),
            )
            .route(
                "/api/testimonials/{id}",
                axum::routing::put(update_testimonial).delete(delete_testimonial),
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
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-2).is_err());
    }

    #[tokio::test]
    async fn test_create_rating_out_of_range_returns_bad_request() {
        let (status, bytes) = send(
            testimonial_router(),
            "POST",
            "/api/testimonials",
            Some(&admin_token()),
            Some(serde_json::json!({
                "content": "They doubled our newsletter open rate.",
                "clientName": "Priya N.",
                "rating": 9
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_create_missing_content_returns_bad_request() {
        let (status, _) = send(
            testimonial_router(),
            "POST",
            "/api/testimonials",
            Some(&admin_token()),
            Some(serde_json::json!({ "content": " ", "clientName": "Priya N." })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_without_token_returns_unauthorized() {
        let (status, _) = send(
            testimonial_router(),
            "POST",
            "/api/testimonials",
            None,
            Some(serde_json::json!({
                "content": "Great team.",
                "clientName": "Priya N."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_malformed_id_returns_bad_request() {
        let (status, _) = send(
            testimonial_router(),
            "DELETE",
            "/api/testimonials/42",
            Some(&admin_token()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_without_database_returns_unavailable() {
        let (status, _) = send(testimonial_router(), "GET", "/api/testimonials", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

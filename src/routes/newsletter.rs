/**
 * Newsletter Routes
 * Public signup for the mailing list
 */
use axum::response::IntoResponse;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::NewsletterSubscriber;
use crate::error::AppError;
use crate::routes::{AppJson, created, pool};

#[derive(Debug, Deserialize, serde::Serialize)]
pub struct SubscribeRequest {
    pub email: String,
}

lazy_static::lazy_static! {
    /// Light syntactic check; deliverability is the email provider's problem.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// POST /api/newsletter - Subscribe an email address
///
/// Duplicates are caught by an existence check rather than a unique index,
/// so a resubscribe comes back as a 409 instead of a store error.
pub async fn subscribe(
    AppJson(payload): AppJson<SubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    let pool = pool()?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM newsletter_subscribers WHERE LOWER(email) = LOWER($1)")
            .bind(&email)
            .fetch_optional(pool.as_ref())
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email is already subscribed".to_string()));
    }

    let subscriber = sqlx::query_as::<_, NewsletterSubscriber>(
        r#"
        INSERT INTO newsletter_subscribers (email)
        VALUES ($1)
        RETURNING id, email, subscribed_at
        "#,
    )
    .bind(&email)
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!(email = %subscriber.email, "newsletter subscription");

    Ok(created(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use tower::ServiceExt;

    fn newsletter_router() -> Router {
        Router::new().route("/api/newsletter", post(subscribe))
    }

    async fn post_json(app: Router, json: serde_json::Value) -> (StatusCode, axum::body::Bytes) {
        let req = Request::post("/api/newsletter")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn test_subscribe_invalid_email_returns_bad_request() {
        let (status, bytes) = post_json(
            newsletter_router(),
            serde_json::json!({ "email": "not-an-email" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_subscribe_trims_surrounding_whitespace() {
        // Trimmed address is syntactically valid, so the handler proceeds to
        // the pool lookup and reports the missing database.
        let (status, _) = post_json(
            newsletter_router(),
            serde_json::json!({ "email": "  reader@example.com  " }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_subscribe_without_database_returns_unavailable() {
        let (status, _) = post_json(
            newsletter_router(),
            serde_json::json!({ "email": "reader@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_subscribe_malformed_body_returns_bad_request() {
        let req = Request::post("/api/newsletter")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = newsletter_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

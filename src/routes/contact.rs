/**
 * Contact Routes
 * Public contact-form submissions plus admin review
 */
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::Contact;
use crate::email;
use crate::error::AppError;
use crate::routes::{AppJson, auth::AuthUser, clamp_limit, created, ok, pool};

// ============================================================================
// Request/Response Types
// ============================================================================

/// The service names offered on the marketing site's contact form. The
/// dropdown and this list must stay in sync.
pub const SERVICE_OPTIONS: &[&str] = &[
    "Content Strategy",
    "Financial Copywriting",
    "Video Production",
    "Social Media Marketing",
    "Email Marketing",
    "SEO & Analytics",
    "Brand Design",
    "Webinars & Events",
];

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub service_of_interest: String,
    pub message: String,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_submission(payload: &CreateContactRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if !SERVICE_OPTIONS.contains(&payload.service_of_interest.as_str()) {
        return Err(AppError::Validation(format!(
            "Service of interest must be one of: {}",
            SERVICE_OPTIONS.join(", ")
        )));
    }
    if payload.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/contactus - Record a submission and notify the team
pub async fn create_contact(
    AppJson(payload): AppJson<CreateContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submission(&payload)?;

    let pool = pool()?;

    let contact = sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (name, email, company_name, service_of_interest, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, company_name, service_of_interest, message, created_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(&payload.company_name)
    .bind(&payload.service_of_interest)
    .bind(payload.message.trim())
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!(contact_id = %contact.id, service = %contact.service_of_interest, "contact submission received");

    // Notify on a detached task; the response never waits on the email API.
    tokio::spawn(email::notify_contact(contact.clone()));

    Ok(created(contact))
}

/// GET /api/contactus - List submissions, newest first (admin)
pub async fn list_contacts(
    user: AuthUser,
    Query(query): Query<ContactListQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let pool = pool()?;
    let limit = clamp_limit(query.limit, 100);

    let contacts = sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, name, email, company_name, service_of_interest, message, created_at
        FROM contacts
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(ok(contacts))
}

/// DELETE /api/contactus/{id} - Remove a handled submission (admin)
pub async fn delete_contact(
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid id".to_string()))?;

    let pool = pool()?;

    let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Contact submission not found".to_string(),
        ));
    }

    Ok(ok(serde_json::Value::Null))
}

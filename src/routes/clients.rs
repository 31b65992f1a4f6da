/**
 * Client Routes
 * CRUD for the client logos shown on the marketing pages
 */
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::Client;
use crate::error::AppError;
use crate::routes::{AppJson, auth::AuthUser, clamp_limit, created, ok, pool};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub logo: String,
}

#[derive(Debug, Deserialize, serde::Serialize, Default)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub logo: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/clients - List clients, newest first
pub async fn list_clients(
    Query(query): Query<ClientListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;
    let limit = clamp_limit(query.limit, 100);

    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, logo_url, created_at, updated_at
        FROM clients
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(ok(clients))
}

/// POST /api/clients - Create a client (admin)
pub async fn create_client(
    user: AuthUser,
    AppJson(payload): AppJson<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if payload.logo.trim().is_empty() {
        return Err(AppError::Validation("Logo is required".to_string()));
    }

    let pool = pool()?;

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (name, logo_url)
        VALUES ($1, $2)
        RETURNING id, name, logo_url, created_at, updated_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.logo.trim())
    .fetch_one(pool.as_ref())
    .await?;

    Ok(created(client))
}

/// PUT/PATCH /api/clients/{id} - Partial update (admin)
pub async fn update_client(
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid id".to_string()))?;

    let pool = pool()?;

    let existing = sqlx::query_as::<_, Client>(
        "SELECT id, name, logo_url, created_at, updated_at FROM clients WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let name = payload.name.unwrap_or(existing.name);
    let logo_url = payload.logo.unwrap_or(existing.logo_url);

    let client = sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients
        SET name = $1, logo_url = $2, updated_at = now()
        WHERE id = $3
        RETURNING id, name, logo_url, created_at, updated_at
        "#,
    )
    .bind(&name)
    .bind(&logo_url)
    .bind(id)
    .fetch_one(pool.as_ref())
    .await?;

    Ok(ok(client))
}

/// DELETE /api/clients/{id} - Hard delete (admin)
pub async fn delete_client(
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid id".to_string()))?;

    let pool = pool()?;

    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Client not found".to_string()));
    }

    Ok(ok(serde_json::Value::Null))
}

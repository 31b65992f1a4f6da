/**
 * Routes Module
 * API route handlers
 */

pub mod auth;
pub mod clients;
pub mod contact;
pub mod health;
pub mod newsletter;
pub mod portfolio;
pub mod services;
pub mod testimonials;

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;

/// Envelope wrapping every 2xx payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

/// 200 with the success envelope.
pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::OK,
        Json(ApiResponse {
            status: "success",
            data,
        }),
    )
}

/// 201 with the success envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            status: "success",
            data,
        }),
    )
}

/// The shared pool, or 503 when the server is running without a database.
pub fn pool() -> Result<Arc<PgPool>, AppError> {
    db::get_pool().ok_or(AppError::DbUnavailable)
}

/// Clamp a client-supplied `limit` to something sane.
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, 100)
}

/// A `Json<T>` wrapper that converts body rejections into
/// `AppError::Validation`, so malformed JSON gets the fail envelope instead
/// of axum's plain-text 400.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(AppJson(value))
    }
}

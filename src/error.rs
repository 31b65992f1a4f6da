//! Application error type shared by every route handler.
//!
//! Operational errors (bad input, missing records, auth failures) carry a
//! client-safe message and a `"fail"` envelope. Unexpected errors become a
//! `"error"` envelope whose body only includes detail outside production;
//! the full detail always goes to the error log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// JSON body returned by all endpoints on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// `"fail"` for 4xx responses, `"error"` for 5xx ones.
    pub status: &'static str,
    pub message: String,
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Authentication required")]
    TokenMissing,
    #[error("Invalid or expired token")]
    TokenInvalid,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Admin access required")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Database not available")]
    DbUnavailable,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TokenMissing | AppError::TokenInvalid | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Operational errors are expected outcomes whose message is safe to
    /// show a client verbatim.
    pub fn is_operational(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// The message placed in the response body. Unexpected errors leak their
    /// detail only outside production.
    fn client_message(&self, production: bool) -> String {
        if self.is_operational() || !production {
            self.to_string()
        } else {
            "Something went wrong".to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.is_operational() {
            tracing::error!(error = %self, "unexpected error");
        }

        let status = self.status_code();
        let body = ErrorBody {
            status: if status.is_server_error() {
                "error"
            } else {
                "fail"
            },
            message: self.client_message(is_production()),
        };

        (status, Json(body)).into_response()
    }
}

pub fn is_production() -> bool {
    std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production")
}

/// True when a sqlx error is a Postgres unique-index violation (23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operational_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::TokenMissing.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::DbUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn unexpected_errors_are_not_operational() {
        assert!(!AppError::Internal("boom".into()).is_operational());
        assert!(!AppError::Database(sqlx::Error::PoolClosed).is_operational());
        assert!(AppError::Validation("x".into()).is_operational());
        assert!(AppError::DbUnavailable.is_operational());
    }

    #[test]
    fn internal_detail_is_hidden_in_production() {
        let err = AppError::Internal("secret detail".into());
        assert_eq!(err.client_message(true), "Something went wrong");
        assert_eq!(err.client_message(false), "secret detail");
    }

    #[test]
    fn operational_detail_survives_production() {
        let err = AppError::Validation("name is required".into());
        assert_eq!(err.client_message(true), "name is required");
    }

    #[test]
    fn error_body_serializes_with_status_word() {
        let body = ErrorBody {
            status: "fail",
            message: "nope".into(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"status":"fail","message":"nope"}"#);
    }
}

//! HTTP error mapping.
//!
//! Handlers return [`AppError`]; the [`IntoResponse`] impl turns every
//! variant into a `{ "error": ..., "code": ... }` JSON body with the
//! matching status code. Internal details (database messages, stored-data
//! corruption) are logged and replaced with a generic message before they
//! leave the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use stockroom_core::error::CoreError;

/// Error type shared by all HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain error from `stockroom_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request (bad upload, empty scan code).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else that should surface as a 500.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Wire shape of every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const GENERIC_INTERNAL: &str = "An internal error occurred";

impl AppError {
    /// Status code, machine-readable code, and user-facing message for
    /// this error. Messages for 5xx responses are genericized; the real
    /// cause is logged by `into_response`.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} '{id}' not found"),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Core(CoreError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            AppError::Core(CoreError::Internal(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                GENERIC_INTERNAL.to_string(),
            ),
            AppError::Database(err) => db_error_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                GENERIC_INTERNAL.to_string(),
            ),
        }
    }
}

/// Map a sqlx error onto the response taxonomy.
///
/// `RowNotFound` is a 404. A Postgres unique violation (code 23505) on
/// one of our `uq_` indexes -- in practice the scan-token index -- is a
/// 409, since it means two writers raced to bind the same identity.
fn db_error_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        GENERIC_INTERNAL.to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: message,
            code,
        };
        (status, axum::Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

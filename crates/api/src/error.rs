use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use resizer_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `resizer_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A resource addressed by something other than an id (e.g. a file path).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
        CoreError::Unauthorized(msg) => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::UnsupportedFormat(msg) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_FORMAT",
            format!("Unsupported image format: {msg}"),
        ),
        CoreError::Io { .. }
        | CoreError::Decode(_)
        | CoreError::Encode(_)
        | CoreError::Internal(_) => {
            tracing::error!(error = %err, "Internal core error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` and foreign-key violations map to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        _ if resizer_db::is_foreign_key_violation(err) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Referenced resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Envelope every error response is serialized into.
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Category with id 7 not found"
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Numeric code from [`ErrorCode::code`]
    pub code: i32,
    /// Identifier from [`ErrorCode::as_str`] for programmatic handling
    pub error: String,
    /// Human-readable description
    pub message: String,
    /// Structured extras, e.g. per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The error type handlers bubble up to the HTTP layer.
///
/// Domain crates convert their own error enums into this one; the
/// `IntoResponse` impl picks the status, logs with the numeric code,
/// and serializes the shared envelope.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

type ResponseParts = (StatusCode, String, Option<serde_json::Value>, ErrorCode);

/// Parts for responses that use the code's stock message and no details.
fn canned(status: StatusCode, code: ErrorCode) -> ResponseParts {
    (status, code.default_message().to_string(), None, code)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details, code) = match self {
            AppError::SerdeJson(e) => {
                tracing::error!(
                    error_code = ErrorCode::SerdeJsonError.code(),
                    "JSON parsing error: {e:?}"
                );
                canned(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::SerdeJsonError)
            }
            AppError::Database(e) => map_db_error(&e),
            AppError::Io(e) => {
                tracing::error!(error_code = ErrorCode::IoError.code(), "I/O error: {e:?}");
                canned(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::IoError)
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {e:?}"
                );
                (e.status(), e.body_text(), None, ErrorCode::JsonExtraction)
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {e:?}"
                );
                let details = serde_json::to_value(&e).unwrap_or(serde_json::json!(null));
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError.default_message().to_string(),
                    Some(details),
                    ErrorCode::ValidationError,
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {msg}");
                (StatusCode::BAD_REQUEST, msg, None, ErrorCode::BadRequest)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {msg}");
                (StatusCode::NOT_FOUND, msg, None, ErrorCode::NotFound)
            }
            AppError::Conflict(msg) => {
                tracing::info!(error_code = ErrorCode::Conflict.code(), "Conflict: {msg}");
                (StatusCode::CONFLICT, msg, None, ErrorCode::Conflict)
            }
            AppError::UnprocessableEntity(msg) => {
                tracing::info!(
                    error_code = ErrorCode::UnprocessableEntity.code(),
                    "Unprocessable entity: {msg}"
                );
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    msg,
                    None,
                    ErrorCode::UnprocessableEntity,
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {msg}"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    msg,
                    None,
                    ErrorCode::InternalError,
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(
                    error_code = ErrorCode::ServiceUnavailable.code(),
                    "Service unavailable: {msg}"
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    msg,
                    None,
                    ErrorCode::ServiceUnavailable,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Maps `DbErr` to response parts without leaking driver detail.
///
/// Connection-level failures surface as 503 so load balancers can react;
/// everything else is a 500 with a stock message. Raw database errors
/// never reach the client.
fn map_db_error(error: &DbErr) -> ResponseParts {
    match error {
        DbErr::RecordNotFound(msg) => {
            tracing::info!(
                error_code = ErrorCode::DatabaseNotFound.code(),
                "Database record not found: {msg}"
            );
            canned(StatusCode::NOT_FOUND, ErrorCode::DatabaseNotFound)
        }
        DbErr::ConnectionAcquire(e) => {
            tracing::warn!(
                error_code = ErrorCode::DatabaseTimeout.code(),
                "Database connection acquire failed: {e:?}"
            );
            canned(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::DatabaseTimeout)
        }
        DbErr::Conn(e) => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database connection error: {e:?}"
            );
            canned(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::DatabaseError)
        }
        DbErr::Migration(e) => {
            tracing::error!(
                error_code = ErrorCode::MigrationError.code(),
                "Database migration error: {e:?}"
            );
            canned(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::MigrationError)
        }
        _ => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database error: {error:?}"
            );
            canned(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Category with id 7 not found".to_string());
        assert_eq!(err.to_string(), "Not Found: Category with id 7 not found");
    }

    #[tokio::test]
    async fn test_conflict_response_shape() {
        use http_body_util::BodyExt;

        let response = AppError::Conflict("Name already taken".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 1008);
        assert_eq!(body["error"], "CONFLICT");
        assert_eq!(body["message"], "Name already taken");
    }

    #[tokio::test]
    async fn test_db_error_is_sanitized() {
        use http_body_util::BodyExt;

        let err = AppError::Database(DbErr::Custom("password=hunter2 leaked".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Database error occurred");
    }
}

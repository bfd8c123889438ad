//! Error codes shared by every API error envelope.
//!
//! One enum carries all three representations of a code:
//! - the SCREAMING_SNAKE_CASE identifier clients branch on
//! - the integer that shows up in structured logs and monitoring
//! - a fallback message for handlers with nothing more specific to say

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Everything that can go wrong at the API boundary, with stable codes.
///
/// Integer ranges group the codes: 1xxx client, 2xxx database, 3xxx
/// migration, 4xxx I/O, 5xxx serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Payload failed validation
    ValidationError,

    /// Request body could not be parsed as JSON
    JsonExtraction,

    /// Requested resource does not exist
    NotFound,

    /// Unexpected server-side failure
    InternalError,

    /// Request collides with current resource state, e.g. a duplicate name
    Conflict,

    /// Payload parsed but cannot be acted on
    UnprocessableEntity,

    /// Malformed or inconsistent request parameters
    BadRequest,

    /// Backing service cannot be reached right now
    ServiceUnavailable,

    /// Database lookup matched nothing
    DatabaseNotFound,

    /// Database connection or query failure
    DatabaseError,

    /// Connection pool checkout timed out
    DatabaseTimeout,

    /// Schema migration failed
    MigrationError,

    /// File system I/O failure
    IoError,

    /// JSON serialization or deserialization failure
    SerdeJsonError,
}

impl ErrorCode {
    /// Client-facing identifier, also used as the `error` envelope field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Conflict => "CONFLICT",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::BadRequest => "BAD_REQUEST",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseTimeout => "DATABASE_TIMEOUT",
            Self::MigrationError => "MIGRATION_ERROR",
            Self::IoError => "IO_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Numeric code for logs and monitoring.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Conflict => 1008,
            Self::UnprocessableEntity => 1009,
            Self::BadRequest => 1010,
            Self::ServiceUnavailable => 1011,
            Self::DatabaseNotFound => 2001,
            Self::DatabaseError => 2003,
            Self::DatabaseTimeout => 2013,
            Self::MigrationError => 3001,
            Self::IoError => 4001,
            Self::SerdeJsonError => 5001,
        }
    }

    /// Message used when the handler does not supply its own.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::Conflict => "Resource already exists",
            Self::UnprocessableEntity => "Request cannot be processed",
            Self::BadRequest => "Invalid request",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseNotFound => "Database record not found",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseTimeout => "Database connection pool timed out",
            Self::MigrationError => "Database migration failed",
            Self::IoError => "I/O error occurred",
            Self::SerdeJsonError => "JSON serialization error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_and_display_agree() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::ValidationError.to_string(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::DatabaseTimeout.as_str(), "DATABASE_TIMEOUT");
    }

    #[test]
    fn test_codes_sit_in_their_ranges() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::Conflict.code(), 1008);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
        assert_eq!(ErrorCode::MigrationError.code(), 3001);
        assert_eq!(ErrorCode::SerdeJsonError.code(), 5001);
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(ErrorCode::NotFound.default_message(), "Resource not found");
        assert_eq!(
            ErrorCode::Conflict.default_message(),
            "Resource already exists"
        );
    }

    #[test]
    fn test_serializes_as_the_identifier() {
        let json = serde_json::to_string(&ErrorCode::Conflict).unwrap();
        assert_eq!(json, "\"CONFLICT\"");

        let code: ErrorCode = serde_json::from_str("\"VALIDATION_ERROR\"").unwrap();
        assert_eq!(code, ErrorCode::ValidationError);
    }
}

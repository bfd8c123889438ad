use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur in the catalog domain
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed request parameter (paging values, blank name input)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Payload failed validation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Path id and payload id disagree on an update
    #[error("Path id {path_id} does not match payload id {payload_id}")]
    IdMismatch { path_id: i32, payload_id: i32 },

    /// Category not found
    #[error("Category {0} not found")]
    CategoryNotFound(i32),

    /// Product not found
    #[error("Product {0} not found")]
    ProductNotFound(i32),

    /// Another row already uses this name
    #[error("Name '{0}' is already taken")]
    DuplicateName(String),

    /// Update lost the optimistic-concurrency race
    #[error("Concurrent modification of id {id}: version {expected_version} is stale")]
    ConcurrentModification { id: i32, expected_version: i32 },

    /// Write references a category that does not exist
    #[error("Category {0} does not exist")]
    CategoryMissing(i32),

    /// Category is still referenced by products
    #[error("Category {id} cannot be deleted: {product_count} products reference it")]
    CategoryInUse { id: i32, product_count: u64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidArgument(msg) => AppError::BadRequest(msg),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::IdMismatch { .. } => AppError::BadRequest(err.to_string()),
            CatalogError::CategoryNotFound(_) | CatalogError::ProductNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::DuplicateName(_)
            | CatalogError::ConcurrentModification { .. }
            | CatalogError::CategoryInUse { .. } => AppError::Conflict(err.to_string()),
            CatalogError::CategoryMissing(_) => AppError::UnprocessableEntity(err.to_string()),
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        // Convert to AppError for standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: CatalogError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(
            status_of(CatalogError::InvalidArgument("page must be positive".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CatalogError::IdMismatch {
                path_id: 1,
                payload_id: 2
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_entities_map_to_404() {
        assert_eq!(
            status_of(CatalogError::CategoryNotFound(999)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CatalogError::ProductNotFound(999)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflicts_map_to_409() {
        assert_eq!(
            status_of(CatalogError::DuplicateName("Beverages".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CatalogError::ConcurrentModification {
                id: 1,
                expected_version: 3
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CatalogError::CategoryInUse {
                id: 1,
                product_count: 4
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_broken_reference_maps_to_422() {
        assert_eq!(
            status_of(CatalogError::CategoryMissing(7)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

//! Request-body extraction that fails fast on invalid payloads.

use crate::errors::{ErrorCode, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Json<T>` that also runs `T`'s [`Validate`] rules before the handler
/// sees the value.
///
/// Deserialization failures keep axum's own rejection; validation failures
/// answer 400 with the standard envelope and per-field details.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateCategory {
///     #[validate(length(min = 1, max = 255))]
///     name: String,
/// }
///
/// async fn create_category(ValidatedJson(payload): ValidatedJson<CreateCategory>) -> String {
///     format!("Creating category: {}", payload.name)
/// }
///
/// let app = Router::new().route("/categories", post(create_category));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if let Err(errors) = data.validate() {
            return Err(validation_failure(&errors));
        }

        Ok(ValidatedJson(data))
    }
}

/// 400 carrying the shared envelope with the validator output per field.
fn validation_failure(errors: &validator::ValidationErrors) -> Response {
    let mut details = serde_json::Map::new();
    for (field, issues) in errors.field_errors() {
        let entries: Vec<serde_json::Value> = issues
            .iter()
            .map(|issue| {
                serde_json::json!({
                    "code": issue.code,
                    "message": issue.message,
                    "params": issue.params,
                })
            })
            .collect();
        details.insert(field.to_string(), serde_json::Value::Array(entries));
    }

    let body = ErrorResponse {
        code: ErrorCode::ValidationError.code(),
        error: ErrorCode::ValidationError.as_str().to_string(),
        message: ErrorCode::ValidationError.default_message().to_string(),
        details: Some(serde_json::Value::Object(details)),
    };

    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
}

//! Extractors handlers pull request data through.

pub mod validated_json;

pub use validated_json::ValidatedJson;

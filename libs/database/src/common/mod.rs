//! Helpers that are not PostgreSQL-specific; today that is the retry policy.

pub mod retry;

pub use retry::{RetryConfig, retry, retry_with_backoff};

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff policy for operations against a database that may still be
/// coming up, typically the initial connection.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Cap applied to the growing delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Factor the delay grows by between attempts.
    pub backoff_multiplier: f64,
    /// Randomize each delay to 50-100% of its nominal value.
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default policy: 3 retries, 100ms initial delay doubling up to 5s,
    /// with jitter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    fn next_delay(&self, delay: u64) -> u64 {
        ((delay as f64 * self.backoff_multiplier) as u64).min(self.max_delay_ms)
    }
}

/// Runs `operation` until it succeeds or the retry budget is spent.
///
/// The delay between attempts starts at `initial_delay_ms` and grows by
/// `backoff_multiplier` up to `max_delay_ms`. The error of the final
/// attempt is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay_ms;

    for attempt in 1..=config.max_retries {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) => {
                let sleep_ms = if config.use_jitter {
                    jittered(delay)
                } else {
                    delay
                };
                debug!(
                    attempt,
                    retries = config.max_retries,
                    delay_ms = sleep_ms,
                    "Operation failed: {err}, retrying"
                );
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
                delay = config.next_delay(delay);
            }
        }
    }

    match operation().await {
        Ok(value) => {
            debug!("Operation succeeded on the final attempt");
            Ok(value)
        }
        Err(err) => {
            warn!(
                attempts = config.max_retries + 1,
                "Operation failed after exhausting retries: {err}"
            );
            Err(err)
        }
    }
}

/// [`retry_with_backoff`] with the default policy.
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}

/// Scales `delay` to 50-100% of its nominal value so instances restarted
/// together do not reconnect in lockstep.
fn jittered(delay: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let roll = RandomState::new().hash_one(std::time::SystemTime::now()) % 50;
    let factor = roll as f64 / 100.0 + 0.5;
    (delay as f64 * factor) as u64
}

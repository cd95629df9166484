//! Retry logic with exponential backoff

use std::time::Duration;
use anyhow::Result;
use tracing::warn;
use crate::errors::{GuardianError, GuardianResult};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            exponential_base: 2.0,
        }
    }
}

/// Retries `operation` until it succeeds or `max_attempts` is reached.
/// Exhaustion is reported as a feed outage carrying the last error.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    context: &str,
) -> GuardianResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay_ms;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= config.max_attempts.max(1) => {
                return Err(GuardianError::feed(
                    format!("{} failed after {} attempts", context, attempt),
                    Some(e),
                ));
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                    attempt, config.max_attempts, context, e, delay
                );

                tokio::time::sleep(Duration::from_millis(delay)).await;

                delay = (delay as f64 * config.exponential_base) as u64;
                delay = delay.min(config.max_delay_ms);
                let jitter = (delay as f64 * 0.1 * rand::random::<f64>()) as u64;
                delay = delay.saturating_add(jitter);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow::anyhow!("connection reset"))
                } else {
                    Ok(7)
                }
            },
            &RetryConfig::default(),
            "reserves",
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_is_a_feed_outage() {
        let calls = AtomicU32::new(0);
        let result: GuardianResult<()> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("rpc down"))
            },
            &RetryConfig { max_attempts: 4, ..Default::default() },
            "gas price",
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "feed_unavailable");
        assert!(err.to_string().contains("gas price failed after 4 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

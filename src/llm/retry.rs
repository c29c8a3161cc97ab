// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Retry logic for LLM API calls with exponential backoff
//!
//! Only server-side failures (5xx) and timeouts are retried. Bad requests,
//! credential problems and everything else fail on the first attempt.

use crate::config::settings::ResilienceConfig;
use crate::error::{ApiError, CopilotError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration with smart defaults
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay in milliseconds (exponentially increased)
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
    /// Jitter percentage (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl From<&ResilienceConfig> for RetryConfig {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
        }
    }
}

impl RetryConfig {
    /// Calculate delay before retrying after failed attempt `attempt` (0-indexed)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        // Exponential backoff: base * 2^attempt
        let exponential_ms = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped_ms = exponential_ms.min(self.max_delay_ms);

        if self.jitter <= 0.0 {
            return Duration::from_millis(capped_ms);
        }

        let jitter_range = (capped_ms as f64 * self.jitter) as i64;
        let mut rng = rand::rng();
        let jitter_ms = rng.random_range(-jitter_range..=jitter_range);

        let final_ms = (capped_ms as i64 + jitter_ms).max(0) as u64;
        Duration::from_millis(final_ms)
    }
}

/// Determine if an error is retryable
pub fn is_retryable(error: &CopilotError) -> bool {
    match error {
        CopilotError::Api(api_error) => match api_error {
            ApiError::Timeout => true,
            // Retry on 5xx errors
            ApiError::ServerError { status, .. } => (500..600).contains(status),

            ApiError::InvalidRequest(_) => false,
            ApiError::AuthenticationFailed => false,
            ApiError::RateLimited(_) => false,
            ApiError::Network(_) => false,
            ApiError::InvalidResponse(_) => false,
        },
        _ => false,
    }
}

/// Result of a retried operation plus the number of retries it took
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T>,
    pub retries: u32,
}

/// Retry a function with exponential backoff
///
/// # Arguments
/// * `operation` - The async operation to retry
/// * `config` - Retry configuration
/// * `operation_name` - Name of the operation for logging
///
/// # Returns
/// The final result together with the number of retries performed
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(
                        "{} succeeded after {} attempts",
                        operation_name,
                        attempt + 1
                    );
                }
                return RetryOutcome {
                    result: Ok(result),
                    retries: attempt,
                };
            }
            Err(error) => {
                if !is_retryable(&error) {
                    tracing::warn!(
                        "{} failed with non-retryable error: {}",
                        operation_name,
                        error
                    );
                    return RetryOutcome {
                        result: Err(error),
                        retries: attempt,
                    };
                }

                if attempt >= config.max_retries {
                    tracing::warn!(
                        "{} exhausted all {} retries: {}",
                        operation_name,
                        config.max_retries,
                        error
                    );
                    return RetryOutcome {
                        result: Err(error),
                        retries: attempt,
                    };
                }

                let delay = config.calculate_delay(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:.1}s...",
                    operation_name,
                    attempt + 1,
                    config.max_retries + 1,
                    error,
                    delay.as_secs_f64()
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

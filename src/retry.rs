use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use log::warn;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use crate::error::SlpError;
use crate::metrics::RETRIED_ATTEMPTS;

pub const DEFAULT_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);

// How many times a failed unit of work is retried and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32, // Retries after the first call
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: DEFAULT_ATTEMPTS,
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl RetryPolicy {
    // Doubling backoff without jitter; the attempt count is the only stop condition
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval.max(self.initial_interval))
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }
}

// Retries a single-argument unit of work according to a RetryPolicy
#[derive(Debug, Clone, Default)]
pub struct RetryWrapper {
    policy: RetryPolicy,
}

impl RetryWrapper {
    pub fn new(policy: RetryPolicy) -> Self {
        RetryWrapper { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    // Calls handler(input) until it succeeds or the retries run out, then returns the last error unchanged
    pub async fn retry_wrapper<F, Fut, I, T, E>(&self, handler: Option<F>, input: Option<I>) -> Result<T, E>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        I: Clone,
        E: From<SlpError> + Display,
    {
        let mut handler = handler.ok_or_else(|| E::from(SlpError::MissingHandler))?;
        let input = input.ok_or_else(|| E::from(SlpError::MissingInput))?;

        let retries = self.policy.attempts;
        let mut attempt = 0u32;

        retry(self.policy.backoff(), || {
            attempt += 1;
            let attempt_number = attempt;
            let call = handler(input.clone());
            async move {
                call.await.map_err(|e| {
                    // attempt_number is 1-based, so retries + 1 calls are allowed in total
                    let retries_left = (retries + 1).saturating_sub(attempt_number);
                    warn!(
                        "Attempt {} failed: {}. There are {} retries left.",
                        attempt_number, e, retries_left
                    );
                    if retries_left == 0 {
                        backoff::Error::permanent(e)
                    } else {
                        RETRIED_ATTEMPTS.inc();
                        backoff::Error::transient(e)
                    }
                })
            }
        })
        .await
    }
}

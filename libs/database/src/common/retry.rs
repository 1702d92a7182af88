use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff used while waiting for the store at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    /// Sleep somewhere in 50..=100% of the nominal delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            factor: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn with_retries(self, retries: u32) -> Self {
        Self { retries, ..self }
    }

    pub fn with_base_delay(self, base_delay: Duration) -> Self {
        Self { base_delay, ..self }
    }

    pub fn with_max_delay(self, max_delay: Duration) -> Self {
        Self { max_delay, ..self }
    }

    pub fn without_jitter(self) -> Self {
        Self {
            jitter: false,
            ..self
        }
    }

    /// Nominal sleep before retry number `n` (1-based), capped at `max_delay`.
    pub fn delay_for(&self, n: u32) -> Duration {
        let exp = self.factor.powi(n.saturating_sub(1) as i32);
        let millis = self.base_delay.as_millis() as f64 * exp;
        Duration::from_millis(millis as u64).min(self.max_delay)
    }

    fn sleep_for(&self, n: u32) -> Duration {
        let nominal = self.delay_for(n);
        if self.jitter {
            nominal.mul_f64(jitter_factor())
        } else {
            nominal
        }
    }
}

/// Runs `operation` until it succeeds or the policy's retries are spent.
///
/// The last error is returned unchanged.
///
/// ```ignore
/// let policy = RetryPolicy::default().with_retries(5);
/// let client = retry_with_backoff(|| database::mongodb::connect(&url), policy).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut failures = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if failures > 0 {
                    debug!(failures, "Recovered after retrying");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        failures += 1;
        if failures > policy.retries {
            warn!(attempts = failures, error = %err, "Retries exhausted");
            return Err(err);
        }

        let pause = policy.sleep_for(failures);
        debug!(
            failures,
            retries = policy.retries,
            error = %err,
            pause_ms = pause.as_millis() as u64,
            "Attempt failed, backing off"
        );
        tokio::time::sleep(pause).await;
    }
}

fn jitter_factor() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let roll = RandomState::new().hash_one(std::time::SystemTime::now()) % 51;
    0.5 + roll as f64 / 100.0
}

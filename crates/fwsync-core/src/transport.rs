//! Remote retrieval with bounded timeout and retry
//!
//! Every failure mode (DNS, refused connection, timeout, TLS, non-2xx
//! status, truncated body) is a [`TransportError`] and is retried the same
//! way. After the last attempt the most recent error is returned.

use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::ExponentialBackoffBuilder;
use backoff::backoff::Backoff;

use crate::SyncConfig;

/// Failure to retrieve a payload.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is unavailable: {reason}")]
    Unavailable { url: String, reason: String },
}

/// Source of remote payloads.
pub trait Transport {
    /// Retrieve the body at `url`, retrying as configured.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Blocks the current thread between retries.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How many times to retry and how long to wait in between.
///
/// The wait before retry `n` (0-indexed) is `base_delay * 2^n`, without
/// jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// Total number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Fresh backoff state for one retried operation.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_interval(Duration::from_secs(60))
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run `operation` until it succeeds or `policy` is exhausted.
///
/// `operation` receives the 1-based attempt number. Returns the first
/// success or the error from the final attempt.
pub fn retry_with_backoff<T, E, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    E: std::fmt::Display,
{
    let total_attempts = policy.max_attempts();
    let mut backoff = policy.backoff();
    let mut attempt = 1;

    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= total_attempts => return Err(e),
            Err(e) => {
                let Some(delay) = backoff.next_backoff() else {
                    return Err(e);
                };
                tracing::debug!(
                    "attempt {}/{} failed, retrying in {}ms: {}",
                    attempt,
                    total_attempts,
                    delay.as_millis(),
                    e
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
}

/// Blocking HTTP(S) transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl HttpTransport {
    /// Build a client from the timeout, retry, TLS and proxy settings in
    /// `config`.
    pub fn new(config: &SyncConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .user_agent(concat!("fwsync/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(TransportError::Client)?;

        Ok(Self {
            client,
            policy: config.retry_policy(),
            sleeper: Box::new(ThreadSleeper),
        })
    }

    /// Replace the sleeper used between retries.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    fn attempt(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        retry_with_backoff(&self.policy, self.sleeper.as_ref(), |_| self.attempt(url))
    }
}

//! Bounded polling waits.
//!
//! Both explicit waits of a discovery run (hydration and the login flow)
//! are built on [`poll_until`]: probe, sleep, probe again until the probe
//! yields a value or the ceiling is reached.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::result::ScoutResult;

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The probe produced a value
    Ready {
        /// Value produced by the probe
        value: T,
        /// Time spent waiting
        elapsed: Duration,
    },
    /// The ceiling was reached first
    TimedOut {
        /// Time spent waiting
        elapsed: Duration,
    },
}

impl<T> WaitOutcome<T> {
    /// The produced value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::TimedOut { .. } => None,
        }
    }

    /// Time spent waiting
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Ready { elapsed, .. } | Self::TimedOut { elapsed } => *elapsed,
        }
    }

    /// Whether the wait succeeded
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Probe until it yields `Some`, or until `options.timeout_ms` elapses.
///
/// The probe always runs at least once. Probe errors are treated as "not
/// yet" unless they are fatal to the run, in which case they propagate.
pub async fn poll_until<T, F, Fut>(
    options: &WaitOptions,
    waiting_for: &str,
    mut probe: F,
) -> ScoutResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScoutResult<Option<T>>>,
{
    let start = Instant::now();
    let timeout = options.timeout();

    loop {
        match probe().await {
            Ok(Some(value)) => {
                return Ok(WaitOutcome::Ready {
                    value,
                    elapsed: start.elapsed(),
                })
            }
            Ok(None) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => debug!(waiting_for, error = %err, "probe failed, retrying"),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitOutcome::TimedOut { elapsed });
        }
        tokio::time::sleep(options.poll_interval().min(timeout - elapsed)).await;
    }
}

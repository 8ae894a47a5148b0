//! Hydration gate.
//!
//! Client-rendered pages often ship the form skeleton first and attach ids
//! a moment later. Enumerating too early yields nodes that can only be
//! located by brittle XPath, so discovery waits until at least one
//! interactive element carries an id.

use std::time::Duration;

use tracing::{debug, warn};

use crate::driver::{DomDriver, ElementQuery};
use crate::result::ScoutResult;
use crate::session::Session;
use crate::wait::{poll_until, WaitOptions, WaitOutcome};

/// Result of the hydration gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationStatus {
    /// Interactive elements with ids are present
    Ready {
        /// Time spent waiting
        elapsed: Duration,
    },
    /// The ceiling passed first; enumeration proceeds anyway
    TimedOut {
        /// Time spent waiting
        waited: Duration,
    },
}

impl HydrationStatus {
    /// Whether the page reported hydrated
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Wait until the page has hydrated or `options.timeout_ms` passes.
///
/// Only a crashed driver is an error; everything else degrades to
/// [`HydrationStatus::TimedOut`].
pub async fn await_ready<D: DomDriver>(
    session: &Session<D>,
    options: &WaitOptions,
) -> ScoutResult<HydrationStatus> {
    let driver = session.driver();
    let outcome = poll_until(options, "hydration", || probe(driver)).await?;

    Ok(match outcome {
        WaitOutcome::Ready { elapsed, .. } => {
            debug!(elapsed_ms = elapsed.as_millis() as u64, "page hydrated");
            HydrationStatus::Ready { elapsed }
        }
        WaitOutcome::TimedOut { elapsed } => {
            warn!(
                url = session.url(),
                waited_ms = elapsed.as_millis() as u64,
                "hydration not observed, enumerating current DOM"
            );
            HydrationStatus::TimedOut { waited: elapsed }
        }
    })
}

async fn probe<D: DomDriver>(driver: &D) -> ScoutResult<Option<()>> {
    let nodes = driver.query_all(&ElementQuery::primary()).await?;
    for node in &nodes {
        match driver.attribute(node, "id").await {
            Ok(Some(id)) if !id.trim().is_empty() => return Ok(Some(())),
            Ok(_) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(_) => {}
        }
    }
    Ok(None)
}

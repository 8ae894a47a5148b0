//! Candidate element enumeration.

use tracing::{debug, info};

use crate::config::EnumerationConfig;
use crate::driver::{DomDriver, ElementQuery};
use crate::record::DiscoveryWarning;
use crate::result::ScoutResult;
use crate::session::Session;

/// How many candidates a run processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationMode {
    /// Anonymous quick scan: at most `cap` candidates
    Simple {
        /// Candidate limit
        cap: usize,
    },
    /// Authenticated or smart scan: every candidate
    Full,
}

impl EnumerationMode {
    /// Pick the mode for a run
    #[must_use]
    pub const fn for_run(config: &EnumerationConfig, authenticated: bool) -> Self {
        if authenticated || config.smart {
            Self::Full
        } else {
            Self::Simple {
                cap: config.simple_mode_cap,
            }
        }
    }
}

/// Visible, enabled candidates in document order
#[derive(Debug)]
pub struct Enumeration<N> {
    /// Candidate nodes
    pub candidates: Vec<N>,
    /// The broadened query replaced the primary one
    pub used_fallback: bool,
    /// Nodes dropped because their state could not be read
    pub skipped: Vec<DiscoveryWarning>,
}

/// Collect the interactive elements of the current page.
///
/// Runs the primary query and falls back to the broadened one when it
/// returns fewer than `config.fallback_threshold` nodes. Hidden or
/// disabled nodes are dropped.
pub async fn enumerate<D: DomDriver>(
    session: &Session<D>,
    config: &EnumerationConfig,
    mode: EnumerationMode,
) -> ScoutResult<Enumeration<D::Node>> {
    let driver = session.driver();

    let primary = driver.query_all(&ElementQuery::primary()).await?;
    let (nodes, used_fallback) = if primary.len() < config.fallback_threshold {
        debug!(
            primary = primary.len(),
            threshold = config.fallback_threshold,
            "too few interactive elements, broadening query"
        );
        (driver.query_all(&ElementQuery::broadened()).await?, true)
    } else {
        (primary, false)
    };

    let limit = match mode {
        EnumerationMode::Simple { cap } => cap,
        EnumerationMode::Full => usize::MAX,
    };

    let found = nodes.len();
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();
    for (index, node) in nodes.into_iter().enumerate() {
        if candidates.len() >= limit {
            break;
        }
        match interactable(driver, &node).await {
            Ok(true) => candidates.push(node),
            Ok(false) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                debug!(index, error = %err, "skipping element with unreadable state");
                skipped.push(DiscoveryWarning::ElementSkipped {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        found,
        candidates = candidates.len(),
        used_fallback,
        "enumerated candidates"
    );
    Ok(Enumeration {
        candidates,
        used_fallback,
        skipped,
    })
}

async fn interactable<D: DomDriver>(driver: &D, node: &D::Node) -> ScoutResult<bool> {
    Ok(driver.is_displayed(node).await? && driver.is_enabled(node).await?)
}

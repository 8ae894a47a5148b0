//! Discovery orchestration.
//!
//! One [`Discoverer::discover`] call is one discovery run: open a fresh
//! session, optionally log in, wait for hydration, enumerate, then resolve
//! and classify each candidate into a [`LocatorRecord`]. The session is
//! closed on every exit path.

use tracing::{debug, info, warn};

use crate::auth::{login, Credentials};
use crate::classifier::{classify, ElementSnapshot, FieldNameRegistry};
use crate::config::DiscoveryConfig;
use crate::driver::{DomDriver, DriverLauncher, SessionCookie};
use crate::enumerator::{enumerate, EnumerationMode};
use crate::hydration::{await_ready, HydrationStatus};
use crate::record::{DiscoveryOutcome, DiscoveryWarning, LocatorRecord};
use crate::resolver::resolve;
use crate::result::ScoutResult;
use crate::session::{Session, SessionManager};

/// How a run gets access to the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// No login
    #[default]
    Anonymous,
    /// Log in through the page's form first
    Login(Credentials),
    /// Reuse cookies from an earlier authenticated session
    Cookies(Vec<SessionCookie>),
}

/// Input of one discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    /// Page to scan
    pub url: String,
    /// Authentication to apply before scanning
    pub auth: AuthMode,
    /// Process every candidate even when anonymous
    pub smart: bool,
}

impl DiscoveryRequest {
    /// Anonymous request for `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: AuthMode::Anonymous,
            smart: false,
        }
    }

    /// Log in with these credentials first
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.auth = AuthMode::Login(credentials);
        self
    }

    /// Reuse these cookies
    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<SessionCookie>) -> Self {
        self.auth = AuthMode::Cookies(cookies);
        self
    }

    /// Process every candidate
    #[must_use]
    pub const fn with_smart(mut self, smart: bool) -> Self {
        self.smart = smart;
        self
    }
}

/// Runs discovery through a [`DriverLauncher`]
#[derive(Debug, Clone)]
pub struct Discoverer<L> {
    sessions: SessionManager<L>,
    config: DiscoveryConfig,
}

impl<L: DriverLauncher> Discoverer<L> {
    /// Discoverer with default configuration
    pub fn new(launcher: L) -> Self {
        Self::with_config(launcher, DiscoveryConfig::default())
    }

    /// Discoverer with explicit configuration
    pub fn with_config(launcher: L, config: DiscoveryConfig) -> Self {
        let sessions = SessionManager::new(launcher)
            .with_navigation_timeout(config.browser.navigation_timeout_ms);
        Self { sessions, config }
    }

    /// Active configuration
    pub const fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run discovery against one page.
    ///
    /// Errors opening the page, logging in or from a crashed driver fail
    /// the run. Elements that cannot be read are skipped and reported as
    /// warnings on the outcome instead.
    pub async fn discover(&self, request: &DiscoveryRequest) -> ScoutResult<DiscoveryOutcome> {
        self.config.validate()?;

        let cookies = match &request.auth {
            AuthMode::Cookies(cookies) => cookies.as_slice(),
            AuthMode::Anonymous | AuthMode::Login(_) => &[],
        };
        let mut session = self.sessions.open(&request.url, cookies).await?;

        let result = self.run(&mut session, request).await;
        let closed = self.sessions.close(session).await;

        match (result, closed) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(outcome), Err(err)) => {
                warn!(error = %err, "browser did not shut down cleanly");
                Ok(outcome)
            }
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "browser did not shut down cleanly");
                }
                Err(err)
            }
        }
    }

    async fn run<D: DomDriver>(
        &self,
        session: &mut Session<D>,
        request: &DiscoveryRequest,
    ) -> ScoutResult<DiscoveryOutcome> {
        if let AuthMode::Login(credentials) = &request.auth {
            login(session, credentials, &self.config.login).await?;
        }

        let mut warnings = Vec::new();
        let hydration = await_ready(session, &self.config.hydration.wait_options()).await?;
        if let HydrationStatus::TimedOut { waited } = hydration {
            warnings.push(DiscoveryWarning::HydrationTimeout {
                waited_ms: waited.as_millis() as u64,
            });
        }

        let mut enumeration_config = self.config.enumeration.clone();
        enumeration_config.smart |= request.smart;
        let mode =
            EnumerationMode::for_run(&enumeration_config, session.auth_state().is_authenticated());
        let enumeration = enumerate(session, &enumeration_config, mode).await?;
        warnings.extend(enumeration.skipped);

        let mut names = FieldNameRegistry::new();
        let mut records = Vec::with_capacity(enumeration.candidates.len());
        for (index, node) in enumeration.candidates.iter().enumerate() {
            match describe(session, node, index, &mut names).await {
                Ok(record) => {
                    if record.unstable {
                        warnings.push(DiscoveryWarning::UnstableId {
                            field_name: record.field_name.clone(),
                            id: record.locator_value.clone(),
                        });
                    }
                    records.push(record);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    debug!(index, error = %err, "skipping element");
                    warnings.push(DiscoveryWarning::ElementSkipped {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            url = session.url(),
            records = records.len(),
            warnings = warnings.len(),
            "discovery finished"
        );
        Ok(DiscoveryOutcome {
            url: session.url().to_string(),
            records,
            warnings,
            used_fallback_query: enumeration.used_fallback,
        })
    }
}

/// Build the record for one candidate. A field name is only claimed once
/// the element has been read and resolved successfully.
async fn describe<D: DomDriver>(
    session: &Session<D>,
    node: &D::Node,
    index: usize,
    names: &mut FieldNameRegistry,
) -> ScoutResult<LocatorRecord> {
    let snapshot = ElementSnapshot::read(session.driver(), node).await?;
    let resolution = resolve(session, node, &snapshot).await?;
    let classification = classify(&snapshot, index);

    Ok(LocatorRecord {
        field_name: names.claim(&classification.base_name),
        label: classification.label,
        locator_strategy: resolution.locator.strategy(),
        locator_value: resolution.locator.value().to_string(),
        element_type: classification.element_type,
        suggested_action: classification.action,
        sample_value: classification.sample_value,
        unstable: resolution.unstable,
    })
}

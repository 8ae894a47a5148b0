//! Discovery configuration.
//!
//! Every section deserializes with defaults, so a config file only needs
//! the keys it wants to change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::result::{ScoutError, ScoutResult};
use crate::wait::WaitOptions;

/// Browser launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Ceiling for a single navigation
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1366,
            viewport_height: 768,
            chromium_path: None,
            sandbox: true,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Hydration gate timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
    /// Ceiling before proceeding with whatever is present
    pub timeout_ms: u64,
    /// Delay between readiness probes
    pub poll_interval_ms: u64,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: 250,
        }
    }
}

impl HydrationConfig {
    /// Wait options for the gate's polling loop
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}

/// Candidate enumeration limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// Primary-query hits below this trigger the broadened query
    pub fallback_threshold: usize,
    /// Candidates processed in simple mode
    pub simple_mode_cap: usize,
    /// Process every candidate even without authentication
    pub smart: bool,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: 3,
            simple_mode_cap: 10,
            smart: false,
        }
    }
}

/// Login flow timing and success signals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Ceiling for locating each login control
    pub field_timeout_ms: u64,
    /// Ceiling for the post-login signal
    pub confirmation_timeout_ms: u64,
    /// Delay between probes in both waits
    pub poll_interval_ms: u64,
    /// URL fragment that proves login succeeded
    pub success_url_fragment: Option<String>,
    /// Visible texts only shown to signed-in users (case-insensitive)
    pub success_markers: Vec<String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            field_timeout_ms: 10_000,
            confirmation_timeout_ms: 15_000,
            poll_interval_ms: 250,
            success_url_fragment: None,
            success_markers: vec![
                "logout".to_string(),
                "log out".to_string(),
                "sign out".to_string(),
            ],
        }
    }
}

impl LoginConfig {
    /// Wait options for locating login controls
    #[must_use]
    pub const fn field_wait(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.field_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Wait options for the post-login signal
    #[must_use]
    pub const fn confirmation_wait(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.confirmation_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Require the post-login URL to contain a fragment
    #[must_use]
    pub fn with_success_url_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.success_url_fragment = Some(fragment.into());
        self
    }
}

/// Complete discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Browser launch options
    pub browser: BrowserConfig,
    /// Hydration gate timing
    pub hydration: HydrationConfig,
    /// Enumeration limits
    pub enumeration: EnumerationConfig,
    /// Login flow
    pub login: LoginConfig,
    /// Named deployment targets
    pub environments: BTreeMap<String, String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let environments = [
            ("production", "https://my.charitableimpact.com"),
            ("qa", "https://qa.my.charitableimpact.com"),
            ("stage", "https://stage.my.charitableimpact.com"),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();

        Self {
            browser: BrowserConfig::default(),
            hydration: HydrationConfig::default(),
            enumeration: EnumerationConfig::default(),
            login: LoginConfig::default(),
            environments,
        }
    }
}

impl DiscoveryConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set browser options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Set hydration ceiling and poll interval
    #[must_use]
    pub const fn with_hydration(mut self, timeout_ms: u64, poll_interval_ms: u64) -> Self {
        self.hydration.timeout_ms = timeout_ms;
        self.hydration.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set login options
    #[must_use]
    pub fn with_login(mut self, login: LoginConfig) -> Self {
        self.login = login;
        self
    }

    /// Process every candidate regardless of authentication
    #[must_use]
    pub const fn with_smart(mut self, smart: bool) -> Self {
        self.enumeration.smart = smart;
        self
    }

    /// Set the simple-mode candidate cap
    #[must_use]
    pub const fn with_simple_mode_cap(mut self, cap: usize) -> Self {
        self.enumeration.simple_mode_cap = cap;
        self
    }

    /// Resolve a named environment to its base URL (case-insensitive)
    pub fn target_url(&self, environment: &str) -> ScoutResult<&str> {
        self.environments
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(environment))
            .map(|(_, url)| url.as_str())
            .ok_or_else(|| {
                let known: Vec<&str> = self.environments.keys().map(String::as_str).collect();
                ScoutError::config(format!(
                    "unknown environment '{environment}' (known: {})",
                    known.join(", ")
                ))
            })
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> ScoutResult<()> {
        if self.hydration.poll_interval_ms == 0 || self.login.poll_interval_ms == 0 {
            return Err(ScoutError::config("poll intervals must be non-zero"));
        }
        if self.enumeration.simple_mode_cap == 0 {
            return Err(ScoutError::config("simple_mode_cap must be at least 1"));
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(ScoutError::config("viewport dimensions must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_default_limits() {
            let config = DiscoveryConfig::default();
            assert_eq!(config.enumeration.fallback_threshold, 3);
            assert_eq!(config.enumeration.simple_mode_cap, 10);
            assert!(!config.enumeration.smart);
            assert!(config.browser.headless);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_default_success_markers() {
            let login = LoginConfig::default();
            assert!(login.success_markers.iter().any(|m| m == "logout"));
            assert!(login.success_url_fragment.is_none());
        }
    }

    mod environment_tests {
        use super::*;

        #[test]
        fn test_known_environment() {
            let config = DiscoveryConfig::default();
            assert_eq!(
                config.target_url("QA").unwrap(),
                "https://qa.my.charitableimpact.com"
            );
        }

        #[test]
        fn test_unknown_environment_lists_known() {
            let err = DiscoveryConfig::default().target_url("dev").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("dev"));
            assert!(message.contains("production"));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_partial_json_keeps_defaults() {
            let config: DiscoveryConfig =
                serde_json::from_str(r#"{"hydration": {"timeout_ms": 500}}"#).unwrap();
            assert_eq!(config.hydration.timeout_ms, 500);
            assert_eq!(config.hydration.poll_interval_ms, 250);
            assert_eq!(config.enumeration, EnumerationConfig::default());
        }

        #[test]
        fn test_builder_chain() {
            let config = DiscoveryConfig::new()
                .with_hydration(100, 10)
                .with_smart(true)
                .with_simple_mode_cap(5)
                .with_browser(BrowserConfig::default().with_no_sandbox().with_headless(false));
            assert_eq!(config.hydration.timeout_ms, 100);
            assert!(config.enumeration.smart);
            assert_eq!(config.enumeration.simple_mode_cap, 5);
            assert!(!config.browser.sandbox);
            assert!(!config.browser.headless);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_zero_poll_interval_rejected() {
            let config = DiscoveryConfig::new().with_hydration(100, 0);
            assert!(matches!(config.validate(), Err(ScoutError::Config { .. })));
        }

        #[test]
        fn test_zero_cap_rejected() {
            let config = DiscoveryConfig::new().with_simple_mode_cap(0);
            assert!(config.validate().is_err());
        }
    }
}

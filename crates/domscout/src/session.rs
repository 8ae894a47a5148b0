//! Browser session lifecycle.
//!
//! A [`Session`] owns one live browser for exactly one discovery run.
//! [`SessionManager`] launches it, loads the target page (optionally
//! reusing cookies from an earlier login) and tears it down again.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::driver::{DomDriver, DriverLauncher, SessionCookie};
use crate::result::{ScoutError, ScoutResult};

/// Authentication state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No credentials used
    #[default]
    Anonymous,
    /// Login form submitted, confirmation pending
    Authenticating,
    /// Logged in, by form or by reused cookies
    Authenticated,
    /// Login attempted and failed
    Failed,
}

impl AuthState {
    /// Whether the session may see authenticated-only content
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// A live browser page plus the state of the run using it
#[derive(Debug)]
pub struct Session<D> {
    driver: D,
    url: String,
    auth: AuthState,
}

impl<D: DomDriver> Session<D> {
    /// Wrap an already-loaded driver
    pub fn new(driver: D, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            auth: AuthState::Anonymous,
        }
    }

    /// The driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// URL the page was on after the last navigation or login
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Authentication state
    pub const fn auth_state(&self) -> AuthState {
        self.auth
    }

    pub(crate) fn set_auth_state(&mut self, auth: AuthState) {
        debug!(from = ?self.auth, to = ?auth, "auth state change");
        self.auth = auth;
    }

    /// Re-read the page URL from the driver
    pub async fn refresh_url(&mut self) -> ScoutResult<&str> {
        self.url = self.driver.current_url().await?;
        Ok(&self.url)
    }
}

/// Opens and closes sessions through a [`DriverLauncher`]
#[derive(Debug, Clone)]
pub struct SessionManager<L> {
    launcher: L,
    navigation_timeout: Duration,
}

impl<L: DriverLauncher> SessionManager<L> {
    /// Manager with a 30s navigation ceiling
    pub const fn new(launcher: L) -> Self {
        Self {
            launcher,
            navigation_timeout: Duration::from_secs(30),
        }
    }

    /// Set the navigation ceiling in milliseconds
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Launch a browser and load `url`.
    ///
    /// With cookies, the page is loaded once to establish the origin, the
    /// cookies are installed and the page is loaded again; the session then
    /// starts out authenticated. A browser launched here is closed again
    /// before any navigation error is returned.
    pub async fn open(
        &self,
        url: &str,
        cookies: &[SessionCookie],
    ) -> ScoutResult<Session<L::Driver>> {
        info!(url, "opening session");
        let mut driver = self.launcher.launch().await?;

        match self.load(&mut driver, url, cookies).await {
            Ok((auth, landed)) => {
                let mut session = Session::new(driver, landed);
                session.auth = auth;
                Ok(session)
            }
            Err(err) => {
                if let Err(close_err) = driver.close().await {
                    warn!(error = %close_err, "failed to close browser after navigation error");
                }
                Err(err)
            }
        }
    }

    /// Shut the session's browser down
    pub async fn close(&self, mut session: Session<L::Driver>) -> ScoutResult<()> {
        debug!(url = %session.url, "closing session");
        session.driver.close().await
    }

    async fn load(
        &self,
        driver: &mut L::Driver,
        url: &str,
        cookies: &[SessionCookie],
    ) -> ScoutResult<(AuthState, String)> {
        self.navigate(driver, url).await?;
        let auth = if cookies.is_empty() {
            AuthState::Anonymous
        } else {
            debug!(count = cookies.len(), "installing session cookies");
            driver.set_cookies(cookies).await?;
            self.navigate(driver, url).await?;
            AuthState::Authenticated
        };
        Ok((auth, driver.current_url().await?))
    }

    async fn navigate(&self, driver: &mut L::Driver, url: &str) -> ScoutResult<()> {
        let status = tokio::time::timeout(self.navigation_timeout, driver.navigate(url))
            .await
            .map_err(|_| ScoutError::NavigationError {
                url: url.to_string(),
                message: format!("timed out after {}ms", self.navigation_timeout.as_millis()),
            })??;

        match status {
            Some(code) if !(200..300).contains(&code) => Err(ScoutError::NavigationError {
                url: url.to_string(),
                message: format!("HTTP {code}"),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLauncher, MockPage, MockSite};

    fn site() -> MockSite {
        MockSite::new()
            .page("https://app.test/", MockPage::new())
            .page("https://app.test/missing", MockPage::new().status(404))
            .page("https://app.test/login", MockPage::new())
            .page(
                "https://app.test/account",
                MockPage::new().requires_cookie("sid", "https://app.test/login"),
            )
    }

    mod open_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_anonymous() {
            let manager = SessionManager::new(MockLauncher::new(site()));
            let session = manager.open("https://app.test/", &[]).await.unwrap();
            assert_eq!(session.url(), "https://app.test/");
            assert_eq!(session.auth_state(), AuthState::Anonymous);
            manager.close(session).await.unwrap();
        }

        #[tokio::test]
        async fn test_non_2xx_closes_browser() {
            let launcher = MockLauncher::new(site());
            let stats = launcher.stats();
            let manager = SessionManager::new(launcher);
            let err = manager.open("https://app.test/missing", &[]).await.unwrap_err();
            assert!(matches!(err, ScoutError::NavigationError { ref message, .. } if message == "HTTP 404"));
            assert_eq!(stats.launches(), 1);
            assert_eq!(stats.open_sessions(), 0);
        }

        #[tokio::test]
        async fn test_dns_failure_closes_browser() {
            let launcher = MockLauncher::new(site());
            let stats = launcher.stats();
            let manager = SessionManager::new(launcher);
            assert!(manager.open("https://unknown.test/", &[]).await.is_err());
            assert_eq!(stats.open_sessions(), 0);
        }

        #[tokio::test]
        async fn test_launch_failure_propagates() {
            let manager = SessionManager::new(MockLauncher::new(site()).failing());
            let err = manager.open("https://app.test/", &[]).await.unwrap_err();
            assert!(matches!(err, ScoutError::BrowserLaunch { .. }));
        }
    }

    mod cookie_tests {
        use super::*;

        #[tokio::test]
        async fn test_cookies_unlock_protected_page() {
            let manager = SessionManager::new(MockLauncher::new(site()));
            let cookies = [SessionCookie::new("sid", "abc")];
            let session = manager.open("https://app.test/account", &cookies).await.unwrap();
            assert_eq!(session.url(), "https://app.test/account");
            assert!(session.auth_state().is_authenticated());
            manager.close(session).await.unwrap();
        }

        #[tokio::test]
        async fn test_without_cookies_lands_on_login() {
            let manager = SessionManager::new(MockLauncher::new(site()));
            let session = manager.open("https://app.test/account", &[]).await.unwrap();
            assert_eq!(session.url(), "https://app.test/login");
            manager.close(session).await.unwrap();
        }
    }
}

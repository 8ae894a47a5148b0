//! Chromium-backed [`DomDriver`] over the Chrome DevTools Protocol.
//!
//! Only compiled with the `browser` feature. Element handles are live CDP
//! remote objects; the handful of reads CDP does not expose directly
//! (visibility, enabled state, absolute XPath) are small functions called
//! on the element itself.

#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::driver::{DomDriver, DriverLauncher, ElementQuery, SessionCookie};
use crate::locator::{js_string, Locator};
use crate::result::{ScoutError, ScoutResult};

const TAG_NAME_FN: &str = "function() { return this.localName.toLowerCase(); }";

const IS_DISPLAYED_FN: &str = r"function() {
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    return this.getClientRects().length > 0;
}";

const IS_ENABLED_FN: &str = "function() { return !(this.matches && this.matches(':disabled')); }";

const ABSOLUTE_XPATH_FN: &str = r#"function() {
    const uniqueId = (el) => el.id && !el.id.includes('"')
        && document.querySelectorAll('[id="' + CSS.escape(el.id) + '"]').length === 1;
    const segs = (el) => {
        if (!el || el.nodeType !== 1) return [''];
        if (uniqueId(el)) return ['id("' + el.id + '")'];
        let i = 1;
        for (let s = el.previousElementSibling; s; s = s.previousElementSibling) {
            if (s.localName === el.localName) i++;
        }
        return [...segs(el.parentNode), el.localName.toLowerCase() + '[' + i + ']'];
    };
    return segs(this).join('/');
}"#;

const NAVIGATION_STATUS_JS: &str = r"(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && entry.responseStatus ? entry.responseStatus : null;
})()";

/// Map a CDP failure onto the discovery error taxonomy
fn cdp_error(err: CdpError) -> ScoutError {
    match err {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            ScoutError::DriverCrash {
                message: err.to_string(),
            }
        }
        CdpError::NotFound | CdpError::JavascriptException(_) | CdpError::ScrollingFailed(_) => {
            ScoutError::element(err.to_string())
        }
        other => ScoutError::driver(other.to_string()),
    }
}

/// Decode a script result. CDP omits `value` for `null`, which reads as
/// JSON null so `Option` targets come back as `None`.
fn decode<T: DeserializeOwned>(value: Option<serde_json::Value>) -> serde_json::Result<T> {
    serde_json::from_value(value.unwrap_or(serde_json::Value::Null))
}

/// Launches headless (or headed) Chromium per discovery run
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    /// Launcher for the given browser settings
    #[must_use]
    pub const fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Browser settings
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self) -> ScoutResult<ChromiumDriver> {
        let config = &self.config;
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(Duration::from_millis(config.navigation_timeout_ms));

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ScoutError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ScoutError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScoutError::BrowserLaunch {
                message: e.to_string(),
            })?;

        info!(headless = config.headless, "chromium launched");
        Ok(ChromiumDriver {
            browser: Arc::new(Mutex::new(browser)),
            page,
            handle,
        })
    }
}

/// One Chromium process with one page
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Arc<Mutex<CdpBrowser>>,
    page: CdpPage,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    async fn evaluate<T: DeserializeOwned>(&self, expression: String) -> ScoutResult<T> {
        let result = self.page.evaluate(expression).await.map_err(cdp_error)?;
        decode(result.value().cloned())
            .map_err(|e| ScoutError::driver(format!("unexpected script result: {e}")))
    }

    async fn call<T: DeserializeOwned>(node: &Element, function: &str) -> ScoutResult<T> {
        let returns = node.call_js_fn(function, false).await.map_err(cdp_error)?;
        decode(returns.result.value).map_err(|e| ScoutError::element(e.to_string()))
    }
}

#[async_trait]
impl DomDriver for ChromiumDriver {
    type Node = Element;

    async fn navigate(&mut self, url: &str) -> ScoutResult<Option<u16>> {
        debug!(url, "navigating");
        self.page.goto(url).await.map_err(|e| match cdp_error(e) {
            fatal @ ScoutError::DriverCrash { .. } => fatal,
            other => ScoutError::NavigationError {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;
        self.evaluate(NAVIGATION_STATUS_JS.to_string()).await
    }

    async fn current_url(&self) -> ScoutResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(cdp_error)?
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn query_all(&self, query: &ElementQuery) -> ScoutResult<Vec<Element>> {
        self.page.find_elements(query.to_css()).await.map_err(cdp_error)
    }

    async fn count(&self, locator: &Locator) -> ScoutResult<usize> {
        self.evaluate(locator.to_count_query()).await
    }

    async fn tag_name(&self, node: &Element) -> ScoutResult<String> {
        Self::call(node, TAG_NAME_FN).await
    }

    async fn attribute(&self, node: &Element, name: &str) -> ScoutResult<Option<String>> {
        node.attribute(name).await.map_err(cdp_error)
    }

    async fn text(&self, node: &Element) -> ScoutResult<String> {
        Ok(node
            .inner_text()
            .await
            .map_err(cdp_error)?
            .unwrap_or_default())
    }

    async fn is_displayed(&self, node: &Element) -> ScoutResult<bool> {
        Self::call(node, IS_DISPLAYED_FN).await
    }

    async fn is_enabled(&self, node: &Element) -> ScoutResult<bool> {
        Self::call(node, IS_ENABLED_FN).await
    }

    async fn absolute_xpath(&self, node: &Element) -> ScoutResult<String> {
        Self::call(node, ABSOLUTE_XPATH_FN).await
    }

    async fn label_for(&self, id: &str) -> ScoutResult<Option<String>> {
        let expression = format!(
            "(() => {{ const l = document.querySelector('label[for=\"' + CSS.escape({}) + '\"]'); return l ? l.innerText : null; }})()",
            js_string(id)
        );
        self.evaluate(expression).await
    }

    async fn type_text(&self, node: &Element, text: &str) -> ScoutResult<()> {
        node.focus().await.map_err(cdp_error)?;
        node.type_str(text).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn click(&self, node: &Element) -> ScoutResult<()> {
        node.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn set_cookies(&mut self, cookies: &[SessionCookie]) -> ScoutResult<()> {
        let url = self.current_url().await?;
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            let mut builder = CookieParam::builder()
                .name(cookie.name.clone())
                .value(cookie.value.clone());
            builder = match &cookie.domain {
                Some(domain) => builder.domain(domain.clone()),
                None => builder.url(url.clone()),
            };
            if let Some(path) = &cookie.path {
                builder = builder.path(path.clone());
            }
            params.push(builder.build().map_err(ScoutError::driver)?);
        }
        self.page.set_cookies(params).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn close(&mut self) -> ScoutResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        self.handle.abort();
        closed.map_err(|e| ScoutError::DriverCrash {
            message: e.to_string(),
        })?;
        info!("chromium closed");
        Ok(())
    }
}

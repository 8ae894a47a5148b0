//! Browser-automation capability interface.
//!
//! Discovery never talks to a browser binding directly. Everything it needs
//! (navigate, find elements, read attributes, visibility checks, a few
//! scripted helpers) goes through [`DomDriver`], so any WebDriver-like
//! backend can serve a discovery run:
//!
//! - `ChromiumDriver` (feature `browser`) drives Chromium over CDP
//! - [`MockDriver`](crate::mock::MockDriver) serves an in-memory DOM for tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::result::ScoutResult;

/// Structural element query, rendered to CSS for real browsers and
/// evaluated directly by the mock DOM.
///
/// A node matches when its tag is listed, its `role` is listed, or it
/// carries one of the listed attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementQuery {
    tags: Vec<String>,
    roles: Vec<String>,
    attributes: Vec<String>,
}

impl ElementQuery {
    /// Query matching any of the given tags
    #[must_use]
    pub fn tags(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            ..Self::default()
        }
    }

    /// The strict interactive set: `input, button, textarea, select`
    #[must_use]
    pub fn primary() -> Self {
        Self::tags(&["input", "button", "textarea", "select"])
    }

    /// Primary set plus links, ARIA buttons and anything with an `id`
    #[must_use]
    pub fn broadened() -> Self {
        Self::primary()
            .with_tag("a")
            .with_role("button")
            .with_attribute("id")
    }

    /// Also match a tag
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_ascii_lowercase());
        self
    }

    /// Also match nodes with this ARIA role
    #[must_use]
    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.push(role.to_string());
        self
    }

    /// Also match nodes carrying this attribute
    #[must_use]
    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attributes.push(attribute.to_string());
        self
    }

    /// Render as a CSS selector list
    #[must_use]
    pub fn to_css(&self) -> String {
        let tags = self.tags.iter().cloned();
        let roles = self.roles.iter().map(|r| format!("[role=\"{r}\"]"));
        let attributes = self.attributes.iter().map(|a| format!("[{a}]"));
        tags.chain(roles).chain(attributes).collect::<Vec<_>>().join(", ")
    }

    /// Evaluate against a node given its tag and an attribute lookup
    pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
            || self
                .roles
                .iter()
                .any(|r| attribute("role").is_some_and(|role| role == r))
            || self.attributes.iter().any(|a| attribute(a).is_some())
    }
}

/// A cookie carried over from a previously authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain (defaults to the target host)
    #[serde(default)]
    pub domain: Option<String>,
    /// Cookie path
    #[serde(default)]
    pub path: Option<String>,
}

impl SessionCookie {
    /// Create a host-scoped cookie
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }
}

/// Capability set a discovery run needs from a browser binding.
///
/// All commands are issued sequentially against one page; implementations
/// are not required to support concurrent calls.
#[async_trait]
pub trait DomDriver: Send + Sync {
    /// Opaque handle to a live DOM node
    type Node: Send + Sync;

    /// Navigate and return the HTTP status of the main document, if known
    async fn navigate(&mut self, url: &str) -> ScoutResult<Option<u16>>;

    /// Current page URL
    async fn current_url(&self) -> ScoutResult<String>;

    /// All nodes matching the query, in document order
    async fn query_all(&self, query: &ElementQuery) -> ScoutResult<Vec<Self::Node>>;

    /// Number of nodes the locator matches in the live DOM
    async fn count(&self, locator: &Locator) -> ScoutResult<usize>;

    /// Lowercase tag name
    async fn tag_name(&self, node: &Self::Node) -> ScoutResult<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, node: &Self::Node, name: &str) -> ScoutResult<Option<String>>;

    /// Rendered text content
    async fn text(&self, node: &Self::Node) -> ScoutResult<String>;

    /// Whether the node is rendered and takes up space
    async fn is_displayed(&self, node: &Self::Node) -> ScoutResult<bool>;

    /// Whether the node accepts interaction
    async fn is_enabled(&self, node: &Self::Node) -> ScoutResult<bool>;

    /// Absolute XPath from the document root, short-circuiting at the
    /// nearest ancestor (or self) whose id is unique in the document
    async fn absolute_xpath(&self, node: &Self::Node) -> ScoutResult<String>;

    /// Text of the `<label for="…">` associated with an element id
    async fn label_for(&self, id: &str) -> ScoutResult<Option<String>>;

    /// Focus the node and type text into it
    async fn type_text(&self, node: &Self::Node, text: &str) -> ScoutResult<()>;

    /// Click the node
    async fn click(&self, node: &Self::Node) -> ScoutResult<()>;

    /// Install cookies for the current origin
    async fn set_cookies(&mut self, cookies: &[SessionCookie]) -> ScoutResult<()>;

    /// Shut the browser down
    async fn close(&mut self) -> ScoutResult<()>;
}

/// Starts a fresh browser and hands back its driver
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    /// Driver produced by this launcher
    type Driver: DomDriver;

    /// Launch one browser process for exactly one discovery run
    async fn launch(&self) -> ScoutResult<Self::Driver>;
}

//! Locator strategies and live-DOM query expressions.
//!
//! A [`Locator`] is the (strategy, value) pair a replayed test uses to find
//! one element again. Every locator can render the JavaScript expression
//! that counts its matches, which is how uniqueness is re-verified against
//! the live page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Locator strategy, in the vocabulary of Selenium's `By`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// `By.id`
    Id,
    /// `By.name`
    Name,
    /// `By.cssSelector`
    Css,
    /// `By.xpath`
    Xpath,
}

impl LocatorStrategy {
    /// Strategy keyword as emitted into generated code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Css => "css",
            Self::Xpath => "xpath",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (strategy, value) pair sufficient to re-find one element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: LocatorStrategy,
    value: String,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Locate by `id` attribute
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, id)
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Name, name)
    }

    /// Locate by a single class name, rendered as `.class`
    #[must_use]
    pub fn class(class: &str) -> Self {
        Self::new(LocatorStrategy::Css, format!(".{class}"))
    }

    /// Locate by XPath expression
    #[must_use]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Xpath, xpath)
    }

    /// Strategy
    #[must_use]
    pub const fn strategy(&self) -> LocatorStrategy {
        self.strategy
    }

    /// Selector string for the strategy
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// JavaScript expression evaluating to the number of matching nodes
    #[must_use]
    pub fn to_count_query(&self) -> String {
        let value = js_string(&self.value);
        match self.strategy {
            LocatorStrategy::Id => format!(
                "Array.from(document.querySelectorAll('[id]')).filter(el => el.id === {value}).length"
            ),
            LocatorStrategy::Name => format!("document.getElementsByName({value}).length"),
            LocatorStrategy::Css => format!(
                "(() => {{ try {{ return document.querySelectorAll({value}).length; }} catch (e) {{ return 0; }} }})()"
            ),
            LocatorStrategy::Xpath => format!(
                "(() => {{ try {{ return document.evaluate({value}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength; }} catch (e) {{ return 0; }} }})()"
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Quote a string as a JavaScript literal
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Whether an id looks framework-generated: purely numeric or a UUID.
///
/// Such ids rarely survive a rebuild or redeploy of the target app.
#[must_use]
pub fn is_unstable_id(id: &str) -> bool {
    static UUID: OnceLock<Regex> = OnceLock::new();
    let uuid = UUID.get_or_init(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("uuid pattern is valid")
    });
    let id = id.trim();
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())) || uuid.is_match(id)
}

/// Whether a class token can be used verbatim after `.` in a CSS selector
#[must_use]
pub fn is_css_identifier(token: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").expect("ident pattern is valid"))
        .is_match(token)
}

//! Domscout: DOM discovery and locator resolution for test generation
//!
//! Domscout opens a web page in a real browser, waits for client-side
//! rendering to settle, finds the interactive elements and describes each
//! one as a [`LocatorRecord`]: a stable locator, a code-safe field name, the
//! kind of control and the action a generated test would perform on it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌────────────┐   ┌──────────────────┐
//! │ Session      │──►│ Hydration │──►│ Element    │──►│ Locator Resolver │
//! │ Manager      │   │ Gate      │   │ Enumerator │   │ + Classifier     │
//! │ (+ login)    │   └───────────┘   └────────────┘   └────────┬─────────┘
//! └──────────────┘                                            ▼
//!                                                   Vec<LocatorRecord>
//! ```
//!
//! Every browser interaction goes through the [`DomDriver`] trait. The
//! `browser` feature provides a Chromium implementation; [`MockDriver`]
//! serves an in-memory DOM.
//!
//! # Example
//!
//! ```
//! use domscout::{Discoverer, DiscoveryRequest, MockElement, MockLauncher, MockPage, MockSite};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let site = MockSite::new().page(
//!     "https://app.test/",
//!     MockPage::with_body([
//!         MockElement::input("email").id("email"),
//!         MockElement::input("password").id("password"),
//!         MockElement::button("Sign in").id("submit"),
//!     ]),
//! );
//!
//! let outcome = Discoverer::new(MockLauncher::new(site))
//!     .discover(&DiscoveryRequest::new("https://app.test/"))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(outcome.grounding_text(), "email | id=email\npassword | id=password\nsubmit | id=submit");
//! # });
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod auth;
#[cfg(feature = "browser")]
mod browser;
#[allow(clippy::doc_markdown)]
mod classifier;
mod config;
mod discovery;
mod driver;
mod enumerator;
mod hydration;
mod locator;
mod record;
mod resolver;
mod result;
mod session;

/// Wait primitives shared by the hydration gate and the login flow
pub mod wait;

/// In-memory DOM and driver for tests and offline runs
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod mock;

pub use auth::{login, Credentials};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumLauncher};
pub use classifier::{
    classify, sample_value, sanitize_field_name, Classification, ElementSnapshot,
    FieldNameRegistry, JAVA_RESERVED_WORDS, MAX_TEXT_NAME_LEN,
};
pub use config::{BrowserConfig, DiscoveryConfig, EnumerationConfig, HydrationConfig, LoginConfig};
pub use discovery::{AuthMode, Discoverer, DiscoveryRequest};
pub use driver::{DomDriver, DriverLauncher, ElementQuery, SessionCookie};
pub use enumerator::{enumerate, Enumeration, EnumerationMode};
pub use hydration::{await_ready, HydrationStatus};
pub use locator::{is_css_identifier, is_unstable_id, Locator, LocatorStrategy};
pub use mock::{MockDriver, MockElement, MockLauncher, MockLogin, MockPage, MockSite, MockStats};
pub use record::{DiscoveryOutcome, DiscoveryWarning, ElementType, LocatorRecord, SuggestedAction};
pub use resolver::{resolve, Resolution};
pub use result::{LoginField, ScoutError, ScoutResult};
pub use session::{AuthState, Session, SessionManager};
pub use wait::{poll_until, WaitOptions, WaitOutcome};

/// Convenient re-exports for discovery runs
pub mod prelude {
    pub use super::{
        AuthMode, Credentials, Discoverer, DiscoveryConfig, DiscoveryOutcome, DiscoveryRequest,
        DiscoveryWarning, DomDriver, DriverLauncher, ElementType, LocatorRecord, LocatorStrategy,
        ScoutError, ScoutResult, SessionCookie, SuggestedAction,
    };
    #[cfg(feature = "browser")]
    pub use super::{ChromiumDriver, ChromiumLauncher};
}

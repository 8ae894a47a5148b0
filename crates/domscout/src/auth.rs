//! Form login before discovery.
//!
//! Login controls are found heuristically, since the target page is not
//! known in advance. Success is only declared once the page shows a
//! signal that is unavailable to anonymous users.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::LoginConfig;
use crate::driver::{DomDriver, ElementQuery};
use crate::result::{LoginField, ScoutError, ScoutResult};
use crate::session::{AuthState, Session};
use crate::wait::poll_until;

const USERNAME_HINTS: &[&str] = &["email", "user", "login"];
const SUBMIT_TEXTS: &[&str] = &["log in", "login", "sign in"];
const SUBMIT_HINTS: &[&str] = &["login", "signin", "submit"];

/// Username and password for a form login
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username or email
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the heuristics look at on each form control
#[derive(Debug)]
struct Control {
    tag: String,
    input_type: String,
    hints: String,
    caption: String,
}

impl Control {
    async fn read<D: DomDriver>(driver: &D, node: &D::Node) -> ScoutResult<Option<Self>> {
        if !(driver.is_displayed(node).await? && driver.is_enabled(node).await?) {
            return Ok(None);
        }
        let tag = driver.tag_name(node).await?.to_ascii_lowercase();
        let input_type = attribute(driver, node, "type").await?.to_ascii_lowercase();
        let hints = format!(
            "{} {}",
            attribute(driver, node, "id").await?,
            attribute(driver, node, "name").await?
        )
        .to_ascii_lowercase();
        let caption = if tag == "input" {
            attribute(driver, node, "value").await?
        } else {
            driver.text(node).await?
        };
        Ok(Some(Self {
            tag,
            input_type,
            hints,
            caption: caption.trim().to_lowercase(),
        }))
    }

    fn is_text_input(&self) -> bool {
        self.tag == "input" && matches!(self.input_type.as_str(), "" | "text" | "email")
    }

    fn hinted(&self, hints: &[&str]) -> bool {
        hints.iter().any(|h| self.hints.contains(h))
    }
}

async fn attribute<D: DomDriver>(driver: &D, node: &D::Node, name: &str) -> ScoutResult<String> {
    Ok(driver.attribute(node, name).await?.unwrap_or_default())
}

/// Visible controls of the given tags, paired with what was read from them
async fn controls<D: DomDriver>(driver: &D, tags: &[&str]) -> ScoutResult<Vec<(D::Node, Control)>> {
    let mut out = Vec::new();
    for node in driver.query_all(&ElementQuery::tags(tags)).await? {
        match Control::read(driver, &node).await {
            Ok(Some(control)) => out.push((node, control)),
            Ok(None) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => debug!(error = %err, "ignoring unreadable form control"),
        }
    }
    Ok(out)
}

/// Pick the best-ranked control, lowest rank first, document order on ties
fn best<N>(candidates: Vec<(N, Control)>, rank: impl Fn(&Control) -> Option<u8>) -> Option<N> {
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(i, (node, control))| rank(&control).map(|r| (r, i, node)))
        .min_by_key(|(r, i, _)| (*r, *i))
        .map(|(_, _, node)| node)
}

async fn find_username<D: DomDriver>(driver: &D) -> ScoutResult<Option<D::Node>> {
    Ok(best(controls(driver, &["input"]).await?, |c| {
        if c.tag != "input" || c.input_type == "password" {
            None
        } else if c.input_type == "email" {
            Some(0)
        } else if c.is_text_input() && c.hinted(USERNAME_HINTS) {
            Some(1)
        } else if c.is_text_input() {
            Some(2)
        } else {
            None
        }
    }))
}

async fn find_password<D: DomDriver>(driver: &D) -> ScoutResult<Option<D::Node>> {
    Ok(best(controls(driver, &["input"]).await?, |c| {
        (c.input_type == "password").then_some(0)
    }))
}

async fn find_submit<D: DomDriver>(driver: &D) -> ScoutResult<Option<D::Node>> {
    Ok(best(controls(driver, &["button", "input"]).await?, |c| {
        let clickable = c.tag == "button" || matches!(c.input_type.as_str(), "submit" | "button");
        if !clickable {
            None
        } else if c.input_type == "submit" {
            Some(0)
        } else if SUBMIT_TEXTS.iter().any(|t| c.caption.contains(t)) {
            Some(1)
        } else if c.hinted(SUBMIT_HINTS) {
            Some(2)
        } else {
            None
        }
    }))
}

async fn logged_in<D: DomDriver>(driver: &D, config: &LoginConfig) -> ScoutResult<Option<()>> {
    if let Some(fragment) = &config.success_url_fragment {
        if driver.current_url().await?.contains(fragment.as_str()) {
            return Ok(Some(()));
        }
    }
    let markers: Vec<String> = config
        .success_markers
        .iter()
        .map(|m| m.to_lowercase())
        .collect();
    let query = ElementQuery::tags(&["a", "button"])
        .with_role("button")
        .with_role("menuitem");
    for node in driver.query_all(&query).await? {
        let text = driver.text(&node).await?.to_lowercase();
        if markers.iter().any(|m| text.contains(m.as_str())) && driver.is_displayed(&node).await? {
            return Ok(Some(()));
        }
    }
    Ok(None)
}

/// Log in through the page's login form.
///
/// The session stays open afterwards and is marked
/// [`AuthState::Authenticated`], or [`AuthState::Failed`] on error.
pub async fn login<D: DomDriver>(
    session: &mut Session<D>,
    credentials: &Credentials,
    config: &LoginConfig,
) -> ScoutResult<()> {
    info!(url = session.url(), username = %credentials.username, "logging in");
    session.set_auth_state(AuthState::Authenticating);

    let result = submit_and_confirm(session.driver(), credentials, config).await;
    match result {
        Ok(()) => {
            session.set_auth_state(AuthState::Authenticated);
            let url = session.refresh_url().await?;
            info!(url, "login confirmed");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "login failed");
            session.set_auth_state(AuthState::Failed);
            Err(err)
        }
    }
}

async fn submit_and_confirm<D: DomDriver>(
    driver: &D,
    credentials: &Credentials,
    config: &LoginConfig,
) -> ScoutResult<()> {
    let wait = config.field_wait();
    let missing = |field| ScoutError::LoginFieldNotFound {
        field,
        ms: wait.timeout_ms,
    };

    let username = poll_until(&wait, "username field", || find_username(driver))
        .await?
        .into_value()
        .ok_or_else(|| missing(LoginField::Username))?;
    let password = poll_until(&wait, "password field", || find_password(driver))
        .await?
        .into_value()
        .ok_or_else(|| missing(LoginField::Password))?;
    let submit = poll_until(&wait, "submit button", || find_submit(driver))
        .await?
        .into_value()
        .ok_or_else(|| missing(LoginField::SubmitButton))?;

    driver.type_text(&username, &credentials.username).await?;
    driver.type_text(&password, &credentials.password).await?;
    driver.click(&submit).await?;
    debug!("credentials submitted");

    let confirmation = config.confirmation_wait();
    poll_until(&confirmation, "login confirmation", || logged_in(driver, config))
        .await?
        .into_value()
        .ok_or(ScoutError::LoginConfirmationTimeout {
            ms: confirmation.timeout_ms,
        })
}

//! In-memory DOM and driver for exercising discovery without a browser.
//!
//! A [`MockSite`] maps URLs to [`MockPage`]s built from [`MockElement`]
//! trees. [`MockDriver`] serves them through the same [`DomDriver`]
//! capability set a real browser provides, including the failure modes
//! discovery has to cope with: late hydration, stale handles, unreadable
//! nodes, crashed drivers, login forms and cookie-protected pages.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::driver::{DomDriver, DriverLauncher, ElementQuery, SessionCookie};
use crate::locator::{Locator, LocatorStrategy};
use crate::result::{ScoutError, ScoutResult};

/// A node in a mock document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    displayed: bool,
    fault: Option<MockFault>,
    children: Vec<MockElement>,
}

/// Failure injected when a node is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockFault {
    Unreadable,
    Crash,
}

impl MockElement {
    /// Create an element
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            displayed: true,
            fault: None,
            children: Vec::new(),
        }
    }

    /// `<input type="…">`
    #[must_use]
    pub fn input(input_type: &str) -> Self {
        Self::new("input").attr("type", input_type)
    }

    /// `<button>` with text
    #[must_use]
    pub fn button(text: &str) -> Self {
        Self::new("button").text(text)
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set own text content
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Render with `display: none`
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark as `disabled`
    #[must_use]
    pub fn disabled(self) -> Self {
        self.attr("disabled", "")
    }

    /// Attribute reads on this node fail with an element error
    #[must_use]
    pub const fn unreadable(mut self) -> Self {
        self.fault = Some(MockFault::Unreadable);
        self
    }

    /// Attribute reads on this node report a crashed driver
    #[must_use]
    pub const fn crashing(mut self) -> Self {
        self.fault = Some(MockFault::Crash);
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn full_text(&self) -> String {
        let mut parts = vec![self.text.trim().to_string()];
        parts.extend(self.children.iter().map(Self::full_text));
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn without_ids(&self) -> Self {
        let mut copy = self.clone();
        let _ = copy.attributes.remove("id");
        copy.children = self.children.iter().map(Self::without_ids).collect();
        copy
    }
}

/// Credentials a mock login form accepts, and where success leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockLogin {
    username: String,
    password: String,
    redirect_to: String,
    cookie: Option<String>,
}

impl MockLogin {
    /// Accept exactly these credentials and then load `redirect_to`
    #[must_use]
    pub fn new(username: &str, password: &str, redirect_to: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            redirect_to: redirect_to.to_string(),
            cookie: None,
        }
    }

    /// Set a session cookie with this name on successful login
    #[must_use]
    pub fn with_cookie(mut self, name: &str) -> Self {
        self.cookie = Some(name.to_string());
        self
    }
}

/// One page of a mock site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    status: u16,
    body: Vec<MockElement>,
    hydrate_after: Option<Duration>,
    login: Option<MockLogin>,
    requires_cookie: Option<(String, String)>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPage {
    /// Empty page served with HTTP 200
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: 200,
            body: Vec::new(),
            hydrate_after: None,
            login: None,
            requires_cookie: None,
        }
    }

    /// Page whose body holds these elements
    #[must_use]
    pub fn with_body(body: impl IntoIterator<Item = MockElement>) -> Self {
        Self::new().elements(body)
    }

    /// HTTP status of the main document
    #[must_use]
    pub const fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Append body elements
    #[must_use]
    pub fn elements(mut self, elements: impl IntoIterator<Item = MockElement>) -> Self {
        self.body.extend(elements);
        self
    }

    /// Serve the page without ids until `delay` has passed since load
    #[must_use]
    pub const fn hydrate_after(mut self, delay: Duration) -> Self {
        self.hydrate_after = Some(delay);
        self
    }

    /// Treat a click on any submit control as a login attempt
    #[must_use]
    pub fn with_login(mut self, login: MockLogin) -> Self {
        self.login = Some(login);
        self
    }

    /// Without the named cookie, load `redirect_to` instead
    #[must_use]
    pub fn requires_cookie(mut self, cookie: &str, redirect_to: &str) -> Self {
        self.requires_cookie = Some((cookie.to_string(), redirect_to.to_string()));
        self
    }

    fn document(&self) -> MockElement {
        MockElement::new("html").child(MockElement::new("body").children(self.body.clone()))
    }
}

/// A set of pages addressed by exact URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockSite {
    pages: BTreeMap<String, MockPage>,
}

impl MockSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    #[must_use]
    pub fn page(mut self, url: &str, page: MockPage) -> Self {
        let _ = self.pages.insert(url.to_string(), page);
        self
    }
}

/// Launch and teardown counters shared by a launcher and its drivers
#[derive(Debug, Default)]
pub struct MockStats {
    launches: AtomicUsize,
    closes: AtomicUsize,
}

impl MockStats {
    /// Browsers launched
    #[must_use]
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Browsers closed
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Browsers launched but never closed
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.launches().saturating_sub(self.closes())
    }
}

/// Launches [`MockDriver`]s over a shared site
#[derive(Debug, Clone)]
pub struct MockLauncher {
    site: Arc<MockSite>,
    stats: Arc<MockStats>,
    fail_launch: bool,
}

impl MockLauncher {
    /// Launcher serving `site`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site: Arc::new(site),
            stats: Arc::new(MockStats::default()),
            fail_launch: false,
        }
    }

    /// Every launch fails as if no browser were installed
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Shared launch/close counters
    #[must_use]
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl DriverLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self) -> ScoutResult<MockDriver> {
        if self.fail_launch {
            return Err(ScoutError::BrowserLaunch {
                message: "mock browser unavailable".to_string(),
            });
        }
        let _ = self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(MockDriver::with_stats(
            Arc::clone(&self.site),
            Arc::clone(&self.stats),
        ))
    }
}

/// Handle to a node of the document that was current when it was queried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    generation: u64,
    path: Vec<usize>,
}

#[derive(Debug)]
struct MockState {
    url: String,
    document: MockElement,
    generation: u64,
    loaded_at: Instant,
    hydrate_after: Option<Duration>,
    login: Option<MockLogin>,
    typed: HashMap<Vec<usize>, String>,
    cookies: Vec<SessionCookie>,
    closed: bool,
}

/// Driver over a [`MockSite`]
#[derive(Debug)]
pub struct MockDriver {
    site: Arc<MockSite>,
    stats: Arc<MockStats>,
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Driver serving `site`, starting on `about:blank`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self::with_stats(Arc::new(site), Arc::new(MockStats::default()))
    }

    fn with_stats(site: Arc<MockSite>, stats: Arc<MockStats>) -> Self {
        Self {
            site,
            stats,
            state: Mutex::new(MockState {
                url: "about:blank".to_string(),
                document: MockPage::new().document(),
                generation: 0,
                loaded_at: Instant::now(),
                hydrate_after: None,
                login: None,
                typed: HashMap::new(),
                cookies: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Cookies installed so far
    #[must_use]
    pub fn cookies(&self) -> Vec<SessionCookie> {
        self.lock().map(|s| s.cookies.clone()).unwrap_or_default()
    }

    fn lock(&self) -> ScoutResult<MutexGuard<'_, MockState>> {
        let state = self.state.lock().map_err(|_| ScoutError::DriverCrash {
            message: "mock state poisoned".to_string(),
        })?;
        if state.closed {
            return Err(ScoutError::DriverCrash {
                message: "browser already closed".to_string(),
            });
        }
        Ok(state)
    }

    fn load(&self, state: &mut MockState, url: &str) -> ScoutResult<u16> {
        let mut target = url;
        let mut page = self.site.pages.get(target);
        if let Some((cookie, redirect)) = page.and_then(|p| p.requires_cookie.as_ref()) {
            if !state.cookies.iter().any(|c| &c.name == cookie) {
                target = redirect;
                page = self.site.pages.get(target);
            }
        }
        let page = page.ok_or_else(|| ScoutError::NavigationError {
            url: url.to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        })?;

        state.url = target.to_string();
        state.document = page.document();
        state.generation += 1;
        state.loaded_at = Instant::now();
        state.hydrate_after = page.hydrate_after;
        state.login = page.login.clone();
        state.typed.clear();
        Ok(page.status)
    }
}

impl MockState {
    fn current_document(&self) -> MockElement {
        match self.hydrate_after {
            Some(delay) if self.loaded_at.elapsed() < delay => self.document.without_ids(),
            _ => self.document.clone(),
        }
    }
}

/// Every node with its child-index path, in document order
fn flatten(root: &MockElement) -> Vec<(Vec<usize>, &MockElement)> {
    fn walk<'a>(
        el: &'a MockElement,
        path: &mut Vec<usize>,
        out: &mut Vec<(Vec<usize>, &'a MockElement)>,
    ) {
        out.push((path.clone(), el));
        for (i, child) in el.children.iter().enumerate() {
            path.push(i);
            walk(child, path, out);
            let _ = path.pop();
        }
    }
    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

fn element_at<'a>(root: &'a MockElement, path: &[usize]) -> Option<&'a MockElement> {
    path.iter()
        .try_fold(root, |el, &i| el.children.get(i))
}

fn xpath_of(root: &MockElement, path: &[usize]) -> String {
    let mut id_counts: HashMap<&str, usize> = HashMap::new();
    for (_, el) in flatten(root) {
        if let Some(id) = el.get("id").filter(|id| !id.is_empty()) {
            *id_counts.entry(id).or_default() += 1;
        }
    }

    let mut segments: Vec<String> = Vec::new();
    let mut parent: Option<&MockElement> = None;
    let mut current = root;
    let mut steps = path.iter();
    loop {
        match current
            .get("id")
            .filter(|id| !id.contains('"') && id_counts.get(id) == Some(&1))
        {
            Some(id) => {
                segments.clear();
                segments.push(format!("id(\"{id}\")"));
            }
            None => {
                let position = parent.map_or(1, |p| {
                    let own = p
                        .children
                        .iter()
                        .position(|c| std::ptr::eq(c, current))
                        .unwrap_or(0);
                    1 + p.children[..own]
                        .iter()
                        .filter(|c| c.tag == current.tag)
                        .count()
                });
                segments.push(format!("{}[{position}]", current.tag));
            }
        }
        match steps.next().and_then(|&i| current.children.get(i)) {
            Some(next) => {
                parent = Some(current);
                current = next;
            }
            None => break,
        }
    }

    let joined = segments.join("/");
    if joined.starts_with("id(") {
        joined
    } else {
        format!("/{joined}")
    }
}

fn is_submit_control(el: &MockElement) -> bool {
    match el.tag.as_str() {
        "button" => true,
        "input" => matches!(el.get("type"), Some("submit" | "button")),
        _ => false,
    }
}

impl MockDriver {
    fn with_node<T>(
        &self,
        node: &MockNode,
        read: impl FnOnce(&MockState, &MockElement, &MockElement) -> ScoutResult<T>,
    ) -> ScoutResult<T> {
        let state = self.lock()?;
        if node.generation != state.generation {
            return Err(ScoutError::element("stale element reference"));
        }
        let document = state.current_document();
        let el = element_at(&document, &node.path)
            .ok_or_else(|| ScoutError::element("node detached from document"))?;
        match el.fault {
            Some(MockFault::Unreadable) => Err(ScoutError::element("attribute read failed")),
            Some(MockFault::Crash) => Err(ScoutError::DriverCrash {
                message: "target closed while reading node".to_string(),
            }),
            None => read(&state, &document, el),
        }
    }
}

#[async_trait]
impl DomDriver for MockDriver {
    type Node = MockNode;

    async fn navigate(&mut self, url: &str) -> ScoutResult<Option<u16>> {
        let mut state = self.lock()?;
        let status = self.load(&mut state, url)?;
        Ok(Some(status))
    }

    async fn current_url(&self) -> ScoutResult<String> {
        Ok(self.lock()?.url.clone())
    }

    async fn query_all(&self, query: &ElementQuery) -> ScoutResult<Vec<MockNode>> {
        let state = self.lock()?;
        let document = state.current_document();
        Ok(flatten(&document)
            .into_iter()
            .filter(|(_, el)| query.matches(&el.tag, |name| el.get(name)))
            .map(|(path, _)| MockNode {
                generation: state.generation,
                path,
            })
            .collect())
    }

    async fn count(&self, locator: &Locator) -> ScoutResult<usize> {
        let state = self.lock()?;
        let document = state.current_document();
        let nodes = flatten(&document);
        let value = locator.value();
        let count = match locator.strategy() {
            LocatorStrategy::Id => nodes.iter().filter(|(_, el)| el.get("id") == Some(value)).count(),
            LocatorStrategy::Name => nodes
                .iter()
                .filter(|(_, el)| el.get("name") == Some(value))
                .count(),
            LocatorStrategy::Css => match value.strip_prefix('.') {
                Some(class) => nodes
                    .iter()
                    .filter(|(_, el)| {
                        el.get("class")
                            .is_some_and(|c| c.split_whitespace().any(|t| t == class))
                    })
                    .count(),
                None => nodes.iter().filter(|(_, el)| el.tag == value).count(),
            },
            LocatorStrategy::Xpath => nodes
                .iter()
                .filter(|(path, _)| xpath_of(&document, path) == value)
                .count(),
        };
        Ok(count)
    }

    async fn tag_name(&self, node: &MockNode) -> ScoutResult<String> {
        self.with_node(node, |_, _, el| Ok(el.tag.clone()))
    }

    async fn attribute(&self, node: &MockNode, name: &str) -> ScoutResult<Option<String>> {
        self.with_node(node, |_, _, el| Ok(el.get(name).map(str::to_string)))
    }

    async fn text(&self, node: &MockNode) -> ScoutResult<String> {
        self.with_node(node, |_, _, el| Ok(el.full_text()))
    }

    async fn is_displayed(&self, node: &MockNode) -> ScoutResult<bool> {
        self.with_node(node, |_, document, _| {
            let mut current = Some(document);
            let mut displayed = document.displayed;
            for &i in &node.path {
                current = current.and_then(|el| el.children.get(i));
                displayed &= current.is_some_and(|el| el.displayed);
            }
            Ok(displayed)
        })
    }

    async fn is_enabled(&self, node: &MockNode) -> ScoutResult<bool> {
        self.with_node(node, |_, _, el| Ok(el.get("disabled").is_none()))
    }

    async fn absolute_xpath(&self, node: &MockNode) -> ScoutResult<String> {
        self.with_node(node, |_, document, _| Ok(xpath_of(document, &node.path)))
    }

    async fn label_for(&self, id: &str) -> ScoutResult<Option<String>> {
        let state = self.lock()?;
        let document = state.current_document();
        let label = flatten(&document)
            .into_iter()
            .find(|(_, el)| el.tag == "label" && el.get("for") == Some(id))
            .map(|(_, el)| el.full_text());
        Ok(label)
    }

    async fn type_text(&self, node: &MockNode, text: &str) -> ScoutResult<()> {
        let editable = self.with_node(node, |_, _, el| {
            Ok(matches!(el.tag.as_str(), "input" | "textarea"))
        })?;
        if !editable {
            return Err(ScoutError::element("element is not editable"));
        }
        let mut state = self.lock()?;
        state
            .typed
            .entry(node.path.clone())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn click(&self, node: &MockNode) -> ScoutResult<()> {
        let submits = self.with_node(node, |_, _, el| Ok(is_submit_control(el)))?;
        let mut state = self.lock()?;
        let Some(login) = state.login.clone().filter(|_| submits) else {
            return Ok(());
        };

        let document = state.current_document();
        let mut password_ok = false;
        let mut username_ok = false;
        for (path, el) in flatten(&document) {
            let typed = state.typed.get(&path).map(String::as_str);
            if el.get("type") == Some("password") {
                password_ok |= typed == Some(login.password.as_str());
            } else {
                username_ok |= typed == Some(login.username.as_str());
            }
        }
        if password_ok && username_ok {
            if let Some(name) = login.cookie {
                state.cookies.push(SessionCookie::new(name, "mock-session"));
            }
            let _ = self.load(&mut state, &login.redirect_to)?;
        }
        Ok(())
    }

    async fn set_cookies(&mut self, cookies: &[SessionCookie]) -> ScoutResult<()> {
        self.lock()?.cookies.extend_from_slice(cookies);
        Ok(())
    }

    async fn close(&mut self) -> ScoutResult<()> {
        let mut state = self.lock()?;
        state.closed = true;
        let _ = self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_site() -> MockSite {
        MockSite::new().page(
            "https://app.test/form",
            MockPage::with_body([MockElement::new("form").id("main").children([
                MockElement::input("text").attr("name", "first"),
                MockElement::new("div").child(MockElement::input("text").attr("name", "inner")),
                MockElement::input("text").attr("name", "second"),
                MockElement::new("label").attr("for", "email").text("Email address"),
                MockElement::input("email").id("email"),
            ])]),
        )
    }

    async fn open(site: MockSite, url: &str) -> MockDriver {
        let mut driver = MockDriver::new(site);
        driver.navigate(url).await.unwrap();
        driver
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_reports_status() {
            let site = MockSite::new().page("https://app.test/gone", MockPage::new().status(404));
            let mut driver = MockDriver::new(site);
            assert_eq!(driver.navigate("https://app.test/gone").await.unwrap(), Some(404));
            assert_eq!(driver.current_url().await.unwrap(), "https://app.test/gone");
        }

        #[tokio::test]
        async fn test_unknown_url_fails() {
            let mut driver = MockDriver::new(MockSite::new());
            let err = driver.navigate("https://nowhere.test").await.unwrap_err();
            assert!(matches!(err, ScoutError::NavigationError { .. }));
        }

        #[tokio::test]
        async fn test_cookie_gate_redirects() {
            let site = MockSite::new()
                .page("https://app.test/login", MockPage::new())
                .page(
                    "https://app.test/home",
                    MockPage::new().requires_cookie("sid", "https://app.test/login"),
                );
            let mut driver = MockDriver::new(site);
            driver.navigate("https://app.test/home").await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "https://app.test/login");

            driver.set_cookies(&[SessionCookie::new("sid", "1")]).await.unwrap();
            driver.navigate("https://app.test/home").await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "https://app.test/home");
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_query_in_document_order() {
            let driver = open(form_site(), "https://app.test/form").await;
            let nodes = driver.query_all(&ElementQuery::tags(&["input"])).await.unwrap();
            let mut names = Vec::new();
            for node in &nodes {
                names.push(driver.attribute(node, "name").await.unwrap());
            }
            assert_eq!(
                names,
                vec![
                    Some("first".to_string()),
                    Some("inner".to_string()),
                    Some("second".to_string()),
                    None
                ]
            );
        }

        #[tokio::test]
        async fn test_xpath_uses_unique_ancestor_id() {
            let driver = open(form_site(), "https://app.test/form").await;
            let nodes = driver.query_all(&ElementQuery::tags(&["input"])).await.unwrap();
            assert_eq!(driver.absolute_xpath(&nodes[0]).await.unwrap(), "id(\"main\")/input[1]");
            assert_eq!(
                driver.absolute_xpath(&nodes[1]).await.unwrap(),
                "id(\"main\")/div[1]/input[1]"
            );
            assert_eq!(driver.absolute_xpath(&nodes[2]).await.unwrap(), "id(\"main\")/input[2]");
        }

        #[tokio::test]
        async fn test_xpath_skips_ids_with_double_quotes() {
            let site = MockSite::new().page(
                "https://app.test/",
                MockPage::with_body([MockElement::new("div")
                    .id("say\"hi")
                    .child(MockElement::input("text"))]),
            );
            let driver = open(site, "https://app.test/").await;
            let nodes = driver.query_all(&ElementQuery::tags(&["input"])).await.unwrap();
            let xpath = driver.absolute_xpath(&nodes[0]).await.unwrap();
            assert_eq!(xpath, "/html[1]/body[1]/div[1]/input[1]");
            assert_eq!(driver.count(&Locator::xpath(xpath)).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_xpath_from_root_without_ids() {
            let site = MockSite::new().page(
                "https://app.test/",
                MockPage::with_body([
                    MockElement::input("text"),
                    MockElement::input("text"),
                ]),
            );
            let driver = open(site, "https://app.test/").await;
            let nodes = driver.query_all(&ElementQuery::tags(&["input"])).await.unwrap();
            let xpath = driver.absolute_xpath(&nodes[1]).await.unwrap();
            assert_eq!(xpath, "/html[1]/body[1]/input[2]");
            assert_eq!(driver.count(&Locator::xpath(xpath)).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_label_lookup() {
            let driver = open(form_site(), "https://app.test/form").await;
            assert_eq!(
                driver.label_for("email").await.unwrap().as_deref(),
                Some("Email address")
            );
            assert_eq!(driver.label_for("missing").await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_count_by_class_token() {
            let site = MockSite::new().page(
                "https://app.test/",
                MockPage::with_body([
                    MockElement::button("a").attr("class", "btn primary"),
                    MockElement::button("b").attr("class", "btn"),
                ]),
            );
            let driver = open(site, "https://app.test/").await;
            assert_eq!(driver.count(&Locator::class("btn")).await.unwrap(), 2);
            assert_eq!(driver.count(&Locator::class("primary")).await.unwrap(), 1);
        }
    }

    mod fault_tests {
        use super::*;

        #[tokio::test]
        async fn test_handles_go_stale_after_navigation() {
            let mut driver = open(form_site(), "https://app.test/form").await;
            let nodes = driver.query_all(&ElementQuery::primary()).await.unwrap();
            driver.navigate("https://app.test/form").await.unwrap();
            let err = driver.tag_name(&nodes[0]).await.unwrap_err();
            assert!(matches!(err, ScoutError::ElementProcessing { .. }));
        }

        #[tokio::test]
        async fn test_hidden_ancestor_hides_descendants() {
            let site = MockSite::new().page(
                "https://app.test/",
                MockPage::with_body([MockElement::new("div")
                    .hidden()
                    .child(MockElement::input("text"))]),
            );
            let driver = open(site, "https://app.test/").await;
            let nodes = driver.query_all(&ElementQuery::primary()).await.unwrap();
            assert!(!driver.is_displayed(&nodes[0]).await.unwrap());
        }

        #[tokio::test]
        async fn test_commands_fail_after_close() {
            let mut driver = open(form_site(), "https://app.test/form").await;
            driver.close().await.unwrap();
            let err = driver.current_url().await.unwrap_err();
            assert!(err.is_fatal());
        }

        #[tokio::test]
        async fn test_ids_attach_after_hydration_delay() {
            let site = MockSite::new().page(
                "https://app.test/",
                MockPage::with_body([MockElement::input("text").id("late")])
                    .hydrate_after(Duration::from_millis(30)),
            );
            let driver = open(site, "https://app.test/").await;
            let nodes = driver.query_all(&ElementQuery::primary()).await.unwrap();
            assert_eq!(driver.attribute(&nodes[0], "id").await.unwrap(), None);
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert_eq!(
                driver.attribute(&nodes[0], "id").await.unwrap().as_deref(),
                Some("late")
            );
        }
    }

    mod login_tests {
        use super::*;

        fn login_site() -> MockSite {
            MockSite::new()
                .page(
                    "https://app.test/login",
                    MockPage::with_body([
                        MockElement::input("email").id("email"),
                        MockElement::input("password").id("pw"),
                        MockElement::button("Log in").attr("type", "submit"),
                    ])
                    .with_login(MockLogin::new("a@b.c", "secret", "https://app.test/home")),
                )
                .page("https://app.test/home", MockPage::new())
        }

        async fn submit(password: &str) -> String {
            let driver = open(login_site(), "https://app.test/login").await;
            let nodes = driver.query_all(&ElementQuery::primary()).await.unwrap();
            driver.type_text(&nodes[0], "a@b.c").await.unwrap();
            driver.type_text(&nodes[1], password).await.unwrap();
            driver.click(&nodes[2]).await.unwrap();
            driver.current_url().await.unwrap()
        }

        #[tokio::test]
        async fn test_correct_credentials_redirect() {
            assert_eq!(submit("secret").await, "https://app.test/home");
        }

        #[tokio::test]
        async fn test_wrong_password_stays() {
            assert_eq!(submit("nope").await, "https://app.test/login");
        }
    }

    mod launcher_tests {
        use super::*;

        #[tokio::test]
        async fn test_stats_track_launch_and_close() {
            let launcher = MockLauncher::new(MockSite::new());
            let stats = launcher.stats();
            let mut driver = launcher.launch().await.unwrap();
            assert_eq!(stats.open_sessions(), 1);
            driver.close().await.unwrap();
            assert_eq!(stats.launches(), 1);
            assert_eq!(stats.closes(), 1);
            assert_eq!(stats.open_sessions(), 0);
        }

        #[tokio::test]
        async fn test_failing_launcher() {
            let launcher = MockLauncher::new(MockSite::new()).failing();
            let err = launcher.launch().await.unwrap_err();
            assert!(matches!(err, ScoutError::BrowserLaunch { .. }));
            assert_eq!(launcher.stats().launches(), 0);
        }
    }
}

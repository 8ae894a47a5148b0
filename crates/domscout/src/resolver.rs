//! Locator resolution.
//!
//! Strategies are tried from most to least readable; each candidate is
//! re-counted against the live page and accepted only when it matches
//! exactly one node:
//!
//! 1. `id`
//! 2. CSS `.class` for a single, selector-safe class token
//! 3. `name`
//! 4. absolute XPath

use tracing::{debug, trace};

use crate::classifier::ElementSnapshot;
use crate::driver::DomDriver;
use crate::locator::{is_css_identifier, is_unstable_id, Locator, LocatorStrategy};
use crate::result::{ScoutError, ScoutResult};
use crate::session::Session;

/// Chosen locator for one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The locator
    pub locator: Locator,
    /// Chosen by id, and the id looks framework-generated
    pub unstable: bool,
}

/// Pick the most readable locator that uniquely identifies `node`
pub async fn resolve<D: DomDriver>(
    session: &Session<D>,
    node: &D::Node,
    snapshot: &ElementSnapshot,
) -> ScoutResult<Resolution> {
    let driver = session.driver();

    for locator in attribute_candidates(snapshot) {
        if is_unique(driver, &locator).await? {
            let unstable = locator.strategy() == LocatorStrategy::Id
                && is_unstable_id(locator.value());
            debug!(%locator, unstable, "resolved");
            return Ok(Resolution { locator, unstable });
        }
        trace!(%locator, "not unique, trying next strategy");
    }

    let locator = Locator::xpath(driver.absolute_xpath(node).await?);
    if is_unique(driver, &locator).await? {
        debug!(%locator, "resolved by structure");
        return Ok(Resolution {
            locator,
            unstable: false,
        });
    }
    Err(ScoutError::element(format!(
        "no locator matches exactly one node (last tried {locator})"
    )))
}

/// Attribute-based candidates in precedence order
fn attribute_candidates(snapshot: &ElementSnapshot) -> Vec<Locator> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(id) = non_blank(snapshot.id.as_deref()) {
        candidates.push(Locator::id(id));
    }
    if let Some(class) = single_class(snapshot.class.as_deref()) {
        candidates.push(Locator::class(class));
    }
    if let Some(name) = non_blank(snapshot.name.as_deref()) {
        candidates.push(Locator::name(name));
    }
    candidates
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn single_class(class: Option<&str>) -> Option<&str> {
    let mut tokens = class?.split_whitespace();
    let token = tokens.next()?;
    (tokens.next().is_none() && is_css_identifier(token)).then_some(token)
}

async fn is_unique<D: DomDriver>(driver: &D, locator: &Locator) -> ScoutResult<bool> {
    Ok(driver.count(locator).await? == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ElementQuery;
    use crate::mock::{MockElement, MockLauncher, MockPage, MockSite};
    use crate::session::SessionManager;

    const URL: &str = "https://app.test/";

    /// Resolve every primary element of a page
    async fn resolve_all(body: Vec<MockElement>) -> Vec<Resolution> {
        let manager = SessionManager::new(MockLauncher::new(
            MockSite::new().page(URL, MockPage::with_body(body)),
        ));
        let session = manager.open(URL, &[]).await.unwrap();
        let nodes = session
            .driver()
            .query_all(&ElementQuery::primary())
            .await
            .unwrap();
        let mut out = Vec::new();
        for node in &nodes {
            let snapshot = ElementSnapshot::read(session.driver(), node).await.unwrap();
            out.push(resolve(&session, node, &snapshot).await.unwrap());
        }
        manager.close(session).await.unwrap();
        out
    }

    mod precedence_tests {
        use super::*;

        #[tokio::test]
        async fn test_unique_id_wins() {
            let r = resolve_all(vec![MockElement::input("text")
                .id("email")
                .attr("name", "email")
                .attr("class", "field")])
            .await;
            assert_eq!(r[0].locator, Locator::id("email"));
            assert!(!r[0].unstable);
        }

        #[tokio::test]
        async fn test_duplicate_id_falls_to_class() {
            let r = resolve_all(vec![
                MockElement::input("text").id("dup").attr("class", "first"),
                MockElement::input("text").id("dup").attr("class", "second"),
            ])
            .await;
            assert_eq!(r[0].locator, Locator::class("first"));
            assert_eq!(r[1].locator, Locator::class("second"));
        }

        #[tokio::test]
        async fn test_multi_token_class_is_skipped() {
            let r = resolve_all(vec![MockElement::input("text")
                .attr("class", "form-control wide")
                .attr("name", "city")])
            .await;
            assert_eq!(r[0].locator, Locator::name("city"));
        }

        #[tokio::test]
        async fn test_shared_class_falls_to_name() {
            let r = resolve_all(vec![
                MockElement::input("text").attr("class", "f").attr("name", "a"),
                MockElement::input("text").attr("class", "f").attr("name", "b"),
            ])
            .await;
            assert_eq!(r[0].locator, Locator::name("a"));
            assert_eq!(r[1].locator, Locator::name("b"));
        }

        #[tokio::test]
        async fn test_unsafe_class_token_is_skipped() {
            let r = resolve_all(vec![MockElement::input("text").attr("class", "w-1/2")]).await;
            assert_eq!(r[0].locator.strategy(), LocatorStrategy::Xpath);
        }

        #[tokio::test]
        async fn test_nothing_unique_uses_xpath() {
            let r = resolve_all(vec![
                MockElement::button("Go").attr("name", "go"),
                MockElement::button("Go").attr("name", "go"),
            ])
            .await;
            assert_eq!(r[0].locator, Locator::xpath("/html[1]/body[1]/button[1]"));
            assert_eq!(r[1].locator, Locator::xpath("/html[1]/body[1]/button[2]"));
        }

        #[tokio::test]
        async fn test_xpath_short_circuits_at_unique_ancestor() {
            let r = resolve_all(vec![MockElement::new("form")
                .id("signup")
                .children([MockElement::input("text"), MockElement::input("text")])])
            .await;
            assert_eq!(r[1].locator, Locator::xpath("id(\"signup\")/input[2]"));
        }
    }

    mod unstable_tests {
        use super::*;

        #[tokio::test]
        async fn test_numeric_id_is_flagged_but_kept() {
            let r = resolve_all(vec![MockElement::input("text").id("12345").attr("name", "q")])
                .await;
            assert_eq!(r[0].locator, Locator::id("12345"));
            assert!(r[0].unstable);
        }

        #[tokio::test]
        async fn test_unstable_only_applies_to_id_strategy() {
            let r = resolve_all(vec![
                MockElement::input("text").id("42").attr("name", "a"),
                MockElement::input("text").id("42").attr("name", "b"),
            ])
            .await;
            assert_eq!(r[0].locator, Locator::name("a"));
            assert!(!r[0].unstable);
        }
    }

    mod candidate_tests {
        use super::*;

        #[test]
        fn test_single_class() {
            assert_eq!(single_class(Some("  btn  ")), Some("btn"));
            assert_eq!(single_class(Some("btn primary")), None);
            assert_eq!(single_class(Some("")), None);
            assert_eq!(single_class(None), None);
        }

        #[test]
        fn test_blank_attributes_ignored() {
            let snapshot = ElementSnapshot {
                id: Some("  ".into()),
                name: Some(String::new()),
                ..ElementSnapshot::default()
            };
            assert!(attribute_candidates(&snapshot).is_empty());
        }
    }
}

//! Element metadata classification.
//!
//! Everything the classifier needs is read from the live page once, into
//! an [`ElementSnapshot`]. From there on classification is a pure
//! function, so it cannot fail half-way and gives the same answer every
//! time for the same snapshot. Only field-name deduplication carries state
//! across elements ([`FieldNameRegistry`]).

use std::collections::HashSet;

use crate::driver::DomDriver;
use crate::record::{ElementType, SuggestedAction};
use crate::result::ScoutResult;

/// Longest visible text still used as a field name
pub const MAX_TEXT_NAME_LEN: usize = 40;

/// Identifiers a generated Java page object cannot use as field names
pub const JAVA_RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "record", "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "true", "try", "var", "void", "volatile", "while", "yield",
];

/// Attribute and text state of one element, read in a single pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    /// `type` attribute
    pub input_type: Option<String>,
    /// `id` attribute
    pub id: Option<String>,
    /// `name` attribute
    pub name: Option<String>,
    /// `class` attribute
    pub class: Option<String>,
    /// `data-testid` attribute
    pub test_id: Option<String>,
    /// `data-cy` attribute
    pub cy: Option<String>,
    /// `placeholder` attribute
    pub placeholder: Option<String>,
    /// `aria-label` attribute
    pub aria_label: Option<String>,
    /// `value` attribute
    pub value: Option<String>,
    /// Text of the `<label for>` pointing at this element's id
    pub label: Option<String>,
    /// Rendered text
    pub text: String,
}

impl ElementSnapshot {
    /// Read a node's state. Any failed read fails the whole snapshot.
    pub async fn read<D: DomDriver>(driver: &D, node: &D::Node) -> ScoutResult<Self> {
        let tag = driver.tag_name(node).await?.to_ascii_lowercase();
        let id = driver.attribute(node, "id").await?;
        let label = match id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => driver.label_for(id).await?,
            None => None,
        };
        let text = if tag == "input" {
            String::new()
        } else {
            driver.text(node).await?
        };

        Ok(Self {
            input_type: driver.attribute(node, "type").await?,
            name: driver.attribute(node, "name").await?,
            class: driver.attribute(node, "class").await?,
            test_id: driver.attribute(node, "data-testid").await?,
            cy: driver.attribute(node, "data-cy").await?,
            placeholder: driver.attribute(node, "placeholder").await?,
            aria_label: driver.attribute(node, "aria-label").await?,
            value: driver.attribute(node, "value").await?,
            tag,
            id,
            label,
            text,
        })
    }

    /// Control kind from tag and `type`
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        ElementType::from_tag(&self.tag, self.input_type.as_deref())
    }

    /// Caption a user sees on a clickable control
    fn visible_text(&self) -> Option<&str> {
        if self.element_type() != ElementType::Button {
            return None;
        }
        let text = if self.tag == "input" {
            self.value.as_deref()?
        } else {
            self.text.as_str()
        };
        Some(text.trim()).filter(|t| t.chars().count() <= MAX_TEXT_NAME_LEN)
    }

    /// Naming sources in precedence order
    fn name_sources(&self) -> [Option<&str>; 8] {
        [
            self.test_id.as_deref(),
            self.cy.as_deref(),
            self.name.as_deref(),
            self.id.as_deref(),
            self.placeholder.as_deref(),
            self.aria_label.as_deref(),
            self.label.as_deref(),
            self.visible_text(),
        ]
    }
}

/// Everything the classifier derives from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Sanitized name before deduplication
    pub base_name: String,
    /// The trimmed text the name came from
    pub label: String,
    /// Control kind
    pub element_type: ElementType,
    /// Implied action
    pub action: SuggestedAction,
    /// Placeholder input for `enterText`, empty otherwise
    pub sample_value: String,
}

/// Derive name, type, action and sample value for the `index`th candidate
#[must_use]
pub fn classify(snapshot: &ElementSnapshot, index: usize) -> Classification {
    let source = snapshot
        .name_sources()
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| s.chars().any(|c| c.is_ascii_alphanumeric()));

    let (base_name, label) = match source {
        Some(text) => (sanitize_field_name(text), text.to_string()),
        None => {
            let positional = format!("element{index}");
            (positional.clone(), positional)
        }
    };

    let element_type = snapshot.element_type();
    let action = element_type.action();
    let sample_value = match action {
        SuggestedAction::EnterText => sample_value(snapshot.input_type.as_deref()).to_string(),
        SuggestedAction::Click | SuggestedAction::Select => String::new(),
    };

    Classification {
        base_name,
        label,
        element_type,
        action,
        sample_value,
    }
}

/// Placeholder input for a text control of the given `type`
#[must_use]
pub fn sample_value(input_type: Option<&str>) -> &'static str {
    match input_type.map(str::to_ascii_lowercase).as_deref() {
        Some("email") => "test.user@example.com",
        Some("password") => "Password123!",
        Some("number") => "42",
        Some("tel") => "5550100",
        Some("url") => "https://example.com",
        Some("date") => "2024-01-01",
        _ => "sample input",
    }
}

/// Turn free text into a lowercase identifier safe for generated code
#[must_use]
pub fn sanitize_field_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    let mut name = name.trim_matches('_').to_string();

    if name.is_empty() {
        return "field".to_string();
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "field_");
    }
    if JAVA_RESERVED_WORDS.contains(&name.as_str()) {
        name.push_str("_field");
    }
    name
}

/// Field names already handed out in one run
#[derive(Debug, Default)]
pub struct FieldNameRegistry {
    taken: HashSet<String>,
}

impl FieldNameRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base`, or the first free `base_2`, `base_3`, …
    pub fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        let _ = self.taken.insert(candidate.clone());
        candidate
    }

    /// Number of names handed out
    #[must_use]
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// Whether no name was handed out yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

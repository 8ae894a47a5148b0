//! Discovery output: locator records, warnings and the run outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::{Locator, LocatorStrategy};

/// Kind of control, derived from tag name and `type` attribute only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Single-line text input
    Textbox,
    /// Multi-line text input
    Textarea,
    /// `<select>`
    Dropdown,
    /// Checkbox input
    Checkbox,
    /// Radio input
    Radiobutton,
    /// Anything clickable
    Button,
}

impl ElementType {
    /// Classify a node by tag and `type` attribute
    #[must_use]
    pub fn from_tag(tag: &str, input_type: Option<&str>) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "textarea" => Self::Textarea,
            "select" => Self::Dropdown,
            "input" => match input_type.map(str::to_ascii_lowercase).as_deref() {
                Some("checkbox") => Self::Checkbox,
                Some("radio") => Self::Radiobutton,
                Some("submit" | "button") => Self::Button,
                _ => Self::Textbox,
            },
            _ => Self::Button,
        }
    }

    /// Action a generated test performs on this kind of control
    #[must_use]
    pub const fn action(&self) -> SuggestedAction {
        match self {
            Self::Textbox | Self::Textarea => SuggestedAction::EnterText,
            Self::Dropdown => SuggestedAction::Select,
            Self::Checkbox | Self::Radiobutton | Self::Button => SuggestedAction::Click,
        }
    }

    /// Lowercase keyword
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Textbox => "textbox",
            Self::Textarea => "textarea",
            Self::Dropdown => "dropdown",
            Self::Checkbox => "checkbox",
            Self::Radiobutton => "radiobutton",
            Self::Button => "button",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction implied by an [`ElementType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestedAction {
    /// Type into the control
    EnterText,
    /// Click the control
    Click,
    /// Pick an option
    Select,
}

impl SuggestedAction {
    /// Keyword as used by the code generator
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnterText => "enterText",
            Self::Click => "click",
            Self::Select => "select",
        }
    }
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered interactive element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorRecord {
    /// Identifier usable as a variable name, unique within the run
    pub field_name: String,
    /// Human-readable text the name was derived from
    pub label: String,
    /// How to re-find the element
    pub locator_strategy: LocatorStrategy,
    /// Selector for `locator_strategy`
    pub locator_value: String,
    /// Kind of control
    pub element_type: ElementType,
    /// Interaction implied by `element_type`
    pub suggested_action: SuggestedAction,
    /// Placeholder input, empty unless the action is `enterText`
    pub sample_value: String,
    /// The chosen id looks framework-generated
    #[serde(default)]
    pub unstable: bool,
}

impl LocatorRecord {
    /// The record's locator
    #[must_use]
    pub fn locator(&self) -> Locator {
        Locator::new(self.locator_strategy, self.locator_value.clone())
    }

    /// `name | strategy=value`
    #[must_use]
    pub fn grounding_line(&self) -> String {
        format!(
            "{} | {}={}",
            self.field_name, self.locator_strategy, self.locator_value
        )
    }
}

/// A degraded path taken during a run that still produced records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DiscoveryWarning {
    /// The page never reported hydrated; enumeration ran on what was there
    HydrationTimeout {
        /// Time spent waiting
        waited_ms: u64,
    },
    /// One candidate could not be read and was left out
    ElementSkipped {
        /// Position among enumerated candidates
        index: usize,
        /// Why it was skipped
        reason: String,
    },
    /// The record's id locator may not survive a redeploy
    UnstableId {
        /// Record the id belongs to
        field_name: String,
        /// The id value
        id: String,
    },
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HydrationTimeout { waited_ms } => {
                write!(f, "page not hydrated after {waited_ms}ms")
            }
            Self::ElementSkipped { index, reason } => {
                write!(f, "element #{index} skipped: {reason}")
            }
            Self::UnstableId { field_name, id } => {
                write!(f, "{field_name} uses generated-looking id '{id}'")
            }
        }
    }
}

/// Everything one discovery run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOutcome {
    /// URL the records were collected from
    pub url: String,
    /// Records in document order
    pub records: Vec<LocatorRecord>,
    /// Degraded paths taken
    pub warnings: Vec<DiscoveryWarning>,
    /// The broadened query was used
    pub used_fallback_query: bool,
}

impl DiscoveryOutcome {
    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No records were produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any degraded path was taken
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Record by field name
    #[must_use]
    pub fn record(&self, field_name: &str) -> Option<&LocatorRecord> {
        self.records.iter().find(|r| r.field_name == field_name)
    }

    /// One `name | strategy=value` line per record, for LLM prompt grounding
    #[must_use]
    pub fn grounding_text(&self) -> String {
        self.records
            .iter()
            .map(LocatorRecord::grounding_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//! Summary data model

use serde::{Deserialize, Serialize};

/// A task or decision extracted from a meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    /// What needs to be done
    pub description: String,

    /// Person responsible, when the model named one
    pub owner: Option<String>,

    /// Deadline as the model phrased it
    pub due_hint: Option<String>,
}

impl ActionItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            owner: None,
            due_hint: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_due_hint(mut self, due_hint: impl Into<String>) -> Self {
        self.due_hint = Some(due_hint.into());
        self
    }
}

/// Terminal artifact of one pipeline run
///
/// `parse_succeeded` is false for a degraded result, whose `summary_text` is the
/// raw model reply and whose `action_items` is always empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary_text: String,
    pub action_items: Vec<ActionItem>,
    pub parse_succeeded: bool,
}

impl SummaryResult {
    /// A result parsed from the requested format
    pub fn structured(summary_text: impl Into<String>, action_items: Vec<ActionItem>) -> Self {
        Self {
            summary_text: summary_text.into(),
            action_items,
            parse_succeeded: true,
        }
    }

    /// Raw model text kept verbatim because it could not be parsed
    pub fn degraded(raw: impl Into<String>) -> Self {
        Self {
            summary_text: raw.into(),
            action_items: Vec::new(),
            parse_succeeded: false,
        }
    }
}

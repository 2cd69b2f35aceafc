use serde::{Deserialize, Serialize};

use crate::dom::selector::SelectorHint;
use crate::matching::field_model::Confidence;

// ============================================================================
// Fill audit trail
// ============================================================================

/// One field a fill attempted to change.
///
/// `confidence == Medium` marks the field for human review. When a select
/// could not be set safely the entry is still recorded with
/// `previous_value == new_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchedField {
    pub selector_hint: SelectorHint,
    pub previous_value: String,
    pub new_value: String,
    pub profile_key: String,
    pub confidence: Confidence,
}

impl TouchedField {
    pub fn changed(&self) -> bool {
        self.previous_value != self.new_value
    }
}

/// Complete record of one fill, retained for undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRun {
    pub run_id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub url: String,
    pub touched_fields: Vec<TouchedField>,
}

// ============================================================================
// Reports returned over the control protocol
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewField {
    pub label: String,
    pub profile_key: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub filled: usize,
    pub needs_review: usize,
    pub skipped: usize,
    pub review_fields: Vec<ReviewField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewField {
    pub label: String,
    pub profile_key: String,
    pub suggested_value: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub fields: Vec<PreviewField>,
    pub total_found: usize,
}

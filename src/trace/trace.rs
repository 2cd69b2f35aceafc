use chrono::Utc;
use serde::Serialize;

use crate::dom::selector::SelectorHint;
use crate::matching::field_model::Confidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOperation {
    Preview,
    Fill,
    Undo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome {
    Matched,
    NoMatch,
    Filled,
    NeedsReview,
    KeptExisting,
    UnsafeOption,
    Failed,
    Restored,
    NotRestored,
}

/// One line of the fill audit trail.
#[derive(Debug, Serialize)]
pub struct FillTraceEvent {
    pub timestamp_ms: i64,
    pub operation: TraceOperation,
    pub outcome: TraceOutcome,

    pub selector: Option<String>,
    pub profile_key: Option<String>,
    pub confidence: Option<Confidence>,
    pub run_id: Option<String>,
}

impl FillTraceEvent {
    pub fn now(operation: TraceOperation, outcome: TraceOutcome) -> Self {
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            operation,
            outcome,
            selector: None,
            profile_key: None,
            confidence: None,
            run_id: None,
        }
    }

    pub fn with_selector(mut self, selector: &SelectorHint) -> Self {
        self.selector = Some(selector.to_string());
        self
    }

    pub fn with_profile_key(mut self, key: impl ToString) -> Self {
        self.profile_key = Some(key.to_string());
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_run_id(mut self, run_id: impl ToString) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }
}

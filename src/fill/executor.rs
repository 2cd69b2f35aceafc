use tracing::{debug, warn};

use crate::dom::host::{FillMarker, HostError, PageHost};
use crate::fill::fill_model::TouchedField;
use crate::matching::field_model::{Confidence, FieldKind, MatchedField};
use crate::matching::option_scorer::choose_option;

// ============================================================================
// Fill Executor
// ============================================================================

/// Outcome of filling a single matched field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// Field already had a value and overwrite is off. Nothing written.
    Skipped,
    /// Value written and committed.
    Written(TouchedField),
    /// No option could be chosen safely. Value left as is, field flagged.
    Unsafe(TouchedField),
}

impl FillOutcome {
    pub fn touched(&self) -> Option<&TouchedField> {
        match self {
            FillOutcome::Skipped => None,
            FillOutcome::Written(t) | FillOutcome::Unsafe(t) => Some(t),
        }
    }

    pub fn into_touched(self) -> Option<TouchedField> {
        match self {
            FillOutcome::Skipped => None,
            FillOutcome::Written(t) | FillOutcome::Unsafe(t) => Some(t),
        }
    }
}

/// Write `field.suggested_value` into the page.
pub fn fill_field(
    host: &mut dyn PageHost,
    field: &MatchedField,
    overwrite_existing: bool,
) -> Result<FillOutcome, HostError> {
    if !overwrite_existing && !field.current_value.is_empty() {
        debug!(selector = %field.selector, "keeping existing value");
        return Ok(FillOutcome::Skipped);
    }

    let previous_value = host.read_value(field.node)?;

    let target = match field.kind {
        FieldKind::Select => {
            choose_option(&field.options, &field.suggested_value, &field.label_text).map(|o| o.value)
        }
        _ => Some(field.suggested_value.clone()),
    };

    let Some(target) = target else {
        mark(host, field, FillMarker::NeedsReview);
        return Ok(FillOutcome::Unsafe(TouchedField {
            selector_hint: field.selector.clone(),
            previous_value: previous_value.clone(),
            new_value: previous_value,
            profile_key: field.profile_key.to_string(),
            confidence: Confidence::Medium,
        }));
    };

    host.commit_value(field.node, &target)?;

    let marker = match field.confidence {
        Confidence::High => FillMarker::Filled,
        _ => FillMarker::NeedsReview,
    };
    mark(host, field, marker);

    Ok(FillOutcome::Written(TouchedField {
        selector_hint: field.selector.clone(),
        previous_value,
        new_value: host.read_value(field.node).unwrap_or(target),
        profile_key: field.profile_key.to_string(),
        confidence: field.confidence,
    }))
}

/// Marker failures are logged only; a committed value stays touched.
fn mark(host: &mut dyn PageHost, field: &MatchedField, marker: FillMarker) {
    if let Err(e) = host.set_marker(field.node, marker) {
        warn!(selector = %field.selector, error = %e, "could not mark field");
    }
}

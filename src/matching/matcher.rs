use tracing::debug;

use crate::matching::field_mappings::{FIELD_MAPPINGS, FieldMapping};
use crate::matching::field_model::{Confidence, MatchedField, ScannedField};
use crate::matching::normalize::normalize_text;
use crate::profile::profile_model::UserProfile;

// ============================================================================
// Synonym Matcher
// ============================================================================

/// Match one scanned field against the dictionary.
///
/// Mappings are tried in declaration order; the first compatible mapping
/// that matches *and* has a non-empty profile value wins.
pub fn match_field_to_profile(field: &ScannedField, profile: &UserProfile) -> Option<MatchedField> {
    match_field_with(field, profile, FIELD_MAPPINGS)
}

/// Same as `match_field_to_profile`, over an explicit dictionary.
pub fn match_field_with(
    field: &ScannedField,
    profile: &UserProfile,
    mappings: &'static [FieldMapping],
) -> Option<MatchedField> {
    let candidates = label_candidates(field);
    if candidates.is_empty() {
        return None;
    }

    for mapping in mappings {
        if !mapping.accepts(field.kind) {
            continue;
        }

        let confidence = score_mapping(&candidates, mapping);
        if confidence == Confidence::None {
            continue;
        }

        let suggested_value = profile.value_at(mapping.profile_key);
        if suggested_value.is_empty() {
            debug!(
                key = mapping.profile_key,
                selector = %field.selector,
                "mapping matched but profile value is empty"
            );
            continue;
        }

        debug!(
            key = mapping.profile_key,
            selector = %field.selector,
            ?confidence,
            "field matched"
        );

        return Some(MatchedField {
            node: field.node,
            selector: field.selector.clone(),
            profile_key: mapping.profile_key,
            confidence,
            kind: field.kind,
            current_value: field.current_value.clone(),
            suggested_value: suggested_value.to_string(),
            label_text: display_label(field, mapping),
            options: field.options.clone(),
        });
    }

    None
}

/// Normalized label, aria-label, name, id and placeholder; empties dropped.
pub fn label_candidates(field: &ScannedField) -> Vec<String> {
    [
        &field.label_text,
        &field.aria_label,
        &field.name,
        &field.id,
        &field.placeholder,
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .map(|s| normalize_text(s))
    .filter(|s| !s.is_empty())
    .collect()
}

/// Exact equality is `High` and ends the search; containment in either
/// direction is `Medium`.
fn score_mapping(candidates: &[String], mapping: &FieldMapping) -> Confidence {
    let mut confidence = Confidence::None;

    for candidate in candidates {
        for synonym in mapping.synonyms {
            if candidate == synonym {
                return Confidence::High;
            }
            if candidate.contains(synonym) || synonym.contains(candidate.as_str()) {
                confidence = Confidence::Medium;
            }
        }
    }

    confidence
}

fn display_label(field: &ScannedField, mapping: &FieldMapping) -> String {
    [&field.label_text, &field.aria_label, &field.name]
        .into_iter()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| mapping.profile_key.to_string())
}

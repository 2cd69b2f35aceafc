use serde::{Deserialize, Serialize};

use crate::dom::dom_model::{NodeId, SelectOption};
use crate::dom::selector::SelectorHint;

/// Kind of form control, as the dictionary names compatible kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Url,
    Select,
    Textarea,
    Radio,
}

impl FieldKind {
    /// Kinds that a "text" mapping must not claim.
    pub fn is_specially_typed(self) -> bool {
        !matches!(self, FieldKind::Text)
    }

    /// Kind for an `input` with the given `type` attribute, if it is a
    /// free-text input this crate fills.
    pub fn from_input_type(input_type: Option<&str>) -> Option<FieldKind> {
        match input_type.map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("text") => Some(FieldKind::Text),
            Some("email") => Some(FieldKind::Email),
            Some("tel") => Some(FieldKind::Tel),
            Some("url") => Some(FieldKind::Url),
            _ => None,
        }
    }
}

/// Strength of a label-to-profile-key match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Medium,
    High,
}

/// One eligible control found by a scan. Valid for the snapshot it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedField {
    pub node: NodeId,
    pub selector: SelectorHint,
    pub label_text: String,
    pub aria_label: String,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub kind: FieldKind,
    pub current_value: String,
    /// Populated for `Select` fields only.
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedField {
    pub node: NodeId,
    pub selector: SelectorHint,
    pub profile_key: &'static str,
    pub confidence: Confidence,
    pub kind: FieldKind,
    pub current_value: String,
    pub suggested_value: String,
    pub label_text: String,
    pub options: Vec<SelectOption>,
}

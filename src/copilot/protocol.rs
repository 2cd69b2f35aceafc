use serde::{Deserialize, Serialize};

use crate::copilot::page_context::PageContext;
use crate::fill::fill_model::{FillReport, PreviewResult};
use crate::profile::profile_model::ApplicationHistoryEntry;

// ============================================================================
// Control protocol: one request in flight per controller
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    GetPageContext,
    PreviewFields,
    #[serde(rename_all = "camelCase")]
    FillFields {
        overwrite_existing: bool,
    },
    UndoLastFill,
    CheckConfirmation,
    MarkAsApplied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    PageContext(PageContext),
    Preview(PreviewResult),
    Fill(FillReport),
    Undo {
        success: bool,
    },
    Confirmation {
        #[serde(rename = "isConfirmation")]
        is_confirmation: bool,
    },
    Applied {
        entry: ApplicationHistoryEntry,
    },
}

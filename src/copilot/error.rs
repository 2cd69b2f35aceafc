use thiserror::Error;

use crate::dom::host::HostError;
use crate::storage::store::StoreError;

/// Failures that abort a control-protocol operation.
///
/// Match misses, empty profile values and unsafe option sets are outcomes,
/// not errors; they show up in reports.
#[derive(Debug, Error)]
pub enum CopilotError {
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("page host failed: {0}")]
    Host(#[from] HostError),
}

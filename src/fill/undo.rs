use tracing::{info, warn};

use crate::dom::host::PageHost;
use crate::dom::selector::SelectorHint;
use crate::fill::fill_model::{FillRun, TouchedField};
use crate::storage::store::{KeyValueStore, StoreError, get_record, set_record};

pub const LAST_FILL_RUN_KEY: &str = "copilot_last_fill";

/// Result of one revert attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoReport {
    pub restored: usize,
    /// Fields whose selector no longer resolves, or whose restore failed.
    pub missed: Vec<SelectorHint>,
}

impl UndoReport {
    pub fn success(&self) -> bool {
        self.restored > 0
    }
}

// ============================================================================
// Undo Log: single slot holding the most recent FillRun
// ============================================================================

/// Owns the "last fill run" slot in a store.
///
/// Whoever holds the `UndoLog` decides how operations interleave: with
/// `&mut` access at the controller, fill and undo cannot overlap.
pub struct UndoLog<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> UndoLog<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, LAST_FILL_RUN_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    /// Replace whatever the slot holds.
    pub fn record(&self, run: &FillRun) -> Result<(), StoreError> {
        set_record(&self.store, &self.key, run)
    }

    pub fn load(&self) -> Result<Option<FillRun>, StoreError> {
        get_record(&self.store, &self.key)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }

    /// Restore every recorded field that still resolves, then empty the
    /// slot. Per-field host failures are logged and skipped; only store
    /// failures abort.
    pub fn revert(&self, host: &mut dyn PageHost) -> Result<UndoReport, StoreError> {
        let Some(run) = self.load()? else {
            return Ok(UndoReport::default());
        };

        let mut report = UndoReport::default();
        for field in &run.touched_fields {
            match restore_field(host, field) {
                Ok(true) => report.restored += 1,
                Ok(false) => {
                    warn!(selector = %field.selector_hint, "field no longer present, not restored");
                    report.missed.push(field.selector_hint.clone());
                }
                Err(e) => {
                    warn!(selector = %field.selector_hint, error = %e, "failed to restore field");
                    report.missed.push(field.selector_hint.clone());
                }
            }
        }

        self.clear()?;
        info!(
            run_id = %run.run_id,
            restored = report.restored,
            missed = report.missed.len(),
            "fill run reverted"
        );
        Ok(report)
    }
}

fn restore_field(host: &mut dyn PageHost, field: &TouchedField) -> Result<bool, crate::dom::host::HostError> {
    let Some(node) = host.resolve(&field.selector_hint)? else {
        return Ok(false);
    };
    host.commit_value(node, &field.previous_value)?;
    host.clear_markers(node)?;
    Ok(true)
}

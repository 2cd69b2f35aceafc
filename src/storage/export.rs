use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::profile_model::{ApplicationHistoryEntry, Settings, UserProfile};
use crate::storage::records::Storage;
use crate::storage::store::{KeyValueStore, StoreError};

pub const EXPORT_VERSION: &str = "1.0.0";

// ============================================================================
// Full-state JSON snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub export_date: String,
    pub version: String,
    pub profile: UserProfile,
    pub settings: Settings,
    pub history: Vec<ApplicationHistoryEntry>,
}

pub fn export_snapshot<S: KeyValueStore>(storage: &Storage<S>, now: DateTime<Utc>) -> Result<ExportSnapshot, StoreError> {
    Ok(ExportSnapshot {
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: EXPORT_VERSION.to_string(),
        profile: storage.get_profile()?,
        settings: storage.get_settings()?,
        history: storage.get_history()?,
    })
}

/// Pretty-printed JSON of everything the user owns.
pub fn export_all_data<S: KeyValueStore>(storage: &Storage<S>, now: DateTime<Utc>) -> Result<String, StoreError> {
    let snapshot = export_snapshot(storage, now)?;
    serde_json::to_string_pretty(&snapshot).map_err(|source| StoreError::Serde {
        key: "export".into(),
        source,
    })
}

/// Restore profile, settings and history from an export document.
/// Records are stored exactly as exported.
pub fn import_all_data<S: KeyValueStore>(storage: &Storage<S>, json: &str) -> Result<ExportSnapshot, StoreError> {
    let snapshot: ExportSnapshot = serde_json::from_str(json).map_err(|source| StoreError::Serde {
        key: "import".into(),
        source,
    })?;
    storage.put_profile(&snapshot.profile)?;
    storage.save_settings(&snapshot.settings)?;
    storage.put_history(&snapshot.history)?;
    Ok(snapshot)
}

// ============================================================================
// History CSV
// ============================================================================

pub const CSV_HEADERS: [&str; 7] = [
    "Company",
    "Role",
    "Status",
    "Applied Date",
    "URL",
    "Portal Domain",
    "Notes",
];

pub fn history_to_csv(history: &[ApplicationHistoryEntry]) -> String {
    let mut lines = vec![CSV_HEADERS.join(",")];

    for entry in history {
        let applied = DateTime::<Utc>::from_timestamp_millis(entry.applied_date)
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        let row = [
            entry.company.as_str(),
            entry.role.as_str(),
            entry.status.as_str(),
            applied.as_str(),
            entry.url.as_str(),
            entry.portal_domain.as_str(),
            entry.notes.as_str(),
        ];
        lines.push(
            row.iter()
                .map(|field| escape_csv_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

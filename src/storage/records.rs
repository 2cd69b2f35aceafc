use chrono::Utc;

use crate::profile::profile_model::{ApplicationHistoryEntry, HistoryUpdate, Settings, UserProfile};
use crate::storage::store::{KeyValueStore, StoreError, get_record, set_record};

pub const PROFILE_KEY: &str = "copilot_profile";
pub const SETTINGS_KEY: &str = "copilot_settings";
pub const HISTORY_KEY: &str = "copilot_history";

/// Typed access to the profile, settings and history records.
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- Profile ----

    pub fn get_profile(&self) -> Result<UserProfile, StoreError> {
        Ok(get_record(&self.store, PROFILE_KEY)?.unwrap_or_default())
    }

    /// Save and stamp `last_updated` with the current time.
    pub fn save_profile(&self, profile: &mut UserProfile) -> Result<(), StoreError> {
        profile.last_updated = Utc::now().timestamp_millis();
        set_record(&self.store, PROFILE_KEY, profile)
    }

    /// Save without touching `last_updated` (imports).
    pub fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        set_record(&self.store, PROFILE_KEY, profile)
    }

    // ---- Settings ----

    pub fn get_settings(&self) -> Result<Settings, StoreError> {
        Ok(get_record(&self.store, SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        set_record(&self.store, SETTINGS_KEY, settings)
    }

    // ---- History (newest first) ----

    pub fn get_history(&self) -> Result<Vec<ApplicationHistoryEntry>, StoreError> {
        Ok(get_record(&self.store, HISTORY_KEY)?.unwrap_or_default())
    }

    pub fn put_history(&self, history: &[ApplicationHistoryEntry]) -> Result<(), StoreError> {
        set_record(&self.store, HISTORY_KEY, &history)
    }

    pub fn add_history_entry(&self, entry: ApplicationHistoryEntry) -> Result<(), StoreError> {
        let mut history = self.get_history()?;
        history.insert(0, entry);
        self.put_history(&history)
    }

    /// Returns whether an entry with `id` existed.
    pub fn update_history_entry(&self, id: &str, update: HistoryUpdate) -> Result<bool, StoreError> {
        let mut history = self.get_history()?;
        let Some(entry) = history.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        update.apply(entry);
        self.put_history(&history)?;
        Ok(true)
    }

    /// Returns whether an entry with `id` existed.
    pub fn delete_history_entry(&self, id: &str) -> Result<bool, StoreError> {
        let mut history = self.get_history()?;
        let before = history.len();
        history.retain(|e| e.id != id);
        if history.len() == before {
            return Ok(false);
        }
        self.put_history(&history)?;
        Ok(true)
    }

    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}

use std::collections::HashMap;

use thiserror::Error;

use crate::database::DatabaseError;
use crate::models::WeekData;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Failed to serialize week: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// String key-value storage holding one JSON document per week
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, used for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves `WeekData` records through a `KeyValueStore`
pub struct PlannerStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PlannerStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Load the week stored under `week_key`
    ///
    /// Never fails: a missing key, a read error or an unparseable document all
    /// yield the default week. Stored records are completed field by field
    /// from the defaults.
    pub fn load(&self, week_key: &str) -> WeekData {
        let raw = match self.store.get(week_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(week_key, "no stored week, using defaults");
                return WeekData::default();
            }
            Err(e) => {
                tracing::warn!(week_key, error = %e, "failed to read week, using defaults");
                return WeekData::default();
            }
        };

        match serde_json::from_str::<WeekData>(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(week_key, error = %e, "stored week is not valid, using defaults");
                WeekData::default()
            }
        }
    }

    /// Serialize `data` and overwrite whatever is stored under `week_key`
    pub fn save(&mut self, week_key: &str, data: &WeekData) -> Result<(), StoreError> {
        let json = serde_json::to_string(data)?;
        self.store.set(week_key, &json)?;
        tracing::debug!(week_key, bytes = json.len(), "week saved");
        Ok(())
    }

    /// Overwrite the week with the default record and return it
    pub fn reset(&mut self, week_key: &str) -> Result<WeekData, StoreError> {
        let data = WeekData::default();
        self.save(week_key, &data)?;
        tracing::info!(week_key, "week reset to defaults");
        Ok(data)
    }
}

//! Typed JSON slots for learner progress.
//!
//! Reads never fail: a missing, unreadable or malformed slot yields the
//! caller's default. Writes never fail either: errors are logged and the
//! in-memory state stays authoritative for the session.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use curriculum_core::model::{ModuleId, ProgressSlice, ProgressState, SectionMap};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::KeyValueStore;

/// Fixed slot names, one per persisted slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey(&'static str);

impl SlotKey {
    pub const SECTION_PROGRESS: Self = Self("curriculum.section_progress");
    pub const COMPLETED_MODULES: Self = Self("curriculum.completed_modules");
    pub const BOOKMARKS: Self = Self("curriculum.bookmarks");

    #[must_use]
    pub fn for_slice(slice: ProgressSlice) -> Self {
        match slice {
            ProgressSlice::SectionProgress => Self::SECTION_PROGRESS,
            ProgressSlice::CompletedModules => Self::COMPLETED_MODULES,
            ProgressSlice::Bookmarks => Self::BOOKMARKS,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

#[derive(Clone)]
pub struct ProgressAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressAdapter {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read a slot, falling back to `default` when it is absent or unusable.
    pub async fn load<T: DeserializeOwned>(&self, key: SlotKey, default: T) -> T {
        let raw = match self.store.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(slot = key.as_str(), "slot absent, using default");
                return default;
            }
            Err(err) => {
                tracing::warn!(slot = key.as_str(), error = %err, "failed to read slot, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(slot = key.as_str(), error = %err, "malformed slot, using default");
                default
            }
        }
    }

    /// Serialize and write a slot. Returns whether the value was persisted.
    pub async fn save<T: Serialize + ?Sized>(&self, key: SlotKey, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(slot = key.as_str(), error = %err, "failed to encode slot");
                return false;
            }
        };

        match self.store.put(key.as_str(), &raw).await {
            Ok(()) => {
                tracing::debug!(slot = key.as_str(), bytes = raw.len(), "slot saved");
                true
            }
            Err(err) => {
                tracing::warn!(
                    slot = key.as_str(),
                    error = %err,
                    "failed to persist slot; change is kept in memory only"
                );
                false
            }
        }
    }

    /// Remove a slot. Returns whether the removal reached storage.
    pub async fn clear(&self, key: SlotKey) -> bool {
        match self.store.remove(key.as_str()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(slot = key.as_str(), error = %err, "failed to clear slot");
                false
            }
        }
    }

    /// Rehydrate all three slices. Each slot falls back independently.
    pub async fn load_state(&self) -> ProgressState {
        let module_progress: BTreeMap<ModuleId, SectionMap> =
            self.load(SlotKey::SECTION_PROGRESS, BTreeMap::new()).await;
        let completed: BTreeSet<ModuleId> =
            self.load(SlotKey::COMPLETED_MODULES, BTreeSet::new()).await;
        let bookmarks: BTreeSet<ModuleId> = self.load(SlotKey::BOOKMARKS, BTreeSet::new()).await;
        ProgressState::from_persisted(module_progress, completed, bookmarks)
    }

    /// Write the current value of one slice.
    pub async fn save_slice(&self, slice: ProgressSlice, state: &ProgressState) -> bool {
        let key = SlotKey::for_slice(slice);
        match slice {
            ProgressSlice::SectionProgress => self.save(key, state.module_progress()).await,
            ProgressSlice::CompletedModules => self.save(key, state.completed()).await,
            ProgressSlice::Bookmarks => self.save(key, state.bookmarks()).await,
        }
    }

    /// Remove every progress slot.
    pub async fn clear_all(&self) -> bool {
        let mut cleared = true;
        for slice in ProgressSlice::ALL {
            cleared &= self.clear(SlotKey::for_slice(slice)).await;
        }
        cleared
    }
}

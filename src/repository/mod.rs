//! Repository layer: one cached record per repository, layered on [`FileStore`].
//!
//! - [`PetRepository`] - companion state plus leveling and feeding rules
//! - [`InventoryRepository`] - item catalog with consumption and restocking
//! - [`SettingsRepository`] - application preferences
//!
//! Each repository owns a single-slot cache. Domain operations run as one
//! load → mutate → save sequence against that cache; call `clear_cache` to pick up
//! changes made to the file by something other than this process.

pub mod inventory;
pub mod pet;
pub mod settings;

pub use inventory::InventoryRepository;
pub use pet::PetRepository;
pub use settings::SettingsRepository;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::StoreResult;
use crate::storage::FileStore;
use crate::types::{AppSettings, InventoryData, PetState};

/// A top-level persisted document with its own file and update stamp.
pub trait Record: Serialize + DeserializeOwned + Clone + Default {
    const FILE_NAME: &'static str;

    fn last_updated(&self) -> DateTime<Utc>;
    fn set_last_updated(&mut self, at: DateTime<Utc>);
}

impl Record for PetState {
    const FILE_NAME: &'static str = "pet.json";

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }
}

impl Record for InventoryData {
    const FILE_NAME: &'static str = "inventory.json";

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }
}

impl Record for AppSettings {
    const FILE_NAME: &'static str = "settings.json";

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }
}

/// Cache-plus-persistence for a single record type.
#[derive(Debug)]
pub struct Repository<T: Record> {
    store: Arc<FileStore>,
    cache: Option<T>,
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<FileStore>) -> Self {
        Repository { store, cache: None }
    }

    pub fn store(&self) -> &Arc<FileStore> {
        &self.store
    }

    /// Borrow the record, reading (or seeding) it from disk on a cache miss.
    pub async fn get(&mut self) -> StoreResult<&T> {
        if self.cache.is_none() {
            let record = self.store.read_json(T::FILE_NAME, T::default()).await?;
            self.cache = Some(record);
        }
        // Populated above
        Ok(self.cache.get_or_insert_with(T::default))
    }

    pub async fn load(&mut self) -> StoreResult<T> {
        self.get().await.cloned()
    }

    /// Stamp `lastUpdated`, replace the cache, and write the record atomically.
    ///
    /// The stamp never moves backwards relative to the cached copy, even if the wall
    /// clock does.
    pub async fn save(&mut self, mut value: T) -> StoreResult<()> {
        let now = Utc::now();
        let stamp = match &self.cache {
            Some(previous) => now.max(previous.last_updated()),
            None => now,
        };
        value.set_last_updated(stamp);
        self.cache = Some(value.clone());
        self.store.write_json(T::FILE_NAME, &value).await
    }

    /// Load, apply `mutate` to a working copy, and save it once.
    ///
    /// If `mutate` fails nothing is saved and the cache keeps the unmodified record.
    pub async fn modify<R>(
        &mut self,
        mutate: impl FnOnce(&mut T) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut working = self.get().await?.clone();
        let result = mutate(&mut working)?;
        self.save(working).await?;
        Ok(result)
    }

    pub fn cached(&self) -> Option<&T> {
        self.cache.as_ref()
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }
}

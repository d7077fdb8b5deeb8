//! # Service facade - request surface for the hosting shell
//!
//! [`PetService`] owns the three repositories over one storage root and exposes every
//! operation as a call returning a [`Reply`]: success with data, or failure with a
//! message. Errors are logged here and never escape as panics, so a UI or transport
//! layer can forward replies verbatim.
//!
//! ```rust,no_run
//! use deskpet::service::PetService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = PetService::open("./deskpet-data");
//!     let reply = service.add_experience(120).await;
//!     if reply.success {
//!         println!("leveled up: {:?}", reply.data);
//!     }
//! }
//! ```

use log::error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::errors::StoreResult;
use crate::repository::settings::{SettingsKey, SettingsPatch, SettingsSection};
use crate::repository::{InventoryRepository, PetRepository, SettingsRepository};
use crate::storage::{BackupInfo, FileStore};
use crate::types::{AppSettings, InventoryItem, ItemEffect, ItemType, PetState, StatusPatch};

/// Tagged result handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Reply {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Reply {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    fn from_result(operation: &str, result: StoreResult<T>) -> Self {
        match result {
            Ok(data) => Reply::ok(data),
            Err(e) => {
                error!("Failed to {}: {}", operation, e);
                Reply::failed(e.to_string())
            }
        }
    }
}

/// Outcome of [`PetService::feed_with_item`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedOutcome {
    /// The item after consumption (count already decremented)
    pub item: InventoryItem,
    pub pet: PetState,
}

pub struct PetService {
    store: Arc<FileStore>,
    pet: PetRepository,
    inventory: InventoryRepository,
    settings: SettingsRepository,
}

impl PetService {
    /// Bind repositories to a storage root. Directories are created on first use.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self::with_store(Arc::new(FileStore::new(root)))
    }

    pub fn with_store(store: Arc<FileStore>) -> Self {
        PetService {
            pet: PetRepository::new(store.clone()),
            inventory: InventoryRepository::new(store.clone()),
            settings: SettingsRepository::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<FileStore> {
        &self.store
    }

    pub fn pet(&mut self) -> &mut PetRepository {
        &mut self.pet
    }

    pub fn inventory(&mut self) -> &mut InventoryRepository {
        &mut self.inventory
    }

    pub fn settings(&mut self) -> &mut SettingsRepository {
        &mut self.settings
    }

    /// Drop every cached record so the next call re-reads from disk.
    pub fn clear_caches(&mut self) {
        self.pet.clear_cache();
        self.inventory.clear_cache();
        self.settings.clear_cache();
    }

    // ---- pet -------------------------------------------------------------

    pub async fn load_pet(&mut self) -> Reply<PetState> {
        Reply::from_result("load pet data", self.pet.load().await)
    }

    pub async fn save_pet(&mut self, state: PetState) -> Reply<()> {
        Reply::from_result("save pet data", self.pet.save(state).await)
    }

    pub async fn update_status(&mut self, patch: StatusPatch) -> Reply<()> {
        Reply::from_result("update pet status", self.pet.update_status(patch).await)
    }

    pub async fn add_experience(&mut self, amount: u64) -> Reply<bool> {
        Reply::from_result("add experience", self.pet.add_experience(amount).await)
    }

    pub async fn feed(&mut self, item_id: &str, effect: ItemEffect) -> Reply<()> {
        Reply::from_result("feed pet", self.pet.feed(item_id, effect).await)
    }

    /// Consume one `item_id` and apply its effect to the pet.
    ///
    /// The item's effect is validated before anything is consumed. Past that point the
    /// call is not atomic across the two records: the inventory save lands first, and if
    /// the pet save then fails the item stays consumed and the failure is reported.
    pub async fn feed_with_item(&mut self, item_id: &str) -> Reply<FeedOutcome> {
        let checked = match self.inventory.get_item(item_id).await {
            Ok(Some(item)) => item.effect.validate(),
            Ok(None) => return Reply::failed(format!("item {} is not usable", item_id)),
            Err(e) => Err(e),
        };
        if let Err(e) = checked {
            return Reply::from_result("use item", Err(e));
        }
        let item = match self.inventory.use_item(item_id).await {
            Ok(Some(item)) => item,
            Ok(None) => return Reply::failed(format!("item {} is not usable", item_id)),
            Err(e) => return Reply::from_result("use item", Err(e)),
        };
        let fed = async {
            self.pet.feed(item_id, item.effect).await?;
            self.pet.load().await
        }
        .await;
        match fed {
            Ok(pet) => Reply::ok(FeedOutcome { item, pet }),
            Err(e) => {
                error!(
                    "Item {} was consumed but feeding failed; records may disagree: {}",
                    item_id, e
                );
                Reply::failed(e.to_string())
            }
        }
    }

    // ---- inventory -------------------------------------------------------

    pub async fn inventory_items(&mut self) -> Reply<Vec<InventoryItem>> {
        Reply::from_result("get inventory items", self.inventory.get_all_items().await)
    }

    pub async fn inventory_items_by_type(&mut self, kind: ItemType) -> Reply<Vec<InventoryItem>> {
        Reply::from_result(
            "get inventory items by type",
            self.inventory.get_items_by_type(kind).await,
        )
    }

    pub async fn inventory_item(&mut self, item_id: &str) -> Reply<Option<InventoryItem>> {
        Reply::from_result("get inventory item", self.inventory.get_item(item_id).await)
    }

    pub async fn use_item(&mut self, item_id: &str) -> Reply<Option<InventoryItem>> {
        Reply::from_result("use item", self.inventory.use_item(item_id).await)
    }

    pub async fn add_item(&mut self, item_id: &str, count: u32) -> Reply<bool> {
        Reply::from_result("add item", self.inventory.add_item(item_id, count).await)
    }

    // ---- settings --------------------------------------------------------

    pub async fn load_settings(&mut self) -> Reply<AppSettings> {
        Reply::from_result("load settings", self.settings.load().await)
    }

    pub async fn get_setting(&mut self, key: SettingsKey) -> Reply<SettingsSection> {
        Reply::from_result("get setting", self.settings.get(key).await)
    }

    pub async fn set_setting(&mut self, value: SettingsSection) -> Reply<()> {
        Reply::from_result("set setting", self.settings.set(value).await)
    }

    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Reply<()> {
        Reply::from_result("update settings", self.settings.update(patch).await)
    }

    pub async fn reset_settings(&mut self) -> Reply<()> {
        Reply::from_result("reset settings", self.settings.reset().await)
    }

    // ---- recovery --------------------------------------------------------

    pub async fn list_backups(&self) -> Reply<Vec<BackupInfo>> {
        Reply::from_result("list backups", self.store.list_backups().await)
    }

    /// Restore a snapshot over a live record and drop all caches.
    pub async fn restore_backup(&mut self, backup_name: &str, target: &str) -> Reply<()> {
        let result = self.store.restore(backup_name, target).await;
        if result.is_ok() {
            self.clear_caches();
        }
        Reply::from_result("restore backup", result)
    }
}

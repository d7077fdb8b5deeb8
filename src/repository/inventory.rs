//! Inventory repository: catalog projections, consumption, and restocking.

use log::{info, warn};
use std::sync::Arc;

use super::Repository;
use crate::errors::StoreResult;
use crate::storage::FileStore;
use crate::types::{InventoryData, InventoryItem, ItemType};

pub struct InventoryRepository {
    repo: Repository<InventoryData>,
}

impl InventoryRepository {
    pub fn new(store: Arc<FileStore>) -> Self {
        InventoryRepository {
            repo: Repository::new(store),
        }
    }

    pub async fn load(&mut self) -> StoreResult<InventoryData> {
        self.repo.load().await
    }

    pub async fn save(&mut self, data: InventoryData) -> StoreResult<()> {
        self.repo.save(data).await
    }

    pub fn clear_cache(&mut self) {
        self.repo.clear_cache();
    }

    /// Increase the count of an existing catalog entry.
    ///
    /// Unknown ids are not created; the call logs a warning and returns `false`
    /// without writing anything.
    pub async fn add_item(&mut self, item_id: &str, count: u32) -> StoreResult<bool> {
        if self.repo.get().await?.find(item_id).is_none() {
            warn!("Item {} not found in inventory catalog", item_id);
            return Ok(false);
        }
        self.repo
            .modify(|data| {
                if let Some(item) = data.find_mut(item_id) {
                    item.count = item.count.saturating_add(count);
                }
                Ok(())
            })
            .await?;
        Ok(true)
    }

    /// Consume one unit of `item_id`.
    ///
    /// Returns `None` (and writes nothing) when the item is absent or already at zero.
    /// Otherwise returns the item as it stands after the decrement; an item that hits
    /// zero is removed from the collection.
    pub async fn use_item(&mut self, item_id: &str) -> StoreResult<Option<InventoryItem>> {
        let usable = self
            .repo
            .get()
            .await?
            .find(item_id)
            .is_some_and(|item| item.count > 0);
        if !usable {
            return Ok(None);
        }
        let used = self
            .repo
            .modify(|data| {
                let Some(index) = data.items.iter().position(|i| i.id == item_id) else {
                    return Ok(None);
                };
                let item = &mut data.items[index];
                item.count -= 1;
                let snapshot = item.clone();
                if snapshot.count == 0 {
                    data.items.remove(index);
                    info!("Item {} used up and removed", item_id);
                }
                Ok(Some(snapshot))
            })
            .await?;
        Ok(used)
    }

    pub async fn get_all_items(&mut self) -> StoreResult<Vec<InventoryItem>> {
        Ok(self.repo.get().await?.items.clone())
    }

    pub async fn get_items_by_type(&mut self, kind: ItemType) -> StoreResult<Vec<InventoryItem>> {
        Ok(self
            .repo
            .get()
            .await?
            .items
            .iter()
            .filter(|i| i.kind == kind)
            .cloned()
            .collect())
    }

    pub async fn get_item(&mut self, item_id: &str) -> StoreResult<Option<InventoryItem>> {
        Ok(self.repo.get().await?.find(item_id).cloned())
    }
}

//! Companion state repository: status updates, leveling, and feeding.

use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

use super::{Record, Repository};
use crate::errors::StoreResult;
use crate::storage::FileStore;
use crate::types::{ItemEffect, PetState, StatusPatch};

pub struct PetRepository {
    repo: Repository<PetState>,
}

impl PetRepository {
    pub fn new(store: Arc<FileStore>) -> Self {
        PetRepository {
            repo: Repository::new(store),
        }
    }

    pub async fn load(&mut self) -> StoreResult<PetState> {
        self.repo.load().await
    }

    pub async fn save(&mut self, state: PetState) -> StoreResult<()> {
        self.repo.save(state).await
    }

    /// Current cached state without touching disk.
    pub fn cached(&self) -> Option<&PetState> {
        self.repo.cached()
    }

    pub fn clear_cache(&mut self) {
        self.repo.clear_cache();
    }

    /// Overwrite the given status fields as-is. No clamping happens here.
    pub async fn update_status(&mut self, patch: StatusPatch) -> StoreResult<()> {
        self.repo
            .modify(|pet| {
                pet.data.status.merge(&patch);
                Ok(())
            })
            .await
    }

    /// Add experience, rolling it over into levels. Returns true if the pet leveled up.
    pub async fn add_experience(&mut self, amount: u64) -> StoreResult<bool> {
        let (gained, level) = self
            .repo
            .modify(|pet| {
                let gained = pet.data.basic.gain_experience(amount)?;
                Ok((gained, pet.data.basic.level))
            })
            .await?;
        if gained > 0 {
            info!("Pet gained {} level(s), now level {}", gained, level);
        } else {
            debug!("Pet gained {} experience", amount);
        }
        Ok(gained > 0)
    }

    /// Apply a consumed item's effect, capped at 100 per gauge, then snapshot the record.
    ///
    /// Feeding is the only operation that takes a backup.
    pub async fn feed(&mut self, item_id: &str, effect: ItemEffect) -> StoreResult<()> {
        effect.validate()?;
        self.repo
            .modify(|pet| {
                pet.data.status.apply_effect(&effect);
                pet.data.timers.last_feed_time = Utc::now();
                Ok(())
            })
            .await?;
        info!("Pet fed with {}", item_id);
        self.repo.store().backup(PetState::FILE_NAME).await;
        Ok(())
    }

    pub async fn set_skin(&mut self, skin: &str) -> StoreResult<()> {
        self.repo
            .modify(|pet| {
                pet.data.appearance.current_skin = skin.to_string();
                Ok(())
            })
            .await
    }

    pub async fn set_expression(&mut self, expression: &str) -> StoreResult<()> {
        self.repo
            .modify(|pet| {
                pet.data.appearance.current_expression = expression.to_string();
                Ok(())
            })
            .await
    }
}

//! Persisted record types and their compiled-in defaults.
//!
//! Field names are camelCase on disk so records stay readable and hand-editable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{StoreError, StoreResult};

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Upper bound applied to status fields by [`PetStatus::apply_effect`].
pub const STATUS_MAX: i32 = 100;

// ============================================================================
// Pet
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetState {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub data: PetData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetData {
    pub basic: PetBasic,
    pub status: PetStatus,
    pub timers: PetTimers,
    pub appearance: PetAppearance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetBasic {
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub next_level_exp: u64,
}

impl PetBasic {
    /// Add `amount` experience and roll it over into levels.
    ///
    /// Each pass subtracts the current threshold, bumps the level, and grows the
    /// threshold to `floor(threshold * 1.5)` (at least +1). Returns the number of
    /// levels gained.
    pub fn gain_experience(&mut self, amount: u64) -> StoreResult<u32> {
        if self.next_level_exp == 0 {
            return Err(StoreError::InvalidState(
                "nextLevelExp must be positive".to_string(),
            ));
        }
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.next_level_exp {
            self.experience -= self.next_level_exp;
            self.level = self.level.saturating_add(1);
            self.next_level_exp = next_threshold(self.next_level_exp);
            gained += 1;
        }
        Ok(gained)
    }
}

fn next_threshold(current: u64) -> u64 {
    (current.saturating_mul(3) / 2).max(current.saturating_add(1))
}

/// Status gauges. Nominally 0..=100; only [`PetStatus::apply_effect`] clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStatus {
    pub hunger: i32,
    pub happiness: i32,
    pub energy: i32,
    pub health: i32,
}

impl PetStatus {
    /// Shallow merge: every field present in `patch` overwrites, no clamping.
    pub fn merge(&mut self, patch: &StatusPatch) {
        if let Some(v) = patch.hunger {
            self.hunger = v;
        }
        if let Some(v) = patch.happiness {
            self.happiness = v;
        }
        if let Some(v) = patch.energy {
            self.energy = v;
        }
        if let Some(v) = patch.health {
            self.health = v;
        }
    }

    /// Additive update capped at [`STATUS_MAX`] for each field present in `effect`.
    pub fn apply_effect(&mut self, effect: &ItemEffect) {
        let raise = |field: &mut i32, delta: Option<i32>| {
            if let Some(delta) = delta {
                *field = field.saturating_add(delta).min(STATUS_MAX);
            }
        };
        raise(&mut self.hunger, effect.hunger);
        raise(&mut self.happiness, effect.happiness);
        raise(&mut self.energy, effect.energy);
    }
}

/// Partial status used by `update_status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunger: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happiness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetTimers {
    pub last_feed_time: DateTime<Utc>,
    pub last_sleep_time: DateTime<Utc>,
    pub last_play_time: DateTime<Utc>,
    pub total_born_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetAppearance {
    pub current_skin: String,
    pub current_expression: String,
    #[serde(default)]
    pub accessories: BTreeSet<String>,
}

impl Default for PetState {
    fn default() -> Self {
        let now = Utc::now();
        PetState {
            version: SCHEMA_VERSION.to_string(),
            last_updated: now,
            data: PetData {
                basic: PetBasic {
                    name: "Aemis".to_string(),
                    level: 1,
                    experience: 0,
                    next_level_exp: 100,
                },
                status: PetStatus {
                    hunger: 100,
                    happiness: 50,
                    energy: 100,
                    health: 100,
                },
                timers: PetTimers {
                    last_feed_time: now,
                    last_sleep_time: now,
                    last_play_time: now,
                    total_born_time: now,
                },
                appearance: PetAppearance {
                    current_skin: "default".to_string(),
                    current_expression: "normal".to_string(),
                    accessories: BTreeSet::new(),
                },
            },
        }
    }
}

// ============================================================================
// Inventory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Food,
    Toy,
    Decoration,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ItemType::Food => "food",
            ItemType::Toy => "toy",
            ItemType::Decoration => "decoration",
        })
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "food" => Ok(ItemType::Food),
            "toy" => Ok(ItemType::Toy),
            "decoration" => Ok(ItemType::Decoration),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

/// Status deltas an item applies when consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunger: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happiness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<i32>,
}

impl ItemEffect {
    /// Deltas must be non-negative so a feed can only raise a gauge.
    pub fn validate(&self) -> StoreResult<()> {
        for (field, delta) in [
            ("hunger", self.hunger),
            ("happiness", self.happiness),
            ("energy", self.energy),
        ] {
            if let Some(delta) = delta.filter(|d| *d < 0) {
                return Err(StoreError::InvalidEffect(format!(
                    "{} delta {} is negative",
                    field, delta
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub count: u32,
    #[serde(default)]
    pub effect: ItemEffect,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryData {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub items: Vec<InventoryItem>,
}

impl InventoryData {
    pub fn find(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

fn food(id: &str, name: &str, count: u32, effect: ItemEffect, description: &str) -> InventoryItem {
    InventoryItem {
        id: id.to_string(),
        name: name.to_string(),
        kind: ItemType::Food,
        count,
        effect,
        icon: format!("{}.png", id),
        description: description.to_string(),
    }
}

impl Default for InventoryData {
    fn default() -> Self {
        InventoryData {
            version: SCHEMA_VERSION.to_string(),
            last_updated: Utc::now(),
            items: vec![
                food(
                    "food_apple",
                    "Apple",
                    10,
                    ItemEffect {
                        hunger: Some(15),
                        happiness: Some(5),
                        energy: None,
                    },
                    "A sweet apple that restores a little hunger",
                ),
                food(
                    "food_cake",
                    "Cake",
                    3,
                    ItemEffect {
                        hunger: Some(30),
                        happiness: Some(15),
                        energy: None,
                    },
                    "A delicious cake that restores a lot",
                ),
                food(
                    "food_milk",
                    "Milk",
                    5,
                    ItemEffect {
                        hunger: Some(10),
                        happiness: Some(10),
                        energy: Some(10),
                    },
                    "Warm milk that restores a little of everything",
                ),
            ],
        }
    }
}

// ============================================================================
// Feed history (schema only; nothing writes it yet)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub timestamp: DateTime<Utc>,
    pub effect: FeedDelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDelta {
    pub hunger_before: i32,
    pub hunger_after: i32,
    pub happiness_before: i32,
    pub happiness_after: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHistoryData {
    pub version: String,
    pub records: Vec<FeedRecord>,
    pub total_feed_count: u64,
    pub last_feed_time: DateTime<Utc>,
}

impl Default for FeedHistoryData {
    fn default() -> Self {
        FeedHistoryData {
            version: SCHEMA_VERSION.to_string(),
            records: Vec::new(),
            total_feed_count: 0,
            last_feed_time: Utc::now(),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub version: String,
    /// Older settings files predate this field.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    pub behavior: BehaviorSettings,
    pub window: WindowSettings,
    pub game: GameSettings,
    pub appearance: AppearanceSettings,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSettings {
    pub auto_move: bool,
    pub auto_hide: bool,
    pub taskbar_docking: bool,
    pub peek_behavior: PeekBehavior,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeekBehavior {
    pub enabled: bool,
    pub trigger_type: PeekTrigger,
    pub interval_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeekTrigger {
    MouseExit,
    Timer,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSettings {
    pub always_on_top: bool,
    pub click_through: bool,
    pub start_position: StartPosition,
    pub remember_position: bool,
    pub last_position: WindowPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPosition {
    Center,
    Random,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub hunger_decay_rate: f64,
    pub happiness_decay_rate: f64,
    /// Milliseconds between periodic saves driven by the host
    pub save_interval: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSettings {
    pub animation_quality: AnimationQuality,
    pub show_effects: bool,
    pub show_status_bar: StatusBarMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationQuality {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarMode {
    Always,
    Hover,
    Never,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            version: SCHEMA_VERSION.to_string(),
            last_updated: Utc::now(),
            behavior: BehaviorSettings {
                auto_move: true,
                auto_hide: true,
                taskbar_docking: true,
                peek_behavior: PeekBehavior {
                    enabled: true,
                    trigger_type: PeekTrigger::Both,
                    interval_minutes: 5,
                },
            },
            window: WindowSettings {
                always_on_top: true,
                click_through: false,
                start_position: StartPosition::Center,
                remember_position: true,
                last_position: WindowPosition { x: 100, y: 100 },
            },
            game: GameSettings {
                difficulty: Difficulty::Normal,
                hunger_decay_rate: 1.0,
                happiness_decay_rate: 1.0,
                save_interval: 60_000,
            },
            appearance: AppearanceSettings {
                animation_quality: AnimationQuality::High,
                show_effects: true,
                show_status_bar: StatusBarMode::Hover,
            },
            language: "zh-CN".to_string(),
        }
    }
}

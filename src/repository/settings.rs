//! Application settings repository with typed section accessors.

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::Repository;
use crate::errors::StoreResult;
use crate::storage::FileStore;
use crate::types::{
    AppSettings, AppearanceSettings, BehaviorSettings, GameSettings, WindowSettings,
};

/// Top-level settings section names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsKey {
    Behavior,
    Window,
    Game,
    Appearance,
    Language,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 5] = [
        SettingsKey::Behavior,
        SettingsKey::Window,
        SettingsKey::Game,
        SettingsKey::Appearance,
        SettingsKey::Language,
    ];
}

impl fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SettingsKey::Behavior => "behavior",
            SettingsKey::Window => "window",
            SettingsKey::Game => "game",
            SettingsKey::Appearance => "appearance",
            SettingsKey::Language => "language",
        })
    }
}

impl FromStr for SettingsKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingsKey::ALL
            .into_iter()
            .find(|k| k.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown settings section '{}'", s))
    }
}

/// The value of one top-level section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "value", rename_all = "lowercase")]
pub enum SettingsSection {
    Behavior(BehaviorSettings),
    Window(WindowSettings),
    Game(GameSettings),
    Appearance(AppearanceSettings),
    Language(String),
}

impl SettingsSection {
    pub fn key(&self) -> SettingsKey {
        match self {
            SettingsSection::Behavior(_) => SettingsKey::Behavior,
            SettingsSection::Window(_) => SettingsKey::Window,
            SettingsSection::Game(_) => SettingsKey::Game,
            SettingsSection::Appearance(_) => SettingsKey::Appearance,
            SettingsSection::Language(_) => SettingsKey::Language,
        }
    }

    fn read(settings: &AppSettings, key: SettingsKey) -> Self {
        match key {
            SettingsKey::Behavior => SettingsSection::Behavior(settings.behavior.clone()),
            SettingsKey::Window => SettingsSection::Window(settings.window.clone()),
            SettingsKey::Game => SettingsSection::Game(settings.game.clone()),
            SettingsKey::Appearance => SettingsSection::Appearance(settings.appearance.clone()),
            SettingsKey::Language => SettingsSection::Language(settings.language.clone()),
        }
    }

    fn write_into(self, settings: &mut AppSettings) {
        match self {
            SettingsSection::Behavior(v) => settings.behavior = v,
            SettingsSection::Window(v) => settings.window = v,
            SettingsSection::Game(v) => settings.game = v,
            SettingsSection::Appearance(v) => settings.appearance = v,
            SettingsSection::Language(v) => settings.language = v,
        }
    }
}

/// Whole sections to replace; absent sections are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<AppearanceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SettingsPatch {
    fn sections(self) -> impl Iterator<Item = SettingsSection> {
        [
            self.behavior.map(SettingsSection::Behavior),
            self.window.map(SettingsSection::Window),
            self.game.map(SettingsSection::Game),
            self.appearance.map(SettingsSection::Appearance),
            self.language.map(SettingsSection::Language),
        ]
        .into_iter()
        .flatten()
    }
}

pub struct SettingsRepository {
    repo: Repository<AppSettings>,
}

impl SettingsRepository {
    pub fn new(store: Arc<FileStore>) -> Self {
        SettingsRepository {
            repo: Repository::new(store),
        }
    }

    pub async fn load(&mut self) -> StoreResult<AppSettings> {
        self.repo.load().await
    }

    pub async fn save(&mut self, settings: AppSettings) -> StoreResult<()> {
        self.repo.save(settings).await
    }

    pub fn clear_cache(&mut self) {
        self.repo.clear_cache();
    }

    pub async fn get(&mut self, key: SettingsKey) -> StoreResult<SettingsSection> {
        Ok(SettingsSection::read(self.repo.get().await?, key))
    }

    pub async fn set(&mut self, value: SettingsSection) -> StoreResult<()> {
        self.repo
            .modify(|settings| {
                value.write_into(settings);
                Ok(())
            })
            .await
    }

    /// Shallow merge of top-level sections.
    pub async fn update(&mut self, patch: SettingsPatch) -> StoreResult<()> {
        self.repo
            .modify(|settings| {
                for section in patch.sections() {
                    section.write_into(settings);
                }
                Ok(())
            })
            .await
    }

    /// Overwrite the record with the compiled-in defaults.
    pub async fn reset(&mut self) -> StoreResult<()> {
        self.repo.save(AppSettings::default()).await?;
        info!("Settings reset to defaults");
        Ok(())
    }
}

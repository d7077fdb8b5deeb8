mod common;

use deskpet::repository::settings::{SettingsKey, SettingsPatch, SettingsSection};
use deskpet::repository::SettingsRepository;
use deskpet::types::{AppSettings, Difficulty, StartPosition};

#[tokio::test]
async fn get_returns_requested_section() {
    let (store, _temp) = common::temp_store();
    let mut settings = SettingsRepository::new(store);

    match settings.get(SettingsKey::Window).await.unwrap() {
        SettingsSection::Window(window) => {
            assert_eq!(window.start_position, StartPosition::Center);
            assert!(window.always_on_top);
        }
        other => panic!("expected window section, got {:?}", other),
    }
}

#[tokio::test]
async fn set_replaces_one_section() {
    let (store, _temp) = common::temp_store();
    let mut settings = SettingsRepository::new(store);
    let mut game = AppSettings::default().game;
    game.difficulty = Difficulty::Hard;

    settings.set(SettingsSection::Game(game)).await.unwrap();
    settings.clear_cache();
    let loaded = settings.load().await.unwrap();
    assert_eq!(loaded.game.difficulty, Difficulty::Hard);
    assert_eq!(loaded.language, "zh-CN");
}

#[tokio::test]
async fn update_merges_top_level_sections() {
    let (store, _temp) = common::temp_store();
    let mut settings = SettingsRepository::new(store);
    let mut appearance = AppSettings::default().appearance;
    appearance.show_effects = false;

    settings
        .update(SettingsPatch {
            appearance: Some(appearance.clone()),
            language: Some("en-US".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    settings.clear_cache();
    let loaded = settings.load().await.unwrap();
    assert_eq!(loaded.appearance, appearance);
    assert_eq!(loaded.language, "en-US");
    assert_eq!(loaded.behavior, AppSettings::default().behavior);
}

#[tokio::test]
async fn reset_restores_defaults() {
    let (store, _temp) = common::temp_store();
    let mut settings = SettingsRepository::new(store);
    settings
        .set(SettingsSection::Language("ja-JP".to_string()))
        .await
        .unwrap();

    settings.reset().await.unwrap();
    settings.clear_cache();
    let loaded = settings.load().await.unwrap();
    let defaults = AppSettings::default();
    assert_eq!(loaded.language, defaults.language);
    assert_eq!(loaded.window, defaults.window);
    assert_eq!(loaded.game, defaults.game);
}

#[tokio::test]
async fn settings_file_without_last_updated_still_loads() {
    let (store, _temp) = common::temp_store();
    let mut raw = serde_json::to_value(AppSettings::default()).unwrap();
    raw.as_object_mut().unwrap().remove("lastUpdated");
    store.write_json("settings.json", &raw).await.unwrap();

    let mut settings = SettingsRepository::new(store);
    assert_eq!(settings.load().await.unwrap().language, "zh-CN");
}

mod common;

use std::time::{Duration, SystemTime};

use deskpet::repository::PetRepository;
use deskpet::storage::BACKUP_RETENTION;
use deskpet::types::{ItemEffect, PetState};
use deskpet::StoreError;

#[tokio::test]
async fn nonexistent_record_seeds_once() {
    let (store, _temp) = common::temp_store();
    let mut first = PetRepository::new(store.clone());
    let mut second = PetRepository::new(store.clone());

    let a = first.load().await.unwrap();
    let b = second.load().await.unwrap();

    assert_eq!(a, b);
    assert_eq!(common::file_names(store.data_dir()), vec!["pet.json"]);
    assert!(store.exists("pet.json").await.unwrap());
}

#[tokio::test]
async fn corrupt_record_propagates_and_stays_on_disk() {
    let (store, _temp) = common::temp_store();
    store.ensure_dirs().await.unwrap();
    let path = store.data_dir().join("pet.json");
    std::fs::write(&path, "{\"version\": ").unwrap();

    let mut pets = PetRepository::new(store.clone());
    let err = pets.load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"version\": ");
}

#[tokio::test]
async fn record_with_wrong_shape_is_corrupt() {
    let (store, _temp) = common::temp_store();
    store.ensure_dirs().await.unwrap();
    std::fs::write(store.data_dir().join("pet.json"), "{\"version\": \"1.0.0\"}").unwrap();

    let mut pets = PetRepository::new(store);
    assert!(pets.load().await.unwrap_err().is_corrupt());
}

#[tokio::test]
async fn record_with_invalid_utf8_is_corrupt() {
    let (store, _temp) = common::temp_store();
    store.ensure_dirs().await.unwrap();
    let path = store.data_dir().join("pet.json");
    std::fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();

    let mut pets = PetRepository::new(store);
    let err = pets.load().await.unwrap_err();
    assert!(err.is_corrupt(), "got {:?}", err);
    assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xfe, b'{', b'}']);
}

#[tokio::test]
async fn save_then_reload_round_trips() {
    let (store, _temp) = common::temp_store();
    let mut pets = PetRepository::new(store.clone());
    let mut state = pets.load().await.unwrap();
    state.data.basic.name = "Mochi".to_string();
    state.data.status.health = 42;
    state.data.appearance.accessories.insert("scarf".to_string());

    pets.save(state.clone()).await.unwrap();
    let stamped = pets.cached().unwrap().last_updated;
    pets.clear_cache();
    let reloaded = pets.load().await.unwrap();

    assert_eq!(reloaded.last_updated, stamped);
    assert!(reloaded.last_updated >= state.last_updated);
    let mut expected = state;
    expected.last_updated = reloaded.last_updated;
    assert_eq!(reloaded, expected);
}

#[tokio::test]
async fn clear_cache_picks_up_external_edits() {
    let (store, _temp) = common::temp_store();
    let mut pets = PetRepository::new(store.clone());
    pets.load().await.unwrap();

    let mut edited = PetState::default();
    edited.data.basic.name = "Edited".to_string();
    store.write_json("pet.json", &edited).await.unwrap();

    assert_ne!(pets.load().await.unwrap().data.basic.name, "Edited");
    pets.clear_cache();
    assert_eq!(pets.load().await.unwrap().data.basic.name, "Edited");
}

#[tokio::test]
async fn only_feeding_takes_backups() {
    let (store, _temp) = common::temp_store();
    let mut pets = PetRepository::new(store.clone());

    pets.add_experience(10).await.unwrap();
    assert!(store.list_backups().await.unwrap().is_empty());

    let effect = ItemEffect {
        hunger: Some(1),
        ..Default::default()
    };
    pets.feed("food_apple", effect).await.unwrap();
    let backups = store.list_backups().await.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].record.as_deref(), Some("pet.json"));
}

#[tokio::test]
async fn backup_sweeps_snapshots_past_retention() {
    let (store, _temp) = common::temp_store();
    store.write_json("pet.json", &PetState::default()).await.unwrap();

    let stale = store.backup_dir().join("2020-01-01_00-00-00_pet.json");
    let recent = store.backup_dir().join("2020-01-02_00-00-00_pet.json");
    for (path, age) in [
        (&stale, BACKUP_RETENTION + Duration::from_secs(60)),
        (&recent, BACKUP_RETENTION - Duration::from_secs(60)),
    ] {
        std::fs::write(path, "{}").unwrap();
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    store.backup("pet.json").await;

    assert!(!stale.exists(), "snapshot older than 7 days should be swept");
    assert!(recent.exists(), "snapshot younger than 7 days should be kept");
    assert_eq!(store.list_backups().await.unwrap().len(), 2);
}

#[tokio::test]
async fn restore_replaces_live_record() {
    let (store, _temp) = common::temp_store();
    let mut pets = PetRepository::new(store.clone());
    let effect = ItemEffect {
        happiness: Some(5),
        ..Default::default()
    };
    pets.feed("food_cake", effect).await.unwrap();
    let snapshot = store.list_backups().await.unwrap().remove(0);
    let fed = pets.load().await.unwrap();

    pets.add_experience(250).await.unwrap();
    store.restore(&snapshot.name, "pet.json").await.unwrap();
    pets.clear_cache();

    let restored = pets.load().await.unwrap();
    assert_eq!(restored.data.basic, fed.data.basic);
    assert_eq!(common::file_names(store.data_dir()), vec!["pet.json"]);
}

#[tokio::test]
async fn restore_refuses_path_escapes() {
    let (store, _temp) = common::temp_store();
    let err = store.restore("../pet.json", "pet.json").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(_)));
    let err = store
        .restore("2020-01-01_00-00-00_pet.json", "../../etc.json")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(_)));
}

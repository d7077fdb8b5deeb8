//! Backup snapshots and retention for live records.
//!
//! Snapshots are plain copies of a record file named
//! `YYYY-MM-DD_HH-MM-SS_<record>.json` (UTC), so lexical order is chronological order.
//! Taking a snapshot and sweeping old ones are best-effort: failures are logged and
//! never reach the caller. Restore is a manual recovery path and does report errors.

use chrono::Utc;
use log::{error, info, warn};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::fs;

use super::{trim_leading_nuls, FileStore};
use crate::errors::{StoreError, StoreResult};
use crate::validation::{validate_backup_name, validate_record_name};

/// Snapshots whose modification time is older than this are removed by the sweep.
pub const BACKUP_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// One snapshot in the backup area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    /// Snapshot file name
    pub name: String,
    /// Record file name the snapshot was taken from, when the name follows the convention
    pub record: Option<String>,
    pub size_bytes: u64,
}

/// Build the snapshot file name for `record` taken now.
pub(crate) fn snapshot_name(record: &str) -> String {
    format!("{}_{}", Utc::now().format("%Y-%m-%d_%H-%M-%S"), record)
}

/// Recover the record name from `YYYY-MM-DD_HH-MM-SS_<record>`.
fn record_of(snapshot: &str) -> Option<String> {
    // "2026-10-19_08-30-00_" is 20 bytes
    let (stamp, record) = (snapshot.get(..20)?, snapshot.get(20..)?);
    let well_formed = stamp.ends_with('_')
        && chrono::NaiveDateTime::parse_from_str(&stamp[..19], "%Y-%m-%d_%H-%M-%S").is_ok();
    (well_formed && !record.is_empty()).then(|| record.to_string())
}

impl FileStore {
    /// Snapshot the live file for `name` into the backup area, then sweep old snapshots.
    ///
    /// Never fails: problems are logged and swallowed.
    pub async fn backup(&self, name: &str) {
        match self.try_backup(name).await {
            Ok(snapshot) => {
                info!("Backup created: {}", snapshot);
                self.sweep_backups().await;
            }
            Err(e) => error!("Failed to back up {}: {}", name, e),
        }
    }

    async fn try_backup(&self, name: &str) -> StoreResult<String> {
        self.ensure_dirs().await?;
        let source = self.record_path(name)?;
        let snapshot = snapshot_name(name);
        let target = self.backup_dir.join(&snapshot);
        fs::copy(&source, &target)
            .await
            .map_err(|e| StoreError::io(&source, e))?;
        Ok(snapshot)
    }

    /// Delete snapshots older than [`BACKUP_RETENTION`]. Returns how many were removed.
    ///
    /// Never fails: problems are logged and the sweep moves on.
    pub async fn sweep_backups(&self) -> usize {
        match self.try_sweep(SystemTime::now()).await {
            Ok(removed) => removed,
            Err(e) => {
                error!("Failed to clean old backups: {}", e);
                0
            }
        }
    }

    async fn try_sweep(&self, now: SystemTime) -> StoreResult<usize> {
        self.ensure_dirs().await?;
        let mut entries = fs::read_dir(&self.backup_dir)
            .await
            .map_err(|e| StoreError::io(&self.backup_dir, e))?;
        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.backup_dir, e))?
        {
            let path = entry.path();
            match expired(&path, now).await {
                Ok(true) => match fs::remove_file(&path).await {
                    Ok(()) => {
                        removed += 1;
                        info!("Old backup deleted: {}", entry.file_name().to_string_lossy());
                    }
                    Err(e) => warn!("Failed to delete old backup {}: {}", path.display(), e),
                },
                Ok(false) => {}
                Err(e) => warn!("Skipping backup {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }

    /// All `*.json` snapshots, oldest first.
    pub async fn list_backups(&self) -> StoreResult<Vec<BackupInfo>> {
        self.ensure_dirs().await?;
        let mut entries = fs::read_dir(&self.backup_dir)
            .await
            .map_err(|e| StoreError::io(&self.backup_dir, e))?;
        let mut backups = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.backup_dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".json") {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| StoreError::io(entry.path(), e))?;
            if !metadata.is_file() {
                continue;
            }
            backups.push(BackupInfo {
                record: record_of(&name),
                name,
                size_bytes: metadata.len(),
            });
        }
        backups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(backups)
    }

    /// Copy snapshot `backup_name` back over live record `target`.
    ///
    /// The snapshot must parse before anything is written, and it lands through the same
    /// temp/verify/rename path as [`FileStore::write_json`]. Repository caches are not
    /// touched; clear them afterwards.
    pub async fn restore(&self, backup_name: &str, target: &str) -> StoreResult<()> {
        validate_backup_name(backup_name)?;
        validate_record_name(target)?;
        self.ensure_dirs().await?;

        let source = self.backup_dir.join(backup_name);
        let content = match fs::read(&source).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::BackupNotFound(backup_name.to_string()))
            }
            Err(e) => return Err(StoreError::io(source, e)),
        };
        let content = trim_leading_nuls(&content);
        serde_json::from_slice::<serde_json::Value>(content)
            .map_err(|e| StoreError::corrupt(&source, e))?;

        let path = self.record_path(target)?;
        self.write_atomic(&path, content).await.map_err(|e| {
            error!("Failed to restore backup {}: {}", backup_name, e);
            e
        })?;
        info!("Backup restored: {} -> {}", backup_name, target);
        Ok(())
    }
}

async fn expired(path: &Path, now: SystemTime) -> std::io::Result<bool> {
    let metadata = fs::metadata(path).await?;
    if !metadata.is_file() {
        return Ok(false);
    }
    let modified = metadata.modified()?;
    Ok(now
        .duration_since(modified)
        .map(|age| age > BACKUP_RETENTION)
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn age_file(path: &Path, age: Duration) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn snapshot_names_embed_sortable_stamp() {
        let name = snapshot_name("pet.json");
        assert_eq!(name.len(), "2026-10-19_08-30-00_pet.json".len());
        assert!(name.ends_with("_pet.json"));
        assert_eq!(record_of(&name).as_deref(), Some("pet.json"));
    }

    #[test]
    fn record_of_rejects_foreign_names() {
        assert_eq!(record_of("pet.json"), None);
        assert_eq!(record_of("not-a-date-at-all_xx_pet.json"), None);
        assert_eq!(
            record_of("2026-10-19_08-30-00_inventory.json").as_deref(),
            Some("inventory.json")
        );
    }

    #[tokio::test]
    async fn backup_copies_live_file() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.write_json("pet.json", &vec![1, 2, 3]).await.unwrap();

        store.backup("pet.json").await;

        let backups = store.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].record.as_deref(), Some("pet.json"));
        let copied = std::fs::read(store.backup_dir().join(&backups[0].name)).unwrap();
        let live = std::fs::read(store.data_dir().join("pet.json")).unwrap();
        assert_eq!(copied, live);
    }

    #[tokio::test]
    async fn backup_of_missing_record_is_swallowed() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.backup("ghost.json").await;
        assert!(store.list_backups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_snapshots() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.ensure_dirs().await.unwrap();
        let old = store.backup_dir().join("2026-01-01_00-00-00_pet.json");
        let fresh = store.backup_dir().join("2026-01-09_00-00-00_pet.json");
        std::fs::write(&old, "{}").unwrap();
        std::fs::write(&fresh, "{}").unwrap();
        age_file(&old, BACKUP_RETENTION + Duration::from_secs(3600));
        age_file(&fresh, BACKUP_RETENTION - Duration::from_secs(3600));

        assert_eq!(store.sweep_backups().await, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn restore_rejects_corrupt_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.write_json("pet.json", &vec![1]).await.unwrap();
        std::fs::write(store.backup_dir().join("2026-01-01_00-00-00_pet.json"), "[1,").unwrap();

        let err = store
            .restore("2026-01-01_00-00-00_pet.json", "pet.json")
            .await
            .unwrap_err();
        assert!(err.is_corrupt());
        let live: Vec<u32> = store.read_json("pet.json", vec![]).await.unwrap();
        assert_eq!(live, vec![1]);
    }

    #[tokio::test]
    async fn restore_rejects_non_utf8_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.write_json("pet.json", &vec![1]).await.unwrap();
        std::fs::write(
            store.backup_dir().join("2026-01-01_00-00-00_pet.json"),
            [0xff, 0xfe, b'[', b']'],
        )
        .unwrap();

        let err = store
            .restore("2026-01-01_00-00-00_pet.json", "pet.json")
            .await
            .unwrap_err();
        assert!(err.is_corrupt());
    }

    #[tokio::test]
    async fn restore_of_unknown_snapshot_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        let err = store
            .restore("2026-01-01_00-00-00_pet.json", "pet.json")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BackupNotFound(_)));
    }
}

//! # Storage Module - Durable Record Store
//!
//! Atomic read/write of named JSON records on local disk, plus timestamped backup
//! snapshots with age-based retention (see [`backup`]). The store knows nothing about
//! record schemas: it moves `serde` values in and out of files.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! ├── data/        ← live records (pet.json, inventory.json, settings.json)
//! └── backups/     ← YYYY-MM-DD_HH-MM-SS_<record>.json snapshots
//! ```
//!
//! ## Write protocol
//!
//! A write serializes the record into a uniquely named temp file next to the target,
//! re-reads and re-parses that temp file, then renames it over the target. Any failure
//! removes the temp file and leaves the previous content in place, so a reader sees
//! either the old record or the new one, never a torn write.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use deskpet::storage::FileStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = FileStore::new("./deskpet-data");
//!     let counters: Vec<u32> = store.read_json("counters.json", vec![0, 0]).await?;
//!     store.write_json("counters.json", &counters).await?;
//!     store.backup("counters.json").await;
//!     Ok(())
//! }
//! ```

pub mod backup;

pub use backup::{BackupInfo, BACKUP_RETENTION};

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::{StoreError, StoreResult};
use crate::validation::validate_record_name;

const DATA_DIR: &str = "data";
const BACKUP_DIR: &str = "backups";

/// File-backed store for named JSON records under a single storage root.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    backup_dir: PathBuf,
    initialized: AtomicBool,
    #[cfg(test)]
    fail_next_rename: AtomicBool,
}

impl FileStore {
    /// Bind a store to `root`. Nothing touches the disk until the first operation.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        FileStore {
            data_dir: root.join(DATA_DIR),
            backup_dir: root.join(BACKUP_DIR),
            initialized: AtomicBool::new(false),
            #[cfg(test)]
            fail_next_rename: AtomicBool::new(false),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Create the live-records and backup directories. Safe to call repeatedly.
    pub async fn ensure_dirs(&self) -> StoreResult<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        for dir in [&self.data_dir, &self.backup_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }
        if !self.initialized.swap(true, Ordering::AcqRel) {
            info!(
                "Storage initialized (data: {}, backups: {})",
                self.data_dir.display(),
                self.backup_dir.display()
            );
        }
        Ok(())
    }

    pub(crate) fn record_path(&self, name: &str) -> StoreResult<PathBuf> {
        validate_record_name(name)?;
        Ok(self.data_dir.join(name))
    }

    /// Whether a live record file exists for `name`.
    pub async fn exists(&self, name: &str) -> StoreResult<bool> {
        self.ensure_dirs().await?;
        let path = self.record_path(name)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    /// Read record `name`, seeding it with `default` when the file does not exist.
    ///
    /// A file that exists but does not parse is reported as [`StoreError::Corrupt`] and
    /// is never replaced with the default.
    pub async fn read_json<T>(&self, name: &str, default: T) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        self.ensure_dirs().await?;
        let path = self.record_path(name)?;
        match fs::read(&path).await {
            Ok(content) => {
                serde_json::from_slice(trim_leading_nuls(&content)).map_err(|e| {
                    error!("Record {} is corrupt: {}", name, e);
                    StoreError::corrupt(&path, e)
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Record {} not found, seeding with defaults", name);
                self.write_json(name, &default).await?;
                Ok(default)
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Atomically replace record `name` with `value`.
    pub async fn write_json<T>(&self, name: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_dirs().await?;
        let path = self.record_path(name)?;
        let content = serde_json::to_vec_pretty(value)?;
        match self.write_atomic(&path, &content).await {
            Ok(()) => {
                info!("Record {} saved", name);
                Ok(())
            }
            Err(e) => {
                error!("Failed to save record {}: {}", name, e);
                Err(e)
            }
        }
    }

    /// Temp write, verify, rename. The temp file is removed on every failure path.
    pub(crate) async fn write_atomic(&self, path: &Path, content: &[u8]) -> StoreResult<()> {
        let tmp_path = self.create_temp_file(path, content).await?;
        let result = self.verify_and_commit(&tmp_path, path).await;
        if result.is_err() {
            if let Err(e) = fs::remove_file(&tmp_path).await {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove temp file {}: {}", tmp_path.display(), e);
                }
            }
        }
        result
    }

    async fn create_temp_file(&self, path: &Path, content: &[u8]) -> StoreResult<PathBuf> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let base = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("record.json");
        let mut counter = 0u32;
        loop {
            let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(mut tmp) => {
                    let written = async {
                        tmp.write_all(content).await?;
                        tmp.flush().await?;
                        tmp.sync_all().await
                    }
                    .await;
                    if let Err(e) = written {
                        drop(tmp);
                        let _ = fs::remove_file(&candidate).await;
                        return Err(StoreError::io(candidate, e));
                    }
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    counter = counter.saturating_add(1);
                    continue;
                }
                Err(e) => return Err(StoreError::io(candidate, e)),
            }
        }
    }

    async fn verify_and_commit(&self, tmp_path: &Path, path: &Path) -> StoreResult<()> {
        let written = fs::read(tmp_path)
            .await
            .map_err(|e| StoreError::io(tmp_path, e))?;
        serde_json::from_slice::<serde_json::Value>(&written)
            .map_err(|e| StoreError::corrupt(tmp_path, e))?;

        #[cfg(test)]
        {
            if self.fail_next_rename.swap(false, Ordering::AcqRel) {
                return Err(StoreError::io(
                    path,
                    std::io::Error::new(ErrorKind::Other, "injected rename failure"),
                ));
            }
        }

        fs::rename(tmp_path, path)
            .await
            .map_err(|e| StoreError::io(path, e))?;

        // Persist the rename itself (best-effort)
        if let Some(dir) = path.parent() {
            if let Ok(dir_file) = fs::File::open(dir).await {
                let _ = dir_file.sync_all().await;
            }
        }
        debug!("Committed {} -> {}", tmp_path.display(), path.display());
        Ok(())
    }
}

/// Skip any accidental leading NUL bytes before parsing.
pub(crate) fn trim_leading_nuls(content: &[u8]) -> &[u8] {
    let start = content
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(content.len());
    &content[start..]
}

//! Test utilities & fixtures.
//! Every test gets its own temporary storage root so records never leak between tests.

use std::path::Path;
use std::sync::Arc;

use deskpet::service::PetService;
use deskpet::storage::FileStore;
use tempfile::TempDir;

/// A fresh store on an isolated temp root. Keep the `TempDir` alive for the test.
#[allow(dead_code)]
pub fn temp_store() -> (Arc<FileStore>, TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileStore::new(temp.path()));
    (store, temp)
}

/// A service over an isolated temp root.
#[allow(dead_code)]
pub fn temp_service() -> (PetService, TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let service = PetService::open(temp.path());
    (service, temp)
}

/// Sorted file names in `dir`.
#[allow(dead_code)]
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

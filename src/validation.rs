//! Name validation for record and backup files.
//!
//! Every name handed to the store is joined onto a directory path, so it must be a
//! plain file name: no separators, no parent references, nothing that could escape
//! the storage root.

use crate::errors::{StoreError, StoreResult};

const MAX_NAME_LEN: usize = 128;

/// Validate a live record file name such as `pet.json`.
pub fn validate_record_name(name: &str) -> StoreResult<()> {
    validate_json_file_name(name, "record")
}

/// Validate a backup snapshot file name such as `2026-10-19_08-30-00_pet.json`.
pub fn validate_backup_name(name: &str) -> StoreResult<()> {
    validate_json_file_name(name, "backup")
}

fn validate_json_file_name(name: &str, what: &str) -> StoreResult<()> {
    let reject = |reason: &str| {
        Err(StoreError::InvalidName(format!(
            "{} name '{}' {}",
            what,
            name.escape_debug(),
            reason
        )))
    };

    if name.is_empty() {
        return reject("is empty");
    }
    if name.len() > MAX_NAME_LEN {
        return reject("is too long");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("contains a path separator");
    }
    if name.contains("..") {
        return reject("contains a parent reference");
    }
    if name.chars().any(|c| c.is_control()) {
        return reject("contains control characters");
    }
    if name.starts_with('.') {
        return reject("is hidden");
    }
    if !name.ends_with(".json") || name.len() == ".json".len() {
        return reject("is not a .json file name");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_json_names() {
        assert!(validate_record_name("pet.json").is_ok());
        assert!(validate_record_name("inventory.json").is_ok());
        assert!(validate_backup_name("2026-10-19_08-30-00_pet.json").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for bad in ["../pet.json", "a/b.json", "a\\b.json", "..json", "pet..json"] {
            assert!(
                matches!(validate_backup_name(bad), Err(StoreError::InvalidName(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_json_hidden_and_empty() {
        assert!(validate_record_name("").is_err());
        assert!(validate_record_name("pet.txt").is_err());
        assert!(validate_record_name(".json").is_err());
        assert!(validate_record_name(".pet.json").is_err());
        assert!(validate_record_name("pet\n.json").is_err());
    }
}

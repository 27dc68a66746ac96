//! TMDB credential persisted in local storage.

use anyhow::Result;

use crate::storage::LocalStorage;

/// Storage key of the credential.
const CREDENTIAL_KEY: &str = "tmdb_api_key";

/// Loads the stored credential, trimmed. Blank values count as absent.
///
/// # Errors
///
/// Returns an error if the storage file exists but cannot be read.
pub fn load_credential(storage: &LocalStorage) -> Result<Option<String>> {
    Ok(storage
        .get_item(CREDENTIAL_KEY)?
        .map(|raw| raw.trim().to_owned())
        .filter(|value| !value.is_empty()))
}

/// Stores `value` as the credential.
///
/// Blank values are ignored and leave any previous credential in place.
/// Returns whether anything was written.
///
/// # Errors
///
/// Returns an error if the value cannot be written.
pub fn save_credential(storage: &LocalStorage, value: &str) -> Result<bool> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(false);
    }
    storage.set_item(CREDENTIAL_KEY, value)?;
    Ok(true)
}

/// Deletes the stored credential.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn remove_credential(storage: &LocalStorage) -> Result<()> {
    storage.remove_item(CREDENTIAL_KEY)
}

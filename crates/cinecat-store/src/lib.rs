//! Local persistence for cinecat.
//!
//! A small file-per-key store under the data directory holds the
//! user's movie reviews and, optionally, their TMDB credential.

/// Stored credential.
pub mod credential;
/// Per-user config and data directories.
pub mod dirs;
/// Movie reviews keyed by TMDB id.
pub mod reviews;
mod storage;

pub use credential::{load_credential, remove_credential, save_credential};
pub use dirs::{AppDir, resolve_app_dir};
pub use reviews::{MAX_RATING, Review, ReviewMap, ReviewStore};
pub use storage::LocalStorage;

//! Movie reviews persisted as one JSON document.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::storage::LocalStorage;

/// Storage key of the reviews document.
const REVIEWS_KEY: &str = "movie_reviews.json";

/// Highest selectable star rating.
pub const MAX_RATING: u8 = 7;

/// A single user review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Star rating in `0..=MAX_RATING`.
    pub rating: u8,
    /// Free-text comment.
    pub comment: String,
}

impl Review {
    /// Creates a review, clamping the rating to [`MAX_RATING`].
    #[must_use]
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating: rating.min(MAX_RATING),
            comment: comment.into(),
        }
    }

    /// Rating rendered as filled and empty stars.
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::from(self.rating.min(MAX_RATING));
        let empty = usize::from(MAX_RATING) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

/// Reviews keyed by TMDB movie id, in insertion order per movie.
pub type ReviewMap = BTreeMap<u64, Vec<Review>>;

/// In-memory review mapping mirrored to local storage.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ReviewStore {
    storage: LocalStorage,
    reviews: ReviewMap,
}

impl ReviewStore {
    /// Loads the full mapping from storage.
    ///
    /// An absent document yields an empty store. A document that cannot be
    /// parsed (including one that is not UTF-8) is logged and also treated as empty; it is overwritten by the
    /// next successful [`add_review`](Self::add_review).
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage file exists but cannot be read.
    pub fn load_all(storage: LocalStorage) -> Result<Self> {
        let reviews = match storage.get_bytes(REVIEWS_KEY)? {
            None => ReviewMap::new(),
            Some(raw) => match serde_json::from_slice::<ReviewMap>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(error = %e, "stored reviews are unreadable, starting empty");
                    ReviewMap::new()
                }
            },
        };
        tracing::debug!(movies = reviews.len(), "reviews loaded");
        Ok(Self { storage, reviews })
    }

    /// Appends a review for `movie_id`.
    ///
    /// Returns `Ok(false)` without touching anything when there is no movie
    /// or the comment is blank. The whole mapping is written before the
    /// in-memory copy is replaced, so a failed write leaves both unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping cannot be serialized or written.
    pub fn add_review(&mut self, movie_id: Option<u64>, rating: u8, comment: &str) -> Result<bool> {
        let Some(movie_id) = movie_id else {
            return Ok(false);
        };
        let comment = comment.trim();
        if comment.is_empty() {
            return Ok(false);
        }

        let mut next = self.reviews.clone();
        next.entry(movie_id)
            .or_default()
            .push(Review::new(rating, comment));

        let json = serde_json::to_string(&next).context("failed to serialize reviews")?;
        self.storage.set_item(REVIEWS_KEY, &json)?;
        self.reviews = next;
        tracing::debug!(movie_id, "review added");
        Ok(true)
    }

    /// Reviews for `movie_id`, oldest first. Empty when there are none.
    #[must_use]
    pub fn reviews_for(&self, movie_id: u64) -> &[Review] {
        self.reviews.get(&movie_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The full mapping.
    #[must_use]
    pub const fn all(&self) -> &ReviewMap {
        &self.reviews
    }
}

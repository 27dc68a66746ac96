//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;
use url::Url;

use super::types::{MovieDetails, MoviePage};

/// TMDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait,
/// which is what background fetch tasks require.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Fetches one page of a listing or search endpoint built by
    /// [`QueryBuilder::listing`](super::QueryBuilder::listing).
    ///
    /// # Errors
    ///
    /// Returns an error if both authentication schemes are rejected,
    /// the request fails, or the body is not JSON.
    async fn fetch_listing(&self, endpoint: &Url) -> Result<MoviePage>;

    /// Fetches movie details with credits, release dates, and external ids.
    ///
    /// # Errors
    ///
    /// Returns an error if both authentication schemes are rejected,
    /// the request fails, or the body is not JSON.
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails>;
}

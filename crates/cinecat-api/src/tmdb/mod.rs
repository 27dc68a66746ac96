//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints and
//! resolves image URLs on the TMDB image CDN.

mod api;
mod auth;
mod client;
mod image;
mod query;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
pub use auth::Credential;
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use image::{IMAGE_BASE_URL, ImageSize, image_url};
pub use query::{DEFAULT_BASE_URL, QueryBuilder, Section};
pub use types::{
    CAST_DISPLAY_LIMIT, CastMember, Credits, CrewMember, ExternalIds, Genre, MAX_TOTAL_PAGES,
    MovieDetails, MoviePage, MovieSummary, ReleaseDate, ReleaseDates, RegionReleases,
};

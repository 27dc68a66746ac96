//! TMDB client library for cinecat.
//!
//! Builds listing/search/detail requests, authenticates with either a
//! bearer token or an `api_key` query parameter, and decodes the responses
//! into lenient schemas.

/// TMDB API client.
pub mod tmdb;

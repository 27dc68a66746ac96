//! Request URL construction for TMDB listing, search, and detail endpoints.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use url::Url;

/// Default base URL for TMDB API v3.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "es-ES";

/// Default region for region-restricted listings.
const DEFAULT_REGION: &str = "AR";

/// Sub-requests appended to the movie detail call.
const DETAIL_APPENDS: &str = "credits,release_dates,external_ids";

/// Listing section shown in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    /// `movie/popular`.
    #[default]
    Popular,
    /// `movie/now_playing` (region-restricted).
    NowPlaying,
    /// `movie/top_rated`.
    TopRated,
    /// `movie/upcoming` (region-restricted).
    Upcoming,
    /// `discover/movie` sorted by popularity.
    Discover,
    /// `search/movie` by title.
    Search,
}

impl Section {
    /// Category tabs in display order.
    pub const TABS: [Self; 4] = [Self::Popular, Self::NowPlaying, Self::TopRated, Self::Upcoming];

    /// Stable identifier used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::NowPlaying => "now-playing",
            Self::TopRated => "top-rated",
            Self::Upcoming => "upcoming",
            Self::Discover => "discover",
            Self::Search => "search",
        }
    }

    /// Whether TMDB filters this listing by region.
    const fn is_regional(self) -> bool {
        matches!(self, Self::NowPlaying | Self::Upcoming)
    }

    /// Endpoint path relative to the API base.
    const fn path(self) -> &'static str {
        match self {
            Self::Popular => "movie/popular",
            Self::NowPlaying => "movie/now_playing",
            Self::TopRated => "movie/top_rated",
            Self::Upcoming => "movie/upcoming",
            Self::Discover | Self::Search => "discover/movie",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "popular" => Ok(Self::Popular),
            "now-playing" => Ok(Self::NowPlaying),
            "top-rated" => Ok(Self::TopRated),
            "upcoming" => Ok(Self::Upcoming),
            "discover" => Ok(Self::Discover),
            "search" => Ok(Self::Search),
            other => bail!("unknown section: {other}"),
        }
    }
}

/// Builds TMDB request URLs from browser selections.
///
/// URLs never carry credentials; authentication is added by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    /// API base URL (must end with `/`).
    base_url: Url,
    /// Response language (e.g. `es-ES`).
    language: String,
    /// ISO 3166-1 region for regional listings.
    region: String,
}

impl QueryBuilder {
    /// Creates a builder for the given API base URL.
    ///
    /// A missing trailing slash is added so that relative joins keep the
    /// version segment (`/3/`).
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            language: String::from(DEFAULT_LANGUAGE),
            region: String::from(DEFAULT_REGION),
        }
    }

    /// Creates a builder for the public TMDB v3 API.
    ///
    /// # Errors
    ///
    /// Returns an error if [`DEFAULT_BASE_URL`] fails to parse.
    pub fn public() -> Result<Self> {
        Self::parse(DEFAULT_BASE_URL).context("invalid default base URL")
    }

    /// Parses a base URL string and creates a builder.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("invalid base URL: {base_url}"))?;
        Ok(Self::new(url))
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the region used by regional listings.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the configured language.
    #[must_use]
    pub fn language_tag(&self) -> &str {
        &self.language
    }

    /// Returns the configured region.
    #[must_use]
    pub fn region_tag(&self) -> &str {
        &self.region
    }

    /// Builds the listing URL for the current selection.
    ///
    /// Returns `None` when no credential is configured, since the request
    /// could not be authenticated. A search with blank text falls back to
    /// the popularity-sorted discover listing.
    #[must_use]
    pub fn listing(
        &self,
        credential_present: bool,
        section: Section,
        page: u32,
        search_text: &str,
    ) -> Option<Url> {
        if !credential_present {
            return None;
        }

        let query = search_text.trim();
        let searching = section == Section::Search && !query.is_empty();
        let path = if searching {
            "search/movie"
        } else {
            section.path()
        };
        let mut url = self.base_url.join(path).ok()?;

        {
            let mut pairs = url.query_pairs_mut();
            if searching {
                pairs.append_pair("query", query);
            } else if matches!(section, Section::Discover | Section::Search) {
                pairs.append_pair("sort_by", "popularity.desc");
            }
            pairs
                .append_pair("language", &self.language)
                .append_pair("include_adult", "false")
                .append_pair("page", &page.max(1).to_string());
            if !searching && section.is_regional() {
                pairs.append_pair("region", &self.region);
            }
        }

        Some(url)
    }

    /// Builds the movie detail URL with credits, release dates, and
    /// external ids appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined onto the base URL.
    pub fn movie_details(&self, movie_id: u64) -> Result<Url> {
        let path = format!("movie/{movie_id}");
        let mut url = self
            .base_url
            .join(&path)
            .with_context(|| format!("failed to join URL path: {path}"))?;
        url.query_pairs_mut()
            .append_pair("append_to_response", DETAIL_APPENDS)
            .append_pair("language", &self.language);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_public_builder() {
        // Arrange & Act
        let builder = QueryBuilder::public().unwrap();

        // Assert
        assert_eq!(builder.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(builder.language_tag(), "es-ES");
    }

    #[test]
    fn test_no_credential_returns_none() {
        // Arrange
        let builder = QueryBuilder::public().unwrap();

        // Act & Assert
        for section in [
            Section::Popular,
            Section::NowPlaying,
            Section::TopRated,
            Section::Upcoming,
            Section::Discover,
            Section::Search,
        ] {
            assert!(builder.listing(false, section, 1, "Matrix").is_none());
        }
    }

    #[test]
    fn test_search_url() {
        // Arrange
        let builder = QueryBuilder::public().unwrap();

        // Act
        let url = builder
            .listing(true, Section::Search, 1, "  The Matrix ")
            .unwrap();

        // Assert
        assert_eq!(url.path(), "/3/search/movie");
        assert_eq!(query_value(&url, "query").as_deref(), Some("The Matrix"));
        assert_eq!(query_value(&url, "page").as_deref(), Some("1"));
        assert_eq!(query_value(&url, "language").as_deref(), Some("es-ES"));
        assert_eq!(query_value(&url, "include_adult").as_deref(), Some("false"));
        assert!(query_value(&url, "api_key").is_none());
        assert!(query_value(&url, "region").is_none());
    }

    #[test]
    fn test_search_query_is_percent_encoded() {
        // Arrange
        let builder = QueryBuilder::public().unwrap();

        // Act
        let url = builder
            .listing(true, Section::Search, 2, "amélie & co")
            .unwrap();

        // Assert
        assert!(url.as_str().contains("query=am%C3%A9lie+%26+co"));
        assert_eq!(query_value(&url, "query").as_deref(), Some("amélie & co"));
    }

    #[test]
    fn test_blank_search_falls_back_to_discover() {
        // Arrange
        let builder = QueryBuilder::public().unwrap();

        // Act
        let url = builder.listing(true, Section::Search, 3, "   ").unwrap();

        // Assert
        assert_eq!(url.path(), "/3/discover/movie");
        assert_eq!(
            query_value(&url, "sort_by").as_deref(),
            Some("popularity.desc")
        );
        assert_eq!(query_value(&url, "page").as_deref(), Some("3"));
    }

    #[test]
    fn test_section_paths_and_pages() {
        // Arrange
        let builder = QueryBuilder::public().unwrap();
        let cases = [
            (Section::Popular, "/3/movie/popular"),
            (Section::NowPlaying, "/3/movie/now_playing"),
            (Section::TopRated, "/3/movie/top_rated"),
            (Section::Upcoming, "/3/movie/upcoming"),
            (Section::Discover, "/3/discover/movie"),
        ];

        for (page, (section, path)) in (1_u32..).zip(cases) {
            // Act
            let url = builder.listing(true, section, page, "ignored").unwrap();

            // Assert
            assert_eq!(url.path(), path);
            assert_eq!(query_value(&url, "page"), Some(page.to_string()));
            assert!(query_value(&url, "query").is_none());
        }
    }

    #[test]
    fn test_regional_sections_attach_region() {
        // Arrange
        let builder = QueryBuilder::public().unwrap().region("MX");

        // Act
        let now_playing = builder.listing(true, Section::NowPlaying, 1, "").unwrap();
        let upcoming = builder.listing(true, Section::Upcoming, 1, "").unwrap();
        let popular = builder.listing(true, Section::Popular, 1, "").unwrap();

        // Assert
        assert_eq!(query_value(&now_playing, "region").as_deref(), Some("MX"));
        assert_eq!(query_value(&upcoming, "region").as_deref(), Some("MX"));
        assert!(query_value(&popular, "region").is_none());
    }

    #[test]
    fn test_page_zero_is_sent_as_one() {
        // Arrange
        let builder = QueryBuilder::public().unwrap();

        // Act
        let url = builder.listing(true, Section::Popular, 0, "").unwrap();

        // Assert
        assert_eq!(query_value(&url, "page").as_deref(), Some("1"));
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        // Arrange
        let builder = QueryBuilder::parse("http://localhost:8080/3").unwrap();

        // Act
        let url = builder.listing(true, Section::Popular, 1, "").unwrap();

        // Assert
        assert_eq!(url.path(), "/3/movie/popular");
    }

    #[test]
    fn test_movie_details_url() {
        // Arrange
        let builder = QueryBuilder::public().unwrap().language("en-US");

        // Act
        let url = builder.movie_details(603).unwrap();

        // Assert
        assert_eq!(url.path(), "/3/movie/603");
        assert_eq!(
            query_value(&url, "append_to_response").as_deref(),
            Some("credits,release_dates,external_ids")
        );
        assert_eq!(query_value(&url, "language").as_deref(), Some("en-US"));
    }

    #[test]
    fn test_section_from_str() {
        // Arrange & Act & Assert
        assert_eq!("now_playing".parse::<Section>().unwrap(), Section::NowPlaying);
        assert_eq!("Top-Rated".parse::<Section>().unwrap(), Section::TopRated);
        assert!("trending".parse::<Section>().is_err());
    }
}

//! TMDB API response types.
//!
//! Every field except the movie id is optional or defaulted: TMDB omits
//! or nulls fields freely and a missing value must never fail a listing.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Upper bound on pages offered for pagination (TMDB rejects `page > 500`).
pub const MAX_TOTAL_PAGES: u32 = 500;

/// Number of cast members shown in the detail view.
pub const CAST_DISPLAY_LIMIT: usize = 6;

/// Public movie page on the TMDB website.
const TMDB_MOVIE_PAGE: &str = "https://www.themoviedb.org/movie/";

/// Public title page on IMDb.
const IMDB_TITLE_PAGE: &str = "https://www.imdb.com/title/";

/// Deserializes `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Returns `Some` only for non-blank strings.
fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

// --- Listings ---

/// Response from listing endpoints (`movie/popular`, `search/movie`, ...).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MoviePage {
    /// Current page number.
    #[serde(default)]
    pub page: Option<u32>,
    /// Movies on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<MovieSummary>,
    /// Total number of pages as reported by TMDB.
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Total number of results.
    #[serde(default)]
    pub total_results: Option<u32>,
}

impl MoviePage {
    /// Total pages for pagination: defaults to 1 and never exceeds
    /// [`MAX_TOTAL_PAGES`].
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or(1).clamp(1, MAX_TOTAL_PAGES)
    }
}

/// A movie as it appears in listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Vote average (0-10).
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Vote count.
    #[serde(default)]
    pub vote_count: Option<u32>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl MovieSummary {
    /// Overview, if present and not blank.
    #[must_use]
    pub fn overview(&self) -> Option<&str> {
        non_blank(self.overview.as_ref())
    }

    /// Release date, if present and not blank.
    #[must_use]
    pub fn release_date(&self) -> Option<&str> {
        non_blank(self.release_date.as_ref())
    }

    /// Poster path, if present and not blank.
    #[must_use]
    pub fn poster_path(&self) -> Option<&str> {
        non_blank(self.poster_path.as_ref())
    }

    /// Backdrop path, if present and not blank.
    #[must_use]
    pub fn backdrop_path(&self) -> Option<&str> {
        non_blank(self.backdrop_path.as_ref())
    }

    /// Release year parsed from the release date.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        let date = NaiveDate::parse_from_str(self.release_date()?, "%Y-%m-%d").ok()?;
        Some(date.year())
    }
}

// --- Movie Details ---

/// Response from `movie/{id}?append_to_response=credits,release_dates,external_ids`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Release status (e.g. "Released").
    #[serde(default)]
    pub status: Option<String>,
    /// Official homepage.
    #[serde(default)]
    pub homepage: Option<String>,
    /// IMDb ID (`tt...`).
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Vote average (0-10).
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Vote count.
    #[serde(default)]
    pub vote_count: Option<u32>,
    /// Genres.
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    /// Cast and crew (`append_to_response=credits`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub credits: Credits,
    /// Per-country release dates (`append_to_response=release_dates`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_dates: ReleaseDates,
    /// External ids (`append_to_response=external_ids`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_ids: ExternalIds,
}

/// Genre entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// Genre ID.
    #[serde(default)]
    pub id: u32,
    /// Genre name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Cast and crew lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credits {
    /// Cast in billing order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cast: Vec<CastMember>,
    /// Crew members.
    #[serde(default, deserialize_with = "null_as_default")]
    pub crew: Vec<CrewMember>,
}

/// A cast credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CastMember {
    /// Person name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Character played.
    #[serde(default)]
    pub character: Option<String>,
    /// Profile image path.
    #[serde(default)]
    pub profile_path: Option<String>,
    /// Credit ID.
    #[serde(default)]
    pub credit_id: Option<String>,
}

/// A crew credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrewMember {
    /// Person name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Job title (e.g. "Director").
    #[serde(default)]
    pub job: Option<String>,
    /// Department (e.g. "Directing").
    #[serde(default)]
    pub department: Option<String>,
    /// Credit ID.
    #[serde(default)]
    pub credit_id: Option<String>,
}

/// Release dates grouped by country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseDates {
    /// One entry per country.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RegionReleases>,
}

/// Releases in one country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegionReleases {
    /// Country code (ISO 3166-1).
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso_3166_1: String,
    /// Releases in this country.
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_dates: Vec<ReleaseDate>,
}

/// A single release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseDate {
    /// Age certification (may be empty).
    #[serde(default)]
    pub certification: Option<String>,
    /// Release timestamp.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Release type (1 premiere .. 6 TV).
    #[serde(rename = "type", default)]
    pub release_type: Option<u8>,
}

/// External ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalIds {
    /// IMDb ID.
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// Wikidata ID.
    #[serde(default)]
    pub wikidata_id: Option<String>,
    /// Facebook handle.
    #[serde(default)]
    pub facebook_id: Option<String>,
    /// Instagram handle.
    #[serde(default)]
    pub instagram_id: Option<String>,
    /// Twitter handle.
    #[serde(default)]
    pub twitter_id: Option<String>,
}

impl MovieDetails {
    /// Overview, if present and not blank.
    #[must_use]
    pub fn overview(&self) -> Option<&str> {
        non_blank(self.overview.as_ref())
    }

    /// Release date, if present and not blank.
    #[must_use]
    pub fn release_date(&self) -> Option<&str> {
        non_blank(self.release_date.as_ref())
    }

    /// Poster path, if present and not blank.
    #[must_use]
    pub fn poster_path(&self) -> Option<&str> {
        non_blank(self.poster_path.as_ref())
    }

    /// Genre names in TMDB order.
    #[must_use]
    pub fn genre_names(&self) -> Vec<&str> {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Crew members credited as director.
    #[must_use]
    pub fn directors(&self) -> Vec<&CrewMember> {
        self.credits
            .crew
            .iter()
            .filter(|c| c.job.as_deref() == Some("Director"))
            .collect()
    }

    /// First [`CAST_DISPLAY_LIMIT`] cast members.
    #[must_use]
    pub fn top_cast(&self) -> &[CastMember] {
        let end = self.credits.cast.len().min(CAST_DISPLAY_LIMIT);
        self.credits.cast.get(..end).unwrap_or_default()
    }

    /// First non-empty certification for the given country.
    #[must_use]
    pub fn certification(&self, region: &str) -> Option<&str> {
        self.release_dates
            .results
            .iter()
            .find(|r| r.iso_3166_1.eq_ignore_ascii_case(region))?
            .release_dates
            .iter()
            .find_map(|d| non_blank(d.certification.as_ref()))
    }

    /// Official homepage, if set.
    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        non_blank(self.homepage.as_ref())
    }

    /// IMDb page URL from the detail or external-ids record.
    #[must_use]
    pub fn imdb_url(&self) -> Option<String> {
        let id = non_blank(self.imdb_id.as_ref())
            .or_else(|| non_blank(self.external_ids.imdb_id.as_ref()))?;
        Some(format!("{IMDB_TITLE_PAGE}{id}/"))
    }

    /// TMDB page URL.
    #[must_use]
    pub fn tmdb_url(&self) -> String {
        format!("{TMDB_MOVIE_PAGE}{}", self.id)
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_popular_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_popular.json");

        // Act
        let page: MoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.page, Some(1));
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.results[0].id, 603);
        assert_eq!(page.results[0].title, "Matrix");
        assert_eq!(page.total_pages(), 500);
    }

    #[test]
    fn test_total_pages_clamped_to_max() {
        // Arrange
        let json = r#"{"page":1,"results":[],"total_pages":47000,"total_results":940000}"#;

        // Act
        let page: MoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.total_pages, Some(47_000));
        assert_eq!(page.total_pages(), MAX_TOTAL_PAGES);
    }

    #[test]
    fn test_missing_fields_default() {
        // Arrange
        let json = r#"{"results":null}"#;

        // Act
        let page: MoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_zero_total_pages_defaults_to_one() {
        // Arrange
        let json = r#"{"page":1,"results":[],"total_pages":0,"total_results":0}"#;

        // Act
        let page: MoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_sparse_movie_summary() {
        // Arrange
        let json = r#"{"id":42,"title":null,"overview":"","poster_path":null,"release_date":""}"#;

        // Act
        let movie: MovieSummary = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(movie.id, 42);
        assert!(movie.title.is_empty());
        assert!(movie.overview().is_none());
        assert!(movie.poster_path().is_none());
        assert!(movie.release_date().is_none());
        assert!(movie.release_year().is_none());
        assert!(movie.vote_average.is_none());
    }

    #[test]
    fn test_release_year() {
        // Arrange
        let movie = MovieSummary {
            release_date: Some(String::from("1999-03-30")),
            ..MovieSummary::default()
        };

        // Act & Assert
        assert_eq!(movie.release_year(), Some(1999));
    }

    #[test]
    fn test_parse_details_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_details_603.json");

        // Act
        let details: MovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(details.id, 603);
        assert_eq!(details.runtime, Some(136));
        assert_eq!(details.genre_names(), vec!["Acción", "Ciencia ficción"]);
        let directors: Vec<&str> = details.directors().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(directors, vec!["Lana Wachowski", "Lilly Wachowski"]);
        assert_eq!(details.top_cast().len(), CAST_DISPLAY_LIMIT);
        assert_eq!(details.top_cast()[0].name, "Keanu Reeves");
        assert_eq!(details.certification("AR"), Some("13"));
        assert_eq!(
            details.imdb_url().as_deref(),
            Some("https://www.imdb.com/title/tt0133093/")
        );
        assert_eq!(details.tmdb_url(), "https://www.themoviedb.org/movie/603");
        assert_eq!(details.homepage(), Some("http://www.warnerbros.com/matrix"));
    }

    #[test]
    fn test_details_without_appended_data() {
        // Arrange
        let json = r#"{"id":7,"title":"Sin datos","credits":null}"#;

        // Act
        let details: MovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert!(details.directors().is_empty());
        assert!(details.top_cast().is_empty());
        assert!(details.genre_names().is_empty());
        assert!(details.imdb_url().is_none());
        assert!(details.homepage().is_none());
        assert!(details.certification("AR").is_none());
    }

    #[test]
    fn test_imdb_url_falls_back_to_external_ids() {
        // Arrange
        let details = MovieDetails {
            external_ids: ExternalIds {
                imdb_id: Some(String::from("tt0234215")),
                ..ExternalIds::default()
            },
            ..MovieDetails::default()
        };

        // Act & Assert
        assert_eq!(
            details.imdb_url().as_deref(),
            Some("https://www.imdb.com/title/tt0234215/")
        );
    }

    #[test]
    fn test_parse_error_response() {
        // Arrange
        let json = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;

        // Act
        let error: TmdbErrorResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(error.status_code, 7);
        assert!(error.status_message.contains("Invalid API key"));
    }
}

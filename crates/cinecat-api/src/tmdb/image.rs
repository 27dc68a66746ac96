//! TMDB image CDN URLs.

/// Base URL of the TMDB image CDN.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Image size tokens understood by the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    /// `w185`, used for cast thumbnails.
    Thumbnail,
    /// `w342`, used for detail posters.
    Medium,
    /// `w500`, used for list posters.
    Large,
    /// Full-size original, used for backdrops.
    Original,
}

impl ImageSize {
    /// Size token inserted into the URL.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Thumbnail => "w185",
            Self::Medium => "w342",
            Self::Large => "w500",
            Self::Original => "original",
        }
    }
}

/// Builds an image URL from a path fragment returned by the API.
///
/// Returns `None` for a missing or blank path so callers can show a
/// placeholder instead of a broken link.
#[must_use]
pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!(
        "{IMAGE_BASE_URL}{}{separator}{path}",
        size.token()
    ))
}

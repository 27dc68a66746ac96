//! Display helpers shared by the TUI and the one-shot subcommands.
//!
//! Every helper turns an optional API value into the text shown to the
//! user, substituting a placeholder when the value is missing.

use chrono::NaiveDate;
use cinecat_api::tmdb::{CastMember, ImageSize, MovieSummary, Section, image_url};

/// Shown instead of a poster URL.
pub const POSTER_PLACEHOLDER: &str = "Sin póster";
/// Shown for a missing rating, vote count, date, or runtime.
pub const MISSING: &str = "—";
/// Shown for a missing overview.
pub const NO_OVERVIEW: &str = "Sin sinopsis.";
/// Shown for an empty cast or director list.
pub const NOT_AVAILABLE: &str = "No disponible.";
/// Shown while a request is in flight.
pub const LOADING: &str = "Cargando…";

/// Tab and heading label of a section.
#[must_use]
pub const fn section_label(section: Section) -> &'static str {
    match section {
        Section::Popular => "Populares",
        Section::NowPlaying => "En cartelera",
        Section::TopRated => "Mejor valoradas",
        Section::Upcoming => "Próximamente",
        Section::Discover => "Descubrir",
        Section::Search => "Búsqueda",
    }
}

/// Rating with one decimal, e.g. `★ 7.3`.
#[must_use]
pub fn rating_label(vote_average: Option<f64>) -> String {
    vote_average
        .filter(|v| v.is_finite())
        .map_or_else(|| String::from(MISSING), |v| format!("★ {v:.1}"))
}

/// Vote count, e.g. `24310 votos`.
#[must_use]
pub fn votes_label(vote_count: Option<u32>) -> String {
    vote_count.map_or_else(|| String::from(MISSING), |n| format!("{n} votos"))
}

/// Release date as `dd/mm/yyyy`; unparseable dates are shown verbatim.
#[must_use]
pub fn date_label(release_date: Option<&str>) -> String {
    let Some(raw) = release_date.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::from(MISSING);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_or_else(
        |_| raw.to_owned(),
        |date| date.format("%d/%m/%Y").to_string(),
    )
}

/// Title followed by the release year when known, e.g. `Matrix (1999)`.
#[must_use]
pub fn title_with_year(movie: &MovieSummary) -> String {
    movie.release_year().map_or_else(
        || movie.title.clone(),
        |year| format!("{} ({year})", movie.title),
    )
}

/// Overview text or placeholder.
#[must_use]
pub fn overview_text(overview: Option<&str>) -> &str {
    overview.unwrap_or(NO_OVERVIEW)
}

/// Runtime as hours and minutes, e.g. `2h 16m`.
#[must_use]
pub fn runtime_label(runtime: Option<u32>) -> String {
    match runtime {
        None | Some(0) => String::from(MISSING),
        Some(minutes) if minutes < 60 => format!("{minutes}m"),
        Some(minutes) => format!("{}h {}m", minutes / 60, minutes % 60),
    }
}

/// Poster URL or placeholder.
#[must_use]
pub fn poster_label(poster_path: Option<&str>, size: ImageSize) -> String {
    image_url(poster_path, size).unwrap_or_else(|| String::from(POSTER_PLACEHOLDER))
}

/// Comma-separated names, or placeholder when empty.
#[must_use]
pub fn people_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let joined = names
        .into_iter()
        .filter(|n| !n.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        String::from(NOT_AVAILABLE)
    } else {
        joined
    }
}

/// Cast member with character, e.g. `Keanu Reeves como Neo`.
#[must_use]
pub fn cast_line(member: &CastMember) -> String {
    match member.character.as_deref().map(str::trim) {
        Some(character) if !character.is_empty() => format!("{} como {character}", member.name),
        _ => member.name.clone(),
    }
}

/// Pager status line.
#[must_use]
pub fn page_status(page: u32, total_pages: u32) -> String {
    format!("Página {page} de {total_pages}")
}

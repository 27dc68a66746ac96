//! TUI module for the interactive movie browser.
//!
//! Uses `ratatui` + `crossterm` for rendering and tokio tasks for
//! background TMDB requests.

mod browser;
/// Background request orchestration.
pub mod fetch;
/// Display helpers (placeholders, labels).
pub mod present;
/// Browser session state.
pub mod state;
mod ui;

pub use browser::run_browser;

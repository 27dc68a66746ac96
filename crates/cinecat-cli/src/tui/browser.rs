//! Movie browser TUI main loop.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use cinecat_api::tmdb::{Credential, QueryBuilder, Section, TmdbClient};
use cinecat_store::{LocalStorage, ReviewStore, remove_credential, save_credential};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use url::Url;

use super::fetch::{FetchOutcome, Fetcher};
use super::state::{BrowserState, InputMode};
use super::ui::{self, DrawContext};
use crate::config::TmdbConfig;

/// Idle wait between frames when no key is pending.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Everything the browser loop owns besides the terminal.
struct Browser {
    state: BrowserState,
    fetcher: Fetcher<TmdbClient>,
    outcomes: UnboundedReceiver<FetchOutcome>,
    settings: TmdbConfig,
    queries: QueryBuilder,
    storage: LocalStorage,
    reviews: ReviewStore,
    credential: Option<Credential>,
    /// Listing inputs of the last started fetch.
    last_request: Option<(Option<Url>, u64)>,
}

/// Runs the browser TUI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails. Request and
/// storage failures are shown on screen instead.
#[allow(clippy::module_name_repetitions)]
pub async fn run_browser(
    settings: TmdbConfig,
    storage: LocalStorage,
    reviews: ReviewStore,
    credential: Option<Credential>,
) -> Result<()> {
    let mut browser = Browser::new(settings, storage, reviews, credential)?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = browser.run_event_loop(&mut terminal).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

impl Browser {
    /// Builds the browser with a client for `credential`, if any.
    fn new(
        settings: TmdbConfig,
        storage: LocalStorage,
        reviews: ReviewStore,
        credential: Option<Credential>,
    ) -> Result<Self> {
        let queries = settings.queries()?;
        let (tx, outcomes) = mpsc::unbounded_channel();
        let api = match credential.clone() {
            Some(c) => Some(settings.build_client(c)?),
            None => None,
        };
        Ok(Self {
            state: BrowserState::new(credential.is_some()),
            fetcher: Fetcher::new(api, tx),
            outcomes,
            settings,
            queries,
            storage,
            reviews,
            credential,
            last_request: None,
        })
    }

    /// Main event loop.
    async fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            self.drain_outcomes();
            self.refresh_listing();

            let hint = self.credential.as_ref().map(Credential::masked);
            let ctx = DrawContext {
                reviews: &self.reviews,
                region: self.queries.region_tag(),
                credential_hint: hint.as_deref(),
            };
            let state = &mut self.state;
            terminal
                .draw(|frame| ui::draw(frame, state, &ctx))
                .context("failed to draw TUI")?;

            if event::poll(Duration::ZERO).context("failed to poll events")? {
                if let Event::Key(key) = event::read().context("failed to read event")?
                    && key.kind == KeyEventKind::Press
                    && self.handle_key(key)
                {
                    return Ok(());
                }
                tokio::task::yield_now().await;
            } else {
                // Yield so fetch tasks on this runtime make progress.
                tokio::time::sleep(FRAME_INTERVAL).await;
            }
        }
    }

    /// Commits finished requests that are still current.
    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            let accepted = match outcome {
                FetchOutcome::Listing { ticket, result } => self.state.apply_listing(ticket, result),
                FetchOutcome::Detail { ticket, result } => self.state.apply_detail(ticket, result),
            };
            if !accepted {
                tracing::debug!("discarded stale response");
            }
        }
    }

    /// Starts a listing fetch when the endpoint or credential changed.
    fn refresh_listing(&mut self) {
        let endpoint = self.state.endpoint(&self.queries);
        let request = (endpoint, self.state.credential_generation());
        if self.last_request.as_ref() == Some(&request) {
            return;
        }
        if let Some(url) = request.0.clone() {
            let ticket = self.state.begin_listing();
            self.fetcher.fetch_listing(ticket, url);
        }
        self.last_request = Some(request);
    }

    /// Handles a key press. Returns `true` to exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.state.status = None;
        match self.state.input_mode {
            InputMode::Search => self.handle_search_input(key.code),
            InputMode::Credential => self.handle_credential_input(key.code),
            InputMode::Review => self.handle_review_input(key.code),
            InputMode::Normal if self.state.selection.is_some() => {
                return self.handle_detail_input(key.code);
            }
            InputMode::Normal => return self.handle_list_input(key.code),
        }
        false
    }

    /// Handles key input in the list view. Returns `true` to exit.
    fn handle_list_input(&mut self, key: KeyCode) -> bool {
        let state = &mut self.state;
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => state.move_up(),
            KeyCode::Down | KeyCode::Char('j') => state.move_down(),
            KeyCode::Left | KeyCode::PageUp => {
                state.prev_page();
            }
            KeyCode::Right | KeyCode::PageDown => {
                state.next_page();
            }
            KeyCode::Tab => state.next_tab(),
            KeyCode::Char(c @ '1'..='4') => {
                let index = usize::from(u8::try_from(c).unwrap_or(b'1').saturating_sub(b'1'));
                if let Some(section) = Section::TABS.get(index) {
                    state.select_section(*section);
                }
            }
            KeyCode::Char('/') => {
                state.search_draft.clone_from(&state.search);
                state.input_mode = InputMode::Search;
            }
            KeyCode::Char('c') => state.clear_search(),
            KeyCode::Char('a') => {
                state.credential_draft.clear();
                state.input_mode = InputMode::Credential;
            }
            KeyCode::Char('r') => {
                // Force a refetch of the current listing.
                self.last_request = None;
            }
            KeyCode::Enter => {
                if let Some((ticket, movie_id)) = state.open_detail() {
                    self.fetcher.fetch_detail(ticket, movie_id);
                }
            }
            _ => {}
        }
        false
    }

    /// Handles key input in the detail view. Returns `true` to exit.
    fn handle_detail_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Backspace => self.state.close_detail(),
            KeyCode::Up | KeyCode::Char('k') => self.state.scroll_detail(false),
            KeyCode::Down | KeyCode::Char('j') => self.state.scroll_detail(true),
            KeyCode::Char(c @ '0'..='7') => {
                let rating = u8::try_from(c).unwrap_or(b'0').saturating_sub(b'0');
                self.state.set_draft_rating(rating);
            }
            KeyCode::Char('r') => self.state.input_mode = InputMode::Review,
            KeyCode::Char('o') => self.open_link(LinkKind::Tmdb),
            KeyCode::Char('i') => self.open_link(LinkKind::Imdb),
            KeyCode::Char('h') => self.open_link(LinkKind::Homepage),
            _ => {}
        }
        false
    }

    /// Handles key input while editing the search box.
    fn handle_search_input(&mut self, key: KeyCode) {
        let state = &mut self.state;
        match key {
            KeyCode::Esc => {
                state.search_draft.clone_from(&state.search);
                state.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => state.submit_search(),
            KeyCode::Backspace => {
                state.search_draft.pop();
            }
            KeyCode::Char(c) => state.search_draft.push(c),
            _ => {}
        }
    }

    /// Handles key input in the credential popover.
    fn handle_credential_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.state.credential_draft.clear();
                self.state.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let draft = std::mem::take(&mut self.state.credential_draft);
                self.state.input_mode = InputMode::Normal;
                self.apply_credential(&draft);
            }
            KeyCode::Delete => {
                self.state.credential_draft.clear();
                self.state.input_mode = InputMode::Normal;
                self.clear_credential();
            }
            KeyCode::Backspace => {
                self.state.credential_draft.pop();
            }
            KeyCode::Char(c) => self.state.credential_draft.push(c),
            _ => {}
        }
    }

    /// Handles key input in the review composer.
    fn handle_review_input(&mut self, key: KeyCode) {
        let state = &mut self.state;
        match key {
            KeyCode::Esc => state.input_mode = InputMode::Normal,
            KeyCode::Left => state.adjust_draft_rating(false),
            KeyCode::Right => state.adjust_draft_rating(true),
            KeyCode::Backspace => {
                state.review_draft.comment.pop();
            }
            KeyCode::Char(c) => state.review_draft.comment.push(c),
            KeyCode::Enter => match state.submit_review(&mut self.reviews) {
                Ok(true) => state.status = Some(String::from("Reseña guardada.")),
                Ok(false) => state.status = Some(String::from("Escribí un comentario.")),
                Err(e) => {
                    tracing::debug!(error = %format!("{e:#}"), "failed to save review");
                    state.status = Some(format!("No se pudo guardar la reseña: {e}"));
                }
            },
            _ => {}
        }
    }

    /// Persists a newly entered credential and switches the client to it.
    ///
    /// Blank input keeps the current credential.
    fn apply_credential(&mut self, raw: &str) {
        let Some(credential) = Credential::new(raw) else {
            return;
        };
        if let Err(e) = save_credential(&self.storage, raw) {
            self.state.status = Some(format!("No se pudo guardar la API key: {e}"));
            return;
        }
        match self.settings.build_client(credential.clone()) {
            Ok(client) => {
                self.fetcher.set_api(Some(client));
                self.credential = Some(credential);
                self.state.credential_changed(true);
                self.state.status = Some(String::from("API key guardada."));
            }
            Err(e) => {
                self.state.status = Some(format!("No se pudo crear el cliente: {e}"));
            }
        }
    }

    /// Deletes the stored credential and stops fetching.
    fn clear_credential(&mut self) {
        if let Err(e) = remove_credential(&self.storage) {
            self.state.status = Some(format!("No se pudo borrar la API key: {e}"));
            return;
        }
        self.fetcher.set_api(None);
        self.credential = None;
        self.state.credential_changed(false);
        self.state.status = Some(String::from("API key eliminada."));
    }

    /// Opens an external page of the open movie in the browser.
    fn open_link(&mut self, kind: LinkKind) {
        let url = match (kind, self.state.loaded_details()) {
            (LinkKind::Tmdb, Some(details)) => Some(details.tmdb_url()),
            (LinkKind::Imdb, Some(details)) => details.imdb_url(),
            (LinkKind::Homepage, Some(details)) => details.homepage().map(String::from),
            (_, None) => None,
        };
        let Some(url) = url else {
            self.state.status = Some(String::from("Enlace no disponible."));
            return;
        };
        if let Err(e) = open::that(&url) {
            self.state.status = Some(format!("No se pudo abrir {url}: {e}"));
        }
    }
}

/// External page kinds of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Tmdb,
    Imdb,
    Homepage,
}

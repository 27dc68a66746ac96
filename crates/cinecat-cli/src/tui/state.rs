//! Browser session state.
//!
//! Holds everything the screen shows and decides which asynchronous
//! results may be committed. Each listing or detail request is tagged with
//! a ticket; only the most recently issued ticket of its kind is accepted,
//! so a slow response can never overwrite a newer one.

use anyhow::Result;
use cinecat_api::tmdb::{MovieDetails, MoviePage, MovieSummary, QueryBuilder, Section};
use cinecat_store::{MAX_RATING, ReviewStore};
use ratatui::widgets::TableState;
use url::Url;

/// Input mode for the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Editing the search box.
    Search,
    /// Editing the API credential.
    Credential,
    /// Writing a review comment.
    Review,
}

/// Detail sub-state of the open movie.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Request in flight.
    Loading,
    /// Detail record received.
    Loaded(Box<MovieDetails>),
    /// Request failed with a user-facing message.
    Failed(String),
}

/// The movie whose detail view is open.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Listing entry that was opened.
    pub movie: MovieSummary,
    /// Detail loading state.
    pub detail: DetailState,
    /// Ticket of the detail request issued for this selection.
    ticket: u64,
}

/// Review being composed in the detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Star rating in `0..=MAX_RATING`.
    pub rating: u8,
    /// Comment text.
    pub comment: String,
}

/// State for the browser TUI.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct BrowserState {
    /// Active listing section.
    pub section: Section,
    /// Current page (1-based).
    pub page: u32,
    /// Total pages of the last committed listing (1..=500).
    total_pages: u32,
    /// Submitted search text.
    pub search: String,
    /// Search box contents while editing.
    pub search_draft: String,
    /// Movies of the last committed listing.
    pub items: Vec<MovieSummary>,
    /// A listing request is in flight.
    pub loading: bool,
    /// Message of the last failed listing request.
    pub error: Option<String>,
    /// Open detail view, if any.
    pub selection: Option<Selection>,
    /// Scroll offset of the detail view.
    pub detail_scroll: u16,
    /// Review composer contents.
    pub review_draft: ReviewDraft,
    /// Credential popover contents.
    pub credential_draft: String,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Transient message shown in the footer.
    pub status: Option<String>,
    /// Table state for the movie list (handles selection and scroll).
    pub list_state: TableState,
    /// Whether a credential is configured.
    has_credential: bool,
    /// Bumped on every credential change to force a refetch.
    credential_generation: u64,
    /// Latest issued listing ticket.
    listing_ticket: u64,
    /// Latest issued detail ticket.
    detail_ticket: u64,
}

impl BrowserState {
    /// Creates the initial state on the first page of the popular listing.
    #[must_use]
    pub fn new(has_credential: bool) -> Self {
        Self {
            section: Section::Popular,
            page: 1,
            total_pages: 1,
            search: String::new(),
            search_draft: String::new(),
            items: Vec::new(),
            loading: false,
            error: None,
            selection: None,
            detail_scroll: 0,
            review_draft: ReviewDraft::default(),
            credential_draft: String::new(),
            input_mode: InputMode::Normal,
            status: None,
            list_state: TableState::default(),
            has_credential,
            credential_generation: 0,
            listing_ticket: 0,
            detail_ticket: 0,
        }
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Generation counter of the credential.
    #[must_use]
    pub const fn credential_generation(&self) -> u64 {
        self.credential_generation
    }

    /// Total pages of the current listing.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Listing URL for the current selection, `None` without a credential.
    #[must_use]
    pub fn endpoint(&self, queries: &QueryBuilder) -> Option<Url> {
        queries.listing(self.has_credential, self.section, self.page, &self.search)
    }

    /// Records a credential change.
    ///
    /// Removing the credential drops the listing and discards any request
    /// still in flight.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn credential_changed(&mut self, present: bool) {
        self.has_credential = present;
        self.credential_generation += 1;
        if !present {
            self.listing_ticket += 1;
            self.detail_ticket += 1;
            self.items.clear();
            self.list_state.select(None);
            self.loading = false;
            self.error = None;
            self.selection = None;
        }
    }

    // --- Listing ---

    /// Switches to a category tab and resets to page 1.
    pub fn select_section(&mut self, section: Section) {
        if self.section == section && self.search.is_empty() {
            return;
        }
        self.section = section;
        self.search.clear();
        self.search_draft.clear();
        self.page = 1;
    }

    /// Cycles to the next category tab.
    pub fn next_tab(&mut self) {
        let next = Section::TABS
            .iter()
            .position(|s| *s == self.section)
            .and_then(|i| Section::TABS.get(i.saturating_add(1)))
            .copied()
            .unwrap_or(Section::Popular);
        self.select_section(next);
    }

    /// Commits the search draft.
    ///
    /// Non-blank text switches to the search listing; blank text behaves
    /// like [`clear_search`](Self::clear_search).
    pub fn submit_search(&mut self) {
        let query = self.search_draft.trim().to_owned();
        self.input_mode = InputMode::Normal;
        if query.is_empty() {
            self.clear_search();
            return;
        }
        self.section = Section::Search;
        self.search_draft.clone_from(&query);
        self.search = query;
        self.page = 1;
    }

    /// Clears the search text and returns to the popular listing on page 1.
    pub fn clear_search(&mut self) {
        self.section = Section::Popular;
        self.search.clear();
        self.search_draft.clear();
        self.page = 1;
    }

    /// Whether the previous-page control is enabled.
    #[must_use]
    pub const fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether the next-page control is enabled.
    #[must_use]
    pub const fn can_go_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Goes to the previous page. Returns whether the page changed.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn prev_page(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Goes to the next page. Returns whether the page changed.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Marks a new listing request as started and returns its ticket.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn begin_listing(&mut self) -> u64 {
        self.listing_ticket += 1;
        self.loading = true;
        self.error = None;
        self.listing_ticket
    }

    /// Commits a listing result if `ticket` is still current.
    ///
    /// On failure the previous items stay visible. Returns whether the
    /// result was accepted.
    pub fn apply_listing(&mut self, ticket: u64, result: Result<MoviePage, String>) -> bool {
        if ticket != self.listing_ticket {
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.total_pages = page.total_pages();
                // A shrunken listing moves the cursor to its new last page.
                self.page = self.page.min(self.total_pages);
                self.items = page.results;
                self.error = None;
                self.list_state
                    .select(if self.items.is_empty() { None } else { Some(0) });
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Highlighted list entry.
    #[must_use]
    pub fn highlighted(&self) -> Option<&MovieSummary> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    /// Moves the highlight up.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_up(&mut self) {
        if let Some(current) = self.list_state.selected()
            && current > 0
        {
            self.list_state.select(Some(current - 1));
        }
    }

    /// Moves the highlight down.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_down(&mut self) {
        match self.list_state.selected() {
            Some(current) if current + 1 < self.items.len() => {
                self.list_state.select(Some(current + 1));
            }
            None if !self.items.is_empty() => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    // --- Detail ---

    /// Opens the detail view for the highlighted movie.
    ///
    /// Returns the ticket and movie id to fetch, or `None` (no change)
    /// without a credential or highlighted movie.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn open_detail(&mut self) -> Option<(u64, u64)> {
        if !self.has_credential {
            return None;
        }
        let movie = self.highlighted()?.clone();
        self.detail_ticket += 1;
        let movie_id = movie.id;
        self.selection = Some(Selection {
            movie,
            detail: DetailState::Loading,
            ticket: self.detail_ticket,
        });
        self.detail_scroll = 0;
        self.review_draft = ReviewDraft::default();
        Some((self.detail_ticket, movie_id))
    }

    /// Commits a detail result if it belongs to the open selection.
    ///
    /// Returns whether the result was accepted.
    pub fn apply_detail(&mut self, ticket: u64, result: Result<MovieDetails, String>) -> bool {
        if ticket != self.detail_ticket {
            return false;
        }
        let Some(selection) = self.selection.as_mut().filter(|s| s.ticket == ticket) else {
            return false;
        };
        selection.detail = match result {
            Ok(details) => DetailState::Loaded(Box::new(details)),
            Err(message) => DetailState::Failed(message),
        };
        true
    }

    /// Closes the detail view. A request still in flight is ignored when it lands.
    pub fn close_detail(&mut self) {
        self.selection = None;
        self.review_draft = ReviewDraft::default();
        self.input_mode = InputMode::Normal;
    }

    /// Scrolls the detail view by one line.
    pub const fn scroll_detail(&mut self, down: bool) {
        self.detail_scroll = if down {
            self.detail_scroll.saturating_add(1)
        } else {
            self.detail_scroll.saturating_sub(1)
        };
    }

    /// Loaded detail record of the open selection.
    #[must_use]
    pub fn loaded_details(&self) -> Option<&MovieDetails> {
        match &self.selection.as_ref()?.detail {
            DetailState::Loaded(details) => Some(details.as_ref()),
            DetailState::Loading | DetailState::Failed(_) => None,
        }
    }

    // --- Reviews ---

    /// Sets the draft rating, clamped to [`MAX_RATING`].
    pub fn set_draft_rating(&mut self, rating: u8) {
        self.review_draft.rating = rating.min(MAX_RATING);
    }

    /// Raises or lowers the draft rating by one star.
    pub fn adjust_draft_rating(&mut self, up: bool) {
        let rating = if up {
            self.review_draft.rating.saturating_add(1)
        } else {
            self.review_draft.rating.saturating_sub(1)
        };
        self.set_draft_rating(rating);
    }

    /// Saves the review draft for the open movie.
    ///
    /// The draft is cleared only when a review was stored. Returns whether
    /// anything was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the review store cannot persist the review.
    pub fn submit_review(&mut self, store: &mut ReviewStore) -> Result<bool> {
        let movie_id = self.selection.as_ref().map(|s| s.movie.id);
        let added = store.add_review(
            movie_id,
            self.review_draft.rating,
            &self.review_draft.comment,
        )?;
        if added {
            self.review_draft = ReviewDraft::default();
            self.input_mode = InputMode::Normal;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::path::PathBuf;

    use cinecat_store::LocalStorage;

    use super::*;

    fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: String::from(title),
            ..MovieSummary::default()
        }
    }

    fn page(ids: &[u64], total_pages: Option<u32>) -> MoviePage {
        MoviePage {
            page: Some(1),
            results: ids.iter().map(|id| movie(*id, "Movie")).collect(),
            total_pages,
            total_results: None,
        }
    }

    fn loaded_state() -> BrowserState {
        let mut state = BrowserState::new(true);
        let ticket = state.begin_listing();
        state.apply_listing(ticket, Ok(page(&[603, 604, 605], Some(48))));
        state
    }

    #[test]
    fn test_initial_state() {
        // Arrange & Act
        let state = BrowserState::new(true);

        // Assert
        assert_eq!(state.section, Section::Popular);
        assert_eq!(state.page, 1);
        assert_eq!(state.total_pages(), 1);
        assert!(!state.can_go_prev());
        assert!(!state.can_go_next());
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_endpoint_requires_credential() {
        // Arrange
        let queries = QueryBuilder::public().unwrap();
        let with_key = BrowserState::new(true);
        let without_key = BrowserState::new(false);

        // Act & Assert
        let url = with_key.endpoint(&queries).unwrap();
        assert!(url.path().ends_with("/movie/popular"));
        assert!(url.query().unwrap().contains("page=1"));
        assert!(without_key.endpoint(&queries).is_none());
    }

    #[test]
    fn test_apply_listing_sets_items_and_pages() {
        // Arrange & Act
        let state = loaded_state();

        // Assert
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.total_pages(), 48);
        assert!(!state.loading);
        assert_eq!(state.highlighted().unwrap().id, 603);
        assert!(state.can_go_next());
    }

    #[test]
    fn test_total_pages_clamped_to_500() {
        // Arrange
        let mut state = BrowserState::new(true);
        let ticket = state.begin_listing();

        // Act
        state.apply_listing(ticket, Ok(page(&[1], Some(48_213))));

        // Assert
        assert_eq!(state.total_pages(), 500);
    }

    #[test]
    fn test_single_page_disables_both_controls() {
        // Arrange
        let mut state = BrowserState::new(true);
        state.search_draft = String::from("Matrix");
        state.submit_search();
        let ticket = state.begin_listing();

        // Act
        state.apply_listing(ticket, Ok(page(&[603, 604, 605], Some(1))));

        // Assert
        assert_eq!(state.items.len(), 3);
        assert!(!state.can_go_prev());
        assert!(!state.can_go_next());
        assert!(!state.next_page());
        assert!(!state.prev_page());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_paging_bounds() {
        // Arrange
        let mut state = BrowserState::new(true);
        let ticket = state.begin_listing();
        state.apply_listing(ticket, Ok(page(&[1], Some(2))));

        // Act & Assert
        assert!(state.next_page());
        assert_eq!(state.page, 2);
        assert!(!state.can_go_next());
        assert!(!state.next_page());
        assert!(state.prev_page());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_page_clamped_when_listing_shrinks() {
        // Arrange
        let queries = QueryBuilder::public().unwrap();
        let mut state = BrowserState::new(true);
        let ticket = state.begin_listing();
        state.apply_listing(ticket, Ok(page(&[1], Some(10))));
        for _ in 0..6 {
            state.next_page();
        }
        assert_eq!(state.page, 7);
        let ticket = state.begin_listing();

        // Act
        state.apply_listing(ticket, Ok(page(&[1], Some(3))));

        // Assert
        assert_eq!(state.page, 3);
        assert_eq!(state.total_pages(), 3);
        assert!(!state.can_go_next());
        assert!(state.can_go_prev());
        assert!(state.endpoint(&queries).unwrap().query().unwrap().contains("page=3"));
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        // Arrange
        let mut state = BrowserState::new(true);
        let first = state.begin_listing();
        let second = state.begin_listing();

        // Act
        let second_applied = state.apply_listing(second, Ok(page(&[2], Some(3))));
        let first_applied = state.apply_listing(first, Ok(page(&[1], Some(9))));

        // Assert
        assert!(second_applied);
        assert!(!first_applied);
        assert_eq!(state.items[0].id, 2);
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn test_listing_error_keeps_previous_items() {
        // Arrange
        let mut state = loaded_state();
        let ticket = state.begin_listing();
        assert!(state.error.is_none());

        // Act
        state.apply_listing(ticket, Err(String::from("could not query TMDB (HTTP 401)")));

        // Assert
        assert!(!state.loading);
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.error.as_deref(), Some("could not query TMDB (HTTP 401)"));
    }

    #[test]
    fn test_section_change_resets_page_and_search() {
        // Arrange
        let mut state = loaded_state();
        state.next_page();
        state.search_draft = String::from("Matrix");
        state.submit_search();
        state.next_page();

        // Act
        state.select_section(Section::TopRated);

        // Assert
        assert_eq!(state.section, Section::TopRated);
        assert_eq!(state.page, 1);
        assert!(state.search.is_empty());
    }

    #[test]
    fn test_next_tab_cycles() {
        // Arrange
        let mut state = BrowserState::new(true);

        // Act & Assert
        state.next_tab();
        assert_eq!(state.section, Section::NowPlaying);
        state.next_tab();
        state.next_tab();
        assert_eq!(state.section, Section::Upcoming);
        state.next_tab();
        assert_eq!(state.section, Section::Popular);
    }

    #[test]
    fn test_submit_search_switches_section() {
        // Arrange
        let queries = QueryBuilder::public().unwrap();
        let mut state = loaded_state();
        state.next_page();
        state.input_mode = InputMode::Search;
        state.search_draft = String::from("  Matrix ");

        // Act
        state.submit_search();

        // Assert
        assert_eq!(state.section, Section::Search);
        assert_eq!(state.search, "Matrix");
        assert_eq!(state.page, 1);
        assert_eq!(state.input_mode, InputMode::Normal);
        let url = state.endpoint(&queries).unwrap();
        assert!(url.path().ends_with("/search/movie"));
        assert!(url.query().unwrap().contains("query=Matrix"));
    }

    #[test]
    fn test_clear_search_returns_to_popular() {
        // Arrange
        let queries = QueryBuilder::public().unwrap();
        let mut state = loaded_state();
        state.search_draft = String::from("Matrix");
        state.submit_search();
        let ticket = state.begin_listing();
        state.apply_listing(ticket, Ok(page(&[603], Some(4))));
        state.next_page();

        // Act
        state.clear_search();

        // Assert
        assert_eq!(state.section, Section::Popular);
        assert_eq!(state.page, 1);
        assert!(state.search.is_empty());
        assert!(state.search_draft.is_empty());
        let url = state.endpoint(&queries).unwrap();
        assert!(url.path().ends_with("/movie/popular"));
        assert!(url.query().unwrap().contains("page=1"));
    }

    #[test]
    fn test_blank_search_submit_returns_to_popular() {
        // Arrange
        let mut state = BrowserState::new(true);
        state.select_section(Section::TopRated);
        state.search_draft = String::from("   ");

        // Act
        state.submit_search();

        // Assert
        assert_eq!(state.section, Section::Popular);
        assert!(state.search.is_empty());
    }

    #[test]
    fn test_move_up_and_down() {
        // Arrange
        let mut state = loaded_state();

        // Act & Assert
        state.move_up();
        assert_eq!(state.list_state.selected(), Some(0));
        state.move_down();
        state.move_down();
        state.move_down();
        assert_eq!(state.list_state.selected(), Some(2));
        state.move_up();
        assert_eq!(state.highlighted().unwrap().id, 604);
    }

    #[test]
    fn test_open_detail_without_credential_is_noop() {
        // Arrange
        let mut state = loaded_state();
        state.credential_changed(false);

        // Act
        let request = state.open_detail();

        // Assert
        assert!(request.is_none());
        assert!(state.selection.is_none());
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_open_detail_then_loaded() {
        // Arrange
        let mut state = loaded_state();
        let (ticket, movie_id) = state.open_detail().unwrap();
        assert_eq!(movie_id, 603);
        assert_eq!(state.selection.as_ref().unwrap().detail, DetailState::Loading);
        let details = MovieDetails {
            id: 603,
            runtime: Some(136),
            ..MovieDetails::default()
        };

        // Act
        let applied = state.apply_detail(ticket, Ok(details));

        // Assert
        assert!(applied);
        assert_eq!(state.loaded_details().unwrap().runtime, Some(136));
    }

    #[test]
    fn test_open_detail_failure() {
        // Arrange
        let mut state = loaded_state();
        let (ticket, _) = state.open_detail().unwrap();

        // Act
        state.apply_detail(ticket, Err(String::from("could not query TMDB (HTTP 404)")));

        // Assert
        assert_eq!(
            state.selection.as_ref().unwrap().detail,
            DetailState::Failed(String::from("could not query TMDB (HTTP 404)"))
        );
        assert!(state.loaded_details().is_none());
    }

    #[test]
    fn test_detail_result_after_close_is_discarded() {
        // Arrange
        let mut state = loaded_state();
        let (ticket, _) = state.open_detail().unwrap();
        state.close_detail();

        // Act
        let applied = state.apply_detail(ticket, Ok(MovieDetails::default()));

        // Assert
        assert!(!applied);
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_detail_result_never_lands_on_other_movie() {
        // Arrange
        let mut state = loaded_state();
        let (first, _) = state.open_detail().unwrap();
        state.close_detail();
        state.move_down();
        let (second, second_id) = state.open_detail().unwrap();
        assert_eq!(second_id, 604);

        // Act
        let stale = state.apply_detail(
            first,
            Ok(MovieDetails {
                id: 603,
                ..MovieDetails::default()
            }),
        );

        // Assert
        assert!(!stale);
        assert_eq!(state.selection.as_ref().unwrap().detail, DetailState::Loading);
        assert!(state.apply_detail(
            second,
            Ok(MovieDetails {
                id: 604,
                ..MovieDetails::default()
            })
        ));
        assert_eq!(state.loaded_details().unwrap().id, 604);
    }

    #[test]
    fn test_credential_change_bumps_generation() {
        // Arrange
        let mut state = BrowserState::new(false);
        let before = state.credential_generation();

        // Act
        state.credential_changed(true);

        // Assert
        assert!(state.has_credential());
        assert_eq!(state.credential_generation(), before + 1);
    }

    #[test]
    fn test_draft_rating_clamped() {
        // Arrange
        let mut state = BrowserState::new(true);

        // Act & Assert
        state.set_draft_rating(9);
        assert_eq!(state.review_draft.rating, MAX_RATING);
        state.adjust_draft_rating(true);
        assert_eq!(state.review_draft.rating, MAX_RATING);
        state.set_draft_rating(0);
        state.adjust_draft_rating(false);
        assert_eq!(state.review_draft.rating, 0);
    }

    #[test]
    fn test_submit_review_stores_and_clears_draft() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(Some(&PathBuf::from(dir.path()))).unwrap();
        let mut store = ReviewStore::load_all(storage).unwrap();
        let mut state = loaded_state();
        state.open_detail().unwrap();
        state.input_mode = InputMode::Review;
        state.set_draft_rating(6);
        state.review_draft.comment = String::from("Un clásico.");

        // Act
        let added = state.submit_review(&mut store).unwrap();

        // Assert
        assert!(added);
        assert_eq!(state.review_draft, ReviewDraft::default());
        assert_eq!(state.input_mode, InputMode::Normal);
        let reviews = store.reviews_for(603);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 6);
    }

    #[test]
    fn test_submit_review_blank_keeps_draft() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(Some(&PathBuf::from(dir.path()))).unwrap();
        let mut store = ReviewStore::load_all(storage).unwrap();
        let mut state = loaded_state();
        state.open_detail().unwrap();
        state.set_draft_rating(4);

        // Act
        let added = state.submit_review(&mut store).unwrap();

        // Assert
        assert!(!added);
        assert_eq!(state.review_draft.rating, 4);
        assert!(store.all().is_empty());
    }
}

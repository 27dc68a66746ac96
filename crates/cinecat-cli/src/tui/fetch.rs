//! Background TMDB requests for the browser.
//!
//! Requests run as tokio tasks and report back over an unbounded channel.
//! Each outcome carries the ticket it was started with; the state decides
//! whether it is still wanted.

use std::sync::Arc;

use cinecat_api::tmdb::{MovieDetails, MoviePage, TmdbApi};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use url::Url;

/// Result of a background request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Listing or search page.
    Listing {
        /// Ticket issued when the request started.
        ticket: u64,
        /// Page or user-facing error message.
        result: Result<MoviePage, String>,
    },
    /// Movie detail record.
    Detail {
        /// Ticket issued when the request started.
        ticket: u64,
        /// Details or user-facing error message.
        result: Result<MovieDetails, String>,
    },
}

/// Spawns TMDB requests and forwards their outcomes.
#[derive(Debug)]
pub struct Fetcher<C> {
    /// Client; `None` while no credential is configured.
    api: Option<Arc<C>>,
    /// Outcome channel.
    tx: UnboundedSender<FetchOutcome>,
    /// Listing task in flight, aborted when superseded.
    listing_task: Option<JoinHandle<()>>,
}

impl<C> Fetcher<C>
where
    C: TmdbApi + Sync + 'static,
{
    /// Creates a fetcher sending outcomes to `tx`.
    pub fn new(api: Option<C>, tx: UnboundedSender<FetchOutcome>) -> Self {
        Self {
            api: api.map(Arc::new),
            tx,
            listing_task: None,
        }
    }

    /// Replaces the client. Any listing in flight is aborted.
    pub fn set_api(&mut self, api: Option<C>) {
        self.abort_listing();
        self.api = api.map(Arc::new);
    }

    /// Starts a listing request. A previous listing request is aborted.
    ///
    /// Does nothing without a client.
    pub fn fetch_listing(&mut self, ticket: u64, endpoint: Url) {
        self.abort_listing();
        let Some(api) = self.api.clone() else {
            return;
        };
        let tx = self.tx.clone();
        self.listing_task = Some(tokio::spawn(async move {
            let result = api.fetch_listing(&endpoint).await.map_err(|e| {
                tracing::debug!(error = %format!("{e:#}"), "listing request failed");
                e.to_string()
            });
            // Receiver gone means the browser is shutting down.
            let _ = tx.send(FetchOutcome::Listing { ticket, result });
        }));
    }

    /// Starts a detail request.
    ///
    /// Detail requests are not aborted; stale results are dropped by ticket.
    pub fn fetch_detail(&self, ticket: u64, movie_id: u64) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.movie_details(movie_id).await.map_err(|e| {
                tracing::debug!(movie_id, error = %format!("{e:#}"), "detail request failed");
                e.to_string()
            });
            let _ = tx.send(FetchOutcome::Detail { ticket, result });
        });
    }

    fn abort_listing(&mut self) {
        if let Some(task) = self.listing_task.take() {
            task.abort();
        }
    }
}

impl<C> Drop for Fetcher<C> {
    fn drop(&mut self) {
        if let Some(task) = self.listing_task.take() {
            task.abort();
        }
    }
}

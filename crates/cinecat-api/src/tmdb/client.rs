//! `TmdbClient` - TMDB API client implementation.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Response, StatusCode};
use tracing::instrument;
use url::Url;

use super::api::TmdbApi;
use super::auth::Credential;
use super::query::QueryBuilder;
use super::types::{MovieDetails, MoviePage, TmdbErrorResponse};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameter carrying a v3 API key.
const API_KEY_PARAM: &str = "api_key";

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Builds detail URLs (base URL and language).
    queries: QueryBuilder,
    /// User credential.
    credential: Credential,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    queries: Option<QueryBuilder>,
    credential: Option<Credential>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            queries: None,
            credential: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Overrides the query builder (base URL, language, region).
    #[must_use]
    pub fn queries(mut self, queries: QueryBuilder) -> Self {
        self.queries = Some(queries);
        self
    }

    /// Sets the credential (required).
    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `credential` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let credential = self.credential.context("credential is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;
        let queries = match self.queries {
            Some(queries) => queries,
            None => QueryBuilder::public()?,
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            queries,
            credential,
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Returns the query builder used for detail requests.
    #[must_use]
    pub const fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    /// Sends a GET request, first with bearer auth, then with the
    /// `api_key` query parameter if the first attempt is rejected.
    #[instrument(skip_all, fields(path = %url.path()))]
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let path = url.path();
        tracing::debug!(url = %url, "TMDB API request");

        let response = self
            .http_client
            .get(url.clone())
            .bearer_auth(self.credential.bearer_token().unwrap_or_default())
            .send()
            .await
            .with_context(|| format!("request failed: {path}"))?;

        let response = if response.status().is_success() {
            response
        } else {
            tracing::debug!(
                status = %response.status(),
                "bearer auth rejected, retrying with api_key parameter"
            );
            self.get_with_api_key(url).await?
        };

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        raw_result.with_context(|| format!("failed to decode JSON response: {path}"))
    }

    /// Second authentication attempt: credential as a query parameter.
    async fn get_with_api_key(&self, url: &Url) -> Result<Response> {
        let path = url.path();
        let mut fallback = url.clone();
        fallback
            .query_pairs_mut()
            .append_pair(API_KEY_PARAM, self.credential.api_key());

        let response = self
            .http_client
            .get(fallback)
            .send()
            .await
            .with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<failed to read body>"));
        bail!(describe_failure(status, &body));
    }
}

/// Builds the user-facing failure message for a rejected request.
fn describe_failure(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<TmdbErrorResponse>(body).map_or_else(
        |_| format!("could not query TMDB (HTTP {status})"),
        |error| {
            format!(
                "could not query TMDB (HTTP {status}): code={}, message={}",
                error.status_code, error.status_message
            )
        },
    )
}

impl TmdbApi for TmdbClient {
    #[instrument(skip_all)]
    async fn fetch_listing(&self, endpoint: &Url) -> Result<MoviePage> {
        let page: MoviePage = self.get_json(endpoint).await?;
        tracing::debug!(
            results = page.results.len(),
            total_pages = page.total_pages(),
            "TMDB listing fetched"
        );
        Ok(page)
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails> {
        let url = self.queries.movie_details(movie_id)?;
        self.get_json(&url).await
    }
}

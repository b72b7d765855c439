//! HTTP client for the BC API: cursor pagination and bounded retry.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::bc::filter::Filter;
use crate::bc::token::AccessTokenProvider;
use crate::bc::{BcError, BcResult};
use crate::config::BcConfig;

/// Fixed retry budget per page round.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// One page of an OData collection response.
#[derive(Debug, Deserialize)]
pub struct ODataPage<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Client for the BC REST surface.
///
/// Pagination is strictly sequential: every continuation URL comes from the
/// previous page's response, so pages are never fetched in parallel. Each
/// page round re-acquires an access token; a token failure aborts the whole
/// fetch without retry.
pub struct BcClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
    max_attempts: u32,
    retry_unit: Duration,
}

impl BcClient {
    /// Creates a client against the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BcError::Config`] when the base URL is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, tokens: Arc<dyn AccessTokenProvider>) -> BcResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BcError::Config(format!("invalid BC base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BcError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            tokens,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_unit: Duration::from_secs(1),
        })
    }

    /// Creates a client from application configuration.
    pub fn from_config(cfg: &BcConfig, tokens: Arc<dyn AccessTokenProvider>) -> BcResult<Self> {
        let client = Self::new(&cfg.base_url, tokens)?;
        Ok(client.with_retry(cfg.max_attempts, Duration::from_millis(cfg.retry_unit_ms)))
    }

    /// Overrides the retry budget and backoff unit.
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, retry_unit: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_unit = retry_unit;
        self
    }

    /// Fetches every page of a filtered collection into one vector, in page
    /// order.
    #[instrument(skip(self, filter))]
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        filter: &Filter,
    ) -> BcResult<Vec<T>> {
        let mut rows = Vec::new();
        self.get_paginated(endpoint, filter, |page| {
            rows.extend(page);
            Ok(())
        })
        .await?;
        Ok(rows)
    }

    /// Fetches all pages of a filtered collection, handing each page to the
    /// callback as it arrives.
    ///
    /// The first request carries the caller's `$filter`; every follow-up
    /// request uses the server's continuation URL verbatim (it already
    /// encodes the filter) until no continuation is returned.
    pub async fn get_paginated<T, F>(
        &self,
        endpoint: &str,
        filter: &Filter,
        mut callback: F,
    ) -> BcResult<()>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> BcResult<()>,
    {
        let mut url = self.collection_url(endpoint, filter)?.to_string();

        loop {
            debug!(endpoint, %url, "fetching page");
            let page: ODataPage<T> = self.fetch_page(&url, endpoint).await?;

            callback(page.value)?;

            match page.next_link {
                Some(next) => url = next,
                None => return Ok(()),
            }
        }
    }

    /// Fetches one page with the bounded retry policy.
    ///
    /// Only transient failures (network errors, retryable statuses) consume
    /// retry attempts, with a linearly increasing delay between them. A 404
    /// maps to `NotFound` and a body that cannot be parsed into the expected
    /// collection shape maps to `Malformed`; neither is retried.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &str,
    ) -> BcResult<ODataPage<T>> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            // Token failures are fatal regardless of remaining attempts.
            let token = self.tokens.access_token().await?;

            let result = self.try_fetch_page(url, endpoint, &token).await;

            match result {
                Ok(page) => return Ok(page),
                Err(err) if err.is_transient() => {
                    if attempt >= self.max_attempts {
                        return Err(BcError::Exhausted {
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }
                    let delay = self.retry_unit * attempt;
                    warn!(
                        endpoint,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "transient fetch failure, retrying after {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_fetch_page<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &str,
        token: &str,
    ) -> BcResult<ODataPage<T>> {
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BcError::NotFound(endpoint.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BcError::Transient(format!(
                "{endpoint} returned {status}: {body}"
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| BcError::Malformed(format!("{endpoint}: {e}")))
    }

    fn collection_url(&self, endpoint: &str, filter: &Filter) -> BcResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{endpoint}"))
            .map_err(|e| BcError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;

        if let Some(expr) = filter.to_query() {
            url.query_pairs_mut().append_pair("$filter", &expr);
        }

        Ok(url)
    }
}

impl std::fmt::Debug for BcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_attempts", &self.max_attempts)
            .field("retry_unit", &self.retry_unit)
            .finish_non_exhaustive()
    }
}

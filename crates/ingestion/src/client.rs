//! Paginated listing fetch.
//!
//! Requests result pages in order and stops at the first failed page,
//! keeping whatever earlier pages produced.

use crate::listing::{ListingNormalizer, NormalizationStats};
use crate::query::SearchRequest;
use pricefeed_core::{config::SourceConfig, Error, Result, Snapshot};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::Client;
use std::future::Future;
use tracing::{debug, info, warn};

/// Anything that can return the raw body of a numbered result page.
pub trait PageSource {
    /// Fetch page `page` (starting at 1).
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<String>> + Send;
}

/// Result of a paginated fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Transactions gathered from the successful pages.
    pub snapshot: Snapshot,
    /// Pages fetched and parsed successfully.
    pub pages_fetched: u32,
    /// Why the loop stopped before the last page, if it did.
    pub stopped_early: Option<String>,
    /// Listing normalization statistics.
    pub stats: NormalizationStats,
}

/// Fetch pages `1..=max_pages`, stopping at the first failure.
pub async fn fetch_snapshot<S: PageSource>(source: &S, max_pages: u32) -> FetchOutcome {
    let mut normalizer = ListingNormalizer::new();
    let mut transactions = Vec::new();
    let mut pages_fetched = 0;
    let mut stopped_early = None;

    for page in 1..=max_pages {
        info!(page, max_pages, "Fetching listings page");

        let parsed = match source.fetch_page(page).await {
            Ok(body) => normalizer.normalize_page(&body),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(mut page_transactions) => {
                debug!(page, accepted = page_transactions.len(), "Parsed listings page");
                pages_fetched += 1;
                transactions.append(&mut page_transactions);
            }
            Err(e) => {
                warn!(page, error = %e, "Stopping fetch");
                stopped_early = Some(format!("page {page}: {e}"));
                break;
            }
        }
    }

    let stats = normalizer.stats().clone();
    info!(
        pages = pages_fetched,
        transactions = transactions.len(),
        skipped = stats.skipped(),
        acceptance_rate = stats.acceptance_rate(),
        "Fetch complete"
    );

    FetchOutcome {
        snapshot: Snapshot::new(transactions),
        pages_fetched,
        stopped_early,
        stats,
    }
}

/// HTTP client for the listing search endpoint.
pub struct SearchClient {
    client: Client,
    config: SourceConfig,
}

impl SearchClient {
    /// Build a client with the configured browser headers.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
        headers.insert(ORIGIN, header_value(&config.origin)?);
        headers.insert(REFERER, header_value(&config.referer)?);

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Fetch every configured page.
    pub async fn fetch_all(&self) -> FetchOutcome {
        fetch_snapshot(self, self.config.max_pages).await
    }

    /// Source configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }
}

impl PageSource for SearchClient {
    async fn fetch_page(&self, page: u32) -> Result<String> {
        let body = SearchRequest::for_page(&self.config, page);
        let response = self
            .client
            .put(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("status {status}")));
        }

        response.text().await.map_err(|e| Error::fetch(e.to_string()))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::config(format!("invalid header value {value:?}: {e}")))
}

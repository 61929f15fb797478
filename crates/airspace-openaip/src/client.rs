//! OpenAIP HTTP client.

use std::future::Future;
use std::time::Duration;

use airspace_core::RawAirspaceRecord;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::query::AirspaceQuery;

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirspacePage {
    #[serde(default)]
    pub items: Vec<RawAirspaceRecord>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Outcome of a single page request that reached the server.
#[derive(Debug, Clone)]
pub enum PageReply {
    Page(AirspacePage),
    /// Non-2xx status; the caller decides whether to retry.
    Status(u16),
}

/// Anything able to serve airspace pages.
pub trait PageSource: Send + Sync {
    fn fetch_page(
        &self,
        query: &AirspaceQuery,
        page: u32,
    ) -> impl Future<Output = Result<PageReply, FetchError>> + Send;
}

/// HTTP client for the OpenAIP core API.
///
/// Serves single pages; pacing and retries belong to the caller of
/// [`crate::fetch_all_pages`].
#[derive(Debug, Clone)]
pub struct OpenAipClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAipClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Uses a preconfigured reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl PageSource for OpenAipClient {
    async fn fetch_page(&self, query: &AirspaceQuery, page: u32) -> Result<PageReply, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::Configuration("OpenAIP API key is missing".to_string()))?;

        let url = format!("{}/airspaces", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&query.params(page))
            .query(&[("apiKey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("OpenAIP page {} returned HTTP {}", page, status);
            return Ok(PageReply::Status(status.as_u16()));
        }

        let page_data: AirspacePage = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
        debug!(
            "OpenAIP page {}/{}: {} items",
            page,
            page_data.total_pages,
            page_data.items.len()
        );
        Ok(PageReply::Page(page_data))
    }
}

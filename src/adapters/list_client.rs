//! List Client
//!
//! Fetches the current state of a resource collection from the gateway's
//! list endpoint. This is what a refresh actually reloads; the watcher only
//! triggers it.

use crate::domain::endpoint::WatchTarget;
use serde::Deserialize;

/// Errors from a list fetch.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// Collection list response, reduced to what the watcher's consumers show.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSummary {
    /// Items on the returned page.
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    /// Total item count across pages, when the gateway reports one.
    #[serde(rename = "totalItems")]
    pub total_items: Option<usize>,
}

impl ListSummary {
    /// Total item count, falling back to the page size.
    pub fn total(&self) -> usize {
        self.total_items.unwrap_or(self.items.len())
    }
}

/// HTTP client for collection list endpoints.
pub struct ListClient {
    client: reqwest::Client,
    http_base: String,
}

impl ListClient {
    /// Create a client against an HTTP base URL, e.g. `http://gateway:8080`.
    pub fn new(http_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            http_base: http_base.into(),
        }
    }

    /// Fetch the collection for `target`.
    pub async fn fetch(&self, target: &WatchTarget) -> Result<ListSummary, ListError> {
        let url = target.list_url(&self.http_base);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ListError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

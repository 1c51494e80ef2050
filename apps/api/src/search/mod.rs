//! Job search — the Elasticsearch-backed collaborator used in grounded mode.
//!
//! Ranking belongs to the index. This module only translates `Filters` into a
//! bool query and maps hits back into `JobListing`s.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::chat::filters::Filters;

/// Maximum number of listings requested from the index.
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single job document as stored in the index.
///
/// Only `title` is required. Other fields tolerate absence and `null`;
/// `salary_max` accepts any JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobListing {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remote: bool,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "salary_from_number")]
    pub salary_max: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Negative, out-of-range or non-finite values are treated as unknown.
fn salary_from_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.round() as u32))
}

/// Capability to find listings matching a query and its filters.
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, text: &str, filters: &Filters) -> Result<Vec<JobListing>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "_source", default)]
    source: Value,
}

/// Elasticsearch `_search` client.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    index: String,
    api_key: Option<String>,
}

impl SearchClient {
    pub fn new(
        base_url: String,
        index: String,
        api_key: Option<String>,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index,
            api_key,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

#[async_trait]
impl JobSearch for SearchClient {
    async fn search(&self, text: &str, filters: &Filters) -> Result<Vec<JobListing>, SearchError> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let body = build_query(text, filters);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("ApiKey {key}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        let listings: Vec<JobListing> = parsed
            .hits
            .hits
            .into_iter()
            .take(MAX_RESULTS)
            .filter_map(|hit| match serde_json::from_value::<JobListing>(hit.source) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    debug!(id = ?hit.id, error = %e, "skipping unreadable search hit");
                    None
                }
            })
            .collect();

        debug!(index = %self.index, hits = listings.len(), "search completed");
        Ok(listings)
    }
}

/// Builds the bool query: free-text relevance in `must`, extracted filters in `filter`.
pub fn build_query(text: &str, filters: &Filters) -> Value {
    let mut clauses = Vec::new();

    if filters.remote {
        clauses.push(json!({ "term": { "remote": true } }));
    }
    if let Some(state) = &filters.state {
        clauses.push(json!({ "term": { "state": state } }));
    }
    if let Some(cap) = filters.salary_cap {
        clauses.push(json!({ "range": { "salary_max": { "lte": cap } } }));
    }

    json!({
        "size": MAX_RESULTS,
        "query": {
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": text,
                        "fields": ["title^3", "company", "description"]
                    }
                }],
                "filter": clauses
            }
        }
    })
}

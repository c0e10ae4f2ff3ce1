use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Metadata provider returned status {0}")]
    Status(u16),
}

/// External movie-metadata lookup. The persistence layer only ever consumes
/// the title strings out of these results.
#[async_trait]
pub trait MovieSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Client for the IMDb suggestion endpoint
/// (`{base}/suggestion/{first letter}/{query}.json`).
pub struct ImdbSearch {
    client: reqwest::Client,
    base_url: String,
}

impl ImdbSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(rename = "d", default)]
    results: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(rename = "id")]
    id: String,
    #[serde(rename = "l")]
    title: String,
    #[serde(rename = "y", default)]
    year: Option<i32>,
    #[serde(rename = "i", default)]
    image: Option<SuggestionImage>,
}

#[derive(Debug, Deserialize)]
struct SuggestionImage {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

#[async_trait]
impl MovieSearch for ImdbSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        // The suggestion endpoint keys on a lowercased query with spaces
        // collapsed to underscores, bucketed under its first letter.
        let normalized = query.trim().to_lowercase().replace(' ', "_");
        let bucket = normalized
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphanumeric())
            .unwrap_or('x');

        let url = format!(
            "{}/suggestion/{}/{}.json",
            self.base_url,
            bucket,
            urlencoding::encode(&normalized)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body: SuggestionResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .map(|s| SearchResult {
                external_id: s.id,
                title: s.title,
                year: s.year,
                image_url: s.image.map(|i| i.image_url),
            })
            .collect())
    }
}

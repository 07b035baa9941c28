//! Vector-search quote index client and its mock.
//!
//! The newsletter decorates each issue with a quote semantically close
//! to the user's ethos. Lookup goes to a hosted vector-search service;
//! any failure degrades to the caller's fallback, never an error page.

use super::{ProviderError, Quote, QuoteIndex};
use crate::config::QuotesConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct HttpQuoteIndex {
    config: QuotesConfig,
    client: Client,
}

impl HttpQuoteIndex {
    pub fn new(config: QuotesConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/collections/{}/points/search",
            self.config.base_url.trim_end_matches('/'),
            self.config.collection
        )
    }
}

#[async_trait]
impl QuoteIndex for HttpQuoteIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Quote>, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotConfigured(
                "Quote index is not enabled".to_string(),
            ));
        }

        let request = SearchRequest {
            query: query.to_string(),
            limit,
            with_payload: true,
        };

        let mut builder = self.client.post(self.search_url()).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.header("api-key", &self.config.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "Quote index error {}: {}",
                status, error_text
            )));
        }

        let api_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(api_response
            .result
            .into_iter()
            .map(|hit| Quote {
                text: hit.payload.text,
                author: hit.payload.author,
                score: Some(hit.score),
            })
            .collect())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock quote index with a fixed result set.
pub struct MockQuoteIndex {
    enabled: bool,
    quotes: Vec<Quote>,
}

impl MockQuoteIndex {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            quotes: vec![Quote {
                text: "We are what we repeatedly do.".to_string(),
                author: Some("Will Durant".to_string()),
                score: Some(1.0),
            }],
        }
    }

    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        Self {
            enabled: true,
            quotes,
        }
    }
}

#[async_trait]
impl QuoteIndex for MockQuoteIndex {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Quote>, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock quote index is not enabled".to_string(),
            ));
        }

        Ok(self.quotes.iter().take(limit).cloned().collect())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ============================================================================
// Quote Index API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct SearchRequest {
    query: String,
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: f32,
    payload: QuotePayload,
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    text: String,
    #[serde(default)]
    author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_respects_limit() {
        let index = MockQuoteIndex::with_quotes(vec![
            Quote {
                text: "one".to_string(),
                author: None,
                score: Some(0.9),
            },
            Quote {
                text: "two".to_string(),
                author: None,
                score: Some(0.8),
            },
        ]);

        let hits = index.search("discipline", 1).await.expect("search failed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "one");
    }

    #[tokio::test]
    async fn disabled_mock_errors() {
        let index = MockQuoteIndex::new(false);
        assert!(index.search("discipline", 1).await.is_err());
    }
}

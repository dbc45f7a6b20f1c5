use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::{FetchError, Quote, QuoteProvider};

/// Quote provider backed by the AwesomeAPI `json/last` endpoint.
pub struct AwesomeApiProvider {
    base_url: String,
    pair: String,
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    pub fn new(base_url: &str, pair: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cotacao/1.0")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(AwesomeApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            pair: pair.to_string(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/json/last/{}", self.base_url, self.pair)
    }

    async fn request(&self) -> Result<Quote, FetchError> {
        let url = self.url();
        debug!("Requesting quote from {}", url);

        let request = self
            .client
            .get(&url)
            .build()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(FetchError::Transport)?;

        debug!(status = %response.status(), "Received upstream response");
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        parse_quote(&body, &response_key(&self.pair))
    }
}

/// The upstream wraps the quote in an object keyed by the pair without its
/// separator: `USD-BRL` is answered as `{"USDBRL": {...}}`.
fn response_key(pair: &str) -> String {
    pair.replace('-', "")
}

fn parse_quote(body: &[u8], key: &str) -> Result<Quote, FetchError> {
    let mut payload: HashMap<String, Value> = serde_json::from_slice(body)?;
    let quote = payload
        .remove(key)
        .ok_or_else(|| FetchError::MissingPair(key.to_string()))?;
    Ok(serde_json::from_value(quote)?)
}

#[async_trait]
impl QuoteProvider for AwesomeApiProvider {
    #[instrument(
        name = "AwesomeApiQuoteFetch",
        skip(self),
        fields(pair = %self.pair)
    )]
    async fn fetch_quote(&self, deadline: Duration) -> Result<Quote, FetchError> {
        let quote = tokio::time::timeout(deadline, self.request())
            .await
            .map_err(|_| FetchError::Timeout(deadline))??;

        debug!(bid = %quote.bid, "Parsed quote");
        Ok(quote)
    }
}

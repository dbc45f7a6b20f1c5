//! Quote types and the provider/store seams

use crate::core::error::{FetchError, StoreError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot of a currency pair as reported by the upstream API.
///
/// Prices are kept as text, exactly as the upstream sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub codein: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub high: String,
    #[serde(default)]
    pub low: String,
    #[serde(default, rename = "varBid")]
    pub var_bid: String,
    #[serde(default, rename = "pctChange")]
    pub pct_change: String,
    pub bid: String,
    #[serde(default)]
    pub ask: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub create_date: String,
}

/// Body of `GET /cotacao`, shared by server and client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidResponse {
    pub bid: String,
}

/// A row of the append-only quote log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredQuote {
    pub id: i64,
    pub bid: String,
    pub timestamp: NaiveDateTime,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches the current quote, giving up once `deadline` has elapsed.
    async fn fetch_quote(&self, deadline: Duration) -> Result<Quote, FetchError>;
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Creates the backing table if it does not exist yet.
    fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Appends one row holding `bid`, bounded by `deadline`.
    async fn save_bid(&self, bid: &str, deadline: Duration) -> Result<(), StoreError>;

    /// Returns up to `limit` rows, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<StoredQuote>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_deserialization() {
        let json = r#"{
            "code": "USD",
            "codein": "BRL",
            "name": "Dólar Americano/Real Brasileiro",
            "high": "5.4612",
            "low": "5.4101",
            "varBid": "0.0123",
            "pctChange": "0.23",
            "bid": "5.43",
            "ask": "5.4312",
            "timestamp": "1718900000",
            "create_date": "2024-06-20 13:33:20"
        }"#;

        let quote: Quote = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(quote.bid, "5.43");
        assert_eq!(quote.ask, "5.4312");
        assert_eq!(quote.var_bid, "0.0123");
        assert_eq!(quote.pct_change, "0.23");
        assert_eq!(quote.create_date, "2024-06-20 13:33:20");
    }

    #[test]
    fn test_quote_only_requires_bid() {
        let quote: Quote = serde_json::from_str(r#"{"bid": "5.10"}"#).unwrap();
        assert_eq!(quote.bid, "5.10");
        assert!(quote.code.is_empty());

        let missing: Result<Quote, _> = serde_json::from_str(r#"{"ask": "5.10"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_bid_response_shape() {
        let body = serde_json::to_string(&BidResponse {
            bid: "5.43".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"bid":"5.43"}"#);
    }
}

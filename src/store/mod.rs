pub mod sqlite;

use crate::core::{QuoteStore, StoreError, StoredQuote};
use async_trait::async_trait;
use std::time::Duration;

pub use sqlite::SqliteQuoteStore;

/// Stand-in used when the database could not be opened at startup.
///
/// Every call fails, so the service keeps answering with fetch-only
/// behaviour while persistence errors show up in the logs per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

#[async_trait]
impl QuoteStore for UnavailableStore {
    fn ensure_schema(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn save_bid(&self, _bid: &str, _deadline: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<StoredQuote>, StoreError> {
        Err(StoreError::Unavailable)
    }
}

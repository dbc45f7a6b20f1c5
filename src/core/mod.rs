//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod quote;

// Re-export main types for cleaner imports
pub use error::{FetchError, StoreError};
pub use quote::{BidResponse, Quote, QuoteProvider, QuoteStore, StoredQuote};

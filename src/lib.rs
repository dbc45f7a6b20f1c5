//! Fetches the USD-BRL exchange rate from AwesomeAPI, keeps an append-only
//! log of it in SQLite and serves the latest bid on `GET /cotacao`. The
//! client half asks that endpoint for the bid and writes it to a file.

pub mod client;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

pub use crate::core::config;

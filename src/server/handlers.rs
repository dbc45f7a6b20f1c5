use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{debug, error};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::core::{BidResponse, StoredQuote};

const DEFAULT_HISTORY_LIMIT: usize = 10;
const MAX_HISTORY_LIMIT: usize = 100;

/// `GET /cotacao`: fetch the current quote, log it, answer with its bid.
///
/// Persistence runs under its own deadline and never changes the response.
pub async fn get_quote(State(state): State<Arc<AppState>>) -> ApiResult<Json<BidResponse>> {
    let quote = state
        .provider
        .fetch_quote(state.fetch_timeout)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch quote");
            ApiError::from(e)
        })?;

    match state.store.save_bid(&quote.bid, state.store_timeout).await {
        Ok(()) => debug!(bid = %quote.bid, "Saved quote"),
        Err(e) => error!(error = %e, bid = %quote.bid, "Failed to save quote"),
    }

    Ok(Json(BidResponse { bid: quote.bid }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    limit: Option<usize>,
}

/// `GET /cotacoes`: newest stored quotes first.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<StoredQuote>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let rows = state.store.recent(limit).await.map_err(|e| {
        error!(error = %e, "Failed to read stored quotes");
        ApiError::from(e)
    })?;

    Ok(Json(rows))
}

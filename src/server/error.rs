use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::core::{FetchError, StoreError};

/// Errors surfaced to HTTP callers. The body stays generic; the cause is
/// logged where the error is raised.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Erro ao buscar cotação")]
    Fetch(#[from] FetchError),
    #[error("Erro ao consultar cotações")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

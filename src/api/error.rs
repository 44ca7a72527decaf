// src/api/error.rs
// =============================================================================
// Every way a scrape or page request can fail, and the HTTP response each
// one becomes.
//
// Link-level probe failures are not here: they are data on the LinkStatus,
// never a failed request.
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::checker::FetchError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("url query parameter is required")]
    MissingUrl,

    #[error("Invalid URL format, please provide a valid URL.")]
    InvalidUrl,

    #[error("invalid page number")]
    InvalidPageNumber,

    #[error("request ID not found")]
    RequestNotFound,

    #[error("page not found")]
    PageNotFound,

    #[error("timed out fetching the page")]
    FetchTimeout,

    #[error("could not reach the page")]
    FetchUnreachable,

    #[error("Failed to fetch page info")]
    FetchFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl | ApiError::InvalidPageNumber => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RequestNotFound | ApiError::PageNotFound => StatusCode::NOT_FOUND,
            ApiError::FetchTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::FetchUnreachable => StatusCode::BAD_GATEWAY,
            ApiError::FetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Timeout { .. } => ApiError::FetchTimeout,
            FetchError::Unreachable { .. } => ApiError::FetchUnreachable,
            FetchError::Other { .. } => ApiError::FetchFailed,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

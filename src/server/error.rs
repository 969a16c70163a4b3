//! Mapping of failures to JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::content::ContentError;

/// Body of every error response
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Content(e) if e.is_not_found() => {
                tracing::debug!("{}", e);
                (StatusCode::NOT_FOUND, ErrorBody::new(e.to_string()))
            }
            _ => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal Server Error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

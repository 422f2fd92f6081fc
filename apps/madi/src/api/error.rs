//! API error type and its JSON wire shape.
//!
//! Every failure surfaces as `{ "ok": false, "error": "<message>" }`.
//! Client mistakes are 400s; store failures pass the underlying message
//! through as a 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use madi_core::resolution::UnknownTriggerType;
use madi_core::{EventError, StoreError};

/// Failure while handling an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(
        "missing business identifier: provide business_id, a registered widget_id, \
         or configure a default business"
    )]
    MissingBusiness,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    UnknownKind(#[from] UnknownTriggerType),

    #[error(transparent)]
    InvalidEvent(#[from] EventError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingBusiness
            | ApiError::MissingField(_)
            | ApiError::UnknownKind(_)
            | ApiError::InvalidEvent(_)
            | ApiError::Store(StoreError::InvalidEvent(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "ok": false, "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

//! Error types for spendview-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use spendview_core::{ErrorCode, ViewError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    View(#[from] ViewError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::View(e) => match e.code() {
                ErrorCode::FetchFailure => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::WriteFailure => StatusCode::BAD_GATEWAY,
                ErrorCode::InconsistentFilterState => StatusCode::CONFLICT,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::View(e) => serde_json::json!({
                "error": self.to_string(),
                "details": e.to_details(),
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (self.status(), axum::Json(body)).into_response()
    }
}

//! The HTTP-facing error type for the control surface. Internal, non-HTTP
//! code uses `anyhow::Result` instead; this type exists only at the
//! request/response boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("game '{0}' not found")]
    NotFound(String),

    #[error("game '{0}' already exists")]
    GameExists(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    BadSwap(String),

    #[error("{0}")]
    BadReplace(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::GameExists(_) => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) | AppError::BadSwap(_) | AppError::BadReplace(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{TransferError, TransferErrorKind};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    /// Malformed request body; the message names the offending field
    #[error("{0}")]
    InvalidRequest(String),

    #[error("transaction not found")]
    TransactionNotFound(Uuid),

    // Domain errors, including the 5xx `Unexpected` kind
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status code for each transfer failure kind
fn transfer_status(kind: TransferErrorKind) -> StatusCode {
    match kind {
        TransferErrorKind::InvalidAmount
        | TransferErrorKind::InvalidCurrency
        | TransferErrorKind::SameAccount
        | TransferErrorKind::InsufficientBalance => StatusCode::BAD_REQUEST,
        TransferErrorKind::AccountNotFound => StatusCode::NOT_FOUND,
        TransferErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Transfer(err) => transfer_status(err.kind()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

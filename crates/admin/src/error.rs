//! Unified error handling for the admin HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::rtdb::RtdbAdminError;
use crate::sheets::SheetsAdminError;

/// Application-level error type for the admin service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Product API operation failed.
    #[error("Sheets error: {0}")]
    Sheets(#[from] SheetsAdminError),

    /// Realtime database operation failed.
    #[error("Database error: {0}")]
    Rtdb(#[from] RtdbAdminError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Sheets(SheetsAdminError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sheets(_) => StatusCode::BAD_GATEWAY,
            Self::Rtdb(RtdbAdminError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Rtdb(RtdbAdminError::InvalidTransition(_)) => StatusCode::CONFLICT,
            Self::Rtdb(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        if status == StatusCode::BAD_GATEWAY {
            tracing::error!(error = %self, "request error");
        }

        let message = match &self {
            Self::Sheets(SheetsAdminError::Rejected(reason)) => reason.clone(),
            Self::Rtdb(RtdbAdminError::NotFound(what)) => format!("not found: {what}"),
            Self::Rtdb(RtdbAdminError::InvalidTransition(t)) => format!("invalid transition: {t}"),
            Self::BadRequest(msg) => msg.clone(),
            _ => "External service error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

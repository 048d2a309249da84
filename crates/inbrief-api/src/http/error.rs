//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use inbrief_types::error::{HistoryError, ResolveError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// History fetch errors.
    History(HistoryError),
    /// Validation error.
    Validation(String),
    /// The pipeline is shutting down.
    Unavailable(String),
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        AppError::History(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::History(HistoryError::Resolve(ResolveError::ChatNotFound(_))) => {
                (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND")
            }
            AppError::History(HistoryError::Resolve(ResolveError::UnsupportedChatKind(_))) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNSUPPORTED_CHAT_KIND")
            }
            AppError::History(HistoryError::FolderNotFound(_)) => {
                (StatusCode::NOT_FOUND, "FOLDER_NOT_FOUND")
            }
            AppError::History(HistoryError::InvalidRange) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::History(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::History(e) => e.to_string(),
            AppError::Validation(msg) | AppError::Unavailable(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::warn!(code, error = %self.message(), "request failed");
        }
        (status, ApiResponse::error(code, self.message())).into_response()
    }
}

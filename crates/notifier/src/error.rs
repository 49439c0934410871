//! Unified error handling with Sentry integration.
//!
//! All route handlers return `Result<T, AppError>`. Errors convert at the
//! handler boundary into the `{success, message}` JSON envelope; nothing
//! reaches the transport layer unhandled.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::ApiResponse;
use crate::services::NotifyError;

/// Application-level error type for the notifier.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request is missing a required field. No side effects were performed.
    #[error("{0}")]
    Validation(&'static str),

    /// A downstream dependency (invoice renderer or mail transport) failed.
    /// The static message is what the client sees; the source carries the
    /// originating error for logging.
    #[error("{message}: {source}")]
    Dependency {
        message: &'static str,
        #[source]
        source: NotifyError,
    },
}

impl AppError {
    /// Wrap a dependency failure with the client-facing message for the
    /// flow it occurred in.
    pub fn dependency(message: &'static str, source: impl Into<NotifyError>) -> Self {
        Self::Dependency {
            message,
            source: source.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture dependency failures to Sentry; validation errors are
        // client-caused and only worth a debug line.
        let (status, message) = match &self {
            Self::Validation(message) => {
                tracing::debug!(message, "Rejected malformed notification request");
                (StatusCode::BAD_REQUEST, *message)
            }
            Self::Dependency { message, .. } => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Notification dispatch failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, *message)
            }
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

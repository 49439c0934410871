//! HTTP route handlers for the notifier.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Health check
//! POST /api/send-confirmation                - Order confirmation + invoice
//! POST /api/send-subscription-confirmation   - Subscription welcome
//! POST /api/send-contact-thankyou            - Contact acknowledgment
//! ```

pub mod confirmation;
pub mod contact;
pub mod subscription;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// JSON envelope returned by every notification endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    /// A success envelope.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failure envelope.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// A request field is only present when it is non-blank after trimming.
///
/// Clients send `""` for fields the user left empty; handlers treat those
/// the same as an absent field.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "Email service is running"
}

#[cfg(test)]
mod tests {
    use super::present;

    #[test]
    fn test_present_rejects_blank_values() {
        assert_eq!(present(Some("a@b.com")), Some("a@b.com"));
        assert_eq!(present(Some("  a@b.com ")), Some("a@b.com"));
        assert_eq!(present(Some("")), None);
        assert_eq!(present(Some("   ")), None);
        assert_eq!(present(None), None);
    }
}

/// Create all routes for the notifier.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/send-confirmation", post(confirmation::send_confirmation))
        .route(
            "/api/send-subscription-confirmation",
            post(subscription::send_subscription_confirmation),
        )
        .route(
            "/api/send-contact-thankyou",
            post(contact::send_contact_thank_you),
        )
}

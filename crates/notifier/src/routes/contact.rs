//! Contact thank-you route handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Contact thank-you request payload.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    /// Greeting name; absent renders as an empty greeting.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Send the contact-form acknowledgment email.
///
/// POST /api/send-contact-thankyou
#[instrument(skip_all)]
pub async fn send_contact_thank_you(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ApiResponse>> {
    let Some(email) = crate::routes::present(request.email.as_deref()) else {
        return Err(AppError::Validation("Email is required"));
    };

    state
        .notifier()
        .send_contact_thank_you(email, request.name.as_deref().unwrap_or_default())
        .await
        .map_err(|e| AppError::dependency("Failed to send contact thank-you email", e))?;

    Ok(Json(ApiResponse::success("Contact thank-you email sent")))
}

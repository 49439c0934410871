//! Subscription confirmation route handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Subscription confirmation request payload.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Send the subscription welcome email.
///
/// POST /api/send-subscription-confirmation
#[instrument(skip_all)]
pub async fn send_subscription_confirmation(
    State(state): State<AppState>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<Json<ApiResponse>> {
    let Some(email) = crate::routes::present(request.email.as_deref()) else {
        return Err(AppError::Validation("Email is required"));
    };

    state
        .notifier()
        .send_subscription_confirmation(email)
        .await
        .map_err(|e| AppError::dependency("Failed to send subscription confirmation email", e))?;

    Ok(Json(ApiResponse::success("Subscription confirmation email sent")))
}

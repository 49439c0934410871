//! Order confirmation route handler.

use axum::{Json, extract::State};
use parampare_core::OrderNotificationRequest;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Send an order confirmation email with the PDF invoice attached.
///
/// POST /api/send-confirmation
///
/// Requires `email` and `items` (an empty item list is valid). Everything
/// else in the payload defaults to zero or absent; malformed money fields
/// degrade to zero rather than failing the request.
#[instrument(skip_all)]
pub async fn send_confirmation(
    State(state): State<AppState>,
    Json(order): Json<OrderNotificationRequest>,
) -> Result<Json<ApiResponse>> {
    tracing::info!(
        order_id = %order.resolve_order_id().map_or("N/A", |id| id.as_str()),
        "Received order confirmation request"
    );

    let email = crate::routes::present(order.email.as_deref());
    let (Some(email), Some(_)) = (email, order.items.as_ref()) else {
        return Err(AppError::Validation("Email and items are required"));
    };

    state
        .notifier()
        .send_order_confirmation(email, &order)
        .await
        .map_err(|e| AppError::dependency("Failed to send confirmation email", e))?;

    Ok(Json(ApiResponse::success("Confirmation email sent with invoice")))
}

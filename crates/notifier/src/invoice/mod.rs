//! Invoice rendering.
//!
//! Lays out an order as a single-page PDF invoice and serializes it to an
//! in-memory byte buffer. Rendering never touches the filesystem or the
//! network; errors propagate to the caller as a request-level failure.

pub mod layout;
mod pdf;

use chrono::{NaiveDate, Utc};
use parampare_core::OrderNotificationRequest;
use thiserror::Error;

pub use layout::{layout_invoice, DrawOp};
pub use pdf::LogoImage;

/// Errors that can occur while rendering an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The configured logo asset could not be decoded.
    #[error("failed to decode logo image: {0}")]
    Logo(#[from] image::ImageError),

    /// The rendering task panicked or was cancelled.
    #[error("invoice rendering task failed: {0}")]
    Render(#[from] tokio::task::JoinError),
}

/// Render an order as a PDF invoice, dated today.
///
/// Resolves exactly once with the complete byte buffer. Serialization runs
/// on the blocking pool so large orders do not stall the request executor.
///
/// # Errors
///
/// Returns an error if the rendering task fails; the caller treats this as a
/// request-level failure and does not retry.
pub async fn render_invoice(
    order: &OrderNotificationRequest,
    logo: Option<&LogoImage>,
) -> Result<Vec<u8>, InvoiceError> {
    render_invoice_dated(order, logo, Utc::now().date_naive()).await
}

/// Render an order as a PDF invoice with an explicit invoice date.
///
/// Output is deterministic: the same order, logo, and date produce
/// byte-identical PDFs.
///
/// # Errors
///
/// Returns an error if the rendering task fails.
pub async fn render_invoice_dated(
    order: &OrderNotificationRequest,
    logo: Option<&LogoImage>,
    date: NaiveDate,
) -> Result<Vec<u8>, InvoiceError> {
    let ops = layout::layout_invoice(order, logo.is_some(), date);
    let logo = logo.cloned();
    let bytes = tokio::task::spawn_blocking(move || pdf::write_pdf(&ops, logo.as_ref())).await?;
    Ok(bytes)
}

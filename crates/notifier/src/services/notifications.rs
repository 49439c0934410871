//! Notification flows: order confirmation, subscription confirmation, and
//! contact thank-you.
//!
//! Each flow renders an Askama HTML/text template pair, optionally renders
//! the PDF invoice, and hands one composed message to the mail transport.
//! Flows are stateless and single-shot; there is no retry and no partial
//! success.

use std::sync::Arc;

use askama::Template;
use parampare_core::{Money, OrderLineItem, OrderNotificationRequest};
use thiserror::Error;

use crate::invoice::{self, InvoiceError, LogoImage};
use crate::services::email::{EmailAttachment, EmailError, Mailer, OutgoingEmail};

/// Display placeholder for a missing order id in subjects and email bodies.
///
/// The PDF invoice number uses its own fallback ("0000"); both sites share
/// [`OrderNotificationRequest::resolve_order_id`] as the single resolver.
const ORDER_ID_FALLBACK: &str = "N/A";

/// Errors that can occur while composing or dispatching a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Invoice rendering failed.
    #[error("Invoice rendering failed: {0}")]
    Invoice(#[from] InvoiceError),

    /// Template rendering error.
    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    /// Mail transport error.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// The logo asset, loaded once at startup.
///
/// Keeps both the raw PNG (for the inline email attachment) and the decoded
/// channels (for PDF embedding).
#[derive(Debug, Clone)]
pub struct Logo {
    png: Vec<u8>,
    image: LogoImage,
}

impl Logo {
    /// Decode the logo from PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a decodable image.
    pub fn decode(png: Vec<u8>) -> Result<Self, InvoiceError> {
        let image = LogoImage::decode(&png)?;
        Ok(Self { png, image })
    }
}

/// One line of the order table as shown in the email.
struct LineRow {
    name: String,
    weight: String,
    quantity: u32,
    price: Money,
    total: Money,
}

impl From<&OrderLineItem> for LineRow {
    fn from(item: &OrderLineItem) -> Self {
        Self {
            name: item.name.clone(),
            weight: item.weight_label(),
            quantity: item.quantity,
            price: item.price,
            total: item.line_total(),
        }
    }
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order_id: &'a str,
    rows: &'a [LineRow],
    subtotal: Money,
    shipping: Money,
    discount: Option<Money>,
    grand_total: Money,
    has_logo: bool,
}

/// Plain text template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order_id: &'a str,
    rows: &'a [LineRow],
    subtotal: Money,
    shipping: Money,
    discount: Option<Money>,
    grand_total: Money,
}

/// HTML template for the subscription confirmation email.
#[derive(Template)]
#[template(path = "email/subscription_confirmation.html")]
struct SubscriptionConfirmationHtml {
    has_logo: bool,
}

/// Plain text template for the subscription confirmation email.
#[derive(Template)]
#[template(path = "email/subscription_confirmation.txt")]
struct SubscriptionConfirmationText;

/// HTML template for the contact thank-you email.
#[derive(Template)]
#[template(path = "email/contact_thankyou.html")]
struct ContactThankYouHtml<'a> {
    name: &'a str,
    has_logo: bool,
}

/// Plain text template for the contact thank-you email.
#[derive(Template)]
#[template(path = "email/contact_thankyou.txt")]
struct ContactThankYouText<'a> {
    name: &'a str,
}

/// Composes and dispatches transactional notifications.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    logo: Option<Logo>,
}

impl Notifier {
    /// Create a notifier over the given transport.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, logo: Option<Logo>) -> Self {
        Self { mailer, logo }
    }

    /// Send an order confirmation with the PDF invoice attached.
    ///
    /// # Errors
    ///
    /// Returns an error if invoice rendering, template rendering, or mail
    /// dispatch fails; the whole notification either succeeds or it doesn't.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order: &OrderNotificationRequest,
    ) -> Result<(), NotifyError> {
        let display_id = order
            .resolve_order_id()
            .map_or(ORDER_ID_FALLBACK, |id| id.as_str());

        let pdf = invoice::render_invoice(order, self.logo.as_ref().map(|l| &l.image)).await?;

        let rows: Vec<LineRow> = order.line_items().iter().map(LineRow::from).collect();
        let totals = order.totals();
        let html = OrderConfirmationHtml {
            order_id: display_id,
            rows: &rows,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            discount: totals.discount,
            grand_total: totals.grand_total,
            has_logo: self.logo.is_some(),
        }
        .render()?;
        let text = OrderConfirmationText {
            order_id: display_id,
            rows: &rows,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            discount: totals.discount,
            grand_total: totals.grand_total,
        }
        .render()?;

        let invoice_name = order.resolve_order_id().map_or("order", |id| id.as_str());
        let mut attachments = vec![EmailAttachment {
            filename: format!("invoice_{invoice_name}.pdf"),
            content_type: "application/pdf",
            content: pdf,
            inline_cid: None,
        }];
        attachments.extend(self.logo_attachment());

        self.mailer
            .send(OutgoingEmail {
                to: to.to_string(),
                subject: format!("Order Confirmation #{display_id} - Sanatana Parampare"),
                text_body: text,
                html_body: html,
                attachments,
            })
            .await?;

        tracing::info!(to = %to, order_id = %display_id, "Order confirmation sent with invoice");
        Ok(())
    }

    /// Send the static subscription welcome email.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering or mail dispatch fails.
    pub async fn send_subscription_confirmation(&self, to: &str) -> Result<(), NotifyError> {
        let html = SubscriptionConfirmationHtml {
            has_logo: self.logo.is_some(),
        }
        .render()?;
        let text = SubscriptionConfirmationText.render()?;

        self.mailer
            .send(OutgoingEmail {
                to: to.to_string(),
                subject: "Thank you for subscribing!".to_string(),
                text_body: text,
                html_body: html,
                attachments: self.logo_attachment().into_iter().collect(),
            })
            .await?;

        tracing::info!(to = %to, "Subscription confirmation sent");
        Ok(())
    }

    /// Send the contact-form acknowledgment email.
    ///
    /// An absent name renders as an empty greeting, never as a placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering or mail dispatch fails.
    pub async fn send_contact_thank_you(&self, to: &str, name: &str) -> Result<(), NotifyError> {
        let html = ContactThankYouHtml {
            name,
            has_logo: self.logo.is_some(),
        }
        .render()?;
        let text = ContactThankYouText { name }.render()?;

        self.mailer
            .send(OutgoingEmail {
                to: to.to_string(),
                subject: "Thank you for reaching us!".to_string(),
                text_body: text,
                html_body: html,
                attachments: self.logo_attachment().into_iter().collect(),
            })
            .await?;

        tracing::info!(to = %to, "Contact thank-you sent");
        Ok(())
    }

    /// The inline logo attachment, when a logo was loaded at startup.
    fn logo_attachment(&self) -> Option<EmailAttachment> {
        self.logo.as_ref().map(|logo| EmailAttachment {
            filename: "logo.png".to_string(),
            content_type: "image/png",
            content: logo.png.clone(),
            inline_cid: Some("logo".to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    /// Records every message instead of delivering it.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    fn order(value: serde_json::Value) -> OrderNotificationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn notifier() -> (Arc<RecordingMailer>, Notifier) {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(mailer.clone(), None);
        (mailer, notifier)
    }

    #[tokio::test]
    async fn test_order_confirmation_attaches_invoice() {
        let (mailer, notifier) = notifier();
        let order = order(json!({
            "email": "a@b.com", "orderId": 42,
            "items": [{"name": "Oil", "quantity": 2, "price": 100}],
            "subtotal": 200, "shippingCost": 20, "total": 220
        }));

        notifier.send_order_confirmation("a@b.com", &order).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        let email = &sent[0];
        assert_eq!(email.subject, "Order Confirmation #42 - Sanatana Parampare");
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].filename, "invoice_42.pdf");
        assert_eq!(email.attachments[0].content_type, "application/pdf");
        assert!(email.html_body.contains("Rs. 220.00"));
        assert!(!email.html_body.contains("Discount"));
        assert!(email.text_body.contains("Rs. 220.00"));
    }

    #[tokio::test]
    async fn test_order_confirmation_discount_row() {
        let (mailer, notifier) = notifier();
        let order = order(json!({
            "email": "a@b.com", "orderId": 7,
            "items": [{"name": "Oil", "quantity": 2, "price": 100}],
            "subtotal": 200, "shippingCost": 20, "discountAmount": 20, "total": 200
        }));

        notifier.send_order_confirmation("a@b.com", &order).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        let email = &sent[0];
        assert!(email.html_body.contains("Discount"));
        assert!(email.html_body.contains("-Rs. 20.00"));
        assert!(email.html_body.contains("Rs. 200.00"));
    }

    #[tokio::test]
    async fn test_order_confirmation_missing_id_fallbacks() {
        let (mailer, notifier) = notifier();
        let order = order(json!({"email": "a@b.com", "items": []}));

        notifier.send_order_confirmation("a@b.com", &order).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        let email = &sent[0];
        assert_eq!(email.subject, "Order Confirmation #N/A - Sanatana Parampare");
        assert_eq!(email.attachments[0].filename, "invoice_order.pdf");
        // The PDF keeps its own placeholder.
        let pdf = &email.attachments[0].content;
        assert!(pdf.windows(8).any(|w| w == b"INV-0000"));
    }

    #[tokio::test]
    async fn test_contact_thank_you_with_empty_name() {
        let (mailer, notifier) = notifier();

        notifier.send_contact_thank_you("x@y.com", "").await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        let email = &sent[0];
        assert!(!email.html_body.contains("undefined"));
        assert!(!email.html_body.contains("None"));
        assert!(email.html_body.contains("Hello"));
    }

    #[tokio::test]
    async fn test_subscription_confirmation_without_logo_has_no_attachments() {
        let (mailer, notifier) = notifier();

        notifier.send_subscription_confirmation("x@y.com").await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Thank you for subscribing!");
        assert!(sent[0].attachments.is_empty());
    }
}

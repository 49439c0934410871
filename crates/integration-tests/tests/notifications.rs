//! End-to-end tests for the notification endpoints.
//!
//! Each test builds the real router over a stub mail transport and drives it
//! in-process with `tower::ServiceExt::oneshot`, asserting on the HTTP
//! envelope and the captured outgoing mail.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use parampare_notifier::routes;
use parampare_notifier::services::{EmailError, Mailer, Notifier, OutgoingEmail};
use parampare_notifier::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Records every message instead of delivering it.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Rejects every message, simulating an unreachable relay.
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), EmailError> {
        Err(EmailError::InvalidAddress("relay rejected".to_string()))
    }
}

fn app(mailer: Arc<dyn Mailer>) -> Router {
    routes::routes().with_state(AppState::new(Notifier::new(mailer, None)))
}

fn recording_app() -> (Arc<RecordingMailer>, Router) {
    let mailer = Arc::new(RecordingMailer::default());
    let router = app(mailer.clone());
    (mailer, router)
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: Value = serde_json::from_slice(&bytes).unwrap();
    (status, envelope)
}

fn pdf_contains(pdf: &[u8], needle: &[u8]) -> bool {
    pdf.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_, router) = recording_app();

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Email service is running");
}

#[tokio::test]
async fn test_send_confirmation_success() {
    let (mailer, router) = recording_app();

    let (status, envelope) = post_json(
        router,
        "/api/send-confirmation",
        json!({
            "email": "customer@example.com",
            "orderId": 42,
            "items": [{"name": "Cow Ghee", "quantity": 2, "price": 100,
                       "weightValue": "500", "weightUnit": "ml"}],
            "subtotal": 200,
            "shippingCost": 20,
            "total": 220
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["message"], json!("Confirmation email sent with invoice"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, "customer@example.com");
    assert_eq!(email.subject, "Order Confirmation #42 - Sanatana Parampare");
    assert!(email.html_body.contains("Rs. 220.00"));
    assert!(!email.html_body.contains("Discount"));

    assert_eq!(email.attachments.len(), 1);
    let invoice = &email.attachments[0];
    assert_eq!(invoice.filename, "invoice_42.pdf");
    assert_eq!(invoice.content_type, "application/pdf");
    assert!(invoice.content.starts_with(b"%PDF-"));
    assert!(pdf_contains(&invoice.content, b"Invoice Number: INV-42"));
    assert!(pdf_contains(&invoice.content, b"Rs. 220.00"));
}

#[tokio::test]
async fn test_send_confirmation_with_discount() {
    let (mailer, router) = recording_app();

    let (status, _) = post_json(
        router,
        "/api/send-confirmation",
        json!({
            "email": "customer@example.com",
            "orderId": 7,
            "items": [{"name": "Turmeric", "quantity": 4, "price": "50"}],
            "subtotal": "200",
            "shippingCost": 20,
            "discountAmount": 20,
            "total": 200
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let email = &mailer.sent()[0];
    assert!(email.html_body.contains("-Rs. 20.00"));
    assert!(email.html_body.contains("Rs. 200.00"));
    let pdf = &email.attachments[0].content;
    assert!(pdf_contains(pdf, b"-Rs. 20.00"));
    assert!(pdf_contains(pdf, b"Rs. 200.00"));
}

#[tokio::test]
async fn test_send_confirmation_missing_fields_is_rejected() {
    let (mailer, router) = recording_app();

    let (status, envelope) = post_json(router, "/api/send-confirmation", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["message"], json!("Email and items are required"));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_send_confirmation_blank_email_is_rejected() {
    let (mailer, router) = recording_app();

    let (status, envelope) = post_json(
        router,
        "/api/send-confirmation",
        json!({
            "email": "",
            "items": [{"name": "Oil", "quantity": 1, "price": 10}],
            "subtotal": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["message"], json!("Email and items are required"));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_blank_email_is_rejected_on_every_endpoint() {
    let (mailer, router) = recording_app();
    let (status, _) = post_json(
        router,
        "/api/send-subscription-confirmation",
        json!({"email": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(mailer.sent().is_empty());

    let (mailer, router) = recording_app();
    let (status, _) = post_json(
        router,
        "/api/send-contact-thankyou",
        json!({"email": "", "name": "Asha"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_send_confirmation_missing_order_id_falls_back() {
    let (mailer, router) = recording_app();

    let (status, _) = post_json(
        router,
        "/api/send-confirmation",
        json!({
            "email": "customer@example.com",
            "items": [{"name": "Incense", "quantity": 1, "price": 40}],
            "subtotal": 40
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let email = &mailer.sent()[0];
    assert_eq!(email.subject, "Order Confirmation #N/A - Sanatana Parampare");
    assert_eq!(email.attachments[0].filename, "invoice_order.pdf");
    // The invoice keeps its own numeric placeholder.
    assert!(pdf_contains(&email.attachments[0].content, b"INV-0000"));
}

#[tokio::test]
async fn test_send_confirmation_transport_failure_is_reported() {
    let router = app(Arc::new(FailingMailer));

    let (status, envelope) = post_json(
        router,
        "/api/send-confirmation",
        json!({
            "email": "customer@example.com",
            "orderId": 1,
            "items": [{"name": "Oil", "quantity": 1, "price": 10}],
            "subtotal": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["message"], json!("Failed to send confirmation email"));
}

#[tokio::test]
async fn test_send_subscription_confirmation() {
    let (mailer, router) = recording_app();

    let (status, envelope) = post_json(
        router,
        "/api/send-subscription-confirmation",
        json!({"email": "reader@example.com"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["message"], json!("Subscription confirmation email sent"));

    let email = &mailer.sent()[0];
    assert_eq!(email.subject, "Thank you for subscribing!");
    assert!(email.attachments.is_empty());
}

#[tokio::test]
async fn test_send_subscription_confirmation_requires_email() {
    let (mailer, router) = recording_app();

    let (status, envelope) =
        post_json(router, "/api/send-subscription-confirmation", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["message"], json!("Email is required"));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_send_contact_thankyou_without_name() {
    let (mailer, router) = recording_app();

    let (status, envelope) = post_json(
        router,
        "/api/send-contact-thankyou",
        json!({"email": "visitor@example.com"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["message"], json!("Contact thank-you email sent"));

    // An absent name must not leak a placeholder into the greeting.
    let email = &mailer.sent()[0];
    assert!(!email.html_body.contains("undefined"));
    assert!(!email.html_body.contains("None"));
    assert!(!email.text_body.contains("undefined"));
}

#[tokio::test]
async fn test_send_contact_thankyou_with_name() {
    let (mailer, router) = recording_app();

    let (status, _) = post_json(
        router,
        "/api/send-contact-thankyou",
        json!({"email": "visitor@example.com", "name": "Asha"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let email = &mailer.sent()[0];
    assert_eq!(email.subject, "Thank you for reaching us!");
    assert!(email.html_body.contains("Asha"));
    assert!(email.text_body.contains("Asha"));
}

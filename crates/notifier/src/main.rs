//! Sanatana Parampare Notifier - Email notification microservice.
//!
//! Receives order, subscription, and contact payloads from the storefront,
//! renders PDF invoices in memory, and dispatches confirmation emails over
//! SMTP (port 5001 by default).
//!
//! # Architecture
//!
//! - Axum web framework, JSON in/out
//! - Askama templates for email bodies (HTML + plain text)
//! - pdf-writer for in-memory invoice rendering
//! - lettre for SMTP delivery
//!
//! Stateless per request: the only process-wide state is the logo asset,
//! read once at startup and tolerated as absent.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use parampare_notifier::config::NotifierConfig;
use parampare_notifier::routes;
use parampare_notifier::services::{Logo, Notifier, SmtpMailer};
use parampare_notifier::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &NotifierConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Load the logo asset, tolerating its absence.
///
/// A missing file degrades to a text-only header in both the PDF and the
/// emails; an unreadable or undecodable file is treated the same way.
fn load_logo(config: &NotifierConfig) -> Option<Logo> {
    match std::fs::read(&config.logo_path) {
        Ok(bytes) => match Logo::decode(bytes) {
            Ok(logo) => {
                tracing::info!(path = %config.logo_path.display(), "Logo loaded");
                Some(logo)
            }
            Err(e) => {
                tracing::warn!(path = %config.logo_path.display(), error = %e, "Logo could not be decoded, using text header");
                None
            }
        },
        Err(e) => {
            tracing::warn!(path = %config.logo_path.display(), error = %e, "Logo not found, using text header");
            None
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = NotifierConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "parampare_notifier=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // One-time logo load; handlers receive it through state, never re-read
    let logo = load_logo(&config);

    let mailer = SmtpMailer::new(&config.email).expect("Failed to create SMTP mailer");
    let notifier = Notifier::new(Arc::new(mailer), logo);
    let state = AppState::new(notifier);

    // Build router. CORS is permissive: the storefront frontend calls this
    // service cross-origin.
    let app = routes::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("notifier listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

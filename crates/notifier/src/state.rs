//! Application state shared across handlers.

use std::sync::Arc;

use crate::services::Notifier;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the notification service, which in
/// turn owns the mail transport and the one-time logo asset; nothing here is
/// mutated after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    notifier: Notifier,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(AppStateInner { notifier }),
        }
    }

    /// Get a reference to the notification service.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}

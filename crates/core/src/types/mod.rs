//! Core types for Sanatana Parampare notifications.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod money;
pub mod order;

pub use money::Money;
pub use order::{OrderId, OrderLineItem, OrderNotificationRequest, OrderTotals};

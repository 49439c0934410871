//! Sanatana Parampare Core - Shared notification types.
//!
//! This crate provides the request shapes handled by the notification
//! service:
//! - `notifier` - Email notification microservice (invoices, confirmations)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no mail
//! transport. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Lenient money parsing and order notification payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

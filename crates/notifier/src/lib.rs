//! Sanatana Parampare Notifier library.
//!
//! This crate provides the notification service as a library, allowing the
//! router and notification flows to be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod invoice;
pub mod routes;
pub mod services;
pub mod state;

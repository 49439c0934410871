//! Integration tests for the Sanatana Parampare notifier.
//!
//! Tests live in `tests/` and drive the real router in-process with a stub
//! mail transport; no relay or network access is required.

//! SSO dashboard service library crate.
//!
//! # Purpose
//! Exposes configuration, registry refresh, observability wiring, and the HTTP
//! surface for use by the binary and integration tests.
pub mod api;
pub mod app;
pub mod config;
pub mod observability;
pub mod registry;

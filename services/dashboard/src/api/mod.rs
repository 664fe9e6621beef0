//! Dashboard HTTP API module.
//!
//! # Purpose
//! Route handlers, payload types, and the shared error shape.
pub mod apps;
pub mod error;
pub mod openapi;
pub mod system;
pub mod types;
pub mod vanity;

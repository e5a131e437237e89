//! NCV Compare Core - Shared catalog types.
//!
//! This crate provides the catalog types used across all NCV Compare components:
//! - `web` - Vendor/product browser and JSON API
//! - `integration-tests` - End-to-end tests against a fake Shopify endpoint
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no caching. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product entity, product IDs, and the deduplicated vendor set

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

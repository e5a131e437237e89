//! Core types for NCV Compare.
//!
//! This module provides type-safe wrappers for catalog concepts.

pub mod id;
pub mod product;
pub mod vendor;

pub use id::*;
pub use product::{
    DEFAULT_PRICE, FALLBACK_IMAGE, NOT_AVAILABLE, Product, ProductBuilder, filter_by_vendor,
};
pub use vendor::VendorSet;

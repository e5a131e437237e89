//! JSON API routes.
//!
//! Both endpoints degrade instead of failing: when the upstream is down they
//! answer 200 with stale or empty data and say so in the
//! `x-catalog-freshness` header.

use std::any::Any;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use ncv_compare_core::{Product, VendorSet, filter_by_vendor};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Response header carrying the catalog `Freshness`.
pub const FRESHNESS_HEADER: &str = "x-catalog-freshness";

/// Longest accepted vendor filter.
const MAX_VENDOR_FILTER_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    /// Case-insensitive vendor substring.
    pub vendor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct VendorsResponse<'a> {
    pub vendors: &'a VendorSet,
}

/// List products, optionally filtered by vendor.
///
/// GET /api/products?vendor=<substring>
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the vendor filter is unreasonably long.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Response> {
    let needle = query
        .vendor
        .as_deref()
        .filter(|v| !v.trim().is_empty());

    if needle.is_some_and(|v| v.len() > MAX_VENDOR_FILTER_LEN) {
        return Err(AppError::BadRequest(format!(
            "vendor filter longer than {MAX_VENDOR_FILTER_LEN} bytes"
        )));
    }

    let fetched = state.catalog().products().await;
    let products = filter_by_vendor(&fetched.value, needle);

    info!(
        vendor = needle.unwrap_or("(all)"),
        matched = products.len(),
        total = fetched.value.len(),
        freshness = %fetched.freshness,
        "Products requested"
    );

    Ok((
        [(FRESHNESS_HEADER, fetched.freshness.as_str())],
        Json(ProductsResponse { products }),
    )
        .into_response())
}

/// List vendors with at least one product in the configured category.
///
/// GET /api/vendors
#[instrument(skip(state))]
pub async fn vendors(State(state): State<AppState>) -> Response {
    let fetched = state.catalog().vendors().await;

    (
        [(FRESHNESS_HEADER, fetched.freshness.as_str())],
        Json(VendorsResponse {
            vendors: &fetched.value,
        }),
    )
        .into_response()
}

/// Response for a panic inside the products handler.
pub fn products_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Failed {
        public: "Failed to fetch products",
        detail: panic_message(panic.as_ref()),
    }
    .into_response()
}

/// Response for a panic inside any other API handler.
pub fn api_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Internal(panic_message(panic.as_ref())).into_response()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

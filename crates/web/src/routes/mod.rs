//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Vendor dropdown page (?vendor= preselects)
//! GET  /products               - Product listing page
//! GET  /fallback.svg           - Placeholder product image
//! GET  /health                 - Liveness check
//!
//! # JSON API
//! GET  /api/products           - Products, optional ?vendor= substring filter
//! GET  /api/vendors            - Vendors in the configured category
//! ```

pub mod api;
pub mod home;
pub mod products;

use axum::{
    Router,
    http::{Uri, header},
    response::IntoResponse,
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Placeholder served at [`ncv_compare_core::FALLBACK_IMAGE`].
const FALLBACK_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="300" viewBox="0 0 300 300"><rect width="300" height="300" fill="#e5e7eb"/><text x="150" y="158" font-family="sans-serif" font-size="20" text-anchor="middle" fill="#6b7280">No image</text></svg>"##;

/// Create the application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/products", get(products::index))
        .route(ncv_compare_core::FALLBACK_IMAGE, get(fallback_image))
        .route("/health", get(health))
        .nest("/api", api_routes())
        .fallback(not_found)
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(api::products).layer(CatchPanicLayer::custom(api::products_panic)),
        )
        .route(
            "/vendors",
            get(api::vendors).layer(CatchPanicLayer::custom(api::api_panic)),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify.
pub async fn health() -> &'static str {
    "ok"
}

async fn fallback_image() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        FALLBACK_SVG,
    )
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

//! Product listing page.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use ncv_compare_core::Product;
use tracing::instrument;

use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub products: Arc<Vec<Product>>,
    pub degraded: bool,
}

/// Render every product with its image and first variant price.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ProductsTemplate {
    let fetched = state.catalog().products().await;

    ProductsTemplate {
        products: fetched.value,
        degraded: fetched.freshness.is_degraded(),
    }
}

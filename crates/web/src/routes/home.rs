//! Vendor browser page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use ncv_compare_core::{FALLBACK_IMAGE, Product, filter_by_vendor};
use serde::Deserialize;
use tracing::instrument;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// Vendor to preselect in the dropdown.
    pub vendor: Option<String>,
}

/// One entry of the vendor dropdown.
#[derive(Debug, Clone)]
pub struct VendorOption {
    pub name: String,
    pub selected: bool,
}

/// Preview of the selected vendor's first product.
#[derive(Debug, Clone)]
pub struct Preview {
    pub vendor: String,
    pub image: String,
    pub title: Option<String>,
    pub products_url: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub category: String,
    pub vendors: Vec<VendorOption>,
    pub preview: Option<Preview>,
    pub fallback_image: &'static str,
    pub degraded: bool,
}

/// Render the vendor dropdown, with a preview when `?vendor=` is given.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> IndexTemplate {
    let selected = query
        .vendor
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let (vendors, preview, freshness) = match selected {
        Some(vendor) => {
            let snapshot = state.catalog().snapshot().await;
            let freshness = snapshot.freshness();
            let preview = preview_for(&snapshot.products.value, vendor);
            (snapshot.vendors, Some(preview), freshness)
        }
        None => {
            let vendors = state.catalog().vendors().await;
            let freshness = vendors.freshness;
            (vendors, None, freshness)
        }
    };

    let selected_name = preview.as_ref().map(|p| p.vendor.as_str());
    let options = vendors
        .value
        .iter()
        .map(|name| VendorOption {
            name: name.to_string(),
            selected: selected_name == Some(name),
        })
        .collect();

    IndexTemplate {
        category: state.config().catalog.vendor_category.clone(),
        vendors: options,
        preview,
        fallback_image: FALLBACK_IMAGE,
        degraded: freshness.is_degraded(),
    }
}

fn preview_for(products: &[Product], vendor: String) -> Preview {
    let first = filter_by_vendor(products, Some(&vendor)).into_iter().next();
    Preview {
        products_url: format!("/api/products?vendor={}", urlencoding::encode(&vendor)),
        image: first
            .as_ref()
            .map_or_else(|| FALLBACK_IMAGE.to_string(), |p| p.image().to_string()),
        title: first.map(|p| p.title().to_string()),
        vendor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_uses_first_matching_product() {
        let products = vec![
            Product::builder("gid://shopify/Product/1", "Other", "Lost Mary")
                .image(Some("https://cdn.shopify.com/mary.jpg".to_string()))
                .build(),
            Product::builder("gid://shopify/Product/2", "Pulse", "Geek Bar")
                .image(Some("https://cdn.shopify.com/pulse.jpg".to_string()))
                .build(),
        ];

        let preview = preview_for(&products, "geek bar".to_string());
        assert_eq!(preview.image, "https://cdn.shopify.com/pulse.jpg");
        assert_eq!(preview.title.as_deref(), Some("Pulse"));
        assert_eq!(preview.products_url, "/api/products?vendor=geek%20bar");
    }

    #[test]
    fn test_preview_falls_back_without_match() {
        let preview = preview_for(&[], "Nobody".to_string());
        assert_eq!(preview.image, FALLBACK_IMAGE);
        assert!(preview.title.is_none());
    }
}

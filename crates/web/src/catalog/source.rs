//! Where catalog pages come from.

use std::future::Future;

use ncv_compare_core::Product;

use crate::config::CatalogConfig;
use crate::shopify::{AdminClient, Connection, ProductMetafields, ShopifyError, VendorListing};

use super::sweep::PageRequest;

/// A paginated source of vendor listings and products.
pub trait CatalogSource: Send + Sync + 'static {
    /// One page of vendor listings.
    fn vendor_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Connection<VendorListing>, ShopifyError>> + Send;

    /// One page of fully converted products.
    fn product_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Connection<Product>, ShopifyError>> + Send;
}

/// The Shopify Admin API as a catalog source.
#[derive(Debug, Clone)]
pub struct ShopifySource {
    client: AdminClient,
    metafields: ProductMetafields,
}

impl ShopifySource {
    #[must_use]
    pub const fn new(client: AdminClient, metafields: ProductMetafields) -> Self {
        Self { client, metafields }
    }

    /// Build a source using the metafields named in `config`.
    #[must_use]
    pub fn from_config(client: AdminClient, config: &CatalogConfig) -> Self {
        Self::new(
            client,
            ProductMetafields {
                capacity: config.capacity_metafield.clone(),
                battery: config.battery_metafield.clone(),
            },
        )
    }
}

impl CatalogSource for ShopifySource {
    async fn vendor_page(
        &self,
        request: PageRequest,
    ) -> Result<Connection<VendorListing>, ShopifyError> {
        self.client
            .get_vendor_page(request.first, request.after)
            .await
    }

    async fn product_page(
        &self,
        request: PageRequest,
    ) -> Result<Connection<Product>, ShopifyError> {
        self.client
            .get_product_page(request.first, request.after, &self.metafields)
            .await
    }
}

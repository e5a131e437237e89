//! Paginated product queries.

use ncv_compare_core::Product;
use tracing::instrument;

use super::AdminClient;
use super::conversions::{convert_connection, convert_product_node, convert_vendor_node};
use super::queries::{
    self, ProductMetafields, ProductNode, ProductPageVariables, ProductsData, VendorNode,
    VendorPageVariables,
};
use crate::shopify::{Connection, ShopifyError, VendorListing};

impl AdminClient {
    /// Fetch one page of vendor listings (vendor + product type).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries or the response
    /// lacks the connection fields.
    #[instrument(skip(self, after), fields(has_cursor = after.is_some()))]
    pub async fn get_vendor_page(
        &self,
        first: u32,
        after: Option<String>,
    ) -> Result<Connection<VendorListing>, ShopifyError> {
        let body = queries::vendor_page(VendorPageVariables { first, after });
        let data: ProductsData<VendorNode> = self.execute(&body).await?;
        convert_connection(data, convert_vendor_node)
    }

    /// Fetch one page of products with image, prices, and attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries or the response
    /// lacks the connection fields.
    #[instrument(skip(self, after, metafields), fields(has_cursor = after.is_some()))]
    pub async fn get_product_page(
        &self,
        first: u32,
        after: Option<String>,
        metafields: &ProductMetafields,
    ) -> Result<Connection<Product>, ShopifyError> {
        let body = queries::product_page(ProductPageVariables::new(first, after, metafields));
        let data: ProductsData<ProductNode> = self.execute(&body).await?;
        convert_connection(data, convert_product_node)
    }
}

//! GraphQL documents and response shapes for the Admin API.
//!
//! Documents are sent through `graphql_client::QueryBody`; cursors and page
//! sizes always travel as variables, never interpolated into the query text.

use graphql_client::QueryBody;
use serde::{Deserialize, Serialize};

use crate::config::MetafieldRef;

/// Variant prices requested per product. Only the first price is shown.
pub const VARIANTS_PER_PRODUCT: u32 = 1;

/// Shopify rejects any single query whose requested cost exceeds this.
pub const MAX_QUERY_COST: u32 = 1000;

/// Requested cost of one product node: the node, its featured image, the
/// variants connection with its nodes, and both metafields.
const PRODUCT_NODE_COST: u32 = 1 + 1 + (2 + VARIANTS_PER_PRODUCT) + 1 + 1;

/// Largest product page that stays within [`MAX_QUERY_COST`].
pub const MAX_PRODUCT_PAGE_SIZE: u32 = (MAX_QUERY_COST - 2) / PRODUCT_NODE_COST;

/// Requested cost of a `ProductPage` query fetching `first` products.
#[must_use]
pub const fn product_page_cost(first: u32) -> u32 {
    first.saturating_mul(PRODUCT_NODE_COST).saturating_add(2)
}

pub const VENDOR_PAGE_OPERATION: &str = "VendorPage";

pub const VENDOR_PAGE_QUERY: &str = r"
query VendorPage($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges {
      node {
        vendor
        productType
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

pub const PRODUCT_PAGE_OPERATION: &str = "ProductPage";

pub const PRODUCT_PAGE_QUERY: &str = r"
query ProductPage(
  $first: Int!
  $after: String
  $variantCount: Int!
  $capacityNamespace: String!
  $capacityKey: String!
  $batteryNamespace: String!
  $batteryKey: String!
) {
  products(first: $first, after: $after) {
    edges {
      node {
        id
        title
        vendor
        featuredImage {
          url
        }
        variants(first: $variantCount) {
          edges {
            node {
              price
            }
          }
        }
        ml: metafield(namespace: $capacityNamespace, key: $capacityKey) {
          value
        }
        battery: metafield(namespace: $batteryNamespace, key: $batteryKey) {
          value
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// Metafields that carry the capacity and battery attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductMetafields {
    pub capacity: MetafieldRef,
    pub battery: MetafieldRef,
}

impl Default for ProductMetafields {
    fn default() -> Self {
        Self {
            capacity: MetafieldRef::new("custom", "capacity"),
            battery: MetafieldRef::new("custom", "battery_capacity"),
        }
    }
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VendorPageVariables {
    pub first: u32,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageVariables {
    pub first: u32,
    pub after: Option<String>,
    pub variant_count: u32,
    pub capacity_namespace: String,
    pub capacity_key: String,
    pub battery_namespace: String,
    pub battery_key: String,
}

impl ProductPageVariables {
    pub fn new(first: u32, after: Option<String>, metafields: &ProductMetafields) -> Self {
        Self {
            first,
            after,
            variant_count: VARIANTS_PER_PRODUCT,
            capacity_namespace: metafields.capacity.namespace.clone(),
            capacity_key: metafields.capacity.key.clone(),
            battery_namespace: metafields.battery.namespace.clone(),
            battery_key: metafields.battery.key.clone(),
        }
    }
}

pub fn vendor_page(variables: VendorPageVariables) -> QueryBody<VendorPageVariables> {
    QueryBody {
        variables,
        query: VENDOR_PAGE_QUERY,
        operation_name: VENDOR_PAGE_OPERATION,
    }
}

pub fn product_page(variables: ProductPageVariables) -> QueryBody<ProductPageVariables> {
    QueryBody {
        variables,
        query: PRODUCT_PAGE_QUERY,
        operation_name: PRODUCT_PAGE_OPERATION,
    }
}

// =============================================================================
// Response data
// =============================================================================

/// `data` of a products connection query.
#[derive(Debug, Deserialize)]
pub struct ProductsData<N> {
    pub products: Option<ProductsConnection<N>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsConnection<N> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<N>>,
    pub page_info: Option<PageInfoData>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoData {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorNode {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub featured_image: Option<ImageData>,
    #[serde(default)]
    pub variants: Option<VariantConnection>,
    #[serde(default)]
    pub ml: Option<MetafieldData>,
    #[serde(default)]
    pub battery: Option<MetafieldData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VariantConnection {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<VariantNode>>,
}

#[derive(Debug, Deserialize)]
pub struct VariantNode {
    pub price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldData {
    pub value: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_variables_are_camel_case() {
        let vars = ProductPageVariables::new(50, None, &ProductMetafields::default());
        let json = serde_json::to_value(product_page(vars)).unwrap();

        assert_eq!(json["operationName"], "ProductPage");
        assert_eq!(json["variables"]["first"], 50);
        assert!(json["variables"]["after"].is_null());
        assert_eq!(json["variables"]["variantCount"], VARIANTS_PER_PRODUCT);
        assert_eq!(json["variables"]["capacityNamespace"], "custom");
        assert_eq!(json["variables"]["batteryKey"], "battery_capacity");
    }

    #[test]
    fn test_product_page_cost_within_limit() {
        let default_size = crate::config::CatalogConfig::default().product_page_size;
        assert!(product_page_cost(default_size) <= MAX_QUERY_COST);
        assert!(product_page_cost(MAX_PRODUCT_PAGE_SIZE) <= MAX_QUERY_COST);
        assert!(product_page_cost(MAX_PRODUCT_PAGE_SIZE + 1) > MAX_QUERY_COST);

        // A full 250-node page with the same fields would be rejected upstream
        assert!(product_page_cost(250) > MAX_QUERY_COST);
    }

    #[test]
    fn test_cursor_travels_as_variable() {
        let body = vendor_page(VendorPageVariables {
            first: 50,
            after: Some("eyJsYXN0X2lkIjo0Mn0=".to_string()),
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["variables"]["after"], "eyJsYXN0X2lkIjo0Mn0=");
        assert!(!body.query.contains("eyJsYXN0X2lkIjo0Mn0="));
    }

    #[test]
    fn test_product_node_tolerates_missing_fields() {
        let node: ProductNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Product/1",
            "title": "Bar",
            "vendor": "Acme",
            "featuredImage": null,
            "ml": null
        }))
        .unwrap();

        assert!(node.featured_image.is_none());
        assert!(node.variants.is_none());
        assert!(node.ml.is_none());
        assert!(node.battery.is_none());
    }
}

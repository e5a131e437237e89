//! Conversion from GraphQL response nodes to domain types.

use ncv_compare_core::Product;

use super::queries::{PageInfoData, ProductNode, ProductsData, VendorNode};
use crate::shopify::{Connection, PageInfo, ShopifyError, VendorListing};

/// Unwrap a products connection into a page of converted items.
///
/// # Errors
///
/// Returns `MalformedResponse` if `products` or `pageInfo` is missing.
pub fn convert_connection<N, T>(
    data: ProductsData<N>,
    convert: impl Fn(N) -> T,
) -> Result<Connection<T>, ShopifyError> {
    let products = data
        .products
        .ok_or_else(|| ShopifyError::MalformedResponse("response has no products".to_string()))?;
    let page_info = products
        .page_info
        .ok_or_else(|| ShopifyError::MalformedResponse("response has no pageInfo".to_string()))?;

    Ok(Connection {
        items: products.edges.into_iter().map(|e| convert(e.node)).collect(),
        page_info: convert_page_info(page_info),
    })
}

fn convert_page_info(page_info: PageInfoData) -> PageInfo {
    PageInfo {
        has_next_page: page_info.has_next_page,
        end_cursor: page_info.end_cursor,
    }
}

pub fn convert_vendor_node(node: VendorNode) -> VendorListing {
    VendorListing::new(
        node.vendor.unwrap_or_default(),
        node.product_type.unwrap_or_default(),
    )
}

pub fn convert_product_node(node: ProductNode) -> Product {
    let variants: Vec<String> = node
        .variants
        .map(|v| {
            v.edges
                .into_iter()
                .filter_map(|e| e.node.price)
                .collect()
        })
        .unwrap_or_default();

    Product::builder(
        node.id,
        node.title.unwrap_or_default(),
        node.vendor.unwrap_or_default(),
    )
    .image(node.featured_image.and_then(|i| i.url))
    .price(variants.first().cloned())
    .ml(node.ml.and_then(|m| m.value))
    .battery(node.battery.and_then(|m| m.value))
    .variants(variants)
    .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ncv_compare_core::{DEFAULT_PRICE, FALLBACK_IMAGE, NOT_AVAILABLE};
    use serde_json::json;

    use super::*;

    fn product_node(value: serde_json::Value) -> ProductNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_product_node() {
        let product = convert_product_node(product_node(json!({
            "id": "gid://shopify/Product/7",
            "title": "Geek Bar Pulse",
            "vendor": "Geek Bar",
            "featuredImage": { "url": "https://cdn.shopify.com/pulse.jpg" },
            "variants": { "edges": [
                { "node": { "price": "19.99" } },
                { "node": { "price": "21.99" } }
            ]},
            "ml": { "value": "16ml" },
            "battery": { "value": "820mAh" }
        })));

        assert_eq!(product.id().as_str(), "gid://shopify/Product/7");
        assert_eq!(product.image(), "https://cdn.shopify.com/pulse.jpg");
        assert_eq!(product.price(), "19.99");
        assert_eq!(product.variants(), ["19.99", "21.99"]);
        assert_eq!(product.ml(), "16ml");
        assert_eq!(product.battery(), "820mAh");
    }

    #[test]
    fn test_sparse_product_node_gets_defaults() {
        let product = convert_product_node(product_node(json!({
            "id": "gid://shopify/Product/8",
            "title": "Mystery",
            "vendor": "Acme",
            "featuredImage": null,
            "variants": { "edges": [] },
            "ml": null,
            "battery": { "value": null }
        })));

        assert_eq!(product.image(), FALLBACK_IMAGE);
        assert_eq!(product.price(), DEFAULT_PRICE);
        assert_eq!(product.ml(), NOT_AVAILABLE);
        assert_eq!(product.battery(), NOT_AVAILABLE);
        assert!(product.variants().is_empty());
    }

    #[test]
    fn test_vendor_connection() {
        let data: ProductsData<VendorNode> = serde_json::from_value(json!({
            "products": {
                "edges": [
                    { "node": { "vendor": " Acme ", "productType": "DISPOSABLES" } },
                    { "node": { "vendor": null, "productType": "E-LIQUID" } }
                ],
                "pageInfo": { "hasNextPage": true, "endCursor": "c1" }
            }
        }))
        .unwrap();

        let page = convert_connection(data, convert_vendor_node).unwrap();
        assert_eq!(
            page.items,
            vec![
                VendorListing::new(" Acme ", "DISPOSABLES"),
                VendorListing::new("", "E-LIQUID"),
            ]
        );
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn test_missing_products_is_malformed() {
        let data: ProductsData<VendorNode> =
            serde_json::from_value(json!({ "products": null })).unwrap();
        let err = convert_connection(data, convert_vendor_node).unwrap_err();
        assert!(matches!(err, ShopifyError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_page_info_is_malformed() {
        let data: ProductsData<VendorNode> =
            serde_json::from_value(json!({ "products": { "edges": [] } })).unwrap();
        let err = convert_connection(data, convert_vendor_node).unwrap_err();
        assert!(matches!(err, ShopifyError::MalformedResponse(_)));
    }
}

//! Catalog product entity.
//!
//! A [`Product`] is built once from an upstream response and never mutated.
//! Every optional upstream field is replaced by a sentinel default at build
//! time, so callers never see a missing value.

use serde::Serialize;

use super::id::ProductId;

/// Image path used when a product has no featured image.
pub const FALLBACK_IMAGE: &str = "/fallback.svg";

/// Price used when a product has no variant price.
pub const DEFAULT_PRICE: &str = "0.00";

/// Value used for absent custom attributes (capacity, battery capacity).
pub const NOT_AVAILABLE: &str = "N/A";

/// A catalog product as served to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    title: String,
    vendor: String,
    image: String,
    price: String,
    ml: String,
    battery: String,
    variants: Vec<String>,
}

impl Product {
    /// Start building a product from its required fields.
    #[must_use]
    pub fn builder(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        vendor: impl Into<String>,
    ) -> ProductBuilder {
        ProductBuilder {
            id: id.into(),
            title: title.into(),
            vendor: vendor.into(),
            image: None,
            price: None,
            ml: None,
            battery: None,
            variants: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Featured image URL, or [`FALLBACK_IMAGE`].
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// First variant price as a decimal string, or [`DEFAULT_PRICE`].
    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    /// Capacity attribute, or [`NOT_AVAILABLE`].
    #[must_use]
    pub fn ml(&self) -> &str {
        &self.ml
    }

    /// Battery capacity attribute, or [`NOT_AVAILABLE`].
    #[must_use]
    pub fn battery(&self) -> &str {
        &self.battery
    }

    /// Per-variant prices in upstream order.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Case-insensitive substring match on the vendor name.
    #[must_use]
    pub fn vendor_matches(&self, needle: &str) -> bool {
        self.vendor.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Builder for [`Product`] that applies sentinel defaults on [`build`](Self::build).
///
/// Empty or whitespace-only values count as absent.
#[derive(Debug, Clone)]
#[must_use]
pub struct ProductBuilder {
    id: ProductId,
    title: String,
    vendor: String,
    image: Option<String>,
    price: Option<String>,
    ml: Option<String>,
    battery: Option<String>,
    variants: Vec<String>,
}

impl ProductBuilder {
    pub fn image(mut self, url: Option<String>) -> Self {
        self.image = url;
        self
    }

    pub fn price(mut self, price: Option<String>) -> Self {
        self.price = price;
        self
    }

    pub fn ml(mut self, value: Option<String>) -> Self {
        self.ml = value;
        self
    }

    pub fn battery(mut self, value: Option<String>) -> Self {
        self.battery = value;
        self
    }

    pub fn variants(mut self, prices: Vec<String>) -> Self {
        self.variants = prices;
        self
    }

    #[must_use]
    pub fn build(self) -> Product {
        Product {
            id: self.id,
            title: self.title,
            vendor: self.vendor,
            image: or_default(self.image, FALLBACK_IMAGE),
            price: or_default(self.price, DEFAULT_PRICE),
            ml: or_default(self.ml, NOT_AVAILABLE),
            battery: or_default(self.battery, NOT_AVAILABLE),
            variants: self.variants,
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Filter products by case-insensitive vendor substring.
///
/// `None` or an empty needle returns every product.
#[must_use]
pub fn filter_by_vendor(products: &[Product], needle: Option<&str>) -> Vec<Product> {
    match needle {
        Some(needle) if !needle.is_empty() => products
            .iter()
            .filter(|p| p.vendor_matches(needle))
            .cloned()
            .collect(),
        _ => products.to_vec(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(vendor: &str) -> Product {
        Product::builder("gid://shopify/Product/1", "Test", vendor).build()
    }

    #[test]
    fn test_defaults_applied_when_absent() {
        let p = product("Acme");
        assert_eq!(p.image(), FALLBACK_IMAGE);
        assert_eq!(p.price(), DEFAULT_PRICE);
        assert_eq!(p.ml(), NOT_AVAILABLE);
        assert_eq!(p.battery(), NOT_AVAILABLE);
        assert!(p.variants().is_empty());
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let p = Product::builder("gid://shopify/Product/1", "Test", "Acme")
            .image(Some(String::new()))
            .price(Some("  ".to_string()))
            .build();
        assert_eq!(p.image(), FALLBACK_IMAGE);
        assert_eq!(p.price(), DEFAULT_PRICE);
    }

    #[test]
    fn test_present_values_kept() {
        let p = Product::builder("gid://shopify/Product/1", "Test", "Acme")
            .image(Some("https://cdn.shopify.com/a.jpg".to_string()))
            .price(Some("19.99".to_string()))
            .ml(Some("10ml".to_string()))
            .battery(Some("650mAh".to_string()))
            .variants(vec!["19.99".to_string()])
            .build();
        assert_eq!(p.image(), "https://cdn.shopify.com/a.jpg");
        assert_eq!(p.price(), "19.99");
        assert_eq!(p.ml(), "10ml");
        assert_eq!(p.battery(), "650mAh");
        assert_eq!(p.variants(), ["19.99".to_string()]);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(product("Acme")).unwrap();
        assert_eq!(json["id"], "gid://shopify/Product/1");
        assert_eq!(json["vendor"], "Acme");
        assert_eq!(json["ml"], "N/A");
        assert_eq!(json["battery"], "N/A");
        assert_eq!(json["image"], "/fallback.svg");
        assert_eq!(json["price"], "0.00");
        assert_eq!(json["variants"], serde_json::json!([]));
    }

    #[test]
    fn test_filter_by_vendor_case_insensitive_substring() {
        let products = vec![product("VICE BOOST 9K"), product("Geek Bar"), product("vice")];

        let matched = filter_by_vendor(&products, Some("Vice Boost"));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].vendor(), "VICE BOOST 9K");

        let matched = filter_by_vendor(&products, Some("VICE"));
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_filter_by_vendor_absent_or_empty_returns_all() {
        let products = vec![product("A"), product("B")];
        assert_eq!(filter_by_vendor(&products, None).len(), 2);
        assert_eq!(filter_by_vendor(&products, Some("")).len(), 2);
    }
}

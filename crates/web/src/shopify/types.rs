//! Domain types returned by the Admin API client.

/// Pagination information for connection queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// One page of a paginated connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    /// Items on this page, in upstream order.
    pub items: Vec<T>,
    /// Continuation state for the next request.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// A page with no successor.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            page_info: PageInfo {
                has_next_page: false,
                end_cursor: None,
            },
        }
    }

    /// A page followed by another page starting after `cursor`.
    #[must_use]
    pub fn followed_by(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            page_info: PageInfo {
                has_next_page: true,
                end_cursor: Some(cursor.into()),
            },
        }
    }
}

/// A product reduced to the fields that decide vendor membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorListing {
    /// Vendor name as stored upstream (untrimmed).
    pub vendor: String,
    /// Shopify product type (the catalog category).
    pub product_type: String,
}

impl VendorListing {
    #[must_use]
    pub fn new(vendor: impl Into<String>, product_type: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            product_type: product_type.into(),
        }
    }
}

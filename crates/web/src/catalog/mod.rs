//! Vendor and product catalog with TTL caching.
//!
//! # Architecture
//!
//! - [`CatalogSource`] yields one page at a time; [`ShopifySource`] is the
//!   production implementation
//! - [`sweep`] walks every page and folds them into a [`VendorSet`] or a
//!   product list
//! - [`TtlCache`] holds one value per collection; only complete sweeps are
//!   stored
//! - Failed refreshes fall back to the expired value, or to an empty
//!   collection, and say so through [`Freshness`]
//!
//! # Example
//!
//! ```rust,ignore
//! let catalog = Catalog::new(ShopifySource::from_config(client, &config.catalog), &config.catalog);
//!
//! let vendors = catalog.vendors().await;
//! if vendors.freshness.is_degraded() {
//!     tracing::warn!("serving degraded vendor list");
//! }
//! ```

pub mod cache;
mod source;
pub mod sweep;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ncv_compare_core::{Product, VendorSet};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

pub use cache::{Clock, Lookup, ManualClock, SystemClock, TtlCache};
pub use source::{CatalogSource, ShopifySource};
pub use sweep::{PageRequest, SweepOutcome};

use crate::config::CatalogConfig;
use crate::shopify::{ShopifyError, VendorListing};

/// How a returned collection relates to the upstream catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Served from cache within its TTL.
    Cached,
    /// Just fetched in full; the cache now holds it.
    Refreshed,
    /// The sweep hit its deadline with nothing cached; not cached.
    Partial,
    /// The refresh failed or was cut short; this is the expired cached value.
    Stale,
    /// The refresh failed and nothing was cached; the collection is empty.
    Unavailable,
}

impl Freshness {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Refreshed => "refreshed",
            Self::Partial => "partial",
            Self::Stale => "stale",
            Self::Unavailable => "unavailable",
        }
    }

    /// True when the value may be missing items the upstream has.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Partial | Self::Stale | Self::Unavailable)
    }

    /// The less fresh of two values.
    #[must_use]
    pub const fn worst(self, other: Self) -> Self {
        if self.rank() >= other.rank() { self } else { other }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Cached => 0,
            Self::Refreshed => 1,
            Self::Partial => 2,
            Self::Stale => 3,
            Self::Unavailable => 4,
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection plus how fresh it is.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: Arc<T>,
    pub freshness: Freshness,
}

impl<T> Fetched<T> {
    const fn new(value: Arc<T>, freshness: Freshness) -> Self {
        Self { value, freshness }
    }
}

/// Vendors and products fetched together.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub vendors: Fetched<VendorSet>,
    pub products: Fetched<Vec<Product>>,
}

impl CatalogSnapshot {
    /// The less fresh of the two collections.
    #[must_use]
    pub const fn freshness(&self) -> Freshness {
        self.vendors.freshness.worst(self.products.freshness)
    }
}

/// Cached access to the vendor set and product list.
///
/// Cheap to clone; clones share the caches.
pub struct Catalog<S, C = SystemClock> {
    inner: Arc<CatalogInner<S, C>>,
}

struct CatalogInner<S, C> {
    source: S,
    vendor_page_size: u32,
    product_page_size: u32,
    sweep_deadline: Duration,
    vendor_category: String,
    vendors: TtlCache<VendorSet, C>,
    products: TtlCache<Vec<Product>, C>,
}

impl<S, C> Clone for Catalog<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> fmt::Debug for Catalog<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("vendor_page_size", &self.inner.vendor_page_size)
            .field("product_page_size", &self.inner.product_page_size)
            .field("sweep_deadline", &self.inner.sweep_deadline)
            .field("vendor_category", &self.inner.vendor_category)
            .finish_non_exhaustive()
    }
}

impl<S: CatalogSource> Catalog<S> {
    /// Create a catalog using wall-clock time for cache expiry.
    #[must_use]
    pub fn new(source: S, config: &CatalogConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<S: CatalogSource, C: Clock + Clone> Catalog<S, C> {
    /// Create a catalog with an explicit clock.
    #[must_use]
    pub fn with_clock(source: S, config: &CatalogConfig, clock: C) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                source,
                vendor_page_size: config.vendor_page_size,
                product_page_size: config.product_page_size,
                sweep_deadline: config.sweep_deadline,
                vendor_category: config.vendor_category.clone(),
                vendors: TtlCache::new(config.cache_ttl, clock.clone()),
                products: TtlCache::new(config.cache_ttl, clock),
            }),
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Vendors with at least one product in the configured category.
    #[instrument(skip(self))]
    pub async fn vendors(&self) -> Fetched<VendorSet> {
        let fetched = gate(&self.inner.vendors, "vendors", || self.sweep_vendors()).await;
        debug!(
            count = fetched.value.len(),
            freshness = %fetched.freshness,
            "Vendors ready"
        );
        fetched
    }

    /// Every product, in upstream order.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Fetched<Vec<Product>> {
        let fetched = gate(&self.inner.products, "products", || self.sweep_products()).await;
        debug!(
            count = fetched.value.len(),
            freshness = %fetched.freshness,
            "Products ready"
        );
        fetched
    }

    /// Vendors and products, fetched concurrently.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        let (vendors, products) = tokio::join!(self.vendors(), self.products());
        CatalogSnapshot { vendors, products }
    }

    /// Fill both caches.
    pub async fn warm(&self) {
        let snapshot = self.snapshot().await;
        info!(
            vendors = snapshot.vendors.value.len(),
            vendors_freshness = %snapshot.vendors.freshness,
            products = snapshot.products.value.len(),
            products_freshness = %snapshot.products.freshness,
            "Catalog cache warmed"
        );
    }

    /// Drop both cached values so the next access sweeps.
    pub async fn invalidate(&self) {
        tokio::join!(self.inner.vendors.clear(), self.inner.products.clear());
    }

    async fn sweep_vendors(&self) -> Result<SweepOutcome<VendorSet>, ShopifyError> {
        let category = self.inner.vendor_category.as_str();
        sweep::run(
            "vendors",
            self.inner.vendor_page_size,
            self.inner.sweep_deadline,
            VendorSet::new(),
            |request| self.inner.source.vendor_page(request),
            |set: &mut VendorSet, listing: VendorListing| {
                if listing.product_type == category {
                    set.insert(&listing.vendor);
                }
            },
        )
        .await
    }

    async fn sweep_products(&self) -> Result<SweepOutcome<Vec<Product>>, ShopifyError> {
        sweep::run(
            "products",
            self.inner.product_page_size,
            self.inner.sweep_deadline,
            Vec::new(),
            |request| self.inner.source.product_page(request),
            Vec::push,
        )
        .await
    }
}

/// Serve from `cache` when fresh, otherwise run `refresh` and decide what to
/// store and return.
async fn gate<T, C, F, Fut>(cache: &TtlCache<T, C>, collection: &'static str, refresh: F) -> Fetched<T>
where
    T: Default,
    C: Clock,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<SweepOutcome<T>, ShopifyError>>,
{
    let expired = match cache.lookup().await {
        Lookup::Fresh(value) => {
            debug!(collection, "Cache hit");
            return Fetched::new(value, Freshness::Cached);
        }
        Lookup::Expired(value) => Some(value),
        Lookup::Empty => None,
    };

    debug!(collection, had_value = expired.is_some(), "Cache miss, sweeping");

    match refresh().await {
        Ok(SweepOutcome::Complete(value)) => Fetched::new(cache.store(value).await, Freshness::Refreshed),
        Ok(SweepOutcome::Truncated(value)) => match expired {
            Some(stale) => {
                warn!(collection, "Sweep truncated, serving expired value");
                Fetched::new(stale, Freshness::Stale)
            }
            None => {
                warn!(collection, "Serving partial sweep without caching it");
                Fetched::new(Arc::new(value), Freshness::Partial)
            }
        },
        Err(e) => {
            error!(collection, error = %e, "Catalog refresh failed");
            match expired {
                Some(value) => Fetched::new(value, Freshness::Stale),
                None => Fetched::new(Arc::new(T::default()), Freshness::Unavailable),
            }
        }
    }
}

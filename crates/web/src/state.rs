//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{Catalog, ShopifySource};
use crate::config::AppConfig;
use crate::shopify::{AdminClient, ShopifyError};

/// The catalog type used by the running application.
pub type AppCatalog = Catalog<ShopifySource>;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    catalog: AppCatalog,
}

impl AppState {
    /// Create the application state, building the Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Configuration` if the Shopify credentials are
    /// unusable.
    pub fn new(config: AppConfig) -> Result<Self, ShopifyError> {
        let client = AdminClient::new(&config.shopify)?;
        let source = ShopifySource::from_config(client, &config.catalog);
        let catalog = Catalog::new(source, &config.catalog);
        Ok(Self::with_catalog(config, catalog))
    }

    /// Create the application state around an existing catalog.
    #[must_use]
    pub fn with_catalog(config: AppConfig, catalog: AppCatalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, catalog }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &AppCatalog {
        &self.inner.catalog
    }

    /// Fill the catalog caches in the background so the first page view
    /// doesn't pay for a full sweep.
    pub fn start_cache_warmup(&self) -> tokio::task::JoinHandle<()> {
        let catalog = self.inner.catalog.clone();
        tokio::spawn(async move {
            tracing::info!("Catalog warm-up started");
            catalog.warm().await;
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("catalog", &self.inner.catalog)
            .finish()
    }
}

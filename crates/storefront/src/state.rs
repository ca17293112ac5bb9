//! Application state shared across views.

use std::sync::Arc;

use crate::cart::{CartHandle, CartStore, FileStorage, MemoryStorage};
use crate::catalog::Catalog;
use crate::checkout::CheckoutFlow;
use crate::config::StorefrontConfig;

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the catalog, and the one cart store every view reads.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: StorefrontConfig,
    cart: CartHandle,
    catalog: Catalog,
}

impl AppState {
    /// Open the application state, hydrating the cart from the configured
    /// storage directory.
    #[must_use]
    pub fn open(config: StorefrontConfig) -> Self {
        let storage = FileStorage::new(&config.storage_dir);
        let cart = CartHandle::new(CartStore::open(storage));
        Self::with_cart(config, cart)
    }

    /// State with an in-memory cart that is lost on exit.
    #[must_use]
    pub fn ephemeral(config: StorefrontConfig) -> Self {
        let cart = CartHandle::new(CartStore::open(MemoryStorage::new()));
        Self::with_cart(config, cart)
    }

    fn with_cart(config: StorefrontConfig, cart: CartHandle) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                cart,
                catalog: Catalog::builtin(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a handle to the shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartHandle {
        &self.inner.cart
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Start a new checkout flow using the configured handoff settings.
    #[must_use]
    pub fn checkout(&self) -> CheckoutFlow {
        CheckoutFlow::new(self.inner.config.handoff())
    }
}

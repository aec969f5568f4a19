//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout::CheckoutService;
use crate::config::StorefrontConfig;
use crate::rtdb::RtdbClient;
use crate::sheets::SheetsClient;
use crate::stock::StockService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and bundles every service as
/// an explicit instance - there is no module-level mutable state anywhere,
/// so several storefront instances can coexist in one process (tests do
/// exactly that).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: Arc<CartStore>,
    stock: Arc<StockService>,
    checkout: CheckoutService,
    rtdb: RtdbClient,
}

impl AppState {
    /// Wire up all services from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let sheets = SheetsClient::new(
            config.sheets_api_url.clone(),
            config.sheets_api_token.clone(),
        );
        let rtdb = RtdbClient::new(config.rtdb_url.clone(), config.rtdb_auth_token.clone());
        let catalog = Catalog::new(sheets.clone(), config.catalog_ttl_secs);
        let cart = Arc::new(CartStore::open(config.cart_store_path.clone()));
        let stock = Arc::new(StockService::new(
            sheets,
            catalog.clone(),
            Arc::clone(&cart),
        ));
        let checkout = CheckoutService::new(Arc::clone(&stock), Arc::clone(&cart), rtdb.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                stock,
                checkout,
                rtdb,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &Arc<CartStore> {
        &self.inner.cart
    }

    /// Get a reference to the stock reconciliation service.
    #[must_use]
    pub fn stock(&self) -> &Arc<StockService> {
        &self.inner.stock
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Get a reference to the realtime database client.
    #[must_use]
    pub fn rtdb(&self) -> &RtdbClient {
        &self.inner.rtdb
    }
}

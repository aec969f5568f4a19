//! Stock reconciliation.
//!
//! Keeps displayed stock consistent with the authoritative sheet count
//! after a purchase attempt, degrading through three strategies because the
//! bulk decrement action is not supported or reliable on every deployment:
//!
//! 1. one bulk decrement request;
//! 2. when the server answers "operation not supported": read the current
//!    stock and issue an absolute set to `max(0, server - qty)`;
//! 3. when the bulk request fails outright: `qty` concurrent single-unit
//!    decrements, followed by an authoritative re-read. Individual unit
//!    responses race each other, so their stock values are discarded and
//!    the re-read wins. If every unit fails, fall back to strategy 2.
//!
//! Network failures at any tier degrade to the next; only total exhaustion
//! reports a failed outcome. Errors never escape [`StockService::decrement_stock`].
//!
//! There is no compare-and-swap on the sheet: every decrement is a blind
//! read-then-write or unconditional decrement, so concurrent shoppers can
//! oversell the last units of a product. The remote API is the only
//! enforcement point for that.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use kukoro_core::{DecrementStatus, ProductKey};

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::sheets::{SheetsClient, classify_unsupported};

/// Receives the finally-accepted stock after each reconciliation so the UI
/// layer can repaint whatever is bound to the product.
pub trait StockObserver: Send + Sync {
    fn stock_changed(&self, key: &ProductKey, new_stock: u32);
}

/// Result of one reconciliation attempt.
#[derive(Debug, Clone)]
pub struct DecrementOutcome {
    pub status: DecrementStatus,
    /// Stock value finally accepted, when one was observed.
    pub new_stock: Option<u32>,
    /// Why the attempt failed or stayed partial.
    pub reason: Option<String>,
}

impl DecrementOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    fn applied(new_stock: Option<u32>) -> Self {
        Self {
            status: DecrementStatus::Applied,
            new_stock,
            reason: None,
        }
    }

    fn partial(applied: u32, requested: u32, new_stock: Option<u32>) -> Self {
        Self {
            status: DecrementStatus::Partial { applied },
            new_stock,
            reason: Some(format!(
                "only {applied} of {requested} units could be reserved"
            )),
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: DecrementStatus::Failed,
            new_stock: None,
            reason: Some(reason.into()),
        }
    }
}

/// Server-authoritative stock reconciliation over the sheets API.
pub struct StockService {
    sheets: SheetsClient,
    catalog: Catalog,
    cart: Arc<CartStore>,
    observers: RwLock<Vec<Arc<dyn StockObserver>>>,
}

impl StockService {
    #[must_use]
    pub fn new(sheets: SheetsClient, catalog: Catalog, cart: Arc<CartStore>) -> Self {
        Self {
            sheets,
            catalog,
            cart,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for accepted stock values.
    pub fn register_observer(&self, observer: Arc<dyn StockObserver>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(observer);
        }
    }

    /// Decrement `qty` units for a product, running the fallback ladder.
    ///
    /// Never returns an error: failures at every tier degrade to the next,
    /// and total exhaustion is reported as a failed outcome.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn decrement_stock(&self, key: &ProductKey, qty: u32) -> DecrementOutcome {
        if qty == 0 {
            return DecrementOutcome::applied(None);
        }

        // Tier 1: bulk decrement.
        match self.sheets.decrement(key, qty).await {
            Ok(resp) if resp.is_ok() => {
                if let Some(stock) = resp.stock_value() {
                    self.accept(key, stock).await;
                    return DecrementOutcome::applied(Some(stock));
                }
                // Generic ack without a number: trust it, then read what
                // the server actually holds now.
                debug!("bulk decrement acked without stock, reading back");
                let stock = self.fetch_authoritative_stock(key).await;
                if let Some(stock) = stock {
                    self.accept(key, stock).await;
                }
                DecrementOutcome::applied(stock)
            }
            Ok(resp) if resp.texts().any(classify_unsupported) => {
                // Tier 2: this deployment has no decrement action at all.
                debug!("bulk decrement unsupported, using read-then-set");
                self.read_then_set(key, qty, "bulk decrement unsupported")
                    .await
            }
            Ok(resp) => {
                warn!(
                    error = resp.error.as_deref().unwrap_or("unspecified"),
                    "bulk decrement rejected, trying per-unit fallback"
                );
                self.per_unit_fallback(key, qty).await
            }
            Err(err) => {
                warn!(error = %err, "bulk decrement failed, trying per-unit fallback");
                self.per_unit_fallback(key, qty).await
            }
        }
    }

    /// Tier 3: `qty` concurrent single-unit decrements.
    ///
    /// The unit responses resolve in arbitrary order, so any stock values
    /// they carry are discarded; whenever at least one unit succeeded the
    /// sheet is re-read authoritatively instead.
    async fn per_unit_fallback(&self, key: &ProductKey, qty: u32) -> DecrementOutcome {
        let attempts = (0..qty).map(|_| self.sheets.decrement(key, 1));
        let results = join_all(attempts).await;
        let succeeded = results
            .iter()
            .filter(|result| matches!(result, Ok(resp) if resp.is_ok()))
            .count();
        let succeeded = u32::try_from(succeeded).unwrap_or(u32::MAX);

        if succeeded == 0 {
            return self
                .read_then_set(key, qty, "per-unit decrements all failed")
                .await;
        }

        let stock = self.fetch_authoritative_stock(key).await;
        if let Some(stock) = stock {
            self.accept(key, stock).await;
        }

        if succeeded == qty {
            DecrementOutcome::applied(stock)
        } else {
            DecrementOutcome::partial(succeeded, qty, stock)
        }
    }

    /// Tier 2 (also the last resort of tier 3): read the authoritative
    /// stock, subtract the full requested quantity, and set absolutely.
    async fn read_then_set(&self, key: &ProductKey, qty: u32, context: &str) -> DecrementOutcome {
        let Some(server_stock) = self.fetch_authoritative_stock(key).await else {
            return DecrementOutcome::failed(format!(
                "could not read authoritative stock ({context})"
            ));
        };
        let target = server_stock.saturating_sub(qty);
        if self.set_absolute_stock(key, target).await {
            self.accept(key, target).await;
            DecrementOutcome::applied(Some(target))
        } else {
            DecrementOutcome::failed(format!("absolute stock set failed ({context})"))
        }
    }

    /// Read the current authoritative stock for a product.
    ///
    /// Queries the category sheet directly (bypassing the catalog cache)
    /// and returns `None` on any network or parse failure rather than
    /// erroring.
    pub async fn fetch_authoritative_stock(&self, key: &ProductKey) -> Option<u32> {
        match self.sheets.fetch_products(&key.category).await {
            Ok(rows) => rows
                .iter()
                .find(|row| row.row == key.row)
                .and_then(crate::sheets::SheetRow::stock),
            Err(err) => {
                warn!(key = %key, error = %err, "authoritative stock read failed");
                None
            }
        }
    }

    /// Set a product's stock to an absolute value. True on any 2xx.
    pub async fn set_absolute_stock(&self, key: &ProductKey, value: u32) -> bool {
        match self.sheets.set_stock(key, value).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %key, value, error = %err, "absolute stock set failed");
                false
            }
        }
    }

    /// Units a shopper can still add: `max(0, server_stock - reserved)`.
    ///
    /// `None` when the product is unknown or the sheet is unreachable.
    /// Never negative by construction.
    pub async fn available(&self, key: &ProductKey) -> Option<u32> {
        let product = self.catalog.product(key).await.ok()??;
        Some(product.stock.saturating_sub(self.cart.reserved(key)))
    }

    /// Drop cached state for a category so displays resynchronize from the
    /// server on the next read.
    pub async fn resync(&self, category: &str) {
        self.catalog.invalidate(category).await;
    }

    /// Apply an accepted stock value to the catalog cache and notify
    /// observers (the UI repaint contract).
    async fn accept(&self, key: &ProductKey, new_stock: u32) {
        self.catalog.apply_stock(key, new_stock).await;
        let observers = self
            .observers
            .read()
            .map(|observers| observers.clone())
            .unwrap_or_default();
        for observer in observers {
            observer.stock_changed(key, new_stock);
        }
    }
}

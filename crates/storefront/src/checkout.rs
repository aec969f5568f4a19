//! Checkout orchestration.
//!
//! Drives a batch of cart lines through stock reconciliation, partitions
//! the outcomes, and reconciles cart state and order persistence. Each line
//! is attempted independently - there is no cross-item transaction, so a
//! multi-item cart can partially succeed. What happens then is the
//! shopper's explicit choice (proceed with the reserved subset, or abort
//! and resync), never a silent retry.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use kukoro_core::{CartLineItem, CheckoutOutcome, CustomerInfo, Order, OrderId};

use crate::cart::CartStore;
use crate::rtdb::{RtdbClient, RtdbError};
use crate::stock::StockService;

/// The shopper's standing answer to a partially-successful checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartialResolution {
    /// Order only the lines that reserved stock.
    Proceed,
    /// Create no order; resynchronize displayed stock from the server.
    #[default]
    Abort,
}

/// How the checkout pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CheckoutDisposition {
    /// Every line reserved stock; one order was written.
    Completed { order_id: OrderId },
    /// Some lines failed and the shopper chose to proceed; a partial order
    /// was written for the reserved lines.
    PartialCompleted { order_id: OrderId },
    /// Some lines failed and the shopper chose to abort; no order exists.
    Aborted,
    /// No line reserved stock; no order exists.
    AllFailed,
}

/// Full result of one checkout pass, handed to the UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub disposition: CheckoutDisposition,
    pub successes: Vec<CheckoutOutcome>,
    pub failures: Vec<CheckoutOutcome>,
}

/// Errors a checkout pass can surface.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart had no lines to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// The order write failed. Reserved lines were already removed from
    /// the cart; the caller decides whether to alert and retry.
    #[error("order persistence failed: {0}")]
    OrderPersistence(#[from] RtdbError),
}

/// Orchestrates reconciliation, cart post-processing, and order writes.
pub struct CheckoutService {
    stock: Arc<StockService>,
    cart: Arc<CartStore>,
    rtdb: RtdbClient,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(stock: Arc<StockService>, cart: Arc<CartStore>, rtdb: RtdbClient) -> Self {
        Self { stock, cart, rtdb }
    }

    /// Run stock reconciliation for each line and partition the outcomes.
    ///
    /// The partition is complete and disjoint: every input line appears in
    /// exactly one of the two returned lists.
    pub async fn finalize_purchase(
        &self,
        items: &[CartLineItem],
    ) -> (Vec<CheckoutOutcome>, Vec<CheckoutOutcome>) {
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for item in items {
            let result = self.stock.decrement_stock(&item.key, item.quantity).await;
            let outcome = CheckoutOutcome {
                item: item.clone(),
                status: result.status,
                new_stock: result.new_stock,
                reason: result.reason,
            };
            if outcome.is_success() {
                successes.push(outcome);
            } else {
                failures.push(outcome);
            }
        }
        (successes, failures)
    }

    /// Check out the whole cart.
    ///
    /// Reserved lines are removed from the cart and the cart re-persisted
    /// before any order write, mirroring what the shopper sees. `on_partial`
    /// is the shopper's choice for the mixed case.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] when there is nothing to check out, and
    /// [`CheckoutError::OrderPersistence`] when the order write fails after
    /// reservation.
    #[instrument(skip_all, fields(on_partial = ?on_partial))]
    pub async fn checkout(
        &self,
        customer: CustomerInfo,
        on_partial: PartialResolution,
    ) -> Result<CheckoutSummary, CheckoutError> {
        let items = self.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (successes, failures) = self.finalize_purchase(&items).await;

        let reserved_keys: Vec<_> = successes.iter().map(|o| o.item.key.clone()).collect();
        self.cart.remove_many(reserved_keys.iter());

        let disposition = if failures.is_empty() {
            let order = self.ordered_items(&successes);
            let order = Order::from_items(&order, customer, false);
            let order_id = self.rtdb.create_order(&order).await?;
            info!(%order_id, lines = successes.len(), "checkout completed");
            CheckoutDisposition::Completed { order_id }
        } else if successes.is_empty() {
            warn!(lines = failures.len(), "no stock could be reserved");
            self.resync_categories(&failures).await;
            CheckoutDisposition::AllFailed
        } else {
            match on_partial {
                PartialResolution::Proceed => {
                    let order = self.ordered_items(&successes);
                    let order = Order::from_items(&order, customer, true);
                    let order_id = self.rtdb.create_order(&order).await?;
                    info!(
                        %order_id,
                        reserved = successes.len(),
                        failed = failures.len(),
                        "partial checkout completed"
                    );
                    CheckoutDisposition::PartialCompleted { order_id }
                }
                PartialResolution::Abort => {
                    self.resync_categories(&failures).await;
                    self.resync_categories(&successes).await;
                    CheckoutDisposition::Aborted
                }
            }
        };

        Ok(CheckoutSummary {
            disposition,
            successes,
            failures,
        })
    }

    /// The reserved cart lines, in their original order.
    fn ordered_items(&self, successes: &[CheckoutOutcome]) -> Vec<CartLineItem> {
        successes.iter().map(|o| o.item.clone()).collect()
    }

    /// Invalidate the category of every affected outcome, once each.
    async fn resync_categories(&self, outcomes: &[CheckoutOutcome]) {
        let categories: BTreeSet<&str> = outcomes
            .iter()
            .map(|o| o.item.key.category.as_str())
            .collect();
        for category in categories {
            self.stock.resync(category).await;
        }
    }
}

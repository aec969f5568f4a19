//! Per-item results of a checkout pass.

use serde::{Deserialize, Serialize};

use crate::types::cart::CartLineItem;

/// How a stock decrement for one cart line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DecrementStatus {
    /// The full requested quantity was reserved server-side.
    Applied,
    /// Only `applied` of the requested units were decremented. The server
    /// keeps those units decremented; no order line is created for them,
    /// and the count is surfaced so the shopper prompt can say so.
    Partial { applied: u32 },
    /// Nothing was reserved.
    Failed,
}

impl DecrementStatus {
    /// True only for a complete reservation. Partial effects count as
    /// failures for ordering purposes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Outcome of attempting one cart line during checkout.
///
/// Produced per item by the checkout orchestrator and consumed immediately;
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub item: CartLineItem,
    pub status: DecrementStatus,
    /// Authoritative stock accepted at the end of reconciliation, when one
    /// was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_stock: Option<u32>,
    /// Human-readable failure reason, present when status is not `Applied`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order, including the payment-specific states the
/// checkout flow writes before an admin picks the order up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// Checkout completed but payment confirmation is still outstanding.
    PaymentPending,
    /// Payment was attempted and rejected.
    PaymentFailed,
    /// A refund was issued after cancellation.
    Refunded,
}

impl OrderStatus {
    /// Whether an admin may still transition the order to `to`.
    ///
    /// Delivered and refunded orders are terminal; cancelled orders may only
    /// move to refunded.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        match self {
            Self::Delivered | Self::Refunded => false,
            Self::Cancelled => matches!(to, Self::Refunded),
            _ => true,
        }
    }
}

//! Shopper reviews and cancellation/refund requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::key::ProductKey;
use crate::types::order::OrderId;

/// A product review pushed by a shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    /// Star rating, 1 through 5.
    pub rating: u8,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Clamp the rating into the 1..=5 range the UI renders.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.rating = self.rating.clamp(1, 5);
        self
    }
}

/// A cancellation or refund request filed against an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRequest {
    pub order_id: OrderId,
    pub reason: String,
    /// True when the shopper asks for money back, not just cancellation.
    #[serde(default)]
    pub refund_requested: bool,
    /// Products involved, when the request covers part of an order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<ProductKey>,
    pub created_at: DateTime<Utc>,
    /// Set by an admin once the request is handled.
    #[serde(default)]
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_clamped() {
        let review = Review {
            author: "ana".into(),
            rating: 9,
            text: "great".into(),
            created_at: Utc::now(),
        };
        assert_eq!(review.clamped().rating, 5);
    }
}

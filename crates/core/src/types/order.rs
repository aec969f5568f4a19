//! Order records written to the realtime database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::cart::CartLineItem;
use crate::types::key::ProductKey;
use crate::types::status::OrderStatus;

/// Server-assigned order identifier (the realtime database push key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Signed-in user id, when one exists. Orders are duplicated under this
    /// user's own record in the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Summary of one purchased line inside an order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(flatten)]
    pub key: ProductKey,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl From<&CartLineItem> for OrderItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            key: item.key.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// A confirmed (or partially confirmed) order.
///
/// Written once at checkout; afterwards only the status field is mutated by
/// administrative workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Absent until the database assigns a push key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    /// True when some cart lines failed stock reservation and the shopper
    /// chose to proceed with the remainder.
    #[serde(default)]
    pub partial: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from cart line items, totalling their line prices.
    #[must_use]
    pub fn from_items(items: &[CartLineItem], customer: CustomerInfo, partial: bool) -> Self {
        let total = items.iter().map(CartLineItem::line_total).sum();
        Self {
            id: None,
            customer,
            items: items.iter().map(OrderItem::from).collect(),
            total,
            status: OrderStatus::Pending,
            partial,
            created_at: Utc::now(),
        }
    }
}

//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::key::ProductKey;

/// One line of a shopper's cart.
///
/// Identity is the [`ProductKey`]; the cart store merges additions for an
/// existing key by incrementing `quantity` instead of duplicating the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product identity (category sheet + row).
    #[serde(flatten)]
    pub key: ProductKey,
    /// Display name at the time the item was added.
    pub name: String,
    /// Unit price at the time the item was added.
    pub unit_price: Decimal,
    /// Units reserved locally. Always at least 1.
    pub quantity: u32,
    /// Product image, if the sheet row carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Opaque snapshot of the sheet row as it looked when added. Carried
    /// into the order record so admins see what the shopper saw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl CartLineItem {
    /// Create a line item with quantity 1 and no snapshot.
    #[must_use]
    pub fn new(key: ProductKey, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            key,
            name: name.into(),
            unit_price,
            quantity: 1,
            image_url: None,
            raw: None,
        }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let mut item = CartLineItem::new(
            ProductKey::new("comics", "12"),
            "Issue #1",
            "3.50".parse().expect("decimal"),
        );
        item.quantity = 3;
        assert_eq!(item.line_total(), "10.50".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn test_serde_flat_shape() {
        let item = CartLineItem::new(
            ProductKey::new("comics", "12"),
            "Issue #1",
            "3.50".parse().expect("decimal"),
        );
        let json = serde_json::to_value(&item).expect("serialize");
        // The key is flattened so persisted carts stay a flat array of
        // {category, row, name, ...} objects.
        assert_eq!(json["category"], "comics");
        assert_eq!(json["row"], "12");
        assert!(json.get("image_url").is_none());
    }
}

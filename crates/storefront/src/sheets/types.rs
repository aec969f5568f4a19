//! Wire types for the spreadsheet-backed product API.
//!
//! The API is tolerant by necessity: rows arrive as numbers or strings,
//! stock lives under several column names depending on who set the sheet
//! up, and mutation responses spell the resulting stock four different
//! ways. All of that tolerance is concentrated here.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Case-insensitive column aliases for the stock count.
const STOCK_ALIASES: &[&str] = &["stock", "cantidad"];

/// Case-insensitive column aliases for the product name.
const NAME_ALIASES: &[&str] = &["nombre", "name", "producto", "title"];

/// Case-insensitive column aliases for the unit price.
const PRICE_ALIASES: &[&str] = &["precio", "price"];

/// Case-insensitive column aliases for the product image.
const IMAGE_ALIASES: &[&str] = &["imagen", "image", "img", "imageurl"];

/// One row of a category sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetRow {
    /// Row identifier. The API reports these as numbers or strings; both
    /// normalize to a string.
    #[serde(deserialize_with = "de_string_or_number")]
    pub row: String,
    /// Raw column values keyed by header name.
    #[serde(default)]
    pub data: serde_json::Map<String, Value>,
}

impl SheetRow {
    /// Extract the stock count from the first matching alias column.
    #[must_use]
    pub fn stock(&self) -> Option<u32> {
        self.field(STOCK_ALIASES).and_then(as_u32)
    }

    /// Extract the product display name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.field(NAME_ALIASES).and_then(as_string)
    }

    /// Extract the raw price cell, unparsed.
    #[must_use]
    pub fn price_raw(&self) -> Option<String> {
        self.field(PRICE_ALIASES).and_then(as_string)
    }

    /// Extract the product image URL.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        self.field(IMAGE_ALIASES).and_then(as_string)
    }

    /// First column value whose lowercased header matches an alias.
    fn field(&self, aliases: &[&str]) -> Option<&Value> {
        self.data
            .iter()
            .find(|(header, _)| aliases.contains(&header.to_lowercase().as_str()))
            .map(|(_, value)| value)
    }
}

/// Response to `GET ?sheetKey=<category>`.
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<SheetRow>,
}

/// Response to `GET ?all=1`: every category's rows in one payload.
#[derive(Debug, Deserialize)]
pub struct AllSheetsResponse {
    #[serde(default)]
    pub sheets: std::collections::HashMap<String, Vec<SheetRow>>,
}

/// Response envelope for mutation POSTs.
///
/// Deployments disagree on the field carrying the resulting stock, so
/// [`Self::stock_value`] checks every known alias.
#[derive(Debug, Default, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    /// Free-text message; inspected by the unsupported-operation heuristic.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "newStock")]
    pub new_stock: Option<Value>,
    #[serde(default)]
    pub stock: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl MutationResponse {
    /// Whether the envelope signals success. An explicit `ok` wins; absent
    /// both `ok` and `error`, a 2xx body counts as a generic ack.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        match self.ok {
            Some(ok) => ok,
            None => self.error.is_none(),
        }
    }

    /// Resulting stock, checked across field aliases in precedence order.
    #[must_use]
    pub fn stock_value(&self) -> Option<u32> {
        [&self.new_stock, &self.stock, &self.quantity]
            .into_iter()
            .flatten()
            .find_map(as_u32)
    }

    /// Every free-text field a server might stuff an explanation into.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.message
            .as_deref()
            .into_iter()
            .chain(self.error.as_deref())
    }
}

/// Coerce a JSON number or numeric string into `u32`.
fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON scalar into a non-empty string.
fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number row id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_id_accepts_numbers_and_strings() {
        let row: SheetRow = serde_json::from_value(json!({"row": 12, "data": {}})).expect("row");
        assert_eq!(row.row, "12");
        let row: SheetRow = serde_json::from_value(json!({"row": "12", "data": {}})).expect("row");
        assert_eq!(row.row, "12");
    }

    #[test]
    fn test_stock_aliases_case_insensitive() {
        for header in ["Stock", "stock", "cantidad", "Cantidad"] {
            let row: SheetRow =
                serde_json::from_value(json!({"row": 1, "data": {header: "5"}})).expect("row");
            assert_eq!(row.stock(), Some(5), "header {header}");
        }
    }

    #[test]
    fn test_stock_accepts_number_or_numeric_string() {
        let row: SheetRow =
            serde_json::from_value(json!({"row": 1, "data": {"Stock": 7}})).expect("row");
        assert_eq!(row.stock(), Some(7));
        let row: SheetRow =
            serde_json::from_value(json!({"row": 1, "data": {"Stock": "oops"}})).expect("row");
        assert_eq!(row.stock(), None);
    }

    #[test]
    fn test_mutation_stock_value_aliases() {
        for field in ["newStock", "new_stock", "stock", "quantity"] {
            let resp: MutationResponse =
                serde_json::from_value(json!({"ok": true, field: 3})).expect("envelope");
            assert_eq!(resp.stock_value(), Some(3), "field {field}");
        }
    }

    #[test]
    fn test_mutation_generic_ack_has_no_stock() {
        let resp: MutationResponse = serde_json::from_value(json!({"ok": true})).expect("envelope");
        assert!(resp.is_ok());
        assert_eq!(resp.stock_value(), None);
    }

    #[test]
    fn test_mutation_error_wins_without_ok() {
        let resp: MutationResponse =
            serde_json::from_value(json!({"error": "row not found"})).expect("envelope");
        assert!(!resp.is_ok());
    }
}

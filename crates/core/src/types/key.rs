//! Composite product key identifying a row within a category sheet.
//!
//! Products are addressed by a (category, row) pair. The canonical string
//! form is `"category::row"`, which is what the cart store persists and
//! what the realtime database uses as a map key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the category and row halves of the canonical form.
const KEY_SEPARATOR: &str = "::";

/// Errors that can occur when parsing a [`ProductKey`] from its canonical
/// string form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductKeyError {
    /// The string did not contain the `::` separator.
    #[error("missing '::' separator in product key: {0}")]
    MissingSeparator(String),

    /// One half of the key was empty.
    #[error("empty {0} in product key")]
    EmptyComponent(&'static str),
}

/// Identity of a product: its category sheet plus its row within that sheet.
///
/// Two cart line items with the same `ProductKey` are the same product and
/// are merged rather than duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    /// Category sheet key (e.g. "comics").
    pub category: String,
    /// Row identifier within the category sheet. Kept as a string because
    /// the sheets API reports rows both as numbers and as strings.
    pub row: String,
}

impl ProductKey {
    /// Create a new product key.
    #[must_use]
    pub fn new(category: impl Into<String>, row: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            row: row.into(),
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.category, self.row)
    }
}

impl FromStr for ProductKey {
    type Err = ProductKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, row) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| ProductKeyError::MissingSeparator(s.to_string()))?;
        if category.is_empty() {
            return Err(ProductKeyError::EmptyComponent("category"));
        }
        if row.is_empty() {
            return Err(ProductKeyError::EmptyComponent("row"));
        }
        Ok(Self::new(category, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let key = ProductKey::new("comics", "12");
        let parsed: ProductKey = key.to_string().parse().expect("parse canonical form");
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = "comics12".parse::<ProductKey>().unwrap_err();
        assert!(matches!(err, ProductKeyError::MissingSeparator(_)));
    }

    #[test]
    fn test_parse_rejects_empty_category() {
        let err = "::12".parse::<ProductKey>().unwrap_err();
        assert_eq!(err, ProductKeyError::EmptyComponent("category"));
    }

    #[test]
    fn test_parse_rejects_empty_row() {
        let err = "comics::".parse::<ProductKey>().unwrap_err();
        assert_eq!(err, ProductKeyError::EmptyComponent("row"));
    }

    #[test]
    fn test_row_with_separator_keeps_remainder() {
        // Only the first separator splits; the row may itself contain "::".
        let key: ProductKey = "figures::a::b".parse().expect("parse");
        assert_eq!(key.category, "figures");
        assert_eq!(key.row, "a::b");
    }
}

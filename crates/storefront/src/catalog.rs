//! In-memory product catalog.
//!
//! Read-through `moka` cache over the sheets API, one entry per category
//! (5-minute TTL by default). Reconciliation rewrites cached stock in place
//! so displayed counts follow the server without waiting for expiry.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;

use kukoro_core::{ProductKey, parse_price};

use crate::sheets::{SheetRow, SheetsClient, SheetsError};

/// Upper bound on cached categories.
const MAX_CATEGORIES: u64 = 1000;

/// A product as the storefront sees it: a sheet row with the interesting
/// columns pulled out and the rest kept as an opaque snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    #[serde(flatten)]
    pub key: ProductKey,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Raw column values as they arrived from the sheet.
    pub raw: serde_json::Value,
}

impl Product {
    /// Build a product from a sheet row. Rows with no recognizable name
    /// still render, keyed by their row id.
    #[must_use]
    pub fn from_row(category: &str, row: &SheetRow) -> Self {
        Self {
            key: ProductKey::new(category, row.row.clone()),
            name: row.name().unwrap_or_else(|| format!("#{}", row.row)),
            price: row.price_raw().as_deref().and_then(parse_price),
            stock: row.stock().unwrap_or(0),
            image_url: row.image_url(),
            raw: serde_json::Value::Object(row.data.clone()),
        }
    }
}

/// Read-through per-category product cache.
#[derive(Clone)]
pub struct Catalog {
    sheets: SheetsClient,
    cache: Cache<String, Arc<Vec<Product>>>,
}

impl Catalog {
    /// Create a catalog backed by the given client, with entries living
    /// for `ttl_secs` seconds.
    #[must_use]
    pub fn new(sheets: SheetsClient, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CATEGORIES)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { sheets, cache }
    }

    /// Prefill the cache with every category from one all-sheets read, so
    /// the first paint of the whole store serves locally. Returns the
    /// number of categories loaded.
    ///
    /// # Errors
    ///
    /// Returns an error when the all-sheets read fails; the cache keeps
    /// whatever it already held and categories load lazily instead.
    pub async fn warm(&self) -> Result<usize, SheetsError> {
        let sheets = self.sheets.fetch_all().await?;
        let count = sheets.len();
        for (category, rows) in sheets {
            let products: Arc<Vec<Product>> = Arc::new(
                rows.iter()
                    .map(|row| Product::from_row(&category, row))
                    .collect(),
            );
            self.cache.insert(category, products).await;
        }
        Ok(count)
    }

    /// All products of a category, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error when the category is not cached and the sheets API
    /// read fails.
    pub async fn category(&self, category: &str) -> Result<Arc<Vec<Product>>, SheetsError> {
        if let Some(products) = self.cache.get(category).await {
            return Ok(products);
        }
        let rows = self.sheets.fetch_products(category).await?;
        let products: Arc<Vec<Product>> = Arc::new(
            rows.iter()
                .map(|row| Product::from_row(category, row))
                .collect(),
        );
        self.cache
            .insert(category.to_string(), Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// Look up one product by key.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing category read fails.
    pub async fn product(&self, key: &ProductKey) -> Result<Option<Product>, SheetsError> {
        let products = self.category(&key.category).await?;
        Ok(products.iter().find(|p| p.key == *key).cloned())
    }

    /// Overwrite the cached stock for one product, if its category is
    /// currently cached. The next TTL refresh re-reads the server anyway.
    pub async fn apply_stock(&self, key: &ProductKey, new_stock: u32) {
        let Some(products) = self.cache.get(&key.category).await else {
            return;
        };
        let updated: Vec<Product> = products
            .iter()
            .map(|p| {
                if p.key == *key {
                    let mut p = p.clone();
                    p.stock = new_stock;
                    p
                } else {
                    p.clone()
                }
            })
            .collect();
        self.cache
            .insert(key.category.clone(), Arc::new(updated))
            .await;
    }

    /// Drop a category so the next read resynchronizes from the server.
    pub async fn invalidate(&self, category: &str) {
        self.cache.invalidate(category).await;
    }
}

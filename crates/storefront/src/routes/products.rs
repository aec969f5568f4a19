//! Product route handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use kukoro_core::ProductKey;

use crate::catalog::Product;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// A product as rendered to the UI layer: the catalog entry plus the
/// availability derived from local reservations.
#[derive(Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// `max(0, server_stock - reserved_in_cart)`; what the shopper may
    /// still add.
    pub available: u32,
}

impl ProductView {
    fn new(state: &AppState, product: Product) -> Self {
        let reserved = state.cart().reserved(&product.key);
        Self {
            available: product.stock.saturating_sub(reserved),
            product,
        }
    }
}

/// List a category's products with derived availability.
pub async fn list(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.catalog().category(&category).await?;
    let views = products
        .iter()
        .map(|p| ProductView::new(&state, p.clone()))
        .collect();
    Ok(Json(views))
}

/// Show one product.
pub async fn show(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
) -> Result<Json<ProductView>> {
    let key = ProductKey::new(category, row);
    let product = state
        .catalog()
        .product(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {key}")))?;
    Ok(Json(ProductView::new(&state, product)))
}

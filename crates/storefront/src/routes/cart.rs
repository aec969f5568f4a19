//! Cart route handlers.
//!
//! Additions and quantity changes are bounded by availability: the server
//! stock minus what the cart already reserves. Exceeding it answers 409.

use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kukoro_core::{CartLineItem, ProductKey};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST /cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub category: String,
    pub row: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Body of `PATCH /cart/items/{category}/{row}`.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

/// Cart contents as rendered to the UI layer.
#[derive(Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total: Decimal,
}

impl CartView {
    fn current(state: &AppState) -> Self {
        let items = state.cart().items();
        let total = items.iter().map(CartLineItem::line_total).sum();
        Self { items, total }
    }
}

/// Show the cart.
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::current(&state))
}

/// Add a product to the cart, merging with an existing line.
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    if body.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }
    let key = ProductKey::new(body.category, body.row);
    let product = state
        .catalog()
        .product(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {key}")))?;
    let unit_price = product
        .price
        .ok_or_else(|| AppError::BadRequest(format!("product {key} has no parseable price")))?;

    let available = product.stock.saturating_sub(state.cart().reserved(&key));
    if body.quantity > available {
        return Err(AppError::InsufficientStock(format!(
            "requested {} of {key}, only {available} available",
            body.quantity
        )));
    }

    let mut item = CartLineItem::new(key, product.name, unit_price);
    item.quantity = body.quantity;
    item.image_url = product.image_url;
    item.raw = Some(product.raw);
    state.cart().add(item);

    Ok(Json(CartView::current(&state)))
}

/// Set the quantity of one line (zero removes it).
pub async fn set_quantity(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
    Json(body): Json<SetQuantityRequest>,
) -> Result<Json<CartView>> {
    let key = ProductKey::new(category, row);

    if body.quantity > 0 {
        let product = state
            .catalog()
            .product(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {key}")))?;
        if body.quantity > product.stock {
            return Err(AppError::InsufficientStock(format!(
                "requested {} of {key}, only {} in stock",
                body.quantity, product.stock
            )));
        }
    }

    if !state.cart().set_quantity(&key, body.quantity) {
        return Err(AppError::NotFound(format!("cart line {key}")));
    }
    Ok(Json(CartView::current(&state)))
}

/// Remove one line from the cart.
pub async fn remove(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
) -> Result<Json<CartView>> {
    let key = ProductKey::new(category, row);
    if !state.cart().remove(&key) {
        return Err(AppError::NotFound(format!("cart line {key}")));
    }
    Ok(Json(CartView::current(&state)))
}

/// Empty the cart.
pub async fn clear(State(state): State<AppState>) -> Json<CartView> {
    state.cart().clear();
    Json(CartView::current(&state))
}

//! Order management handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use kukoro_core::{Order, OrderStatus};

use crate::error::Result;
use crate::state::AppState;

/// Filters for the order listing.
#[derive(Debug, Deserialize, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

/// Body of `PATCH /orders/{order_id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

/// List orders, optionally filtered by status.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<BTreeMap<String, Order>>> {
    let mut orders = state.rtdb().list_orders().await?;
    if let Some(status) = filter.status {
        orders.retain(|_, order| order.status == status);
    }
    Ok(Json(orders))
}

/// Show one order.
pub async fn show(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    Ok(Json(state.rtdb().get_order(&order_id).await?))
}

/// Transition an order's status.
pub async fn set_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>> {
    let order = state.rtdb().set_order_status(&order_id, body.status).await?;
    Ok(Json(order))
}

//! Checkout and cancellation route handlers.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use kukoro_core::{CancellationRequest, CustomerInfo, OrderId};

use crate::checkout::{CheckoutSummary, PartialResolution};
use crate::error::Result;
use crate::state::AppState;

/// Body of `POST /checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    /// The shopper's choice should only part of the cart reserve stock.
    #[serde(default)]
    pub on_partial: PartialResolution,
}

/// Check out the current cart.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSummary>> {
    let summary = state
        .checkout()
        .checkout(body.customer, body.on_partial)
        .await?;
    Ok(Json(summary))
}

/// Body of `POST /orders/{order_id}/cancellation`.
#[derive(Debug, Deserialize)]
pub struct CancellationBody {
    pub reason: String,
    #[serde(default)]
    pub refund_requested: bool,
}

/// Response carrying the pushed request's key.
#[derive(Serialize)]
pub struct CancellationCreated {
    pub id: String,
}

/// File a cancellation/refund request against an order.
pub async fn cancel(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<CancellationBody>,
) -> Result<Json<CancellationCreated>> {
    let request = CancellationRequest {
        order_id: OrderId::new(order_id),
        reason: body.reason,
        refund_requested: body.refund_requested,
        keys: Vec::new(),
        created_at: Utc::now(),
        resolved: false,
    };
    let id = state.rtdb().push_cancellation(&request).await?;
    Ok(Json(CancellationCreated { id }))
}

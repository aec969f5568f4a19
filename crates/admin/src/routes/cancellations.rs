//! Cancellation/refund request handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};

use kukoro_core::CancellationRequest;

use crate::error::Result;
use crate::state::AppState;

/// List all cancellation/refund requests.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, CancellationRequest>>> {
    Ok(Json(state.rtdb().list_cancellations().await?))
}

/// Mark one request handled.
pub async fn resolve(State(state): State<AppState>, Path(request_id): Path<String>) -> Result<()> {
    state.rtdb().resolve_cancellation(&request_id).await?;
    Ok(())
}

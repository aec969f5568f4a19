//! Product CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use kukoro_core::ProductKey;

use crate::error::Result;
use crate::sheets::AdminRow;
use crate::state::AppState;

/// Body of `POST .../products` and `PUT .../products/{row}`: raw column
/// values keyed by sheet header.
#[derive(Debug, Deserialize)]
pub struct RowData {
    pub data: serde_json::Map<String, Value>,
}

/// Body of `PUT .../stock`.
#[derive(Debug, Deserialize)]
pub struct StockBody {
    pub value: u32,
}

/// Response to an `add`.
#[derive(Serialize)]
pub struct RowCreated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<String>,
}

/// List a category's rows, raw.
pub async fn list(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<AdminRow>>> {
    Ok(Json(state.sheets().list(&category).await?))
}

/// Append a product row.
pub async fn add(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(body): Json<RowData>,
) -> Result<Json<RowCreated>> {
    let row = state.sheets().add(&category, body.data).await?;
    Ok(Json(RowCreated { row }))
}

/// Overwrite a product row.
pub async fn update(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
    Json(body): Json<RowData>,
) -> Result<()> {
    let key = ProductKey::new(category, row);
    state.sheets().update(&key, body.data).await?;
    Ok(())
}

/// Delete a product row.
pub async fn remove(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
) -> Result<()> {
    let key = ProductKey::new(category, row);
    state.sheets().delete(&key).await?;
    Ok(())
}

/// Correct a product's stock to an absolute value.
pub async fn set_stock(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
    Json(body): Json<StockBody>,
) -> Result<()> {
    let key = ProductKey::new(category, row);
    state.sheets().set_stock(&key, body.value).await?;
    Ok(())
}

//! Review moderation handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};

use kukoro_core::{ProductKey, Review};

use crate::error::Result;
use crate::state::AppState;

/// List one product's reviews.
pub async fn list(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
) -> Result<Json<BTreeMap<String, Review>>> {
    let key = ProductKey::new(category, row);
    Ok(Json(state.rtdb().list_reviews(&key).await?))
}

/// Delete one review.
pub async fn remove(
    State(state): State<AppState>,
    Path((category, row, review_id)): Path<(String, String, String)>,
) -> Result<()> {
    let key = ProductKey::new(category, row);
    state.rtdb().delete_review(&key, &review_id).await?;
    Ok(())
}

//! Review route handlers.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use kukoro_core::{ProductKey, Review};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST /categories/{category}/products/{row}/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub author: String,
    pub rating: u8,
    pub text: String,
}

/// Response carrying the pushed review's key.
#[derive(Serialize)]
pub struct ReviewCreated {
    pub id: String,
}

/// Push a review for one product.
pub async fn create(
    State(state): State<AppState>,
    Path((category, row)): Path<(String, String)>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<ReviewCreated>> {
    let key = ProductKey::new(category, row);
    if state.catalog().product(&key).await?.is_none() {
        return Err(AppError::NotFound(format!("product {key}")));
    }

    let review = Review {
        author: body.author,
        rating: body.rating,
        text: body.text,
        created_at: Utc::now(),
    }
    .clamped();
    let id = state.rtdb().push_review(&key, &review).await?;
    Ok(Json(ReviewCreated { id }))
}

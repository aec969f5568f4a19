//! Administrative realtime-database operations.
//!
//! Orders, reviews, and cancellation requests live in the realtime
//! database; this client reads whole collections and applies the targeted
//! updates admins perform: status transitions, review deletion, and
//! cancellation resolution. Status changes are mirrored into the owning
//! user's denormalized copy so account pages stay consistent.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use kukoro_core::{CancellationRequest, Order, OrderStatus, ProductKey, Review};

/// Errors that can occur during admin database operations.
#[derive(Debug, Error)]
pub enum RtdbAdminError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Database returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status transition not allowed from the order's current state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Admin client for the realtime document database.
#[derive(Clone)]
pub struct RtdbAdminClient {
    client: reqwest::Client,
    base_url: Url,
    auth: Option<SecretString>,
}

impl RtdbAdminClient {
    /// Create a new admin database client.
    #[must_use]
    pub fn new(base_url: Url, auth: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            auth,
        }
    }

    /// All orders in the master collection, keyed by push id.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails or the body is unparseable.
    pub async fn list_orders(&self) -> Result<BTreeMap<String, Order>, RtdbAdminError> {
        self.get_collection("orders").await
    }

    /// One order by id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record does not exist; otherwise transport or
    /// parse errors.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, RtdbAdminError> {
        let order: Option<Order> = self.get(&format!("orders/{order_id}")).await?;
        order.ok_or_else(|| RtdbAdminError::NotFound(format!("order {order_id}")))
    }

    /// Transition an order's status, validating against the lifecycle and
    /// mirroring the change into the owning user's copy when one exists.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing order, `InvalidTransition` when the
    /// lifecycle forbids the change, and transport errors otherwise.
    #[instrument(skip(self))]
    pub async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, RtdbAdminError> {
        let mut order = self.get_order(order_id).await?;
        if !order.status.can_transition_to(status) {
            return Err(RtdbAdminError::InvalidTransition(format!(
                "{:?} -> {status:?}",
                order.status
            )));
        }

        self.patch(&format!("orders/{order_id}"), &json!({"status": status}))
            .await?;
        if let Some(user_id) = &order.customer.user_id {
            // The user copy is denormalized; a failed mirror is logged but
            // does not undo the master update.
            if let Err(err) = self
                .patch(
                    &format!("users/{user_id}/orders/{order_id}"),
                    &json!({"status": status}),
                )
                .await
            {
                warn!(order_id, user_id, error = %err, "user order copy not mirrored");
            }
        }

        info!(order_id, ?status, "order status updated");
        order.status = status;
        Ok(order)
    }

    /// All reviews for one product, keyed by push id.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails or the body is unparseable.
    pub async fn list_reviews(
        &self,
        key: &ProductKey,
    ) -> Result<BTreeMap<String, Review>, RtdbAdminError> {
        self.get_collection(&format!("reviews/{}/{}", key.category, key.row))
            .await
    }

    /// Delete one review (moderation).
    ///
    /// # Errors
    ///
    /// Returns an error when the delete fails.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete_review(
        &self,
        key: &ProductKey,
        review_id: &str,
    ) -> Result<(), RtdbAdminError> {
        self.delete(&format!("reviews/{}/{}/{review_id}", key.category, key.row))
            .await?;
        info!(review_id, "review deleted");
        Ok(())
    }

    /// All cancellation/refund requests, keyed by push id.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails or the body is unparseable.
    pub async fn list_cancellations(
        &self,
    ) -> Result<BTreeMap<String, CancellationRequest>, RtdbAdminError> {
        self.get_collection("cancellations").await
    }

    /// Mark a cancellation request handled.
    ///
    /// # Errors
    ///
    /// Returns an error when the update fails.
    #[instrument(skip(self))]
    pub async fn resolve_cancellation(&self, request_id: &str) -> Result<(), RtdbAdminError> {
        self.patch(
            &format!("cancellations/{request_id}"),
            &json!({"resolved": true}),
        )
        .await?;
        info!(request_id, "cancellation resolved");
        Ok(())
    }

    /// `GET` a whole collection; the database answers `null` for an empty
    /// path, which maps to an empty map.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<BTreeMap<String, T>, RtdbAdminError> {
        let value: Option<BTreeMap<String, T>> = self.get(path).await?;
        Ok(value.unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RtdbAdminError> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RtdbAdminError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }
        if text.trim() == "null" {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| RtdbAdminError::Parse(e.to_string()))
    }

    async fn patch<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), RtdbAdminError> {
        let response = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await?;
        self.check(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), RtdbAdminError> {
        let response = self.client.delete(self.url(path)).send().await?;
        self.check(response).await
    }

    async fn check(&self, response: reqwest::Response) -> Result<(), RtdbAdminError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RtdbAdminError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }
        Ok(())
    }

    /// Build `{base}/{path}.json`, appending the auth token when present.
    fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let trimmed = path.trim_matches('/');
            let base_path = url.path().trim_end_matches('/').to_string();
            url.set_path(&format!("{base_path}/{trimmed}.json"));
        }
        if let Some(auth) = &self.auth {
            url.query_pairs_mut()
                .append_pair("auth", auth.expose_secret());
        }
        url
    }
}

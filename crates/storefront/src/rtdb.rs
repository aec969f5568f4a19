//! Realtime document database client.
//!
//! Firebase-style REST interface: `POST {path}.json` pushes a record and
//! answers with a server-assigned key under `name`; `PUT` writes a record
//! at an exact path. Orders land under `/orders` and, for signed-in
//! shoppers, are duplicated under `/users/{uid}/orders` so the account page
//! can subscribe to its own subtree.
//!
//! Write failures surface as errors and are not retried here; the retry
//! policy, if any, belongs to the caller.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use kukoro_core::{CancellationRequest, Order, OrderId, ProductKey, Review};

/// Errors that can occur when talking to the realtime database.
#[derive(Debug, Error)]
pub enum RtdbError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Database returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Response to a push (`POST`): the server-assigned child key.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Client for the realtime document database.
#[derive(Clone)]
pub struct RtdbClient {
    client: reqwest::Client,
    base_url: Url,
    auth: Option<SecretString>,
}

impl RtdbClient {
    /// Create a new realtime database client.
    #[must_use]
    pub fn new(base_url: Url, auth: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            auth,
        }
    }

    /// Write a confirmed order under the master collection and, when the
    /// customer is signed in, duplicate it under that user's record.
    ///
    /// # Errors
    ///
    /// Returns an error when the master write fails or its response is
    /// unparseable. A failed user-copy write also errors; the master record
    /// already exists at that point, which the caller may tolerate.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &Order) -> Result<OrderId, RtdbError> {
        let pushed: PushResponse = self.push("orders", order).await?;
        let id = OrderId::new(pushed.name);
        debug!(order_id = %id, "order written");

        if let Some(user_id) = &order.customer.user_id {
            let mut copy = order.clone();
            copy.id = Some(id.clone());
            self.put(&format!("users/{user_id}/orders/{id}"), &copy)
                .await?;
        }
        Ok(id)
    }

    /// Push a shopper review for one product.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    pub async fn push_review(&self, key: &ProductKey, review: &Review) -> Result<String, RtdbError> {
        let pushed: PushResponse = self
            .push(&format!("reviews/{}/{}", key.category, key.row), review)
            .await?;
        Ok(pushed.name)
    }

    /// Push a cancellation/refund request.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    pub async fn push_cancellation(
        &self,
        request: &CancellationRequest,
    ) -> Result<String, RtdbError> {
        let pushed: PushResponse = self.push("cancellations", request).await?;
        Ok(pushed.name)
    }

    /// `POST` a record under `path`, returning the parsed response.
    async fn push<B, T>(&self, path: &str, body: &B) -> Result<T, RtdbError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RtdbError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }
        serde_json::from_str(&text).map_err(|e| RtdbError::Parse(e.to_string()))
    }

    /// `PUT` a record at an exact `path`.
    async fn put<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), RtdbError> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RtdbError::Api {
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

//! Authorized HTTP client.
//!
//! Every outbound request is augmented with `Authorization: Bearer <token>`,
//! the token re-read from persistent storage at call time so a credential
//! change takes effect on the very next request. A 401 from any endpoint
//! purges the stored session and publishes [`SessionEvent::Invalidated`];
//! the hosting application decides what "redirect to login" means for it.
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::api::types::{Envelope, ErrorBody};
use crate::config::Config;
use crate::storage::{KeyValueStore, SESSION_KEY};

/// Buffered capacity of the session event channel. Invalidation is rare;
/// a small buffer only has to absorb bursts while the subscriber is busy.
const EVENT_CHANNEL_CAPACITY: usize = 8;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The credential was rejected. The stored session has already been
    /// purged and `SessionEvent::Invalidated` published by the time the
    /// caller sees this.
    #[error("Authorization rejected (401): session invalidated")]
    Unauthorized,

    /// Any other non-success status, message taken from the backend's error
    /// body when present. Passed through unmodified for the presentation
    /// layer to handle.
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

// ============================================================================
// Session Events
// ============================================================================

/// Published by the client when the backend declares the session void.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credential rejected with 401; stored session already purged.
    Invalidated,
}

// ============================================================================
// ApiClient
// ============================================================================

/// Shared HTTP client for all endpoint groups (identity, user, news).
///
/// Endpoint methods live in `auth.rs`, `user.rs`, and `news.rs`; they all
/// funnel through [`ApiClient::execute`] so authorization augmentation and
/// 401 handling exist in exactly one place.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    storage: Arc<dyn KeyValueStore>,
    events: mpsc::Sender<SessionEvent>,
}

impl ApiClient {
    /// Build a client from config. Returns the receiving half of the
    /// session event channel for the hosting application to subscribe to.
    pub fn new(
        config: &Config,
        storage: Arc<dyn KeyValueStore>,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let client = Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            storage,
            events,
        };
        (client, rx)
    }

    /// Current bearer credential, read from storage at call time. Never
    /// cached on the client: the stored session is the single source of
    /// truth for what credential the next request carries.
    fn current_token(&self) -> Option<SecretString> {
        let raw = self.storage.get(SESSION_KEY)?;
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Stored session is malformed, sending unauthenticated request");
                return None;
            }
        };
        value
            .get("token")
            .and_then(serde_json::Value::as_str)
            .map(|token| SecretString::from(token.to_string()))
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.put(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Send a request and decode the enveloped response.
    ///
    /// All endpoint methods go through here. Behavior by status:
    /// - 2xx → decode `Envelope<T>`
    /// - 401 → purge stored session, publish `Invalidated`, `Unauthorized`
    /// - anything else → `Status` with the backend's message when the body
    ///   carries one
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let mut request = request;
        if let Some(token) = self.current_token() {
            request = request.header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            );
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ApiError::Timeout)?
            .map_err(ApiError::Network)?;

        let status = response.status();
        if status.as_u16() == 401 {
            self.invalidate_session();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            // Best-effort extraction of the backend's error message
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Purge the persisted session and tell subscribers it is void.
    /// No retry is attempted here; the caller's request simply fails with
    /// `Unauthorized` and the next flow starts from the login view.
    fn invalidate_session(&self) {
        tracing::info!("Credential rejected by backend, purging stored session");
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "Failed to purge stored session");
        }
        if self.events.try_send(SessionEvent::Invalidated).is_err() {
            tracing::debug!("No subscriber for session events, invalidation dropped");
        }
    }
}

/// Mask storage/channel internals; the base URL is the only useful field.
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Web-push delivery client
//!
//! VAPID-authorized POST to the subscription endpoint. The payload and the
//! subscription's encryption keys are opaque to this layer and passed
//! through untouched; the only status this system acts on is the terminal
//! 404/410 "endpoint gone" signal.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::PushConfig,
    error::{AppError, AppResult},
    models::PushSubscription,
};

/// Delivery failure, split into the terminal "endpoint gone" signal and
/// everything else.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("subscription endpoint gone")]
    Gone,

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Push delivery interface
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PushDelivery: Send + Sync {
    /// Attempt one delivery to one subscription.
    async fn send(&self, subscription: &PushSubscription, payload: &str) -> Result<(), PushError>;
}

#[derive(Serialize)]
struct VapidClaims {
    aud: String,
    exp: i64,
    sub: String,
}

/// VAPID-signing web-push client
pub struct WebPushClient {
    http: reqwest::Client,
    signing_key: EncodingKey,
    public_key: String,
    subject: String,
    ttl: u32,
}

impl WebPushClient {
    /// Build the client from configuration. Returns `None` when the signing
    /// credential pair is absent; an invalid private key is a configuration
    /// error. Resolved once at startup, never per call.
    pub fn from_config(config: &PushConfig) -> AppResult<Option<Self>> {
        let (public_key, private_key) = match (&config.vapid_public_key, &config.vapid_private_key)
        {
            (Some(public), Some(private)) => (public.clone(), private.clone()),
            _ => return Ok(None),
        };

        let signing_key = EncodingKey::from_ec_pem(private_key.as_bytes())
            .map_err(|e| AppError::Configuration(format!("Invalid VAPID private key: {}", e)))?;

        Ok(Some(Self {
            http: reqwest::Client::new(),
            signing_key,
            public_key,
            subject: config.vapid_subject.clone(),
            ttl: config.ttl_seconds,
        }))
    }

    /// Build the `Authorization: vapid` header for one endpoint origin.
    fn vapid_auth(&self, endpoint: &reqwest::Url) -> Result<String, PushError> {
        let mut aud = format!(
            "{}://{}",
            endpoint.scheme(),
            endpoint.host_str().unwrap_or_default()
        );
        if let Some(port) = endpoint.port() {
            aud.push_str(&format!(":{}", port));
        }

        let claims = VapidClaims {
            aud,
            exp: (Utc::now() + chrono::Duration::hours(12)).timestamp(),
            sub: self.subject.clone(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, &self.signing_key)
            .map_err(|e| PushError::Delivery(format!("VAPID signing failed: {}", e)))?;

        Ok(format!("vapid t={}, k={}", token, self.public_key))
    }
}

#[async_trait::async_trait]
impl PushDelivery for WebPushClient {
    async fn send(&self, subscription: &PushSubscription, payload: &str) -> Result<(), PushError> {
        let endpoint = reqwest::Url::parse(&subscription.endpoint)
            .map_err(|e| PushError::Delivery(format!("Invalid endpoint URL: {}", e)))?;
        let authorization = self.vapid_auth(&endpoint)?;

        let response = self
            .http
            .post(endpoint)
            .header("Authorization", authorization)
            .header("TTL", self.ttl.to_string())
            .header("Urgency", "normal")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| PushError::Delivery(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::GONE | reqwest::StatusCode::NOT_FOUND => Err(PushError::Gone),
            status => Err(PushError::Delivery(format!(
                "push service returned {}",
                status
            ))),
        }
    }
}

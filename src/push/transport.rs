//! Push transport for NewsPulse.
//!
//! [`PushTransport`] delivers a payload to one subscription. The Web Push
//! implementation encrypts the payload for the subscription keys
//! (`aes128gcm`) and POSTs it to the subscription endpoint, signing the
//! request with VAPID when keys are configured.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use p256::{PublicKey, SecretKey};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::crypto::{self, decode_base64url};
use super::types::{PushPayload, PushSubscription};
use crate::config::PushConfig;
use crate::{NewsPulseError, Result};

/// Lifetime of a VAPID token in seconds (12 hours).
const VAPID_TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

/// Longest response body kept in a rejection, in bytes.
const MAX_REJECTION_BODY: usize = 512;

/// Why a push could not be delivered.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The push service answered with a non-success status.
    #[error("push service returned HTTP {status}")]
    Rejected { status: u16, body: String },

    /// The push service could not be reached.
    #[error("push request failed: {0}")]
    Network(String),

    /// The request could not be built, encrypted or signed.
    #[error("push request could not be prepared: {0}")]
    Prepare(String),
}

impl TransportError {
    /// Whether the endpoint is gone for good (HTTP 404 or 410).
    pub fn is_permanent(&self) -> bool {
        matches!(self, TransportError::Rejected { status: 404 | 410, .. })
    }
}

/// Delivers notification payloads to push subscriptions.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send `payload` to `subscription`.
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> std::result::Result<(), TransportError>;
}

/// VAPID JWT claims.
#[derive(Debug, Serialize, Deserialize)]
struct VapidClaims {
    aud: String,
    exp: i64,
    sub: String,
}

struct VapidSigner {
    key: EncodingKey,
    public_key: String,
    subject: String,
}

fn config_error(message: impl Into<String>) -> NewsPulseError {
    NewsPulseError::Config(message.into())
}

impl VapidSigner {
    /// Build a signer from the configured key pair.
    ///
    /// The public key is the uncompressed P-256 point in base64url. The
    /// private key is either the raw 32-byte scalar in base64url, as printed
    /// by common VAPID key generators, or a PEM document.
    fn from_config(config: &PushConfig) -> Result<Self> {
        let public = decode_base64url(&config.vapid_public_key)
            .ok()
            .and_then(|bytes| PublicKey::from_sec1_bytes(&bytes).ok())
            .ok_or_else(|| config_error("invalid VAPID public key: not a P-256 point"))?;

        let private = config.vapid_private_key.trim();
        let key = if private.starts_with("-----BEGIN") {
            EncodingKey::from_ec_pem(private.as_bytes())
                .map_err(|e| config_error(format!("invalid VAPID private key: {}", e)))?
        } else {
            let secret = decode_base64url(private)
                .ok()
                .and_then(|bytes| SecretKey::from_slice(&bytes).ok())
                .ok_or_else(|| {
                    config_error("invalid VAPID private key: expected base64url or PEM P-256 key")
                })?;

            if secret.public_key() != public {
                return Err(config_error("VAPID public key does not match the private key"));
            }

            let der = secret
                .to_pkcs8_der()
                .map_err(|e| config_error(format!("failed to encode VAPID private key: {}", e)))?;
            EncodingKey::from_ec_der(der.as_bytes())
        };

        Ok(Self {
            key,
            public_key: URL_SAFE_NO_PAD.encode(public.to_encoded_point(false).as_bytes()),
            subject: config.subject.clone(),
        })
    }

    fn authorization(&self, endpoint: &str) -> std::result::Result<String, TransportError> {
        let url = Url::parse(endpoint)
            .map_err(|e| TransportError::Prepare(format!("invalid endpoint: {}", e)))?;

        let claims = VapidClaims {
            aud: url.origin().ascii_serialization(),
            exp: Utc::now().timestamp() + VAPID_TOKEN_TTL_SECS,
            sub: self.subject.clone(),
        };

        let token = encode(&Header::new(Algorithm::ES256), &claims, &self.key)
            .map_err(|e| TransportError::Prepare(format!("failed to sign VAPID token: {}", e)))?;

        Ok(format!("vapid t={}, k={}", token, self.public_key))
    }
}

/// Web Push transport over HTTP.
pub struct WebPushTransport {
    client: Client,
    ttl_secs: u64,
    vapid: Option<VapidSigner>,
}

impl WebPushTransport {
    /// Create a transport from the push configuration.
    ///
    /// Fails if VAPID keys are configured but are not a valid P-256 pair.
    pub fn from_config(config: &PushConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .build()
            .map_err(|e| config_error(format!("failed to create HTTP client: {}", e)))?;

        let vapid = if config.has_vapid_keys() {
            Some(VapidSigner::from_config(config)?)
        } else {
            None
        };

        Ok(Self {
            client,
            ttl_secs: config.ttl_secs,
            vapid,
        })
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> std::result::Result<(), TransportError> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| TransportError::Prepare(format!("failed to encode payload: {}", e)))?;

        let body = crypto::encrypt(&subscription.keys.p256dh, &subscription.keys.auth, &plaintext)
            .map_err(|e| TransportError::Prepare(e.to_string()))?;

        let mut request = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", self.ttl_secs.to_string())
            .header(header::CONTENT_ENCODING, "aes128gcm")
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(body);

        if let Some(vapid) = &self.vapid {
            request = request.header(header::AUTHORIZATION, vapid.authorization(&subscription.endpoint)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Push delivered");
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_REJECTION_BODY {
            let mut end = MAX_REJECTION_BODY;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }

        Err(TransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

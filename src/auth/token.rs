//! Bearer Token Service
//! Mission: Issue and validate HMAC-SHA256 signed, time-limited credentials
//!
//! Wire format:
//! `b64url(header) "." b64url(payload) "." b64url(HMAC-SHA256(secret, first two segments))`
//! with the URL-safe alphabet and padding stripped. The service is stateless;
//! the keyed MAC is built once and cloned per call.

use crate::auth::models::{Claims, RESERVED_CLAIMS};
use anyhow::{bail, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Default credential lifetime (24h)
pub const DEFAULT_TTL_SECS: i64 = 86_400;

const TOKEN_TYPE: &str = "JWT";
const ALGORITHM: &str = "HS256";

/// Token failures. All are terminal: the client has to log in again.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("failed to serialize token segment: {0}")]
    Serialization(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    #[serde(default)]
    typ: Option<String>,
    alg: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            typ: Some(TOKEN_TYPE.to_string()),
            alg: ALGORITHM.to_string(),
        }
    }
}

/// Issues and validates signed bearer credentials
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service keyed by `secret`
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            bail!("token signing secret must not be empty");
        }

        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| anyhow::anyhow!("HMAC key error: {}", e))?;

        Ok(Self {
            mac,
            ttl_secs: DEFAULT_TTL_SECS,
        })
    }

    /// Override the default lifetime of issued tokens
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for already-authenticated claims using the default TTL
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        self.issue_at(claims, self.ttl_secs, Utc::now().timestamp())
    }

    /// Issue a token with an explicit TTL and clock value.
    ///
    /// `issued_at` / `expires_at` supplied by the caller are overwritten.
    /// Extra claims reusing a reserved wire name are dropped so each key is
    /// written once.
    pub fn issue_at(&self, claims: &Claims, ttl_secs: i64, now: i64) -> Result<String, TokenError> {
        let mut payload = claims.clone();
        payload
            .extra
            .retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));
        payload.issued_at = Some(now);
        payload.expires_at = Some(now.saturating_add(ttl_secs));

        let header = encode_segment(&TokenHeader::default())?;
        let payload = encode_segment(&payload)?;
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&header, &payload));

        debug!(
            subject_id = claims.subject_id,
            ttl_secs, "Issued bearer token"
        );

        Ok(format!("{}.{}.{}", header, payload, signature))
    }

    /// Validate a token against the current time
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token against an explicit clock value
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::MalformedToken);
        };

        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::BadSignature)?;

        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| TokenError::BadSignature)?;

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::MalformedToken);
        }

        let claims: Claims = decode_segment(payload)?;

        if let Some(expires_at) = claims.expires_at {
            if now > expires_at {
                return Err(TokenError::TokenExpired);
            }
        }

        debug!(subject_id = claims.subject_id, "Validated bearer token");

        Ok(claims)
    }

    fn sign(&self, header: &str, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::Serialization(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)
}

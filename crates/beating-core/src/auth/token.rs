//! Bearer credential codec.
//!
//! The backend issues JWT-shaped tokens; the client only reads the payload
//! segment and never verifies the signature. Any anomaly collapses to
//! "treat the credential as absent" at the call site — the taxonomy here
//! exists so callers can log the distinct causes.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;
use thiserror::Error;

/// Why a stored credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Structurally invalid token (segment count, base64, JSON, claims).
    #[error("malformed credential: {0}")]
    Malformed(&'static str),
    /// Well-formed token whose expiry is at or before now.
    #[error("credential expired at {expires_ms}ms (now {now_ms}ms)")]
    Expired { expires_ms: u64, now_ms: u64 },
}

/// Claims the client consumes from a credential payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier (`user_id`), normalized to a string.
    pub id: String,
    /// Display handle (`username`).
    pub handle: String,
    /// Email, when the backend embeds one. Nothing gates on it.
    pub email: Option<String>,
    /// Expiry instant in milliseconds since epoch (`exp` is in seconds).
    pub expires_ms: u64,
}

impl Claims {
    /// Fails with [`CredentialError::Expired`] unless the expiry is
    /// strictly in the future. Equal-to-now counts as expired.
    pub fn validate(self, now_ms: u64) -> Result<Self, CredentialError> {
        if self.expires_ms > now_ms {
            Ok(self)
        } else {
            Err(CredentialError::Expired {
                expires_ms: self.expires_ms,
                now_ms,
            })
        }
    }
}

/// Current wall-clock time in milliseconds since epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// Decodes a bearer token into [`Claims`] without checking expiry.
///
/// Splits on `'.'` (exactly three segments), base64url-decodes the middle
/// segment (padding tolerated), parses it as JSON and extracts the claims.
///
/// # Errors
/// Returns [`CredentialError::Malformed`] naming the first anomaly found.
pub fn decode(token: &str) -> Result<Claims, CredentialError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::Malformed(
            "expected three dot-separated segments",
        ));
    }

    let payload = segments[1].trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| CredentialError::Malformed("payload segment is not base64url"))?;
    let claims: Value = serde_json::from_slice(&decoded)
        .map_err(|_| CredentialError::Malformed("payload is not valid JSON"))?;

    let expires_ms = claims
        .get("exp")
        .and_then(Value::as_u64)
        .ok_or(CredentialError::Malformed("missing or non-numeric exp claim"))?
        .saturating_mul(1000);

    // The backend stores integer ids but some issuers stringify them.
    let id = match claims.get("user_id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(CredentialError::Malformed("missing user_id claim")),
    };

    let handle = claims
        .get("username")
        .and_then(Value::as_str)
        .ok_or(CredentialError::Malformed("missing username claim"))?
        .to_string();

    let email = claims
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Claims {
        id,
        handle,
        email,
        expires_ms,
    })
}

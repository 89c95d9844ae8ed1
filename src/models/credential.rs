//! Identity and credential models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Normalized phone-number identity.
///
/// The digits-only form of whatever the messaging transport sends
/// (`whatsapp:+15551234567` and `+1 555 123 4567` both normalize to
/// `15551234567`). Used as the sole credential lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize a raw sender field into a digits-only identity.
    ///
    /// Returns `None` when no digits remain (unusable sender).
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            None
        } else {
            Some(Self(digits))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delegated-access credential for one phone number.
///
/// Serialized as a JSON blob in the credential store; the store never
/// interprets the contents. Exactly one of three states at any instant:
/// fresh (not expired), stale (expired, refresh token present), or
/// unrefreshable (expired, no refresh token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token for Google API calls
    pub access_token: String,
    /// Refresh token; Google only issues one on the initial consent
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
    /// Granted OAuth scopes
    pub scopes: Vec<String>,
}

impl Credential {
    /// Whether the access token has expired as of `now`.
    ///
    /// Expiry is judged against the credential's own timestamp only.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Parse a stored blob. Anything malformed fails closed as
    /// `CorruptCredential`; stored text is never interpreted beyond
    /// structured JSON.
    pub fn from_blob(blob: &str) -> Result<Self, AppError> {
        serde_json::from_str(blob).map_err(|_| AppError::CorruptCredential)
    }

    /// Serialize for storage.
    pub fn to_blob(&self) -> Result<String, AppError> {
        serde_json::to_string(self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Credential serialization: {}", e)))
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client for the delegation handshake.
//!
//! Handles:
//! - Authorization-URL construction with a signed state parameter
//! - Authorization-code exchange
//! - Refresh-grant exchange for expired access tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::GOOGLE_SCOPES;
use crate::error::AppError;
use crate::models::PhoneNumber;

type HmacSha256 = Hmac<Sha256>;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// One bounded round-trip per remote call; no retry layer on top.
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Token response from Google's token endpoint.
///
/// `refresh_token` is only present on the initial consent exchange;
/// refresh-grant responses normally omit it.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    /// Space-delimited granted scopes
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Granted scopes as a list, falling back to the requested set when
    /// Google omits the field.
    pub fn scopes(&self) -> Vec<String> {
        match &self.scope {
            Some(s) if !s.trim().is_empty() => {
                s.split_whitespace().map(|s| s.to_string()).collect()
            }
            _ => GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleAuthClient {
    http: reqwest::Client,
    auth_endpoint: String,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    state_key: Vec<u8>,
}

impl GoogleAuthClient {
    /// Create a new OAuth client.
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        state_key: Vec<u8>,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            auth_endpoint: AUTH_ENDPOINT.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            client_id,
            client_secret,
            redirect_uri,
            state_key,
        }
    }

    /// Point the token endpoint at a test server.
    #[cfg(test)]
    pub(crate) fn with_token_endpoint(mut self, url: String) -> Self {
        self.token_endpoint = url;
        self
    }

    /// Build the authorization URL for an identity.
    ///
    /// The phone number rides along in the signed `state` parameter and is
    /// recovered on callback. `access_type=offline` plus `prompt=consent`
    /// makes Google issue a refresh token on every completed consent.
    pub fn authorization_url(&self, phone: &PhoneNumber) -> Result<String, AppError> {
        let state = self.sign_state(phone)?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            self.auth_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&GOOGLE_SCOPES.join(" ")),
            state
        ))
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::ExchangeFailed(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("Failed to parse token response: {}", e)))
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthApi(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Google token refresh rejected");
            return Err(AppError::AuthApi(format!(
                "Token refresh failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AuthApi(format!("Failed to parse refresh response: {}", e)))
    }

    // ─── State Signing ───────────────────────────────────────────────────────

    /// Build the signed OAuth state: `phone|timestamp_hex|signature_hex`,
    /// base64url-encoded.
    fn sign_state(&self, phone: &PhoneNumber) -> Result<String, AppError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
            .as_millis();

        let payload = format!("{}|{:x}", phone, timestamp);

        let mut mac = HmacSha256::new_from_slice(&self.state_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        let signed = format!("{}|{}", payload, hex::encode(signature));
        Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
    }

    /// Verify the state signature and recover the phone identity.
    ///
    /// Returns `None` on any malformed, tampered, or wrongly-keyed state.
    pub fn verify_state(&self, state: &str) -> Option<PhoneNumber> {
        let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
        let state_str = String::from_utf8(bytes).ok()?;

        // Format is "phone|timestamp_hex|signature_hex"
        let parts: Vec<&str> = state_str.splitn(3, '|').collect();
        if parts.len() != 3 {
            return None;
        }

        let phone = parts[0];
        let timestamp_hex = parts[1];
        let signature_hex = parts[2];

        let payload = format!("{}|{}", phone, timestamp_hex);

        let mut mac = HmacSha256::new_from_slice(&self.state_key).ok()?;
        mac.update(payload.as_bytes());

        let expected_signature = hex::encode(mac.finalize().into_bytes());

        if signature_hex != expected_signature {
            tracing::error!("OAuth state signature mismatch! Potential tampering.");
            return None;
        }

        PhoneNumber::normalize(phone)
    }
}

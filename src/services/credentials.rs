// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential lifecycle: lookup, transparent refresh, and the delegation
//! handshake.
//!
//! The store is the sole durable owner of a credential; this service holds
//! a working copy for the duration of one request and writes back any
//! refresh before returning. Concurrent refreshes for one identity are
//! serialized within this process; across processes the store's
//! last-write-wins semantics hold.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::{Credential, PhoneNumber};
use crate::services::google_auth::GoogleAuthClient;

/// Per-identity mutex map serializing refresh operations.
type RefreshLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Outcome of a credential lookup for an identity.
#[derive(Debug, Clone)]
pub enum CredentialLookup {
    /// A fresh credential, ready for API calls.
    Usable(Credential),
    /// No record exists; the user has to complete the delegation flow first.
    NeedsDelegation,
}

/// Manages the identity → credential mapping on top of the store and the
/// Google OAuth client.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    auth: GoogleAuthClient,
    refresh_locks: RefreshLocks,
}

impl CredentialService {
    pub fn new(store: Arc<dyn CredentialStore>, auth: GoogleAuthClient) -> Self {
        Self {
            store,
            auth,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    /// Get a usable credential for the given identity.
    ///
    /// - no stored record: `NeedsDelegation`, no network traffic
    /// - stored and fresh: returned as-is, no network traffic
    /// - stored and stale with a refresh token: refreshed against Google,
    ///   persisted, then returned
    /// - stored and stale without a refresh token: `ReAuthRequired`
    /// - stored but unparseable: `CorruptCredential`
    pub async fn usable_credential(
        &self,
        identity: &PhoneNumber,
    ) -> Result<CredentialLookup, AppError> {
        let Some(blob) = self.store.get(identity).await? else {
            return Ok(CredentialLookup::NeedsDelegation);
        };

        let credential = Credential::from_blob(&blob)?;

        if !credential.is_expired(Utc::now()) {
            return Ok(CredentialLookup::Usable(credential));
        }

        if credential.refresh_token.is_none() {
            tracing::warn!(identity = %identity, "Credential expired with no refresh token");
            return Err(AppError::ReAuthRequired);
        }

        // Serialize refreshes for this identity. Only one request performs
        // the exchange; the rest wait here and pick up the written result.
        let lock = self
            .refresh_locks
            .entry(identity.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-read after acquiring the lock: another request may have
        // refreshed and persisted while we waited.
        let Some(blob) = self.store.get(identity).await? else {
            return Ok(CredentialLookup::NeedsDelegation);
        };
        let credential = Credential::from_blob(&blob)?;

        if !credential.is_expired(Utc::now()) {
            return Ok(CredentialLookup::Usable(credential));
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            return Err(AppError::ReAuthRequired);
        };

        tracing::info!(identity = %identity, "Access token expired, refreshing");

        let response = self.auth.refresh_token(&refresh_token).await?;

        // Google omits the refresh token on refresh-grant responses; carry
        // the stored one forward so the credential stays refreshable.
        let refreshed = Credential {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone().or(Some(refresh_token)),
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            scopes: credential.scopes,
        };

        self.store.upsert(identity, &refreshed.to_blob()?).await?;

        tracing::info!(identity = %identity, "Credential refreshed and persisted");
        Ok(CredentialLookup::Usable(refreshed))
    }

    /// Build an authorization URL for an identity.
    ///
    /// Idempotent: no store side effects, and every call produces an
    /// independently valid URL.
    pub fn begin_delegation(&self, identity: &PhoneNumber) -> Result<String, AppError> {
        self.auth.authorization_url(identity)
    }

    /// Complete the delegation handshake from the OAuth callback.
    ///
    /// Verifies the signed state, exchanges the code, and upserts the new
    /// credential keyed by the recovered identity. This is the only path
    /// that creates a brand-new identity record.
    pub async fn complete_delegation(
        &self,
        code: &str,
        state: &str,
    ) -> Result<PhoneNumber, AppError> {
        let Some(identity) = self.auth.verify_state(state) else {
            return Err(AppError::ExchangeFailed(
                "Invalid or tampered state parameter".to_string(),
            ));
        };

        let response = self.auth.exchange_code(code).await?;

        let credential = Credential {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            scopes: response.scopes(),
        };

        self.store.upsert(&identity, &credential.to_blob()?).await?;

        tracing::info!(identity = %identity, "Delegation completed, credential stored");
        Ok(identity)
    }
}

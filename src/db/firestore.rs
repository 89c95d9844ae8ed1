// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed credential store.
//!
//! One document per phone number in the `credentials` collection, holding
//! the serialized credential blob in a single `token` field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CREDENTIALS_COLLECTION;
use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::PhoneNumber;

/// Firestore document wrapping the opaque credential blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialDocument {
    token: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl CredentialStore for FirestoreStore {
    async fn get(&self, identity: &PhoneNumber) -> Result<Option<String>, AppError> {
        let doc: Option<CredentialDocument> = self
            .client
            .fluent()
            .select()
            .by_id_in(CREDENTIALS_COLLECTION)
            .obj()
            .one(identity.as_str())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(|d| d.token))
    }

    async fn upsert(&self, identity: &PhoneNumber, blob: &str) -> Result<(), AppError> {
        let doc = CredentialDocument {
            token: blob.to_string(),
        };

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(CREDENTIALS_COLLECTION)
            .document_id(identity.as_str())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

//! In-memory credential store for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::PhoneNumber;

/// HashMap-backed store with the same last-write-wins semantics as the
/// Firestore implementation.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing blob.
    pub fn with_entry(self, identity: &PhoneNumber, blob: &str) -> Self {
        self.entries
            .write()
            .expect("store lock poisoned")
            .insert(identity.as_str().to_string(), blob.to_string());
        self
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, identity: &PhoneNumber) -> Result<Option<String>, AppError> {
        Ok(self
            .entries
            .read()
            .expect("store lock poisoned")
            .get(identity.as_str())
            .cloned())
    }

    async fn upsert(&self, identity: &PhoneNumber, blob: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .expect("store lock poisoned")
            .insert(identity.as_str().to_string(), blob.to_string());
        Ok(())
    }
}

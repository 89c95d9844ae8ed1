//! Credential persistence layer.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::PhoneNumber;
use async_trait::async_trait;

/// Durable mapping from phone identity to an opaque credential blob.
///
/// The blob format is owned by the credential service; implementations
/// store and return it verbatim. Last writer for an identity wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the stored blob for an identity, if any.
    async fn get(&self, identity: &PhoneNumber) -> Result<Option<String>, AppError>;

    /// Create or overwrite the identity's blob.
    async fn upsert(&self, identity: &PhoneNumber, blob: &str) -> Result<(), AppError>;
}

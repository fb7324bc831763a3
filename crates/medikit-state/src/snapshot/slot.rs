//! Snapshot slot handles for loading and persisting store state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SnapshotKey;
use crate::repository::{Repository, RepositoryError};

/// Internal snapshot value stored in the repository.
///
/// This type wraps a JSON value for flexible storage. Users should not work
/// with this type directly - use a [`SnapshotSlot<T>`] handle instead, which
/// provides type-safe access.
#[doc(hidden)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem(pub(crate) serde_json::Value);

// Register SnapshotItem for repository usage
crate::register_repository_item!(SnapshotItem, "Snapshot");

/// Errors that can occur when working with snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Failed to serialize/deserialize the snapshot value
    #[error("Failed to serialize/deserialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// Repository operation failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A handle to one store's snapshot in durable storage.
///
/// The handle binds a state type to its named storage slot and provides async
/// methods to load, persist and clear the serialized state. Cloning the handle
/// is cheap; clones address the same slot of the same repository.
pub struct SnapshotSlot<T> {
    repository: Arc<dyn Repository<SnapshotItem>>,
    key: SnapshotKey<T>,
}

impl<T> Clone for SnapshotSlot<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            key: self.key,
        }
    }
}

impl<T> SnapshotSlot<T> {
    /// Create a new snapshot slot handle from a repository and key.
    pub fn new(repository: Arc<dyn Repository<SnapshotItem>>, key: SnapshotKey<T>) -> Self {
        Self { repository, key }
    }

    /// The storage slot name this handle addresses.
    pub fn name(&self) -> &'static str {
        self.key.name
    }

    /// Load the last persisted snapshot.
    ///
    /// Returns `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails, which may indicate schema
    /// evolution problems or data corruption. Callers rehydrating a store are
    /// expected to fall back to the default state in that case.
    pub async fn load(&self) -> Result<Option<T>, SnapshotError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.repository.get(self.key.name.to_string()).await? {
            Some(item) => Ok(Some(serde_json::from_value::<T>(item.0)?)),
            None => Ok(None),
        }
    }

    /// Persist a full snapshot of the store state, replacing the previous one.
    pub async fn persist(&self, value: &T) -> Result<(), SnapshotError>
    where
        T: Serialize,
    {
        let json_value = serde_json::to_value(value)?;
        let item = SnapshotItem(json_value);

        self.repository.set(self.key.name.to_string(), item).await?;

        Ok(())
    }

    /// Delete this snapshot from storage.
    pub async fn clear(&self) -> Result<(), SnapshotError> {
        self.repository.remove(self.key.name.to_string()).await?;

        Ok(())
    }
}

#![doc = include_str!("../README.md")]

use std::{collections::HashMap, sync::RwLock};

use medikit_state::repository::{Repository, RepositoryError, RepositoryItem};

/// An in-memory [`Repository`] backed by a `HashMap`.
///
/// Shared between a client and a test through an `Arc`, it also doubles as a
/// fake durable storage: state persisted through one client can be rehydrated
/// by another client holding the same instance.
pub struct MemoryRepository<V> {
    items: RwLock<HashMap<String, V>>,
}

impl<V> Default for MemoryRepository<V> {
    fn default() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> MemoryRepository<V> {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for a key, bypassing the async trait. Test-side
    /// inspection only.
    pub fn peek(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.items
            .read()
            .expect("RwLock should not be poisoned")
            .get(key)
            .cloned()
    }
}

#[async_trait::async_trait]
impl<V: RepositoryItem + Clone> Repository<V> for MemoryRepository<V> {
    async fn get(&self, key: String) -> Result<Option<V>, RepositoryError> {
        Ok(self
            .items
            .read()
            .expect("RwLock should not be poisoned")
            .get(&key)
            .cloned())
    }

    async fn set(&self, key: String, value: V) -> Result<(), RepositoryError> {
        self.items
            .write()
            .expect("RwLock should not be poisoned")
            .insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: String) -> Result<(), RepositoryError> {
        self.items
            .write()
            .expect("RwLock should not be poisoned")
            .remove(&key);
        Ok(())
    }
}

/// A [`Repository`] whose every operation fails, for exercising persistence
/// error paths.
pub struct BrokenRepository;

#[async_trait::async_trait]
impl<V: RepositoryItem> Repository<V> for BrokenRepository {
    async fn get(&self, _key: String) -> Result<Option<V>, RepositoryError> {
        Err(RepositoryError::Internal("storage unavailable".to_string()))
    }

    async fn set(&self, _key: String, _value: V) -> Result<(), RepositoryError> {
        Err(RepositoryError::Internal("storage unavailable".to_string()))
    }

    async fn remove(&self, _key: String) -> Result<(), RepositoryError> {
        Err(RepositoryError::Internal("storage unavailable".to_string()))
    }
}

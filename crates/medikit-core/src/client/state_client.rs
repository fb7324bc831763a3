use std::sync::Arc;

use medikit_state::{
    registry::RepositoryNotFoundError,
    repository::{Repository, RepositoryItem},
};

use crate::Client;

/// Wrapper for state specific functionality.
pub struct StateClient {
    pub(crate) client: Client,
}

impl StateClient {
    /// Register a client managed state repository for a specific type.
    ///
    /// The embedding application registers its durable storage here (as a
    /// [`Repository`] of [`SnapshotItem`](medikit_state::SnapshotItem)) before
    /// calling [`Client::initialize`].
    pub fn register_client_managed<T: 'static + Repository<V>, V: RepositoryItem>(
        &self,
        store: Arc<T>,
    ) {
        self.client
            .internal
            .repository_map
            .register_client_managed(store)
    }

    /// Get a client managed state repository for a specific type, if it exists.
    pub fn get_client_managed<T: RepositoryItem>(
        &self,
    ) -> Result<Arc<dyn Repository<T>>, RepositoryNotFoundError> {
        self.client.internal.repository_map.get_client_managed()
    }
}

use std::sync::{Arc, OnceLock};

use medikit_state::{SnapshotError, SnapshotItem, SnapshotSlot, registry::StateRegistry};
use tracing::info;

use super::state_client::StateClient;
use crate::{
    error::{AlreadyInitializedError, InitializeError},
    session::{SessionEvent, SessionEventChannel, SessionEventSubscription},
    stores::{
        AUTH_STORAGE, AuthStore, MEDICATION_STORAGE, MedicationStore, USER_STORAGE, UserStore,
    },
};

/// The main struct to interact with the medikit state layer.
///
/// Owns the three persisted stores. There is no ambient global instance:
/// whoever owns the UI composition root constructs one `Client` and hands
/// clones to its consumers.
#[derive(Debug, Clone)]
pub struct Client {
    // Important: The [`Client`] struct requires its `Clone` implementation to return an owned
    // reference to the same instance, so consumers receiving a clone all observe the same
    // store state. Any mutable state lives behind the `Arc` in [`InternalClient`].
    pub(crate) internal: Arc<InternalClient>,
}

pub(crate) struct InternalClient {
    pub(crate) auth: AuthStore,
    pub(crate) user: UserStore,
    pub(crate) medications: MedicationStore,
    pub(crate) repository_map: StateRegistry,
    pub(crate) events: SessionEventChannel,
    initialized: OnceLock<()>,
}

impl std::fmt::Debug for InternalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalClient")
            .field("initialized", &self.initialized.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client with every store in its default empty state and no
    /// storage attached.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let events = SessionEventChannel::new();

        Self {
            internal: Arc::new(InternalClient {
                auth: AuthStore::new(events.clone()),
                user: UserStore::new(),
                medications: MedicationStore::new(),
                repository_map: StateRegistry::new(),
                events,
                initialized: OnceLock::new(),
            }),
        }
    }

    /// The authentication store.
    pub fn auth(&self) -> &AuthStore {
        &self.internal.auth
    }

    /// The user profile store.
    pub fn user(&self) -> &UserStore {
        &self.internal.user
    }

    /// The medication list store.
    pub fn medications(&self) -> &MedicationStore {
        &self.internal.medications
    }

    /// Access to state-specific functionality (storage registration).
    pub fn state(&self) -> StateClient {
        StateClient {
            client: self.clone(),
        }
    }

    /// Subscribe to session lifecycle events published after this call.
    pub fn subscribe_session_events(&self) -> SessionEventSubscription {
        self.internal.events.subscribe()
    }

    /// Rehydrates every store from its storage slot and starts the
    /// session-event listeners that clear the dependent stores on logout.
    ///
    /// The durable storage repository must have been registered through
    /// [`Client::state`] first. Single-shot: a second call fails with
    /// [`AlreadyInitializedError`]. Store operations performed before this
    /// call only affect in-memory state and may be overwritten by
    /// rehydration.
    pub async fn initialize(&self) -> Result<(), InitializeError> {
        let repository = self
            .internal
            .repository_map
            .get_client_managed::<SnapshotItem>()?;

        self.internal
            .initialized
            .set(())
            .map_err(|_| AlreadyInitializedError)?;

        self.internal
            .auth
            .attach_storage(SnapshotSlot::new(repository.clone(), AUTH_STORAGE))
            .await;
        self.internal
            .user
            .attach_storage(SnapshotSlot::new(repository.clone(), USER_STORAGE))
            .await;
        self.internal
            .medications
            .attach_storage(SnapshotSlot::new(repository, MEDICATION_STORAGE))
            .await;

        // Subscribing before spawning: a logout published between here and the
        // listeners' first poll is buffered by the channel, not lost.
        let user_subscription = self.internal.events.subscribe();
        let medication_subscription = self.internal.events.subscribe();

        tokio::spawn(clear_user_on_session_end(
            user_subscription,
            self.internal.clone(),
        ));
        tokio::spawn(clear_medications_on_session_end(
            medication_subscription,
            self.internal.clone(),
        ));

        info!("state layer initialized");
        Ok(())
    }

    /// Persists the current snapshot of every store and waits for the writes.
    ///
    /// The completion-signal escape hatch of the best-effort durability
    /// contract, intended for pre-termination flushes. Returns the first
    /// failure but in-memory state is unaffected either way.
    pub async fn flush(&self) -> Result<(), SnapshotError> {
        self.internal.auth.flush().await?;
        self.internal.user.flush().await?;
        self.internal.medications.flush().await?;
        Ok(())
    }
}

// The dependent-store listeners run as their own tasks: a failure (or panic)
// while clearing one store cannot suppress the other, and the clears always
// happen outside the `logout` caller's stack.

async fn clear_user_on_session_end(
    mut subscription: SessionEventSubscription,
    internal: Arc<InternalClient>,
) {
    while let Some(event) = subscription.next().await {
        match event {
            SessionEvent::Ended => internal.user.clear_user(),
        }
    }
}

async fn clear_medications_on_session_end(
    mut subscription: SessionEventSubscription,
    internal: Arc<InternalClient>,
) {
    while let Some(event) = subscription.next().await {
        match event {
            SessionEvent::Ended => internal.medications.clear_medications(),
        }
    }
}

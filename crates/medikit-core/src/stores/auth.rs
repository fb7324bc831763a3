use std::sync::{OnceLock, RwLock};

use medikit_state::{SnapshotError, SnapshotSlot, register_snapshot_key};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::spawn_persist;
use crate::{
    error::EmptyTokenError,
    session::{SessionEvent, SessionEventChannel},
};

/// Persisted authentication state.
///
/// Invariant: `is_authenticated` is `true` exactly when `token` is set. The
/// flag is stored (it is part of the historical snapshot format) but every
/// operation and the rehydration path re-establish it from `token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    /// The session credential, if a user is logged in.
    pub token: Option<String>,
    /// Backend identifier of the logged-in user.
    pub user_id: Option<i64>,
    #[allow(missing_docs)]
    pub is_authenticated: bool,
}

register_snapshot_key!(pub(crate) const AUTH_STORAGE: Session = "auth-storage");

/// Holds the session credential and orchestrates the session lifecycle.
///
/// Ending the session publishes [`SessionEvent::Ended`]; the dependent stores
/// clear themselves from their own subscriptions, after this store's calls
/// have returned.
pub struct AuthStore {
    session: RwLock<Session>,
    slot: OnceLock<SnapshotSlot<Session>>,
    events: SessionEventChannel,
}

impl AuthStore {
    pub(crate) fn new(events: SessionEventChannel) -> Self {
        Self {
            session: RwLock::new(Session::default()),
            slot: OnceLock::new(),
            events,
        }
    }

    /// Rehydrates from the given slot, then attaches it for background writes.
    pub(crate) async fn attach_storage(&self, slot: SnapshotSlot<Session>) {
        let restored = match slot.load().await {
            Ok(Some(mut session)) => {
                session.is_authenticated = session.token.is_some();
                session
            }
            Ok(None) => Session::default(),
            Err(error) => {
                warn!(slot = slot.name(), %error, "malformed snapshot, starting from default state");
                Session::default()
            }
        };
        debug!(
            authenticated = restored.is_authenticated,
            "session state restored"
        );
        *self.session.write().expect("RwLock should not be poisoned") = restored;
        let _ = self.slot.set(slot);
    }

    /// Starts a session with the given access token.
    ///
    /// Replaces the whole session: when `user_id` is omitted no previous value
    /// is retained. Rejects an empty token.
    pub fn login(&self, token: String, user_id: Option<i64>) -> Result<(), EmptyTokenError> {
        if token.is_empty() {
            return Err(EmptyTokenError);
        }
        let snapshot = {
            let mut session = self.session.write().expect("RwLock should not be poisoned");
            *session = Session {
                token: Some(token),
                user_id,
                is_authenticated: true,
            };
            session.clone()
        };
        info!(user_id = ?snapshot.user_id, "session started");
        spawn_persist(&self.slot, snapshot);
        Ok(())
    }

    /// Ends the session.
    ///
    /// Resets the session to its default state, then publishes
    /// [`SessionEvent::Ended`] so the user and medication stores clear
    /// themselves. Dependent-store failures are logged by their listeners and
    /// never reach this caller. Idempotent.
    pub fn logout(&self) {
        let snapshot = {
            let mut session = self.session.write().expect("RwLock should not be poisoned");
            *session = Session::default();
            session.clone()
        };
        info!("session ended");
        spawn_persist(&self.slot, snapshot);
        self.events.publish(SessionEvent::Ended);
    }

    /// Sets the user id without touching the token or the authentication flag.
    pub fn set_user_id(&self, user_id: i64) {
        let snapshot = {
            let mut session = self.session.write().expect("RwLock should not be poisoned");
            session.user_id = Some(user_id);
            session.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// The current access token, if any.
    pub fn token(&self) -> Option<String> {
        let token = self
            .session
            .read()
            .expect("RwLock should not be poisoned")
            .token
            .clone();
        trace!(present = token.is_some(), "access token read");
        token
    }

    /// Whether a session is currently active.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .expect("RwLock should not be poisoned")
            .is_authenticated
    }

    /// A copy of the full session state.
    pub fn session(&self) -> Session {
        self.session
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Persists the current snapshot and waits for the write to complete.
    ///
    /// The completion-signal escape hatch of the best-effort durability
    /// contract, for callers that need the write on disk (e.g. right before
    /// process termination). Succeeds trivially when no storage is attached.
    pub async fn flush(&self) -> Result<(), SnapshotError> {
        let Some(slot) = self.slot.get() else {
            return Ok(());
        };
        let snapshot = self.session();
        slot.persist(&snapshot).await
    }
}

//! The persisted stores: authentication session, user profile and medication
//! list.
//!
//! Every store follows the same lifecycle: it is constructed in its default
//! empty state, rehydrated once from its storage slot during
//! [`Client::initialize`](crate::Client::initialize), mutated only through its
//! own operations, and re-persisted in the background after every mutation.
//! In-memory state is the source of truth; a failed durable write is logged
//! and never surfaced to the mutating caller.

use std::sync::OnceLock;

use medikit_state::SnapshotSlot;
use serde::Serialize;

mod auth;
mod medication;
mod user;

pub use auth::{AuthStore, Session};
pub use medication::{MedicationListState, MedicationRecord, MedicationStore, MedicationUpdate};
pub use user::{Profile, ProfileUpdate, UserStore};

pub(crate) use auth::AUTH_STORAGE;
pub(crate) use medication::MEDICATION_STORAGE;
pub(crate) use user::USER_STORAGE;

/// Schedules a background write of `snapshot` through the store's slot.
///
/// Fire-and-forget: the caller has already committed the mutation to memory
/// and must not be blocked or failed by storage. Without an attached slot or
/// an ambient async runtime the write is skipped (and logged), not retried.
pub(crate) fn spawn_persist<T>(slot: &OnceLock<SnapshotSlot<T>>, snapshot: T)
where
    T: Serialize + Send + Sync + 'static,
{
    let Some(slot) = slot.get() else {
        tracing::debug!("no storage attached, skipping snapshot persist");
        return;
    };
    let slot = slot.clone();
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(error) = slot.persist(&snapshot).await {
                    tracing::warn!(slot = slot.name(), %error, "failed to persist snapshot");
                }
            });
        }
        Err(_) => {
            tracing::warn!(
                slot = slot.name(),
                "no async runtime available, snapshot not persisted"
            );
        }
    }
}

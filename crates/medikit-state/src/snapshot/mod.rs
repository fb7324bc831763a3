//! Type-safe snapshot slots for persisted store state.
//!
//! Each in-memory store serializes its entire state into one named storage
//! slot, backed by the repository provided by the embedding client.
//!
//! # Usage
//!
//! ```rust,ignore
//! use medikit_state::register_snapshot_key;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Session {
//!     token: Option<String>,
//! }
//!
//! // Bind the state type to its storage slot
//! register_snapshot_key!(const AUTH_STORAGE: Session = "auth-storage");
//!
//! async fn example(
//!     repository: std::sync::Arc<dyn medikit_state::repository::Repository<medikit_state::SnapshotItem>>,
//! ) -> Result<(), medikit_state::SnapshotError> {
//!     let slot = medikit_state::SnapshotSlot::new(repository, AUTH_STORAGE);
//!
//!     // Rehydrate
//!     let session: Option<Session> = slot.load().await?;
//!
//!     // Persist a new snapshot
//!     slot.persist(&Session { token: None }).await?;
//!
//!     // Drop the slot contents entirely
//!     slot.clear().await?;
//!     Ok(())
//! }
//! ```

mod key;
mod slot;

pub use key::SnapshotKey;
pub use slot::{SnapshotError, SnapshotItem, SnapshotSlot};

#![doc = include_str!("../README.md")]

/// This module provides a generic repository interface for storing and retrieving items.
pub mod repository;

/// This module provides a registry for managing repositories of different types.
pub mod registry;

/// Type-safe snapshot slots binding a persisted state type to a named storage slot.
pub mod snapshot;

pub use snapshot::{SnapshotError, SnapshotItem, SnapshotKey, SnapshotSlot};

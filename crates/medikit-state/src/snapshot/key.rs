//! Type-safe keys naming the storage slot of a persisted state type.

use std::marker::PhantomData;

/// Register a type-safe snapshot key.
///
/// This macro is the primary way to create snapshot keys. It associates a
/// storage slot name with a state type at compile time, and rejects slot names
/// that are not valid storage identifiers.
///
/// # Example
/// ```rust
/// use medikit_state::register_snapshot_key;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Session {
///     token: Option<String>,
/// }
///
/// register_snapshot_key!(pub const AUTH_STORAGE: Session = "auth-storage");
/// ```
#[macro_export]
macro_rules! register_snapshot_key {
    ($vis:vis const $name:ident: $ty:ty = $key:literal) => {
        const _: () = assert!(
            $crate::repository::validate_registry_name($key),
            concat!(
                "Snapshot slot name '",
                $key,
                "' must contain only alphabetic characters, underscores and hyphens"
            )
        );
        $vis const $name: $crate::snapshot::SnapshotKey<$ty> =
            $crate::snapshot::SnapshotKey::new($key);
    };
}

/// Type-safe key for snapshot storage.
///
/// Associates a storage slot name with a state type at compile time,
/// preventing one store's snapshot from being decoded as another's.
///
/// Use the [`register_snapshot_key!`](crate::register_snapshot_key) macro to create keys.
#[derive(Debug)]
pub struct SnapshotKey<T> {
    pub(crate) name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> SnapshotKey<T> {
    /// Create a new type-safe key with the given storage slot name.
    #[doc(hidden)]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

// Manual impls: the derived versions would require `T: Clone`/`T: Copy`, but a
// key carries no value of `T`.
impl<T> Clone for SnapshotKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for SnapshotKey<T> {}

use std::sync::{OnceLock, RwLock};

use medikit_state::{SnapshotError, SnapshotSlot, register_snapshot_key};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::spawn_persist;

/// The current user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Backend identifier of the user.
    pub user_id: i64,
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub phone: String,
    /// Birth date as the backend formats it.
    pub birth_date: String,
}

/// A partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    #[allow(missing_docs)]
    pub user_id: Option<i64>,
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub phone: Option<String>,
    #[allow(missing_docs)]
    pub birth_date: Option<String>,
}

register_snapshot_key!(pub(crate) const USER_STORAGE: Option<Profile> = "user-storage");

/// Holds the current user's profile, or nothing when no user is current.
pub struct UserStore {
    profile: RwLock<Option<Profile>>,
    slot: OnceLock<SnapshotSlot<Option<Profile>>>,
}

impl UserStore {
    pub(crate) fn new() -> Self {
        Self {
            profile: RwLock::new(None),
            slot: OnceLock::new(),
        }
    }

    /// Rehydrates from the given slot, then attaches it for background writes.
    pub(crate) async fn attach_storage(&self, slot: SnapshotSlot<Option<Profile>>) {
        let restored = match slot.load().await {
            Ok(Some(profile)) => profile,
            Ok(None) => None,
            Err(error) => {
                warn!(slot = slot.name(), %error, "malformed snapshot, starting from default state");
                None
            }
        };
        debug!(present = restored.is_some(), "user profile restored");
        *self.profile.write().expect("RwLock should not be poisoned") = restored;
        let _ = self.slot.set(slot);
    }

    /// Replaces the stored profile.
    pub fn set_user(&self, profile: Profile) {
        {
            let mut current = self.profile.write().expect("RwLock should not be poisoned");
            *current = Some(profile.clone());
        }
        debug!(user_id = profile.user_id, "user profile set");
        spawn_persist(&self.slot, Some(profile));
    }

    /// Merges the given fields into the stored profile.
    ///
    /// Ignored (and logged) when no profile is currently set.
    pub fn update_user(&self, update: ProfileUpdate) {
        let snapshot = {
            let mut profile = self.profile.write().expect("RwLock should not be poisoned");
            let Some(current) = profile.as_mut() else {
                debug!("no user profile set, ignoring update");
                return;
            };
            if let Some(user_id) = update.user_id {
                current.user_id = user_id;
            }
            if let Some(name) = update.name {
                current.name = name;
            }
            if let Some(phone) = update.phone {
                current.phone = phone;
            }
            if let Some(birth_date) = update.birth_date {
                current.birth_date = birth_date;
            }
            profile.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// Builds a fresh profile from an API response and replaces the stored one.
    ///
    /// Full overwrite, not a merge: omitted fields become empty strings, and no
    /// field of a previously stored profile survives this call. This keeps a
    /// user switch from carrying stale fields over.
    pub fn set_user_from_api(
        &self,
        user_id: i64,
        name: Option<String>,
        phone: Option<String>,
        birth_date: Option<String>,
    ) {
        let profile = Profile {
            user_id,
            name: name.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            birth_date: birth_date.unwrap_or_default(),
        };
        debug!(user_id, "user profile set from api response");
        {
            let mut current = self.profile.write().expect("RwLock should not be poisoned");
            *current = Some(profile.clone());
        }
        spawn_persist(&self.slot, Some(profile));
    }

    /// Clears the stored profile. Idempotent.
    pub fn clear_user(&self) {
        {
            let mut profile = self.profile.write().expect("RwLock should not be poisoned");
            *profile = None;
        }
        debug!("user profile cleared");
        spawn_persist(&self.slot, None);
    }

    /// A copy of the stored profile, if any.
    pub fn user(&self) -> Option<Profile> {
        self.profile
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Persists the current snapshot and waits for the write to complete.
    ///
    /// Succeeds trivially when no storage is attached.
    pub async fn flush(&self) -> Result<(), SnapshotError> {
        let Some(slot) = self.slot.get() else {
            return Ok(());
        };
        let snapshot = self.user();
        slot.persist(&snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(user_id: i64, name: &str) -> Profile {
        Profile {
            user_id,
            name: name.to_string(),
            phone: "010-1234-5678".to_string(),
            birth_date: "1950-03-01".to_string(),
        }
    }

    #[test]
    fn set_user_replaces_the_profile() {
        let store = UserStore::new();
        store.set_user(profile(1, "Kim"));
        store.set_user(profile(2, "Lee"));

        let current = store.user().unwrap();
        assert_eq!(current.user_id, 2);
        assert_eq!(current.name, "Lee");
    }

    #[test]
    fn update_user_merges_only_the_given_fields() {
        let store = UserStore::new();
        store.set_user(profile(1, "Kim"));
        store.update_user(ProfileUpdate {
            phone: Some("010-0000-0000".to_string()),
            ..Default::default()
        });

        let current = store.user().unwrap();
        assert_eq!(current.name, "Kim");
        assert_eq!(current.phone, "010-0000-0000");
        assert_eq!(current.birth_date, "1950-03-01");
    }

    #[test]
    fn update_user_without_a_profile_is_a_no_op() {
        let store = UserStore::new();
        store.update_user(ProfileUpdate {
            name: Some("Kim".to_string()),
            ..Default::default()
        });
        assert_eq!(store.user(), None);
    }

    #[test]
    fn set_user_from_api_overwrites_every_field() {
        let store = UserStore::new();
        store.set_user_from_api(
            1,
            Some("Kim".to_string()),
            Some("010-1234-5678".to_string()),
            Some("1950-03-01".to_string()),
        );
        store.set_user_from_api(2, Some("Lee".to_string()), None, None);

        let current = store.user().unwrap();
        assert_eq!(current.user_id, 2);
        assert_eq!(current.name, "Lee");
        assert_eq!(current.phone, "");
        assert_eq!(current.birth_date, "");
    }

    #[test]
    fn clear_user_is_idempotent() {
        let store = UserStore::new();
        store.set_user(profile(1, "Kim"));
        store.clear_user();
        assert_eq!(store.user(), None);
        store.clear_user();
        assert_eq!(store.user(), None);
    }

    #[test]
    fn snapshot_uses_the_historical_field_names() {
        let value = serde_json::to_value(profile(5, "Kim")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "userId": 5,
                "name": "Kim",
                "phone": "010-1234-5678",
                "birthDate": "1950-03-01",
            })
        );
    }
}

use std::sync::{OnceLock, RwLock};

use medikit_state::{SnapshotError, SnapshotSlot, register_snapshot_key};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::spawn_persist;

/// A medication tracked by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    /// Backend identifier, unique within the list.
    pub medication_id: i64,
    #[allow(missing_docs)]
    pub category: String,
    /// The hospital that issued the prescription.
    pub hospital: String,
    /// Number of intakes per day.
    pub daily_frequency: u32,
    #[allow(missing_docs)]
    pub start_date: String,
    /// Intake periods (e.g. `breakfast`, `lunch`, `dinner`), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_periods: Option<Vec<String>>,
}

/// A partial medication update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationUpdate {
    #[allow(missing_docs)]
    pub category: Option<String>,
    #[allow(missing_docs)]
    pub hospital: Option<String>,
    #[allow(missing_docs)]
    pub daily_frequency: Option<u32>,
    #[allow(missing_docs)]
    pub start_date: Option<String>,
    #[allow(missing_docs)]
    pub time_periods: Option<Vec<String>>,
}

/// Persisted medication-list state.
///
/// `selected_medication` is a denormalized copy of the list entry whose id is
/// `selected_medication_id`; every mutation re-establishes the pairing, except
/// [`MedicationStore::set_medications`] which deliberately leaves the
/// selection alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationListState {
    #[allow(missing_docs)]
    pub medications: Vec<MedicationRecord>,
    #[allow(missing_docs)]
    pub selected_medication_id: Option<i64>,
    #[allow(missing_docs)]
    pub selected_medication: Option<MedicationRecord>,
}

register_snapshot_key!(pub(crate) const MEDICATION_STORAGE: MedicationListState = "medication-storage");

/// Holds the medication list and the current selection.
pub struct MedicationStore {
    state: RwLock<MedicationListState>,
    slot: OnceLock<SnapshotSlot<MedicationListState>>,
}

impl MedicationStore {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(MedicationListState::default()),
            slot: OnceLock::new(),
        }
    }

    /// Rehydrates from the given slot, then attaches it for background writes.
    ///
    /// The denormalized selection is re-derived from the restored list; a
    /// selected id with no matching record clears both selection fields.
    pub(crate) async fn attach_storage(&self, slot: SnapshotSlot<MedicationListState>) {
        let restored = match slot.load().await {
            Ok(Some(mut state)) => {
                state.selected_medication = state.selected_medication_id.and_then(|id| {
                    state
                        .medications
                        .iter()
                        .find(|record| record.medication_id == id)
                        .cloned()
                });
                if state.selected_medication.is_none() {
                    state.selected_medication_id = None;
                }
                state
            }
            Ok(None) => MedicationListState::default(),
            Err(error) => {
                warn!(slot = slot.name(), %error, "malformed snapshot, starting from default state");
                MedicationListState::default()
            }
        };
        debug!(count = restored.medications.len(), "medication list restored");
        *self.state.write().expect("RwLock should not be poisoned") = restored;
        let _ = self.slot.set(slot);
    }

    /// Replaces the whole medication list.
    ///
    /// The selection fields are left untouched, even when the selected id no
    /// longer appears in the new list.
    pub fn set_medications(&self, medications: Vec<MedicationRecord>) {
        let snapshot = {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            state.medications = medications;
            state.clone()
        };
        debug!(count = snapshot.medications.len(), "medication list replaced");
        spawn_persist(&self.slot, snapshot);
    }

    /// Appends a medication to the end of the list.
    ///
    /// A record whose id is already present is rejected as a logged no-op,
    /// keeping ids unique within the list.
    pub fn add_medication(&self, record: MedicationRecord) {
        let snapshot = {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            if state
                .medications
                .iter()
                .any(|existing| existing.medication_id == record.medication_id)
            {
                warn!(
                    medication_id = record.medication_id,
                    "duplicate medication id, ignoring add"
                );
                return;
            }
            state.medications.push(record);
            state.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// Merges the given fields into the record with a matching id.
    ///
    /// Silent no-op when no record matches. When the updated record is the
    /// selected one, the denormalized selection is refreshed in the same step.
    pub fn update_medication(&self, medication_id: i64, update: MedicationUpdate) {
        let snapshot = {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            let Some(record) = state
                .medications
                .iter_mut()
                .find(|record| record.medication_id == medication_id)
            else {
                debug!(medication_id, "no medication matched for update");
                return;
            };
            if let Some(category) = update.category {
                record.category = category;
            }
            if let Some(hospital) = update.hospital {
                record.hospital = hospital;
            }
            if let Some(daily_frequency) = update.daily_frequency {
                record.daily_frequency = daily_frequency;
            }
            if let Some(start_date) = update.start_date {
                record.start_date = start_date;
            }
            if let Some(time_periods) = update.time_periods {
                record.time_periods = Some(time_periods);
            }
            let updated = record.clone();
            if state.selected_medication_id == Some(medication_id) {
                state.selected_medication = Some(updated);
            }
            state.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// Removes the record with a matching id.
    ///
    /// Silent no-op when no record matches. Deleting the selected record
    /// clears both selection fields.
    pub fn delete_medication(&self, medication_id: i64) {
        let snapshot = {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            let Some(index) = state
                .medications
                .iter()
                .position(|record| record.medication_id == medication_id)
            else {
                debug!(medication_id, "no medication matched for delete");
                return;
            };
            state.medications.remove(index);
            if state.selected_medication_id == Some(medication_id) {
                state.selected_medication_id = None;
                state.selected_medication = None;
            }
            state.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// Selects the given record (or clears the selection with `None`),
    /// deriving the selected id from it.
    pub fn set_selected_medication(&self, record: Option<MedicationRecord>) {
        let snapshot = {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            state.selected_medication_id = record.as_ref().map(|record| record.medication_id);
            state.selected_medication = record;
            state.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// Selects the list entry with the given id (or clears the selection with
    /// `None`).
    ///
    /// An id with no matching record clears both selection fields, so the
    /// selection never points at a record that is not in the list.
    pub fn select_medication_by_id(&self, medication_id: Option<i64>) {
        let snapshot = {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            match medication_id {
                Some(id) => {
                    let record = state
                        .medications
                        .iter()
                        .find(|record| record.medication_id == id)
                        .cloned();
                    if record.is_none() {
                        warn!(medication_id = id, "unknown medication id, clearing selection");
                    }
                    state.selected_medication_id = record.as_ref().map(|_| id);
                    state.selected_medication = record;
                }
                None => {
                    state.selected_medication_id = None;
                    state.selected_medication = None;
                }
            }
            state.clone()
        };
        spawn_persist(&self.slot, snapshot);
    }

    /// Empties the list and clears the selection. Idempotent.
    pub fn clear_medications(&self) {
        {
            let mut state = self.state.write().expect("RwLock should not be poisoned");
            *state = MedicationListState::default();
        }
        debug!("medication list cleared");
        spawn_persist(&self.slot, MedicationListState::default());
    }

    /// A copy of the medication list, in insertion order.
    pub fn medications(&self) -> Vec<MedicationRecord> {
        self.state
            .read()
            .expect("RwLock should not be poisoned")
            .medications
            .clone()
    }

    /// A copy of the selected record, if any.
    pub fn selected_medication(&self) -> Option<MedicationRecord> {
        self.state
            .read()
            .expect("RwLock should not be poisoned")
            .selected_medication
            .clone()
    }

    /// The selected record's id, if any.
    pub fn selected_medication_id(&self) -> Option<i64> {
        self.state
            .read()
            .expect("RwLock should not be poisoned")
            .selected_medication_id
    }

    /// Persists the current snapshot and waits for the write to complete.
    ///
    /// Succeeds trivially when no storage is attached.
    pub async fn flush(&self) -> Result<(), SnapshotError> {
        let Some(slot) = self.slot.get() else {
            return Ok(());
        };
        let snapshot = self
            .state
            .read()
            .expect("RwLock should not be poisoned")
            .clone();
        slot.persist(&snapshot).await
    }
}

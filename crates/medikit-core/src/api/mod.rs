//! Typed payload models for the network API layer.
//!
//! The HTTP transport is owned by the embedding application; this module only
//! defines the backend's response shapes and their conversions into store
//! types, so calling code can map a fetch result straight into
//! [`MedicationStore::set_medications`](crate::stores::MedicationStore::set_medications)
//! or [`UserStore::set_user_from_api`](crate::stores::UserStore::set_user_from_api).

use serde::{Deserialize, Serialize};

use crate::{error::MissingFieldError, require, stores::MedicationRecord};

/// Response header common to all backend endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    #[allow(missing_docs)]
    pub result_code: i32,
    #[allow(missing_docs)]
    pub result_msg: String,
}

/// Generic response envelope: header plus typed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    #[allow(missing_docs)]
    pub header: ResponseHeader,
    #[allow(missing_docs)]
    pub body: Option<T>,
}

impl<T> BaseResponse<T> {
    /// Extracts the body, failing when the backend omitted it.
    pub fn into_body(self) -> Result<T, MissingFieldError> {
        Ok(require!(self.body))
    }
}

/// A medication entry as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPayload {
    /// The backend's medication identifier (`umno`).
    pub umno: i64,
    #[allow(missing_docs)]
    pub category: String,
    #[allow(missing_docs)]
    pub hospital: String,
    /// Number of intakes per day.
    pub taken: u32,
    #[allow(missing_docs)]
    pub start_date: Option<String>,
    /// Comma separated intake periods, e.g. `"breakfast,lunch,dinner"`.
    pub comb: Option<String>,
}

impl From<MedicationPayload> for MedicationRecord {
    fn from(payload: MedicationPayload) -> Self {
        MedicationRecord {
            medication_id: payload.umno,
            category: payload.category,
            hospital: payload.hospital,
            daily_frequency: payload.taken,
            start_date: payload.start_date.unwrap_or_default(),
            time_periods: payload.comb.map(|comb| {
                comb.split(',')
                    .map(|period| period.trim().to_string())
                    .collect()
            }),
        }
    }
}

/// Converts a medication-fetch response into store records, preserving the
/// backend's ordering.
pub fn medication_records(
    response: BaseResponse<Vec<MedicationPayload>>,
) -> Result<Vec<MedicationRecord>, MissingFieldError> {
    Ok(response
        .into_body()?
        .into_iter()
        .map(MedicationRecord::from)
        .collect())
}

/// The current user's profile as the backend returns it.
///
/// Feed into [`UserStore::set_user_from_api`](crate::stores::UserStore::set_user_from_api);
/// the backend names the phone field `call` and the birth date `birth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoPayload {
    /// The backend's user identifier (`uno`).
    pub uno: i64,
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub call: Option<String>,
    #[allow(missing_docs)]
    pub birth: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medication_payloads_map_into_records() {
        let response: BaseResponse<Vec<MedicationPayload>> = serde_json::from_value(
            serde_json::json!({
                "header": { "resultCode": 0, "resultMsg": "OK" },
                "body": [
                    {
                        "umno": 12,
                        "category": "blood pressure",
                        "hospital": "Seoul Medical Center",
                        "taken": 2,
                        "startDate": "2025-06-01",
                        "comb": "breakfast, dinner"
                    },
                    {
                        "umno": 13,
                        "category": "cold",
                        "hospital": "Happy Clinic",
                        "taken": 3
                    }
                ]
            }),
        )
        .unwrap();

        let records = medication_records(response).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].medication_id, 12);
        assert_eq!(records[0].daily_frequency, 2);
        assert_eq!(
            records[0].time_periods.as_deref(),
            Some(&["breakfast".to_string(), "dinner".to_string()][..])
        );

        assert_eq!(records[1].medication_id, 13);
        assert_eq!(records[1].start_date, "");
        assert_eq!(records[1].time_periods, None);
    }

    #[test]
    fn a_missing_body_is_an_error() {
        let response: BaseResponse<Vec<MedicationPayload>> = serde_json::from_value(
            serde_json::json!({
                "header": { "resultCode": 14, "resultMsg": "not found" },
            }),
        )
        .unwrap();

        assert!(medication_records(response).is_err());
    }

    #[test]
    fn user_info_uses_the_backend_field_names() {
        let payload: UserInfoPayload = serde_json::from_value(serde_json::json!({
            "uno": 5,
            "name": "Kim",
            "call": "010-1234-5678",
            "birth": "1950-03-01"
        }))
        .unwrap();

        assert_eq!(payload.uno, 5);
        assert_eq!(payload.call.as_deref(), Some("010-1234-5678"));
    }
}

// models/src/medical/referral.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request from one doctor to another to see a given patient, tied to
/// the encounter record that created it. Same lifecycle as LabTest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    /// References `PatientProfile::id`.
    pub patient_id: Uuid,
    pub referring_doctor_id: Uuid,
    pub referred_doctor_id: Uuid,
    pub reason: String,
    pub notes: Option<String>,
    /// The medical record created in the same encounter.
    pub record_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Referral {
    pub fn new(
        patient_id: Uuid,
        referring_doctor_id: Uuid,
        referred_doctor_id: Uuid,
        reason: impl Into<String>,
        notes: Option<String>,
        record_id: Uuid,
    ) -> Self {
        Referral {
            id: Uuid::new_v4(),
            patient_id,
            referring_doctor_id,
            referred_doctor_id,
            reason: reason.into(),
            notes,
            record_id,
            created_at: Utc::now(),
        }
    }
}

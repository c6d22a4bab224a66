// models/src/medical/medical_record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag distinguishing how a record entered the system: created directly,
/// authored during a clinical encounter, or stored by the intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "GENERAL")]
    General,
    #[serde(rename = "ENCOUNTER")]
    Encounter,
    #[serde(rename = "AI_DIAGNOSIS")]
    AiDiagnosis,
}

/// A diagnosis note for a subject user. Append-only: no update or delete
/// path exists; every encounter or intake session produces a fresh row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: Uuid,
    /// The patient subject of this record (`User::id`).
    pub user_id: Uuid,
    /// The authoring doctor, when one is attached.
    pub doctor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub symptoms: Option<String>,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl MedicalRecord {
    pub fn new(
        user_id: Uuid,
        doctor_id: Option<Uuid>,
        record_type: RecordType,
        diagnosis: impl Into<String>,
        prescription: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        MedicalRecord {
            id: Uuid::new_v4(),
            user_id,
            doctor_id,
            record_type,
            symptoms: None,
            diagnosis: diagnosis.into(),
            prescription: prescription.into(),
            notes: notes.into(),
            created_at: Utc::now(),
        }
    }
}

// models/src/medical/patient.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-to-one demographic extension of a PATIENT-role user, created
/// alongside the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: NaiveDate,
    pub blood_group: Option<String>,
    pub allergies: Option<String>,
}

impl PatientProfile {
    pub fn new(
        user_id: Uuid,
        date_of_birth: NaiveDate,
        blood_group: Option<String>,
        allergies: Option<String>,
    ) -> Self {
        PatientProfile {
            id: Uuid::new_v4(),
            user_id,
            date_of_birth,
            blood_group,
            allergies,
        }
    }
}

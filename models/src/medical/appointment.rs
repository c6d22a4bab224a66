// models/src/medical/appointment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-way status machine: SCHEDULED -> {COMPLETED, CANCELLED}, terminal
/// thereafter. No transition back to SCHEDULED exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// Whether moving from `self` to `next` respects the lifecycle.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(self, AppointmentStatus::Scheduled) && next != AppointmentStatus::Scheduled
    }
}

/// A scheduling record linking a patient profile and a doctor user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    /// References `PatientProfile::id`.
    pub patient_id: Uuid,
    /// References the DOCTOR-role `User::id`.
    pub doctor_id: Uuid,
    pub datetime: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// New appointments always start out SCHEDULED.
    pub fn new(
        patient_id: Uuid,
        doctor_id: Uuid,
        datetime: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            datetime,
            notes,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        }
    }
}

// ehr_services/src/storage/storage.rs
//! The persistence read/write contract the backend core depends on. The
//! relational engine behind it is an external collaborator; services only
//! ever talk to this trait.
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use models::{
    Appointment, EhrResult, LabTest, MedicalRecord, PatientProfile, Referral, Role, User,
};

#[async_trait]
pub trait EhrStore: Send + Sync + Debug + 'static {
    // === USERS & PROFILES ===
    async fn insert_user(&self, user: User) -> EhrResult<User>;
    async fn insert_patient_profile(&self, profile: PatientProfile) -> EhrResult<PatientProfile>;
    async fn user(&self, id: Uuid) -> EhrResult<Option<User>>;
    async fn users_by_role(&self, role: Role) -> EhrResult<Vec<User>>;
    async fn patient_profile(&self, id: Uuid) -> EhrResult<Option<PatientProfile>>;
    async fn patient_profile_for_user(&self, user_id: Uuid) -> EhrResult<Option<PatientProfile>>;
    /// Patients whose user id matches `query` exactly or whose user name
    /// contains it case-insensitively, joined with their user.
    async fn search_patients(&self, query: &str) -> EhrResult<Vec<(PatientProfile, User)>>;

    // === APPOINTMENTS ===
    async fn insert_appointment(&self, appointment: Appointment) -> EhrResult<Appointment>;
    async fn all_appointments(&self) -> EhrResult<Vec<Appointment>>;
    /// Appointments whose patient profile belongs to `user_id`.
    async fn appointments_for_patient_user(&self, user_id: Uuid) -> EhrResult<Vec<Appointment>>;
    /// SCHEDULED appointments for a doctor with `from <= datetime <= to`.
    async fn doctor_appointments_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EhrResult<Vec<Appointment>>;

    // === MEDICAL RECORDS ===
    async fn insert_record(&self, record: MedicalRecord) -> EhrResult<MedicalRecord>;
    /// The record plus its test and referral rows as one
    /// transaction-equivalent unit: either everything persists or nothing
    /// does.
    async fn create_encounter(
        &self,
        record: MedicalRecord,
        tests: Vec<LabTest>,
        referrals: Vec<Referral>,
    ) -> EhrResult<MedicalRecord>;
    /// Newest-first records for one subject user.
    async fn records_for_subject(&self, user_id: Uuid) -> EhrResult<Vec<MedicalRecord>>;
    /// Newest-first records across all subjects.
    async fn all_records(&self) -> EhrResult<Vec<MedicalRecord>>;
    async fn tests_for_record(&self, record_id: Uuid) -> EhrResult<Vec<LabTest>>;
    async fn referrals_for_record(&self, record_id: Uuid) -> EhrResult<Vec<Referral>>;
}

// ehr_services/src/encounters/mod.rs
pub mod encounters;

pub use encounters::{
    ContextAppointment, ContextQuery, DoctorContext, EncounterDraft, EncounterService,
    PatientWithUser, ReferralDraft, TestDraft,
};

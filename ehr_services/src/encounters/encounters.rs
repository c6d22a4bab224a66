// ehr_services/src/encounters/encounters.rs
//! Encounter Recorder: the doctor-facing context lookup plus the
//! transaction that stores a clinical visit with its test requests and
//! referrals.
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{
    AppointmentStatus, AuthContext, EhrError, EhrResult, LabTest, MedicalRecord, PatientProfile,
    RecordType, Referral, Role, User,
};

use crate::authorization;
use crate::storage::EhrStore;

/// Query half-selectors for the context lookup. `patient_id` doubles as a
/// free-text name query, matching the booking screen's single search box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextQuery {
    pub date: Option<String>,
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientWithUser {
    pub id: Uuid,
    pub date_of_birth: NaiveDate,
    pub blood_group: Option<String>,
    pub allergies: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAppointment {
    pub id: Uuid,
    pub datetime: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub patient: PatientWithUser,
}

/// Either half is absent when its selector was not supplied; a supplied
/// selector with no matches yields an empty (not absent) sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<ContextAppointment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patients: Option<Vec<PatientWithUser>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDraft {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDraft {
    pub doctor_id: Uuid,
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterDraft {
    /// The subject patient's user id.
    pub patient_id: Uuid,
    pub symptoms: Option<String>,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: String,
    #[serde(default)]
    pub tests: Vec<TestDraft>,
    #[serde(default)]
    pub referrals: Vec<ReferralDraft>,
}

#[derive(Debug, Clone)]
pub struct EncounterService {
    store: Arc<dyn EhrStore>,
}

impl EncounterService {
    pub fn new(store: Arc<dyn EhrStore>) -> Self {
        Self { store }
    }

    /// Two independent, optionally-combined lookups for the encounter
    /// screen: the caller's SCHEDULED appointments on a day, and a
    /// patient search by exact id or name fragment.
    pub async fn doctor_context(
        &self,
        ctx: Option<&AuthContext>,
        query: ContextQuery,
    ) -> EhrResult<DoctorContext> {
        let ctx = authorization::require_session(ctx)?;

        let appointments = match query.date.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => {
                let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| EhrError::Validation("date must be YYYY-MM-DD".to_string()))?;
                let from = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
                let to = day.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
                let found = self
                    .store
                    .doctor_appointments_between(ctx.user_id, from, to)
                    .await?;
                let mut views = Vec::with_capacity(found.len());
                for appointment in found {
                    let patient = self.patient_view(appointment.patient_id).await?;
                    views.push(ContextAppointment {
                        id: appointment.id,
                        datetime: appointment.datetime,
                        notes: appointment.notes,
                        status: appointment.status,
                        patient,
                    });
                }
                Some(views)
            }
            None => None,
        };

        let patients = match query.patient_id.as_deref().filter(|s| !s.is_empty()) {
            Some(needle) => {
                let matched = self.store.search_patients(needle).await?;
                Some(
                    matched
                        .into_iter()
                        .map(|(profile, user)| join_patient(profile, user))
                        .collect(),
                )
            }
            None => None,
        };

        Ok(DoctorContext { appointments, patients })
    }

    /// Stores one ENCOUNTER medical record authored by the calling doctor,
    /// together with its test requests and referrals. The subject must be
    /// a registered patient; all rows persist as one unit.
    pub async fn record(
        &self,
        ctx: Option<&AuthContext>,
        draft: EncounterDraft,
    ) -> EhrResult<MedicalRecord> {
        let ctx = authorization::require_role(ctx, Role::Doctor)?;

        // The profile id only backs test and referral rows; an encounter
        // without side rows needs no profile lookup.
        let profile_id = if draft.tests.is_empty() && draft.referrals.is_empty() {
            None
        } else {
            let profile = self
                .store
                .patient_profile_for_user(draft.patient_id)
                .await?
                .ok_or_else(|| EhrError::NotFound("Patient profile".to_string()))?;
            Some(profile.id)
        };

        let mut record = MedicalRecord::new(
            draft.patient_id,
            Some(ctx.user_id),
            RecordType::Encounter,
            draft.diagnosis,
            draft.prescription,
            draft.notes,
        );
        record.symptoms = draft.symptoms;

        let (tests, referrals): (Vec<LabTest>, Vec<Referral>) = match profile_id {
            Some(pid) => (
                draft
                    .tests
                    .into_iter()
                    .map(|t| LabTest::new(t.name, t.description, pid, record.id))
                    .collect(),
                draft
                    .referrals
                    .into_iter()
                    .map(|r| {
                        Referral::new(pid, ctx.user_id, r.doctor_id, r.reason, r.notes, record.id)
                    })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        info!(
            "recording encounter {} for patient {} ({} tests, {} referrals)",
            record.id,
            draft.patient_id,
            tests.len(),
            referrals.len()
        );
        self.store.create_encounter(record, tests, referrals).await
    }

    async fn patient_view(&self, profile_id: Uuid) -> EhrResult<PatientWithUser> {
        let profile = self.store.patient_profile(profile_id).await?.ok_or_else(|| {
            EhrError::Internal(format!("missing patient profile {}", profile_id))
        })?;
        let user = self.store.user(profile.user_id).await?.ok_or_else(|| {
            EhrError::Internal(format!("patient profile {} references missing user", profile.id))
        })?;
        Ok(join_patient(profile, user))
    }
}

fn join_patient(profile: PatientProfile, user: User) -> PatientWithUser {
    PatientWithUser {
        id: profile.id,
        date_of_birth: profile.date_of_birth,
        blood_group: profile.blood_group,
        allergies: profile.allergies,
        user,
    }
}

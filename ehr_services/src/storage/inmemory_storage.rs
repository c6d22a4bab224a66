// ehr_services/src/storage/inmemory_storage.rs
//! In-memory storage engine. Stands in for the external relational store:
//! every table is a `RwLock`-guarded map, and referential checks mirror
//! the foreign-key constraints the relational schema would enforce.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use tokio::sync::RwLock;
use uuid::Uuid;

use models::{
    Appointment, AppointmentStatus, EhrError, EhrResult, LabTest, MedicalRecord, PatientProfile,
    Referral, Role, User,
};

use crate::storage::EhrStore;

/// Records, tests and referrals live under one lock so that recording an
/// encounter is a single transaction-equivalent unit.
#[derive(Debug, Default)]
struct RecordTables {
    records: HashMap<Uuid, MedicalRecord>,
    tests: HashMap<Uuid, LabTest>,
    referrals: HashMap<Uuid, Referral>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    profiles: RwLock<HashMap<Uuid, PatientProfile>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    records: RwLock<RecordTables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(records: &mut [MedicalRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl EhrStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> EhrResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(EhrError::Storage(format!("user {} already exists", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn insert_patient_profile(&self, profile: PatientProfile) -> EhrResult<PatientProfile> {
        let users = self.users.read().await;
        match users.get(&profile.user_id) {
            Some(user) if user.role == Role::Patient => {}
            Some(_) => {
                return Err(EhrError::Storage(format!(
                    "user {} is not a patient",
                    profile.user_id
                )))
            }
            None => {
                return Err(EhrError::Storage(format!(
                    "no user {} for patient profile",
                    profile.user_id
                )))
            }
        }
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn user(&self, id: Uuid) -> EhrResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn users_by_role(&self, role: Role) -> EhrResult<Vec<User>> {
        let users = self.users.read().await;
        let mut matched: Vec<User> = users.values().filter(|u| u.role == role).cloned().collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }

    async fn patient_profile(&self, id: Uuid) -> EhrResult<Option<PatientProfile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn patient_profile_for_user(&self, user_id: Uuid) -> EhrResult<Option<PatientProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn search_patients(&self, query: &str) -> EhrResult<Vec<(PatientProfile, User)>> {
        let users = self.users.read().await;
        let profiles = self.profiles.read().await;
        let needle = query.to_lowercase();
        let mut matched: Vec<(PatientProfile, User)> = profiles
            .values()
            .filter_map(|profile| users.get(&profile.user_id).map(|u| (profile.clone(), u.clone())))
            .filter(|(_, user)| {
                user.id.to_string() == query || user.name.to_lowercase().contains(&needle)
            })
            .collect();
        matched.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(matched)
    }

    async fn insert_appointment(&self, appointment: Appointment) -> EhrResult<Appointment> {
        {
            let profiles = self.profiles.read().await;
            if !profiles.contains_key(&appointment.patient_id) {
                return Err(EhrError::Storage(format!(
                    "no patient profile {} for appointment",
                    appointment.patient_id
                )));
            }
        }
        {
            let users = self.users.read().await;
            if !users.contains_key(&appointment.doctor_id) {
                return Err(EhrError::Storage(format!(
                    "no doctor {} for appointment",
                    appointment.doctor_id
                )));
            }
        }
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn all_appointments(&self) -> EhrResult<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut all: Vec<Appointment> = appointments.values().cloned().collect();
        all.sort_by(|a, b| a.datetime.cmp(&b.datetime));
        Ok(all)
    }

    async fn appointments_for_patient_user(&self, user_id: Uuid) -> EhrResult<Vec<Appointment>> {
        let profiles = self.profiles.read().await;
        let appointments = self.appointments.read().await;
        let mut own: Vec<Appointment> = appointments
            .values()
            .filter(|a| {
                profiles
                    .get(&a.patient_id)
                    .map(|p| p.user_id == user_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        own.sort_by(|a, b| a.datetime.cmp(&b.datetime));
        Ok(own)
    }

    async fn doctor_appointments_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EhrResult<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut matched: Vec<Appointment> = appointments
            .values()
            .filter(|a| {
                a.doctor_id == doctor_id
                    && a.status == AppointmentStatus::Scheduled
                    && a.datetime >= from
                    && a.datetime <= to
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.datetime.cmp(&b.datetime));
        Ok(matched)
    }

    async fn insert_record(&self, record: MedicalRecord) -> EhrResult<MedicalRecord> {
        {
            let users = self.users.read().await;
            if !users.contains_key(&record.user_id) {
                return Err(EhrError::Storage(format!(
                    "no subject user {} for medical record",
                    record.user_id
                )));
            }
        }
        let mut tables = self.records.write().await;
        tables.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn create_encounter(
        &self,
        record: MedicalRecord,
        tests: Vec<LabTest>,
        referrals: Vec<Referral>,
    ) -> EhrResult<MedicalRecord> {
        {
            let users = self.users.read().await;
            if !users.contains_key(&record.user_id) {
                return Err(EhrError::Storage(format!(
                    "no subject user {} for encounter",
                    record.user_id
                )));
            }
        }
        // All side rows must reference the record being created; a
        // mismatch aborts before anything is written.
        if let Some(t) = tests.iter().find(|t| t.record_id != record.id) {
            return Err(EhrError::Storage(format!(
                "test {} does not reference encounter record {}",
                t.id, record.id
            )));
        }
        if let Some(r) = referrals.iter().find(|r| r.record_id != record.id) {
            return Err(EhrError::Storage(format!(
                "referral {} does not reference encounter record {}",
                r.id, record.id
            )));
        }

        let mut tables = self.records.write().await;
        tables.records.insert(record.id, record.clone());
        for test in tests {
            tables.tests.insert(test.id, test);
        }
        for referral in referrals {
            tables.referrals.insert(referral.id, referral);
        }
        debug!("persisted encounter record {}", record.id);
        Ok(record)
    }

    async fn records_for_subject(&self, user_id: Uuid) -> EhrResult<Vec<MedicalRecord>> {
        let tables = self.records.read().await;
        let mut own: Vec<MedicalRecord> = tables
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut own);
        Ok(own)
    }

    async fn all_records(&self) -> EhrResult<Vec<MedicalRecord>> {
        let tables = self.records.read().await;
        let mut all: Vec<MedicalRecord> = tables.records.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    async fn tests_for_record(&self, record_id: Uuid) -> EhrResult<Vec<LabTest>> {
        let tables = self.records.read().await;
        Ok(tables
            .tests
            .values()
            .filter(|t| t.record_id == record_id)
            .cloned()
            .collect())
    }

    async fn referrals_for_record(&self, record_id: Uuid) -> EhrResult<Vec<Referral>> {
        let tables = self.records.read().await;
        Ok(tables
            .referrals
            .values()
            .filter(|r| r.record_id == record_id)
            .cloned()
            .collect())
    }
}

// ehr_services/src/appointments/appointments.rs
//! Appointment Manager: create and list scheduling records tied to a
//! patient and a doctor.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{Appointment, AppointmentStatus, AuthContext, EhrError, EhrResult, Role};

use crate::authorization;
use crate::storage::EhrStore;

/// Request body for creating an appointment. Both `doctorId` and
/// `datetime` are required; they are optional here so that their absence
/// surfaces as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub doctor_id: Option<String>,
    pub datetime: Option<String>,
    pub notes: Option<String>,
}

/// An appointment joined with the patient and doctor display names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub datetime: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub patient_name: String,
    pub doctor_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorBrief {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppointmentService {
    store: Arc<dyn EhrStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn EhrStore>) -> Self {
        Self { store }
    }

    /// Books an appointment for the calling patient. The caller must own a
    /// patient profile; the appointment starts out SCHEDULED.
    pub async fn create(
        &self,
        ctx: Option<&AuthContext>,
        req: NewAppointment,
    ) -> EhrResult<AppointmentView> {
        let ctx = authorization::require_session(ctx)?;

        let doctor_id = req
            .doctor_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EhrError::Validation("doctorId is required".to_string()))?;
        let datetime = req
            .datetime
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EhrError::Validation("datetime is required".to_string()))?;
        let doctor_id = Uuid::parse_str(doctor_id)?;
        let datetime = DateTime::parse_from_rfc3339(datetime)?.with_timezone(&Utc);

        let profile = self
            .store
            .patient_profile_for_user(ctx.user_id)
            .await?
            .ok_or_else(|| EhrError::NotFound("Patient profile".to_string()))?;

        let appointment = Appointment::new(profile.id, doctor_id, datetime, req.notes);
        info!(
            "booking appointment {} for patient {} with doctor {}",
            appointment.id, ctx.user_id, doctor_id
        );
        let appointment = self.store.insert_appointment(appointment).await?;
        self.view(appointment).await
    }

    /// Lists appointments visible to the caller: patients see their own,
    /// doctors and admins see all.
    pub async fn list(&self, ctx: Option<&AuthContext>) -> EhrResult<Vec<AppointmentView>> {
        let ctx = authorization::require_session(ctx)?;
        let appointments = match authorization::subject_scope(ctx) {
            Some(user_id) => self.store.appointments_for_patient_user(user_id).await?,
            None => self.store.all_appointments().await?,
        };
        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            views.push(self.view(appointment).await?);
        }
        Ok(views)
    }

    /// All DOCTOR-role users as `{id, name}` pairs, for booking forms.
    pub async fn list_doctors(&self, ctx: Option<&AuthContext>) -> EhrResult<Vec<DoctorBrief>> {
        authorization::require_session(ctx)?;
        let doctors = self.store.users_by_role(Role::Doctor).await?;
        Ok(doctors
            .into_iter()
            .map(|u| DoctorBrief { id: u.id, name: u.name })
            .collect())
    }

    async fn view(&self, appointment: Appointment) -> EhrResult<AppointmentView> {
        let profile = self
            .store
            .patient_profile(appointment.patient_id)
            .await?
            .ok_or_else(|| {
                EhrError::Internal(format!(
                    "appointment {} references missing patient profile",
                    appointment.id
                ))
            })?;
        let patient = self.store.user(profile.user_id).await?.ok_or_else(|| {
            EhrError::Internal(format!("patient profile {} references missing user", profile.id))
        })?;
        let doctor = self.store.user(appointment.doctor_id).await?.ok_or_else(|| {
            EhrError::Internal(format!(
                "appointment {} references missing doctor",
                appointment.id
            ))
        })?;
        Ok(AppointmentView {
            id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            datetime: appointment.datetime,
            notes: appointment.notes,
            status: appointment.status,
            patient_name: patient.name,
            doctor_name: doctor.name,
            created_at: appointment.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use models::{PatientProfile, User};

    async fn setup() -> (AppointmentService, Arc<dyn EhrStore>, AuthContext, AuthContext, User) {
        let store: Arc<dyn EhrStore> = Arc::new(InMemoryStore::new());
        let patient = User::new("Jane Doe", "jane@demo.com", Role::Patient);
        let doctor = User::new("Dr. John Smith", "doctor@demo.com", Role::Doctor);
        let profile = PatientProfile::new(
            patient.id,
            chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            Some("O+".to_string()),
            None,
        );
        store.insert_user(patient.clone()).await.unwrap();
        store.insert_user(doctor.clone()).await.unwrap();
        store.insert_patient_profile(profile).await.unwrap();
        let patient_ctx = AuthContext::new(patient.id, Role::Patient);
        let doctor_ctx = AuthContext::new(doctor.id, Role::Doctor);
        (
            AppointmentService::new(store.clone()),
            store,
            patient_ctx,
            doctor_ctx,
            doctor,
        )
    }

    fn booking(doctor: &User, datetime: &str) -> NewAppointment {
        NewAppointment {
            doctor_id: Some(doctor.id.to_string()),
            datetime: Some(datetime.to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn should_book_scheduled_appointment_with_joined_names() {
        let (service, _store, patient_ctx, _doctor_ctx, doctor) = setup().await;
        let view = service
            .create(Some(&patient_ctx), booking(&doctor, "2025-03-01T10:00:00Z"))
            .await
            .unwrap();
        assert_eq!(view.status, AppointmentStatus::Scheduled);
        assert_eq!(view.doctor_id, doctor.id);
        assert_eq!(view.patient_name, "Jane Doe");
        assert_eq!(view.doctor_name, "Dr. John Smith");
    }

    #[tokio::test]
    async fn should_reject_missing_datetime_without_inserting() {
        let (service, store, patient_ctx, doctor_ctx, doctor) = setup().await;
        let req = NewAppointment {
            doctor_id: Some(doctor.id.to_string()),
            datetime: None,
            notes: None,
        };
        let err = service.create(Some(&patient_ctx), req).await.unwrap_err();
        assert!(matches!(err, EhrError::Validation(_)));
        assert!(store.all_appointments().await.unwrap().is_empty());
        assert!(service.list(Some(&doctor_ctx)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_unparseable_datetime() {
        let (service, _store, patient_ctx, _doctor_ctx, doctor) = setup().await;
        let err = service
            .create(Some(&patient_ctx), booking(&doctor, "next tuesday"))
            .await
            .unwrap_err();
        assert!(matches!(err, EhrError::Validation(_)));
    }

    #[tokio::test]
    async fn should_fail_when_caller_has_no_patient_profile() {
        let (service, _store, _patient_ctx, doctor_ctx, doctor) = setup().await;
        let err = service
            .create(Some(&doctor_ctx), booking(&doctor, "2025-03-01T10:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(err, EhrError::NotFound("Patient profile".to_string()));
    }

    #[tokio::test]
    async fn should_require_session_for_every_operation() {
        let (service, _store, _patient_ctx, _doctor_ctx, doctor) = setup().await;
        assert_eq!(
            service
                .create(None, booking(&doctor, "2025-03-01T10:00:00Z"))
                .await
                .unwrap_err(),
            EhrError::Unauthorized
        );
        assert_eq!(service.list(None).await.unwrap_err(), EhrError::Unauthorized);
        assert_eq!(service.list_doctors(None).await.unwrap_err(), EhrError::Unauthorized);
    }

    #[tokio::test]
    async fn should_scope_patient_lists_to_their_own_appointments() {
        let (service, store, patient_ctx, doctor_ctx, doctor) = setup().await;

        // A second patient with their own booking.
        let other = User::new("Bob Roberts", "bob@demo.com", Role::Patient);
        let other_profile = PatientProfile::new(
            other.id,
            chrono::NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
            None,
            None,
        );
        store.insert_user(other.clone()).await.unwrap();
        store.insert_patient_profile(other_profile).await.unwrap();
        let other_ctx = AuthContext::new(other.id, Role::Patient);

        service
            .create(Some(&patient_ctx), booking(&doctor, "2025-03-01T10:00:00Z"))
            .await
            .unwrap();
        service
            .create(Some(&other_ctx), booking(&doctor, "2025-03-02T11:00:00Z"))
            .await
            .unwrap();

        let own = service.list(Some(&patient_ctx)).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].patient_name, "Jane Doe");

        let all = service.list(Some(&doctor_ctx)).await.unwrap();
        assert_eq!(all.len(), 2);

        let admin_ctx = AuthContext::new(Uuid::new_v4(), Role::Admin);
        assert_eq!(service.list(Some(&admin_ctx)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_list_only_doctor_role_users() {
        let (service, _store, patient_ctx, _doctor_ctx, doctor) = setup().await;
        let doctors = service.list_doctors(Some(&patient_ctx)).await.unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].id, doctor.id);
        assert_eq!(doctors[0].name, "Dr. John Smith");
    }
}

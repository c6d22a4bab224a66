// ehr_services/src/records/records.rs
//! Medical Record Store: role-scoped listing and direct creation of
//! diagnosis notes.
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{AuthContext, EhrError, EhrResult, MedicalRecord, RecordType, User};

use crate::authorization;
use crate::storage::EhrStore;

/// Request body for directly creating a record. Every field is optional;
/// defaults are documented on `create`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
}

/// A medical record joined with its subject user.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: MedicalRecord,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct RecordService {
    store: Arc<dyn EhrStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn EhrStore>) -> Self {
        Self { store }
    }

    /// Newest-first records visible to the caller: patients see only
    /// records where they are the subject, doctors and admins see all.
    pub async fn list(&self, ctx: Option<&AuthContext>) -> EhrResult<Vec<RecordView>> {
        let ctx = authorization::require_session(ctx)?;
        let records = match authorization::subject_scope(ctx) {
            Some(user_id) => self.store.records_for_subject(user_id).await?,
            None => self.store.all_records().await?,
        };
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let user = self.store.user(record.user_id).await?.ok_or_else(|| {
                EhrError::Internal(format!("record {} references missing subject", record.id))
            })?;
            views.push(RecordView { record, user });
        }
        Ok(views)
    }

    /// Creates a GENERAL record. Any authenticated role may call this.
    /// `diagnosis` and `prescription` default to "N/A", `notes` to the
    /// empty string; the subject defaults to the caller. A supplied
    /// `doctorId` is attached as given, with no check that it names a
    /// DOCTOR-role user.
    pub async fn create(&self, ctx: Option<&AuthContext>, req: NewRecord) -> EhrResult<RecordView> {
        let ctx = authorization::require_session(ctx)?;
        let subject = req.user_id.unwrap_or(ctx.user_id);
        let record = MedicalRecord::new(
            subject,
            req.doctor_id,
            RecordType::General,
            req.diagnosis.unwrap_or_else(|| "N/A".to_string()),
            req.prescription.unwrap_or_else(|| "N/A".to_string()),
            req.notes.unwrap_or_default(),
        );
        info!("creating medical record {} for subject {}", record.id, subject);
        let record = self.store.insert_record(record).await?;
        let user = self.store.user(record.user_id).await?.ok_or_else(|| {
            EhrError::Internal(format!("record {} references missing subject", record.id))
        })?;
        Ok(RecordView { record, user })
    }
}

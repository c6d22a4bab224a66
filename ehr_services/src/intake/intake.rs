// ehr_services/src/intake/intake.rs
//! Scripted Intake Flow: a fixed two-turn question/answer exchange. There
//! is no model behind it; the stored "diagnosis" is a literal tag and the
//! patient's free-text answer lands in the record notes.
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use models::{AuthContext, EhrResult, MedicalRecord, RecordType};

use crate::authorization;
use crate::storage::EhrStore;

/// The single fixed prompt of the start turn.
pub const INTAKE_QUESTION: &str = "Describe your problem";
/// Closing message after the answer has been stored.
pub const INTAKE_CLOSING: &str =
    "Thank you for your response. Your information has been recorded.";
/// Dead-end message for a thread id with no response attached.
pub const INTAKE_DEAD_END: &str = "An error occurred. Please start a new conversation.";

const INTAKE_DIAGNOSIS: &str = "AI Diagnosis Session";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub thread_id: Option<String>,
    pub user_response: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReply {
    pub thread_id: String,
    pub question: String,
    pub exit_code: bool,
}

#[derive(Debug, Clone)]
pub struct IntakeService {
    store: Arc<dyn EhrStore>,
}

impl IntakeService {
    pub fn new(store: Arc<dyn EhrStore>) -> Self {
        Self { store }
    }

    /// Advances the two-state dialogue. Start (no thread id) hands out the
    /// fixed prompt and persists nothing; Complete (response present)
    /// stores one AI_DIAGNOSIS record with the caller as both subject and
    /// doctor; any other shape is a dead end that persists nothing.
    pub async fn step(
        &self,
        ctx: Option<&AuthContext>,
        req: IntakeRequest,
    ) -> EhrResult<IntakeReply> {
        let ctx = authorization::require_session(ctx)?;

        // Empty strings count as absent, matching the form behavior.
        let thread_id = req.thread_id.filter(|s| !s.is_empty());
        let user_response = req.user_response.filter(|s| !s.is_empty());

        let Some(thread_id) = thread_id else {
            // The caller's own identity doubles as the thread id; the
            // start turn is stateless and repeatable.
            return Ok(IntakeReply {
                thread_id: ctx.user_id.to_string(),
                question: INTAKE_QUESTION.to_string(),
                exit_code: false,
            });
        };

        if let Some(response) = user_response {
            let record = MedicalRecord::new(
                ctx.user_id,
                Some(ctx.user_id),
                RecordType::AiDiagnosis,
                INTAKE_DIAGNOSIS,
                "N/A",
                format!("Patient's Description: {}", response),
            );
            info!("storing intake session {} for user {}", record.id, ctx.user_id);
            self.store.insert_record(record).await?;
            return Ok(IntakeReply {
                thread_id,
                question: INTAKE_CLOSING.to_string(),
                exit_code: true,
            });
        }

        Ok(IntakeReply {
            thread_id,
            question: INTAKE_DEAD_END.to_string(),
            exit_code: true,
        })
    }
}

// server/src/rest/handlers.rs
//! One handler per exposed operation. Handlers stay thin: pass the
//! resolved session and the parsed body into the owning service, then map
//! the outcome onto a JSON reply with the matching status code.
use std::sync::Arc;

use log::error;
use serde::Serialize;
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Rejection;

use ehr_services::appointments::NewAppointment;
use ehr_services::encounters::{ContextQuery, EncounterDraft};
use ehr_services::intake::IntakeRequest;
use ehr_services::records::NewRecord;
use models::{AuthContext, EhrError, EhrResult};

use crate::rest::rest_api::ApiContext;

/// Unified success return type for our API handlers
pub type ApiReply = Result<WithStatus<Json>, Rejection>;

fn status_for(err: &EhrError) -> StatusCode {
    match err {
        EhrError::Unauthorized => StatusCode::UNAUTHORIZED,
        EhrError::Validation(_) => StatusCode::BAD_REQUEST,
        EhrError::NotFound(_) => StatusCode::NOT_FOUND,
        EhrError::Storage(_) | EhrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: EhrResult<T>) -> ApiReply {
    match result {
        Ok(value) => Ok(warp::reply::with_status(warp::reply::json(&value), StatusCode::OK)),
        Err(err) => {
            let status = status_for(&err);
            // Unexpected failures are logged with their cause; the caller
            // only ever sees a generic message.
            let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
                error!("request failed: {}", err);
                json!({ "error": "Internal Server Error" })
            } else {
                json!({ "error": err.to_string() })
            };
            Ok(warp::reply::with_status(warp::reply::json(&body), status))
        }
    }
}

pub async fn create_appointment(
    api: Arc<ApiContext>,
    ctx: Option<AuthContext>,
    body: NewAppointment,
) -> ApiReply {
    respond(api.appointments.create(ctx.as_ref(), body).await)
}

pub async fn list_appointments(api: Arc<ApiContext>, ctx: Option<AuthContext>) -> ApiReply {
    respond(api.appointments.list(ctx.as_ref()).await)
}

pub async fn list_doctors(api: Arc<ApiContext>, ctx: Option<AuthContext>) -> ApiReply {
    respond(api.appointments.list_doctors(ctx.as_ref()).await)
}

pub async fn encounter_context(
    api: Arc<ApiContext>,
    ctx: Option<AuthContext>,
    query: ContextQuery,
) -> ApiReply {
    respond(api.encounters.doctor_context(ctx.as_ref(), query).await)
}

pub async fn record_encounter(
    api: Arc<ApiContext>,
    ctx: Option<AuthContext>,
    draft: EncounterDraft,
) -> ApiReply {
    respond(api.encounters.record(ctx.as_ref(), draft).await)
}

pub async fn list_records(api: Arc<ApiContext>, ctx: Option<AuthContext>) -> ApiReply {
    respond(api.records.list(ctx.as_ref()).await)
}

pub async fn create_record(
    api: Arc<ApiContext>,
    ctx: Option<AuthContext>,
    body: NewRecord,
) -> ApiReply {
    respond(api.records.create(ctx.as_ref(), body).await)
}

pub async fn intake_step(
    api: Arc<ApiContext>,
    ctx: Option<AuthContext>,
    req: IntakeRequest,
) -> ApiReply {
    respond(api.intake.step(ctx.as_ref(), req).await)
}

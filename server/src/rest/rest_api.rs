// server/src/rest/rest_api.rs
//! Route wiring for the EHR API.
use std::convert::Infallible;
use std::sync::Arc;

use serde_json::json;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use ehr_services::{
    AppointmentService, EhrStore, EncounterService, IntakeService, RecordService,
};
use models::AuthContext;

use crate::rest::handlers;
use crate::rest::session;

/// The service bundle every handler receives.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub appointments: AppointmentService,
    pub encounters: EncounterService,
    pub records: RecordService,
    pub intake: IntakeService,
}

impl ApiContext {
    pub fn new(store: Arc<dyn EhrStore>) -> Self {
        ApiContext {
            appointments: AppointmentService::new(store.clone()),
            encounters: EncounterService::new(store.clone()),
            records: RecordService::new(store.clone()),
            intake: IntakeService::new(store),
        }
    }
}

// Helper to inject the service bundle into Warp filters
fn with_api(
    api: Arc<ApiContext>,
) -> impl Filter<Extract = (Arc<ApiContext>,), Error = Infallible> + Clone {
    warp::any().map(move || api.clone())
}

// Resolves the identity-provider headers into an optional session.
fn with_session() -> impl Filter<Extract = (Option<AuthContext>,), Error = Rejection> + Clone {
    warp::header::optional::<String>(session::USER_ID_HEADER)
        .and(warp::header::optional::<String>(session::USER_ROLE_HEADER))
        .map(|user_id: Option<String>, role: Option<String>| {
            session::resolve(user_id.as_deref(), role.as_deref())
        })
}

/// Builds the full route tree.
pub fn routes(
    api: Arc<ApiContext>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let create_appointment = warp::path!("api" / "appointments" / "create")
        .and(warp::post())
        .and(with_api(api.clone()))
        .and(with_session())
        .and(warp::body::json())
        .and_then(handlers::create_appointment);

    let list_appointments = warp::path!("api" / "appointments")
        .and(warp::get())
        .and(with_api(api.clone()))
        .and(with_session())
        .and_then(handlers::list_appointments);

    let list_doctors = warp::path!("api" / "doctors")
        .and(warp::get())
        .and(with_api(api.clone()))
        .and(with_session())
        .and_then(handlers::list_doctors);

    let encounter_context = warp::path!("api" / "encounters")
        .and(warp::get())
        .and(with_api(api.clone()))
        .and(with_session())
        .and(warp::query())
        .and_then(handlers::encounter_context);

    let record_encounter = warp::path!("api" / "encounters")
        .and(warp::post())
        .and(with_api(api.clone()))
        .and(with_session())
        .and(warp::body::json())
        .and_then(handlers::record_encounter);

    let list_records = warp::path!("api" / "medical-records")
        .and(warp::get())
        .and(with_api(api.clone()))
        .and(with_session())
        .and_then(handlers::list_records);

    let create_record = warp::path!("api" / "medical-records")
        .and(warp::post())
        .and(with_api(api.clone()))
        .and(with_session())
        .and(warp::body::json())
        .and_then(handlers::create_record);

    let intake = warp::path!("api" / "ai_diagnosis")
        .and(warp::post())
        .and(with_api(api))
        .and(with_session())
        .and(warp::body::json())
        .and_then(handlers::intake_step);

    create_appointment
        .or(list_appointments)
        .unify()
        .or(list_doctors)
        .unify()
        .or(encounter_context)
        .unify()
        .or(record_encounter)
        .unify()
        .or(list_records)
        .unify()
        .or(create_record)
        .unify()
        .or(intake)
        .unify()
        .recover(handle_rejection)
}

// Keeps rejected requests (bad bodies, unknown paths) on the same JSON
// error shape as service failures.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body_err.to_string())
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "invalid query string".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        log::error!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}

// server/tests/api.rs
//! End-to-end tests over the warp route tree: header-based session
//! resolution, status mapping, and the JSON contracts of every exposed
//! operation.
use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use ehr_server::rest::{routes, ApiContext};
use ehr_services::{EhrStore, InMemoryStore};
use models::{PatientProfile, Role, User};

struct TestApp {
    store: Arc<dyn EhrStore>,
    api: Arc<ApiContext>,
    patient: User,
    profile: PatientProfile,
    doctor: User,
}

async fn test_app() -> TestApp {
    let store: Arc<dyn EhrStore> = Arc::new(InMemoryStore::new());
    let patient = User::new("Jane Doe", "patient@demo.com", Role::Patient);
    let doctor = User::new("Dr. John Smith", "doctor@demo.com", Role::Doctor);
    let profile = PatientProfile::new(
        patient.id,
        chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        Some("O+".to_string()),
        Some("None".to_string()),
    );
    store.insert_user(patient.clone()).await.unwrap();
    store.insert_user(doctor.clone()).await.unwrap();
    store.insert_patient_profile(profile.clone()).await.unwrap();
    let api = Arc::new(ApiContext::new(store.clone()));
    TestApp { store, api, patient, profile, doctor }
}

fn body_json<B: AsRef<[u8]>>(response: &warp::http::Response<B>) -> Value {
    serde_json::from_slice(response.body().as_ref()).expect("response body should be JSON")
}

#[tokio::test]
async fn should_reject_requests_without_session_headers() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/api/appointments")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 401);
    assert_eq!(body_json(&response)["error"], "Unauthorized");
}

#[tokio::test]
async fn should_reject_malformed_session_headers() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/api/medical-records")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "SUPERUSER")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn should_book_an_appointment_end_to_end() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/appointments/create")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({
            "doctorId": app.doctor.id.to_string(),
            "datetime": "2025-03-01T10:00:00Z",
            "notes": "first visit"
        }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["status"], "SCHEDULED");
    assert_eq!(body["patientId"], json!(app.profile.id.to_string()));
    assert_eq!(body["doctorId"], json!(app.doctor.id.to_string()));
    assert_eq!(body["patientName"], "Jane Doe");
    assert_eq!(body["doctorName"], "Dr. John Smith");

    let listed = warp::test::request()
        .method("GET")
        .path("/api/appointments")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .reply(&filter)
        .await;
    assert_eq!(listed.status(), 200);
    assert_eq!(body_json(&listed).as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_400_when_datetime_is_missing() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/appointments/create")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({ "doctorId": app.doctor.id.to_string() }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 400);
    assert!(app.store.all_appointments().await.unwrap().is_empty());
}

#[tokio::test]
async fn should_return_404_when_caller_has_no_patient_profile() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/appointments/create")
        .header("x-user-id", app.doctor.id.to_string())
        .header("x-user-role", "DOCTOR")
        .json(&json!({
            "doctorId": app.doctor.id.to_string(),
            "datetime": "2025-03-01T10:00:00Z"
        }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn should_list_doctors_for_any_session() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/api/doctors")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    let doctors = body.as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["name"], "Dr. John Smith");
}

#[tokio::test]
async fn should_reject_encounters_from_non_doctors_without_persisting() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/encounters")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({
            "patientId": app.patient.id.to_string(),
            "diagnosis": "Influenza",
            "prescription": "Oseltamivir",
            "notes": ""
        }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 401);
    assert!(app.store.all_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn should_record_an_encounter_with_tests_and_referrals() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/encounters")
        .header("x-user-id", app.doctor.id.to_string())
        .header("x-user-role", "DOCTOR")
        .json(&json!({
            "patientId": app.patient.id.to_string(),
            "symptoms": "fever, cough",
            "diagnosis": "Influenza",
            "prescription": "Oseltamivir",
            "notes": "Rest and fluids",
            "tests": [
                { "name": "CBC" },
                { "name": "Chest X-ray", "description": "PA view" }
            ],
            "referrals": [
                { "doctorId": app.doctor.id.to_string(), "reason": "Follow-up" }
            ]
        }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["type"], "ENCOUNTER");

    let record_id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
    assert_eq!(app.store.tests_for_record(record_id).await.unwrap().len(), 2);
    assert_eq!(app.store.referrals_for_record(record_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_empty_appointment_half_for_a_quiet_day() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/api/encounters?date=2025-03-01")
        .header("x-user-id", app.doctor.id.to_string())
        .header("x-user-role", "DOCTOR")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["appointments"], json!([]));
    assert!(body.get("patients").is_none());
}

#[tokio::test]
async fn should_scope_medical_records_by_role() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    // One record for the patient, one for another subject.
    warp::test::request()
        .method("POST")
        .path("/api/medical-records")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({ "diagnosis": "Migraine" }))
        .reply(&filter)
        .await;
    warp::test::request()
        .method("POST")
        .path("/api/medical-records")
        .header("x-user-id", app.doctor.id.to_string())
        .header("x-user-role", "DOCTOR")
        .json(&json!({ "userId": app.doctor.id.to_string() }))
        .reply(&filter)
        .await;

    let own = warp::test::request()
        .method("GET")
        .path("/api/medical-records")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .reply(&filter)
        .await;
    let own_body = body_json(&own);
    assert_eq!(own_body.as_array().unwrap().len(), 1);
    assert_eq!(own_body[0]["diagnosis"], "Migraine");
    assert_eq!(own_body[0]["user"]["name"], "Jane Doe");

    let all = warp::test::request()
        .method("GET")
        .path("/api/medical-records")
        .header("x-user-id", app.doctor.id.to_string())
        .header("x-user-role", "DOCTOR")
        .reply(&filter)
        .await;
    assert_eq!(body_json(&all).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn should_default_record_fields_on_create() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/medical-records")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({}))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["diagnosis"], "N/A");
    assert_eq!(body["prescription"], "N/A");
    assert_eq!(body["notes"], "");
    assert_eq!(body["type"], "GENERAL");
}

#[tokio::test]
async fn should_walk_the_intake_flow_end_to_end() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let start = warp::test::request()
        .method("POST")
        .path("/api/ai_diagnosis")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({}))
        .reply(&filter)
        .await;
    assert_eq!(start.status(), 200);
    let start_body = body_json(&start);
    assert_eq!(start_body["question"], "Describe your problem");
    assert_eq!(start_body["exitCode"], json!(false));
    assert_eq!(start_body["threadId"], json!(app.patient.id.to_string()));

    let done = warp::test::request()
        .method("POST")
        .path("/api/ai_diagnosis")
        .header("x-user-id", app.patient.id.to_string())
        .header("x-user-role", "PATIENT")
        .json(&json!({
            "threadId": app.patient.id.to_string(),
            "userResponse": "headache"
        }))
        .reply(&filter)
        .await;
    assert_eq!(done.status(), 200);
    assert_eq!(body_json(&done)["exitCode"], json!(true));

    let records = app.store.all_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].notes.contains("headache"));
}

#[tokio::test]
async fn should_return_400_for_an_unreadable_body() {
    let app = test_app().await;
    let filter = routes(app.api.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/encounters")
        .header("x-user-id", app.doctor.id.to_string())
        .header("x-user-role", "DOCTOR")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), 400);
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AbsenceId, AbsenceReport, FacultyId, ScheduleSlot};
use super::service::{SubstitutionService, SubstitutionServiceError};

/// Body accepted when a faculty member saves their weekly routine.
#[derive(Debug, Deserialize)]
pub struct ScheduleUpdate {
    pub slots: Vec<ScheduleSlot>,
}

/// Router builder exposing absence reporting and substitution lookups.
pub fn substitution_router(service: Arc<SubstitutionService>) -> Router {
    Router::new()
        .route("/api/v1/absences", post(report_handler))
        .route("/api/v1/absences/:absence_id", get(absence_handler))
        .route("/api/v1/substitutions/active", get(active_handler))
        .route(
            "/api/v1/faculty/:faculty_uid/substitutions",
            get(faculty_substitutions_handler),
        )
        .route(
            "/api/v1/faculty/:faculty_uid/schedule",
            get(schedule_handler).put(save_schedule_handler),
        )
        .with_state(service)
}

fn error_response(error: SubstitutionServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status_code(), axum::Json(payload)).into_response()
}

pub(crate) async fn report_handler(
    State(service): State<Arc<SubstitutionService>>,
    axum::Json(report): axum::Json<AbsenceReport>,
) -> Response {
    match service.report_absence(report) {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn absence_handler(
    State(service): State<Arc<SubstitutionService>>,
    Path(absence_id): Path<String>,
) -> Response {
    match service.absence(&AbsenceId(absence_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn active_handler(State(service): State<Arc<SubstitutionService>>) -> Response {
    match service.active_substitutions() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn faculty_substitutions_handler(
    State(service): State<Arc<SubstitutionService>>,
    Path(faculty_uid): Path<String>,
) -> Response {
    match service.substitutions_for(&FacultyId(faculty_uid)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schedule_handler(
    State(service): State<Arc<SubstitutionService>>,
    Path(faculty_uid): Path<String>,
) -> Response {
    let faculty_uid = FacultyId(faculty_uid);
    match service.schedule(&faculty_uid) {
        Ok(Some(schedule)) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": format!("no schedule saved for {faculty_uid}"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_schedule_handler(
    State(service): State<Arc<SubstitutionService>>,
    Path(faculty_uid): Path<String>,
    axum::Json(update): axum::Json<ScheduleUpdate>,
) -> Response {
    match service.save_schedule(&FacultyId(faculty_uid), update.slots) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Err(error) => error_response(error),
    }
}

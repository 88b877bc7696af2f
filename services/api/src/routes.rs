use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use staffdesk::error::AppError;
use staffdesk::workflows::substitution::{substitution_router, SubstitutionService};
use std::sync::Arc;

pub(crate) fn with_substitution_routes(service: Arc<SubstitutionService>) -> axum::Router {
    substitution_router(service.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/stats",
            axum::routing::get(move || stats_endpoint(service.clone())),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Dashboard counters for the substitution workflow.
pub(crate) async fn stats_endpoint(
    service: Arc<SubstitutionService>,
) -> Result<Json<serde_json::Value>, AppError> {
    let active = service.active_substitution_count()?;
    Ok(Json(json!({ "active_substitutions": active })))
}

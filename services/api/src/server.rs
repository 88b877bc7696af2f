use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBackend};
use crate::routes::with_substitution_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use staffdesk::config::AppConfig;
use staffdesk::error::AppError;
use staffdesk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend = InMemoryBackend::new();
    if !args.no_seed {
        if let Err(err) = backend.seed_sample_roster() {
            warn!(error = %err, "sample roster could not be seeded");
        }
    }
    let service = Arc::new(backend.service(&config.substitution));

    let app = with_substitution_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        affinity_bonus = config.substitution.affinity_bonus,
        load_penalty = config.substitution.load_penalty,
        "substitution service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{default_resolver_config, AppState, InMemoryDossierRepository};
use crate::routes::with_dossier_routes;
use artisan_ops::config::AppConfig;
use artisan_ops::error::AppError;
use artisan_ops::telemetry;
use artisan_ops::workflows::dossier::DossierService;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let repository = Arc::new(InMemoryDossierRepository::default());
    let dossier_service = Arc::new(DossierService::new(repository, default_resolver_config()));

    let app = with_dossier_routes(dossier_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "artisan back-office service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::infra::AppState;
use artisan_ops::error::AppError;
use artisan_ops::workflows::dossier::{
    dossier_router, Dossier, DossierId, DossierRepository, DossierService, Inconsistency,
    NextActionResolver, Recommendation, SnapshotInspector,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct NextActionPreviewRequest {
    pub(crate) dossier: Dossier,
    /// Pin the resolver clock (RFC 3339); defaults to the current instant.
    #[serde(default)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NextActionPreviewResponse {
    pub(crate) dossier_id: DossierId,
    pub(crate) as_of: DateTime<Utc>,
    pub(crate) recommendation: Option<Recommendation>,
    pub(crate) findings: Vec<Inconsistency>,
}

pub(crate) fn with_dossier_routes<R>(service: Arc<DossierService<R>>) -> axum::Router
where
    R: DossierRepository + 'static,
{
    dossier_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/next-action/preview",
            axum::routing::post(next_action_preview_endpoint),
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

/// Stateless preview: resolve a snapshot without registering it.
pub(crate) async fn next_action_preview_endpoint(
    Json(payload): Json<NextActionPreviewRequest>,
) -> Result<Json<NextActionPreviewResponse>, AppError> {
    let NextActionPreviewRequest { dossier, as_of } = payload;

    let as_of = as_of.unwrap_or_else(Utc::now);
    let findings = SnapshotInspector::new().findings(&dossier);
    let recommendation = NextActionResolver::default().resolve(&dossier, as_of);

    Ok(Json(NextActionPreviewResponse {
        dossier_id: dossier.id,
        as_of,
        recommendation,
        findings,
    }))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::DossierId;
use super::repository::{DossierRepository, RepositoryError};
use super::service::{DossierService, DossierServiceError, DossierSubmission};

/// Router builder exposing HTTP endpoints for registration and resolution.
pub fn dossier_router<R>(service: Arc<DossierService<R>>) -> Router
where
    R: DossierRepository + 'static,
{
    Router::new()
        .route("/api/v1/dossiers", post(register_handler::<R>))
        .route("/api/v1/dossiers/:dossier_id", get(get_handler::<R>))
        .route(
            "/api/v1/dossiers/:dossier_id/next-action",
            get(next_action_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NextActionQuery {
    /// Pin the resolver clock (RFC 3339); defaults to the current instant.
    pub(crate) as_of: Option<DateTime<Utc>>,
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<DossierService<R>>>,
    axum::Json(submission): axum::Json<DossierSubmission>,
) -> Response
where
    R: DossierRepository + 'static,
{
    match service.register(submission) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(DossierServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "dossier already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<DossierService<R>>>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
{
    let id = DossierId(dossier_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(DossierServiceError::NotFound) => {
            let payload = json!({
                "error": "dossier not found",
                "dossier_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn next_action_handler<R>(
    State(service): State<Arc<DossierService<R>>>,
    Path(dossier_id): Path<String>,
    Query(query): Query<NextActionQuery>,
) -> Response
where
    R: DossierRepository + 'static,
{
    let id = DossierId(dossier_id);
    match service.next_action(&id, query.as_of) {
        Ok(recommendation) => {
            let payload = json!({
                "dossier_id": id.0,
                "recommendation": recommendation,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(DossierServiceError::NotFound) => {
            let payload = json!({
                "error": "dossier not found",
                "dossier_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

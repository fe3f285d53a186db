//! HTTP route handlers for the discovery API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discovery::types::ScrapingResult;
use crate::profile::UserProfile;
use crate::storage::import::{import_scraped_data, ImportReport};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/discover", post(discover))
        .route("/api/import", post(import))
        .route("/api/opportunities", get(list_opportunities))
        .route("/api/startups", get(list_startups))
        .route("/api/events", get(list_events))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "seedscout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Discovery request: the profile to scrape for.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    /// Profile driving the run.
    pub profile: UserProfile,
}

/// Handle discovery requests.
///
/// The pipeline never fails; a degraded run is visible through the
/// per-item provenance fields.
async fn discover(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscoverRequest>,
) -> Json<ScrapingResult> {
    let result = state.discovery.scrape_for_user(&request.profile).await;
    Json(result)
}

/// Import request: a discovery result (usually filtered by the caller to
/// the selected items) plus the importing user.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Items to persist.
    pub result: ScrapingResult,
    /// User who owns the imported records.
    pub user_id: Uuid,
}

/// Import response.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Per-category counts and per-item errors.
    pub report: ImportReport,
}

/// Handle import requests.
async fn import(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> Json<ImportResponse> {
    let report = import_scraped_data(
        state.storage.as_ref(),
        &state.embedder,
        state.config.embed_description_threshold,
        &request.result,
        request.user_id,
    )
    .await;
    Json(ImportResponse { report })
}

/// List persisted opportunities.
async fn list_opportunities(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = state
        .storage
        .list_opportunities()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("storage error: {e}")))?;
    Ok(Json(records))
}

/// List persisted startups.
async fn list_startups(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = state
        .storage
        .list_startups()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("storage error: {e}")))?;
    Ok(Json(records))
}

/// List persisted events.
async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = state
        .storage
        .list_events()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("storage error: {e}")))?;
    Ok(Json(records))
}

//! REST handlers for the Technology Radar pipeline.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{info, warn};

use praxis_common::Ring;
use praxis_radar::orchestrator::DEMO_TECHNIQUE_PATHS;
use praxis_radar::RadarIngest;

use super::error_body;
use crate::AppState;

/// POST /radar/ingest/technique/{name}: run the pipeline for one technique.
pub async fn ingest_technique(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    info!(technique = %name, "Starting technique ingestion");
    let run = state.pipeline.run_single(&name).await;

    if run.success {
        Json(serde_json::json!({
            "message": format!("Successfully ingested technique: {name}"),
            "technique": run.technique,
            "entities_created": run.entities_created,
            "radar_technique_created": run.radar_technique_created,
            "errors": run.errors,
        }))
        .into_response()
    } else {
        let reason = run.error.unwrap_or_else(|| "Unknown error".to_string());
        (
            StatusCode::BAD_REQUEST,
            error_body(&format!("Failed to ingest technique: {reason}")),
        )
            .into_response()
    }
}

/// POST /radar/ingest/demo: ingest a small curated set of techniques.
pub async fn run_demo(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Starting demo radar ingestion");
    let paths = DEMO_TECHNIQUE_PATHS.iter().map(|p| p.to_string()).collect();
    let run = state.pipeline.run_full(Some(paths)).await;

    Json(serde_json::json!({
        "message": "Demo ingestion completed",
        "techniques_processed": run.techniques_processed,
        "total_entities_created": run.total_entities_created,
        "duration_seconds": run.duration_seconds,
        "success": run.success,
        "errors": run.errors,
    }))
}

/// GET /radar/status: summary of ingested radar data.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.status().await {
        Ok(status) => Json(serde_json::json!({
            "status": "success",
            "radar_data": status,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to get radar status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to get radar status"),
            )
                .into_response()
        }
    }
}

/// GET /radar/techniques: all stored techniques with influenced practices.
pub async fn techniques(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.ingestor.techniques_summary().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to get radar techniques");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to get radar techniques"),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateRingRequest {
    new_ring: String,
}

/// PUT /radar/techniques/{name}/ring: move a technique to another ring.
pub async fn update_ring(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<UpdateRingRequest>,
) -> impl IntoResponse {
    let ring = match Ring::parse(&body.new_ring) {
        Some(ring) => ring,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                error_body(&format!(
                    "Invalid ring value '{}'. Must be one of: Adopt, Trial, Assess, Hold",
                    body.new_ring
                )),
            )
                .into_response();
        }
    };

    match state.ingestor.update_ring(&name, ring).await {
        Ok(true) => Json(serde_json::json!({
            "message": format!("Updated technique '{name}' ring to '{ring}'"),
            "technique": name,
            "new_ring": ring.as_str(),
        }))
        .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            error_body(&format!("Technique '{name}' not found")),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to update technique ring");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to update technique ring"),
            )
                .into_response()
        }
    }
}

/// GET /radar/techniques/{name}/connections: what a technique reaches in
/// the methodology hierarchy.
pub async fn connections(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.ingestor.technique_connections(&name).await {
        Ok(Some(connections)) => Json(connections).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(&format!("Technique '{name}' not found")),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to get technique connections");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to get technique connections"),
            )
                .into_response()
        }
    }
}

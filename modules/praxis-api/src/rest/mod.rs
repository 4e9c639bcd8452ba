//! REST handlers for the entity CRUD surface.
//!
//! Creation endpoints validate the request body, reject duplicates by name
//! with 409 where the entity kind is name-unique, and return the stored
//! entity with 201. Store failures log the cause and return an opaque 500.

pub mod radar;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{info, warn};

use praxis_common::{
    ContextCreate, EvidenceCreate, MethodologyCreate, PracticeCreate, PraxisError, RuleCreate,
};

use crate::AppState;

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

/// Map a store error to a response, turning validation failures into 400s.
fn store_error(e: PraxisError, context: &str) -> axum::response::Response {
    match e {
        PraxisError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, error_body(&msg)).into_response()
        }
        other => {
            warn!(error = %other, "{context}");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(context)).into_response()
        }
    }
}

// --- Methodologies ---

pub async fn create_methodology(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MethodologyCreate>,
) -> impl IntoResponse {
    match state.methodologies.get_by_name(&body.name).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                error_body(&format!("Methodology '{}' already exists", body.name)),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return store_error(e, "Failed to create methodology"),
    }

    match state.methodologies.create(&body).await {
        Ok(created) => {
            info!(name = %created.name, "Created methodology");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => store_error(e, "Failed to create methodology"),
    }
}

pub async fn list_methodologies(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.methodologies.get_all().await {
        Ok(all) => Json(all).into_response(),
        Err(e) => store_error(e, "Failed to retrieve methodologies"),
    }
}

pub async fn get_methodology(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.methodologies.get_by_name(&name).await {
        Ok(Some(m)) => Json(m).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(&format!("Methodology '{name}' not found")),
        )
            .into_response(),
        Err(e) => store_error(e, "Failed to retrieve methodology"),
    }
}

pub async fn delete_methodology(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.methodologies.delete(&name).await {
        Ok(true) => {
            info!(name = %name, "Deleted methodology");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            error_body(&format!("Methodology '{name}' not found")),
        )
            .into_response(),
        Err(e) => store_error(e, "Failed to delete methodology"),
    }
}

pub async fn get_methodology_full(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.methodologies.get_with_practices(&name).await {
        Ok(Some(detail)) => Json(detail).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(&format!("Methodology '{name}' not found")),
        )
            .into_response(),
        Err(e) => store_error(e, "Failed to retrieve methodology details"),
    }
}

pub async fn get_practices_by_methodology(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.practices.get_by_methodology(&name).await {
        Ok(practices) => Json(practices).into_response(),
        Err(e) => store_error(e, "Failed to retrieve practices"),
    }
}

#[derive(Deserialize)]
pub struct RelatedQuery {
    limit: Option<i64>,
}

pub async fn get_related_methodologies(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<RelatedQuery>,
) -> impl IntoResponse {
    match state.methodologies.get_by_name(&name).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_body(&format!("Methodology '{name}' not found")),
            )
                .into_response();
        }
        Err(e) => return store_error(e, "Failed to retrieve related methodologies"),
    }

    let limit = params.limit.unwrap_or(5).clamp(1, 50);
    match state.methodologies.find_related(&name, limit).await {
        Ok(related) => Json(related).into_response(),
        Err(e) => store_error(e, "Failed to retrieve related methodologies"),
    }
}

// --- Practices ---

pub async fn create_practice(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PracticeCreate>,
) -> impl IntoResponse {
    match state.practices.get_by_name(&body.name).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                error_body(&format!("Practice '{}' already exists", body.name)),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return store_error(e, "Failed to create practice"),
    }

    match state.practices.create(&body).await {
        Ok(created) => {
            info!(name = %created.name, "Created practice");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => store_error(e, "Failed to create practice"),
    }
}

pub async fn get_practice(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.practices.get_by_name(&name).await {
        Ok(Some(p)) => Json(p).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(&format!("Practice '{name}' not found")),
        )
            .into_response(),
        Err(e) => store_error(e, "Failed to retrieve practice"),
    }
}

// --- Rules ---

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RuleCreate>,
) -> impl IntoResponse {
    match state.rules.create(&body).await {
        Ok(created) => {
            info!(name = %created.name, "Created rule");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => store_error(e, "Failed to create rule"),
    }
}

pub async fn get_rules_by_practice(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.rules.get_by_practice(&name).await {
        Ok(rules) => Json(rules).into_response(),
        Err(e) => store_error(e, "Failed to retrieve rules"),
    }
}

pub async fn get_rules_by_context(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.rules.get_by_context(&name).await {
        Ok(rules) => Json(rules).into_response(),
        Err(e) => store_error(e, "Failed to retrieve rules"),
    }
}

#[derive(Deserialize)]
pub struct FindApplicableRequest {
    constraints: Vec<String>,
    #[serde(default)]
    team_size: Option<String>,
}

pub async fn find_applicable_rules(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FindApplicableRequest>,
) -> impl IntoResponse {
    if body.constraints.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("constraints must not be empty"),
        )
            .into_response();
    }

    match state
        .rules
        .find_applicable(&body.constraints, body.team_size.as_deref())
        .await
    {
        Ok(rules) => Json(rules).into_response(),
        Err(e) => store_error(e, "Failed to find applicable rules"),
    }
}

pub async fn get_rules_with_evidence(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.rules.get_with_evidence(&name).await {
        Ok(rules) => Json(rules).into_response(),
        Err(e) => store_error(e, "Failed to retrieve rules with evidence"),
    }
}

// --- Contexts ---

pub async fn create_context(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContextCreate>,
) -> impl IntoResponse {
    match state.contexts.create(&body).await {
        Ok(created) => {
            info!(name = %created.name, "Created context");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => store_error(e, "Failed to create context"),
    }
}

pub async fn list_contexts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.contexts.get_all().await {
        Ok(all) => Json(all).into_response(),
        Err(e) => store_error(e, "Failed to retrieve contexts"),
    }
}

// --- Evidence ---

pub async fn create_evidence(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EvidenceCreate>,
) -> impl IntoResponse {
    match state.evidence.create(&body).await {
        Ok(created) => {
            info!(name = %created.name, "Created evidence");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => store_error(e, "Failed to create evidence"),
    }
}

pub async fn link_evidence_to_rule(
    State(state): State<Arc<AppState>>,
    Path((evidence_name, rule_name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.evidence.link_to_rule(&evidence_name, &rule_name).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            error_body("Evidence or rule not found"),
        )
            .into_response(),
        Err(e) => store_error(e, "Failed to link evidence to rule"),
    }
}

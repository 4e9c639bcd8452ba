use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use praxis_common::Config;
use praxis_graph::{
    ContextRepository, EvidenceRepository, GraphClient, MethodologyRepository,
    PracticeRepository, RuleRepository,
};
use praxis_radar::{GraphIngestor, RadarPipeline, RadarScraper};

mod rest;

use rest::radar;

pub struct AppState {
    pub client: GraphClient,
    pub methodologies: MethodologyRepository,
    pub practices: PracticeRepository,
    pub rules: RuleRepository,
    pub contexts: ContextRepository,
    pub evidence: EvidenceRepository,
    pub ingestor: Arc<GraphIngestor>,
    pub pipeline: RadarPipeline,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Praxis Knowledge Graph API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.client.ping().await {
        Ok(()) => Json(serde_json::json!({
            "status": "healthy",
            "database": "connected",
        })),
        Err(e) => {
            error!(error = %e, "Health check failed");
            Json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string(),
            }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("praxis=info".parse()?))
        .init();

    let config = Config::from_env();

    info!("Connecting to Neo4j at {}", config.neo4j_uri);
    let client =
        GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?;

    let scraper = RadarScraper::new(&config.radar_base_url)?;
    let ingestor = Arc::new(GraphIngestor::new(client.clone()));
    let pipeline = RadarPipeline::new(
        Arc::new(scraper),
        ingestor.clone(),
        Duration::from_secs(config.scrape_delay_secs),
    );

    let state = Arc::new(AppState {
        methodologies: MethodologyRepository::new(client.clone()),
        practices: PracticeRepository::new(client.clone()),
        rules: RuleRepository::new(client.clone()),
        contexts: ContextRepository::new(client.clone()),
        evidence: EvidenceRepository::new(client.clone()),
        ingestor,
        pipeline,
        client,
    });

    let api = Router::new()
        .route(
            "/methodologies",
            post(rest::create_methodology).get(rest::list_methodologies),
        )
        .route(
            "/methodologies/{name}",
            get(rest::get_methodology).delete(rest::delete_methodology),
        )
        .route("/methodologies/{name}/full", get(rest::get_methodology_full))
        .route(
            "/methodologies/{name}/practices",
            get(rest::get_practices_by_methodology),
        )
        .route(
            "/methodologies/{name}/related",
            get(rest::get_related_methodologies),
        )
        .route("/practices", post(rest::create_practice))
        .route("/practices/{name}", get(rest::get_practice))
        .route("/practices/{name}/rules", get(rest::get_rules_by_practice))
        .route(
            "/practices/{name}/rules-with-evidence",
            get(rest::get_rules_with_evidence),
        )
        .route("/rules", post(rest::create_rule))
        .route("/rules/find-applicable", post(rest::find_applicable_rules))
        .route("/contexts", post(rest::create_context).get(rest::list_contexts))
        .route("/contexts/{name}/rules", get(rest::get_rules_by_context))
        .route("/evidence", post(rest::create_evidence))
        .route(
            "/evidence/{evidence_name}/link-rule/{rule_name}",
            post(rest::link_evidence_to_rule),
        )
        .route("/radar/ingest/technique/{name}", post(radar::ingest_technique))
        .route("/radar/ingest/demo", post(radar::run_demo))
        .route("/radar/status", get(radar::status))
        .route("/radar/techniques", get(radar::techniques))
        .route("/radar/techniques/{name}/ring", put(radar::update_ring))
        .route(
            "/radar/techniques/{name}/connections",
            get(radar::connections),
        );

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Praxis API listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

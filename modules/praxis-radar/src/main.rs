use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use praxis_common::Config;
use praxis_graph::GraphClient;
use praxis_radar::orchestrator::DEMO_TECHNIQUE_PATHS;
use praxis_radar::{GraphIngestor, RadarPipeline, RadarScraper};

#[derive(Parser)]
#[command(name = "praxis-radar", about = "Technology Radar ingestion pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline. Discovers techniques from the site unless
    /// explicit paths are given.
    Run {
        /// Technique paths, e.g. /techniques/summary/fuzz-testing
        #[arg(long = "path")]
        paths: Vec<String>,
    },
    /// Run the pipeline for one technique by slug.
    Single {
        /// Technique slug, e.g. fuzz-testing
        name: String,
    },
    /// Ingest the demo set of techniques.
    Demo,
    /// Show what has been ingested so far.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("praxis=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    info!("Connecting to Neo4j at {}", config.neo4j_uri);
    let client =
        GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?;

    let scraper = RadarScraper::new(&config.radar_base_url)?;
    let ingestor = GraphIngestor::new(client);
    let pipeline = RadarPipeline::new(
        Arc::new(scraper),
        Arc::new(ingestor),
        Duration::from_secs(config.scrape_delay_secs),
    );

    match cli.command {
        Command::Run { paths } => {
            let paths = if paths.is_empty() { None } else { Some(paths) };
            let run = pipeline.run_full(paths).await;
            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        Command::Single { name } => {
            let run = pipeline.run_single(&name).await;
            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        Command::Demo => {
            let paths = DEMO_TECHNIQUE_PATHS.iter().map(|p| p.to_string()).collect();
            let run = pipeline.run_full(Some(paths)).await;
            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        Command::Status => {
            let status = pipeline.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

//! Technology Radar pipeline: scrape technique pages, derive knowledge-graph
//! entities from them, and ingest the result into Neo4j.

pub mod ingestor;
pub mod orchestrator;
pub mod processor;
pub mod scraper;

pub use ingestor::{GraphIngestor, IngestReport, RadarIngest, TechniqueSummary};
pub use orchestrator::{PipelineRun, PipelineStatus, RadarPipeline, SingleRun};
pub use processor::{Connection, ProcessedTechnique, RadarProcessor};
pub use scraper::{RadarScraper, TechniqueSource};

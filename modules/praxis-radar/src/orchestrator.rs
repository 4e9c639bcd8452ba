//! Drives the scrape -> process -> ingest pipeline end to end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::ingestor::{RadarIngest, TechniqueSummary};
use crate::processor::RadarProcessor;
use crate::scraper::TechniqueSource;

/// Cap on techniques handled in one batch run, to stay polite to the site.
pub const MAX_TECHNIQUES_PER_RUN: usize = 5;

/// High-value techniques used by the demo ingestion endpoint.
pub const DEMO_TECHNIQUE_PATHS: [&str; 3] = [
    "/techniques/summary/fuzz-testing",
    "/techniques/summary/threat-modeling",
    "/techniques/summary/software-bill-of-materials",
];

/// Outcome of a batch pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineRun {
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub techniques_processed: usize,
    pub total_entities_created: usize,
    pub duration_seconds: f64,
    pub errors: Vec<String>,
    pub radar_techniques_summary: Vec<TechniqueSummary>,
}

/// Outcome of a single-technique run.
#[derive(Debug, Serialize)]
pub struct SingleRun {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    pub entities_created: usize,
    pub radar_technique_created: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Current shape of stored radar data.
#[derive(Debug, Serialize)]
pub struct PipelineStatus {
    pub total_radar_techniques: usize,
    pub by_ring: std::collections::BTreeMap<String, Vec<String>>,
    pub latest_techniques: Vec<String>,
    pub summary: Vec<TechniqueSummary>,
}

pub struct RadarPipeline {
    source: Arc<dyn TechniqueSource>,
    processor: RadarProcessor,
    ingest: Arc<dyn RadarIngest>,
    scrape_delay: Duration,
}

impl RadarPipeline {
    pub fn new(
        source: Arc<dyn TechniqueSource>,
        ingest: Arc<dyn RadarIngest>,
        scrape_delay: Duration,
    ) -> Self {
        Self {
            source,
            processor: RadarProcessor::new(),
            ingest,
            scrape_delay,
        }
    }

    /// Scrape, process, and ingest a batch of techniques. With no explicit
    /// paths the technique list is discovered from the site. At most
    /// [`MAX_TECHNIQUES_PER_RUN`] techniques are handled per run, with a
    /// delay between page fetches. A technique that fails to scrape is
    /// recorded and skipped; it never aborts the batch.
    pub async fn run_full(&self, technique_paths: Option<Vec<String>>) -> PipelineRun {
        let start = Instant::now();
        let started_at = Utc::now();
        let mut success = true;
        let mut techniques_processed = 0;
        let mut total_entities_created = 0;
        let mut errors = Vec::new();

        info!("Starting radar pipeline");

        let paths = match technique_paths {
            Some(paths) if !paths.is_empty() => paths,
            _ => match self.source.list_techniques().await {
                Ok(paths) => {
                    info!(count = paths.len(), "Discovered techniques to scrape");
                    paths
                }
                Err(e) => {
                    success = false;
                    errors.push(format!("Failed to list techniques: {e}"));
                    Vec::new()
                }
            },
        };

        let batch = &paths[..paths.len().min(MAX_TECHNIQUES_PER_RUN)];
        for (i, path) in batch.iter().enumerate() {
            info!(path = path.as_str(), "Processing technique {}/{}", i + 1, batch.len());

            let technique = match self.source.scrape_technique(path).await {
                Some(t) => t,
                None => {
                    warn!(path = path.as_str(), "Failed to scrape technique, skipping");
                    errors.push(format!("Failed to scrape technique: {path}"));
                    continue;
                }
            };

            let processed = self.processor.process(&technique);
            let report = self.ingest.ingest_processed(&processed).await;
            techniques_processed += 1;
            total_entities_created += report.entities_created();
            errors.extend(report.errors);

            if let Err(e) = self.ingest.ingest_technique(&technique).await {
                success = false;
                errors.push(format!("Failed to ingest technique {}: {e}", technique.name));
            }

            info!(technique = %technique.name, "Completed technique");
            tokio::time::sleep(self.scrape_delay).await;
        }

        let radar_techniques_summary = match self.ingest.techniques_summary().await {
            Ok(summary) => summary,
            Err(e) => {
                errors.push(format!("Failed to summarize techniques: {e}"));
                Vec::new()
            }
        };

        let duration_seconds = start.elapsed().as_secs_f64();
        info!(
            techniques_processed,
            total_entities_created, duration_seconds, "Pipeline completed"
        );

        PipelineRun {
            success,
            started_at,
            finished_at: Utc::now(),
            techniques_processed,
            total_entities_created,
            duration_seconds,
            errors,
            radar_techniques_summary,
        }
    }

    /// Run the pipeline for one technique addressed by its slug, e.g.
    /// "fuzz-testing".
    pub async fn run_single(&self, technique_name: &str) -> SingleRun {
        let path = format!("/techniques/summary/{technique_name}");
        info!(technique = technique_name, "Processing single technique");

        let technique = match self.source.scrape_technique(&path).await {
            Some(t) => t,
            None => {
                return SingleRun {
                    success: false,
                    technique: None,
                    entities_created: 0,
                    radar_technique_created: false,
                    errors: Vec::new(),
                    error: Some(format!("Failed to scrape technique: {technique_name}")),
                };
            }
        };

        let processed = self.processor.process(&technique);
        let report = self.ingest.ingest_processed(&processed).await;
        let radar_technique_created = match self.ingest.ingest_technique(&technique).await {
            Ok(()) => true,
            Err(e) => {
                warn!(technique = %technique.name, error = %e, "Failed to upsert technique node");
                false
            }
        };

        SingleRun {
            success: true,
            technique: Some(technique.name),
            entities_created: report.entities_created(),
            radar_technique_created,
            errors: report.errors,
            error: None,
        }
    }

    /// Summarize what the pipeline has ingested so far.
    pub async fn status(&self) -> Result<PipelineStatus, praxis_common::PraxisError> {
        let summary = self.ingest.techniques_summary().await?;

        let mut by_ring: std::collections::BTreeMap<String, Vec<String>> = Default::default();
        for technique in &summary {
            by_ring
                .entry(technique.ring.clone())
                .or_default()
                .push(technique.name.clone());
        }
        let latest_techniques = summary
            .iter()
            .rev()
            .take(5)
            .rev()
            .map(|t| t.name.clone())
            .collect();

        Ok(PipelineStatus {
            total_radar_techniques: summary.len(),
            by_ring,
            latest_techniques,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::IngestReport;
    use crate::processor::ProcessedTechnique;
    use async_trait::async_trait;
    use praxis_common::{Movement, PraxisError, Quadrant, RadarTechnique, Ring};
    use std::sync::Mutex;

    struct StubSource {
        paths: Vec<String>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl TechniqueSource for StubSource {
        async fn list_techniques(&self) -> Result<Vec<String>, PraxisError> {
            Ok(self.paths.clone())
        }

        async fn scrape_technique(&self, path: &str) -> Option<RadarTechnique> {
            if self.failing.iter().any(|f| f == path) {
                return None;
            }
            let slug = path.rsplit('/').next().unwrap();
            Some(RadarTechnique {
                name: slug.replace('-', " "),
                quadrant: Quadrant::Techniques,
                ring: Ring::Assess,
                movement: Movement::NoChange,
                description: "Security testing technique.".to_string(),
                volume: 32,
                edition_date: "2025-04".to_string(),
                source_url: Some(format!("https://example.com{path}")),
                related_blips: vec![],
            })
        }
    }

    #[derive(Default)]
    struct StubIngest {
        processed: Mutex<Vec<ProcessedTechnique>>,
        techniques: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RadarIngest for StubIngest {
        async fn ingest_processed(&self, data: &ProcessedTechnique) -> IngestReport {
            self.processed.lock().unwrap().push(data.clone());
            IngestReport {
                methodologies_created: data.methodologies.len(),
                practices_created: data.practices.len(),
                rules_created: data.rules.len(),
                evidence_created: data.evidence.len(),
                connections_created: data.connections.len(),
                errors: vec![],
            }
        }

        async fn ingest_technique(&self, technique: &RadarTechnique) -> Result<(), PraxisError> {
            self.techniques.lock().unwrap().push(technique.name.clone());
            Ok(())
        }

        async fn techniques_summary(&self) -> Result<Vec<TechniqueSummary>, PraxisError> {
            Ok(self
                .techniques
                .lock()
                .unwrap()
                .iter()
                .map(|name| TechniqueSummary {
                    name: name.clone(),
                    quadrant: "Techniques".to_string(),
                    ring: "Assess".to_string(),
                    movement: "No change".to_string(),
                    description: String::new(),
                    volume: 32,
                    edition_date: "2025-04".to_string(),
                    source_url: None,
                    related_practices: vec![],
                })
                .collect())
        }
    }

    fn pipeline(source: StubSource, ingest: Arc<StubIngest>) -> RadarPipeline {
        RadarPipeline::new(Arc::new(source), ingest, Duration::ZERO)
    }

    #[tokio::test]
    async fn batch_run_caps_at_five_techniques() {
        let paths: Vec<String> = (0..8)
            .map(|i| format!("/techniques/summary/technique-{i}"))
            .collect();
        let ingest = Arc::new(StubIngest::default());
        let pipeline = pipeline(
            StubSource {
                paths,
                failing: vec![],
            },
            ingest.clone(),
        );

        let run = pipeline.run_full(None).await;

        assert!(run.success);
        assert_eq!(run.techniques_processed, 5);
        assert_eq!(ingest.techniques.lock().unwrap().len(), 5);
        assert!(run.errors.is_empty());
    }

    #[tokio::test]
    async fn scrape_failure_skips_technique_without_aborting() {
        let paths = vec![
            "/techniques/summary/good-one".to_string(),
            "/techniques/summary/broken".to_string(),
            "/techniques/summary/good-two".to_string(),
        ];
        let ingest = Arc::new(StubIngest::default());
        let pipeline = pipeline(
            StubSource {
                paths: paths.clone(),
                failing: vec!["/techniques/summary/broken".to_string()],
            },
            ingest.clone(),
        );

        let run = pipeline.run_full(Some(paths)).await;

        assert!(run.success);
        assert_eq!(run.techniques_processed, 2);
        assert_eq!(run.errors.len(), 1);
        assert!(run.errors[0].contains("broken"));
        let ingested = ingest.techniques.lock().unwrap();
        assert_eq!(ingested.as_slice(), ["good one", "good two"]);
    }

    #[tokio::test]
    async fn entity_totals_exclude_connections() {
        let paths = vec!["/techniques/summary/security-scanning".to_string()];
        let ingest = Arc::new(StubIngest::default());
        let pipeline = pipeline(
            StubSource {
                paths: paths.clone(),
                failing: vec![],
            },
            ingest.clone(),
        );

        let run = pipeline.run_full(Some(paths)).await;

        // Description carries "security", so processing yields the QA
        // methodology, one practice, one rule, one evidence: four entities.
        // The SUPPORTED_BY connection is not an entity.
        assert_eq!(run.techniques_processed, 1);
        assert_eq!(run.total_entities_created, 4);
        let processed = ingest.processed.lock().unwrap();
        assert_eq!(processed[0].connections.len(), 1);
    }

    #[tokio::test]
    async fn single_run_reports_scrape_failure() {
        let ingest = Arc::new(StubIngest::default());
        let pipeline = pipeline(
            StubSource {
                paths: vec![],
                failing: vec!["/techniques/summary/missing".to_string()],
            },
            ingest,
        );

        let run = pipeline.run_single("missing").await;

        assert!(!run.success);
        assert!(run.error.unwrap().contains("missing"));
        assert_eq!(run.entities_created, 0);
        assert!(!run.radar_technique_created);
    }

    #[tokio::test]
    async fn single_run_succeeds_end_to_end() {
        let ingest = Arc::new(StubIngest::default());
        let pipeline = pipeline(
            StubSource {
                paths: vec![],
                failing: vec![],
            },
            ingest.clone(),
        );

        let run = pipeline.run_single("fuzz-testing").await;

        assert!(run.success);
        assert_eq!(run.technique.as_deref(), Some("fuzz testing"));
        assert!(run.radar_technique_created);
        assert_eq!(ingest.techniques.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_groups_by_ring_and_keeps_last_five() {
        let ingest = Arc::new(StubIngest::default());
        for i in 0..7 {
            ingest
                .techniques
                .lock()
                .unwrap()
                .push(format!("technique {i}"));
        }
        let pipeline = pipeline(
            StubSource {
                paths: vec![],
                failing: vec![],
            },
            ingest,
        );

        let status = pipeline.status().await.unwrap();

        assert_eq!(status.total_radar_techniques, 7);
        assert_eq!(status.by_ring.get("Assess").unwrap().len(), 7);
        assert_eq!(
            status.latest_techniques,
            vec![
                "technique 2",
                "technique 3",
                "technique 4",
                "technique 5",
                "technique 6"
            ]
        );
    }
}

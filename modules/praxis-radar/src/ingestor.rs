//! Writes processed radar entities into the graph.
//!
//! Ingestion is continue-on-error: each entity is attempted independently
//! and failures are collected into the report rather than aborting the
//! batch. Methodologies, practices, and rules are deduplicated by name
//! before creation; evidence is created unconditionally.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use praxis_common::{PraxisError, RadarTechnique, Ring};
use praxis_graph::{
    query, EvidenceRepository, GraphClient, MethodologyRepository, PracticeRepository,
    RuleRepository,
};

use crate::processor::ProcessedTechnique;

/// Counts and errors from one ingestion batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub methodologies_created: usize,
    pub practices_created: usize,
    pub rules_created: usize,
    pub evidence_created: usize,
    pub connections_created: usize,
    pub errors: Vec<String>,
}

impl IngestReport {
    /// Node entities created, excluding relationships.
    pub fn entities_created(&self) -> usize {
        self.methodologies_created
            + self.practices_created
            + self.rules_created
            + self.evidence_created
    }
}

/// A stored RadarTechnique node with the practices it influences.
#[derive(Debug, Clone, Serialize)]
pub struct TechniqueSummary {
    pub name: String,
    pub quadrant: String,
    pub ring: String,
    pub movement: String,
    pub description: String,
    pub volume: i64,
    pub edition_date: String,
    pub source_url: Option<String>,
    pub related_practices: Vec<String>,
}

/// A stored RadarTechnique node with everything it reaches in the
/// methodology hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct TechniqueConnections {
    pub name: String,
    pub ring: String,
    pub description: String,
    pub connected_practices: Vec<String>,
    pub connected_methodologies: Vec<String>,
    pub related_rules: Vec<String>,
}

/// Graph sink for the pipeline. Split from [`GraphIngestor`] so orchestrator
/// tests can count what would be written without a database.
#[async_trait]
pub trait RadarIngest: Send + Sync {
    /// Write derived entities, deduplicating by name where applicable.
    async fn ingest_processed(&self, data: &ProcessedTechnique) -> IngestReport;

    /// Upsert the technique itself as a RadarTechnique node and link it to
    /// practices it influences.
    async fn ingest_technique(&self, technique: &RadarTechnique) -> Result<(), PraxisError>;

    /// Summaries of all stored techniques, ordered by ring then name.
    async fn techniques_summary(&self) -> Result<Vec<TechniqueSummary>, PraxisError>;
}

pub struct GraphIngestor {
    client: GraphClient,
    methodologies: MethodologyRepository,
    practices: PracticeRepository,
    rules: RuleRepository,
    evidence: EvidenceRepository,
}

impl GraphIngestor {
    pub fn new(client: GraphClient) -> Self {
        Self {
            methodologies: MethodologyRepository::new(client.clone()),
            practices: PracticeRepository::new(client.clone()),
            rules: RuleRepository::new(client.clone()),
            evidence: EvidenceRepository::new(client.clone()),
            client,
        }
    }

    /// Link the technique node to practices whose name, description, or
    /// tools mention the first word of the technique name. Linking is
    /// best-effort; failures are logged and swallowed.
    async fn link_to_practices(&self, technique: &RadarTechnique) {
        let keyword = match technique.name.to_lowercase().split_whitespace().next() {
            Some(word) => word.to_string(),
            None => return,
        };

        let q = query(
            "MATCH (rt:RadarTechnique {name: $technique_name})
             MATCH (p:Practice)
             WHERE toLower(p.name) CONTAINS $keyword
                OR toLower(p.description) CONTAINS $keyword
                OR $keyword IN [t IN p.tools | toLower(t)]
             MERGE (rt)-[:INFLUENCES_PRACTICE]->(p)
             RETURN count(*) AS links_created",
        )
        .param("technique_name", technique.name.as_str())
        .param("keyword", keyword.as_str());

        match self.client.inner().execute(q).await {
            Ok(mut stream) => match stream.next().await {
                Ok(Some(row)) => {
                    let links: i64 = row.get("links_created").unwrap_or(0);
                    if links > 0 {
                        info!(technique = %technique.name, links, "Linked technique to practices");
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(technique = %technique.name, error = %e, "Failed to link technique to practices"),
            },
            Err(e) => warn!(technique = %technique.name, error = %e, "Failed to link technique to practices"),
        }
    }

    /// Update the ring of a stored technique. Returns false when the
    /// technique does not exist.
    pub async fn update_ring(&self, technique_name: &str, new_ring: Ring) -> Result<bool, PraxisError> {
        let q = query(
            "MATCH (rt:RadarTechnique {name: $technique_name})
             SET rt.ring = $new_ring, rt.updated_at = datetime()
             RETURN rt.name AS updated",
        )
        .param("technique_name", technique_name)
        .param("new_ring", new_ring.as_str());

        let mut stream = self.client.inner().execute(q).await?;
        if stream.next().await?.is_some() {
            info!(technique = technique_name, ring = %new_ring, "Updated technique ring");
            return Ok(true);
        }
        Ok(false)
    }

    /// Everything a stored technique reaches: influenced practices, their
    /// methodologies, and their rules. None when the technique is unknown.
    pub async fn technique_connections(
        &self,
        technique_name: &str,
    ) -> Result<Option<TechniqueConnections>, PraxisError> {
        let q = query(
            "MATCH (rt:RadarTechnique {name: $technique_name})
             OPTIONAL MATCH (rt)-[:INFLUENCES_PRACTICE]->(p:Practice)
             OPTIONAL MATCH (p)<-[:HAS_PRACTICE]-(m:Methodology)
             OPTIONAL MATCH (p)-[:HAS_RULE]->(r:Rule)
             RETURN rt.name AS name,
                    rt.ring AS ring,
                    rt.description AS description,
                    collect(DISTINCT p.name) AS connected_practices,
                    collect(DISTINCT m.name) AS connected_methodologies,
                    collect(DISTINCT r.title) AS related_rules",
        )
        .param("technique_name", technique_name);

        let mut stream = self.client.inner().execute(q).await?;
        if let Some(row) = stream.next().await? {
            return Ok(Some(TechniqueConnections {
                name: row.get("name").unwrap_or_default(),
                ring: row.get("ring").unwrap_or_default(),
                description: row.get("description").unwrap_or_default(),
                connected_practices: row.get("connected_practices").unwrap_or_default(),
                connected_methodologies: row.get("connected_methodologies").unwrap_or_default(),
                related_rules: row.get("related_rules").unwrap_or_default(),
            }));
        }
        Ok(None)
    }
}

#[async_trait]
impl RadarIngest for GraphIngestor {
    async fn ingest_processed(&self, data: &ProcessedTechnique) -> IngestReport {
        let mut report = IngestReport::default();

        for methodology in &data.methodologies {
            match self.methodologies.get_by_name(&methodology.name).await {
                Ok(Some(_)) => {
                    debug!(name = %methodology.name, "Methodology already exists");
                }
                Ok(None) => match self.methodologies.create(methodology).await {
                    Ok(_) => {
                        report.methodologies_created += 1;
                        info!(name = %methodology.name, "Created methodology");
                    }
                    Err(e) => {
                        let msg = format!("Failed to create methodology {}: {e}", methodology.name);
                        error!("{msg}");
                        report.errors.push(msg);
                    }
                },
                Err(e) => {
                    let msg = format!("Failed to create methodology {}: {e}", methodology.name);
                    error!("{msg}");
                    report.errors.push(msg);
                }
            }
        }

        for practice in &data.practices {
            match self.practices.get_by_name(&practice.name).await {
                Ok(Some(_)) => {
                    debug!(name = %practice.name, "Practice already exists");
                }
                Ok(None) => match self.practices.create(practice).await {
                    Ok(_) => {
                        report.practices_created += 1;
                        info!(name = %practice.name, "Created practice");
                    }
                    Err(e) => {
                        let msg = format!("Failed to create practice {}: {e}", practice.name);
                        error!("{msg}");
                        report.errors.push(msg);
                    }
                },
                Err(e) => {
                    let msg = format!("Failed to create practice {}: {e}", practice.name);
                    error!("{msg}");
                    report.errors.push(msg);
                }
            }
        }

        for rule in &data.rules {
            match self.rules.get_by_practice(&rule.practice_name).await {
                Ok(existing) if existing.iter().any(|r| r.name == rule.name) => {
                    debug!(name = %rule.name, "Rule already exists");
                }
                Ok(_) => match self.rules.create(rule).await {
                    Ok(_) => {
                        report.rules_created += 1;
                        info!(title = %rule.title, "Created rule");
                    }
                    Err(e) => {
                        let msg = format!("Failed to create rule {}: {e}", rule.title);
                        error!("{msg}");
                        report.errors.push(msg);
                    }
                },
                Err(e) => {
                    let msg = format!("Failed to create rule {}: {e}", rule.title);
                    error!("{msg}");
                    report.errors.push(msg);
                }
            }
        }

        for evidence in &data.evidence {
            match self.evidence.create(evidence).await {
                Ok(_) => {
                    report.evidence_created += 1;
                    info!(title = %evidence.title, "Created evidence");
                }
                Err(e) => {
                    let msg = format!("Failed to create evidence {}: {e}", evidence.title);
                    error!("{msg}");
                    report.errors.push(msg);
                }
            }
        }

        for connection in &data.connections {
            match self
                .evidence
                .link_to_rule(&connection.evidence_name, &connection.rule_name)
                .await
            {
                Ok(true) => report.connections_created += 1,
                Ok(false) => {
                    let msg = format!(
                        "Failed to create SUPPORTED_BY relationship from {} to {}",
                        connection.rule_name, connection.evidence_name
                    );
                    error!("{msg}");
                    report.errors.push(msg);
                }
                Err(e) => {
                    let msg = format!(
                        "Failed to create SUPPORTED_BY relationship from {} to {}: {e}",
                        connection.rule_name, connection.evidence_name
                    );
                    error!("{msg}");
                    report.errors.push(msg);
                }
            }
        }

        report
    }

    async fn ingest_technique(&self, technique: &RadarTechnique) -> Result<(), PraxisError> {
        let q = query(
            "MERGE (rt:RadarTechnique:TechRadar {name: $name})
             SET rt += {
                quadrant: $quadrant,
                ring: $ring,
                movement: $movement,
                description: $description,
                volume: $volume,
                edition_date: $edition_date,
                source_url: CASE WHEN $source_url = '' THEN null ELSE $source_url END,
                created_at: datetime(),
                updated_at: datetime()
             }
             RETURN rt",
        )
        .param("name", technique.name.as_str())
        .param("quadrant", technique.quadrant.as_str())
        .param("ring", technique.ring.as_str())
        .param("movement", technique.movement.as_str())
        .param("description", technique.description.as_str())
        .param("volume", technique.volume)
        .param("edition_date", technique.edition_date.as_str())
        .param("source_url", technique.source_url.as_deref().unwrap_or(""));

        let mut stream = self.client.inner().execute(q).await?;
        if stream.next().await?.is_none() {
            return Err(PraxisError::Database(format!(
                "failed to upsert RadarTechnique '{}'",
                technique.name
            )));
        }
        info!(name = %technique.name, "Upserted RadarTechnique node");

        self.link_to_practices(technique).await;
        Ok(())
    }

    async fn techniques_summary(&self) -> Result<Vec<TechniqueSummary>, PraxisError> {
        let q = query(
            "MATCH (rt:RadarTechnique)
             OPTIONAL MATCH (rt)-[:INFLUENCES_PRACTICE]->(p:Practice)
             WITH rt, collect(p.name) AS related_practices
             RETURN rt.name AS name,
                    rt.quadrant AS quadrant,
                    rt.ring AS ring,
                    rt.movement AS movement,
                    rt.description AS description,
                    rt.volume AS volume,
                    rt.edition_date AS edition_date,
                    rt.source_url AS source_url,
                    related_practices
             ORDER BY rt.ring, rt.name",
        );

        let mut stream = self.client.inner().execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            out.push(TechniqueSummary {
                name: row.get("name").unwrap_or_default(),
                quadrant: row.get("quadrant").unwrap_or_default(),
                ring: row.get("ring").unwrap_or_default(),
                movement: row.get("movement").unwrap_or_default(),
                description: row.get("description").unwrap_or_default(),
                volume: row.get("volume").unwrap_or(0),
                edition_date: row.get("edition_date").unwrap_or_default(),
                source_url: row.get::<String>("source_url").ok().filter(|s| !s.is_empty()),
                related_practices: row.get("related_practices").unwrap_or_default(),
            });
        }
        Ok(out)
    }
}

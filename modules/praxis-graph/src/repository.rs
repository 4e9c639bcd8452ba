//! Per-entity repositories over the property graph.
//!
//! Each repository translates typed create requests into parameterized Cypher
//! writes and stored nodes back into typed results. Optional string fields
//! are stored as null via the `CASE WHEN $x = '' THEN null` pattern so reads
//! can map empty back to `None`.
//!
//! Parent-linked creates (`Practice` under a `Methodology`, `Rule` under a
//! `Practice`) MATCH on the parent first: a missing parent matches zero rows
//! and the write silently produces no node, surfaced here as a generic
//! "failed to create" error. Name uniqueness is not enforced at the store
//! level; callers that need it (the API create routes) pre-check by name.

use neo4rs::query;
use tracing::debug;

use praxis_common::{
    Context, ContextCreate, Evidence, EvidenceCreate, Methodology, MethodologyCreate, Practice,
    PracticeCreate, PraxisError, Priority, Rule, RuleCreate,
};

use crate::GraphClient;

/// A practice bundled with its rules, for the methodology detail view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PracticeWithRules {
    pub practice: Practice,
    pub rules: Vec<Rule>,
}

/// A methodology with all of its practices and their rules.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MethodologyDetail {
    pub methodology: Methodology,
    pub practices: Vec<PracticeWithRules>,
}

/// A rule bundled with its supporting evidence.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleWithEvidence {
    pub rule: Rule,
    pub evidence: Vec<Evidence>,
}

// --- Methodology ---

pub struct MethodologyRepository {
    client: GraphClient,
}

impl MethodologyRepository {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, m: &MethodologyCreate) -> Result<Methodology, PraxisError> {
        m.validate()?;
        let q = query(
            "CREATE (m:Methodology {
                name: $name,
                description: CASE WHEN $description = '' THEN null ELSE $description END,
                origin: CASE WHEN $origin = '' THEN null ELSE $origin END,
                year_created: CASE WHEN $year_created = 0 THEN null ELSE $year_created END,
                category: CASE WHEN $category = '' THEN null ELSE $category END
            }) RETURN m",
        )
        .param("name", m.name.as_str())
        .param("description", m.description.as_deref().unwrap_or(""))
        .param("origin", m.origin.as_deref().unwrap_or(""))
        .param("year_created", m.year_created.unwrap_or(0))
        .param("category", m.category.as_deref().unwrap_or(""));

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            if let Some(created) = row_to_methodology(&row, "m") {
                debug!(name = %created.name, "Created methodology");
                return Ok(created);
            }
        }
        Err(PraxisError::Database(format!(
            "failed to create methodology '{}'",
            m.name
        )))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Methodology>, PraxisError> {
        let q = query("MATCH (m:Methodology {name: $name}) RETURN m").param("name", name);
        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            return Ok(row_to_methodology(&row, "m"));
        }
        Ok(None)
    }

    pub async fn get_all(&self) -> Result<Vec<Methodology>, PraxisError> {
        let q = query("MATCH (m:Methodology) RETURN m ORDER BY m.name");
        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(m) = row_to_methodology(&row, "m") {
                out.push(m);
            }
        }
        Ok(out)
    }

    /// Delete a methodology by name, detaching all of its relationships.
    /// Returns false when no node matched the name.
    pub async fn delete(&self, name: &str) -> Result<bool, PraxisError> {
        let q = query(
            "MATCH (m:Methodology {name: $name})
             DETACH DELETE m
             RETURN count(m) AS deleted",
        )
        .param("name", name);
        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            let deleted: i64 = row.get("deleted").unwrap_or(0);
            return Ok(deleted > 0);
        }
        Ok(false)
    }

    /// Fetch a methodology together with its practices and each practice's
    /// rules. One row per practice; practices without rules come back with an
    /// empty list.
    pub async fn get_with_practices(
        &self,
        name: &str,
    ) -> Result<Option<MethodologyDetail>, PraxisError> {
        let q = query(
            "MATCH (m:Methodology {name: $name})
             OPTIONAL MATCH (m)-[:HAS_PRACTICE]->(p:Practice)
             OPTIONAL MATCH (p)-[:HAS_RULE]->(r:Rule)
             RETURN m, p, collect(r) AS rules
             ORDER BY p.name",
        )
        .param("name", name);

        let mut stream = self.client.graph.execute(q).await?;
        let mut methodology: Option<Methodology> = None;
        let mut practices = Vec::new();

        while let Some(row) = stream.next().await? {
            if methodology.is_none() {
                methodology = row_to_methodology(&row, "m");
            }
            if let Ok(p_node) = row.get::<neo4rs::Node>("p") {
                let practice = node_to_practice(&p_node);
                let rule_nodes: Vec<neo4rs::Node> = row.get("rules").unwrap_or_default();
                let rules = rule_nodes.iter().map(node_to_rule).collect();
                practices.push(PracticeWithRules { practice, rules });
            }
        }

        Ok(methodology.map(|m| MethodologyDetail {
            methodology: m,
            practices,
        }))
    }

    /// Methodologies reachable from the named one over RELATED_TO or
    /// HAS_PRACTICE paths, most-connected first. Variable-length paths never
    /// revisit a relationship, so the traversal terminates on cyclic graphs.
    pub async fn find_related(
        &self,
        name: &str,
        limit: i64,
    ) -> Result<Vec<Methodology>, PraxisError> {
        let q = query(
            "MATCH (source:Methodology {name: $name})
             MATCH (source)-[:RELATED_TO|HAS_PRACTICE*]-(related:Methodology)
             WHERE related <> source
             WITH related, count(*) AS connections
             ORDER BY connections DESC
             LIMIT $limit
             RETURN related",
        )
        .param("name", name)
        .param("limit", limit);

        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(m) = row_to_methodology(&row, "related") {
                out.push(m);
            }
        }
        Ok(out)
    }
}

// --- Practice ---

pub struct PracticeRepository {
    client: GraphClient,
}

impl PracticeRepository {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create a practice and link it under its parent methodology. Fails when
    /// the parent does not exist (the MATCH produces no rows).
    pub async fn create(&self, p: &PracticeCreate) -> Result<Practice, PraxisError> {
        p.validate()?;
        let q = query(
            "MATCH (m:Methodology {name: $methodology_name})
             CREATE (p:Practice {
                name: $name,
                description: CASE WHEN $description = '' THEN null ELSE $description END,
                tools: $tools,
                difficulty_level: CASE WHEN $difficulty_level = '' THEN null ELSE $difficulty_level END,
                estimated_time: CASE WHEN $estimated_time = '' THEN null ELSE $estimated_time END
             })
             CREATE (m)-[:HAS_PRACTICE]->(p)
             RETURN p",
        )
        .param("methodology_name", p.methodology_name.as_str())
        .param("name", p.name.as_str())
        .param("description", p.description.as_deref().unwrap_or(""))
        .param("tools", p.tools.clone())
        .param("difficulty_level", p.difficulty_level.as_deref().unwrap_or(""))
        .param("estimated_time", p.estimated_time.as_deref().unwrap_or(""));

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("p") {
                debug!(name = %p.name, methodology = %p.methodology_name, "Created practice");
                return Ok(node_to_practice(&node));
            }
        }
        Err(PraxisError::Database(format!(
            "failed to create practice '{}' (methodology '{}' missing?)",
            p.name, p.methodology_name
        )))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Practice>, PraxisError> {
        let q = query("MATCH (p:Practice {name: $name}) RETURN p").param("name", name);
        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("p") {
                return Ok(Some(node_to_practice(&node)));
            }
        }
        Ok(None)
    }

    pub async fn get_by_methodology(
        &self,
        methodology_name: &str,
    ) -> Result<Vec<Practice>, PraxisError> {
        let q = query(
            "MATCH (m:Methodology {name: $methodology_name})-[:HAS_PRACTICE]->(p:Practice)
             RETURN p ORDER BY p.name",
        )
        .param("methodology_name", methodology_name);
        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("p") {
                out.push(node_to_practice(&node));
            }
        }
        Ok(out)
    }
}

// --- Rule ---

pub struct RuleRepository {
    client: GraphClient,
}

impl RuleRepository {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create a rule and link it under its parent practice. Same
    /// missing-parent failure mode as practice creation.
    pub async fn create(&self, r: &RuleCreate) -> Result<Rule, PraxisError> {
        r.validate()?;
        let q = query(
            "MATCH (p:Practice {name: $practice_name})
             CREATE (r:Rule {
                name: $name,
                title: $title,
                detail: $detail,
                priority: $priority,
                category: CASE WHEN $category = '' THEN null ELSE $category END,
                tags: $tags
             })
             CREATE (p)-[:HAS_RULE]->(r)
             RETURN r",
        )
        .param("practice_name", r.practice_name.as_str())
        .param("name", r.name.as_str())
        .param("title", r.title.as_str())
        .param("detail", r.detail.as_str())
        .param("priority", r.priority.as_str())
        .param("category", r.category.as_deref().unwrap_or(""))
        .param("tags", r.tags.clone());

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("r") {
                debug!(name = %r.name, practice = %r.practice_name, "Created rule");
                return Ok(node_to_rule(&node));
            }
        }
        Err(PraxisError::Database(format!(
            "failed to create rule '{}' (practice '{}' missing?)",
            r.name, r.practice_name
        )))
    }

    pub async fn get_by_practice(&self, practice_name: &str) -> Result<Vec<Rule>, PraxisError> {
        let q = query(
            "MATCH (p:Practice {name: $practice_name})-[:HAS_RULE]->(r:Rule)
             RETURN r ORDER BY r.priority DESC, r.name",
        )
        .param("practice_name", practice_name);
        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("r") {
                out.push(node_to_rule(&node));
            }
        }
        Ok(out)
    }

    /// Rules that apply in a given context via APPLIES_IN.
    pub async fn get_by_context(&self, context_name: &str) -> Result<Vec<Rule>, PraxisError> {
        let q = query(
            "MATCH (c:Context {name: $context_name})<-[:APPLIES_IN]-(r:Rule)
             RETURN r ORDER BY r.priority DESC, r.name",
        )
        .param("context_name", context_name);
        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("r") {
                out.push(node_to_rule(&node));
            }
        }
        Ok(out)
    }

    /// Rules that apply in any context sharing at least one of the given
    /// constraints, optionally narrowed to a team size. Empty team size means
    /// no team-size filter.
    pub async fn find_applicable(
        &self,
        constraints: &[String],
        team_size: Option<&str>,
    ) -> Result<Vec<Rule>, PraxisError> {
        let q = query(
            "MATCH (r:Rule)
             WHERE EXISTS {
                 MATCH (r)-[:APPLIES_IN]->(c:Context)
                 WHERE any(item IN c.constraints WHERE item IN $constraints)
                   AND ($team_size = '' OR c.team_size = $team_size)
             }
             RETURN r ORDER BY r.priority DESC, r.name",
        )
        .param("constraints", constraints.to_vec())
        .param("team_size", team_size.unwrap_or(""));

        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("r") {
                out.push(node_to_rule(&node));
            }
        }
        Ok(out)
    }

    /// Rules for a practice with their supporting evidence collected per rule.
    pub async fn get_with_evidence(
        &self,
        practice_name: &str,
    ) -> Result<Vec<RuleWithEvidence>, PraxisError> {
        let q = query(
            "MATCH (p:Practice {name: $practice_name})-[:HAS_RULE]->(r:Rule)
             OPTIONAL MATCH (r)-[:SUPPORTED_BY]->(e:Evidence)
             RETURN r, collect(e) AS evidence
             ORDER BY r.priority DESC, r.name",
        )
        .param("practice_name", practice_name);
        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("r") {
                let ev_nodes: Vec<neo4rs::Node> = row.get("evidence").unwrap_or_default();
                out.push(RuleWithEvidence {
                    rule: node_to_rule(&node),
                    evidence: ev_nodes.iter().map(node_to_evidence).collect(),
                });
            }
        }
        Ok(out)
    }
}

// --- Context ---

pub struct ContextRepository {
    client: GraphClient,
}

impl ContextRepository {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, c: &ContextCreate) -> Result<Context, PraxisError> {
        c.validate()?;
        let q = query(
            "CREATE (c:Context {
                name: $name,
                description: CASE WHEN $description = '' THEN null ELSE $description END,
                constraints: $constraints,
                team_size: CASE WHEN $team_size = '' THEN null ELSE $team_size END,
                project_type: CASE WHEN $project_type = '' THEN null ELSE $project_type END,
                industry: CASE WHEN $industry = '' THEN null ELSE $industry END
            }) RETURN c",
        )
        .param("name", c.name.as_str())
        .param("description", c.description.as_deref().unwrap_or(""))
        .param("constraints", c.constraints.clone())
        .param("team_size", c.team_size.as_deref().unwrap_or(""))
        .param("project_type", c.project_type.as_deref().unwrap_or(""))
        .param("industry", c.industry.as_deref().unwrap_or(""));

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("c") {
                debug!(name = %c.name, "Created context");
                return Ok(node_to_context(&node));
            }
        }
        Err(PraxisError::Database(format!(
            "failed to create context '{}'",
            c.name
        )))
    }

    pub async fn get_all(&self) -> Result<Vec<Context>, PraxisError> {
        let q = query("MATCH (c:Context) RETURN c ORDER BY c.name");
        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("c") {
                out.push(node_to_context(&node));
            }
        }
        Ok(out)
    }
}

// --- Evidence ---

pub struct EvidenceRepository {
    client: GraphClient,
}

impl EvidenceRepository {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create an evidence node. No dedup by name: repeated creation with the
    /// same name yields multiple nodes.
    pub async fn create(&self, e: &EvidenceCreate) -> Result<Evidence, PraxisError> {
        e.validate()?;
        let q = query(
            "CREATE (e:Evidence {
                name: $name,
                title: $title,
                url: CASE WHEN $url = '' THEN null ELSE $url END,
                summary: CASE WHEN $summary = '' THEN null ELSE $summary END,
                source_type: CASE WHEN $source_type = '' THEN null ELSE $source_type END,
                credibility_score: CASE WHEN $credibility_score < 0.0 THEN null ELSE $credibility_score END
            }) RETURN e",
        )
        .param("name", e.name.as_str())
        .param("title", e.title.as_str())
        .param("url", e.url.as_deref().unwrap_or(""))
        .param("summary", e.summary.as_deref().unwrap_or(""))
        .param("source_type", e.source_type.as_deref().unwrap_or(""))
        .param("credibility_score", e.credibility_score.unwrap_or(-1.0));

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            if let Ok(node) = row.get::<neo4rs::Node>("e") {
                debug!(name = %e.name, "Created evidence");
                return Ok(node_to_evidence(&node));
            }
        }
        Err(PraxisError::Database(format!(
            "failed to create evidence '{}'",
            e.name
        )))
    }

    /// Link an existing evidence node to an existing rule via SUPPORTED_BY.
    /// Returns false when either endpoint is missing.
    pub async fn link_to_rule(
        &self,
        evidence_name: &str,
        rule_name: &str,
    ) -> Result<bool, PraxisError> {
        let q = query(
            "MATCH (e:Evidence {name: $evidence_name}), (r:Rule {name: $rule_name})
             CREATE (r)-[:SUPPORTED_BY]->(e)
             RETURN count(*) AS created",
        )
        .param("evidence_name", evidence_name)
        .param("rule_name", rule_name);

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            let created: i64 = row.get("created").unwrap_or(0);
            return Ok(created > 0);
        }
        Ok(false)
    }
}

// --- Node parsing ---

fn row_to_methodology(row: &neo4rs::Row, key: &str) -> Option<Methodology> {
    let node: neo4rs::Node = row.get(key).ok()?;
    Some(node_to_methodology(&node))
}

fn node_to_methodology(n: &neo4rs::Node) -> Methodology {
    Methodology {
        name: n.get("name").unwrap_or_default(),
        description: opt_string(n, "description"),
        origin: opt_string(n, "origin"),
        year_created: n.get::<i64>("year_created").ok(),
        category: opt_string(n, "category"),
    }
}

fn node_to_practice(n: &neo4rs::Node) -> Practice {
    Practice {
        name: n.get("name").unwrap_or_default(),
        description: opt_string(n, "description"),
        tools: n.get::<Vec<String>>("tools").unwrap_or_default(),
        difficulty_level: opt_string(n, "difficulty_level"),
        estimated_time: opt_string(n, "estimated_time"),
    }
}

fn node_to_rule(n: &neo4rs::Node) -> Rule {
    let priority_str: String = n.get("priority").unwrap_or_default();
    Rule {
        name: n.get("name").unwrap_or_default(),
        title: n.get("title").unwrap_or_default(),
        detail: n.get("detail").unwrap_or_default(),
        priority: Priority::parse(&priority_str).unwrap_or_default(),
        category: opt_string(n, "category"),
        tags: n.get::<Vec<String>>("tags").unwrap_or_default(),
    }
}

fn node_to_context(n: &neo4rs::Node) -> Context {
    Context {
        name: n.get("name").unwrap_or_default(),
        description: opt_string(n, "description"),
        constraints: n.get::<Vec<String>>("constraints").unwrap_or_default(),
        team_size: opt_string(n, "team_size"),
        project_type: opt_string(n, "project_type"),
        industry: opt_string(n, "industry"),
    }
}

fn node_to_evidence(n: &neo4rs::Node) -> Evidence {
    Evidence {
        name: n.get("name").unwrap_or_default(),
        title: n.get("title").unwrap_or_default(),
        url: opt_string(n, "url"),
        summary: opt_string(n, "summary"),
        source_type: opt_string(n, "source_type"),
        credibility_score: n.get::<f64>("credibility_score").ok(),
    }
}

fn opt_string(n: &neo4rs::Node, prop: &str) -> Option<String> {
    match n.get::<String>(prop) {
        Ok(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

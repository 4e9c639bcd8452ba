//! Derives knowledge-graph entities from a scraped radar technique.
//!
//! Mapping rules:
//! - Techniques touching automation/testing vocabulary that sit in Adopt or
//!   Trial get a "{name} Practice" under the DevOps methodology.
//! - Techniques touching quality/security vocabulary get the Quality
//!   Assurance methodology plus a practice named after the technique, with
//!   tool names mined out of the description.
//! - Every technique yields exactly one rule whose title, detail, and
//!   priority are keyed off the ring, and one evidence record when the
//!   technique carries a source URL, linked to the rule.

use regex::Regex;
use serde::Serialize;
use tracing::info;

use praxis_common::{
    EvidenceCreate, MethodologyCreate, PracticeCreate, Priority, RadarTechnique, Ring, RuleCreate,
};

const AUTOMATION_KEYWORDS: [&str; 5] = ["agile", "devops", "continuous", "automation", "testing"];
const QUALITY_KEYWORDS: [&str; 4] = ["security", "quality", "testing", "review"];

const THOUGHTWORKS_CREDIBILITY: f64 = 8.5;
const MAX_EXTRACTED_TOOLS: usize = 5;

/// A pending SUPPORTED_BY link between a rule and an evidence record, both
/// referenced by name since neither exists in the graph yet.
#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    pub rule_name: String,
    pub evidence_name: String,
}

/// Entities derived from one technique, ready for ingestion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessedTechnique {
    pub methodologies: Vec<MethodologyCreate>,
    pub practices: Vec<PracticeCreate>,
    pub rules: Vec<RuleCreate>,
    pub evidence: Vec<EvidenceCreate>,
    pub connections: Vec<Connection>,
}

pub struct RadarProcessor;

impl RadarProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, technique: &RadarTechnique) -> ProcessedTechnique {
        let mut out = ProcessedTechnique::default();

        self.map_to_entities(technique, &mut out);
        out.rules.push(self.rule_for(technique));
        if let Some(evidence) = self.evidence_for(technique) {
            out.evidence.push(evidence);
        }
        for rule in &out.rules {
            out.connections.push(Connection {
                rule_name: rule.name.clone(),
                evidence_name: slug(&technique.name),
            });
        }

        info!(
            technique = %technique.name,
            methodologies = out.methodologies.len(),
            practices = out.practices.len(),
            rules = out.rules.len(),
            evidence = out.evidence.len(),
            "Processed technique"
        );
        out
    }

    fn map_to_entities(&self, technique: &RadarTechnique, out: &mut ProcessedTechnique) {
        let name_lower = technique.name.to_lowercase();
        let description_lower = technique.description.to_lowercase();
        let mentions = |keyword: &str| {
            name_lower.contains(keyword) || description_lower.contains(keyword)
        };

        if AUTOMATION_KEYWORDS.iter().any(|k| mentions(k))
            && mentions("testing")
            && matches!(technique.ring, Ring::Adopt | Ring::Trial)
        {
            out.practices.push(PracticeCreate {
                name: format!("{} Practice", technique.name),
                description: Some(format!(
                    "Implementation of {} as described in ThoughtWorks Technology Radar",
                    technique.name
                )),
                methodology_name: "DevOps".to_string(),
                tools: vec![],
                difficulty_level: Some(difficulty_for(technique.ring).to_string()),
                estimated_time: Some(implementation_time(technique.ring).to_string()),
            });
        }

        if QUALITY_KEYWORDS.iter().any(|k| mentions(k)) {
            out.methodologies.push(MethodologyCreate {
                name: "Quality Assurance".to_string(),
                description: Some(
                    "Systematic approach to ensuring software quality and security".to_string(),
                ),
                origin: Some("Software Engineering Best Practices".to_string()),
                year_created: None,
                category: Some("Quality".to_string()),
            });
            out.practices.push(PracticeCreate {
                name: technique.name.clone(),
                description: Some(truncate_with_ellipsis(&technique.description, 500)),
                methodology_name: "Quality Assurance".to_string(),
                tools: extract_tools(&technique.description),
                difficulty_level: Some(difficulty_for(technique.ring).to_string()),
                estimated_time: Some(implementation_time(technique.ring).to_string()),
            });
        }
    }

    fn rule_for(&self, technique: &RadarTechnique) -> RuleCreate {
        let name = &technique.name;
        let lead = technique.description.chars().take(300).collect::<String>();
        let (title, mut detail) = match technique.ring {
            Ring::Adopt => (
                format!("Adopt {name}"),
                format!("We feel strongly that the industry should be adopting {name}. {lead}"),
            ),
            Ring::Trial => (
                format!("Trial {name}"),
                format!(
                    "Worth pursuing {name}. It is important to understand how to build up this capability. {lead}"
                ),
            ),
            Ring::Assess => (
                format!("Assess {name}"),
                format!("Promising technique worth exploring: {name}. {lead}"),
            ),
            Ring::Hold => (
                format!("Use {name} with Caution"),
                format!("Proceed with caution when using {name}. {lead}"),
            ),
        };

        if detail.ends_with("...") {
            detail.truncate(detail.len() - 3);
            detail.push('.');
        }

        RuleCreate {
            name: slug(name),
            title,
            detail,
            practice_name: format!("{name} Practice"),
            priority: priority_for(technique.ring),
            category: Some("thoughtworks-radar".to_string()),
            tags: vec![
                "thoughtworks".to_string(),
                "technology-radar".to_string(),
                technique.quadrant.as_str().to_lowercase(),
            ],
        }
    }

    fn evidence_for(&self, technique: &RadarTechnique) -> Option<EvidenceCreate> {
        let url = technique.source_url.as_ref()?;
        Some(EvidenceCreate {
            name: slug(&technique.name),
            title: format!("ThoughtWorks Technology Radar: {}", technique.name),
            url: Some(url.clone()),
            summary: Some(format!(
                "ThoughtWorks Technology Radar assessment of {} - {}",
                technique.name, technique.ring
            )),
            source_type: Some("technology-radar".to_string()),
            credibility_score: Some(THOUGHTWORKS_CREDIBILITY),
        })
    }
}

impl Default for RadarProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared name for a technique's rule and evidence nodes.
pub fn slug(technique_name: &str) -> String {
    format!(
        "thoughtworks-{}",
        technique_name.to_lowercase().replace(' ', "-")
    )
}

fn priority_for(ring: Ring) -> Priority {
    match ring {
        Ring::Adopt => Priority::High,
        Ring::Trial => Priority::Medium,
        Ring::Assess => Priority::Low,
        // Hold is a warning, which outranks everything.
        Ring::Hold => Priority::Critical,
    }
}

fn difficulty_for(ring: Ring) -> &'static str {
    match ring {
        Ring::Adopt => "Beginner",
        Ring::Trial => "Intermediate",
        Ring::Assess | Ring::Hold => "Advanced",
    }
}

fn implementation_time(ring: Ring) -> &'static str {
    match ring {
        Ring::Adopt => "1-2 weeks setup, ongoing practice",
        Ring::Trial => "2-4 weeks evaluation, 1-2 months implementation",
        Ring::Assess => "1-2 weeks research, proof of concept",
        Ring::Hold => "Avoid new implementation",
    }
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

/// Mine tool names out of a technique description: capitalized phrases before
/// tool/platform/framework/library, "tools like ..." enumerations, and
/// "using X" mentions. Deduplicated, stop words removed, capped at five.
pub fn extract_tools(description: &str) -> Vec<String> {
    let patterns = [
        r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+(?:tool|platform|framework|library)",
        r"tools?\s+like\s+([^.]+)",
        r"using\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    ];
    let stop_words = [
        "the", "and", "or", "with", "for", "in", "on", "at", "to", "from",
    ];

    let mut tools: Vec<String> = Vec::new();
    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        for caps in re.captures_iter(description) {
            let raw = caps[1].trim().trim_end_matches([',', '.']);
            if raw.chars().count() <= 1 {
                continue;
            }
            if raw.contains(',') {
                tools.extend(raw.split(',').map(|t| t.trim().to_string()));
            } else {
                tools.push(raw.to_string());
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    tools
        .into_iter()
        .filter(|t| !t.is_empty() && !stop_words.contains(&t.to_lowercase().as_str()))
        .filter(|t| seen.insert(t.clone()))
        .take(MAX_EXTRACTED_TOOLS)
        .collect()
}

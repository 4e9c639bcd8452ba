//! Entity models for the knowledge graph.
//!
//! Each entity kind has a stored form (what comes back from the graph) and a
//! `*Create` request form. Validation happens on the request form at
//! construction/deserialization time, never at store time.

use serde::{Deserialize, Serialize};

use crate::error::PraxisError;

/// Rule priority. Stored as a lowercase string property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Stored entities ---

/// A software-development methodology, the root of the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Methodology {
    pub name: String,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub year_created: Option<i64>,
    pub category: Option<String>,
}

/// A practice belonging to exactly one methodology via HAS_PRACTICE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practice {
    pub name: String,
    pub description: Option<String>,
    pub tools: Vec<String>,
    pub difficulty_level: Option<String>,
    pub estimated_time: Option<String>,
}

/// A rule belonging to exactly one practice via HAS_RULE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub title: String,
    pub detail: String,
    pub priority: Priority,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// A standalone context node. Rules may APPLY_IN a context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub description: Option<String>,
    pub constraints: Vec<String>,
    pub team_size: Option<String>,
    pub project_type: Option<String>,
    pub industry: Option<String>,
}

/// A standalone evidence node, target of SUPPORTED_BY from rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub name: String,
    pub title: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub source_type: Option<String>,
    pub credibility_score: Option<f64>,
}

// --- Create requests ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodologyCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub year_created: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl MethodologyCreate {
    pub fn validate(&self) -> Result<(), PraxisError> {
        check_name(&self.name)?;
        check_max_len("description", self.description.as_deref(), 1000)?;
        if let Some(year) = self.year_created {
            if !(1900..=2030).contains(&year) {
                return Err(PraxisError::Validation(format!(
                    "year_created must be between 1900 and 2030, got {year}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the parent methodology. Must exist before creation; the write
    /// matches on it and produces no node otherwise.
    pub methodology_name: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
}

impl PracticeCreate {
    pub fn validate(&self) -> Result<(), PraxisError> {
        check_name(&self.name)?;
        check_max_len("description", self.description.as_deref(), 1000)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCreate {
    pub name: String,
    pub title: String,
    pub detail: String,
    /// Name of the parent practice. Same missing-parent failure mode as
    /// `PracticeCreate::methodology_name`.
    pub practice_name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RuleCreate {
    pub fn validate(&self) -> Result<(), PraxisError> {
        check_name(&self.name)?;
        check_len("title", &self.title, 1, 200)?;
        check_len("detail", &self.detail, 1, 2000)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl ContextCreate {
    pub fn validate(&self) -> Result<(), PraxisError> {
        check_name(&self.name)?;
        check_max_len("description", self.description.as_deref(), 1000)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceCreate {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub credibility_score: Option<f64>,
}

impl EvidenceCreate {
    pub fn validate(&self) -> Result<(), PraxisError> {
        check_name(&self.name)?;
        check_len("title", &self.title, 1, 200)?;
        check_max_len("summary", self.summary.as_deref(), 1000)?;
        if let Some(u) = &self.url {
            url::Url::parse(u)
                .map_err(|e| PraxisError::Validation(format!("url is not valid: {e}")))?;
        }
        if let Some(score) = self.credibility_score {
            if !(0.0..=10.0).contains(&score) {
                return Err(PraxisError::Validation(format!(
                    "credibility_score must be between 0.0 and 10.0, got {score}"
                )));
            }
        }
        Ok(())
    }
}

// --- Validation helpers ---

fn check_name(name: &str) -> Result<(), PraxisError> {
    check_len("name", name, 1, 200)
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), PraxisError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(PraxisError::Validation(format!(
            "{field} must be between {min} and {max} characters, got {len}"
        )));
    }
    Ok(())
}

fn check_max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), PraxisError> {
    if let Some(v) = value {
        let len = v.chars().count();
        if len > max {
            return Err(PraxisError::Validation(format!(
                "{field} must be at most {max} characters, got {len}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methodology(year: Option<i64>) -> MethodologyCreate {
        MethodologyCreate {
            name: "Extreme Programming".into(),
            description: Some("Lightweight engineering discipline".into()),
            origin: Some("Kent Beck".into()),
            year_created: year,
            category: Some("Agile".into()),
        }
    }

    fn evidence(score: Option<f64>) -> EvidenceCreate {
        EvidenceCreate {
            name: "xp-explained".into(),
            title: "Extreme Programming Explained".into(),
            url: Some("https://example.com/xp".into()),
            summary: None,
            source_type: Some("book".into()),
            credibility_score: score,
        }
    }

    #[test]
    fn rule_priority_defaults_to_medium_when_omitted() {
        let json = r#"{
            "name": "tdd-first",
            "title": "Write the test first",
            "detail": "Red, green, refactor.",
            "practice_name": "Test-Driven Development"
        }"#;
        let rule: RuleCreate = serde_json::from_str(json).unwrap();
        assert_eq!(rule.priority, Priority::Medium);
    }

    #[test]
    fn rule_priority_parses_explicit_value() {
        let json = r#"{
            "name": "tdd-first",
            "title": "Write the test first",
            "detail": "Red, green, refactor.",
            "practice_name": "Test-Driven Development",
            "priority": "critical"
        }"#;
        let rule: RuleCreate = serde_json::from_str(json).unwrap();
        assert_eq!(rule.priority, Priority::Critical);
    }

    #[test]
    fn credibility_score_accepted_at_boundaries() {
        assert!(evidence(Some(0.0)).validate().is_ok());
        assert!(evidence(Some(10.0)).validate().is_ok());
    }

    #[test]
    fn malformed_url_rejected() {
        let mut e = evidence(None);
        e.url = Some("not a url".into());
        assert!(e.validate().is_err());
    }

    #[test]
    fn credibility_score_rejected_outside_range() {
        assert!(evidence(Some(-0.1)).validate().is_err());
        assert!(evidence(Some(10.1)).validate().is_err());
    }

    #[test]
    fn year_created_accepted_at_boundaries() {
        assert!(methodology(Some(1900)).validate().is_ok());
        assert!(methodology(Some(2030)).validate().is_ok());
    }

    #[test]
    fn year_created_rejected_outside_range() {
        assert!(methodology(Some(1899)).validate().is_err());
        assert!(methodology(Some(2031)).validate().is_err());
    }

    #[test]
    fn empty_name_rejected() {
        let mut m = methodology(None);
        m.name = String::new();
        assert!(m.validate().is_err());
    }

    #[test]
    fn overlong_name_rejected() {
        let mut m = methodology(None);
        m.name = "x".repeat(201);
        assert!(m.validate().is_err());
    }

    #[test]
    fn overlong_detail_rejected() {
        let rule = RuleCreate {
            name: "r".into(),
            title: "t".into(),
            detail: "d".repeat(2001),
            practice_name: "p".into(),
            priority: Priority::default(),
            category: None,
            tags: vec![],
        };
        assert!(rule.validate().is_err());
    }
}

//! Models for scraped ThoughtWorks Technology Radar items.

use serde::{Deserialize, Serialize};

/// Radar adoption-maturity ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ring {
    Adopt,
    Trial,
    Assess,
    Hold,
}

impl Ring {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ring::Adopt => "Adopt",
            Ring::Trial => "Trial",
            Ring::Assess => "Assess",
            Ring::Hold => "Hold",
        }
    }

    pub fn parse(s: &str) -> Option<Ring> {
        match s {
            "Adopt" => Some(Ring::Adopt),
            "Trial" => Some(Ring::Trial),
            "Assess" => Some(Ring::Assess),
            "Hold" => Some(Ring::Hold),
            _ => None,
        }
    }

    pub const ALL: [Ring; 4] = [Ring::Adopt, Ring::Trial, Ring::Assess, Ring::Hold];
}

impl std::fmt::Display for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radar quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    Techniques,
    Tools,
    Platforms,
    LanguagesFrameworks,
}

impl Quadrant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Techniques => "Techniques",
            Quadrant::Tools => "Tools",
            Quadrant::Platforms => "Platforms",
            Quadrant::LanguagesFrameworks => "Languages & Frameworks",
        }
    }
}

/// Edition-over-edition movement indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    New,
    MovedIn,
    MovedOut,
    NoChange,
}

impl Movement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Movement::New => "New",
            Movement::MovedIn => "Moved in",
            Movement::MovedOut => "Moved out",
            Movement::NoChange => "No change",
        }
    }
}

/// A technique scraped from the radar. Intermediate, non-persisted form;
/// the ingestor upserts it as a `RadarTechnique` node merged by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarTechnique {
    pub name: String,
    pub quadrant: Quadrant,
    pub ring: Ring,
    pub movement: Movement,
    pub description: String,
    pub volume: i64,
    /// Edition date in "YYYY-MM" form (or "Month YYYY" as scraped).
    pub edition_date: String,
    pub source_url: Option<String>,
    pub related_blips: Vec<String>,
}

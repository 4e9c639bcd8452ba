pub mod client;
pub mod repository;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use repository::{
    ContextRepository, EvidenceRepository, MethodologyDetail, MethodologyRepository,
    PracticeRepository, PracticeWithRules, RuleRepository, RuleWithEvidence,
};

// Re-exported so callers can issue ad-hoc queries in tests.
pub use neo4rs::query;

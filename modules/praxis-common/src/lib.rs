pub mod config;
pub mod error;
pub mod radar;
pub mod types;

pub use config::Config;
pub use error::PraxisError;
pub use radar::{Movement, Quadrant, RadarTechnique, Ring};
pub use types::{
    Context, ContextCreate, Evidence, EvidenceCreate, Methodology, MethodologyCreate, Practice,
    PracticeCreate, Priority, Rule, RuleCreate,
};

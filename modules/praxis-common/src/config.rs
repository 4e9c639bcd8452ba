use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Radar scraping
    pub radar_base_url: String,
    /// Politeness delay between technique fetches in a full pipeline run.
    pub scrape_delay_secs: u64,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// local-development defaults where a value is not set.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: env_or("NEO4J_URI", "bolt://localhost:7687"),
            neo4j_user: env_or("NEO4J_USER", "neo4j"),
            neo4j_password: env_or("NEO4J_PASSWORD", "password"),
            radar_base_url: env_or("RADAR_BASE_URL", "https://www.thoughtworks.com/radar"),
            scrape_delay_secs: env_or("SCRAPE_DELAY_SECS", "2")
                .parse()
                .expect("SCRAPE_DELAY_SECS must be a number"),
            api_host: env_or("API_HOST", "0.0.0.0"),
            api_port: env_or("API_PORT", "8000")
                .parse()
                .expect("API_PORT must be a number"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PraxisError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<neo4rs::Error> for PraxisError {
    fn from(e: neo4rs::Error) -> Self {
        PraxisError::Database(e.to_string())
    }
}

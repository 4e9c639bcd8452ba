use neo4rs::{query, ConfigBuilder, Graph};

/// Thin wrapper around `neo4rs::Graph` providing connection setup.
///
/// Cloning is cheap (the underlying driver is a connection pool handle), so
/// repositories each hold their own clone rather than sharing a global.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(200)
            .max_connections(8)
            .build()
            .expect("valid neo4rs config");
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Round-trip a trivial query. Used by the API health check.
    pub async fn ping(&self) -> Result<(), neo4rs::Error> {
        let mut stream = self.graph.execute(query("RETURN 1 AS ping")).await?;
        while stream.next().await?.is_some() {}
        Ok(())
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}

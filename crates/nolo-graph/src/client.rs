//! Neo4j connection management and shared graph client.

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::Deserialize;

use crate::statement::{CypherRunner, Statement};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
///
/// Deserialized from the `[neo4j]` config section; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "ontology".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }
}

impl CypherRunner for GraphClient {
    async fn execute(&self, statement: Statement) -> Result<(), GraphError> {
        tracing::trace!(cypher = %statement.text, "Executing statement");
        self.run(statement.to_query()).await
    }

    async fn fetch_strings(
        &self,
        statement: Statement,
        column: &str,
    ) -> Result<Vec<String>, GraphError> {
        let rows = self.query_rows(statement.to_query()).await?;
        rows.iter()
            .map(|row| read_column(row.get::<String>(column), column))
            .collect()
    }

    async fn fetch_count(&self, statement: Statement, column: &str) -> Result<i64, GraphError> {
        match self.query_one(statement.to_query()).await? {
            Some(row) => read_column(row.get::<i64>(column), column),
            None => Ok(0),
        }
    }
}

/// A missing or mistyped column is an error, never a default value.
fn read_column<T, E: std::fmt::Display>(
    value: Result<T, E>,
    column: &str,
) -> Result<T, GraphError> {
    value.map_err(|e| GraphError::Serialization(format!("Failed to read column {column}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GraphConfig =
            serde_json::from_str(r#"{"uri": "bolt://graph:7687", "password": "secret"}"#).unwrap();
        assert_eq!(config.uri, "bolt://graph:7687");
        assert_eq!(config.password, "secret");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.fetch_size, 256);
    }

    #[test]
    fn test_unreadable_count_column_is_an_error() {
        let value: Result<i64, String> = Err("no such column".to_string());

        match read_column(value, "merged") {
            Err(GraphError::Serialization(msg)) => {
                assert!(msg.contains("merged"));
                assert!(msg.contains("no such column"));
            }
            other => panic!("expected Serialization, got {other:?}"),
        }
        assert_eq!(read_column(Ok::<i64, String>(3), "merged").unwrap(), 3);
    }
}

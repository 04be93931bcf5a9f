//! Cypher statements and the runner seam they execute through.

use std::future::Future;

use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType, Query};
use serde_json::{Map, Value};

use crate::client::GraphError;

/// A Cypher statement with JSON-typed parameters.
///
/// Parameters stay inspectable until execution, when they are converted to
/// Bolt values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Map<String, Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn get_param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Build the neo4rs query for this statement.
    pub fn to_query(&self) -> Query {
        self.params
            .iter()
            .fold(neo4rs::query(&self.text), |q, (key, value)| {
                q.param(key, to_bolt(value))
            })
    }
}

/// Executes statements against a graph store.
///
/// Everything that writes to or reads from the store is generic over this
/// trait.
pub trait CypherRunner: Send + Sync {
    /// Run a statement, discarding any result rows.
    fn execute(&self, statement: Statement) -> impl Future<Output = Result<(), GraphError>> + Send;

    /// Run a statement and collect one string column from every row.
    fn fetch_strings(
        &self,
        statement: Statement,
        column: &str,
    ) -> impl Future<Output = Result<Vec<String>, GraphError>> + Send;

    /// Run a statement and read an integer column from the first row (0 if
    /// there are no rows).
    fn fetch_count(
        &self,
        statement: Statement,
        column: &str,
    ) -> impl Future<Output = Result<i64, GraphError>> + Send;
}

/// Convert a JSON value to its Bolt equivalent.
pub fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => BoltType::from(s.as_str()),
        Value::Array(items) => {
            let mut list = BoltList::with_capacity(items.len());
            for item in items {
                list.push(to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(map) => {
            let mut bolt = BoltMap::with_capacity(map.len());
            for (key, item) in map {
                bolt.put(BoltString::from(key.as_str()), to_bolt(item));
            }
            BoltType::Map(bolt)
        }
    }
}

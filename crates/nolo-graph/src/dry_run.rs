//! A runner that records statements instead of executing them.

use std::sync::{Mutex, MutexGuard};

use crate::client::GraphError;
use crate::statement::{CypherRunner, Statement};

/// Records every statement it is given, in order.
///
/// Reads return nothing; counts report a single match so relationship
/// ingestion previews as if every endpoint exists.
#[derive(Debug, Default)]
pub struct DryRunner {
    statements: Mutex<Vec<Statement>>,
}

impl DryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded statements.
    pub fn statements(&self) -> Vec<Statement> {
        self.lock().clone()
    }

    /// Recorded statement texts, in order.
    pub fn texts(&self) -> Vec<String> {
        self.lock().iter().map(|s| s.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Statement>> {
        // A poisoned log is still a valid log.
        self.statements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CypherRunner for DryRunner {
    async fn execute(&self, statement: Statement) -> Result<(), GraphError> {
        self.lock().push(statement);
        Ok(())
    }

    async fn fetch_strings(
        &self,
        statement: Statement,
        _column: &str,
    ) -> Result<Vec<String>, GraphError> {
        self.lock().push(statement);
        Ok(Vec::new())
    }

    async fn fetch_count(&self, statement: Statement, _column: &str) -> Result<i64, GraphError> {
        self.lock().push(statement);
        Ok(1)
    }
}

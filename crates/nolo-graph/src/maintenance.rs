//! Schema application and destructive database maintenance.

use crate::client::GraphError;
use crate::statement::{CypherRunner, Statement};

/// Rows deleted per inner transaction when clearing the store.
pub const DELETE_BATCH_SIZE: usize = 10_000;

/// Apply DDL statements in order, stopping at the first failure.
pub async fn apply_statements<R: CypherRunner>(
    runner: &R,
    statements: &[String],
) -> Result<usize, GraphError> {
    for text in statements {
        runner.execute(Statement::new(text.as_str())).await?;
        tracing::debug!(cypher = %text, "Applied statement");
    }
    Ok(statements.len())
}

/// What [`clean_database`] removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub constraints_dropped: usize,
    pub indexes_dropped: usize,
}

/// Drop every constraint and non-lookup index, then delete all data.
///
/// Relationships are deleted before nodes, both in batched transactions that
/// run until nothing matches.
pub async fn clean_database<R: CypherRunner>(runner: &R) -> Result<CleanReport, GraphError> {
    let constraints = runner
        .fetch_strings(
            Statement::new("SHOW CONSTRAINTS YIELD name RETURN name"),
            "name",
        )
        .await?;
    for name in &constraints {
        runner.execute(drop_constraint(name)).await?;
    }
    tracing::info!(count = constraints.len(), "Dropped constraints");

    let indexes = runner
        .fetch_strings(
            Statement::new("SHOW INDEXES YIELD name, type WHERE type <> 'LOOKUP' RETURN name"),
            "name",
        )
        .await?;
    for name in &indexes {
        runner.execute(drop_index(name)).await?;
    }
    tracing::info!(count = indexes.len(), "Dropped indexes");

    runner
        .execute(Statement::new(batched_delete("MATCH ()-[r]->()", "r", "DELETE r")))
        .await?;
    runner
        .execute(Statement::new(batched_delete("MATCH (n)", "n", "DETACH DELETE n")))
        .await?;
    tracing::info!("Deleted all relationships and nodes");

    Ok(CleanReport {
        constraints_dropped: constraints.len(),
        indexes_dropped: indexes.len(),
    })
}

fn drop_constraint(name: &str) -> Statement {
    Statement::new(format!("DROP CONSTRAINT {} IF EXISTS", quote_name(name)))
}

fn drop_index(name: &str) -> Statement {
    Statement::new(format!("DROP INDEX {} IF EXISTS", quote_name(name)))
}

fn quote_name(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Every row of `pattern` feeds the subquery, so the delete is unbounded.
fn batched_delete(pattern: &str, var: &str, delete: &str) -> String {
    format!("{pattern} CALL ({var}) {{ {delete} }} IN TRANSACTIONS OF {DELETE_BATCH_SIZE} ROWS")
}

//! Row ingestion: idempotent node and relationship upserts.
//!
//! Each row is written with its own statement. A row that lacks its key, or
//! whose write fails, is logged and counted, and the batch carries on.

use nolo_core::ddl::cypher_ident;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::statement::{CypherRunner, Statement};

/// A flat property map as read from a tabular source.
pub type Row = Map<String, Value>;

/// Outcome of a node ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub upserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of a relationship ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelIngestReport {
    pub merged: usize,
    pub unmatched: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Where a relationship's endpoints live and which row fields identify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSpec {
    pub rel_type: String,
    pub from_label: String,
    pub from_key: String,
    pub to_label: String,
    pub to_key: String,
    /// Row field holding the source endpoint's key value.
    pub from_field: String,
    /// Row field holding the target endpoint's key value.
    pub to_field: String,
}

/// Upsert one `label` node per row, keyed on the row's `key` field.
///
/// Every row property (key included) is set on the node.
pub async fn ingest_nodes<R: CypherRunner>(
    runner: &R,
    label: &str,
    key: &str,
    rows: &[Row],
) -> IngestReport {
    let mut report = IngestReport::default();
    let text = format!(
        "MERGE (n:{} {{{}: $key_value}}) SET n += $props",
        cypher_ident(label),
        cypher_ident(key)
    );

    for (index, row) in rows.iter().enumerate() {
        let Some(value) = key_value(row, key) else {
            tracing::warn!(label, key, row = index, "Skipping row with missing key");
            report.skipped += 1;
            continue;
        };

        let stmt = Statement::new(text.as_str())
            .param("key_value", value.clone())
            .param("props", normalize_row(row));

        match runner.execute(stmt).await {
            Ok(()) => report.upserted += 1,
            Err(e) => {
                tracing::error!(label, key, key_value = %value, error = %e, "Failed to upsert node");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        label,
        upserted = report.upserted,
        skipped = report.skipped,
        failed = report.failed,
        "Node ingestion complete"
    );
    report
}

/// Merge one relationship per row between existing endpoint nodes.
///
/// Endpoint keys are compared as strings, so a row carrying `4411.0` matches
/// a node keyed `"4411"`. The row fields other than the two endpoint fields
/// become relationship properties. Rows whose endpoints are not found create
/// nothing and are counted as unmatched.
pub async fn ingest_relationships<R: CypherRunner>(
    runner: &R,
    spec: &RelationshipSpec,
    rows: &[Row],
) -> RelIngestReport {
    let mut report = RelIngestReport::default();
    let text = relationship_text(spec);

    for (index, row) in rows.iter().enumerate() {
        let (Some(from_value), Some(to_value)) =
            (key_value(row, &spec.from_field), key_value(row, &spec.to_field))
        else {
            tracing::warn!(
                rel_type = %spec.rel_type,
                row = index,
                "Skipping row with missing endpoint key"
            );
            report.skipped += 1;
            continue;
        };

        let mut props = normalize_row(row);
        props.remove(&spec.from_field);
        props.remove(&spec.to_field);

        let stmt = Statement::new(text.as_str())
            .param("from_value", from_value.clone())
            .param("to_value", to_value.clone())
            .param("props", props);

        match runner.fetch_count(stmt, "merged").await {
            Ok(0) => {
                tracing::debug!(
                    rel_type = %spec.rel_type,
                    from = %from_value,
                    to = %to_value,
                    "No matching endpoints"
                );
                report.unmatched += 1;
            }
            Ok(_) => report.merged += 1,
            Err(e) => {
                tracing::error!(
                    rel_type = %spec.rel_type,
                    from = %from_value,
                    to = %to_value,
                    error = %e,
                    "Failed to merge relationship"
                );
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        rel_type = %spec.rel_type,
        merged = report.merged,
        unmatched = report.unmatched,
        skipped = report.skipped,
        failed = report.failed,
        "Relationship ingestion complete"
    );
    report
}

fn relationship_text(spec: &RelationshipSpec) -> String {
    format!(
        "MATCH (a:{from_label}) WHERE toString(a.{from_key}) = toString($from_value)
         MATCH (b:{to_label}) WHERE toString(b.{to_key}) = toString($to_value)
         MERGE (a)-[r:{rel_type}]->(b)
         SET r += $props
         RETURN count(r) AS merged",
        from_label = cypher_ident(&spec.from_label),
        from_key = cypher_ident(&spec.from_key),
        to_label = cypher_ident(&spec.to_label),
        to_key = cypher_ident(&spec.to_key),
        rel_type = cypher_ident(&spec.rel_type),
    )
}

/// The normalised value of `field`, or `None` if it is absent, null, or blank.
fn key_value(row: &Row, field: &str) -> Option<Value> {
    match row.get(field)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        v => Some(normalize(v)),
    }
}

fn normalize_row(row: &Row) -> Row {
    row.iter().map(|(k, v)| (k.clone(), normalize(v))).collect()
}

/// Integral floats become integers; everything else is unchanged.
fn normalize(value: &Value) -> Value {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    match value {
        Value::Number(n) if !n.is_i64() && !n.is_u64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < I64_BOUND => {
                Value::Number(Number::from(f as i64))
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GraphError;
    use crate::dry_run::DryRunner;
    use serde_json::json;
    use std::sync::Mutex;

    fn rows(value: Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    /// Fails statements whose `param` equals `poison`; counts from a queue.
    #[derive(Default)]
    struct FlakyRunner {
        param: &'static str,
        poison: Option<Value>,
        counts: Mutex<Vec<i64>>,
        seen: Mutex<Vec<Statement>>,
    }

    impl FlakyRunner {
        fn check(&self, statement: &Statement) -> Result<(), GraphError> {
            self.seen.lock().unwrap().push(statement.clone());
            match &self.poison {
                Some(bad) if statement.get_param(self.param) == Some(bad) => Err(
                    GraphError::Serialization("constraint violation".to_string()),
                ),
                _ => Ok(()),
            }
        }
    }

    impl CypherRunner for FlakyRunner {
        async fn execute(&self, statement: Statement) -> Result<(), GraphError> {
            self.check(&statement)
        }

        async fn fetch_strings(
            &self,
            statement: Statement,
            _column: &str,
        ) -> Result<Vec<String>, GraphError> {
            self.check(&statement)?;
            Ok(Vec::new())
        }

        async fn fetch_count(&self, statement: Statement, _column: &str) -> Result<i64, GraphError> {
            self.check(&statement)?;
            let mut counts = self.counts.lock().unwrap();
            Ok(if counts.is_empty() { 1 } else { counts.remove(0) })
        }
    }

    fn listed_on() -> RelationshipSpec {
        RelationshipSpec {
            rel_type: "ListedOn".into(),
            from_label: "Listing".into(),
            from_key: "id".into(),
            to_label: "TradingVenue".into(),
            to_key: "id".into(),
            from_field: "listing_id".into(),
            to_field: "venue_id".into(),
        }
    }

    #[tokio::test]
    async fn test_skip_rows_without_key() {
        let runner = DryRunner::new();
        let batch = rows(json!([{"id": "A"}, {"id": null}, {"id": "B"}]));

        let report = ingest_nodes(&runner, "Listing", "id", &batch).await;

        assert_eq!(
            report,
            IngestReport {
                upserted: 2,
                skipped: 1,
                failed: 0
            }
        );
        let keys: Vec<_> = runner
            .statements()
            .iter()
            .map(|s| s.get_param("key_value").cloned())
            .collect();
        assert_eq!(keys, vec![Some(json!("A")), Some(json!("B"))]);
    }

    #[tokio::test]
    async fn test_blank_and_absent_keys_skipped() {
        let runner = DryRunner::new();
        let batch = rows(json!([{"id": "  "}, {"name": "x"}, {"id": ""}]));

        let report = ingest_nodes(&runner, "Listing", "id", &batch).await;

        assert_eq!(report.skipped, 3);
        assert!(runner.is_empty());
    }

    #[tokio::test]
    async fn test_node_statement_shape() {
        let runner = DryRunner::new();
        let batch = rows(json!([{"id": "L1", "ticker": "ABC", "lot": 10.0}]));

        ingest_nodes(&runner, "Listing", "id", &batch).await;

        let stmt = &runner.statements()[0];
        assert_eq!(stmt.text, "MERGE (n:Listing {id: $key_value}) SET n += $props");
        assert_eq!(
            stmt.get_param("props"),
            Some(&json!({"id": "L1", "ticker": "ABC", "lot": 10}))
        );
    }

    #[tokio::test]
    async fn test_failed_row_does_not_abort_batch() {
        let runner = FlakyRunner {
            param: "key_value",
            poison: Some(json!("B")),
            ..Default::default()
        };
        let batch = rows(json!([{"id": "A"}, {"id": "B"}, {"id": "C"}]));

        let report = ingest_nodes(&runner, "Issuer", "id", &batch).await;

        assert_eq!(
            report,
            IngestReport {
                upserted: 2,
                skipped: 0,
                failed: 1
            }
        );
        assert_eq!(runner.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_relationship_statement_shape() {
        let runner = DryRunner::new();
        let batch = rows(json!([{"listing_id": 4411.0, "venue_id": "XSWX", "since": "2020"}]));

        let report = ingest_relationships(&runner, &listed_on(), &batch).await;

        assert_eq!(report.merged, 1);
        let stmt = &runner.statements()[0];
        assert!(stmt
            .text
            .contains("MATCH (a:Listing) WHERE toString(a.id) = toString($from_value)"));
        assert!(stmt.text.contains("MERGE (a)-[r:ListedOn]->(b)"));
        assert_eq!(stmt.get_param("from_value"), Some(&json!(4411)));
        assert_eq!(stmt.get_param("to_value"), Some(&json!("XSWX")));
        assert_eq!(stmt.get_param("props"), Some(&json!({"since": "2020"})));
    }

    #[tokio::test]
    async fn test_relationship_report_counts() {
        let runner = FlakyRunner {
            param: "to_value",
            poison: Some(json!("BAD")),
            counts: Mutex::new(vec![1, 0]),
            ..Default::default()
        };
        let batch = rows(json!([
            {"listing_id": "L1", "venue_id": "XSWX"},
            {"listing_id": "L2", "venue_id": "NOPE"},
            {"listing_id": "L3"},
            {"listing_id": "L4", "venue_id": "BAD"},
        ]));

        let report = ingest_relationships(&runner, &listed_on(), &batch).await;

        assert_eq!(
            report,
            RelIngestReport {
                merged: 1,
                unmatched: 1,
                skipped: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&json!(4411.0)), json!(4411));
        assert_eq!(normalize(&json!(-2.0)), json!(-2));
        assert_eq!(normalize(&json!(4411.5)), json!(4411.5));
        assert_eq!(normalize(&json!(7)), json!(7));
        assert_eq!(normalize(&json!(1e300)), json!(1e300));
        assert_eq!(normalize(&json!("4411.0")), json!("4411.0"));
    }

    #[test]
    fn test_labels_are_quoted() {
        let mut spec = listed_on();
        spec.rel_type = "HAS PART".into();
        assert!(relationship_text(&spec).contains("[r:`HAS PART`]"));
    }
}

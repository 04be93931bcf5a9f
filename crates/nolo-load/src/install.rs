//! Schema installation: ontology metadata, constraints, and optional indexes.

use nolo_core::catalog::{self, OntologySchema};
use nolo_core::{ddl, EntityDef};
use nolo_graph::maintenance::apply_statements;
use nolo_graph::ontology::{persist_entity, persist_relationships};
use nolo_graph::CypherRunner;
use serde::Serialize;

use crate::config::LoaderConfig;
use crate::error::Result;

/// Counts of what an installation wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub node_types: usize,
    pub constraints: usize,
    pub relationship_types: usize,
    pub indexes: usize,
}

/// Install the domain catalog's schema.
pub async fn install_schema<R: CypherRunner>(
    runner: &R,
    config: &LoaderConfig,
) -> Result<InstallReport> {
    install(runner, &catalog::ontology_schema(), config).await
}

/// Install `schema`: entities, complex types, abstract markers, then
/// relationships and (optionally) loading indexes.
///
/// Stops at the first store failure; what was written before it stays.
pub async fn install<R: CypherRunner>(
    runner: &R,
    schema: &OntologySchema,
    config: &LoaderConfig,
) -> Result<InstallReport> {
    let mut report = InstallReport::default();

    for entity in &schema.entities {
        install_entity(runner, entity, true, &mut report).await?;
    }

    for complex in &schema.complex_types {
        let entity = EntityDef::from(complex.clone());
        install_entity(runner, &entity, config.complex_constraints, &mut report).await?;
    }

    for marker in &schema.abstract_types {
        install_entity(runner, marker, false, &mut report).await?;
    }

    for group in &schema.relationship_groups {
        persist_relationships(runner, &group.relationships).await?;
        report.relationship_types += group.relationships.len();
        tracing::info!(
            group = group.name,
            count = group.relationships.len(),
            "Persisted relationship group"
        );
    }

    if config.loading_indexes {
        report.indexes = apply_statements(runner, &ddl::loading_indexes()).await?;
    }

    tracing::info!(
        node_types = report.node_types,
        constraints = report.constraints,
        relationship_types = report.relationship_types,
        indexes = report.indexes,
        "Schema installed"
    );
    Ok(report)
}

async fn install_entity<R: CypherRunner>(
    runner: &R,
    entity: &EntityDef,
    with_constraints: bool,
    report: &mut InstallReport,
) -> Result<()> {
    persist_entity(runner, entity).await?;
    report.node_types += 1;

    if with_constraints {
        report.constraints += apply_statements(runner, &ddl::constraints(entity)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nolo_graph::DryRunner;

    fn constraint_count(runner: &DryRunner) -> usize {
        runner
            .texts()
            .iter()
            .filter(|t| t.starts_with("CREATE CONSTRAINT"))
            .count()
    }

    #[tokio::test]
    async fn test_install_default_config() {
        let runner = DryRunner::new();
        let schema = catalog::ontology_schema();

        let report = install_schema(&runner, &LoaderConfig::default()).await.unwrap();

        assert_eq!(
            report.node_types,
            schema.entities.len() + schema.complex_types.len() + schema.abstract_types.len()
        );
        assert_eq!(report.relationship_types, schema.relationships().count());
        assert_eq!(report.indexes, 0);
        assert_eq!(report.constraints, constraint_count(&runner));
        assert!(!runner.texts().iter().any(|t| t.starts_with("CREATE INDEX")));
    }

    #[tokio::test]
    async fn test_complex_constraints_toggle() {
        let with = DryRunner::new();
        let without = DryRunner::new();
        let off = LoaderConfig {
            complex_constraints: false,
            ..Default::default()
        };

        let full = install_schema(&with, &LoaderConfig::default()).await.unwrap();
        let reduced = install_schema(&without, &off).await.unwrap();

        let schema = catalog::ontology_schema();
        let complex: usize = schema
            .complex_types
            .iter()
            .map(|c| ddl::constraints(&EntityDef::from(c.clone())).len())
            .sum();
        assert!(complex > 0);
        assert_eq!(full.constraints - reduced.constraints, complex);
        assert_eq!(full.node_types, reduced.node_types);
    }

    #[tokio::test]
    async fn test_loading_indexes_applied_last() {
        let runner = DryRunner::new();
        let config = LoaderConfig {
            loading_indexes: true,
            ..Default::default()
        };

        let report = install_schema(&runner, &config).await.unwrap();

        assert_eq!(report.indexes, 2);
        let texts = runner.texts();
        assert!(texts[texts.len() - 2..]
            .iter()
            .all(|t| t.starts_with("CREATE INDEX IF NOT EXISTS")));
    }

    #[tokio::test]
    async fn test_constraints_follow_their_node_type() {
        let runner = DryRunner::new();
        install_schema(&runner, &LoaderConfig::default()).await.unwrap();

        let texts = runner.texts();
        let listing_constraint = texts
            .iter()
            .position(|t| t.contains("FOR (n:Listing) REQUIRE n.id IS UNIQUE"))
            .unwrap();
        let listing_node = runner
            .statements()
            .iter()
            .position(|s| {
                s.text.starts_with("MERGE (n:NodeType {name: $name, key: $key})")
                    && s.get_param("name") == Some(&serde_json::json!("Listing"))
            })
            .unwrap();
        assert!(listing_node < listing_constraint);
    }
}

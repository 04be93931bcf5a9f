//! Ontology persistence: the schema itself as a queryable metadata subgraph.
//!
//! Entity and relationship definitions are merged as `NodeType`,
//! `PropertyDefinition`, and `RelType` nodes linked by `HAS_PROPERTY`,
//! `FROM`, and `TO`. Every statement is a MERGE, so reinstalling the schema
//! converges to the same metadata graph.

use nolo_core::{EntityDef, PropertyDef, RelTypeDef};

use crate::client::GraphError;
use crate::statement::{CypherRunner, Statement};

pub const NODE_TYPE: &str = "NodeType";
pub const PROPERTY_DEFINITION: &str = "PropertyDefinition";
pub const REL_TYPE: &str = "RelType";

/// Merge the `NodeType` for an entity plus one `PropertyDefinition` per property.
pub async fn persist_entity<R: CypherRunner>(
    runner: &R,
    entity: &EntityDef,
) -> Result<(), GraphError> {
    for stmt in entity_statements(entity) {
        runner.execute(stmt).await?;
    }
    tracing::debug!(
        node_type = %entity.name,
        properties = entity.properties.len(),
        "Persisted node type"
    );
    Ok(())
}

/// Merge a `RelType` node per definition and link it to its endpoint node types.
///
/// Endpoint node types not yet in the ontology are merged as name-only
/// placeholders.
pub async fn persist_relationships<R: CypherRunner>(
    runner: &R,
    rels: &[RelTypeDef],
) -> Result<(), GraphError> {
    for rel in rels {
        for stmt in relationship_statements(rel) {
            runner.execute(stmt).await?;
        }
    }
    tracing::debug!(count = rels.len(), "Persisted relationship types");
    Ok(())
}

/// Statements that persist one entity definition.
pub fn entity_statements(entity: &EntityDef) -> Vec<Statement> {
    let mut stmts = Vec::with_capacity(entity.properties.len() + 1);

    stmts.push(
        Statement::new(format!(
            "MERGE (n:{NODE_TYPE} {{name: $name, key: $key}}) SET n.abstract = $abstract"
        ))
        .param("name", entity.name.as_str())
        .param("key", entity.key.as_str())
        .param("abstract", entity.is_abstract),
    );

    stmts.extend(
        entity
            .properties
            .iter()
            .map(|p| property_statement(&entity.name, p)),
    );

    stmts
}

fn property_statement(node_name: &str, prop: &PropertyDef) -> Statement {
    Statement::new(format!(
        "MATCH (n:{NODE_TYPE} {{name: $node_name}})
         MERGE (p:{PROPERTY_DEFINITION} {{node: $node_name, name: $prop_name}})
         SET p.type = $type, p.required = $required, p.unique = $unique
         MERGE (n)-[:HAS_PROPERTY]->(p)"
    ))
    .param("node_name", node_name)
    .param("prop_name", prop.name.as_str())
    .param("type", prop.ty.as_str())
    .param("required", prop.required)
    .param("unique", prop.unique)
}

/// Statements that persist one relationship definition.
pub fn relationship_statements(rel: &RelTypeDef) -> Vec<Statement> {
    let placeholder = |label: &str| {
        Statement::new(format!("MERGE (n:{NODE_TYPE} {{name: $name}})")).param("name", label)
    };

    vec![
        placeholder(&rel.from_label),
        placeholder(&rel.to_label),
        Statement::new(format!(
            "MERGE (r:{REL_TYPE} {{name: $name}}) SET r.from_key = $from_key, r.to_key = $to_key"
        ))
        .param("name", rel.name.as_str())
        .param("from_key", rel.from_key.as_str())
        .param("to_key", rel.to_key.as_str()),
        Statement::new(format!(
            "MATCH (r:{REL_TYPE} {{name: $rel_name}})
             MATCH (from:{NODE_TYPE} {{name: $from_label}})
             MATCH (to:{NODE_TYPE} {{name: $to_label}})
             MERGE (r)-[:FROM]->(from)
             MERGE (r)-[:TO]->(to)"
        ))
        .param("rel_name", rel.name.as_str())
        .param("from_label", rel.from_label.as_str())
        .param("to_label", rel.to_label.as_str()),
    ]
}

//! Constraint and index DDL for Neo4j.
//!
//! Every statement carries `IF NOT EXISTS`, so applying the same sequence to
//! a store that already has it is a no-op.

use crate::types::EntityDef;

/// Constraint statements for an entity.
///
/// Uniqueness statements come first (in property declaration order), then
/// existence statements. Abstract entities yield nothing.
pub fn constraints(entity: &EntityDef) -> Vec<String> {
    if entity.is_abstract {
        return Vec::new();
    }

    let label = cypher_ident(&entity.name);
    let unique = entity.properties.iter().filter(|p| p.unique).map(|p| {
        format!(
            "CREATE CONSTRAINT IF NOT EXISTS FOR (n:{label}) REQUIRE n.{} IS UNIQUE",
            cypher_ident(&p.name)
        )
    });
    let required = entity.properties.iter().filter(|p| p.required).map(|p| {
        format!(
            "CREATE CONSTRAINT IF NOT EXISTS FOR (n:{label}) REQUIRE n.{} IS NOT NULL",
            cypher_ident(&p.name)
        )
    });

    unique.chain(required).collect()
}

/// Non-unique lookup indexes for properties that bulk loads MERGE or MATCH on
/// but that the model-driven constraints do not cover.
pub fn loading_indexes() -> Vec<String> {
    [("CrossCurrencyRate", "id"), ("Quote", "listing_id")]
        .iter()
        .map(|(label, prop)| index(label, prop))
        .collect()
}

/// A plain range index on `label.prop`.
pub fn index(label: &str, prop: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS FOR (n:{}) ON (n.{})",
        cypher_ident(label),
        cypher_ident(prop)
    )
}

/// Render a label, relationship type, or property name for interpolation.
///
/// Plain identifiers pass through unchanged; anything else is backtick-quoted
/// with embedded backticks doubled.
pub fn cypher_ident(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

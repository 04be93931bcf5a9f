//! Schema definitions derived from model descriptors.
//!
//! These are the intermediate representations shared by the constraint
//! generator, the ontology persister, and the ingestor. They are built fresh
//! by every extraction call and never mutated afterwards.

use serde::Serialize;

/// One scalar attribute of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub required: bool,
    pub unique: bool,
}

/// A node label in the target graph.
///
/// `key` is the canonical key (see [`crate::key::infer_key`]), used to
/// cross-reference schema artifacts. Abstract entities carry no properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDef {
    pub name: String,
    pub key: String,
    pub properties: Vec<PropertyDef>,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
}

impl EntityDef {
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }
}

/// An embedded value object promoted to its own auxiliary node type.
///
/// Holds only basic-typed fields; nested structured fields are modelled as
/// relationships instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexPropertiesDef {
    pub name: String,
    pub key: String,
    pub properties: Vec<PropertyDef>,
}

impl From<ComplexPropertiesDef> for EntityDef {
    fn from(def: ComplexPropertiesDef) -> Self {
        Self {
            name: def.name,
            key: def.key,
            properties: def.properties,
            is_abstract: false,
        }
    }
}

/// A typed, directed relationship definition between two node types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelTypeDef {
    pub name: String,
    pub from_label: String,
    pub to_label: String,
    pub from_key: String,
    pub to_key: String,
}

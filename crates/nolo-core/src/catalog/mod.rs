//! The financial-instrument domain catalog.
//!
//! Static descriptors registered once, plus the bundled [`OntologySchema`]
//! that schema installation walks.

pub mod models;
pub mod relationships;

pub use relationships::{
    all_relationship_types, bond_property_relationship_types,
    complex_properties_relationship_types, inheritance_relationship_types,
    property_relationship_types,
};

use serde::Serialize;

use crate::extract::{complex_properties_node_types, extract_entity};
use crate::types::{ComplexPropertiesDef, EntityDef, RelTypeDef};

/// A named group of relationship definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipGroup {
    pub name: &'static str,
    pub relationships: Vec<RelTypeDef>,
}

/// Everything schema installation needs, extracted from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OntologySchema {
    pub entities: Vec<EntityDef>,
    pub complex_types: Vec<ComplexPropertiesDef>,
    pub abstract_types: Vec<EntityDef>,
    pub relationship_groups: Vec<RelationshipGroup>,
}

impl OntologySchema {
    pub fn relationships(&self) -> impl Iterator<Item = &RelTypeDef> {
        self.relationship_groups
            .iter()
            .flat_map(|g| g.relationships.iter())
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Extract the full ontology for the domain catalog.
pub fn ontology_schema() -> OntologySchema {
    let structured = models::structured_types();

    let entities = models::entities()
        .iter()
        .map(|m| extract_entity(m, false))
        .collect();

    let abstract_types = structured
        .iter()
        .filter(|m| m.is_abstract)
        .map(|m| extract_entity(m, true))
        .collect();

    let relationship_groups = vec![
        RelationshipGroup {
            name: "core",
            relationships: all_relationship_types(),
        },
        RelationshipGroup {
            name: "property",
            relationships: property_relationship_types(),
        },
        RelationshipGroup {
            name: "bond_property",
            relationships: bond_property_relationship_types(),
        },
        RelationshipGroup {
            name: "inheritance",
            relationships: inheritance_relationship_types(),
        },
        RelationshipGroup {
            name: "complex_property",
            relationships: complex_properties_relationship_types(),
        },
    ];

    OntologySchema {
        entities,
        complex_types: complex_properties_node_types(&structured),
        abstract_types,
        relationship_groups,
    }
}

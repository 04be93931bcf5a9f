//! nolo-core: Schema derivation for the ontology loader.
//!
//! This crate turns declarative model descriptors into graph schema artifacts:
//! - Model descriptors (fields, type tags, required/unique flags)
//! - Canonical key inference from entity names
//! - Entity, complex-property, and relationship type definitions
//! - Constraint and index DDL for Neo4j
//! - The financial-instrument domain catalog
//!
//! Everything here is pure: no I/O, no shared state. Every extraction call
//! produces fresh definitions from its input.

pub mod catalog;
pub mod ddl;
pub mod descriptor;
pub mod extract;
pub mod key;
pub mod types;

pub use descriptor::{FieldDescriptor, FieldType, ModelDescriptor, TypeRegistry};
pub use key::infer_key;
pub use types::{ComplexPropertiesDef, EntityDef, PropertyDef, RelTypeDef};

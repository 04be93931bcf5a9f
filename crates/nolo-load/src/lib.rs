//! nolo-load: Schema installation and data loading for the ontology loader.
//!
//! Installs the domain catalog into Neo4j (ontology metadata, constraints,
//! optional loading indexes) and feeds row files to the ingestor, one file at
//! a time or a whole directory of known sources.

pub mod bulk;
pub mod config;
pub mod error;
pub mod install;
pub mod rows;

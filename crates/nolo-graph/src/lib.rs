//! nolo-graph: Neo4j access for the ontology loader.
//!
//! Every write the loader performs flows through the [`CypherRunner`] seam:
//! ontology persistence, constraint application, row ingestion, and
//! maintenance. [`GraphClient`] runs statements against Neo4j; [`DryRunner`]
//! records them instead.

pub mod client;
pub mod dry_run;
pub mod ingest;
pub mod maintenance;
pub mod ontology;
pub mod statement;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use dry_run::DryRunner;
pub use ingest::{IngestReport, RelIngestReport, RelationshipSpec, Row};
pub use statement::{CypherRunner, Statement};

//! CLI entry point for the nolo ontology loader.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use nolo_core::{catalog, ddl};
use nolo_graph::ingest::{ingest_nodes, ingest_relationships};
use nolo_graph::maintenance::{apply_statements, clean_database};
use nolo_graph::{DryRunner, GraphClient, RelationshipSpec};

use nolo_load::bulk::load_directory;
use nolo_load::config::load_settings;
use nolo_load::install::install_schema;
use nolo_load::rows::{filter_props, read_rows};

#[derive(Parser)]
#[command(name = "nolo")]
#[command(about = "Install the instrument ontology into Neo4j and load data")]
struct Cli {
    /// Config file prefix (default: nolo).
    #[arg(short, long, default_value = "nolo", global = true)]
    config: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Persist ontology metadata and apply constraints.
    InstallSchema {
        /// Print the statements instead of running them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the extracted schema as JSON.
    ShowSchema,

    /// Upsert nodes from a row file.
    LoadNodes {
        /// Node label.
        #[arg(long)]
        label: String,

        /// Row field the nodes are keyed on.
        #[arg(long)]
        key: String,

        /// Keep row fields the catalog entity does not declare.
        #[arg(long)]
        keep_unknown: bool,

        /// JSON array or JSON Lines file.
        rows: PathBuf,
    },

    /// Merge relationships between existing nodes from a row file.
    LoadRelationships {
        #[arg(long)]
        rel_type: String,

        #[arg(long)]
        from_label: String,

        #[arg(long, default_value = "id")]
        from_key: String,

        #[arg(long)]
        to_label: String,

        #[arg(long, default_value = "id")]
        to_key: String,

        /// Row field holding the source node's key value.
        #[arg(long)]
        from_field: String,

        /// Row field holding the target node's key value.
        #[arg(long)]
        to_field: String,

        rows: PathBuf,
    },

    /// Load every known row file in a directory, then their relationships.
    BulkLoad {
        /// Print the statements instead of running them.
        #[arg(long)]
        dry_run: bool,

        /// Directory holding `<source>.json` or `<source>.jsonl` files.
        dir: PathBuf,
    },

    /// Create the lookup indexes used by bulk loads.
    InstallLoadingIndexes,

    /// Drop all constraints and indexes and delete all data.
    CleanDatabase {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("NOLO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let settings = load_settings(&cli.config)?;

    match cli.command {
        Command::ShowSchema => {
            let schema = catalog::ontology_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::InstallSchema { dry_run: true } => {
            let runner = DryRunner::new();
            install_schema(&runner, &settings.loader).await?;
            print_statements(&runner)?;
        }
        Command::InstallSchema { dry_run: false } => {
            let graph = GraphClient::connect(&settings.neo4j).await?;
            let report = install_schema(&graph, &settings.loader).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::LoadNodes {
            label,
            key,
            keep_unknown,
            rows,
        } => {
            let mut batch = read_rows(&rows)?;
            if !keep_unknown {
                let schema = catalog::ontology_schema();
                match schema.entity(&label) {
                    Some(entity) => batch = filter_props(batch, entity, &key),
                    None => tracing::warn!(
                        label = %label,
                        "Label not in catalog; loading all row fields"
                    ),
                }
            }
            let graph = GraphClient::connect(&settings.neo4j).await?;
            let report = ingest_nodes(&graph, &label, &key, &batch).await;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::LoadRelationships {
            rel_type,
            from_label,
            from_key,
            to_label,
            to_key,
            from_field,
            to_field,
            rows,
        } => {
            let batch = read_rows(&rows)?;
            let spec = RelationshipSpec {
                rel_type,
                from_label,
                from_key,
                to_label,
                to_key,
                from_field,
                to_field,
            };
            let graph = GraphClient::connect(&settings.neo4j).await?;
            let report = ingest_relationships(&graph, &spec, &batch).await;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::BulkLoad { dry_run: true, dir } => {
            let runner = DryRunner::new();
            load_directory(&runner, &dir).await?;
            print_statements(&runner)?;
        }
        Command::BulkLoad { dry_run: false, dir } => {
            let graph = GraphClient::connect(&settings.neo4j).await?;
            let report = load_directory(&graph, &dir).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::InstallLoadingIndexes => {
            let graph = GraphClient::connect(&settings.neo4j).await?;
            let applied = apply_statements(&graph, &ddl::loading_indexes()).await?;
            tracing::info!(count = applied, "Loading indexes installed");
        }
        Command::CleanDatabase { yes } => {
            if !yes && !confirm(&settings.neo4j.uri)? {
                anyhow::bail!("Aborted");
            }
            let graph = GraphClient::connect(&settings.neo4j).await?;
            let report = clean_database(&graph).await?;
            tracing::info!(
                constraints = report.constraints_dropped,
                indexes = report.indexes_dropped,
                "Database cleaned"
            );
        }
    }

    Ok(())
}

fn print_statements(runner: &DryRunner) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for stmt in runner.statements() {
        if stmt.params.is_empty() {
            writeln!(out, "{};", stmt.text)?;
        } else {
            writeln!(
                out,
                "{}; // {}",
                stmt.text,
                serde_json::Value::Object(stmt.params)
            )?;
        }
    }
    Ok(())
}

fn confirm(uri: &str) -> anyhow::Result<bool> {
    eprint!("Delete all data and schema at {uri}? Type 'yes' to continue: ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "yes")
}

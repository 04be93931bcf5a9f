//! Error types for the nolo-load crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Graph error: {0}")]
    Graph(#[from] nolo_graph::GraphError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid row at {path}:{line}: {message}")]
    InvalidRow {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;

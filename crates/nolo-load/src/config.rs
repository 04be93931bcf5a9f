//! Configuration for the ontology loader.

use nolo_graph::GraphConfig;
use serde::Deserialize;

use crate::error::Result;

/// Environment variable prefix; `NOLO__NEO4J__URI` overrides `neo4j.uri`.
pub const ENV_PREFIX: &str = "NOLO";

/// Schema installation options.
///
/// Loaded from the `[loader]` section of `nolo.toml` or `NOLO__LOADER__`
/// environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Apply uniqueness/existence constraints to complex-property node types.
    #[serde(default = "default_true")]
    pub complex_constraints: bool,

    /// Create the lookup indexes used by bulk loads.
    #[serde(default)]
    pub loading_indexes: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            complex_constraints: default_true(),
            loading_indexes: false,
        }
    }
}

/// Everything the `nolo` binary reads from config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub neo4j: GraphConfig,
    pub loader: LoaderConfig,
}

/// Load settings from `<file_prefix>.toml` (optional) overlaid by `NOLO__*`
/// environment variables.
pub fn load_settings(file_prefix: &str) -> Result<Settings> {
    let cfg = ::config::Config::builder()
        .add_source(::config::File::with_name(file_prefix).required(false))
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert!(config.complex_constraints);
        assert!(!config.loading_indexes);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");

        let settings = load_settings(prefix.to_str().unwrap()).unwrap();

        assert_eq!(settings.loader, LoaderConfig::default());
        assert_eq!(settings.neo4j.uri, "bolt://localhost:7687");
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("nolo.toml"),
            r#"
[neo4j]
uri = "bolt://graph:7687"
password = "secret"

[loader]
loading_indexes = true
"#,
        )
        .unwrap();
        let prefix = dir.path().join("nolo");

        let settings = load_settings(prefix.to_str().unwrap()).unwrap();

        assert_eq!(settings.neo4j.uri, "bolt://graph:7687");
        assert_eq!(settings.neo4j.password, "secret");
        assert_eq!(settings.neo4j.user, "neo4j");
        assert!(settings.loader.loading_indexes);
        assert!(settings.loader.complex_constraints);
    }
}

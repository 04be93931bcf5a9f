//! Directory bulk load.
//!
//! Node files are loaded in dependency order, then the relationships between
//! them are merged from the same files. Each source is `<stem>.json` (one
//! array) or `<stem>.jsonl` in the directory; a missing source is skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nolo_core::catalog::{self, OntologySchema};
use nolo_graph::ingest::{ingest_nodes, ingest_relationships};
use nolo_graph::{CypherRunner, IngestReport, RelIngestReport, RelationshipSpec, Row};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::rows::{filter_props, read_rows};

/// Row field carrying a relationship's source key value.
pub const FROM_VALUE: &str = "from_value";

/// Row field carrying a relationship's target key value.
pub const TO_VALUE: &str = "to_value";

/// Which row fields reach the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fields {
    /// Fields the catalog entity declares, plus the key.
    Catalog,
    /// The key alone.
    KeyOnly,
}

/// Row rewrite applied before field filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepare {
    AsIs,
    /// Set the key to these columns' values joined with `:`.
    SyntheticKey(&'static [&'static str]),
    /// Map source bond columns onto the flat `Bond` record.
    Bond,
}

/// One node source in a bulk load.
#[derive(Debug, Clone, Copy)]
pub struct NodeLoad {
    pub label: &'static str,
    pub key: &'static str,
    pub stem: &'static str,
    pub fields: Fields,
    pub prepare: Prepare,
}

/// Node sources, in load order.
pub const NODE_LOADS: &[NodeLoad] = &[
    NodeLoad {
        label: "InstrumentType",
        key: "id",
        stem: "instrument_types",
        fields: Fields::Catalog,
        prepare: Prepare::AsIs,
    },
    NodeLoad {
        label: "TradingVenue",
        key: "id",
        stem: "trading_venues",
        fields: Fields::Catalog,
        prepare: Prepare::AsIs,
    },
    NodeLoad {
        label: "Instrument",
        key: "id",
        stem: "instruments",
        fields: Fields::KeyOnly,
        prepare: Prepare::AsIs,
    },
    NodeLoad {
        label: "Listing",
        key: "id",
        stem: "listings",
        fields: Fields::Catalog,
        prepare: Prepare::AsIs,
    },
    NodeLoad {
        label: "CrossCurrencyRate",
        key: "id",
        stem: "cross_rates",
        fields: Fields::Catalog,
        prepare: Prepare::SyntheticKey(&["currency", "date"]),
    },
    NodeLoad {
        label: "Bond",
        key: "id",
        stem: "bonds",
        fields: Fields::Catalog,
        prepare: Prepare::Bond,
    },
    NodeLoad {
        label: "Quote",
        key: "id",
        stem: "quotes",
        fields: Fields::Catalog,
        prepare: Prepare::SyntheticKey(&["listing_id", "quote_date"]),
    },
];

/// How a source row names a relationship's two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoints {
    /// Both key values read straight from columns.
    Columns {
        from: &'static str,
        to: &'static str,
    },
    /// A quote's `listing_id` to the listing keyed `<instrument_id>/<listing_id>`.
    ///
    /// Only dated quotes produce a row.
    QuoteOfListing,
}

/// One relationship source in a bulk load.
#[derive(Debug, Clone, Copy)]
pub struct RelLoad {
    pub rel_type: &'static str,
    pub from_label: &'static str,
    pub from_key: &'static str,
    pub to_label: &'static str,
    pub to_key: &'static str,
    pub stem: &'static str,
    pub endpoints: Endpoints,
}

/// Relationship sources, merged after every node source.
pub const REL_LOADS: &[RelLoad] = &[
    RelLoad {
        rel_type: "ListedOn",
        from_label: "Listing",
        from_key: "id",
        to_label: "TradingVenue",
        to_key: "id",
        stem: "listings",
        endpoints: Endpoints::Columns {
            from: "id",
            to: "trading_place_id",
        },
    },
    RelLoad {
        rel_type: "ListingOfInstrument",
        from_label: "Listing",
        from_key: "id",
        to_label: "Instrument",
        to_key: "id",
        stem: "listings",
        endpoints: Endpoints::Columns {
            from: "id",
            to: "instrument_id",
        },
    },
    RelLoad {
        rel_type: "HasType",
        from_label: "Instrument",
        from_key: "id",
        to_label: "InstrumentType",
        to_key: "id",
        stem: "instruments",
        endpoints: Endpoints::Columns {
            from: "id",
            to: "instrument_type_id",
        },
    },
    RelLoad {
        rel_type: "MainTradingPlace",
        from_label: "Instrument",
        from_key: "id",
        to_label: "TradingVenue",
        to_key: "id",
        stem: "instruments",
        endpoints: Endpoints::Columns {
            from: "id",
            to: "main_trading_place_id",
        },
    },
    RelLoad {
        rel_type: "QuoteOfListing",
        from_label: "Quote",
        from_key: "listing_id",
        to_label: "Listing",
        to_key: "id",
        stem: "quotes",
        endpoints: Endpoints::QuoteOfListing,
    },
];

impl RelLoad {
    /// The ingestion spec for rows built by [`RelLoad::endpoint_rows`].
    pub fn spec(&self) -> RelationshipSpec {
        RelationshipSpec {
            rel_type: self.rel_type.into(),
            from_label: self.from_label.into(),
            from_key: self.from_key.into(),
            to_label: self.to_label.into(),
            to_key: self.to_key.into(),
            from_field: FROM_VALUE.into(),
            to_field: TO_VALUE.into(),
        }
    }

    /// One `{from_value, to_value}` row per source row naming both endpoints.
    pub fn endpoint_rows(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter()
            .filter_map(|row| self.endpoints.pair(row))
            .map(|(from, to)| {
                let mut row = Row::new();
                row.insert(FROM_VALUE.into(), Value::String(from));
                row.insert(TO_VALUE.into(), Value::String(to));
                row
            })
            .collect()
    }
}

impl Endpoints {
    fn pair(&self, row: &Row) -> Option<(String, String)> {
        match *self {
            Endpoints::Columns { from, to } => Some((text(row, from)?, text(row, to)?)),
            Endpoints::QuoteOfListing => {
                let listing = text(row, "listing_id")?;
                let instrument = text(row, "instrument_id")?;
                text(row, "quote_date")?;
                let target = format!("{instrument}/{listing}");
                Some((listing, target))
            }
        }
    }
}

impl Prepare {
    /// Rewrite `row` for a node keyed on `key`.
    ///
    /// A synthetic key is left unset when any of its columns is missing, so
    /// the ingestor skips the row.
    pub fn apply(&self, key: &str, mut row: Row) -> Row {
        match *self {
            Prepare::AsIs => row,
            Prepare::SyntheticKey(parts) => {
                if let Some(id) = synthetic_key(&row, parts) {
                    row.insert(key.into(), Value::String(id));
                }
                row
            }
            Prepare::Bond => bond_row(&row),
        }
    }
}

/// `parts` values joined with `:`, or `None` if any is missing or blank.
///
/// `{"currency": "CHF", "date": "2024-01-02"}` keys as `CHF:2024-01-02`.
pub fn synthetic_key(row: &Row, parts: &[&str]) -> Option<String> {
    parts
        .iter()
        .map(|part| text(row, part))
        .collect::<Option<Vec<_>>>()
        .map(|values| values.join(":"))
}

/// A source bond row as a flat `Bond` record.
///
/// Interest rates arrive in percent and are stored as fractions.
pub fn bond_row(raw: &Row) -> Row {
    let get = |column: &str| raw.get(column).cloned().unwrap_or(Value::Null);
    let string = |value: Option<String>| value.map(Value::String).unwrap_or(Value::Null);
    let float = |value: Option<f64>| {
        value
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    };

    let name = text(raw, "name@de").or_else(|| text(raw, "shortName@de"));
    let kind = text(raw, "interestType").map(|t| interest_type(&t));
    let frequency = text(raw, "payFreqPeriod").map(|p| payment_frequency(&p).to_string());

    [
        ("id", get("id")),
        ("isin", get("isin")),
        ("name", string(name)),
        ("short_name", get("shortName@de")),
        ("currency_of_denomination", get("nominalCurrency")),
        ("denomination", get("denomination")),
        ("nominal_amount", get("nominalAmount")),
        ("issuer_id", get("issuerId")),
        ("interest_type", string(kind)),
        ("interest_rate", float(number(raw, "actInterestRate").map(|r| r / 100.0))),
        ("interest_payment_frequency", string(frequency)),
        ("maturity_date", get("maturityDate")),
        ("last_coupon_date", get("lastCouponDate")),
        ("is_callable", get("isCallable")),
        ("underlying_id", get("underlyingId")),
        ("conversion_price_value", float(number(raw, "exercisePrice"))),
        ("conversion_price_currency", get("exercisePriceCurr")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn interest_type(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("fixed") {
        "fixed".into()
    } else if lower.contains("variable") || lower.contains("float") {
        "variable".into()
    } else if lower.contains("stagger") {
        "staggered".into()
    } else {
        lower
    }
}

/// ISO 8601 period to payment frequency name.
fn payment_frequency(period: &str) -> &'static str {
    match period.to_uppercase().as_str() {
        "P1Y" => "annual",
        "P6M" => "semiAnnual",
        "P3M" => "quarterly",
        "P1M" => "monthly",
        _ => "other",
    }
}

/// The trimmed text form of `field`, or `None` if absent, null, or blank.
///
/// Integral floats print without a fraction, so `4411.0` reads as `4411`.
fn text(row: &Row, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(row: &Row, field: &str) -> Option<f64> {
    match row.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Outcome of one source in a bulk load.
#[derive(Debug, Clone, Serialize)]
pub struct Loaded<T> {
    pub name: &'static str,
    pub file: PathBuf,
    #[serde(flatten)]
    pub report: T,
}

/// Outcome of [`load_directory`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub nodes: Vec<Loaded<IngestReport>>,
    pub relationships: Vec<Loaded<RelIngestReport>>,
    /// Source stems with no row file in the directory.
    pub missing: Vec<&'static str>,
}

/// Load every known source found in `dir`: nodes first, then relationships.
///
/// Row failures are counted in the report; an unreadable file stops the load.
pub async fn load_directory<R: CypherRunner>(runner: &R, dir: &Path) -> Result<BulkReport> {
    let schema = catalog::ontology_schema();
    let mut report = BulkReport::default();
    let mut sources: HashMap<&'static str, (PathBuf, Vec<Row>)> = HashMap::new();

    for load in NODE_LOADS {
        let Some(path) = find_rows(dir, load.stem) else {
            tracing::info!(stem = load.stem, dir = %dir.display(), "Skipped: no row file");
            report.missing.push(load.stem);
            continue;
        };

        let raw = read_rows(&path)?;
        if REL_LOADS.iter().any(|rel| rel.stem == load.stem) {
            sources.insert(load.stem, (path.clone(), raw.clone()));
        }

        let rows = prepare_rows(load, raw, &schema);
        tracing::info!(
            label = load.label,
            file = %path.display(),
            rows = rows.len(),
            "Loading nodes"
        );
        let outcome = ingest_nodes(runner, load.label, load.key, &rows).await;
        report.nodes.push(Loaded {
            name: load.label,
            file: path,
            report: outcome,
        });
    }

    for load in REL_LOADS {
        let Some((path, raw)) = sources.get(load.stem) else {
            tracing::info!(
                rel_type = load.rel_type,
                stem = load.stem,
                "Skipped: no source rows"
            );
            continue;
        };

        let rows = load.endpoint_rows(raw);
        tracing::info!(
            rel_type = load.rel_type,
            rows = rows.len(),
            dropped = raw.len() - rows.len(),
            "Loading relationships"
        );
        let outcome = ingest_relationships(runner, &load.spec(), &rows).await;
        report.relationships.push(Loaded {
            name: load.rel_type,
            file: path.clone(),
            report: outcome,
        });
    }

    Ok(report)
}

fn prepare_rows(load: &NodeLoad, raw: Vec<Row>, schema: &OntologySchema) -> Vec<Row> {
    let rows: Vec<Row> = raw
        .into_iter()
        .map(|row| load.prepare.apply(load.key, row))
        .collect();

    match load.fields {
        Fields::KeyOnly => rows
            .into_iter()
            .map(|row| row.into_iter().filter(|(k, _)| k == load.key).collect())
            .collect(),
        Fields::Catalog => match schema.entity(load.label) {
            Some(entity) => filter_props(rows, entity, load.key),
            None => rows,
        },
    }
}

fn find_rows(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["json", "jsonl"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nolo_graph::DryRunner;
    use serde_json::json;
    use std::fs;

    fn row(value: Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    fn rel_load(rel_type: &str) -> &'static RelLoad {
        REL_LOADS.iter().find(|r| r.rel_type == rel_type).unwrap()
    }

    #[test]
    fn test_synthetic_key_joins_parts() {
        let rate = row(json!({"currency": "CHF", "date": "2024-01-02", "cross_rate": 1.0}));
        let quote = row(json!({"listing_id": 4411.0, "quote_date": " 2024-01-02 "}));

        assert_eq!(
            synthetic_key(&rate, &["currency", "date"]).as_deref(),
            Some("CHF:2024-01-02")
        );
        assert_eq!(
            synthetic_key(&quote, &["listing_id", "quote_date"]).as_deref(),
            Some("4411:2024-01-02")
        );
        let partial = row(json!({"currency": "CHF"}));
        let blank = row(json!({"currency": "", "date": "2024-01-02"}));
        assert_eq!(synthetic_key(&partial, &["currency", "date"]), None);
        assert_eq!(synthetic_key(&blank, &["currency", "date"]), None);
    }

    #[test]
    fn test_synthetic_key_left_unset_when_incomplete() {
        let prepare = Prepare::SyntheticKey(&["currency", "date"]);

        let keyed = prepare.apply("id", row(json!({"currency": "EUR", "date": "2024-01-03"})));
        let unkeyed = prepare.apply("id", row(json!({"currency": "EUR", "date": null})));

        assert_eq!(keyed.get("id"), Some(&json!("EUR:2024-01-03")));
        assert!(!unkeyed.contains_key("id"));
    }

    #[test]
    fn test_quote_of_listing_composite_target() {
        let load = rel_load("QuoteOfListing");
        let quotes = vec![
            row(json!({"listing_id": 4411, "instrument_id": "INS1", "quote_date": "2024-01-02"})),
            row(json!({"listing_id": 4412, "instrument_id": "INS1", "quote_date": ""})),
            row(json!({"listing_id": 4413, "quote_date": "2024-01-02"})),
        ];

        let rows = load.endpoint_rows(&quotes);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(FROM_VALUE), Some(&json!("4411")));
        assert_eq!(rows[0].get(TO_VALUE), Some(&json!("INS1/4411")));
        assert_eq!(load.spec().from_key, "listing_id");
        assert_eq!(load.spec().to_label, "Listing");
    }

    #[test]
    fn test_column_endpoints_trim_and_drop_blank() {
        let load = rel_load("ListedOn");
        let listings = vec![
            row(json!({"id": " L1 ", "trading_place_id": "XSWX"})),
            row(json!({"id": "L2", "trading_place_id": "  "})),
            row(json!({"id": "L3"})),
        ];

        let rows = load.endpoint_rows(&listings);

        assert_eq!(rows, vec![row(json!({"from_value": "L1", "to_value": "XSWX"}))]);
    }

    #[test]
    fn test_rel_loads_read_loaded_sources() {
        let stems: Vec<&str> = NODE_LOADS.iter().map(|n| n.stem).collect();
        let labels: Vec<&str> = NODE_LOADS.iter().map(|n| n.label).collect();

        for rel in REL_LOADS {
            assert!(stems.contains(&rel.stem), "{} reads an unknown source", rel.rel_type);
            assert!(labels.contains(&rel.from_label));
            assert!(labels.contains(&rel.to_label));
        }
    }

    #[test]
    fn test_bond_row_mapping() {
        let raw = row(json!({
            "id": "B1",
            "isin": "CH0000000001",
            "shortName@de": "Acme 4.375% 30",
            "interestType": "Fixed rate",
            "actInterestRate": "4.375",
            "payFreqPeriod": "p6m",
            "exercisePrice": 12.5,
            "exercisePriceCurr": "CHF",
            "unmapped": true
        }));

        let bond = bond_row(&raw);

        assert_eq!(bond.get("name"), Some(&json!("Acme 4.375% 30")));
        assert_eq!(bond.get("interest_type"), Some(&json!("fixed")));
        assert_eq!(bond.get("interest_rate"), Some(&json!(0.04375)));
        assert_eq!(bond.get("interest_payment_frequency"), Some(&json!("semiAnnual")));
        assert_eq!(bond.get("conversion_price_value"), Some(&json!(12.5)));
        assert_eq!(bond.get("maturity_date"), Some(&Value::Null));
        assert!(!bond.contains_key("unmapped"));
    }

    #[test]
    fn test_interest_labels() {
        assert_eq!(interest_type("Floating"), "variable");
        assert_eq!(interest_type("Staggered coupon"), "staggered");
        assert_eq!(interest_type("Zero"), "zero");
        assert_eq!(payment_frequency("P1Y"), "annual");
        assert_eq!(payment_frequency("P2Y"), "other");
    }

    #[tokio::test]
    async fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("listings.json"),
            r#"[{"id": "INS1/4411", "instrument_id": "INS1", "trading_place_id": "XSWX",
                 "ticker": "ABC", "source_row": 1}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("cross_rates.jsonl"),
            "{\"currency\": \"CHF\", \"cross_rate\": 1.0, \"date\": \"2024-01-02\"}\n\
             {\"currency\": \"EUR\", \"cross_rate\": 0.94}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("quotes.json"),
            r#"[{"listing_id": 4411, "instrument_id": "INS1", "quote": 10.5,
                 "quote_date": "2024-01-02"}]"#,
        )
        .unwrap();
        let runner = DryRunner::new();

        let report = load_directory(&runner, dir.path()).await.unwrap();

        assert_eq!(
            report.missing,
            vec!["instrument_types", "trading_venues", "instruments", "bonds"]
        );
        let nodes: Vec<(&str, usize, usize)> = report
            .nodes
            .iter()
            .map(|l| (l.name, l.report.upserted, l.report.skipped))
            .collect();
        assert_eq!(
            nodes,
            vec![("Listing", 1, 0), ("CrossCurrencyRate", 1, 1), ("Quote", 1, 0)]
        );
        let rels: Vec<&str> = report.relationships.iter().map(|l| l.name).collect();
        assert_eq!(rels, vec!["ListedOn", "ListingOfInstrument", "QuoteOfListing"]);
        assert!(report.relationships.iter().all(|l| l.report.merged == 1));

        let statements = runner.statements();
        let quote = statements
            .iter()
            .find(|s| s.text.starts_with("MERGE (n:Quote"))
            .unwrap();
        assert_eq!(quote.get_param("key_value"), Some(&json!("4411:2024-01-02")));
        let listing = statements
            .iter()
            .find(|s| s.text.starts_with("MERGE (n:Listing"))
            .unwrap();
        let props = listing.get_param("props").unwrap().as_object().unwrap();
        assert!(!props.contains_key("source_row"));
        let quote_of_listing = statements.last().unwrap();
        assert_eq!(quote_of_listing.get_param("to_value"), Some(&json!("INS1/4411")));
    }

    #[tokio::test]
    async fn test_instruments_keep_key_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("instruments.json"),
            r#"[{"id": "INS1", "instrument_type_id": "T1", "main_trading_place_id": "XSWX"},
                {"id": null, "instrument_type_id": "T2"}]"#,
        )
        .unwrap();
        let runner = DryRunner::new();

        let report = load_directory(&runner, dir.path()).await.unwrap();

        assert_eq!(report.nodes[0].name, "Instrument");
        let instruments = report.nodes[0].report;
        assert_eq!((instruments.upserted, instruments.skipped), (1, 1));
        let node = &runner.statements()[0];
        assert_eq!(node.get_param("props"), Some(&json!({"id": "INS1"})));
        let rels: Vec<&str> = report.relationships.iter().map(|l| l.name).collect();
        assert_eq!(rels, vec!["HasType", "MainTradingPlace"]);
    }
}

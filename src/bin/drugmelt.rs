//! drugmelt: Extract a DrugBank XML export into relational tables
//!
//! Usage:
//!   # Every table to stdout as one tagged JSON Lines stream
//!   drugmelt full_database.xml
//!
//!   # One .jsonl file per table
//!   drugmelt full_database.xml --output-dir ./tables
//!
//!   # A subset of tables, extracted in parallel, keyed by drug name
//!   drugmelt full_database.xml -o ./tables --tables drugs,groups,atc_codes --key-field name --parallel
//!
//!   # Custom plan and configuration from JSON
//!   drugmelt data.xml --plan plan.json --config melt.json

// Use MiMalloc allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use drugmelt::melt::{ErrorPolicy, FormatPolicy, MeltConfig, MeltPlan, SingleWriter, TableWriter, TextMode};
use drugmelt::XmlDocument;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drugmelt")]
#[command(about = "Extract DrugBank XML into relational tables", long_about = None)]
struct Args {
    /// DrugBank XML export
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory for one .jsonl file per table
    /// If omitted, writes every row to stdout tagged with its table name
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// JSON file with a MeltConfig; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with a custom MeltPlan (default: the full DrugBank plan)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Comma-separated table names to extract
    #[arg(long)]
    tables: Option<String>,

    /// Child tag used as the drug key (default: drugbank-id)
    #[arg(long, conflicts_with = "no_key")]
    key_field: Option<String>,

    /// Omit parent_key columns
    #[arg(long)]
    no_key: bool,

    /// Number of ATC level/code column pairs (default: 4)
    #[arg(long)]
    atc_levels: Option<usize>,

    /// Collapse internal whitespace runs in text values
    #[arg(long)]
    collapse_whitespace: bool,

    /// Extract drugs in parallel
    #[arg(long)]
    parallel: bool,

    /// Skip drugs that fail instead of aborting, and report them at the end
    #[arg(long)]
    collect_errors: bool,

    /// Null malformed dates instead of failing the drug
    #[arg(long)]
    null_bad_dates: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = build_config(&args)?;
    let plan = build_plan(&args)?;

    let xml = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let doc = XmlDocument::parse(&xml)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    let drugs = doc.drugs();
    info!("{}: {} drug records", args.input.display(), drugs.len());

    let output = plan.run(&drugs, &config, None)?;

    for warning in &output.warnings {
        warn!("{}", warning);
    }
    for err in &output.errors {
        error!("{}", err);
    }

    if let Some(dir) = &args.output_dir {
        let writer = TableWriter::new(dir)?;
        for (table, path) in output.tables.iter().zip(writer.write_tables(&output.tables)?) {
            info!("{}: {} rows -> {}", table.name, table.len(), path.display());
        }
    } else {
        let stdout = std::io::stdout();
        let mut writer = SingleWriter::new(stdout.lock());
        writer.write_tables(&output.tables)?;
        writer.flush()?;
    }

    if !output.errors.is_empty() {
        warn!("{} drugs skipped because of errors", output.errors.len());
    }

    Ok(())
}

/// `RUST_LOG` when set, `info` otherwise
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_config(args: &Args) -> Result<MeltConfig> {
    let mut config = match &args.config {
        Some(path) => read_json(path)?,
        None => MeltConfig::default(),
    };

    if let Some(field) = &args.key_field {
        config.key_field = Some(field.clone());
    }
    if args.no_key {
        config.key_field = None;
    }
    if let Some(levels) = args.atc_levels {
        config.atc_levels = levels;
    }
    if args.collapse_whitespace {
        config.text_mode = TextMode::Collapse;
    }
    if args.parallel {
        config.parallel = true;
    }
    if args.collect_errors {
        config.error_policy = ErrorPolicy::Collect;
    }
    if args.null_bad_dates {
        config.format_policy = FormatPolicy::Null;
    }

    Ok(config)
}

fn build_plan(args: &Args) -> Result<MeltPlan> {
    let plan = match &args.plan {
        Some(path) => read_json(path)?,
        None => MeltPlan::drugbank(),
    };

    match &args.tables {
        Some(names) => {
            let names: Vec<&str> = names.split(',').map(str::trim).collect();
            Ok(plan.select(&names)?)
        }
        None => Ok(plan),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_rust_log_overrides_default_level() {
        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::DEBUG));

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["drugmelt", "db.xml", "--no-key", "--atc-levels", "2", "--parallel"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.key_field, None);
        assert_eq!(config.atc_levels, 2);
        assert!(config.parallel);
    }
}

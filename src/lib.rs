pub mod cli;
pub mod comparison;
pub mod config;
pub mod csv_accessor;
pub mod dataset_file;
pub mod equality;
pub mod error;
pub mod identifier;
pub mod report;
pub mod row;
pub mod source;
pub mod value;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, CompareArgs, ReportFormat},
    comparison::ComparisonEngine,
    config::ComparisonConfig,
    csv_accessor::CsvDirectoryAccessor,
    identifier::IdentifierCase,
};

pub use crate::{
    comparison::{ColumnDifference, DataSetComparison, RowComparison, TableComparison},
    error::{AccessError, ComparisonError},
    row::Row,
    source::{ActualRowAccessor, ActualTable, DataSet, DataSetSource, ExpectedTable},
    value::Value,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("dataset_assert", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Runs the command line. Returns whether the compared data set matched.
pub fn run() -> Result<bool> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(args) => handle_compare(&args),
    }
}

fn handle_compare(args: &CompareArgs) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => ComparisonConfig::load(path)?,
        None => ComparisonConfig::default(),
    };
    if args.case_sensitive {
        config.identifier_case = IdentifierCase::Preserve;
    }
    if args.strict {
        config.default_strict = true;
    }
    debug!("Comparison settings: {config:?}");

    info!("Loading expected data set from {:?}", args.expected);
    let mut data_set = dataset_file::load_data_set(&args.expected)?;
    if data_set.is_empty() {
        warn!("Data set {:?} declares no tables", args.expected);
    }

    let encoding = csv_accessor::resolve_encoding(args.input_encoding.as_deref())?;
    let accessor = args.primary_keys.iter().fold(
        CsvDirectoryAccessor::new(&args.actual_dir, config.identifier_policy())
            .with_delimiter(args.delimiter)
            .with_encoding(encoding),
        |accessor, (table, columns)| accessor.with_primary_key(table, columns.clone()),
    );

    let engine = ComparisonEngine::new(config);
    let comparison = engine
        .compare(&mut data_set, &accessor)
        .with_context(|| format!("Comparing {:?} against {:?}", args.expected, args.actual_dir))?;

    let rendered = match args.format {
        ReportFormat::Text => report::render_text(&comparison),
        ReportFormat::Json => report::render_json(&comparison)?,
    };
    print!("{rendered}");
    if args.format == ReportFormat::Json {
        println!();
    }

    info!(
        "Compared {} table(s): {}",
        comparison.len(),
        if comparison.is_match() { "match" } else { "mismatch" }
    );
    Ok(comparison.is_match())
}

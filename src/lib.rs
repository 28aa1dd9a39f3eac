pub mod charts;
pub mod clean;
pub mod cli;
pub mod config;
pub mod data;
pub mod frequency;
pub mod io_utils;
pub mod profile;
pub mod report;
pub mod search;
pub mod session;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs, InputFormat},
    config::ProfilerConfig,
    data::Table,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tabular_profiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => report::execute(&args),
        Commands::Clean(args) => clean::execute(&args),
        Commands::Search(args) => search::execute(&args),
        Commands::Charts(args) => charts::execute(&args),
    }
}

pub(crate) fn load_config(args: &InputArgs) -> Result<ProfilerConfig> {
    let config = ProfilerConfig::load_or_default(args.config.as_deref())?;
    debug!("Profiler configuration: {config:?}");
    Ok(config)
}

pub(crate) fn load_table(args: &InputArgs) -> Result<Table> {
    let table = match args.input_format {
        InputFormat::Csv => {
            let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
            let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
            info!(
                "Reading '{}' with delimiter '{}' and encoding {}",
                args.input.display(),
                printable_delimiter(delimiter),
                encoding.name()
            );
            io_utils::read_csv_table(&args.input, delimiter, encoding)
        }
        InputFormat::Json => {
            info!("Reading JSON rows from '{}'", args.input.display());
            io_utils::read_json_table(&args.input)
        }
    }
    .with_context(|| format!("Loading table from {:?}", args.input))?;
    debug!(
        "Loaded {} row(s) and {} column(s)",
        table.row_count(),
        table.columns().len()
    );
    Ok(table)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::clean::MissingStrategy;

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile tabular data files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer a type per column and report missing, unique, and summary statistics
    Profile(ProfileArgs),
    /// Remove duplicate rows and fill or drop missing values
    Clean(CleanArgs),
    /// Show rows containing a search term in any cell
    Search(SearchArgs),
    /// Emit histogram and category frequency data for charting
    Charts(ChartsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum InputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input file to read (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Input format: a delimited file with a header row, or a JSON array of row objects
    #[arg(long = "input-format", value_enum, default_value = "csv")]
    pub input_format: InputFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML file overriding profiler thresholds and chart limits
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Render the report as an aligned table or as JSON
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Per-column missing-value strategy such as `age=mean` or `city=remove`
    #[arg(long = "strategy", action = clap::ArgAction::Append, value_parser = parse_strategy)]
    pub strategies: Vec<(String, MissingStrategy)>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Case-insensitive text to look for in any cell
    #[arg(short = 't', long = "term")]
    pub term: String,
    /// Maximum rows to display (0 = all)
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
    /// Search the cleaned table instead of the raw input
    #[arg(long)]
    pub cleaned: bool,
}

#[derive(Debug, Args)]
pub struct ChartsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Build charts from the cleaned table instead of the raw input
    #[arg(long)]
    pub cleaned: bool,
    /// Render chart data as aligned tables or as JSON
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
    /// Column for the x axis of an extra x/y series (requires --y)
    #[arg(long, requires = "y")]
    pub x: Option<String>,
    /// Numeric column for the y axis of an extra x/y series (requires --x)
    #[arg(long, requires = "x")]
    pub y: Option<String>,
}

pub fn parse_strategy(value: &str) -> Result<(String, MissingStrategy), String> {
    let (column, strategy) = value
        .split_once('=')
        .ok_or_else(|| format!("Strategy '{value}' must look like column=strategy"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err("Strategy column name cannot be empty".to_string());
    }
    let strategy = strategy.trim().parse::<MissingStrategy>()?;
    Ok((column.to_string(), strategy))
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

//! Derived reporting over column profiles: completeness, counts per inferred
//! type, and the `profile` command's table and JSON renderings.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::{OutputFormat, ProfileArgs},
    profile::{ColumnProfile, ColumnStats, InferredType},
    session::Session,
    table,
};

/// Share of rows with a value for this column, as a percentage.
pub fn completeness(profile: &ColumnProfile, row_count: usize) -> f64 {
    if row_count == 0 {
        return 0.0;
    }
    profile.present_count(row_count) as f64 / row_count as f64 * 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub numeric: usize,
    pub categorical: usize,
    pub date: usize,
}

pub fn type_counts(profiles: &[ColumnProfile]) -> TypeCounts {
    profiles
        .iter()
        .fold(TypeCounts::default(), |mut counts, profile| {
            match profile.inferred_type {
                InferredType::Numeric => counts.numeric += 1,
                InferredType::Categorical => counts.categorical += 1,
                InferredType::Date => counts.date += 1,
            }
            counts
        })
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport<'a> {
    #[serde(flatten)]
    pub profile: &'a ColumnProfile,
    pub completeness: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport<'a> {
    pub row_count: usize,
    pub column_count: usize,
    pub type_counts: TypeCounts,
    pub columns: Vec<ColumnReport<'a>>,
}

impl<'a> ProfileReport<'a> {
    pub fn new(profiles: &'a [ColumnProfile], row_count: usize) -> Self {
        Self {
            row_count,
            column_count: profiles.len(),
            type_counts: type_counts(profiles),
            columns: profiles
                .iter()
                .map(|profile| ColumnReport {
                    profile,
                    completeness: completeness(profile, row_count),
                })
                .collect(),
        }
    }
}

pub fn profile_headers() -> Vec<String> {
    [
        "column", "type", "missing", "unique", "complete", "min", "max", "mean", "median",
        "mode",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

pub fn profile_rows(profiles: &[ColumnProfile], row_count: usize) -> Vec<Vec<String>> {
    profiles
        .iter()
        .map(|profile| {
            let mut row = vec![
                profile.name.clone(),
                profile.inferred_type.to_string(),
                profile.missing_count.to_string(),
                profile.unique_count.to_string(),
                format!("{:.1}%", completeness(profile, row_count)),
            ];
            match &profile.stats {
                Some(ColumnStats::Numeric(stats)) => {
                    row.extend(
                        [stats.min, stats.max, stats.mean, stats.median]
                            .into_iter()
                            .map(format_number),
                    );
                    row.push(String::new());
                }
                Some(ColumnStats::Categorical { mode }) => {
                    row.extend(std::iter::repeat_n(String::new(), 4));
                    row.push(mode.clone());
                }
                None => row.extend(std::iter::repeat_n(String::new(), 5)),
            }
            row
        })
        .collect()
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let config = crate::load_config(&args.input)?;
    let table = crate::load_table(&args.input)?;
    let session = Session::load(table, config);
    let row_count = session.table().row_count();
    let profiles = session.profiles();

    match args.format {
        OutputFormat::Table => {
            table::print_table(&profile_headers(), &profile_rows(profiles, row_count));
        }
        OutputFormat::Json => {
            let report = ProfileReport::new(profiles, row_count);
            let rendered =
                serde_json::to_string_pretty(&report).context("Serializing profile report")?;
            println!("{rendered}");
        }
    }

    let counts = type_counts(profiles);
    info!(
        "Profiled {} column(s) over {} row(s): {} numeric, {} categorical, {} date",
        profiles.len(),
        row_count,
        counts.numeric,
        counts.categorical,
        counts.date
    );
    Ok(())
}

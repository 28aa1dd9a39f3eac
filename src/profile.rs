//! Column type inference and descriptive statistics.
//!
//! [`profile_table`] walks the columns of a [`Table`] (taken from the first
//! row, in key order) and produces one [`ColumnProfile`] per column:
//!
//! 1. [`infer_column_type`] classifies the column from parse-success ratios
//!    over its non-missing cells: `numeric` when more than
//!    [`ProfilerConfig::numeric_ratio`] of them are finite numbers, else
//!    `date` when more than [`ProfilerConfig::date_ratio`] of them are
//!    calendar dates, else `categorical`. An all-missing column is
//!    `categorical`.
//! 2. [`compute_stats`] derives the statistics for that type. Numeric cells
//!    that fail to parse are dropped from the statistic population; they are
//!    not counted as missing.
//!
//! Profiling is pure: the table is never modified and repeated calls produce
//! identical output. No input makes it fail.

use std::{collections::HashSet, fmt};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::ProfilerConfig,
    data::{Cell, Table, is_missing, non_missing},
    frequency::FrequencyCounter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Numeric,
    Categorical,
    Date,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferredType::Numeric => "numeric",
            InferredType::Categorical => "categorical",
            InferredType::Date => "date",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnStats {
    Numeric(NumericStats),
    Categorical { mode: String },
}

impl ColumnStats {
    pub fn numeric(&self) -> Option<&NumericStats> {
        match self {
            ColumnStats::Numeric(stats) => Some(stats),
            ColumnStats::Categorical { .. } => None,
        }
    }

    pub fn mode(&self) -> Option<&str> {
        match self {
            ColumnStats::Categorical { mode } => Some(mode.as_str()),
            ColumnStats::Numeric(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: InferredType,
    pub missing_count: usize,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ColumnStats>,
}

impl ColumnProfile {
    pub fn present_count(&self, row_count: usize) -> usize {
        row_count.saturating_sub(self.missing_count)
    }
}

#[derive(Debug, Default)]
struct TypeTally {
    non_missing: usize,
    numeric_matches: usize,
    date_matches: usize,
}

impl TypeTally {
    fn update(&mut self, cell: &Cell) {
        self.non_missing += 1;
        if cell.as_finite().is_some() {
            self.numeric_matches += 1;
        }
        if cell.is_date() {
            self.date_matches += 1;
        }
    }

    fn ratio(&self, matches: usize) -> f64 {
        matches as f64 / self.non_missing as f64
    }

    fn decide(&self, config: &ProfilerConfig) -> InferredType {
        if self.non_missing == 0 {
            InferredType::Categorical
        } else if self.ratio(self.numeric_matches) > config.numeric_ratio {
            InferredType::Numeric
        } else if self.ratio(self.date_matches) > config.date_ratio {
            InferredType::Date
        } else {
            InferredType::Categorical
        }
    }
}

pub fn infer_column_type(values: &[Option<&Cell>], config: &ProfilerConfig) -> InferredType {
    let mut tally = TypeTally::default();
    for cell in non_missing(values) {
        tally.update(cell);
    }
    tally.decide(config)
}

#[derive(Debug, Default)]
struct NumericAccumulator {
    values: Vec<f64>,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericAccumulator {
    fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
        self.values.push(value);
    }

    fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    /// Element at index `len / 2` of the sorted population. For even
    /// lengths this is the upper of the two middle values, not their average.
    fn median(&self) -> Option<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.get(sorted.len() / 2).copied()
    }

    fn finish(self) -> Option<NumericStats> {
        Some(NumericStats {
            min: self.min?,
            max: self.max?,
            mean: self.mean()?,
            median: self.median()?,
        })
    }
}

pub fn compute_stats(
    column: &str,
    values: &[Option<&Cell>],
    inferred_type: InferredType,
) -> Option<ColumnStats> {
    match inferred_type {
        InferredType::Numeric => {
            let mut accumulator = NumericAccumulator::default();
            let mut dropped = 0usize;
            for cell in non_missing(values) {
                match cell.as_finite() {
                    Some(value) => accumulator.add_value(value),
                    None => dropped += 1,
                }
            }
            if dropped > 0 {
                debug!("Column '{column}': {dropped} non-numeric value(s) left out of statistics");
            }
            accumulator.finish().map(ColumnStats::Numeric)
        }
        InferredType::Categorical => {
            let mut counter = FrequencyCounter::new();
            for cell in non_missing(values) {
                counter.record(&cell.as_display());
            }
            counter.mode().map(|mode| ColumnStats::Categorical {
                mode: mode.to_string(),
            })
        }
        InferredType::Date => None,
    }
}

pub fn profile_column(
    name: &str,
    values: &[Option<&Cell>],
    config: &ProfilerConfig,
) -> ColumnProfile {
    let inferred_type = infer_column_type(values, config);
    let missing_count = values.iter().filter(|value| is_missing(**value)).count();
    let unique_count = non_missing(values).collect::<HashSet<_>>().len();
    let stats = compute_stats(name, values, inferred_type);
    debug!(
        "Column '{name}' inferred as {inferred_type} ({missing_count} missing, {unique_count} unique)"
    );
    ColumnProfile {
        name: name.to_string(),
        inferred_type,
        missing_count,
        unique_count,
        stats,
    }
}

pub fn profile_table(table: &Table, config: &ProfilerConfig) -> Vec<ColumnProfile> {
    table
        .columns()
        .into_iter()
        .map(|name| profile_column(name, &table.column_values(name), config))
        .collect()
}

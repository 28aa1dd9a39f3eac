//! Table cleaning: duplicate-row removal and per-column handling of missing
//! values.
//!
//! Cleaning never touches the source table. [`clean_table`] first drops exact
//! duplicate rows (keeping the first occurrence), then walks the columns in
//! profile order and applies each column's [`MissingStrategy`] to the rows
//! that survive.

use std::{fmt, str::FromStr};

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    cli::CleanArgs,
    data::{Cell, Row, Table, is_missing},
    frequency::FrequencyCounter,
    io_utils,
    profile::{ColumnProfile, InferredType},
    session::Session,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Drop every row whose cell is missing.
    Remove,
    /// Fill missing cells with the column mean, two decimals. Numeric columns only.
    Mean,
    /// Fill missing cells with the most frequent value.
    Mode,
    #[default]
    None,
}

impl MissingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingStrategy::Remove => "remove",
            MissingStrategy::Mean => "mean",
            MissingStrategy::Mode => "mode",
            MissingStrategy::None => "none",
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "remove" | "drop" => Ok(MissingStrategy::Remove),
            "mean" => Ok(MissingStrategy::Mean),
            "mode" => Ok(MissingStrategy::Mode),
            "none" | "keep" => Ok(MissingStrategy::None),
            other => Err(format!(
                "Unknown missing-value strategy '{other}' (expected remove, mean, mode, or none)"
            )),
        }
    }
}

/// Mean for numeric columns with gaps, mode for other columns with gaps,
/// nothing for complete columns.
pub fn default_strategy(profile: &ColumnProfile) -> MissingStrategy {
    if profile.missing_count == 0 {
        MissingStrategy::None
    } else if profile.inferred_type == InferredType::Numeric {
        MissingStrategy::Mean
    } else {
        MissingStrategy::Mode
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningPlan {
    strategies: Vec<(String, MissingStrategy)>,
}

impl CleaningPlan {
    pub fn from_profiles(profiles: &[ColumnProfile]) -> Self {
        Self {
            strategies: profiles
                .iter()
                .map(|profile| (profile.name.clone(), default_strategy(profile)))
                .collect(),
        }
    }

    pub fn set(&mut self, column: &str, strategy: MissingStrategy) {
        match self.strategies.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = strategy,
            None => self.strategies.push((column.to_string(), strategy)),
        }
    }

    pub fn strategy(&self, column: &str) -> MissingStrategy {
        self.strategies
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, strategy)| *strategy)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MissingStrategy)> {
        self.strategies
            .iter()
            .map(|(name, strategy)| (name.as_str(), *strategy))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanOutcome {
    pub table: Table,
    pub duplicates_removed: usize,
    pub rows_removed: usize,
    pub cells_filled: usize,
}

pub fn clean_table(
    table: &Table,
    profiles: &[ColumnProfile],
    plan: &CleaningPlan,
) -> CleanOutcome {
    let mut rows = table.rows().iter().unique().cloned().collect::<Vec<Row>>();
    let mut outcome = CleanOutcome {
        duplicates_removed: table.row_count() - rows.len(),
        ..CleanOutcome::default()
    };

    for profile in profiles {
        let column = profile.name.as_str();
        let position = table.column_position(column);
        match plan.strategy(column) {
            MissingStrategy::Remove => {
                let before = rows.len();
                rows.retain(|row| !is_missing(row.get_at(position, column)));
                outcome.rows_removed += before - rows.len();
            }
            MissingStrategy::Mean if profile.inferred_type == InferredType::Numeric => {
                if let Some(mean) = column_mean(&rows, position, column) {
                    let fill = Cell::Text(format!("{mean:.2}"));
                    outcome.cells_filled += fill_missing(&mut rows, position, column, &fill);
                }
            }
            MissingStrategy::Mean => {
                debug!(
                    "Skipping mean fill for {} column '{column}'",
                    profile.inferred_type
                );
            }
            MissingStrategy::Mode => {
                if let Some(mode) = column_mode(&rows, position, column) {
                    outcome.cells_filled +=
                        fill_missing(&mut rows, position, column, &Cell::Text(mode));
                }
            }
            MissingStrategy::None => {}
        }
    }

    let columns = table.columns().into_iter().map(str::to_string).collect();
    outcome.table = Table::with_columns(columns, rows);
    outcome
}

fn present_cells<'a>(
    rows: &'a [Row],
    position: Option<usize>,
    column: &'a str,
) -> impl Iterator<Item = &'a Cell> + 'a {
    rows.iter()
        .filter_map(move |row| row.get_at(position, column))
        .filter(|cell| !cell.is_missing())
}

/// Mean over the rows still present, so an earlier column's `remove` shrinks
/// the population.
fn column_mean(rows: &[Row], position: Option<usize>, column: &str) -> Option<f64> {
    let (sum, count) = present_cells(rows, position, column)
        .filter_map(Cell::as_finite)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn column_mode(rows: &[Row], position: Option<usize>, column: &str) -> Option<String> {
    let mut counter = FrequencyCounter::new();
    for cell in present_cells(rows, position, column) {
        counter.record(&cell.as_display());
    }
    counter.mode().map(str::to_string)
}

fn fill_missing(rows: &mut [Row], position: Option<usize>, column: &str, fill: &Cell) -> usize {
    let mut filled = 0usize;
    for row in rows.iter_mut() {
        if is_missing(row.get_at(position, column)) {
            match position {
                Some(idx) => row.insert_at(idx, column, fill.clone()),
                None => row.insert(column, fill.clone()),
            }
            filled += 1;
        }
    }
    filled
}

pub fn execute(args: &CleanArgs) -> Result<()> {
    let config = crate::load_config(&args.input)?;
    let table = crate::load_table(&args.input)?;
    let input_delimiter = io_utils::resolve_input_delimiter(&args.input.input, args.input.delimiter);
    let output_delimiter = io_utils::resolve_output_delimiter(
        args.output.as_deref(),
        args.output_delimiter,
        input_delimiter,
    );

    let mut session = Session::load(table, config);
    for (column, strategy) in &args.strategies {
        session
            .set_strategy(column, *strategy)
            .with_context(|| format!("Applying strategy '{strategy}' to '{column}'"))?;
    }
    for (column, strategy) in session.plan().iter() {
        debug!("Column '{column}': missing-value strategy {strategy}");
    }

    let outcome = session.apply_cleaning();
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), output_delimiter)?;
    io_utils::write_table(&mut writer, &outcome.table)?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        "Removed {} duplicate row(s) and {} incomplete row(s), filled {} cell(s); {} row(s) -> {}",
        outcome.duplicates_removed,
        outcome.rows_removed,
        outcome.cells_filled,
        outcome.table.row_count(),
        destination
    );
    Ok(())
}

pub(crate) fn ensure_known_column(profiles: &[ColumnProfile], column: &str) -> Result<()> {
    if profiles.iter().any(|profile| profile.name == column) {
        Ok(())
    } else {
        bail!("Column '{column}' not found in input")
    }
}

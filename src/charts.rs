//! Chart-ready series derived from a profiled table: an equal-width
//! histogram per numeric column, a frequency series per categorical column
//! with few enough distinct values, and on request an x/y series pairing
//! two columns row by row.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::{ChartsArgs, OutputFormat},
    config::ProfilerConfig,
    data::{Cell, Table},
    frequency::FrequencyCounter,
    profile::{ColumnProfile, InferredType},
    report::format_number,
    session::Session,
    table,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn label(&self) -> String {
        format!("{:.1}-{:.1}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBar {
    pub value: String,
    pub count: usize,
}

/// One row of an x/y series: the x cell's string form and the y cell as a
/// number, `0` when it does not parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XyPoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSpec {
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
    },
    Bar {
        column: String,
        bars: Vec<CategoryBar>,
    },
    Scatter {
        x_column: String,
        y_column: String,
        points: Vec<XyPoint>,
    },
}

impl ChartSpec {
    /// The charted column; the y column for an x/y series.
    pub fn column(&self) -> &str {
        match self {
            ChartSpec::Histogram { column, .. } | ChartSpec::Bar { column, .. } => column,
            ChartSpec::Scatter { y_column, .. } => y_column,
        }
    }

    pub fn title(&self) -> String {
        match self {
            ChartSpec::Histogram { column, .. } => format!("Distribution of {column}"),
            ChartSpec::Bar { column, .. } => format!("Frequency of {column}"),
            ChartSpec::Scatter {
                x_column, y_column, ..
            } => format!("{y_column} by {x_column}"),
        }
    }
}

/// Splits `[min, max]` into `bins` equal-width bins. Bins are half-open
/// except the last, which also holds `max`. A constant population yields
/// one zero-width bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .collect::<Vec<_>>();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram = (0..bins)
        .map(|idx| HistogramBin {
            start: min + idx as f64 * width,
            end: if idx + 1 == bins {
                max
            } else {
                min + (idx + 1) as f64 * width
            },
            count: 0,
        })
        .collect::<Vec<_>>();
    for value in finite {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        histogram[idx].count += 1;
    }
    histogram
}

/// Counts over every cell's string form, missing cells included as `""`.
/// Returns `None` when the column has more than `limit` distinct values.
pub fn category_bars(values: &[Option<&Cell>], limit: usize) -> Option<Vec<CategoryBar>> {
    let mut counter = FrequencyCounter::new();
    for value in values {
        match value {
            Some(cell) => counter.record(&cell.as_display()),
            None => counter.record(""),
        }
    }
    if counter.distinct() > limit {
        return None;
    }
    Some(
        counter
            .ranked(0)
            .into_iter()
            .map(|(value, count)| CategoryBar { value, count })
            .collect(),
    )
}

/// Pairs `x` and `y` for every row of the table, in row order. Absent or
/// null x cells become `""`; y cells that are missing or not finite numbers
/// become `0`.
pub fn xy_series(table: &Table, x: &str, y: &str) -> Vec<XyPoint> {
    let x_position = table.column_position(x);
    let y_position = table.column_position(y);
    table
        .rows()
        .iter()
        .map(|row| XyPoint {
            x: row
                .get_at(x_position, x)
                .map(|cell| cell.as_display().into_owned())
                .unwrap_or_default(),
            y: row
                .get_at(y_position, y)
                .and_then(Cell::as_finite)
                .unwrap_or(0.0),
        })
        .collect()
}

pub fn xy_chart(table: &Table, x: &str, y: &str) -> ChartSpec {
    ChartSpec::Scatter {
        x_column: x.to_string(),
        y_column: y.to_string(),
        points: xy_series(table, x, y),
    }
}

pub fn build_charts(
    table: &Table,
    profiles: &[ColumnProfile],
    config: &ProfilerConfig,
) -> Vec<ChartSpec> {
    profiles
        .iter()
        .filter_map(|profile| {
            let values = table.column_values(&profile.name);
            match profile.inferred_type {
                InferredType::Numeric => {
                    let numbers = values
                        .iter()
                        .filter_map(|value| value.and_then(Cell::as_finite))
                        .collect::<Vec<_>>();
                    Some(ChartSpec::Histogram {
                        column: profile.name.clone(),
                        bins: histogram(&numbers, config.histogram_bins),
                    })
                }
                InferredType::Categorical if profile.unique_count <= config.category_chart_limit => {
                    category_bars(&values, config.category_chart_limit).map(|bars| {
                        ChartSpec::Bar {
                            column: profile.name.clone(),
                            bars,
                        }
                    })
                }
                _ => None,
            }
        })
        .collect()
}

fn print_chart(chart: &ChartSpec) {
    println!("{}", chart.title());
    match chart {
        ChartSpec::Histogram { bins, .. } => {
            let headers = vec!["range".to_string(), "count".to_string()];
            let rows = bins
                .iter()
                .map(|bin| vec![bin.label(), bin.count.to_string()])
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
        }
        ChartSpec::Bar { bars, .. } => {
            let total = bars.iter().map(|bar| bar.count).sum::<usize>().max(1);
            let headers = vec![
                "value".to_string(),
                "count".to_string(),
                "percent".to_string(),
            ];
            let rows = bars
                .iter()
                .map(|bar| {
                    let percent = bar.count as f64 / total as f64 * 100.0;
                    vec![
                        bar.value.clone(),
                        bar.count.to_string(),
                        format!("{}%", format_number(percent)),
                    ]
                })
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
        }
        ChartSpec::Scatter {
            x_column,
            y_column,
            points,
        } => {
            let headers = vec![x_column.clone(), y_column.clone()];
            let rows = points
                .iter()
                .map(|point| vec![point.x.clone(), format_number(point.y)])
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
        }
    }
    println!();
}

pub fn execute(args: &ChartsArgs) -> Result<()> {
    let config = crate::load_config(&args.input)?;
    let table = crate::load_table(&args.input)?;
    let mut session = Session::load(table, config);
    if args.cleaned {
        session.apply_cleaning();
    }
    let mut charts = session.charts();
    if let (Some(x), Some(y)) = (args.x.as_deref(), args.y.as_deref()) {
        let chart = session
            .xy_chart(x, y)
            .with_context(|| format!("Building x/y series of '{y}' by '{x}'"))?;
        charts.push(chart);
    }

    match args.format {
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(&charts).context("Serializing chart data")?;
            println!("{rendered}");
        }
        OutputFormat::Table => charts.iter().for_each(print_chart),
    }
    info!(
        "Built {} chart(s): {}",
        charts.len(),
        charts
            .iter()
            .map(ChartSpec::column)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Row, profile::profile_table};

    #[test]
    fn histogram_spreads_values_over_bins() {
        let values = (0..=10).map(f64::from).collect::<Vec<_>>();
        let bins = histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[4].end, 10.0);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 2, 2, 2, 3]);
    }

    #[test]
    fn histogram_of_constant_values_is_single_bin() {
        let bins = histogram(&[7.0, 7.0, 7.0], 10);
        assert_eq!(
            bins,
            vec![HistogramBin {
                start: 7.0,
                end: 7.0,
                count: 3
            }]
        );
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn category_bars_rank_by_count() {
        let cells = ["b", "a", "a", "", "b", "a"].map(Cell::text);
        let values = cells.iter().map(Some).collect::<Vec<_>>();
        let bars = category_bars(&values, 20).unwrap();
        assert_eq!(bars[0], CategoryBar { value: "a".into(), count: 3 });
        assert_eq!(bars[1], CategoryBar { value: "b".into(), count: 2 });
        assert_eq!(bars[2], CategoryBar { value: "".into(), count: 1 });
        assert!(category_bars(&values, 2).is_none());
    }

    #[test]
    fn build_charts_covers_numeric_and_small_categorical_columns() {
        let table = Table::new(vec![
            Row::new().with("n", "1").with("c", "x").with("d", "2024-01-01"),
            Row::new().with("n", "5").with("c", "y").with("d", "2024-01-02"),
        ]);
        let config = ProfilerConfig::default();
        let profiles = profile_table(&table, &config);
        let charts = build_charts(&table, &profiles, &config);
        assert_eq!(charts.len(), 2);
        assert!(matches!(&charts[0], ChartSpec::Histogram { column, .. } if column == "n"));
        assert!(matches!(&charts[1], ChartSpec::Bar { column, .. } if column == "c"));
        assert_eq!(charts[1].title(), "Frequency of c");
    }

    #[test]
    fn xy_series_pairs_rows_and_zeroes_unparseable_y() {
        let table = Table::new(vec![
            Row::new().with("month", "Jan").with("sales", "12.5"),
            Row::new().with("month", "Feb").with("sales", "n/a"),
            Row::new().with("month", Cell::Null).with("sales", 7.0),
            Row::new().with("month", "Apr"),
        ]);
        let points = xy_series(&table, "month", "sales");
        let pairs = points
            .iter()
            .map(|point| (point.x.as_str(), point.y))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![("Jan", 12.5), ("Feb", 0.0), ("", 7.0), ("Apr", 0.0)]
        );
        let chart = xy_chart(&table, "month", "sales");
        assert_eq!(chart.title(), "sales by month");
        assert_eq!(chart.column(), "sales");
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["kind"], "scatter");
        assert_eq!(value["x_column"], "month");
        assert_eq!(value["points"][0]["y"], 12.5);
    }

    #[test]
    fn chart_json_is_tagged_by_kind() {
        let chart = ChartSpec::Bar {
            column: "c".to_string(),
            bars: vec![CategoryBar {
                value: "x".to_string(),
                count: 1,
            }],
        };
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["kind"], "bar");
        assert_eq!(value["bars"][0]["value"], "x");
    }
}

//! Table model and cell-level parsing.
//!
//! A [`Table`] is an ordered list of [`Row`]s, each of which maps column
//! names to raw [`Cell`] values in insertion order. The column set of a
//! table is taken from its first row unless given explicitly (a CSV header);
//! rows may omit a column, in which case the cell is *absent*.
//!
//! A cell counts as missing when it is [`Cell::Null`], absent, or the empty
//! string. Whitespace-only text is a real value.

use std::{
    borrow::Cow,
    fmt,
    hash::{Hash, Hasher},
};

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(text) => text.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// String form used for frequency counting, search, and CSV output.
    pub fn as_display(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(text) => Cow::Borrowed(text.as_str()),
            Cell::Number(number) => Cow::Owned(number.to_string()),
            Cell::Null => Cow::Borrowed(""),
        }
    }

    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Cell::Number(number) => number.is_finite().then_some(*number),
            Cell::Text(text) => parse_finite_number(text),
            Cell::Null => None,
        }
    }

    pub fn is_date(&self) -> bool {
        match self {
            Cell::Text(text) => parse_calendar_date(text).is_ok(),
            Cell::Number(_) | Cell::Null => false,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => a.to_bits() == b.to_bits(),
            (Cell::Null, Cell::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(text) => text.hash(state),
            Cell::Number(number) => number.to_bits().hash(state),
            Cell::Null => {}
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::String(text) => Cell::Text(text),
            serde_json::Value::Number(number) => number
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(number.to_string())),
            serde_json::Value::Bool(flag) => Cell::Text(flag.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// One record of a table. Field order is insertion order; inserting an
/// existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row {
    fields: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        let name = name.into();
        let cell = cell.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = cell,
            None => self.fields.push((name, cell)),
        }
    }

    /// Like [`Row::insert`], but a new field is placed at `position` (or at
    /// the end when the row is shorter) so the row keeps its column order.
    pub fn insert_at(&mut self, position: usize, name: &str, cell: Cell) {
        match self.fields.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = cell,
            None => {
                let position = position.min(self.fields.len());
                self.fields.insert(position, (name.to_string(), cell));
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.insert(name, cell);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, cell)| cell)
    }

    /// Looks up `name`, checking the field at `position` first. Rows read from
    /// a header line hold their cells in column order, so the hint hits.
    pub fn get_at(&self, position: Option<usize>, name: &str) -> Option<&Cell> {
        match position.and_then(|idx| self.fields.get(idx)) {
            Some((existing, cell)) if existing == name => Some(cell),
            _ => self.get(name),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Cell>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, cell) in iter {
            row.insert(name, cell);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, cell) in &self.fields {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping column names to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((name, value)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    row.insert(name, Cell::from(value));
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Rows in source order plus the column set. The column set is fixed when
/// the table is built: the key order of the first row, or an explicit list
/// such as a CSV header. It does not change when rows are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Self { columns, rows }
    }

    pub fn with_columns(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cells of one column in row order; `None` marks an absent cell.
    pub fn column_values(&self, name: &str) -> Vec<Option<&Cell>> {
        let position = self.column_position(name);
        self.rows
            .iter()
            .map(|row| row.get_at(position, name))
            .collect()
    }

    /// String forms of `row` laid out by the table's columns, blank where a
    /// cell is absent or null.
    pub fn display_record(&self, row: &Row) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                row.get_at(Some(idx), name)
                    .map(|cell| cell.as_display().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Row>::deserialize(deserializer).map(Table::new)
    }
}

pub fn is_missing(value: Option<&Cell>) -> bool {
    value.is_none_or(Cell::is_missing)
}

pub fn non_missing<'a>(values: &'a [Option<&'a Cell>]) -> impl Iterator<Item = &'a Cell> + 'a {
    values
        .iter()
        .filter_map(|value| (*value).filter(|cell| !cell.is_missing()))
}

/// Parses trimmed text as a finite decimal number. Anything other than the
/// number itself (units, currency symbols, `NaN`, `inf`) disqualifies it.
pub fn parse_finite_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a, %d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const MONTH_YEAR_FORMATS: &[&str] = &["%B %Y %d", "%b %Y %d"];

/// Permissive calendar date parser: ISO-like dates and datetimes, RFC 3339,
/// RFC 2822, slash and dash day/month orders, month names, and bare years.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty value is not a date"));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.date_naive());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(parsed.date_naive());
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed.date());
        }
    }
    let with_day = format!("{trimmed} 1");
    for fmt in MONTH_YEAR_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(&with_day, fmt) {
            return Ok(parsed);
        }
    }
    if trimmed.len() == 4
        && trimmed.bytes().all(|b| b.is_ascii_digit())
        && let Ok(year) = trimmed.parse::<i32>()
        && let Some(parsed) = NaiveDate::from_ymd_opt(year, 1, 1)
    {
        return Ok(parsed);
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

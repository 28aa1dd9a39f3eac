//! I/O utilities: encoding and delimiter resolution, table loading, and CSV
//! writing.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Tables**: [`read_csv_table`] materialises a header-row CSV into a
//!   [`Table`] of text cells; [`read_json_table`] reads a JSON array of row
//!   objects, keeping numbers and nulls as such.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use itertools::Itertools;
use log::debug;

use crate::data::{Cell, Row, Table};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => return DEFAULT_TSV_DELIMITER,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => return DEFAULT_CSV_DELIMITER,
            _ => {}
        }
    }
    fallback
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        )))
    }
}

/// Short records leave trailing columns absent; surplus fields are ignored.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn csv_to_table<R>(reader: R, delimiter: u8, encoding: &'static Encoding) -> Result<Table>
where
    R: Read,
{
    let mut reader = open_csv_reader(reader, delimiter);
    let headers = decode_record(&reader.byte_headers()?.clone(), encoding)
        .context("Decoding header row")?;
    if let Some(duplicate) = headers.iter().duplicates().next() {
        bail!("Duplicate column name '{duplicate}' in header row");
    }
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", idx + 2))?;
        let row = headers
            .iter()
            .zip(decoded)
            .map(|(name, value)| (name.as_str(), Cell::Text(value)))
            .collect::<Row>();
        rows.push(row);
    }
    debug!(
        "Read {} row(s) across {} header(s)",
        rows.len(),
        headers.len()
    );
    Ok(Table::with_columns(headers, rows))
}

pub fn read_csv_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let reader = open_input(path)?;
    csv_to_table(reader, delimiter, encoding).with_context(|| format!("Reading CSV {path:?}"))
}

pub fn read_json_table(path: &Path) -> Result<Table> {
    let mut raw = String::new();
    open_input(path)?
        .read_to_string(&mut raw)
        .with_context(|| format!("Reading JSON {path:?}"))?;
    let rows: Vec<Row> =
        serde_json::from_str(&raw).with_context(|| format!("Parsing JSON rows from {path:?}"))?;
    Ok(Table::new(rows))
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(base))
}

/// Writes the table with its column set as the header. Absent and null cells
/// are written as empty fields.
pub fn write_table<W: Write>(writer: &mut csv::Writer<W>, table: &Table) -> Result<()> {
    let columns = table.columns();
    if columns.is_empty() {
        return Ok(());
    }
    writer
        .write_record(&columns)
        .context("Writing output headers")?;
    for (idx, row) in table.rows().iter().enumerate() {
        writer
            .write_record(table.display_record(row))
            .with_context(|| format!("Writing output row {}", idx + 2))?;
    }
    writer.flush().context("Flushing output writer")?;
    Ok(())
}

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::data::parse_finite_number;

const MAX_CELL_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Right,
}

/// Renders rows as a plain-text table. Columns whose non-empty cells are all
/// numbers are right-aligned; cells wider than the display limit are cut
/// with an ellipsis.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let cells = rows
        .iter()
        .map(|row| {
            row.iter()
                .take(column_count)
                .map(|cell| clip(&sanitize_cell(cell)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let alignments = (0..column_count)
        .map(|idx| column_alignment(&cells, idx))
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| sanitize_cell(h).into_owned()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths, &alignments));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, &alignments));
    for row in &cells {
        let _ = writeln!(output, "{}", format_row(row, &widths, &alignments));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let rendered = render_table(headers, rows);
    print!("{rendered}");
}

fn column_alignment(rows: &[Vec<String>], idx: usize) -> Alignment {
    let mut values = rows
        .iter()
        .filter_map(|row| row.get(idx))
        .filter(|cell| !cell.is_empty())
        .peekable();
    if values.peek().is_none() {
        return Alignment::Left;
    }
    if values.all(|cell| parse_finite_number(cell.trim_end_matches('%')).is_some()) {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

fn format_row(values: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let mut cells = Vec::with_capacity(widths.len());
    for (idx, width) in widths.iter().enumerate() {
        let value = values.get(idx).map(String::as_str).unwrap_or("");
        let padding = " ".repeat(width.saturating_sub(display_width(value)));
        let cell = match alignments.get(idx) {
            Some(Alignment::Right) => format!("{padding}{value}"),
            _ => format!("{value}{padding}"),
        };
        cells.push(cell);
    }
    cells.join("  ").trim_end().to_string()
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut clipped = value.chars().take(MAX_CELL_WIDTH - 1).collect::<String>();
    clipped.push('…');
    clipped
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn numeric_columns_align_right() {
        let headers = strings(&["name", "count"]);
        let rows = vec![strings(&["alpha", "5"]), strings(&["b", "120"])];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "name   count");
        assert_eq!(lines[1], "-----  -----");
        assert_eq!(lines[2], "alpha      5");
        assert_eq!(lines[3], "b        120");
    }

    #[test]
    fn long_cells_are_clipped() {
        let long = "x".repeat(60);
        let rendered = render_table(&strings(&["v"]), &[vec![long]]);
        let last = rendered.lines().last().unwrap();
        assert_eq!(last.chars().count(), MAX_CELL_WIDTH);
        assert!(last.ends_with('…'));
    }
}

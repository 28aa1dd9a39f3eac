use anyhow::Result;
use log::info;

use crate::{
    cli::SearchArgs,
    data::{Row, Table},
    session::Session,
    table,
};

/// Rows where any cell's string form contains `term`, ignoring case. An
/// empty term matches every row.
pub fn search_rows<'a>(table: &'a Table, term: &str) -> Vec<&'a Row> {
    if term.is_empty() {
        return table.rows().iter().collect();
    }
    let needle = term.to_lowercase();
    table
        .rows()
        .iter()
        .filter(|row| {
            row.iter()
                .any(|(_, cell)| cell.as_display().to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn execute(args: &SearchArgs) -> Result<()> {
    let config = crate::load_config(&args.input)?;
    let table = crate::load_table(&args.input)?;
    let mut session = Session::load(table, config);
    if args.cleaned {
        session.apply_cleaning();
    }
    session.set_search(args.term.as_str());

    let working = session.working_table();
    let columns = working
        .columns()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let matches = session.visible_rows();
    let shown = if args.limit > 0 {
        args.limit.min(matches.len())
    } else {
        matches.len()
    };
    let rows = matches[..shown]
        .iter()
        .map(|row| working.display_record(row))
        .collect::<Vec<_>>();

    table::print_table(&columns, &rows);
    if shown < matches.len() {
        println!("Showing {shown} of {} rows", matches.len());
    }
    info!(
        "Found {} row(s) matching '{}' in {:?}",
        matches.len(),
        session.search_term(),
        args.input.input
    );
    Ok(())
}

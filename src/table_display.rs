use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::api_client::Snapshot;
use crate::monitor::{flatten_snapshot, metric_columns};

/// Render a snapshot as a plain-text table
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let columns = metric_columns();
    let rows = flatten_snapshot(&snapshot.body);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(&c.header).add_attribute(Attribute::Bold)),
    );

    for row in &rows {
        table.add_row(columns.iter().map(|c| c.display(row)));
    }

    table.to_string()
}

/// Print a snapshot for `--snapshot` mode
pub fn print_snapshot(snapshot: &Snapshot) {
    println!(
        "{} {}",
        snapshot.kind.title().blue().bold(),
        snapshot.fetched_at.format("(%H:%M:%S)").to_string().dark_grey()
    );
    println!("{}", format_snapshot(snapshot));
    println!();
}

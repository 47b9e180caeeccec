use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::table::{TableEngine, TableRow};

/// Write the table's current page to CSV using the on-screen cell text.
///
/// When rows of this page are selected only those are written.
/// Returns the number of data rows written.
pub fn export_rows_csv<T: TableRow>(engine: &TableEngine<T>, path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;

    let columns = engine.columns();
    wtr.write_record(columns.iter().map(|c| c.header.as_str()))?;

    let only_selected = engine.data().iter().any(|row| engine.is_row_selected(row));
    let mut written = 0;
    for row in engine.data() {
        if only_selected && !engine.is_row_selected(row) {
            continue;
        }
        wtr.write_record(columns.iter().map(|c| c.display(row)))?;
        written += 1;
    }

    wtr.flush()?;
    info!(target: "export", "Exported {} rows to {}", written, path.display());
    Ok(written)
}

/// `<dir>/<resource>_<timestamp>.csv`
pub fn export_file_name(dir: &Path, resource: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.csv", resource.replace('/', "_"), stamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnDefinition;
    use serde_json::{json, Value};

    fn engine() -> TableEngine<Value> {
        let mut engine = TableEngine::new(vec![
            ColumnDefinition::new("id", "ID"),
            ColumnDefinition::new("amount", "Amount"),
        ])
        .unwrap()
        .selectable(true);
        engine
            .set_data(
                vec![
                    json!({"id": "T1", "amount": 500}),
                    json!({"id": "T2", "amount": 0}),
                ],
                None,
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_export_all_rows_with_display_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let written = export_rows_csv(&engine(), &path).unwrap();
        assert_eq!(written, 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "ID,Amount\nT1,500\nT2,-\n");
    }

    #[test]
    fn test_export_only_selected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut engine = engine();
        engine.toggle_row(1).unwrap();
        assert_eq!(export_rows_csv(&engine, &path).unwrap(), 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("T2"));
        assert!(!contents.contains("T1"));
    }

    #[test]
    fn test_selection_on_other_page_exports_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut engine = engine();
        engine.set_selection(["T99".to_string()]);
        assert_eq!(export_rows_csv(&engine, &path).unwrap(), 2);
    }

    #[test]
    fn test_export_file_name() {
        let name = export_file_name(Path::new("/tmp"), "admin/transactions");
        let file = name.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.starts_with("admin_transactions_"));
        assert!(file.ends_with(".csv"));
    }
}

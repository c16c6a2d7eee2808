//! CSV input and output.
//!
//! Every input must carry a header row. Column types are inferred from the
//! whole column before any row is built, so a column reads as integers only if
//! every non-empty cell is an integer.

use std::fs::File;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::table::{ColumnKind, Table};

/// Load a headed CSV file into a [`Table`] named `name`, failing if any of
/// `required` columns is absent.
pub fn load_table(path: &Path, name: &str, required: &[&str]) -> Result<Table> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AnalysisError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    for column in required {
        if !columns.iter().any(|c| c == column) {
            return Err(AnalysisError::missing_column(name, column));
        }
    }

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| AnalysisError::csv(path, e))?;

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|i| ColumnKind::infer(records.iter().map(|r| r.get(i).unwrap_or(""))))
        .collect();

    let mut table = Table::new(name, columns);
    for record in &records {
        let row = kinds
            .iter()
            .zip(record.iter())
            .map(|(kind, cell)| kind.parse(cell))
            .collect();
        table.push_row(row)?;
    }

    log::info!(
        "loaded {} ({} rows) from {}",
        name,
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Write `table` as CSV with a header row. Nulls become empty fields.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| AnalysisError::csv(path, e))?;
    writer
        .write_record(table.columns())
        .map_err(|e| AnalysisError::csv(path, e))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| AnalysisError::csv(path, e))?;
    }
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;

    log::info!("wrote {} ({} rows) to {}", table.name(), table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn write(dir: &Path, file: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_infers_types() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "t.csv",
            "uid,active_mins,gender\n1,10,male\n2,,female\n3,2.5,unknown\n",
        );
        let t = load_table(&path, "t", &["uid", "active_mins"]).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[0][0], Value::Int(1));
        assert_eq!(t.rows()[0][1], Value::Float(10.0));
        assert!(t.rows()[1][1].is_null());
        assert_eq!(t.rows()[2][2], Value::Text("unknown".into()));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.csv");
        let err = load_table(&path, "t", &[]).unwrap_err();
        match err {
            AnalysisError::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_is_not_readable_as_table() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_table(tmp.path(), "t", &[]).unwrap_err();
        assert!(
            matches!(err, AnalysisError::Io { .. } | AnalysisError::Csv { .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_missing_required_column() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "t.csv", "uid,minutes\n1,2\n");
        let err = load_table(&path, "t1", &["uid", "active_mins"]).unwrap_err();
        assert_eq!(err.to_string(), "table 't1' has no column 'active_mins'");
    }

    #[test]
    fn test_ragged_record_is_csv_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "t.csv", "uid,active_mins\n1,2\n3\n");
        let err = load_table(&path, "t", &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::Csv { .. }));
    }

    #[test]
    fn test_write_then_read_preserves_nulls() {
        let tmp = tempfile::tempdir().unwrap();
        let table = Table::from_rows(
            "t",
            &["uid", "active_mins", "variant_number"],
            vec![
                vec![Value::Int(1), Value::Float(10.0), Value::Int(0)],
                vec![Value::Int(2), Value::Float(12.5), Value::Null],
            ],
        )
        .unwrap();
        let path = tmp.path().join("out.csv");
        write_table(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "uid,active_mins,variant_number\n1,10.0,0\n2,12.5,\n");

        let back = load_table(&path, "t", &[]).unwrap();
        assert_eq!(back, table);
    }
}

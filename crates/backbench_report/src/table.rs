//! A metrics CSV held in memory.

use crate::error::{ReportError, ReportResult};
use csv::StringRecord;
use std::fmt;
use std::path::Path;

/// One metrics file: its header and rows, all as text.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    name: String,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl MetricsTable {
    /// Reads a CSV file with a header row.
    pub fn from_path(path: &Path) -> ReportResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    /// Builds a table from already-parsed parts.
    pub fn new(name: impl Into<String>, headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// File name the table was read from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Data rows.
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns true if the table has the column.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Parses every cell of a column as a number.
    pub fn column_f64(&self, name: &str) -> ReportResult<Vec<f64>> {
        let index = self.column(name).ok_or_else(|| ReportError::MissingColumn {
            file: self.name.clone(),
            column: name.to_string(),
        })?;
        self.rows
            .iter()
            .map(|row| {
                let cell = row.get(index).unwrap_or("").trim();
                cell.parse::<f64>().map_err(|_| ReportError::InvalidValue {
                    file: self.name.clone(),
                    column: name.to_string(),
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    /// Pairs two numeric columns row by row.
    pub fn points(&self, x: &str, y: &str) -> ReportResult<Vec<(f64, f64)>> {
        let xs = self.column_f64(x)?;
        let ys = self.column_f64(y)?;
        Ok(xs.into_iter().zip(ys).collect())
    }
}

impl fmt::Display for MetricsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(str::len).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.len());
            }
        }
        let index_width = self.rows.len().saturating_sub(1).to_string().len();

        write!(f, "{:index_width$}", "")?;
        for (header, width) in self.headers.iter().zip(&widths) {
            write!(f, "  {header:>width$}")?;
        }
        writeln!(f)?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{i:<index_width$}")?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {cell:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MetricsTable {
        MetricsTable::new(
            "full_backup_log.csv",
            StringRecord::from(vec!["batch", "type", "backup_time_s"]),
            vec![
                StringRecord::from(vec!["0", "full", "1.5"]),
                StringRecord::from(vec!["1", "full", "12.25"]),
            ],
        )
    }

    #[test]
    fn column_lookup() {
        let t = table();
        assert_eq!(t.column("type"), Some(1));
        assert!(!t.has_column("backup_size_MB"));
        assert_eq!(t.column_f64("backup_time_s").unwrap(), vec![1.5, 12.25]);
        assert_eq!(
            t.points("batch", "backup_time_s").unwrap(),
            vec![(0.0, 1.5), (1.0, 12.25)]
        );
    }

    #[test]
    fn missing_and_invalid_columns() {
        let t = table();
        assert!(matches!(
            t.column_f64("cpu_after"),
            Err(ReportError::MissingColumn { .. })
        ));
        match t.column_f64("type") {
            Err(ReportError::InvalidValue { value, .. }) => assert_eq!(value, "full"),
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn display_aligns_columns() {
        let text = table().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   batch  type  backup_time_s");
        assert_eq!(lines[1], "0      0  full            1.5");
        assert_eq!(lines[2], "1      1  full          12.25");
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("log_based_restore_log.csv");
        std::fs::write(
            &path,
            "Step,File Name,restore_time_s,cpu_before,cpu_after\n\
             Full Restore,full_backup.sql,3.1,10.0,55.5\n",
        )
        .unwrap();

        let t = MetricsTable::from_path(&path).unwrap();
        assert_eq!(t.name(), "log_based_restore_log.csv");
        assert_eq!(t.len(), 1);
        assert_eq!(t.column("File Name"), Some(1));
        assert_eq!(t.column_f64("cpu_after").unwrap(), vec![55.5]);
    }
}

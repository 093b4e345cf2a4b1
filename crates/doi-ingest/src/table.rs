//! In-memory table and format dispatch.

use std::path::Path;

use calamine::Data;

use crate::error::{IngestError, Result};
use crate::{csv_io, xlsx_io};

/// Supported tabular file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Xlsx),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Header row plus data rows, kept as text so write-back preserves
/// every original column and the row order.
///
/// Tables read from a workbook also remember the typed cell each text was
/// rendered from. Cells whose text is unchanged at write-back are written
/// with their original type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    source: Option<Vec<Vec<Data>>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            source: None,
        }
    }

    pub(crate) fn with_source(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        source: Vec<Vec<Data>>,
    ) -> Self {
        Self {
            headers,
            rows,
            source: Some(source),
        }
    }

    /// Typed cell read at `(row, column)`, if the table came from a workbook.
    pub(crate) fn source_cell(&self, row: usize, column: usize) -> Option<&Data> {
        self.source
            .as_ref()
            .and_then(|grid| grid.get(row))
            .and_then(|cells| cells.get(column))
    }

    /// Index of the first header equal to `name`, ignoring ASCII case.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    /// Returns the column named `name`, appending an empty one if absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.headers.push(name.to_string());
        self.headers.len() - 1
    }

    /// Sets a cell, padding short rows with empty cells.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        let Some(cells) = self.rows.get_mut(row) else {
            return;
        };
        if cells.len() <= column {
            cells.resize(column + 1, String::new());
        }
        cells[column] = value.into();
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows padded to the header width, for writers.
    pub(crate) fn padded_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let width = self.headers.len();
        self.rows.iter().map(move |cells| {
            let mut row = cells.clone();
            if row.len() < width {
                row.resize(width, String::new());
            }
            row
        })
    }
}

/// Reads a `.csv` or `.xlsx` file.
pub fn read_table(path: &Path) -> Result<Table> {
    let format = TableFormat::from_path(path)?;
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut table = match format {
        TableFormat::Csv => csv_io::read_csv(path)?,
        TableFormat::Xlsx => xlsx_io::read_xlsx(path)?,
    };
    for header in &mut table.headers {
        *header = normalize_header(header);
    }
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table loaded"
    );
    Ok(table)
}

/// Overwrites `path` with `table` in the format implied by its extension.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => csv_io::write_csv(path, table),
        TableFormat::Xlsx => xlsx_io::write_xlsx(path, table),
    }
}

/// Trims whitespace and a stray BOM from a header cell.
fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["title".to_string(), "url".to_string()],
            vec![
                vec!["A".to_string(), "https://a".to_string()],
                vec!["B".to_string()],
            ],
        )
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            TableFormat::from_path(Path::new("rows.CSV")).unwrap(),
            TableFormat::Csv
        );
        assert_eq!(
            TableFormat::from_path(Path::new("rows.xlsx")).unwrap(),
            TableFormat::Xlsx
        );
        assert!(TableFormat::from_path(Path::new("rows.xls")).is_err());
        assert!(TableFormat::from_path(Path::new("rows")).is_err());
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut table = table();
        let index = table.ensure_column("doi");
        assert_eq!(index, 2);
        assert_eq!(table.ensure_column("DOI"), 2);
        assert_eq!(table.headers.len(), 3);
    }

    #[test]
    fn set_cell_pads_short_rows() {
        let mut table = table();
        let doi = table.ensure_column("doi");
        table.set_cell(1, doi, "10.5072/b");
        assert_eq!(table.rows[1], vec!["B", "", "10.5072/b"]);
        assert_eq!(table.cell(1, doi), Some("10.5072/b"));
        table.set_cell(9, doi, "ignored");
        assert_eq!(table.len(), 2);
    }
}

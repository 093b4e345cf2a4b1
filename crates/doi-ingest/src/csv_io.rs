//! CSV reading and writing.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{IngestError, Result};
use crate::table::Table;

fn csv_error(path: &Path, err: &csv::Error) -> IngestError {
    IngestError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

pub(crate) fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|err| csv_error(path, &err))?;
    let headers = reader
        .headers()
        .map_err(|err| csv_error(path, &err))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| csv_error(path, &err))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}

pub(crate) fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|err| csv_error(path, &err))?;
    writer
        .write_record(&table.headers)
        .map_err(|err| csv_error(path, &err))?;
    for row in table.padded_rows() {
        writer
            .write_record(&row)
            .map_err(|err| csv_error(path, &err))?;
    }
    writer.flush().map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

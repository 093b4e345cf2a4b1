//! Excel workbook reading (first worksheet) and writing.

use std::path::Path;

use calamine::{Data, ExcelDateTime, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, TimeDelta};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::{IngestError, Result};
use crate::table::Table;

fn xlsx_error(path: &Path, message: impl ToString) -> IngestError {
    IngestError::Xlsx {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Renders an Excel serial date as `YYYY-MM-DD`, with a time part when the
/// serial has one.
fn serial_date_text(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let moment = epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
    let pattern = if serial.fract() == 0.0 {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    Some(moment.format(pattern).to_string())
}

fn datetime_text(value: &ExcelDateTime) -> String {
    let serial = value.as_f64();
    if value.is_duration() {
        return serial.to_string();
    }
    serial_date_text(serial).unwrap_or_else(|| serial.to_string())
}

/// Renders a cell the way it reads in the spreadsheet. Whole floats drop
/// their fractional part so years and ids stay integer-looking.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) if value.is_finite() && value.fract() == 0.0 => {
            format!("{value:.0}")
        }
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => datetime_text(value),
        other => other.to_string(),
    }
}

pub(crate) fn read_xlsx(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|err| xlsx_error(path, err))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|err| xlsx_error(path, err))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(cell_text).collect())
        .unwrap_or_default();
    let source: Vec<Vec<Data>> = rows.map(<[Data]>::to_vec).collect();
    let rows = source
        .iter()
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect();
    Ok(Table::with_source(headers, rows, source))
}

fn date_format(value: &ExcelDateTime) -> Format {
    let pattern = if value.is_duration() {
        "[h]:mm:ss"
    } else if value.as_f64().fract() == 0.0 {
        "yyyy-mm-dd"
    } else {
        "yyyy-mm-dd hh:mm:ss"
    };
    Format::new().set_num_format(pattern)
}

/// Writes a cell with the type it was read with.
fn write_typed(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Data::Empty => return Ok(()),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            sheet.write_string(row, col, value)?
        }
        Data::Float(value) => sheet.write_number(row, col, *value)?,
        Data::Int(value) => sheet.write_number(row, col, *value as f64)?,
        Data::Bool(value) => sheet.write_boolean(row, col, *value)?,
        Data::DateTime(value) => {
            sheet.write_number_with_format(row, col, value.as_f64(), &date_format(value))?
        }
        Data::Error(value) => sheet.write_string(row, col, &value.to_string())?,
    };
    Ok(())
}

pub(crate) fn write_xlsx(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let write = |err: XlsxError| xlsx_error(path, err);
    let column = |col: usize| {
        u16::try_from(col)
            .map_err(|_| xlsx_error(path, format!("column {col} exceeds the worksheet limit")))
    };

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, column(col)?, header).map_err(write)?;
    }
    for (row_index, row) in table.padded_rows().enumerate() {
        let excel_row = u32::try_from(row_index + 1)
            .map_err(|_| xlsx_error(path, format!("row {row_index} exceeds the worksheet limit")))?;
        for (col, value) in row.iter().enumerate() {
            let excel_col = column(col)?;
            let written = match table.source_cell(row_index, col) {
                Some(cell) if cell_text(cell) == *value => {
                    write_typed(sheet, excel_row, excel_col, cell)
                }
                _ if value.is_empty() => Ok(()),
                _ => sheet
                    .write_string(excel_row, excel_col, value)
                    .map(|_| ()),
            };
            written.map_err(write)?;
        }
    }
    workbook.save(path).map_err(write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_render_without_fraction() {
        assert_eq!(cell_text(&Data::Float(2024.0)), "2024");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn serial_dates_render_as_calendar_dates() {
        assert_eq!(serial_date_text(45723.0).as_deref(), Some("2025-03-07"));
        assert_eq!(
            serial_date_text(45723.5).as_deref(),
            Some("2025-03-07 12:00:00")
        );
    }

    #[test]
    fn oversized_tables_are_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.xlsx");
        let headers = (0..=usize::from(u16::MAX) + 1)
            .map(|index| format!("c{index}"))
            .collect();
        let err = write_xlsx(&path, &Table::new(headers, Vec::new())).unwrap_err();
        assert!(matches!(err, IngestError::Xlsx { .. }));
        assert!(!path.exists());
    }
}

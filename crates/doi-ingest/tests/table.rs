use std::fs;
use std::path::PathBuf;

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook};

use doi_ingest::{
    IngestError, create_backup, read_identifier_lines, read_table, write_table,
};

fn temp_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn csv_write_back_preserves_columns_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(
        &dir,
        "records.csv",
        "\u{feff}title,url,notes\nFirst,https://a.org,keep me\nSecond,https://b.org,\n",
    );

    let mut table = read_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["title", "url", "notes"]);
    let doi = table.ensure_column("doi");
    table.set_cell(1, doi, "10.5072/second");
    write_table(&path, &table).expect("write csv");

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "title,url,notes,doi\nFirst,https://a.org,keep me,\nSecond,https://b.org,,10.5072/second\n"
    );
}

#[test]
fn xlsx_round_trip_keeps_cell_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.xlsx");
    let table = doi_ingest::Table::new(
        vec!["title".into(), "publication_year".into(), "doi".into()],
        vec![
            vec!["Widget".into(), "2024".into(), "10.5072/w".into()],
            vec!["Gadget".into(), "2023".into(), String::new()],
        ],
    );
    write_table(&path, &table).expect("write xlsx");

    let read = read_table(&path).expect("read xlsx");
    assert_eq!(read.headers, table.headers);
    assert_eq!(read.rows[0], vec!["Widget", "2024", "10.5072/w"]);
    assert_eq!(read.rows[1][0], "Gadget");
    assert_eq!(read.rows[1][1], "2023");
}

#[test]
fn xlsx_write_back_keeps_untouched_cell_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    for (col, header) in ["title", "released", "accession", "active", "count"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "A").unwrap();
    sheet.write_number_with_format(1, 1, 45723.0, &date).unwrap();
    sheet.write_string(1, 2, "12345678901234567891").unwrap();
    sheet.write_boolean(1, 3, true).unwrap();
    sheet.write_number(1, 4, 7.0).unwrap();
    workbook.save(&path).unwrap();

    let mut table = read_table(&path).expect("read xlsx");
    assert_eq!(
        table.rows[0],
        vec!["A", "2025-03-07", "12345678901234567891", "true", "7"]
    );
    let doi = table.ensure_column("doi");
    table.set_cell(0, doi, "10.5072/a");
    write_table(&path, &table).expect("write xlsx");

    let mut reopened: Xlsx<_> = open_workbook(&path).unwrap();
    let range = reopened.worksheet_range_at(0).unwrap().unwrap();
    let cells: Vec<Data> = range.rows().nth(1).unwrap().to_vec();
    assert_eq!(cells[0], Data::String("A".into()));
    match &cells[1] {
        Data::DateTime(value) => {
            assert!(value.is_datetime());
            assert_eq!(value.as_f64(), 45723.0);
        }
        other => panic!("expected a date cell, got {other:?}"),
    }
    assert_eq!(cells[2], Data::String("12345678901234567891".into()));
    assert_eq!(cells[3], Data::Bool(true));
    assert_eq!(cells[4], Data::Float(7.0));
    assert_eq!(cells[5], Data::String("10.5072/a".into()));
}

#[test]
fn xlsx_edited_cells_are_written_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "doi").unwrap();
    sheet.write_number(1, 0, 42.0).unwrap();
    workbook.save(&path).unwrap();

    let mut table = read_table(&path).expect("read xlsx");
    table.set_cell(0, 0, "10.5072/42");
    write_table(&path, &table).expect("write xlsx");

    let mut reopened: Xlsx<_> = open_workbook(&path).unwrap();
    let range = reopened.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("10.5072/42".into()))
    );
}

#[test]
fn unsupported_extension_is_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(&dir, "records.ods", "title\nx\n");
    let err = read_table(&path).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn backup_copies_original_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(&dir, "records.csv", "title\nx\n");
    let backup = create_backup(&path).unwrap().expect("backup path");

    let name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("records.backup-"));
    assert!(name.ends_with(".csv"));
    assert_eq!(fs::read_to_string(&backup).unwrap(), "title\nx\n");
}

#[test]
fn identifier_lines_skip_blanks() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(&dir, "dois.txt", "10.5072/a\n\n  10.5072/b  \n\n");
    assert_eq!(
        read_identifier_lines(&path).unwrap(),
        vec!["10.5072/a", "10.5072/b"]
    );
}

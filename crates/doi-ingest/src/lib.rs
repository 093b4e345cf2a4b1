//! Spreadsheet ingestion for DOI sync.
//!
//! Loads `.csv` and `.xlsx` tables as text, writes them back in place with
//! every original column kept, and takes timestamped backups first.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use doi_ingest::{create_backup, read_table, write_table};
//!
//! let path = Path::new("records.xlsx");
//! let mut table = read_table(path)?;
//! let doi = table.ensure_column("doi");
//! table.set_cell(0, doi, "10.5072/abc");
//! create_backup(path)?;
//! write_table(path, &table)?;
//! ```

mod backup;
mod csv_io;
mod error;
mod lines;
mod table;
mod xlsx_io;

// === Error Types ===
pub use error::{IngestError, Result};

// === Tables ===
pub use table::{Table, TableFormat, read_table, write_table};

// === Backups ===
pub use backup::{backup_path, create_backup};

// === Identifier Lists ===
pub use lines::read_identifier_lines;

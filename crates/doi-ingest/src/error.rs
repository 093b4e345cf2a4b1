//! Error types for spreadsheet ingestion and write-back.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing tables.
///
/// All of these abort a run before (or instead of) any row processing.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy the input file aside before write-back.
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Format Errors ===
    /// Extension is neither `.csv` nor `.xlsx`.
    #[error("unsupported file type {path}; use .xlsx or .csv")]
    UnsupportedFormat { path: PathBuf },

    /// Failed to parse or write CSV.
    #[error("CSV error in {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// Failed to parse or write an Excel workbook.
    #[error("Excel error in {path}: {message}")]
    Xlsx { path: PathBuf, message: String },

    /// Workbook has no worksheet to read.
    #[error("workbook has no worksheets: {path}")]
    EmptyWorkbook { path: PathBuf },
}

impl IngestError {
    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

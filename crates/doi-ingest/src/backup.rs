//! Timestamped backups taken before write-back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::error::{IngestError, Result};

/// Backup path next to `path`: `{stem}.backup-{YYYYMMDD-HHMMSS}{.ext}`.
#[must_use]
pub fn backup_path(path: &Path, timestamp: NaiveDateTime) -> PathBuf {
    let stamp = timestamp.format("%Y%m%d-%H%M%S");
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.backup-{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}.backup-{stamp}"),
    };
    path.with_file_name(name)
}

/// Copies `path` aside using the current local time.
///
/// Returns `None` when the file does not exist (nothing to protect).
pub fn create_backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let backup = backup_path(path, Local::now().naive_local());
    fs::copy(path, &backup).map_err(|source| IngestError::Backup {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;
    info!(path = %path.display(), backup = %backup.display(), "backup created");
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .and_then(|date| date.and_hms_opt(9, 5, 1))
            .unwrap()
    }

    #[test]
    fn backup_name_keeps_stem_and_extension() {
        let path = Path::new("/data/records.xlsx");
        assert_eq!(
            backup_path(path, stamp()),
            PathBuf::from("/data/records.backup-20250307-090501.xlsx")
        );
    }

    #[test]
    fn backup_name_without_extension() {
        assert_eq!(
            backup_path(Path::new("records"), stamp()),
            PathBuf::from("records.backup-20250307-090501")
        );
    }

    #[test]
    fn missing_file_has_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_backup(&dir.path().join("absent.csv")).unwrap();
        assert!(result.is_none());
    }
}

use std::fs;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Reads one identifier per line, skipping blank lines.
pub fn read_identifier_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|err| IngestError::read(path, err))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

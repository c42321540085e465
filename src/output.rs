//! Atomic CSV output.

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{EnrichError, Result};
use crate::survey::SurveyTable;

/// Write the enriched table to `path`.
///
/// Serializes into a temporary file in the destination directory and
/// renames it into place, so a failure mid-write never leaves a
/// truncated table under the target name. Column order is the original
/// input order with appended columns last; geometry never materializes
/// as a column, so nothing needs dropping here.
pub fn write_table(table: &SurveyTable, path: &Path) -> Result<()> {
    let write_err = |source: std::io::Error| EnrichError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(write_err)?;

    let mut writer = csv::Writer::from_writer(tmp);

    writer
        .write_record(table.headers())
        .map_err(|e| write_err(std::io::Error::other(e)))?;
    for row in table.rows() {
        writer
            .write_record(row)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
    }

    let tmp = writer
        .into_inner()
        .map_err(|e| write_err(e.into_error()))?;
    tmp.persist(path)
        .map_err(|e| write_err(e.error))?;

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

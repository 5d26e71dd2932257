//! Archive creation
//!
//! Builds profile archives in memory, used for exports and test fixtures.

use modview_core::error::ModviewError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::TransportResult;

/// Create a zip archive from `(path, contents)` pairs, preserving order
pub fn create_archive(members: &[(&str, &[u8])]) -> TransportResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (path, contents) in members {
        writer
            .start_file(*path, options)
            .map_err(|e| ModviewError::archive(format!("failed to add member '{}'", path), e))?;
        writer
            .write_all(contents)
            .map_err(|e| ModviewError::io(format!("failed to write member '{}'", path), e))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ModviewError::archive("failed to finish archive".to_string(), e))?;

    Ok(cursor.into_inner())
}

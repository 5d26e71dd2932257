//! Archive member extraction
//!
//! Members are read fully into memory; profile archives are small and the
//! manifest must be extracted byte-for-byte.

use modview_core::error::ModviewError;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::TransportResult;

fn open(archive: &[u8]) -> TransportResult<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(archive))
        .map_err(|e| ModviewError::archive(format!("not a zip archive ({})", e), e))
}

/// Extract a single member by exact path
pub fn extract_member(archive: &[u8], member: &str) -> TransportResult<Vec<u8>> {
    let mut zip = open(archive)?;
    debug!("Opened profile archive with {} members", zip.len());

    let mut file = match zip.by_name(member) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(ModviewError::ManifestMissing {
                member: member.to_string(),
            })
        }
        Err(e) => {
            return Err(ModviewError::archive(
                format!("failed to read member '{}'", member),
                e,
            ))
        }
    };

    let mut contents = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut contents)
        .map_err(|e| ModviewError::archive(format!("failed to inflate member '{}'", member), e))?;

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::create::create_archive;

    #[test]
    fn test_extract_existing_member() {
        let archive = create_archive(&[("export.r2x", b"profileName: Test\n".as_slice())]).unwrap();
        let contents = extract_member(&archive, "export.r2x").unwrap();
        assert_eq!(contents, b"profileName: Test\n");
    }

    #[test]
    fn test_missing_member() {
        let archive = create_archive(&[("config/other.cfg", b"x".as_slice())]).unwrap();
        let result = extract_member(&archive, "export.r2x");
        assert!(matches!(result, Err(ModviewError::ManifestMissing { .. })));
    }

    #[test]
    fn test_nested_member_is_not_the_root_member() {
        let archive = create_archive(&[("nested/export.r2x", b"x".as_slice())]).unwrap();
        let result = extract_member(&archive, "export.r2x");
        assert!(matches!(result, Err(ModviewError::ManifestMissing { .. })));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let result = extract_member(b"definitely not a zip file", "export.r2x");
        assert!(matches!(result, Err(ModviewError::ArchiveUnreadable { .. })));
    }
}

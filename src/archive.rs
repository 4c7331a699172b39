//! Zip archive output for archive mode
//!
//! Streams enumerated source files into a single deflate-compressed zip
//! container. Entry names are always relative to the source root with
//! forward slashes, so the archive never leaks absolute paths or a leading
//! source-root directory.

use crate::error::{Result, SnapdirError};
use crate::scanner::FileRecord;
use crate::types::{ProgressCallback, ProgressInfo};
use crate::utils;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Write `files` into a deflate zip at `archive_path`
///
/// Emits one progress tick per entry after it is written. Returns the total
/// number of uncompressed bytes read from the source.
pub fn write_archive(
    archive_path: &Path,
    files: &[FileRecord],
    progress: Option<&ProgressCallback>,
) -> Result<u64> {
    let file = File::create(archive_path)
        .map_err(|e| SnapdirError::destination_write(archive_path, e))?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let total = files.len();
    let mut bytes = 0u64;

    for (done, record) in files.iter().enumerate() {
        let entry_name = utils::archive_entry_name(&record.relative)?;
        zip.start_file(entry_name.as_str(), options)?;

        let mut source = File::open(&record.path)?;
        bytes += io::copy(&mut source, &mut zip)
            .map_err(|e| SnapdirError::destination_write(archive_path, e))?;

        if let Some(progress) = progress {
            progress(ProgressInfo {
                completed: done + 1,
                total,
            });
        }
    }

    zip.finish()?
        .flush()
        .map_err(|e| SnapdirError::destination_write(archive_path, e))?;

    debug!(
        path = %archive_path.display(),
        entries = total,
        bytes,
        "Archive written"
    );

    Ok(bytes)
}

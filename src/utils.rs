//! Utility functions for snapdir
//!
//! Common helpers used throughout the library: atomic file writing, path
//! manipulation, byte formatting, and cross-platform metadata copying.

use crate::error::{Result, SnapdirError};
use std::fs;
use std::path::{Path, PathBuf};

/// Atomic file write (write to temp file then rename)
///
/// The target file is never observable in a partially written state: either
/// the whole document lands or the previous content survives.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Make a path relative to a base path
///
/// Tries a lexical strip first so symlinked components are preserved; falls
/// back to canonicalizing both sides when the direct strip fails (relative
/// components, differing normalization).
pub fn make_relative(path: &Path, base: &Path) -> Result<PathBuf> {
    if let Ok(relative) = path.strip_prefix(base) {
        return Ok(relative.to_path_buf());
    }

    let path_canon = path.canonicalize()?;
    let base_canon = base.canonicalize()?;

    path_canon
        .strip_prefix(&base_canon)
        .map(|p| p.to_path_buf())
        .map_err(|_| {
            SnapdirError::internal(format!(
                "Path {:?} is not relative to {:?}",
                path_canon, base_canon
            ))
        })
}

/// Render a relative path as a forward-slash archive entry name
///
/// Zip entry names are always `/`-separated regardless of platform; absolute
/// paths are rejected so no source-root prefix can leak into the archive.
pub fn archive_entry_name(relative: &Path) -> Result<String> {
    if relative.is_absolute() {
        return Err(SnapdirError::internal(format!(
            "Refusing absolute archive entry path: {:?}",
            relative
        )));
    }
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| SnapdirError::NonUtf8Path(relative.to_path_buf()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

/// Copy permissions and modification time from `src` onto `dst`
///
/// `fs::copy` already carries permission bits on Unix; the modification
/// timestamp needs an explicit transfer via filetime.
pub fn copy_metadata(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src)?;
    fs::set_permissions(dst, metadata.permissions())?;

    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dst, mtime)?;

    Ok(())
}

/// Format bytes in human-readable form
///
/// Uses binary (1024-based) units. Values under 1 KB are shown as whole
/// numbers, larger values with two decimal places.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write(&file_path, b"Test content").unwrap();

        let content = fs::read(&file_path).unwrap();
        assert_eq!(content, b"Test content");
        assert!(!file_path.with_extension("tmp").exists());
    }

    #[test]
    fn test_make_relative() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let subdir = base.join("subdir");
        let file = subdir.join("file.txt");

        fs::create_dir_all(&subdir).unwrap();
        fs::write(&file, b"test").unwrap();

        let relative = make_relative(&file, base).unwrap();
        assert_eq!(relative, PathBuf::from("subdir/file.txt"));
    }

    #[test]
    fn test_archive_entry_name() {
        let name = archive_entry_name(Path::new("sub/inner.txt")).unwrap();
        assert_eq!(name, "sub/inner.txt");
        assert!(archive_entry_name(Path::new("/abs/path.txt")).is_err());
    }

    #[test]
    fn test_copy_metadata_preserves_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.txt");
        let dst = temp_dir.path().join("dst.txt");
        fs::write(&src, b"a").unwrap();
        fs::write(&dst, b"a").unwrap();

        let old = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, old).unwrap();

        copy_metadata(&src, &dst).unwrap();

        let dst_meta = fs::metadata(&dst).unwrap();
        let dst_mtime = filetime::FileTime::from_last_modification_time(&dst_meta);
        assert_eq!(dst_mtime.unix_seconds(), 1_600_000_000);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
    }
}

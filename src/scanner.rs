//! Source tree enumeration
//!
//! Gathers every regular file reachable under the source directory before
//! any transfer starts, so the progress total is fixed up front. Directories
//! are walked but excluded from the count. A symlink that resolves to a
//! regular file is included (its target content gets backed up); symlinked
//! directories and broken links are skipped.

use crate::error::Result;
use crate::utils;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// A regular file discovered under the source root
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Enumerate every regular file under `source`, recursively
///
/// Order is whatever the directory walk yields; callers must not rely on a
/// specific ordering, only on the count being complete.
pub fn enumerate_files(source: &Path) -> Result<Vec<FileRecord>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry?;
        let file_type = entry.file_type();

        let size = if file_type.is_file() {
            entry.metadata()?.len()
        } else if file_type.is_symlink() {
            // Resolve the link; only symlinks to regular files count.
            match fs::metadata(entry.path()) {
                Ok(target) if target.is_file() => target.len(),
                _ => continue,
            }
        } else {
            continue;
        };

        let relative = utils::make_relative(entry.path(), source)?;
        trace!(path = %relative.display(), size, "Enumerated file");

        files.push(FileRecord {
            path: entry.path().to_path_buf(),
            relative,
            size,
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("file.txt"), "hello").unwrap();
        fs::write(root.join("sub/inner.txt"), "world").unwrap();
    }

    #[test]
    fn test_counts_files_not_directories() {
        let temp_dir = TempDir::new().unwrap();
        make_tree(temp_dir.path());

        let files = enumerate_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let mut relatives: Vec<_> = files
            .iter()
            .map(|f| f.relative.to_string_lossy().into_owned())
            .collect();
        relatives.sort();
        assert_eq!(relatives, vec!["file.txt", "sub/inner.txt"]);
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let files = enumerate_files(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_file_is_included() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("real.txt"), "data").unwrap();
        symlink(root.join("real.txt"), root.join("link.txt")).unwrap();
        symlink(root.join("gone.txt"), root.join("broken.txt")).unwrap();
        fs::create_dir(root.join("dir")).unwrap();
        symlink(root.join("dir"), root.join("dirlink")).unwrap();

        let files = enumerate_files(root).unwrap();

        let mut relatives: Vec<_> = files
            .iter()
            .map(|f| f.relative.to_string_lossy().into_owned())
            .collect();
        relatives.sort();
        assert_eq!(relatives, vec!["link.txt", "real.txt"]);

        let link = files
            .iter()
            .find(|f| f.relative == Path::new("link.txt"))
            .unwrap();
        assert_eq!(link.size, 4); // target's size, not the link's
    }

    #[test]
    fn test_sizes_are_recorded() {
        let temp_dir = TempDir::new().unwrap();
        make_tree(temp_dir.path());

        let files = enumerate_files(temp_dir.path()).unwrap();
        let total: u64 = files.iter().map(|f| f.size).sum();
        assert_eq!(total, 10); // "hello" + "world"
    }
}

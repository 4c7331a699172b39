//! Core data types used throughout the snapdir library
//!
//! The types in this module represent:
//! - **Requests**: [`BackupRequest`] - per-invocation parameters with
//!   config-backed fallbacks
//! - **Results**: [`BackupOutcome`] - what a completed run produced
//! - **Progress**: [`ProgressInfo`], [`ProgressCallback`] - per-file
//!   progress reporting during a run

use std::path::PathBuf;
use std::sync::Arc;

/// Which kind of artifact a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    /// Mirror the source tree as a plain directory copy
    Copy,
    /// Write a single deflate-compressed zip archive
    Archive,
}

impl BackupMode {
    /// Past-tense verb used in log messages ("Copied" / "Zipped")
    pub fn verb(&self) -> &'static str {
        match self {
            BackupMode::Copy => "Copied",
            BackupMode::Archive => "Zipped",
        }
    }
}

/// Parameters for a single backup run
///
/// `destination_root`, `version` and `compress` are optional; unset fields
/// fall back to the values persisted in the [`ConfigStore`] at run time.
/// An explicitly supplied value always takes precedence.
///
/// [`ConfigStore`]: crate::config::ConfigStore
///
/// # Examples
///
/// ```rust
/// use snapdir::BackupRequest;
/// use std::path::PathBuf;
///
/// let request = BackupRequest::new("./photos")
///     .destination_root("/mnt/backups")
///     .version("1.4.9")
///     .compress(true);
/// assert_eq!(request.source, PathBuf::from("./photos"));
/// ```
#[derive(Debug, Clone)]
pub struct BackupRequest {
    /// Directory to back up (must exist and be a directory)
    pub source: PathBuf,
    /// Root under which the artifact is created; config fallback when unset
    pub destination_root: Option<PathBuf>,
    /// Opaque dot-delimited version token; config fallback when unset
    pub version: Option<String>,
    /// Archive mode toggle; config fallback when unset
    pub compress: Option<bool>,
}

impl BackupRequest {
    /// Create a request for `source` with all fallbacks left to the config
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination_root: None,
            version: None,
            compress: None,
        }
    }

    /// Override the backup root for this run
    pub fn destination_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.destination_root = Some(root.into());
        self
    }

    /// Override the version token for this run
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the compression flag for this run
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }
}

/// Result of a completed backup run
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    /// Path of the created artifact (directory or zip file)
    pub destination: PathBuf,
    /// Whether the run copied or archived
    pub mode: BackupMode,
    /// Number of regular files processed
    pub files: usize,
    /// Total uncompressed bytes read from the source
    pub bytes: u64,
}

impl BackupOutcome {
    /// Bytes processed, formatted for display ("10 B", "1.50 KB", ...)
    pub fn human_bytes(&self) -> String {
        crate::utils::format_bytes(self.bytes)
    }
}

/// Progress callback for long-running operations
pub type ProgressCallback = Arc<dyn Fn(ProgressInfo) + Send + Sync>;

/// Information passed to progress callbacks
///
/// `completed` is non-decreasing from 0 to `total`, one increment per file
/// successfully processed, with an initial `(0, total)` notification emitted
/// after enumeration and before any transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Files processed so far
    pub completed: usize,
    /// Total files to process, fixed once enumeration finishes
    pub total: usize,
}

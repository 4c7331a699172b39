//! Main backup engine
//!
//! [`BackupEngine`] is the entry point for backup runs. A run validates the
//! source, fills unset request fields from the injected [`ConfigStore`],
//! computes the dated destination name, enumerates the source tree, then
//! either mirrors it (copy mode) or streams it into a zip (archive mode),
//! emitting per-file progress throughout.
//!
//! The persisted version token is bumped only after the transfer completes;
//! any failure leaves it untouched and leaves whatever partial destination
//! content exists on disk as-is.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use snapdir::{BackupEngine, BackupRequest, ConfigStore, MemorySink};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigStore::open("config.json")?;
//! let mut engine = BackupEngine::new(config, Arc::new(MemorySink::new()));
//!
//! let outcome = engine.run(
//!     BackupRequest::new("./my_project").compress(true),
//!     None,
//! )?;
//! println!("Backed up to {}", outcome.destination.display());
//! # Ok(())
//! # }
//! ```

use crate::archive;
use crate::config::{
    ConfigStore, DEFAULT_BACKUP_ROOT, KEY_BACKUP_ROOT, KEY_COMPRESS, KEY_DEFAULT_VERSION,
};
use crate::error::{Result, SnapdirError};
use crate::events::EventSink;
use crate::scanner::{self, FileRecord};
use crate::types::{BackupMode, BackupOutcome, BackupRequest, ProgressCallback, ProgressInfo};
use crate::utils;
use crate::version::bump_patch;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Backup engine coordinating naming, transfer, progress and versioning
///
/// Single-threaded and synchronous per invocation: enumeration, transfer and
/// progress emission happen sequentially in one logical flow. Concurrent
/// runs sharing one config document are not coordinated; the read-then-write
/// of the version token assumes a single writer.
pub struct BackupEngine {
    config: ConfigStore,
    sink: Arc<dyn EventSink>,
}

impl BackupEngine {
    /// Create an engine over an explicit config store and event sink
    pub fn new(config: ConfigStore, sink: Arc<dyn EventSink>) -> Self {
        Self { config, sink }
    }

    /// Access the underlying config store
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Run a backup
    ///
    /// Returns the outcome on success. On failure the error is logged
    /// through the event sink and propagated unchanged; the persisted
    /// version token is only ever written after a fully successful transfer.
    #[instrument(skip(self, progress), fields(source = %request.source.display()))]
    pub fn run(
        &mut self,
        request: BackupRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<BackupOutcome> {
        match self.run_inner(&request, progress.as_ref()) {
            Ok(outcome) => {
                self.sink.info(&format!(
                    "{} {} -> {}",
                    outcome.mode.verb(),
                    request.source.display(),
                    outcome.destination.display()
                ));
                if let Err(err) = self.bump_version(&request) {
                    self.sink.error(&err.to_string());
                    return Err(err);
                }
                Ok(outcome)
            }
            Err(err) => {
                self.sink.error(&err.to_string());
                Err(err)
            }
        }
    }

    fn run_inner(
        &mut self,
        request: &BackupRequest,
        progress: Option<&ProgressCallback>,
    ) -> Result<BackupOutcome> {
        // Source is validated before any destination-side effect.
        let source = resolve_source(&request.source)?;

        let destination_root = match &request.destination_root {
            Some(root) => root.clone(),
            None => PathBuf::from(self.config.get_str(KEY_BACKUP_ROOT, DEFAULT_BACKUP_ROOT)),
        };
        let version = request
            .version
            .clone()
            .unwrap_or_else(|| self.config.get_str(KEY_DEFAULT_VERSION, ""));
        let compress = request
            .compress
            .unwrap_or_else(|| self.config.get_bool(KEY_COMPRESS, false));
        let mode = if compress {
            BackupMode::Archive
        } else {
            BackupMode::Copy
        };

        fs::create_dir_all(&destination_root)
            .map_err(|e| SnapdirError::destination_write(&destination_root, e))?;

        let destination = destination_root.join(destination_name(&source, &version, compress));
        if destination.exists() {
            // Same-day, same-version re-run; refuse rather than overwrite.
            return Err(SnapdirError::DestinationExists(destination));
        }

        let files = scanner::enumerate_files(&source)?;
        let total = files.len();
        debug!(total, mode = ?mode, "Enumeration complete");
        if let Some(progress) = progress {
            progress(ProgressInfo { completed: 0, total });
        }

        let bytes = match mode {
            BackupMode::Copy => copy_tree(&source, &destination, &files, progress)?,
            BackupMode::Archive => archive::write_archive(&destination, &files, progress)?,
        };

        info!(
            files = total,
            bytes,
            destination = %destination.display(),
            "Backup complete"
        );

        Ok(BackupOutcome {
            destination,
            mode,
            files: total,
            bytes,
        })
    }

    /// Persist the bumped version token; runs only after a successful transfer
    fn bump_version(&mut self, request: &BackupRequest) -> Result<()> {
        let current = request
            .version
            .clone()
            .unwrap_or_else(|| self.config.get_str(KEY_DEFAULT_VERSION, ""));
        let bumped = bump_patch(&current);
        debug!(from = %current, to = %bumped, "Bumping default version");
        self.config.set(KEY_DEFAULT_VERSION, bumped)
    }
}

/// Resolve and validate the source directory
fn resolve_source(source: &Path) -> Result<PathBuf> {
    if !source.is_dir() {
        return Err(SnapdirError::source_not_found(source));
    }
    // Canonicalize so the artifact name derives from the real base name even
    // when the caller passes "." or a trailing slash.
    Ok(source.canonicalize()?)
}

/// Compute the artifact name: `{basename}_{YYYY-MM-DD}[_v{version}][.zip]`
fn destination_name(source: &Path, version: &str, compress: bool) -> String {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "backup".to_string());
    let date = Local::now().format("%Y-%m-%d");
    let version_part = if version.is_empty() {
        String::new()
    } else {
        format!("_v{}", version)
    };
    let suffix = if compress { ".zip" } else { "" };

    format!("{}_{}{}{}", base, date, version_part, suffix)
}

/// Mirror `files` under `destination`, preserving contents and metadata
fn copy_tree(
    source: &Path,
    destination: &Path,
    files: &[FileRecord],
    progress: Option<&ProgressCallback>,
) -> Result<u64> {
    let total = files.len();
    let mut bytes = 0u64;

    for (done, record) in files.iter().enumerate() {
        let target = destination.join(&record.relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SnapdirError::destination_write(parent, e))?;
        }

        bytes += fs::copy(&record.path, &target)
            .map_err(|e| SnapdirError::destination_write(&target, e))?;
        if let Err(e) = utils::copy_metadata(&record.path, &target) {
            // Contents are already safe; a metadata miss is not fatal.
            warn!(path = %target.display(), error = %e, "Failed to copy file metadata");
        }

        if let Some(progress) = progress {
            progress(ProgressInfo {
                completed: done + 1,
                total,
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn engine_in(dir: &Path) -> BackupEngine {
        let config = ConfigStore::open(dir.join("config.json")).unwrap();
        BackupEngine::new(config, Arc::new(MemorySink::new()))
    }

    fn make_tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("file.txt"), "hello").unwrap();
        fs::write(root.join("sub/inner.txt"), "world").unwrap();
    }

    #[test]
    fn test_destination_name_shapes() {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let source = Path::new("/data/photos");

        assert_eq!(
            destination_name(source, "", false),
            format!("photos_{}", date)
        );
        assert_eq!(
            destination_name(source, "1.2.3", false),
            format!("photos_{}_v1.2.3", date)
        );
        assert_eq!(
            destination_name(source, "1.2.3", true),
            format!("photos_{}_v1.2.3.zip", date)
        );
    }

    #[test]
    fn test_missing_source_fails_before_destination_exists() {
        let work = TempDir::new().unwrap();
        let mut engine = engine_in(work.path());

        let dest_root = work.path().join("never_created");
        let err = engine
            .run(
                BackupRequest::new(work.path().join("missing"))
                    .destination_root(&dest_root),
                None,
            )
            .unwrap_err();

        assert!(matches!(err, SnapdirError::SourceNotFound { .. }));
        assert!(!dest_root.exists());
    }

    #[test]
    fn test_copy_mode_mirrors_tree() {
        let work = TempDir::new().unwrap();
        let src = work.path().join("src");
        make_tree(&src);
        let mut engine = engine_in(work.path());

        let outcome = engine
            .run(
                BackupRequest::new(&src)
                    .destination_root(work.path().join("backups"))
                    .compress(false),
                None,
            )
            .unwrap();

        assert_eq!(outcome.mode, BackupMode::Copy);
        assert_eq!(outcome.files, 2);
        assert_eq!(
            fs::read_to_string(outcome.destination.join("file.txt")).unwrap(),
            "hello"
        );
        assert_eq!(
            fs::read_to_string(outcome.destination.join("sub/inner.txt")).unwrap(),
            "world"
        );
    }

    #[test]
    fn test_second_same_day_run_refuses_overwrite() {
        let work = TempDir::new().unwrap();
        let src = work.path().join("src");
        make_tree(&src);
        let mut engine = engine_in(work.path());

        let request = BackupRequest::new(&src)
            .destination_root(work.path().join("backups"))
            .version("1.0.0")
            .compress(false);
        engine.run(request.clone(), None).unwrap();
        let err = engine.run(request, None).unwrap_err();

        assert!(matches!(err, SnapdirError::DestinationExists(_)));
    }

    #[test]
    fn test_progress_includes_initial_zero_tick() {
        let work = TempDir::new().unwrap();
        let src = work.path().join("src");
        make_tree(&src);
        let mut engine = engine_in(work.path());

        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = ticks.clone();
        let progress: ProgressCallback = Arc::new(move |info| {
            sink.lock().unwrap().push(info);
        });

        engine
            .run(
                BackupRequest::new(&src).destination_root(work.path().join("backups")),
                Some(progress),
            )
            .unwrap();

        let ticks = ticks.lock().unwrap();
        assert_eq!(ticks.len(), 3); // (0,2) then one tick per file
        assert_eq!(ticks[0], ProgressInfo { completed: 0, total: 2 });
        assert!(ticks.windows(2).all(|w| w[0].completed <= w[1].completed));
        assert_eq!(ticks.last().unwrap().completed, 2);
        assert_eq!(ticks.last().unwrap().total, 2);
    }

    #[test]
    fn test_success_bumps_persisted_version() {
        let work = TempDir::new().unwrap();
        let src = work.path().join("src");
        make_tree(&src);
        let mut engine = engine_in(work.path());

        engine
            .run(
                BackupRequest::new(&src).destination_root(work.path().join("backups")),
                None,
            )
            .unwrap();

        assert_eq!(engine.config().get_str(KEY_DEFAULT_VERSION, "x"), "0.0.1");
    }

    #[test]
    fn test_explicit_version_feeds_the_bump() {
        let work = TempDir::new().unwrap();
        let src = work.path().join("src");
        make_tree(&src);
        let mut engine = engine_in(work.path());

        engine
            .run(
                BackupRequest::new(&src)
                    .destination_root(work.path().join("backups"))
                    .version("1.4.9"),
                None,
            )
            .unwrap();

        assert_eq!(engine.config().get_str(KEY_DEFAULT_VERSION, "x"), "1.4.10");
    }

    #[test]
    fn test_failure_logs_error_and_keeps_version() {
        let work = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::new());
        let config = ConfigStore::open(work.path().join("config.json")).unwrap();
        let mut engine = BackupEngine::new(config, sink.clone());

        let err = engine
            .run(BackupRequest::new(work.path().join("missing")), None)
            .unwrap_err();

        assert!(matches!(err, SnapdirError::SourceNotFound { .. }));
        assert_eq!(engine.config().get_str(KEY_DEFAULT_VERSION, "x"), "");
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "ERROR");
        assert!(entries[0].1.contains("missing"));
    }

    #[test]
    fn test_success_logs_mode_verb() {
        let work = TempDir::new().unwrap();
        let src = work.path().join("src");
        make_tree(&src);
        let sink = Arc::new(MemorySink::new());
        let config = ConfigStore::open(work.path().join("config.json")).unwrap();
        let mut engine = BackupEngine::new(config, sink.clone());

        engine
            .run(
                BackupRequest::new(&src)
                    .destination_root(work.path().join("backups"))
                    .compress(true),
                None,
            )
            .unwrap();

        let entries = sink.entries();
        assert_eq!(entries[0].0, "INFO");
        assert!(entries[0].1.starts_with("Zipped"));
    }
}

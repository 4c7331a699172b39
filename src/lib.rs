//! # snapdir - Timestamped local directory backups
//!
//! A small library (and CLI) that copies a source directory into a dated,
//! optionally zip-compressed artifact under a backup root, reporting
//! per-file progress and auto-bumping a persisted version token on success.
//!
//! ## Overview
//!
//! A backup run:
//! - validates the source directory before touching the destination side
//! - names the artifact `{basename}_{YYYY-MM-DD}[_v{version}][.zip]`
//! - enumerates every regular file up front so progress totals are exact
//! - mirrors the tree (copy mode) or writes a single deflate zip (archive
//!   mode), emitting one progress tick per file
//! - logs the outcome through an [`EventSink`] and, only on success, bumps
//!   the patch component of the persisted version token
//!
//! Failures are logged and propagated unchanged; a failed run never touches
//! the persisted version and performs no cleanup of partial output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapdir::{BackupEngine, BackupRequest, ConfigStore, RollingFileSink};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigStore::open("config.json")?;
//! let sink = Arc::new(RollingFileSink::new("logs")?);
//! let mut engine = BackupEngine::new(config, sink);
//!
//! let outcome = engine.run(
//!     BackupRequest::new("./photos")
//!         .destination_root("/mnt/backups")
//!         .compress(true),
//!     None,
//! )?;
//! println!("Backed up {} files to {}", outcome.files, outcome.destination.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress Reporting
//!
//! ```rust,no_run
//! # use snapdir::{BackupEngine, BackupRequest, ConfigStore, MemorySink};
//! # use std::sync::Arc;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut engine = BackupEngine::new(ConfigStore::open("config.json")?, Arc::new(MemorySink::new()));
//! let progress: snapdir::ProgressCallback = Arc::new(|info| {
//!     println!("{}/{}", info.completed, info.total);
//! });
//! engine.run(BackupRequest::new("./photos"), Some(progress))?;
//! # Ok(())
//! # }
//! ```
//!
//! For front-ends with their own event loop, [`worker::spawn`] runs the
//! engine on a background thread and streams progress and the final result
//! over an mpsc channel.
//!
//! ## Module Organization
//!
//! - [`engine`]: the backup pipeline ([`BackupEngine`])
//! - [`config`]: JSON-backed settings store ([`ConfigStore`])
//! - [`events`]: outcome logging ([`EventSink`], [`RollingFileSink`])
//! - [`version`]: version token bumping ([`version::bump_patch`])
//! - [`worker`]: background execution with channel-based event delivery
//! - [`scanner`], [`archive`]: enumeration and zip output
//! - [`types`], [`error`]: shared data types and error taxonomy

// Public API modules
pub mod archive;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod scanner;
pub mod types;
pub mod version;
pub mod worker;

// Internal modules (not part of public API)
mod utils;

// Re-export main types for convenience
pub use config::ConfigStore;
pub use engine::BackupEngine;
pub use error::{Result, SnapdirError};
pub use events::{EventSink, MemorySink, RollingFileSink};
pub use types::{BackupMode, BackupOutcome, BackupRequest, ProgressCallback, ProgressInfo};
pub use worker::BackupEvent;

//! Event sinks for run outcomes
//!
//! The engine reports outcomes through the narrow [`EventSink`] contract:
//! `info` for successes, `error` for failures. The default implementation,
//! [`RollingFileSink`], appends timestamped leveled lines to a size-bounded
//! rotating log file and mirrors every entry through `tracing` so console
//! output follows the active subscriber.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// Two-method contract consumed by the backup engine
pub trait EventSink: Send + Sync {
    /// Record an informational event
    fn info(&self, message: &str);
    /// Record an error event
    fn error(&self, message: &str);
}

/// Size cap per log file before rotation kicks in
const MAX_LOG_BYTES: u64 = 512 * 1024;
/// Number of rotated files retained (`backup.log.1` .. `backup.log.N`)
const RETAINED_LOGS: usize = 3;

/// Event sink backed by a rotating log file
///
/// Entries land in `<log_dir>/backup.log`. When the file would grow past the
/// size cap it is rotated: `backup.log.2` → `backup.log.3`, `backup.log.1` →
/// `backup.log.2`, `backup.log` → `backup.log.1`, oldest dropped.
pub struct RollingFileSink {
    log_path: PathBuf,
    file: Mutex<File>,
}

impl RollingFileSink {
    /// Create the sink, creating `log_dir` (and parents) if needed
    pub fn new(log_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join("backup.log");
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

        Ok(Self {
            log_path,
            file: Mutex::new(file),
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> &std::path::Path {
        &self.log_path
    }

    fn append(&self, level: &str, message: &str) {
        let line = format!(
            "{} [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );

        let mut file = self.file.lock();
        // Logging must never fail the backup itself; drop the entry on error.
        if self.needs_rotation(&file, line.len() as u64) {
            if let Ok(rotated) = self.rotate() {
                *file = rotated;
            }
        }
        let _ = file.write_all(line.as_bytes());
        let _ = file.flush();
    }

    fn needs_rotation(&self, file: &File, incoming: u64) -> bool {
        file.metadata()
            .map(|m| m.len() + incoming > MAX_LOG_BYTES)
            .unwrap_or(false)
    }

    fn rotate(&self) -> std::io::Result<File> {
        let oldest = self.rotated_path(RETAINED_LOGS);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for i in (1..RETAINED_LOGS).rev() {
            let from = self.rotated_path(i);
            if from.exists() {
                fs::rename(&from, self.rotated_path(i + 1))?;
            }
        }
        fs::rename(&self.log_path, self.rotated_path(1))?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = self.log_path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }
}

impl EventSink for RollingFileSink {
    fn info(&self, message: &str) {
        info!("{}", message);
        self.append("INFO", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
        self.append("ERROR", message);
    }
}

/// In-memory sink recording `(level, message)` pairs
///
/// Useful in tests and anywhere a durable log is unwanted.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().clone()
    }
}

impl EventSink for MemorySink {
    fn info(&self, message: &str) {
        self.entries
            .lock()
            .push(("INFO".to_string(), message.to_string()));
    }

    fn error(&self, message: &str) {
        self.entries
            .lock()
            .push(("ERROR".to_string(), message.to_string()));
    }
}

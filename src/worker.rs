//! Background execution of backup runs
//!
//! A front-end driving an event loop must not block on a run, and must not
//! share mutable state with it. [`spawn`] moves the engine onto a worker
//! thread and hands back a channel: the caller drains [`BackupEvent`]s from
//! its own thread, ending with a terminal [`BackupEvent::Finished`].
//!
//! There is no cancellation: once spawned, a run proceeds to completion or
//! failure.

use crate::engine::BackupEngine;
use crate::error::Result;
use crate::types::{BackupOutcome, BackupRequest, ProgressCallback, ProgressInfo};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Events posted by a background backup run
pub enum BackupEvent {
    /// Per-file progress, including the initial `(0, total)` notification
    Progress(ProgressInfo),
    /// Terminal event carrying the run result; nothing follows it
    Finished(Result<BackupOutcome>),
}

/// Run `request` on a background thread, streaming events over a channel
///
/// The engine is moved into the worker and returned through the join handle
/// so the caller can keep using its config store afterwards.
pub fn spawn(
    mut engine: BackupEngine,
    request: BackupRequest,
) -> (JoinHandle<BackupEngine>, Receiver<BackupEvent>) {
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let progress_tx = tx.clone();
        let progress: ProgressCallback = Arc::new(move |info| {
            // Receiver may have hung up; the run itself carries on.
            let _ = progress_tx.send(BackupEvent::Progress(info));
        });

        let result = engine.run(request, Some(progress));
        let _ = tx.send(BackupEvent::Finished(result));
        engine
    });

    (handle, rx)
}

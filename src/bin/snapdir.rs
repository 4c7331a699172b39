//! # snapdir CLI
//!
//! Command-line front-end for the snapdir backup library.
//!
//! ## Usage
//! ```bash
//! # Back up a folder into ./backups (default root)
//! snapdir ~/photos
//!
//! # Explicit destination root, zip compression, explicit version tag
//! snapdir ~/photos /mnt/backups --zip --version-tag 1.4.9
//! ```
//!
//! The backup itself runs on a worker thread; this process's main thread
//! only drains progress events off a channel and renders the bar, so no
//! engine state is ever touched from two threads.

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use snapdir::{
    worker, BackupEngine, BackupEvent, BackupOutcome, BackupRequest, ConfigStore, RollingFileSink,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Timestamped local directory backups with optional zip compression
#[derive(Parser)]
#[command(name = "snapdir")]
#[command(version)]
#[command(about = "Back up a directory into a dated, optionally zipped artifact")]
struct Cli {
    /// Directory to back up
    source: PathBuf,

    /// Backup root the artifact is created under (config default: "backups")
    destination_root: Option<PathBuf>,

    /// Version tag embedded in the artifact name (config default otherwise)
    #[arg(short = 't', long)]
    version_tag: Option<String>,

    /// Store the backup as a single .zip archive
    #[arg(short, long)]
    zip: bool,

    /// Config file location
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Directory for the rotating backup log
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(outcome) => {
            println!(
                "{} Backed up {} files ({}) to {}",
                "✓".green().bold(),
                outcome.files,
                outcome.human_bytes(),
                outcome.destination.display().to_string().cyan()
            );
        }
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<BackupOutcome> {
    use anyhow::Context;

    let config = ConfigStore::open(&cli.config)
        .with_context(|| format!("opening config {}", cli.config.display()))?;
    let sink = Arc::new(
        RollingFileSink::new(&cli.log_dir)
            .with_context(|| format!("opening log directory {}", cli.log_dir.display()))?,
    );
    let engine = BackupEngine::new(config, sink);

    let mut request = BackupRequest::new(&cli.source);
    if let Some(root) = &cli.destination_root {
        request = request.destination_root(root);
    }
    if let Some(tag) = &cli.version_tag {
        request = request.version(tag);
    }
    if cli.zip {
        request = request.compress(true);
    }

    let (handle, events) = worker::spawn(engine, request);

    let bar = ProgressBar::hidden();
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} files")
            .unwrap(),
    );

    let mut outcome = None;
    for event in events {
        match event {
            BackupEvent::Progress(info) => {
                if bar.is_hidden() && info.total > 0 {
                    bar.set_length(info.total as u64);
                    bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                bar.set_position(info.completed as u64);
            }
            BackupEvent::Finished(result) => {
                bar.finish_and_clear();
                outcome = Some(result);
            }
        }
    }
    let _ = handle.join();

    match outcome {
        Some(Ok(outcome)) => Ok(outcome),
        Some(Err(e)) => Err(e.into()),
        None => anyhow::bail!("backup worker exited without reporting a result"),
    }
}

//! Emission worker: writes one source's log file on a schedule.
//!
//! A worker moves through three states:
//!
//! - **Init**: create the parent directory, then truncate the target file or
//!   create it if missing and touch its modification time.
//! - **Active**: wait `frequency` (or until cancelled), then write one cycle
//!   of `amount` lines, appended in ascending timestamp order.
//! - **Stopped**: the task returns and the file is no longer touched.
//!
//! Failing to create the directory, open or write the file stops the worker
//! with an error. A line that fails to render is logged and skipped.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use event_generator::EventGenerator;
use source_config::SourceConfig;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Periodically generates lines for one source and appends them to its file.
pub struct EmissionWorker {
    generator: EventGenerator,
    truncate_on_start: bool,
    token: CancellationToken,
}

impl EmissionWorker {
    /// Create a worker for `source`.
    ///
    /// With `truncate_on_start` the target file is emptied before the first
    /// cycle; otherwise existing content is kept and lines are appended.
    pub fn new(source: SourceConfig, truncate_on_start: bool) -> Self {
        Self {
            generator: EventGenerator::new(source),
            truncate_on_start,
            token: CancellationToken::new(),
        }
    }

    /// Token that stops this worker when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Run the worker on the tokio runtime.
    pub fn spawn(self) -> WorkerHandle {
        let source = self.generator.source();
        let name = source.name.clone();
        let file = source.file.clone();
        let token = self.token.clone();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let result = self.run().await;
            if let Err(e) = &result {
                error!("Worker for \"{}\" stopped: {:#}", task_name, e);
            }
            result
        });

        WorkerHandle {
            name,
            file,
            token,
            handle,
        }
    }

    /// Run until cancelled or until an I/O error occurs.
    pub async fn run(mut self) -> Result<()> {
        self.prepare_file().await?;

        let frequency = self.generator.source().frequency;
        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(frequency) => {}
            }
            self.emit_cycle().await?;
        }

        debug!("Stopped worker for \"{}\"", self.generator.source().name);
        Ok(())
    }

    async fn prepare_file(&self) -> Result<()> {
        let path = &self.generator.source().file;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        if self.truncate_on_start {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
                .with_context(|| format!("Failed to truncate file: {}", path.display()))?;
        } else {
            let file = open_append(path).await?.into_std().await;
            tokio::task::spawn_blocking(move || file.set_modified(SystemTime::now()))
                .await
                .context("Touch task failed")?
                .with_context(|| format!("Failed to touch file: {}", path.display()))?;
        }

        Ok(())
    }

    async fn emit_cycle(&mut self) -> Result<()> {
        let source = self.generator.source();
        let name = source.name.clone();
        let path = source.file.clone();

        info!(
            "Writing {:4} logs for \"{}\" ({})",
            source.amount,
            name,
            path.display()
        );

        let mut file = open_append(&path).await?;
        for (timestamp, line) in self.generator.cycle(Utc::now()) {
            // Only between lines, never in the middle of one
            if self.token.is_cancelled() {
                debug!("Cancelled mid-cycle for \"{}\"", name);
                break;
            }

            match line {
                Ok(mut line) => {
                    line.push('\n');
                    file.write_all(line.as_bytes())
                        .await
                        .with_context(|| format!("Failed to write to {}", path.display()))?;
                }
                Err(e) => warn!("Skipping line for \"{}\" at {}: {}", name, timestamp, e),
            }
        }

        file.flush()
            .await
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }
}

async fn open_append(path: &Path) -> Result<tokio::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open file: {}", path.display()))
}

/// Handle to a running worker, owned by the supervisor.
pub struct WorkerHandle {
    name: String,
    file: PathBuf,
    token: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

impl WorkerHandle {
    /// Name of the source the worker writes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target file of the worker.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Ask the worker to stop. It exits at its next wait or after the line
    /// it is currently writing.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the worker task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker to exit and return its result.
    pub async fn join(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result.with_context(|| format!("Worker for \"{}\" failed", self.name)),
            Err(e) => Err(anyhow!("Worker for \"{}\" panicked: {e}", self.name)),
        }
    }
}

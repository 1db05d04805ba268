//! Supervisor: owns the running workers and replaces them on reload.
//!
//! Reload and stop requests arrive asynchronously through a
//! [`SupervisorHandle`]. The handle only sets flags and wakes the control
//! loop; the worker set itself is touched by the control loop alone.

use crate::worker::{EmissionWorker, WorkerHandle};
use anyhow::{Context, Result};
use source_config::{discover_sources, load_source, ConfigError, SourceConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

/// Snapshot of the worker set, published after every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorStatus {
    /// Number of completed loads (1 after the initial load)
    pub generation: u64,
    /// Names of the sources with a running worker
    pub active: Vec<String>,
}

#[derive(Debug)]
struct ControlFlags {
    should_run: AtomicBool,
    should_reload: AtomicBool,
    truncate_requested: AtomicBool,
    wake: Notify,
}

/// Cloneable handle for triggering reloads and shutdown.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    flags: Arc<ControlFlags>,
    status: watch::Receiver<SupervisorStatus>,
}

impl SupervisorHandle {
    /// Reload configuration and restart all workers, appending to existing files.
    pub fn trigger_reload(&self) {
        self.flags.should_reload.store(true, Ordering::SeqCst);
        self.flags.wake.notify_one();
    }

    /// Reload like [`trigger_reload`](Self::trigger_reload), but truncate the
    /// target files when the new workers start.
    pub fn trigger_truncating_reload(&self) {
        self.flags.truncate_requested.store(true, Ordering::SeqCst);
        self.trigger_reload();
    }

    /// Stop all workers and end [`Supervisor::run`].
    pub fn trigger_stop(&self) {
        self.flags.should_run.store(false, Ordering::SeqCst);
        self.flags.wake.notify_one();
    }

    /// Whether a stop has not been requested yet.
    pub fn is_running(&self) -> bool {
        self.flags.should_run.load(Ordering::SeqCst)
    }

    /// Latest published status.
    pub fn status(&self) -> SupervisorStatus {
        self.status.borrow().clone()
    }

    #[cfg(test)]
    pub(crate) fn reload_requested(&self) -> bool {
        self.flags.should_reload.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn truncate_requested(&self) -> bool {
        self.flags.truncate_requested.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn clear_reload_for_test(&self) {
        self.flags.should_reload.store(false, Ordering::SeqCst);
    }

    /// Receiver notified whenever a load completes.
    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status.clone()
    }
}

/// Owns the set of emission workers for one configuration root.
pub struct Supervisor {
    config_path: PathBuf,
    /// Truncate target files on the next load; only set before the first one
    truncate_next: bool,
    flags: Arc<ControlFlags>,
    status: watch::Sender<SupervisorStatus>,
    workers: Vec<WorkerHandle>,
    generation: u64,
}

impl Supervisor {
    /// Create a supervisor for a configuration file or directory.
    ///
    /// `truncate` empties the target files when the first set of workers
    /// starts. Later reloads always append.
    pub fn new(config_path: impl Into<PathBuf>, truncate: bool) -> Self {
        let (status, _) = watch::channel(SupervisorStatus::default());
        Self {
            config_path: config_path.into(),
            truncate_next: truncate,
            flags: Arc::new(ControlFlags {
                should_run: AtomicBool::new(true),
                should_reload: AtomicBool::new(true),
                truncate_requested: AtomicBool::new(false),
                wake: Notify::new(),
            }),
            status,
            workers: Vec::new(),
            generation: 0,
        }
    }

    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle {
            flags: Arc::clone(&self.flags),
            status: self.status.subscribe(),
        }
    }

    /// Run until stopped.
    ///
    /// Returns an error if the configuration root does not exist, at startup
    /// or on any later reload. Workers are stopped before returning either way.
    pub async fn run(mut self) -> Result<()> {
        info!("Starting normal execution");

        let result = self.control_loop().await;
        self.stop_workers().await;

        info!("All workers stopped");
        result
    }

    async fn control_loop(&mut self) -> Result<()> {
        while self.flags.should_run.load(Ordering::SeqCst) {
            if self.flags.should_reload.swap(false, Ordering::SeqCst) {
                self.reload().await?;
                continue;
            }
            // A trigger fired before this point leaves a permit, so no wakeup is lost
            self.flags.wake.notified().await;
        }
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        self.stop_workers().await;

        let requested = self.flags.truncate_requested.swap(false, Ordering::SeqCst);
        let truncate = self.truncate_next || requested;
        self.truncate_next = false;

        // Discovery and parsing use blocking std::fs
        let config_path = self.config_path.clone();
        let loaded = tokio::task::spawn_blocking(move || load_all(&config_path))
            .await
            .context("Configuration load task failed")??;
        let mut targets: HashMap<PathBuf, String> = HashMap::new();

        for (file, result) in loaded {
            let source = match result {
                Ok(source) => source,
                Err(e) => {
                    error!("{e}");
                    continue;
                }
            };

            // Skip over disabled configurations
            if !source.enabled {
                info!("Skipped: {}", file.display());
                continue;
            }

            let missing = source.missing_placeholders();
            if !missing.is_empty() {
                warn!(
                    "Source \"{}\" ({}) uses undefined fields {:?}; those lines will be skipped",
                    source.name,
                    file.display(),
                    missing
                );
            }
            if let Some(other) = targets.insert(source.file.clone(), source.name.clone()) {
                warn!(
                    "Sources \"{}\" and \"{}\" both write to {}",
                    other,
                    source.name,
                    source.file.display()
                );
            }

            info!("Loaded:  {}", file.display());
            self.workers.push(EmissionWorker::new(source, truncate).spawn());
        }

        self.generation += 1;
        let active: Vec<String> = self.workers.iter().map(|w| w.name().to_string()).collect();
        debug!("Load {} started {} worker(s)", self.generation, active.len());
        self.status.send_replace(SupervisorStatus {
            generation: self.generation,
            active,
        });

        Ok(())
    }

    /// Cancel every worker, then wait for all of them to exit.
    async fn stop_workers(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        let workers = std::mem::take(&mut self.workers);
        for worker in &workers {
            worker.cancel();
        }

        let results = futures::future::join_all(workers.into_iter().map(WorkerHandle::join)).await;
        for result in results {
            // Worker failures are already logged when they happen
            if let Err(e) = result {
                debug!("{e:#}");
            }
        }
    }
}

/// Each discovered file with its load result.
type LoadedSources = Vec<(PathBuf, Result<SourceConfig, ConfigError>)>;

/// Discover and load every source under `path`, keeping per-file failures.
fn load_all(path: &Path) -> Result<LoadedSources, ConfigError> {
    Ok(discover_sources(path)?
        .into_iter()
        .map(|file| {
            let result = load_source(&file);
            (file, result)
        })
        .collect())
}

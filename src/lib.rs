//! log-generator library
//!
//! Generates synthetic log files on a schedule. Each source configuration
//! file describes one target file, how often to write to it, how many lines
//! per cycle, a line template and the field generators that fill it.
//!
//! # Components
//!
//! - [`worker::EmissionWorker`] - writes one source's file on a schedule
//! - [`supervisor::Supervisor`] - owns all workers, reloads and stops them
//! - [`signals`] - maps process signals onto supervisor triggers
//! - [`check::check_config`] - validates configuration without running it
//!
//! Configuration parsing lives in the `source_config` crate and value
//! generation in the `event_generator` crate.
//!
//! # CLI Usage
//!
//! ```bash
//! # Run every *.yaml source in a directory, truncating the logs first
//! log-generator /etc/log-generator --truncate
//!
//! # Reload after editing the configuration
//! kill -HUP $(pidof log-generator)
//!
//! # Validate configuration only
//! log-generator /etc/log-generator --check
//! ```

pub mod check;
pub mod signals;
pub mod supervisor;
pub mod worker;

pub use check::{check_config, CheckReport};
pub use supervisor::{Supervisor, SupervisorHandle, SupervisorStatus};
pub use worker::{EmissionWorker, WorkerHandle};

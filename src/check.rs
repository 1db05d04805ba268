//! Configuration check: load every source without starting workers.

use anyhow::Result;
use source_config::{discover_sources, load_source};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of checking a configuration root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Files that loaded and validated, with their source names
    pub valid: Vec<(PathBuf, String)>,
    /// Files that failed, with the error message
    pub invalid: Vec<(PathBuf, String)>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Load and validate every configuration file under `path`.
///
/// Fails only when `path` itself can't be read; per-file problems are
/// collected in the report.
pub fn check_config(path: &Path) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    for file in discover_sources(path)? {
        match load_source(&file) {
            Ok(source) => {
                let state = if source.enabled { "enabled" } else { "disabled" };
                info!("Valid:   {} (\"{}\", {})", file.display(), source.name, state);
                report.valid.push((file, source.name));
            }
            Err(e) => {
                error!("{e}");
                report.invalid.push((file, e.to_string()));
            }
        }
    }

    Ok(report)
}

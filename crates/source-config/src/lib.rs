//! Source configuration for log-generator.
//!
//! A source is one YAML document describing a log file to generate:
//! where it goes, how often lines are written, how many per cycle, the
//! line template and the field generators that fill it.
//!
//! # Example
//!
//! ```rust
//! use source_config::SourceConfig;
//!
//! let source = SourceConfig::from_yaml(r#"
//! name: access
//! file: /var/log/synthetic/access.log
//! frequency:
//!   seconds: 5
//! jitter:
//!   seconds: 3
//! amount: 20
//! format: "{ts} {client} {status}"
//! fields:
//!   ts:
//!     type: timestamp
//!     format: "%d/%b/%Y:%H:%M:%S"
//!   client:
//!     type: ip
//!     repeat: 5
//!   status:
//!     type: chance
//!     choices:
//!       - option: 200
//!         weight: 0.95
//!       - option: 500
//!         weight: 0.05
//! "#).unwrap();
//!
//! assert_eq!(source.amount, 20);
//! ```

pub mod duration;
pub mod field;
pub mod loader;
pub mod source;
pub mod template;

use std::path::PathBuf;

pub use duration::{parse_duration, DurationError};
pub use field::{Choice, FieldDefinition, FieldKind};
pub use loader::{discover_sources, load_source};
pub use source::{SourceConfig, ValidationError};
pub use template::{Segment, Template, TemplateError};

/// Error parsing a single source document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Error parsing YAML or a required key is missing
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document parsed but its values are invalid
    #[error("Invalid source: {0}")]
    Invalid(#[from] ValidationError),
}

/// Error type for configuration discovery and loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration root does not exist
    #[error("No such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    /// Error reading a configuration file or directory
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file failed parsing or validation
    #[error("Invalid configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

//! Field value and timestamp generation for log-generator.
//!
//! This crate turns a [`SourceConfig`](source_config::SourceConfig) into log
//! lines. [`EventGenerator`] owns one source together with the mutable state
//! of each field and the random number generator.
//!
//! # Architecture
//!
//! ```text
//! SourceConfig (YAML)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │    EventGenerator    │
//! │                      │
//! │  - source            │
//! │  - states (per field)│
//! │  - rng (StdRng)      │
//! └──────────┬───────────┘
//!            │  allocate_timestamps(now)
//!            │  next_value(field) per field
//!            │  render(format)
//!            ▼
//!   "2024-01-01 10:00:00 GET /index 200"
//! ```
//!
//! # Example
//!
//! ```rust
//! use event_generator::EventGenerator;
//! use source_config::SourceConfig;
//!
//! let source = SourceConfig::from_yaml(r#"
//! name: ids
//! file: /tmp/ids.log
//! frequency: 1s
//! amount: 3
//! format: "id={id}"
//! fields:
//!   id:
//!     type: integer
//!     min: 1
//!     max: 1
//! "#).unwrap();
//!
//! let mut generator = EventGenerator::new(source);
//! for (_, line) in generator.cycle(chrono::Utc::now()) {
//!     assert_eq!(line.unwrap(), "id=1");
//! }
//! ```
//!
//! # Field kinds
//!
//! - `enum` - Uniform selection from `values`
//! - `chance` - Weighted selection from `choices`
//! - `integer` - Random integer in `[min, max]`
//! - `float` - Random float in `[min, max]`
//! - `timestamp` - The line's timestamp, strftime-formatted
//! - `ip` - Random IPv4 address

pub mod field;
pub mod generator;
pub mod generators;
pub mod render;
pub mod timestamps;

// Re-exports for convenience
pub use field::{next_value, FieldError, FieldState, GenerationContext};
pub use generator::{CycleLines, EventGenerator, GenerateError};
pub use render::{render, RenderError};
pub use timestamps::allocate_timestamps;

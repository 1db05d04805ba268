//! Timestamp formatting.

use crate::field::FieldError;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Format the line's timestamp with a strftime pattern.
///
/// Patterns are validated when the source is loaded, so an error here
/// means the source was built without going through validation.
pub fn format_timestamp(timestamp: DateTime<Utc>, format: &str) -> Result<String, FieldError> {
    let mut out = String::new();
    write!(out, "{}", timestamp.format(format))
        .map_err(|_| FieldError::TimestampFormat(format.to_string()))?;
    Ok(out)
}

//! Source configuration: one configured log file and how to fill it.

use crate::field::{FieldDefinition, FieldKind};
use crate::template::Template;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Reason a source document failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("'name' must not be empty")]
    EmptyName,

    #[error("'file' must not be empty")]
    EmptyFile,

    #[error("'frequency' must be greater than zero")]
    ZeroFrequency,

    #[error("field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl ValidationError {
    fn field(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A single log source.
///
/// Loaded from one YAML document. `offset`, `jitter` and `enabled` are
/// optional; everything else is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Human readable source name
    pub name: String,

    /// Target log file
    pub file: PathBuf,

    /// Disabled sources are loaded but never started
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Time between emission cycles
    #[serde(with = "crate::duration")]
    pub frequency: Duration,

    /// Shift applied to every timestamp, backwards from now
    #[serde(default, with = "crate::duration")]
    pub offset: Duration,

    /// Upper bound of the random backwards shift of each timestamp
    #[serde(default, with = "crate::duration")]
    pub jitter: Duration,

    /// Lines written per emission cycle
    pub amount: u32,

    /// Line template
    pub format: Template,

    /// Field generators by name
    pub fields: BTreeMap<String, FieldDefinition>,

    /// Fixed RNG seed for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SourceConfig {
    /// Parse and validate a source from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, crate::ParseError> {
        let source: SourceConfig = serde_yaml::from_str(yaml)?;
        source.validate()?;
        Ok(source)
    }

    /// Check the constraints the type system can't express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.file.as_os_str().is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if self.frequency.is_zero() {
            return Err(ValidationError::ZeroFrequency);
        }
        for (name, field) in &self.fields {
            validate_field(name, field)?;
        }
        Ok(())
    }

    /// Placeholders in `format` that have no field definition.
    ///
    /// Lines using these fail to render at generation time.
    pub fn missing_placeholders(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = Vec::new();
        for name in self.format.placeholders() {
            if !self.fields.contains_key(name) && !missing.contains(&name) {
                missing.push(name);
            }
        }
        missing
    }
}

fn validate_field(name: &str, field: &FieldDefinition) -> Result<(), ValidationError> {
    if let Some(change) = field.change {
        if !(0.0..=1.0).contains(&change) {
            return Err(ValidationError::field(
                name,
                format!("'change' must be between 0 and 1, got {change}"),
            ));
        }
    }

    match &field.kind {
        FieldKind::Enum { values } => {
            if values.is_empty() {
                return Err(ValidationError::field(name, "'values' must not be empty"));
            }
            if !values.iter().all(is_scalar) {
                return Err(ValidationError::field(name, "'values' must be scalars"));
            }
        }
        FieldKind::Chance { choices } => {
            if choices.is_empty() {
                return Err(ValidationError::field(name, "'choices' must not be empty"));
            }
            if let Some(choice) = choices
                .iter()
                .find(|c| !c.weight.is_finite() || c.weight < 0.0)
            {
                return Err(ValidationError::field(
                    name,
                    format!("invalid weight {}", choice.weight),
                ));
            }
            if !choices.iter().all(|c| is_scalar(&c.option)) {
                return Err(ValidationError::field(name, "every 'option' must be a scalar"));
            }
            if choices.iter().all(|c| c.weight == 0.0) {
                return Err(ValidationError::field(name, "all weights are zero"));
            }
            if !choices.iter().map(|c| c.weight).sum::<f64>().is_finite() {
                return Err(ValidationError::field(name, "sum of weights overflows"));
            }
        }
        FieldKind::Integer { min, max } => {
            if min > max {
                return Err(ValidationError::field(
                    name,
                    format!("min ({min}) is greater than max ({max})"),
                ));
            }
        }
        FieldKind::Float { min, max } => {
            if !min.is_finite() || !max.is_finite() {
                return Err(ValidationError::field(name, "min and max must be finite"));
            }
            if min > max {
                return Err(ValidationError::field(
                    name,
                    format!("min ({min}) is greater than max ({max})"),
                ));
            }
            if !(max - min).is_finite() {
                return Err(ValidationError::field(
                    name,
                    format!("range {min}..={max} is too wide"),
                ));
            }
        }
        FieldKind::Timestamp { format } => {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ValidationError::field(
                    name,
                    format!("invalid timestamp format '{format}'"),
                ));
            }
        }
        FieldKind::Ip => {}
    }

    Ok(())
}

fn is_scalar(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => false,
        serde_yaml::Value::Tagged(tagged) => is_scalar(&tagged.value),
        _ => true,
    }
}

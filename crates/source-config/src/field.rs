//! Field definitions.
//!
//! Each field in a source produces one value per generated line. The
//! `type` key selects the generator; `repeat` and `change` control how
//! often a new value is generated instead of reusing the previous one.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Generator configuration for a field.
///
/// This enum defines the different kinds of values a field can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Uniform random selection from a list of values
    Enum {
        /// Pool of values to select from
        values: Vec<serde_yaml::Value>,
    },

    /// Weighted random selection
    Chance {
        /// Options with relative weights
        choices: Vec<Choice>,
    },

    /// Random integers in a range
    Integer {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Random floats in a range
    Float {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// The line's timestamp, formatted with a strftime pattern
    Timestamp {
        /// strftime format string, e.g. `%Y-%m-%dT%H:%M:%S`
        format: String,
    },

    /// Random dotted-quad IPv4 address
    Ip,
}

impl FieldKind {
    /// The `type` name used in configuration files.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Enum { .. } => "enum",
            FieldKind::Chance { .. } => "chance",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Float { .. } => "float",
            FieldKind::Timestamp { .. } => "timestamp",
            FieldKind::Ip => "ip",
        }
    }

    /// Keys this kind reads besides `type`.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Enum { .. } => &["values"],
            FieldKind::Chance { .. } => &["choices"],
            FieldKind::Integer { .. } | FieldKind::Float { .. } => &["min", "max"],
            FieldKind::Timestamp { .. } => &["format"],
            FieldKind::Ip => &[],
        }
    }
}

/// One weighted option of a `chance` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub option: serde_yaml::Value,
    pub weight: f64,
}

/// A field of a source: what to generate and how often to regenerate it.
///
/// Unknown keys are rejected, like everywhere else in a source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Reuse the value for this many further lines before regenerating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u64>,

    /// Probability (0.0 to 1.0) of regenerating the value on each line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

impl FieldDefinition {
    /// A field that regenerates on every line.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            repeat: None,
            change: None,
        }
    }

    pub fn with_repeat(mut self, repeat: u64) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn with_change(mut self, change: f64) -> Self {
        self.change = Some(change);
        self
    }
}

impl<'de> Deserialize<'de> for FieldDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Mapping::deserialize(deserializer)?;

        let repeat = take::<u64, D::Error>(&mut map, "repeat")?;
        let change = take::<f64, D::Error>(&mut map, "change")?;

        let kind: FieldKind =
            serde_yaml::from_value(Value::Mapping(map.clone())).map_err(D::Error::custom)?;

        let allowed = kind.keys();
        for key in map.keys() {
            let known = key
                .as_str()
                .is_some_and(|k| k == "type" || allowed.contains(&k));
            if !known {
                return Err(D::Error::custom(format!(
                    "unknown key {} for a field of type `{}`",
                    serde_yaml::to_string(key)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_default(),
                    kind.type_name()
                )));
            }
        }

        Ok(Self {
            kind,
            repeat,
            change,
        })
    }
}

fn take<T, E>(map: &mut Mapping, key: &str) -> Result<Option<T>, E>
where
    T: serde::de::DeserializeOwned,
    E: serde::de::Error,
{
    map.remove(key)
        .map(serde_yaml::from_value)
        .transpose()
        .map_err(|e| E::custom(format!("`{key}`: {e}")))
}

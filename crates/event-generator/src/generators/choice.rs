//! Selection generators: uniform `enum` and weighted `chance`.

use crate::field::FieldError;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_yaml::Value as YamlValue;
use source_config::Choice;

/// Pick one value uniformly.
pub fn generate_enum<R: Rng>(rng: &mut R, values: &[YamlValue]) -> Result<String, FieldError> {
    values
        .choose(rng)
        .map(yaml_to_text)
        .ok_or(FieldError::EmptyPool)
}

/// Pick one option with probability proportional to its weight.
///
/// Weights are relative and do not need to sum to 1.
pub fn generate_chance<R: Rng>(rng: &mut R, choices: &[Choice]) -> Result<String, FieldError> {
    choices
        .choose_weighted(rng, |choice| choice.weight)
        .map(|choice| yaml_to_text(&choice.option))
        .map_err(|e| FieldError::Weights(e.to_string()))
}

/// Render a YAML scalar the way it should appear in a log line.
pub fn yaml_to_text(yaml: &YamlValue) -> String {
    match yaml {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        YamlValue::Tagged(tagged) => yaml_to_text(&tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => serde_yaml::to_string(yaml)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

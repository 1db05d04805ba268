//! Per-field value generation with `repeat` / `change` semantics.

use crate::generators::generate_value;
use chrono::{DateTime, Utc};
use rand::Rng;
use source_config::FieldDefinition;

/// Error type for field value generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// `enum` field with no values
    #[error("No values to choose from")]
    EmptyPool,

    /// `chance` field whose weights can't be sampled
    #[error("Invalid weights: {0}")]
    Weights(String),

    /// `timestamp` field with a format chrono rejects
    #[error("Invalid timestamp format: {0}")]
    TimestampFormat(String),
}

/// Inputs shared by every field of one generated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationContext {
    /// Timestamp allocated to the line
    pub timestamp: DateTime<Utc>,
}

impl GenerationContext {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }
}

/// Mutable generation state of one field.
///
/// Lives as long as the worker that owns the source; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    /// Invocations since the value was last regenerated
    pub count: u64,
    /// Most recently generated value
    pub value: Option<String>,
}

/// Produce the field's value for the next line.
///
/// With `repeat: R`, a cached value is reused while the call count stays
/// within `R`; the call after that regenerates and resets the count. With
/// `change: P`, a cached value is regenerated with probability `P`. When a
/// field has both, only `repeat` applies.
pub fn next_value<R: Rng>(
    state: &mut FieldState,
    field: &FieldDefinition,
    ctx: &GenerationContext,
    rng: &mut R,
) -> Result<String, FieldError> {
    state.count += 1;

    if let Some(cached) = &state.value {
        if let Some(repeat) = field.repeat {
            if state.count <= repeat {
                return Ok(cached.clone());
            }
            state.count = 0;
        } else if let Some(change) = field.change {
            let roll: f64 = rng.random();
            if roll > change {
                return Ok(cached.clone());
            }
            state.count = 0;
        }
    }

    let value = generate_value(&field.kind, ctx, rng)?;
    state.value = Some(value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use source_config::FieldKind;

    fn ctx() -> GenerationContext {
        GenerationContext::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn wide_integer() -> FieldDefinition {
        FieldDefinition::new(FieldKind::Integer {
            min: 0,
            max: i64::MAX,
        })
    }

    #[test]
    fn test_integer_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = FieldDefinition::new(FieldKind::Integer { min: 10, max: 20 });
        let mut state = FieldState::default();

        for _ in 0..10_000 {
            let value: i64 = next_value(&mut state, &field, &ctx(), &mut rng)
                .unwrap()
                .parse()
                .unwrap();
            assert!((10..=20).contains(&value));
        }
    }

    #[test]
    fn test_enum_membership() {
        let mut rng = StdRng::seed_from_u64(42);
        let values: Vec<serde_yaml::Value> = serde_yaml::from_str("[a, b, c]").unwrap();
        let field = FieldDefinition::new(FieldKind::Enum { values });
        let mut state = FieldState::default();

        for _ in 0..1000 {
            let value = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
            assert!(["a", "b", "c"].contains(&value.as_str()));
        }
    }

    #[test]
    fn test_repeat_pattern() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = wide_integer().with_repeat(3);
        let mut state = FieldState::default();

        let mut values = Vec::new();
        let mut counts = Vec::new();
        for _ in 0..5 {
            values.push(next_value(&mut state, &field, &ctx(), &mut rng).unwrap());
            counts.push(state.count);
        }

        assert_eq!(values[0], values[1]);
        assert_eq!(values[1], values[2]);
        assert_eq!(values[3], values[4]);
        // The fourth call regenerated and reset the count
        assert_eq!(counts, vec![1, 2, 3, 0, 1]);
        // Over a range this wide a collision is practically impossible
        assert_ne!(values[2], values[3]);
    }

    #[test]
    fn test_repeat_zero_regenerates_every_call() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = wide_integer().with_repeat(0);
        let mut state = FieldState::default();

        let first = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
        let second = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
        assert_ne!(first, second);
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_change_zero_keeps_first_value() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = wide_integer().with_change(0.0);
        let mut state = FieldState::default();

        let first = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
        for _ in 0..100 {
            assert_eq!(next_value(&mut state, &field, &ctx(), &mut rng).unwrap(), first);
        }
        assert_eq!(state.count, 101);
    }

    #[test]
    fn test_change_one_always_regenerates() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = wide_integer().with_change(1.0);
        let mut state = FieldState::default();

        let mut previous = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
        for _ in 0..100 {
            let value = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
            assert_ne!(value, previous);
            assert_eq!(state.count, 0);
            previous = value;
        }
    }

    #[test]
    fn test_repeat_takes_precedence_over_change() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = wide_integer().with_repeat(2).with_change(1.0);
        let mut state = FieldState::default();

        // change: 1.0 alone would regenerate on the second call
        let first = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
        assert_eq!(next_value(&mut state, &field, &ctx(), &mut rng).unwrap(), first);
        assert_ne!(next_value(&mut state, &field, &ctx(), &mut rng).unwrap(), first);
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_timestamp_uses_context() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = FieldDefinition::new(FieldKind::Timestamp {
            format: "%Y-%m-%dT%H:%M:%S".to_string(),
        });
        let mut state = FieldState::default();

        let value = next_value(&mut state, &field, &ctx(), &mut rng).unwrap();
        assert_eq!(value, "2024-01-01T00:00:00");
        assert_eq!(state.value.as_deref(), Some("2024-01-01T00:00:00"));
    }
}

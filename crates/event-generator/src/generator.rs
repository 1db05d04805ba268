//! Line generator for a single source.

use crate::field::{next_value, FieldError, FieldState, GenerationContext};
use crate::render::{render, RenderError};
use crate::timestamps::allocate_timestamps;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use source_config::SourceConfig;
use std::collections::{BTreeMap, HashMap};

/// Error type for generating a line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// A field failed to produce a value
    #[error("Field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: FieldError,
    },

    /// The template could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Generates the lines of one source.
///
/// Owns the source configuration together with the mutable state of each
/// of its fields, so `repeat` and `change` carry over from one line (and
/// one cycle) to the next. Sources with a `seed` produce the same lines for
/// the same timestamps.
pub struct EventGenerator {
    /// Source being generated
    source: SourceConfig,
    /// Per-field generation state, keyed like `source.fields`
    states: BTreeMap<String, FieldState>,
    /// Random number generator, seeded from the source when it has a seed
    rng: StdRng,
}

impl EventGenerator {
    /// Create a generator for the given source.
    pub fn new(source: SourceConfig) -> Self {
        let rng = match source.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(source, rng)
    }

    /// Create a generator with an explicit seed, ignoring the source's own.
    pub fn with_seed(source: SourceConfig, seed: u64) -> Self {
        Self::with_rng(source, StdRng::seed_from_u64(seed))
    }

    fn with_rng(source: SourceConfig, rng: StdRng) -> Self {
        let states = source
            .fields
            .keys()
            .map(|name| (name.clone(), FieldState::default()))
            .collect();
        Self {
            source,
            states,
            rng,
        }
    }

    /// Get a reference to the source.
    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Current state of a field, if the source defines it.
    pub fn field_state(&self, name: &str) -> Option<&FieldState> {
        self.states.get(name)
    }

    /// Allocate the sorted timestamps of one emission cycle.
    pub fn timestamps(&mut self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        allocate_timestamps(&self.source, now, &mut self.rng)
    }

    /// Generate a value for every field of the source.
    pub fn next_values(
        &mut self,
        timestamp: DateTime<Utc>,
    ) -> Result<HashMap<String, String>, GenerateError> {
        let ctx = GenerationContext::new(timestamp);

        self.source
            .fields
            .iter()
            .map(|(name, field)| {
                let state = self.states.entry(name.clone()).or_default();
                let value = next_value(state, field, &ctx, &mut self.rng).map_err(|source| {
                    GenerateError::Field {
                        field: name.clone(),
                        source,
                    }
                })?;
                Ok((name.clone(), value))
            })
            .collect()
    }

    /// Generate one rendered line for the given timestamp.
    pub fn next_line(&mut self, timestamp: DateTime<Utc>) -> Result<String, GenerateError> {
        let values = self.next_values(timestamp)?;
        Ok(render(&self.source.format, &values)?)
    }

    /// Generate the lines of one emission cycle.
    ///
    /// Returns an iterator that lazily generates one line per allocated
    /// timestamp, in ascending timestamp order.
    pub fn cycle(&mut self, now: DateTime<Utc>) -> CycleLines<'_> {
        let timestamps = self.timestamps(now);
        CycleLines {
            generator: self,
            timestamps: timestamps.into_iter(),
        }
    }
}

/// Iterator that lazily generates the lines of one cycle.
pub struct CycleLines<'a> {
    generator: &'a mut EventGenerator,
    timestamps: std::vec::IntoIter<DateTime<Utc>>,
}

impl Iterator for CycleLines<'_> {
    type Item = (DateTime<Utc>, Result<String, GenerateError>);

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp = self.timestamps.next()?;
        Some((timestamp, self.generator.next_line(timestamp)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.timestamps.size_hint()
    }
}

impl ExactSizeIterator for CycleLines<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_source() -> SourceConfig {
        let yaml = r#"
name: auth
file: /tmp/auth.log
frequency: 1s
jitter: 10s
amount: 4
seed: 42
format: "{ts} user={user} session={session}"
fields:
  ts:
    type: timestamp
    format: "%H:%M:%S"
  user:
    type: enum
    values: [alice, bob, carol]
  session:
    type: integer
    min: 1000
    max: 9999
    repeat: 2
"#;
        SourceConfig::from_yaml(yaml).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 30).unwrap()
    }

    #[test]
    fn test_next_line() {
        let mut generator = EventGenerator::new(test_source());

        let line = generator.next_line(now()).unwrap();
        assert!(line.starts_with("10:00:30 user="), "got {line}");
        assert!(line.contains(" session="));
    }

    #[test]
    fn test_deterministic_generation() {
        let mut gen1 = EventGenerator::new(test_source());
        let mut gen2 = EventGenerator::new(test_source());

        let lines1: Vec<_> = gen1.cycle(now()).collect();
        let lines2: Vec<_> = gen2.cycle(now()).collect();

        assert_eq!(lines1, lines2);
    }

    #[test]
    fn test_cycle_lines_are_sorted() {
        let mut generator = EventGenerator::with_seed(test_source(), 7);

        let lines: Vec<_> = generator.cycle(now()).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.windows(2).all(|w| w[0].0 <= w[1].0));
        for (ts, line) in &lines {
            let line = line.as_ref().unwrap();
            assert!(line.starts_with(&ts.format("%H:%M:%S").to_string()));
        }
    }

    #[test]
    fn test_field_state_carries_across_cycles() {
        let mut generator = EventGenerator::new(test_source());

        let _ = generator.cycle(now()).count();
        let state = generator.field_state("session").unwrap();
        assert!(state.value.is_some());
        // Four calls with repeat 2: generate, reuse, regenerate, reuse
        assert_eq!(state.count, 1);

        let _ = generator.next_line(now()).unwrap();
        assert_eq!(generator.field_state("session").unwrap().count, 2);
    }

    #[test]
    fn test_missing_field_is_render_error() {
        let mut source = test_source();
        source.format = source_config::Template::parse("{user} {unknown}").unwrap();
        let mut generator = EventGenerator::new(source);

        let result = generator.next_line(now());
        assert_eq!(
            result,
            Err(GenerateError::Render(RenderError::MissingField(
                "unknown".to_string()
            )))
        );
    }
}

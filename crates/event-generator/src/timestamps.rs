//! Timestamp allocation for one emission cycle.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use source_config::SourceConfig;

/// Allocate the timestamps for one emission cycle.
///
/// Returns `source.amount` timestamps sorted ascending. Each one is
/// `now - offset` moved back by a uniform whole number of seconds in
/// `[0, jitter]`. Jitter never moves a timestamp forward.
pub fn allocate_timestamps<R: Rng>(
    source: &SourceConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DateTime<Utc>> {
    let base = shift_back(now, TimeDelta::from_std(source.offset).unwrap_or(TimeDelta::MAX));
    let max_jitter = source.jitter.as_secs();

    let mut timestamps: Vec<DateTime<Utc>> = (0..source.amount)
        .map(|_| {
            let secs = rng.random_range(0..=max_jitter);
            shift_back(base, seconds(secs))
        })
        .collect();

    timestamps.sort();
    timestamps
}

fn seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

/// Subtract `delta`, clamping at the earliest representable time.
fn shift_back(ts: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    ts.checked_sub_signed(delta)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn source(amount: u32, offset: Duration, jitter: Duration) -> SourceConfig {
        let yaml = format!(
            r#"
name: ts
file: /tmp/ts.log
frequency: 1s
offset: {}
jitter: {}
amount: {amount}
format: "x"
fields: {{}}
"#,
            offset.as_secs(),
            jitter.as_secs()
        );
        SourceConfig::from_yaml(&yaml).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_jitter_no_offset() {
        let mut rng = StdRng::seed_from_u64(42);
        let source = source(5, Duration::ZERO, Duration::ZERO);

        let timestamps = allocate_timestamps(&source, now(), &mut rng);
        assert_eq!(timestamps, vec![now(); 5]);
    }

    #[test]
    fn test_offset_only() {
        let mut rng = StdRng::seed_from_u64(42);
        let source = source(3, Duration::from_secs(3600), Duration::ZERO);

        let timestamps = allocate_timestamps(&source, now(), &mut rng);
        let expected = now() - TimeDelta::hours(1);
        assert_eq!(timestamps, vec![expected; 3]);
    }

    #[test]
    fn test_jitter_bounds_and_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let offset = Duration::from_secs(60);
        let jitter = Duration::from_secs(30);

        for amount in [0, 1, 7, 100] {
            let source = source(amount, offset, jitter);
            let timestamps = allocate_timestamps(&source, now(), &mut rng);

            assert_eq!(timestamps.len(), amount as usize);
            let latest = now() - TimeDelta::seconds(60);
            let earliest = latest - TimeDelta::seconds(30);
            for ts in &timestamps {
                assert!(*ts <= latest && *ts >= earliest);
            }
            assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_jitter_spreads_values() {
        let mut rng = StdRng::seed_from_u64(42);
        let source = source(100, Duration::ZERO, Duration::from_secs(3600));

        let timestamps = allocate_timestamps(&source, now(), &mut rng);
        assert!(timestamps.first() < timestamps.last());
    }
}

use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
/// Produces human-like pauses between scroll steps and page actions.
pub struct BehavioralEngine {}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Pick a duration between `min` and `max` milliseconds (inclusive).
    ///
    /// Reversed bounds are swapped; equal bounds give exactly that duration.
    pub fn pick_delay(&self, min: u64, max: u64) -> Duration {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return Duration::from_millis(lo);
        }
        let mut rng = OsRng;
        Duration::from_millis(rng.gen_range(lo..=hi))
    }
}

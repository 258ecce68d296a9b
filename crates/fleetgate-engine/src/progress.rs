//! Per-(check, instance) progress bookkeeping.

use std::time::Duration;
use tokio::time::Instant;

/// Accumulated timers and change-detection state for one instance as
/// seen by one check.
///
/// Created lazily on the first observation, owned exclusively by the
/// check that created it, and discarded when the instance resolves.
///
/// The state window accumulates from explicit observation deltas: each
/// [`tick`](Self::tick) adds the time since the previous tick when the
/// tracked fingerprint is unchanged, and resets the window to zero when
/// it changes. Total elapsed time is pure wall clock from the first
/// observation and never resets.
#[derive(Debug)]
pub struct Progress {
    started_at: Instant,
    last_tick: Instant,
    state_accum: Duration,
    last_fingerprint: Option<u64>,
}

impl Progress {
    /// Start tracking at the time of the first observation.
    pub fn begin(now: Instant) -> Self {
        Self {
            started_at: now,
            last_tick: now,
            state_accum: Duration::ZERO,
            last_fingerprint: None,
        }
    }

    /// Record an observation of the tracked condition.
    ///
    /// Returns `true` if the fingerprint changed (the state window was
    /// reset). The very first tick always counts as a change.
    pub fn tick(&mut self, now: Instant, fingerprint: u64) -> bool {
        let delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        if self.last_fingerprint == Some(fingerprint) {
            self.state_accum += delta;
            false
        } else {
            self.state_accum = Duration::ZERO;
            self.last_fingerprint = Some(fingerprint);
            true
        }
    }

    /// Accumulated time the tracked condition has held unchanged.
    pub fn state_elapsed(&self) -> Duration {
        self.state_accum
    }

    /// Wall-clock time since tracking began. Monotonically
    /// non-decreasing across iterations of a run.
    pub fn total_elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Last observed fingerprint, if any.
    pub fn last_fingerprint(&self) -> Option<u64> {
        self.last_fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn first_tick_counts_as_change() {
        let base = Instant::now();
        let mut progress = Progress::begin(base);
        assert!(progress.tick(base, 7));
        assert_eq!(progress.state_elapsed(), Duration::ZERO);
        assert_eq!(progress.last_fingerprint(), Some(7));
    }

    #[test]
    fn unchanged_fingerprint_accumulates() {
        let base = Instant::now();
        let mut progress = Progress::begin(base);
        progress.tick(base, 7);
        assert!(!progress.tick(base + secs(1), 7));
        assert!(!progress.tick(base + secs(2), 7));
        assert_eq!(progress.state_elapsed(), secs(2));
    }

    #[test]
    fn changed_fingerprint_resets_window() {
        let base = Instant::now();
        let mut progress = Progress::begin(base);
        progress.tick(base, 7);
        progress.tick(base + secs(1), 7);
        assert_eq!(progress.state_elapsed(), secs(1));

        assert!(progress.tick(base + secs(2), 8));
        assert_eq!(progress.state_elapsed(), Duration::ZERO);
        assert_eq!(progress.last_fingerprint(), Some(8));

        progress.tick(base + secs(3), 8);
        assert_eq!(progress.state_elapsed(), secs(1));
    }

    #[test]
    fn total_elapsed_never_resets() {
        let base = Instant::now();
        let mut progress = Progress::begin(base);
        progress.tick(base, 7);
        progress.tick(base + secs(5), 8);
        progress.tick(base + secs(10), 9);
        assert_eq!(progress.state_elapsed(), Duration::ZERO);
        assert_eq!(progress.total_elapsed(base + secs(10)), secs(10));
    }
}

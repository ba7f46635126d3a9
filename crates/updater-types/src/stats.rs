use std::fmt;
use std::time::Duration;

/// Counters for one sweep session.
///
/// A fresh value is created per device sweep; nothing here is persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Records delivered to every replica and removed.
    pub successes: u64,
    /// Records left on disk because at least one replica refused.
    pub failures: u64,
    /// Wall-clock time spent in the sweep.
    pub elapsed: Duration,
}

impl SweepStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Add another session's counters into this one. Elapsed time is not
    /// summed; the caller measures its own wall clock.
    pub fn absorb(&mut self, other: &SweepStats) {
        self.successes += other.successes;
        self.failures += other.failures;
    }
}

impl fmt::Display for SweepStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.02}s, {} successes, {} failures",
            self.elapsed.as_secs_f64(),
            self.successes,
            self.failures
        )
    }
}

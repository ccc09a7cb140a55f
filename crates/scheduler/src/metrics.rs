use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking reminder pass outcomes.
///
/// Counters use relaxed ordering. For a consistent point-in-time view, call
/// [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct SchedulerMetrics {
    /// Passes started, including aborted ones.
    pub passes: AtomicU64,
    /// Documents evaluated across all passes.
    pub evaluated: AtomicU64,
    pub skipped_not_due: AtomicU64,
    /// Due documents that already had a sent reminder for the day.
    pub skipped_already_sent: AtomicU64,
    pub sent: AtomicU64,
    /// Due documents left unsent: no destination, delivery failure, or a
    /// store error mid-evaluation.
    pub failed: AtomicU64,
    /// Passes that ended early because candidates could not be loaded.
    pub aborted: AtomicU64,
    /// Sends that went out by email instead of the preferred channel.
    pub fallbacks: AtomicU64,
    pub test_sends: AtomicU64,
}

impl SchedulerMetrics {
    pub fn increment_passes(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evaluated(&self) {
        self.evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_skipped_not_due(&self) {
        self.skipped_not_due.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_skipped_already_sent(&self) {
        self.skipped_already_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aborted(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fallbacks(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_test_sends(&self) {
        self.test_sends.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            evaluated: self.evaluated.load(Ordering::Relaxed),
            skipped_not_due: self.skipped_not_due.load(Ordering::Relaxed),
            skipped_already_sent: self.skipped_already_sent.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            test_sends: self.test_sends.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`SchedulerMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub passes: u64,
    pub evaluated: u64,
    pub skipped_not_due: u64,
    pub skipped_already_sent: u64,
    pub sent: u64,
    pub failed: u64,
    pub aborted: u64,
    pub fallbacks: u64,
    pub test_sends: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zero() {
        assert_eq!(SchedulerMetrics::default().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn increment_and_snapshot() {
        let m = SchedulerMetrics::default();
        m.increment_passes();
        m.increment_evaluated();
        m.increment_evaluated();
        m.increment_sent();
        m.increment_fallbacks();

        let snap = m.snapshot();
        assert_eq!(snap.passes, 1);
        assert_eq!(snap.evaluated, 2);
        assert_eq!(snap.sent, 1);
        assert_eq!(snap.fallbacks, 1);
        assert_eq!(snap.failed, 0);
    }
}

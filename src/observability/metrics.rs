//! Operational counters.
//!
//! Counters only, monotonic, reset on process start. Atomic with relaxed
//! ordering; metrics reads tolerate being a moment stale.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// All counters the scoring service maintains.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    matches_created: AtomicU64,
    balls_scored: AtomicU64,
    balls_rejected: AtomicU64,
    undos_applied: AtomicU64,
    undos_rejected: AtomicU64,
    replay_runs: AtomicU64,
    replay_entries_skipped: AtomicU64,
    snapshots_built: AtomicU64,
    broadcasts_full: AtomicU64,
    broadcasts_delta: AtomicU64,
    broadcast_failures: AtomicU64,
    store_conflicts: AtomicU64,
    interruptions_recorded: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_matches_created(&self) {
        self.matches_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_balls_scored(&self) {
        self.balls_scored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_balls_rejected(&self) {
        self.balls_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_undos_applied(&self) {
        self.undos_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_undos_rejected(&self) {
        self.undos_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_replay_runs(&self) {
        self.replay_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Replays report skips in bulk, one call per run.
    pub fn add_replay_entries_skipped(&self, count: u64) {
        self.replay_entries_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_snapshots_built(&self) {
        self.snapshots_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_broadcasts_full(&self) {
        self.broadcasts_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_broadcasts_delta(&self) {
        self.broadcasts_delta.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_broadcast_failures(&self) {
        self.broadcast_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_conflicts(&self) {
        self.store_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_interruptions_recorded(&self) {
        self.interruptions_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            matches_created: self.matches_created.load(Ordering::Relaxed),
            balls_scored: self.balls_scored.load(Ordering::Relaxed),
            balls_rejected: self.balls_rejected.load(Ordering::Relaxed),
            undos_applied: self.undos_applied.load(Ordering::Relaxed),
            undos_rejected: self.undos_rejected.load(Ordering::Relaxed),
            replay_runs: self.replay_runs.load(Ordering::Relaxed),
            replay_entries_skipped: self.replay_entries_skipped.load(Ordering::Relaxed),
            snapshots_built: self.snapshots_built.load(Ordering::Relaxed),
            broadcasts_full: self.broadcasts_full.load(Ordering::Relaxed),
            broadcasts_delta: self.broadcasts_delta.load(Ordering::Relaxed),
            broadcast_failures: self.broadcast_failures.load(Ordering::Relaxed),
            store_conflicts: self.store_conflicts.load(Ordering::Relaxed),
            interruptions_recorded: self.interruptions_recorded.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        // Snapshot fields are flat u64s; serialization cannot fail.
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub matches_created: u64,
    pub balls_scored: u64,
    pub balls_rejected: u64,
    pub undos_applied: u64,
    pub undos_rejected: u64,
    pub replay_runs: u64,
    pub replay_entries_skipped: u64,
    pub snapshots_built: u64,
    pub broadcasts_full: u64,
    pub broadcasts_delta: u64,
    pub broadcast_failures: u64,
    pub store_conflicts: u64,
    pub interruptions_recorded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zeroed() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.balls_scored, 0);
        assert_eq!(snapshot.broadcasts_full, 0);
        assert_eq!(snapshot.replay_entries_skipped, 0);
    }

    #[test]
    fn test_increments_land() {
        let registry = MetricsRegistry::new();
        registry.increment_matches_created();
        registry.increment_balls_scored();
        registry.increment_balls_scored();
        registry.increment_balls_rejected();
        registry.increment_undos_applied();
        registry.increment_replay_runs();
        registry.add_replay_entries_skipped(3);
        registry.increment_broadcasts_full();
        registry.increment_broadcasts_delta();
        registry.increment_broadcast_failures();
        registry.increment_store_conflicts();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.matches_created, 1);
        assert_eq!(snapshot.balls_scored, 2);
        assert_eq!(snapshot.balls_rejected, 1);
        assert_eq!(snapshot.undos_applied, 1);
        assert_eq!(snapshot.replay_runs, 1);
        assert_eq!(snapshot.replay_entries_skipped, 3);
        assert_eq!(snapshot.broadcasts_full, 1);
        assert_eq!(snapshot.broadcasts_delta, 1);
        assert_eq!(snapshot.broadcast_failures, 1);
        assert_eq!(snapshot.store_conflicts, 1);
    }

    #[test]
    fn test_to_json_round_trips() {
        let registry = MetricsRegistry::new();
        registry.increment_balls_scored();
        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["balls_scored"], 1);
        assert_eq!(parsed["undos_applied"], 0);
    }

    #[test]
    fn test_concurrent_increments() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];
        for _ in 0..8 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    reg.increment_balls_scored();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().balls_scored, 2000);
    }
}

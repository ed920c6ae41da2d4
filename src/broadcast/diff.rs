//! Top-level snapshot comparison.

use serde_json::{Map, Value};

/// Keys that differ between two serialized snapshots.
///
/// Comparison is at the top level only: a one-run change inside `score`
/// marks the whole `score` key changed. That granularity is the wire
/// contract; the view keeps independently-changing facts in separate
/// top-level keys for exactly this reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDiff {
    /// Changed keys with their new values. A key that disappeared maps to
    /// `null` so subscribers know to clear it.
    pub changed: Map<String, Value>,
    /// Size of the key universe compared (union of both sides).
    pub tracked_keys: usize,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Fraction of tracked keys that changed, in [0, 1].
    pub fn change_ratio(&self) -> f64 {
        if self.tracked_keys == 0 {
            return 0.0;
        }
        self.changed.len() as f64 / self.tracked_keys as f64
    }
}

/// Diff two serialized snapshots. Both values are objects by construction
/// (the view serializes to one); non-object input compares as one opaque
/// changed key.
pub fn diff_snapshots(prev: &Value, next: &Value) -> SnapshotDiff {
    let (Value::Object(prev_map), Value::Object(next_map)) = (prev, next) else {
        let mut changed = Map::new();
        if prev != next {
            changed.insert("state".to_string(), next.clone());
        }
        return SnapshotDiff {
            changed,
            tracked_keys: 1,
        };
    };

    let mut changed = Map::new();
    let mut tracked = 0usize;

    for (key, next_value) in next_map {
        tracked += 1;
        if prev_map.get(key) != Some(next_value) {
            changed.insert(key.clone(), next_value.clone());
        }
    }
    for key in prev_map.keys() {
        if !next_map.contains_key(key) {
            tracked += 1;
            changed.insert(key.clone(), Value::Null);
        }
    }

    SnapshotDiff {
        changed,
        tracked_keys: tracked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_objects_diff_empty() {
        let a = json!({"score": {"runs": 10}, "status": "live"});
        let diff = diff_snapshots(&a, &a.clone());
        assert!(diff.is_empty());
        assert_eq!(diff.tracked_keys, 2);
        assert_eq!(diff.change_ratio(), 0.0);
    }

    #[test]
    fn test_changed_key_carries_new_value() {
        let prev = json!({"score": {"runs": 10}, "status": "live", "striker": "h1"});
        let next = json!({"score": {"runs": 14}, "status": "live", "striker": "h1"});
        let diff = diff_snapshots(&prev, &next);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed["score"], json!({"runs": 14}));
        assert!((diff.change_ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_removed_key_maps_to_null() {
        // An optional field that stopped serializing (e.g. a result cleared
        // by an undo) must tell subscribers to drop it.
        let prev = json!({"status": "completed", "result": {"kind": "tie"}});
        let next = json!({"status": "live"});
        let diff = diff_snapshots(&prev, &next);
        assert_eq!(diff.changed["result"], Value::Null);
        assert_eq!(diff.changed["status"], json!("live"));
        assert_eq!(diff.tracked_keys, 2);
    }

    #[test]
    fn test_added_key_counts_as_change() {
        let prev = json!({"status": "live"});
        let next = json!({"status": "live", "target": 188});
        let diff = diff_snapshots(&prev, &next);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed["target"], json!(188));
    }

    #[test]
    fn test_non_object_fallback() {
        let diff = diff_snapshots(&json!(1), &json!(2));
        assert_eq!(diff.tracked_keys, 1);
        assert_eq!(diff.changed["state"], json!(2));
    }
}

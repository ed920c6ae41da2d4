//! Delta-aware snapshot publisher.
//!
//! Keeps the last payload sent per (game, channel) pair and ships either a
//! full snapshot or just the changed top-level keys. Publishing is fire and
//! forget: a transport failure is counted and the scoring path moves on.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::diff::diff_snapshots;
use super::Transport;
use crate::observability::MetricsRegistry;
use crate::snapshot::SnapshotView;

/// Knobs for the full-versus-delta decision.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastPolicy {
    /// When more than this fraction of top-level keys changed, send a full
    /// snapshot instead of a delta.
    pub full_refresh_ratio: f64,
}

impl Default for BroadcastPolicy {
    fn default() -> Self {
        Self {
            full_refresh_ratio: 0.5,
        }
    }
}

impl BroadcastPolicy {
    pub fn new(full_refresh_ratio: f64) -> Self {
        Self {
            full_refresh_ratio: full_refresh_ratio.clamp(0.0, 1.0),
        }
    }
}

/// Shape of an outgoing payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitKind {
    Full,
    Delta,
}

impl EmitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitKind::Full => "full",
            EmitKind::Delta => "delta",
        }
    }
}

/// What one emission did.
#[derive(Debug, Clone, Copy)]
pub struct EmitReport {
    /// Shape that went out (or would have)
    pub kind: EmitKind,
    /// Per-channel sequence number of this emission
    pub seq: u64,
    /// Top-level keys carried by a delta; full snapshots report the whole
    /// key count
    pub changed_keys: usize,
    /// Whether the transport accepted the payload
    pub delivered: bool,
}

/// Last payload state for one (game, channel) pair
#[derive(Debug, Default)]
struct ChannelSlot {
    /// Serialized snapshot most recently accepted by the transport
    last_sent: Option<Value>,
    /// Monotonic emission counter, gaps reveal lost payloads
    seq: u64,
}

/// Publishes snapshots through a [`Transport`], downgrading to deltas when
/// little changed.
pub struct DeltaBroadcaster {
    transport: Arc<dyn Transport>,
    policy: BroadcastPolicy,
    metrics: Arc<MetricsRegistry>,
    slots: RwLock<HashMap<(Uuid, String), Arc<Mutex<ChannelSlot>>>>,
}

impl DeltaBroadcaster {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: BroadcastPolicy,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            transport,
            policy,
            metrics,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Conventional channel name for a game's live feed
    pub fn channel_for(game_id: Uuid) -> String {
        format!("match:{game_id}")
    }

    /// Publish the view on the game's channel.
    ///
    /// The first emission for a (game, channel) pair is always a full
    /// snapshot. Later emissions diff against the last payload the
    /// transport accepted; when the changed fraction stays at or below the
    /// policy ratio only the changed keys are sent. This never fails: a
    /// transport error is counted, the cached payload is left alone so the
    /// next emission re-carries the missed changes, and the report says
    /// `delivered: false`.
    pub fn emit(&self, game_id: Uuid, channel: &str, view: &SnapshotView) -> EmitReport {
        let current = match serde_json::to_value(view) {
            Ok(value) => value,
            Err(_) => {
                self.metrics.increment_broadcast_failures();
                return EmitReport {
                    kind: EmitKind::Full,
                    seq: 0,
                    changed_keys: 0,
                    delivered: false,
                };
            }
        };

        let slot = self.slot(game_id, channel);
        let mut slot = match slot.lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.metrics.increment_broadcast_failures();
                return EmitReport {
                    kind: EmitKind::Full,
                    seq: 0,
                    changed_keys: 0,
                    delivered: false,
                };
            }
        };

        slot.seq += 1;
        let seq = slot.seq;

        let (kind, body, changed_keys) = match &slot.last_sent {
            None => {
                let keys = top_level_keys(&current);
                (EmitKind::Full, current.clone(), keys)
            }
            Some(previous) => {
                let diff = diff_snapshots(previous, &current);
                if diff.change_ratio() > self.policy.full_refresh_ratio {
                    let keys = top_level_keys(&current);
                    (EmitKind::Full, current.clone(), keys)
                } else {
                    let keys = diff.changed.len();
                    (EmitKind::Delta, Value::Object(diff.changed), keys)
                }
            }
        };

        let payload = json!({
            "type": kind.as_str(),
            "game_id": game_id.to_string(),
            "channel": channel,
            "seq": seq,
            "emitted_at": Utc::now().to_rfc3339(),
            "state": body,
        });

        let delivered = self.transport.publish(channel, &payload).is_ok();
        if delivered {
            slot.last_sent = Some(current);
            match kind {
                EmitKind::Full => self.metrics.increment_broadcasts_full(),
                EmitKind::Delta => self.metrics.increment_broadcasts_delta(),
            }
        } else {
            self.metrics.increment_broadcast_failures();
        }

        EmitReport {
            kind,
            seq,
            changed_keys,
            delivered,
        }
    }

    /// Forget the cached payload so the next emission is a full snapshot
    pub fn reset(&self, game_id: Uuid, channel: &str) {
        if let Ok(mut slots) = self.slots.write() {
            slots.remove(&(game_id, channel.to_string()));
        }
    }

    /// Drop every cached slot for a game, whatever channels it was
    /// published on. Called when a game is removed so the cache does not
    /// outlive it.
    pub fn clear_game(&self, game_id: Uuid) {
        if let Ok(mut slots) = self.slots.write() {
            slots.retain(|(id, _), _| *id != game_id);
        }
    }

    fn slot(&self, game_id: Uuid, channel: &str) -> Arc<Mutex<ChannelSlot>> {
        let key = (game_id, channel.to_string());

        if let Ok(slots) = self.slots.read() {
            if let Some(slot) = slots.get(&key) {
                return Arc::clone(slot);
            }
        }

        match self.slots.write() {
            Ok(mut slots) => Arc::clone(slots.entry(key).or_default()),
            Err(_) => Arc::new(Mutex::new(ChannelSlot::default())),
        }
    }
}

impl std::fmt::Debug for DeltaBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaBroadcaster")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn top_level_keys(value: &Value) -> usize {
    value.as_object().map(|map| map.len()).unwrap_or(1)
}

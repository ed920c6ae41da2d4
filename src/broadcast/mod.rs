//! Live score fan-out.
//!
//! A [`DeltaBroadcaster`] turns snapshot views into wire payloads and hands
//! them to a [`Transport`]. The in-process [`ChannelHub`] is the default
//! transport; anything that can push JSON at subscribers can stand in.

pub mod broadcaster;
pub mod diff;
pub mod errors;
pub mod hub;

use serde_json::Value;

pub use broadcaster::{BroadcastPolicy, DeltaBroadcaster, EmitKind, EmitReport};
pub use diff::{diff_snapshots, SnapshotDiff};
pub use errors::{BroadcastError, BroadcastResult};
pub use hub::{ChannelHub, PayloadReceiver, PayloadSender};

/// Delivery seam between the broadcaster and the outside world.
///
/// Implementations must not block on slow consumers; the scoring path
/// calls this synchronously.
pub trait Transport: Send + Sync {
    /// Push one payload at every subscriber of the channel
    fn publish(&self, channel: &str, payload: &Value) -> BroadcastResult<()>;
}

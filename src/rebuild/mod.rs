//! Ledger replay: rebuilding derived state from delivery records.
//!
//! Two passes over the same deduplicated innings view. Pass one
//! ([`scorecards::rebuild_scorecards`]) reconstructs the per-player cards
//! and checks the team pointers against the evidence. Pass two
//! ([`runtime::recompute_runtime`]) re-derives totals, over pointers,
//! crease orientation and completion. Each pass is idempotent, so the pair
//! can run after every undo, import, or crash recovery without ceremony.
//!
//! This path intentionally does not call the per-ball engine: it aggregates
//! straight off the records. The engine fold and this rebuild arriving at
//! the same state from the same ledger is a property the test suite holds
//! the two implementations to, not something one of them inherits from the
//! other by construction.

pub mod runtime;
pub mod scorecards;

use crate::ledger::{Delivery, DeliveryLog};
use crate::state::MatchState;

pub use runtime::recompute_runtime;
pub use scorecards::rebuild_scorecards;

/// What a replay pass saw and did. Replay never fails; problems are
/// counted, skipped, and surfaced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Deduplicated records inspected for the innings.
    pub entries_seen: usize,
    /// Records actually folded into the result.
    pub entries_applied: usize,
    /// Structurally malformed records skipped.
    pub entries_skipped: usize,
    /// Raw records dropped because a later legal record took their slot.
    pub corrections_superseded: usize,
    /// Applied records carrying no innings tag (pre-tag exports).
    pub legacy_untagged: usize,
    /// Whether the team pointers had to be swapped to match the evidence.
    pub teams_swapped: bool,
}

/// Run both passes. The returned stats are the per-pass numbers (identical
/// between passes by construction) plus the team-swap flag from pass one.
pub fn rebuild_and_recompute(state: &mut MatchState, ledger: &DeliveryLog) -> RebuildStats {
    let pass_one = rebuild_scorecards(state, ledger);
    let mut stats = recompute_runtime(state, ledger);
    stats.teams_swapped = pass_one.teams_swapped;
    stats
}

/// The records both passes work from: one innings, deduplicated, with
/// malformed entries filtered out and counted.
pub(crate) struct InningsView<'a> {
    pub deliveries: Vec<&'a Delivery>,
    pub stats: RebuildStats,
}

pub(crate) fn innings_view(ledger: &DeliveryLog, innings: u32) -> InningsView<'_> {
    let raw_count = ledger.for_innings(innings).len();
    let deduped = ledger.deduplicated_for_innings(innings);
    let mut stats = RebuildStats {
        entries_seen: deduped.len(),
        corrections_superseded: raw_count - deduped.len(),
        ..RebuildStats::default()
    };
    let mut deliveries = Vec::with_capacity(deduped.len());
    for d in deduped {
        if !d.is_well_formed() {
            stats.entries_skipped += 1;
            continue;
        }
        if d.innings.is_none() {
            stats.legacy_untagged += 1;
        }
        deliveries.push(d);
    }
    stats.entries_applied = deliveries.len();
    InningsView { deliveries, stats }
}

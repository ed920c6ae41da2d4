//! Validated inputs to the scoring function.
//!
//! A `BallInput` is already normalized (canonical extras, resolved player
//! ids); validation lives with the match service, not here. That is what
//! keeps the scoring function total.

use crate::ledger::{Delivery, Dismissal, Extra};

/// One ball, as handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BallInput {
    pub striker_id: String,
    pub non_striker_id: String,
    pub bowler_id: String,
    /// Runs as the scorer counts them: off the bat for fair balls and
    /// no-balls, total extras for wides, byes and leg-byes.
    pub runs: u32,
    pub extra: Extra,
    pub wicket: Option<WicketInput>,
}

/// A claimed dismissal on the ball. The engine may still downgrade it if
/// the extra type makes it impossible.
#[derive(Debug, Clone, PartialEq)]
pub struct WicketInput {
    pub dismissal: Dismissal,
    /// Defaults to the striker when absent (run-outs can take either end).
    pub dismissed_id: Option<String>,
    pub fielder_id: Option<String>,
}

impl BallInput {
    /// Reconstruct the input that produced a ledger record.
    ///
    /// Records store post-attribution values, so the mapping runs the
    /// attribution rules backwards; attribution is idempotent over this
    /// round trip, which is what replaying a ledger through the engine
    /// relies on.
    pub fn from_delivery(d: &Delivery) -> Self {
        let runs = match d.extra {
            Extra::None | Extra::NoBall => d.runs_off_bat,
            Extra::Wide | Extra::Bye | Extra::LegBye => d.extra_runs,
        };
        let wicket = match (d.is_wicket, d.dismissal) {
            (true, Some(dismissal)) => Some(WicketInput {
                dismissal,
                dismissed_id: d.dismissed_id.clone(),
                fielder_id: d.fielder_id.clone(),
            }),
            _ => None,
        };
        Self {
            striker_id: d.striker_id.clone(),
            non_striker_id: d.non_striker_id.clone(),
            bowler_id: d.bowler_id.clone(),
            runs,
            extra: d.extra,
            wicket,
        }
    }
}

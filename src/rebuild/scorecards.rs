//! Replay pass one: scorecards from the ledger.

use std::collections::BTreeMap;

use crate::ledger::{DeliveryLog, Extra};
use crate::state::MatchState;

use super::{innings_view, RebuildStats};

/// Rebuild the batting and bowling cards for the live innings from the
/// ledger, discarding whatever the state held before.
///
/// Before rebuilding, the team pointers are checked against the evidence:
/// if the first recorded striker sits on the sheet currently marked as
/// bowling (and not on the batting one), the pointers are swapped. The
/// ledger outranks the cached orientation.
pub fn rebuild_scorecards(state: &mut MatchState, ledger: &DeliveryLog) -> RebuildStats {
    let view = innings_view(ledger, state.innings);
    let mut stats = view.stats;

    if let Some(first) = view.deliveries.first() {
        let on_bowling = state.bowling_team.contains(&first.striker_id);
        let on_batting = state.batting_team.contains(&first.striker_id);
        if on_bowling && !on_batting {
            std::mem::swap(&mut state.batting_team, &mut state.bowling_team);
            stats.teams_swapped = true;
        }
    }

    state.batting_card = BTreeMap::new();
    state.batting_order = Vec::new();
    state.bowling_card = BTreeMap::new();
    state.bowling_order = Vec::new();

    for d in &view.deliveries {
        state
            .batting_entry_mut(&d.striker_id)
            .credit(d.runs_off_bat, d.is_legal());
        state.batting_entry_mut(&d.non_striker_id);

        let bowler = state.bowling_entry_mut(&d.bowler_id);
        if d.is_legal() {
            bowler.balls_bowled += 1;
        }
        bowler.runs_conceded += d.runs_off_bat
            + match d.extra {
                Extra::Wide | Extra::NoBall => d.extra_runs,
                _ => 0,
            };

        if let Some(dismissal) = d.effective_dismissal() {
            let dismissed = d
                .dismissed_id
                .clone()
                .unwrap_or_else(|| d.striker_id.clone());
            let credit = dismissal.credits_bowler();
            state.batting_entry_mut(&dismissed).mark_out(
                dismissal,
                credit.then(|| d.bowler_id.clone()),
                d.fielder_id.clone(),
            );
            if credit {
                state.bowling_entry_mut(&d.bowler_id).wickets += 1;
            }
        }
    }

    stats
}

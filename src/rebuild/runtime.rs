//! Replay pass two: totals, pointers, crease, and completion.

use crate::engine::{evaluate_completion, running_runs};
use crate::state::{ExtrasTally, FallOfWicket, MatchState};

use crate::ledger::DeliveryLog;

use super::{innings_view, RebuildStats};

/// Re-derive the live innings' runtime fields from the ledger.
///
/// Everything scoring-derived is zeroed and recomputed: totals, extras,
/// over pointers, fall of wickets, crease orientation, prompts, and the
/// match result. Administrative fields (teams, rules, target, archives,
/// interruptions) pass through untouched. A bowler preselected for an over
/// that has no balls in the ledger yet survives, unless keeping him would
/// break the consecutive-over rule.
pub fn recompute_runtime(state: &mut MatchState, ledger: &DeliveryLog) -> RebuildStats {
    let view = innings_view(ledger, state.innings);
    let preselected_bowler = state.current_bowler.take();

    state.total_runs = 0;
    state.total_wickets = 0;
    state.extras = ExtrasTally::default();
    state.fall_of_wickets = Vec::new();
    state.last_over_bowler = None;
    state.pending_new_batter = false;
    state.pending_new_over = false;
    state.pending_new_innings = false;
    state.result = None;

    let bpo = state.rules.balls_per_over.max(1);
    let mut legal_balls: u32 = 0;

    for d in &view.deliveries {
        let legal = d.is_legal();
        state.total_runs += d.team_runs();
        state.extras.add(d.extra, d.extra_runs);

        if let Some(dismissal) = d.effective_dismissal() {
            state.total_wickets += 1;
            let dismissed = d
                .dismissed_id
                .clone()
                .unwrap_or_else(|| d.striker_id.clone());
            // Scorebook position of the fall: the ball itself if legal, the
            // current count if not.
            let ball = if legal {
                legal_balls % bpo + 1
            } else {
                legal_balls % bpo
            };
            state.fall_of_wickets.push(FallOfWicket {
                wicket: state.total_wickets,
                score: state.total_runs,
                over: legal_balls / bpo,
                ball,
                batter_id: dismissed,
                dismissal: Some(dismissal),
            });
        }

        if legal {
            legal_balls += 1;
            if legal_balls % bpo == 0 {
                state.last_over_bowler = Some(d.bowler_id.clone());
            }
        }
    }

    state.overs_completed = legal_balls / bpo;
    state.balls_this_over = legal_balls % bpo;

    // Crease orientation falls out of the final record: the pair it stored
    // is the pair that faced it, and only that ball's own rotation (plus an
    // end-of-over flip) separates it from now.
    if let Some(last) = view.deliveries.last() {
        let closed_the_over = last.is_legal() && state.balls_this_over == 0;
        let mut swap = running_runs(last.extra, last.runs_off_bat, last.extra_runs) % 2 == 1;
        if closed_the_over {
            swap = !swap;
        }
        let (mut striker, mut non_striker) =
            (last.striker_id.clone(), last.non_striker_id.clone());
        if swap {
            std::mem::swap(&mut striker, &mut non_striker);
        }
        state.striker = Some(striker);
        state.non_striker = Some(non_striker);
        state.pending_new_batter = last.effective_dismissal().is_some();
    }
    // With no records for the innings the crease is administrative (the
    // openers were chosen, not scored); leave it alone.

    if state.balls_this_over > 0 {
        state.current_bowler = view
            .deliveries
            .iter()
            .rev()
            .find(|d| d.is_legal())
            .map(|d| d.bowler_id.clone());
        state.pending_new_over = false;
    } else if legal_balls > 0 {
        state.current_bowler =
            preselected_bowler.filter(|b| Some(b) != state.last_over_bowler.as_ref());
        state.pending_new_over = state.current_bowler.is_none();
    } else {
        state.current_bowler = preselected_bowler;
        state.pending_new_over = false;
    }

    evaluate_completion(state);
    view.stats
}

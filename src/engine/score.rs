//! The pure scoring transition.
//!
//! `score_one` is a total function from (input, state) to (record, state).
//! It never fails and never looks anywhere but its arguments, which is what
//! makes a ledger replay through it reproducible to the last field.

use chrono::Utc;

use crate::ledger::{Delivery, Extra};
use crate::state::{FallOfWicket, MatchResult, MatchState};

use super::input::{BallInput, WicketInput};

/// Fixed penalty a no-ball adds to the batting side.
pub const NO_BALL_PENALTY: u32 = 1;

/// Result of scoring one ball: the ledger record to append and the state
/// after the ball.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub delivery: Delivery,
    pub state: MatchState,
}

/// Score a single delivery against `state`.
///
/// Rule order matters and is fixed: attribution, dismissal downgrade, cards,
/// totals, wicket, over progression, strike rotation, completion. Callers
/// are expected to have validated the input against the state; the engine
/// applies rules, it does not referee requests.
pub fn score_one(input: &BallInput, state: &MatchState) -> ScoreOutcome {
    let mut next = state.clone();
    let legal = input.extra.is_legal();

    // Bowling this ball consumes any prompts left by the previous one.
    next.pending_new_batter = false;
    next.pending_new_over = false;

    // Run attribution.
    let (off_bat, extra_runs) = attribute_runs(input.extra, input.runs);

    // A dismissal the extra type makes impossible is downgraded to not-out,
    // never bounced back to the scorer.
    let wicket: Option<&WicketInput> = input
        .wicket
        .as_ref()
        .filter(|w| w.dismissal.valid_under(input.extra));

    // Ledger slot: the over in progress and the legal-ball slot this
    // delivery occupies (or precedes, for wides and no-balls).
    let over_number = next.overs_completed + 1;
    let ball_number = next.balls_this_over + 1;

    // Striker's card. The non-striker is surfaced too so both openers show
    // from ball one.
    next.batting_entry_mut(&input.striker_id).credit(off_bat, legal);
    next.batting_entry_mut(&input.non_striker_id);

    // Bowler's card. Byes and leg-byes are not charged to the bowler.
    {
        let entry = next.bowling_entry_mut(&input.bowler_id);
        if legal {
            entry.balls_bowled += 1;
        }
        entry.runs_conceded += off_bat
            + match input.extra {
                Extra::Wide | Extra::NoBall => extra_runs,
                _ => 0,
            };
    }

    // Team totals.
    next.total_runs += off_bat + extra_runs;
    next.extras.add(input.extra, extra_runs);

    // Wicket.
    let mut dismissed_id = None;
    if let Some(w) = wicket {
        next.total_wickets += 1;
        let dismissed = w
            .dismissed_id
            .clone()
            .unwrap_or_else(|| input.striker_id.clone());
        let fow_ball = if legal {
            next.balls_this_over + 1
        } else {
            next.balls_this_over
        };
        next.fall_of_wickets.push(FallOfWicket {
            wicket: next.total_wickets,
            score: next.total_runs,
            over: next.overs_completed,
            ball: fow_ball,
            batter_id: dismissed.clone(),
            dismissal: Some(w.dismissal),
        });
        let credit = w.dismissal.credits_bowler();
        next.batting_entry_mut(&dismissed).mark_out(
            w.dismissal,
            credit.then(|| input.bowler_id.clone()),
            w.fielder_id.clone(),
        );
        if credit {
            next.bowling_entry_mut(&input.bowler_id).wickets += 1;
        }
        next.pending_new_batter = true;
        dismissed_id = Some(dismissed);
    }

    // Over progression. Only legal balls move the counter; the sixth closes
    // the over, clears the attack, and flips the ends.
    let mut over_completed_now = false;
    if legal {
        next.balls_this_over += 1;
        if next.balls_this_over >= next.rules.balls_per_over {
            next.overs_completed += 1;
            next.balls_this_over = 0;
            next.last_over_bowler = Some(input.bowler_id.clone());
            next.current_bowler = None;
            next.pending_new_over = true;
            over_completed_now = true;
        }
    }
    if !over_completed_now {
        next.current_bowler = Some(input.bowler_id.clone());
    }

    // Strike rotation: odd physically-run runs swap, an over boundary swaps
    // again.
    let mut swap = running_runs(input.extra, off_bat, extra_runs) % 2 == 1;
    if over_completed_now {
        swap = !swap;
    }
    let (mut striker, mut non_striker) =
        (input.striker_id.clone(), input.non_striker_id.clone());
    if swap {
        std::mem::swap(&mut striker, &mut non_striker);
    }
    next.striker = Some(striker);
    next.non_striker = Some(non_striker);

    evaluate_completion(&mut next);

    let delivery = Delivery {
        over_number,
        ball_number,
        innings: Some(state.innings),
        striker_id: input.striker_id.clone(),
        non_striker_id: input.non_striker_id.clone(),
        bowler_id: input.bowler_id.clone(),
        runs_off_bat: off_bat,
        extra: input.extra,
        extra_runs,
        is_wicket: wicket.is_some(),
        dismissal: wicket.map(|w| w.dismissal),
        dismissed_id,
        fielder_id: wicket.and_then(|w| w.fielder_id.clone()),
        recorded_at: Utc::now(),
    };

    ScoreOutcome {
        delivery,
        state: next,
    }
}

/// Split the scorer's run count into (off the bat, extras).
///
/// Wides, byes and leg-byes record at least one extra even when the scorer
/// types zero; a no-ball records exactly its penalty as the extra and keeps
/// any runs with the striker.
pub fn attribute_runs(extra: Extra, runs: u32) -> (u32, u32) {
    match extra {
        Extra::None => (runs, 0),
        Extra::NoBall => (runs, NO_BALL_PENALTY),
        Extra::Wide | Extra::Bye | Extra::LegBye => (0, runs.max(1)),
    }
}

/// Runs the batters physically ran on this ball, which is what decides a
/// strike swap. The no-ball penalty and the automatic single for a wide are
/// not run; wide extras beyond one are.
pub fn running_runs(extra: Extra, off_bat: u32, extra_runs: u32) -> u32 {
    match extra {
        Extra::None | Extra::NoBall => off_bat,
        Extra::Bye | Extra::LegBye => extra_runs,
        Extra::Wide => {
            if extra_runs > 1 {
                extra_runs
            } else {
                0
            }
        }
    }
}

/// Derive end-of-innings and end-of-match consequences from the tallies.
///
/// Shared between the engine (after every ball) and the runtime recompute
/// (after a replay) so completion can never be decided two different ways.
pub fn evaluate_completion(state: &mut MatchState) {
    if state.result.is_some() {
        state.pending_new_batter = false;
        state.pending_new_over = false;
        state.pending_new_innings = false;
        return;
    }

    let innings_over = state.is_all_out() || state.overs_exhausted();

    if state.innings >= crate::ledger::SECOND_INNINGS {
        let Some(target) = state.target else {
            return;
        };
        if state.total_runs >= target {
            state.result = Some(MatchResult::WonByWickets {
                team: state.batting_team.name.clone(),
                wickets: state.rules.wickets_to_close() - state.total_wickets,
            });
        } else if innings_over {
            let shortfall = target - 1 - state.total_runs;
            state.result = Some(if shortfall == 0 {
                MatchResult::Tie
            } else {
                MatchResult::WonByRuns {
                    team: state.bowling_team.name.clone(),
                    runs: shortfall,
                }
            });
        }
        if state.result.is_some() {
            state.pending_new_batter = false;
            state.pending_new_over = false;
            state.pending_new_innings = false;
        }
    } else if innings_over {
        state.pending_new_innings = true;
        state.pending_new_batter = false;
        state.pending_new_over = false;
    }
}

/// Fold a sequence of ledger records through the engine from `initial`.
///
/// Each record replays with the striker/non-striker/bowler it recorded, not
/// whoever the evolving state thinks is on strike; that is what lets a
/// deduplicated ledger replay land on the same state the live path built.
pub fn fold_deliveries<'a, I>(initial: MatchState, deliveries: I) -> MatchState
where
    I: IntoIterator<Item = &'a Delivery>,
{
    deliveries.into_iter().fold(initial, |state, d| {
        score_one(&BallInput::from_delivery(d), &state).state
    })
}

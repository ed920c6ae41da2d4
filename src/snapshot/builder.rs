//! Snapshot assembly from match state.

use crate::dls::{self, ResourceTable};
use crate::ledger::{FIRST_INNINGS, SECOND_INNINGS};
use crate::state::MatchState;

use super::view::{Batsmen, DlsPanel, MatchPhase, ScoreLine, SnapshotView};

/// Assemble the viewer snapshot for `state`.
///
/// Pure read: the builder derives, it never mutates. A rain panel that
/// cannot be computed (no reference innings, zero resources) is omitted
/// rather than filled with a guess.
pub fn build_view(state: &MatchState, table: &ResourceTable) -> SnapshotView {
    SnapshotView {
        game_id: state.game_id,
        status: derive_phase(state),
        innings: state.innings,
        batting_team: state.batting_team.name.clone(),
        bowling_team: state.bowling_team.name.clone(),
        score: ScoreLine {
            runs: state.total_runs,
            wickets: state.total_wickets,
            overs: state.overs_display(),
        },
        target: state.target,
        batsmen: Batsmen {
            striker: state.striker.clone(),
            non_striker: state.non_striker.clone(),
        },
        current_bowler: state.current_bowler.clone(),
        extras_totals: state.extras,
        fall_of_wickets: state.fall_of_wickets.clone(),
        needs_new_over: state.pending_new_over,
        needs_new_batter: state.pending_new_batter,
        needs_new_innings: state.pending_new_innings,
        dls: dls_panel(state, table),
        result: state.result.clone(),
    }
}

fn derive_phase(state: &MatchState) -> MatchPhase {
    if state.result.is_some() {
        return MatchPhase::Completed;
    }
    if state.pending_new_innings {
        return MatchPhase::InningsBreak;
    }
    let nothing_yet = state.innings == FIRST_INNINGS
        && state.innings_history.is_empty()
        && state.legal_balls_bowled() == 0
        && state.total_runs == 0
        && state.striker.is_none();
    if nothing_yet {
        MatchPhase::NotStarted
    } else {
        MatchPhase::Live
    }
}

/// Rain panel for a live chase. Requires the format to be limited-overs
/// with the rule enabled, and a closed first innings to scale against.
fn dls_panel(state: &MatchState, table: &ResourceTable) -> Option<DlsPanel> {
    if !state.rules.dls_enabled || state.innings != SECOND_INNINGS {
        return None;
    }
    let scheduled = state.rules.overs_per_innings?;
    let balls_remaining = state.balls_remaining()?;
    let first = state
        .innings_history
        .iter()
        .find(|r| r.innings == FIRST_INNINGS)?;

    let bpo = state.rules.balls_per_over;
    let r1 = dls::innings_resources(
        table,
        scheduled,
        &state.interruptions_for(FIRST_INNINGS),
        bpo,
    );
    let r2_total = dls::innings_resources(
        table,
        scheduled,
        &state.interruptions_for(SECOND_INNINGS),
        bpo,
    );
    let r2_left = table.resources_remaining(
        dls::overs_from_balls(balls_remaining, bpo),
        state.total_wickets,
    );
    let r2_used = (r2_total - r2_left).max(0.0);

    let par_score = dls::par_score(first.runs, r1, r2_used).ok()?;
    // The revised target only replaces the scoreboard target when overs
    // have actually been lost somewhere.
    let revised_target = if state.interruptions.is_empty() {
        None
    } else {
        dls::revised_target(first.runs, r1, r2_total).ok()
    };

    Some(DlsPanel {
        par_score,
        revised_target,
        ahead_by: state.total_runs as i64 - par_score as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dls::Interruption;
    use crate::state::{MatchRules, TeamSheet};
    use uuid::Uuid;

    fn sheet(name: &str, prefix: &str) -> TeamSheet {
        TeamSheet::new(name, (1..=11).map(|n| format!("{prefix}{n}")).collect())
    }

    fn dls_rules() -> MatchRules {
        MatchRules {
            dls_enabled: true,
            ..MatchRules::default()
        }
    }

    fn state(rules: MatchRules) -> MatchState {
        MatchState::new(
            Uuid::new_v4(),
            sheet("Harbour CC", "h"),
            sheet("Valley CC", "v"),
            rules,
        )
    }

    fn chasing_state() -> MatchState {
        let mut s = state(dls_rules());
        s.total_runs = 250;
        s.overs_completed = 50;
        assert!(s.begin_second_innings());
        s
    }

    #[test]
    fn test_phase_progression() {
        let mut s = state(MatchRules::default());
        let table = ResourceTable::standard();
        assert_eq!(build_view(&s, &table).status, MatchPhase::NotStarted);

        s.striker = Some("h1".into());
        assert_eq!(build_view(&s, &table).status, MatchPhase::Live);

        s.pending_new_innings = true;
        assert_eq!(build_view(&s, &table).status, MatchPhase::InningsBreak);

        s.result = Some(crate::state::MatchResult::Tie);
        assert_eq!(build_view(&s, &table).status, MatchPhase::Completed);
    }

    #[test]
    fn test_scoreline_and_prompts_carried() {
        let mut s = state(MatchRules::default());
        s.total_runs = 187;
        s.total_wickets = 4;
        s.overs_completed = 32;
        s.balls_this_over = 5;
        s.pending_new_batter = true;

        let view = build_view(&s, &ResourceTable::standard());
        assert_eq!(view.score.runs, 187);
        assert_eq!(view.score.wickets, 4);
        assert_eq!(view.score.overs, "32.5");
        assert!(view.needs_new_batter);
        assert!(!view.needs_new_over);
    }

    #[test]
    fn test_no_panel_when_rule_disabled_or_first_innings() {
        let table = ResourceTable::standard();
        let mut plain = state(MatchRules::default());
        plain.total_runs = 100;
        plain.overs_completed = 50;
        assert!(plain.begin_second_innings());
        assert_eq!(build_view(&plain, &table).dls, None);

        let first_innings = state(dls_rules());
        assert_eq!(build_view(&first_innings, &table).dls, None);
    }

    #[test]
    fn test_panel_par_and_lead() {
        let table = ResourceTable::standard();
        let mut s = chasing_state();
        // 25 overs in, 2 down, 120 on the board. Par is
        // floor(250 * (100 - 60.5) / 100) = 98.
        s.overs_completed = 25;
        s.total_wickets = 2;
        s.total_runs = 120;

        let panel = build_view(&s, &table).dls.expect("panel for live chase");
        assert_eq!(panel.par_score, 98);
        assert_eq!(panel.ahead_by, 22);
        // No overs lost anywhere: the official target stands, no revision.
        assert_eq!(panel.revised_target, None);
    }

    #[test]
    fn test_panel_revised_target_after_interruption() {
        let table = ResourceTable::standard();
        let mut s = chasing_state();
        // Rain before a ball was bowled: chase shortened to 40 overs.
        s.interruptions.push(Interruption {
            innings: 2,
            balls_remaining_at_stop: 300,
            balls_remaining_at_resume: 240,
            wickets_at_stop: 0,
        });
        s.shrink_allotment(10);
        s.overs_completed = 10;
        s.total_wickets = 1;
        s.total_runs = 61;

        let panel = build_view(&s, &table).dls.expect("panel after stoppage");
        // r2 total is 89.3; the revision scales 250 by it: floor(223.25)+1.
        assert_eq!(panel.revised_target, Some(224));
        // 30 overs left, 1 down: r2 used = 89.3 - 71.8 = 17.5, par 43.
        assert_eq!(panel.par_score, 43);
        assert_eq!(panel.ahead_by, 18);
    }

    #[test]
    fn test_panel_omitted_when_unlimited_overs() {
        let table = ResourceTable::standard();
        let mut rules = dls_rules();
        rules.overs_per_innings = None;
        let mut s = state(rules);
        s.total_runs = 250;
        assert!(s.begin_second_innings());
        assert_eq!(build_view(&s, &table).dls, None);
    }
}

//! Archived innings records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::match_state::MatchState;
use super::scorecard::{BattingEntry, BowlingEntry, ExtrasTally, FallOfWicket};

/// A closed innings, frozen at the moment the sides changed over.
///
/// Archival is keyed by innings number: capturing the same innings twice is
/// a no-op at the caller, which is what makes the innings transition safe to
/// replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsRecord {
    pub innings: u32,
    pub batting_team: String,
    pub bowling_team: String,
    pub runs: u32,
    pub wickets: u32,
    pub overs_completed: u32,
    pub balls_this_over: u32,
    /// Overs the innings was entitled to when it closed (post-stoppage).
    pub overs_allotted: Option<u32>,
    pub extras: ExtrasTally,
    pub batting_card: BTreeMap<String, BattingEntry>,
    pub batting_order: Vec<String>,
    pub bowling_card: BTreeMap<String, BowlingEntry>,
    pub fall_of_wickets: Vec<FallOfWicket>,
}

impl InningsRecord {
    /// Freeze the live innings of `state` into an archive record.
    pub fn capture(state: &MatchState) -> Self {
        Self {
            innings: state.innings,
            batting_team: state.batting_team.name.clone(),
            bowling_team: state.bowling_team.name.clone(),
            runs: state.total_runs,
            wickets: state.total_wickets,
            overs_completed: state.overs_completed,
            balls_this_over: state.balls_this_over,
            overs_allotted: state.overs_allotted,
            extras: state.extras,
            batting_card: state.batting_card.clone(),
            batting_order: state.batting_order.clone(),
            bowling_card: state.bowling_card.clone(),
            fall_of_wickets: state.fall_of_wickets.clone(),
        }
    }

    /// Overs faced, scorebook notation.
    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.overs_completed, self.balls_this_over)
    }
}

//! The live match state derived from the ledger.
//!
//! Nothing here is authoritative: every scoring-derived field can be thrown
//! away and rebuilt from the delivery log. Administrative fields (teams,
//! rules, target, archived innings, interruptions) are set by match
//! operations and survive a rebuild untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dls::Interruption;
use crate::ledger::FIRST_INNINGS;

use super::innings::InningsRecord;
use super::scorecard::{BattingEntry, BowlingEntry, ExtrasTally, FallOfWicket};

/// A named eleven (or however many the rules say).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub name: String,
    pub players: Vec<String>,
}

impl TeamSheet {
    pub fn new(name: impl Into<String>, players: Vec<String>) -> Self {
        Self {
            name: name.into(),
            players,
        }
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }
}

/// Format parameters fixed at match creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    pub balls_per_over: u32,
    /// `None` means unlimited (no over cap ends the innings).
    pub overs_per_innings: Option<u32>,
    pub players_per_side: u32,
    /// Whether rain-rule projections are shown for interrupted chases.
    pub dls_enabled: bool,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            balls_per_over: 6,
            overs_per_innings: Some(50),
            players_per_side: 11,
            dls_enabled: false,
        }
    }
}

impl MatchRules {
    /// Wickets that end the innings: one batter is always left stranded.
    pub fn wickets_to_close(&self) -> u32 {
        self.players_per_side.saturating_sub(1)
    }
}

/// Final outcome of a completed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchResult {
    WonByRuns { team: String, runs: u32 },
    WonByWickets { team: String, wickets: u32 },
    Tie,
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::WonByRuns { team, runs } => {
                let unit = if *runs == 1 { "run" } else { "runs" };
                write!(f, "{team} won by {runs} {unit}")
            }
            MatchResult::WonByWickets { team, wickets } => {
                let unit = if *wickets == 1 { "wicket" } else { "wickets" };
                write!(f, "{team} won by {wickets} {unit}")
            }
            MatchResult::Tie => write!(f, "match tied"),
        }
    }
}

/// Everything a viewer or scorer sees, derived plus administrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub game_id: Uuid,
    pub rules: MatchRules,
    pub innings: u32,
    pub batting_team: TeamSheet,
    pub bowling_team: TeamSheet,

    /// Overs the live innings may still run to. Starts at the scheduled
    /// length and only ever shrinks, when stoppages take overs away.
    pub overs_allotted: Option<u32>,

    /// Chase target, set once when innings 2 starts; never recomputed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,

    // Live innings tallies.
    pub total_runs: u32,
    pub total_wickets: u32,
    pub overs_completed: u32,
    pub balls_this_over: u32,
    pub extras: ExtrasTally,

    // Crease and attack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub striker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_striker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bowler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_over_bowler: Option<String>,

    // Prompts the scoring UI must resolve before the next ball.
    pub pending_new_batter: bool,
    pub pending_new_over: bool,
    pub pending_new_innings: bool,

    // Cards for the live innings.
    pub batting_card: BTreeMap<String, BattingEntry>,
    pub batting_order: Vec<String>,
    pub bowling_card: BTreeMap<String, BowlingEntry>,
    pub bowling_order: Vec<String>,
    pub fall_of_wickets: Vec<FallOfWicket>,

    /// Closed innings, in order.
    pub innings_history: Vec<InningsRecord>,

    /// Rain/light stoppages, recorded per innings for resource accounting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interruptions: Vec<Interruption>,
}

impl MatchState {
    /// Fresh state with `batting` taking first strike.
    pub fn new(game_id: Uuid, batting: TeamSheet, bowling: TeamSheet, rules: MatchRules) -> Self {
        Self {
            game_id,
            rules,
            innings: FIRST_INNINGS,
            batting_team: batting,
            bowling_team: bowling,
            overs_allotted: rules.overs_per_innings,
            target: None,
            result: None,
            total_runs: 0,
            total_wickets: 0,
            overs_completed: 0,
            balls_this_over: 0,
            extras: ExtrasTally::default(),
            striker: None,
            non_striker: None,
            current_bowler: None,
            last_over_bowler: None,
            pending_new_batter: false,
            pending_new_over: false,
            pending_new_innings: false,
            batting_card: BTreeMap::new(),
            batting_order: Vec::new(),
            bowling_card: BTreeMap::new(),
            bowling_order: Vec::new(),
            fall_of_wickets: Vec::new(),
            innings_history: Vec::new(),
            interruptions: Vec::new(),
        }
    }

    /// The card line for a batter, creating it on first appearance.
    pub fn batting_entry_mut(&mut self, player_id: &str) -> &mut BattingEntry {
        if !self.batting_card.contains_key(player_id) {
            self.batting_order.push(player_id.to_string());
        }
        self.batting_card.entry(player_id.to_string()).or_default()
    }

    /// The card line for a bowler, creating it on first appearance.
    pub fn bowling_entry_mut(&mut self, player_id: &str) -> &mut BowlingEntry {
        if !self.bowling_card.contains_key(player_id) {
            self.bowling_order.push(player_id.to_string());
        }
        self.bowling_card.entry(player_id.to_string()).or_default()
    }

    /// Legal balls bowled so far this innings.
    pub fn legal_balls_bowled(&self) -> u32 {
        self.overs_completed * self.rules.balls_per_over + self.balls_this_over
    }

    /// Legal balls left in this innings, `None` for unlimited formats.
    /// Honors overs already lost to stoppages.
    pub fn balls_remaining(&self) -> Option<u32> {
        let cap = self.overs_allotted? * self.rules.balls_per_over;
        Some(cap.saturating_sub(self.legal_balls_bowled()))
    }

    pub fn is_all_out(&self) -> bool {
        self.total_wickets >= self.rules.wickets_to_close()
    }

    pub fn overs_exhausted(&self) -> bool {
        self.overs_allotted
            .is_some_and(|cap| self.overs_completed >= cap)
    }

    /// Take `overs_lost` off the live innings' allocation. The floor is the
    /// over currently in progress; balls already bowled cannot be rained
    /// off. Returns the new allocation, or `None` in unlimited formats.
    pub fn shrink_allotment(&mut self, overs_lost: u32) -> Option<u32> {
        let current = self.overs_allotted?;
        let in_progress = u32::from(self.balls_this_over > 0);
        let floor = self.overs_completed + in_progress;
        let reduced = current.saturating_sub(overs_lost).max(floor);
        self.overs_allotted = Some(reduced);
        Some(reduced)
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    /// Overs faced this innings, scorebook notation ("12.4").
    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.overs_completed, self.balls_this_over)
    }

    pub fn innings_archived(&self, innings: u32) -> bool {
        self.innings_history.iter().any(|r| r.innings == innings)
    }

    /// Archive the live innings. Keyed on innings number so a second call
    /// for the same innings does nothing; returns whether a record was added.
    pub fn archive_current_innings(&mut self) -> bool {
        if self.innings_archived(self.innings) {
            return false;
        }
        let record = InningsRecord::capture(self);
        self.innings_history.push(record);
        true
    }

    /// Close innings 1 and open the chase: archive, fix the target, swap the
    /// sides, clear the live tallies. Returns false (and changes nothing)
    /// unless the state is actually at the end of innings 1.
    pub fn begin_second_innings(&mut self) -> bool {
        if self.innings != FIRST_INNINGS || self.result.is_some() {
            return false;
        }
        self.archive_current_innings();
        self.target = Some(self.total_runs + 1);
        std::mem::swap(&mut self.batting_team, &mut self.bowling_team);
        self.innings += 1;
        self.overs_allotted = self.rules.overs_per_innings;

        self.total_runs = 0;
        self.total_wickets = 0;
        self.overs_completed = 0;
        self.balls_this_over = 0;
        self.extras = ExtrasTally::default();
        self.striker = None;
        self.non_striker = None;
        self.current_bowler = None;
        self.last_over_bowler = None;
        self.pending_new_batter = false;
        self.pending_new_over = false;
        self.pending_new_innings = false;
        self.batting_card = BTreeMap::new();
        self.batting_order = Vec::new();
        self.bowling_card = BTreeMap::new();
        self.bowling_order = Vec::new();
        self.fall_of_wickets = Vec::new();
        true
    }

    /// Interruptions recorded against one innings.
    pub fn interruptions_for(&self, innings: u32) -> Vec<&Interruption> {
        self.interruptions
            .iter()
            .filter(|i| i.innings == innings)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, prefix: &str) -> TeamSheet {
        TeamSheet::new(
            name,
            (1..=11).map(|n| format!("{prefix}{n}")).collect(),
        )
    }

    fn fresh() -> MatchState {
        MatchState::new(
            Uuid::new_v4(),
            sheet("Harbour CC", "h"),
            sheet("Valley CC", "v"),
            MatchRules::default(),
        )
    }

    #[test]
    fn test_entry_creation_tracks_order() {
        let mut state = fresh();
        state.batting_entry_mut("h3").runs += 4;
        state.batting_entry_mut("h1").runs += 1;
        state.batting_entry_mut("h3").runs += 2;
        assert_eq!(state.batting_order, vec!["h3", "h1"]);
        assert_eq!(state.batting_card["h3"].runs, 6);
    }

    #[test]
    fn test_ball_accounting_helpers() {
        let mut state = fresh();
        state.overs_completed = 12;
        state.balls_this_over = 4;
        assert_eq!(state.legal_balls_bowled(), 76);
        assert_eq!(state.balls_remaining(), Some(50 * 6 - 76));
        assert_eq!(state.overs_display(), "12.4");
    }

    #[test]
    fn test_shrink_allotment() {
        let mut state = fresh();
        state.overs_completed = 12;
        state.balls_this_over = 3;
        assert_eq!(state.shrink_allotment(10), Some(40));
        assert_eq!(state.balls_remaining(), Some(40 * 6 - 75));
        assert!(!state.overs_exhausted());

        // A ridiculous claim cannot erase the over in progress.
        assert_eq!(state.shrink_allotment(100), Some(13));
        assert!(!state.overs_exhausted());
        state.balls_this_over = 0;
        state.overs_completed = 13;
        assert!(state.overs_exhausted());

        // Unlimited formats have nothing to shrink.
        let mut open_ended = fresh();
        open_ended.rules.overs_per_innings = None;
        open_ended.overs_allotted = None;
        assert_eq!(open_ended.shrink_allotment(5), None);
    }

    #[test]
    fn test_second_innings_restores_full_allotment() {
        let mut state = fresh();
        state.shrink_allotment(20);
        assert_eq!(state.overs_allotted, Some(30));
        assert!(state.begin_second_innings());
        assert_eq!(state.overs_allotted, Some(50));
    }

    #[test]
    fn test_all_out_leaves_one_stranded() {
        let mut state = fresh();
        state.total_wickets = 9;
        assert!(!state.is_all_out());
        state.total_wickets = 10;
        assert!(state.is_all_out());
    }

    #[test]
    fn test_second_innings_transition() {
        let mut state = fresh();
        state.total_runs = 187;
        state.total_wickets = 6;
        state.overs_completed = 50;
        state.striker = Some("h4".into());

        assert!(state.begin_second_innings());
        assert_eq!(state.innings, 2);
        assert_eq!(state.target, Some(188));
        assert_eq!(state.batting_team.name, "Valley CC");
        assert_eq!(state.bowling_team.name, "Harbour CC");
        assert_eq!(state.total_runs, 0);
        assert_eq!(state.striker, None);
        assert_eq!(state.innings_history.len(), 1);
        assert_eq!(state.innings_history[0].runs, 187);

        // Replaying the transition must not double-archive or move the target.
        assert!(!state.begin_second_innings());
        assert_eq!(state.innings_history.len(), 1);
        assert_eq!(state.target, Some(188));
    }

    #[test]
    fn test_archive_guarded_by_innings_number() {
        let mut state = fresh();
        state.total_runs = 90;
        assert!(state.archive_current_innings());
        state.total_runs = 95;
        assert!(!state.archive_current_innings());
        assert_eq!(state.innings_history.len(), 1);
        assert_eq!(state.innings_history[0].runs, 90);
    }

    #[test]
    fn test_result_display() {
        let by_runs = MatchResult::WonByRuns {
            team: "Harbour CC".into(),
            runs: 1,
        };
        assert_eq!(by_runs.to_string(), "Harbour CC won by 1 run");
        let by_wkts = MatchResult::WonByWickets {
            team: "Valley CC".into(),
            wickets: 4,
        };
        assert_eq!(by_wkts.to_string(), "Valley CC won by 4 wickets");
        assert_eq!(MatchResult::Tie.to_string(), "match tied");
    }
}

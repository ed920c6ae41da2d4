//! The viewer-facing snapshot shape.
//!
//! Top-level keys are the unit of change detection downstream: the delta
//! broadcaster diffs snapshots key by key, so fields that change
//! independently live at the top level rather than nested in one blob.
//! Key names and nesting are a wire contract; renaming one is a breaking
//! change for every subscribed scoreboard.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{ExtrasTally, FallOfWicket, MatchResult};

/// Coarse phase of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    NotStarted,
    Live,
    InningsBreak,
    Completed,
}

/// The scoreline proper: "187/4 after 32.5".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
}

/// The pair at the crease. Either end can be vacant mid-change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batsmen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub striker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_striker: Option<String>,
}

/// Rain-rule panel, present only on interrupted chases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlsPanel {
    /// Score that would be level right now; informational only.
    pub par_score: u32,
    /// Recomputed winning target, shown once overs have actually been lost.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_target: Option<u32>,
    /// Runs ahead (positive) or behind (negative) of par.
    pub ahead_by: i64,
}

/// One complete scoreboard refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub game_id: Uuid,
    pub status: MatchPhase,
    pub innings: u32,
    pub batting_team: String,
    pub bowling_team: String,
    pub score: ScoreLine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    pub batsmen: Batsmen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bowler: Option<String>,
    pub extras_totals: ExtrasTally,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub needs_new_over: bool,
    pub needs_new_batter: bool,
    pub needs_new_innings: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dls: Option<DlsPanel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

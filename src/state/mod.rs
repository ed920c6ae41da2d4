//! Match state: live tallies, scorecards, and archived innings.

pub mod innings;
pub mod match_state;
pub mod scorecard;

pub use innings::InningsRecord;
pub use match_state::{MatchResult, MatchRules, MatchState, TeamSheet};
pub use scorecard::{BattingEntry, BowlingEntry, ExtrasTally, FallOfWicket};

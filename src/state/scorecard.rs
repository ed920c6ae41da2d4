//! Per-player scorecard entries and innings tallies.

use serde::{Deserialize, Serialize};

use crate::ledger::{Dismissal, Extra};

/// A batter's line on the card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingEntry {
    pub runs: u32,
    /// Legal deliveries faced. Wides and no-balls are not balls faced.
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal: Option<Dismissal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fielder: Option<String>,
}

impl BattingEntry {
    /// Credit a delivery faced by this batter.
    pub fn credit(&mut self, off_bat: u32, legal: bool) {
        self.runs += off_bat;
        if legal {
            self.balls_faced += 1;
        }
        match off_bat {
            4 => self.fours += 1,
            6 => self.sixes += 1,
            _ => {}
        }
    }

    /// Mark this batter out.
    pub fn mark_out(
        &mut self,
        dismissal: Dismissal,
        bowler: Option<String>,
        fielder: Option<String>,
    ) {
        self.out = true;
        self.dismissal = Some(dismissal);
        self.dismissed_by = bowler;
        self.fielder = fielder;
    }
}

/// A bowler's line on the card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowlingEntry {
    /// Legal balls only; wides and no-balls do not advance the over.
    pub balls_bowled: u32,
    /// Runs charged to the bowler: off-bat runs plus wide and no-ball
    /// extras. Byes and leg-byes are the fielding side's debt, not his.
    pub runs_conceded: u32,
    pub wickets: u32,
}

impl BowlingEntry {
    /// Overs as (completed, balls), e.g. (4, 3) prints as "4.3".
    pub fn overs(&self, balls_per_over: u32) -> (u32, u32) {
        if balls_per_over == 0 {
            return (0, self.balls_bowled);
        }
        (
            self.balls_bowled / balls_per_over,
            self.balls_bowled % balls_per_over,
        )
    }
}

/// Extras conceded by the bowling side, broken down by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasTally {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
}

impl ExtrasTally {
    pub fn add(&mut self, extra: Extra, runs: u32) {
        match extra {
            Extra::None => {}
            Extra::Wide => self.wides += runs,
            Extra::NoBall => self.no_balls += runs,
            Extra::Bye => self.byes += runs,
            Extra::LegBye => self.leg_byes += runs,
        }
    }

    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes
    }
}

/// One entry in the fall-of-wickets progression.
///
/// `over`/`ball` use scorebook convention: a wicket on the last ball of the
/// 39th over records as 38.6, not 39.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallOfWicket {
    /// Ordinal of the wicket, 1-based.
    pub wicket: u32,
    /// Team score when the wicket fell.
    pub score: u32,
    pub over: u32,
    pub ball: u32,
    pub batter_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal: Option<Dismissal>,
}

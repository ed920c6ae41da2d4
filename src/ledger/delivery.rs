//! Delivery records — the unit entries of the scoring ledger.
//!
//! A `Delivery` is immutable once appended. Everything the match ever shows
//! (scorecards, totals, over pointers) must be re-derivable from these
//! records alone; any cached aggregate is disposable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The innings a record belongs to when it carries no explicit tag.
///
/// Older exports predate the innings tag; those records are first-innings
/// balls by definition and must never leak into second-innings aggregates.
pub const FIRST_INNINGS: u32 = 1;

/// The chasing side's innings.
pub const SECOND_INNINGS: u32 = 2;

/// Extras classification for a single delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extra {
    /// A fair delivery: runs, if any, come off the bat.
    #[default]
    None,
    /// Out of the batter's reach; does not count as a ball faced or bowled.
    Wide,
    /// Illegal delivery; carries a fixed one-run penalty.
    NoBall,
    /// Runs taken without bat contact off a fair ball.
    Bye,
    /// Runs deflected off the batter's body off a fair ball.
    LegBye,
}

impl Extra {
    /// A ball is legal iff it is neither a wide nor a no-ball.
    /// Only legal deliveries advance the over counter.
    pub fn is_legal(self) -> bool {
        !matches!(self, Extra::Wide | Extra::NoBall)
    }

    /// Canonical wire code for this extra.
    pub fn as_str(self) -> &'static str {
        match self {
            Extra::None => "none",
            Extra::Wide => "wide",
            Extra::NoBall => "no_ball",
            Extra::Bye => "bye",
            Extra::LegBye => "leg_bye",
        }
    }
}

impl std::fmt::Display for Extra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a batter was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dismissal {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    HitWicket,
    RunOut,
    ObstructingField,
}

impl Dismissal {
    /// Whether this dismissal is credited to the bowler's wicket tally.
    /// Run-outs and obstruction are fielding dismissals, not bowler credits.
    pub fn credits_bowler(self) -> bool {
        matches!(
            self,
            Dismissal::Bowled
                | Dismissal::Caught
                | Dismissal::Lbw
                | Dismissal::Stumped
                | Dismissal::HitWicket
        )
    }

    /// Whether this dismissal can stand on a delivery with the given extra.
    ///
    /// Bowled, caught, lbw, stumped and hit-wicket cannot occur off a
    /// no-ball; bowled and lbw cannot occur off a wide. An invalid
    /// combination is downgraded to "not out" by the engine, never rejected.
    pub fn valid_under(self, extra: Extra) -> bool {
        match extra {
            Extra::NoBall => !matches!(
                self,
                Dismissal::Bowled
                    | Dismissal::Caught
                    | Dismissal::Lbw
                    | Dismissal::Stumped
                    | Dismissal::HitWicket
            ),
            Extra::Wide => !matches!(self, Dismissal::Bowled | Dismissal::Lbw),
            _ => true,
        }
    }

    /// Canonical wire code for this dismissal.
    pub fn as_str(self) -> &'static str {
        match self {
            Dismissal::Bowled => "bowled",
            Dismissal::Caught => "caught",
            Dismissal::Lbw => "lbw",
            Dismissal::Stumped => "stumped",
            Dismissal::HitWicket => "hit_wicket",
            Dismissal::RunOut => "run_out",
            Dismissal::ObstructingField => "obstructing_field",
        }
    }
}

impl std::fmt::Display for Dismissal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ball as recorded in the ledger.
///
/// `over_number` is the 1-based over in progress and `ball_number` the
/// 1-based legal-ball slot within it. Illegal deliveries (wide/no-ball)
/// carry the slot of the legal ball they precede, so several of them may
/// share a slot with at most one legal delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub over_number: u32,
    pub ball_number: u32,

    /// Absent on records from older exports; effective default is innings 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innings: Option<u32>,

    pub striker_id: String,
    pub non_striker_id: String,
    pub bowler_id: String,

    /// Runs scored off the bat (credited to the striker for fair balls and
    /// no-balls only).
    pub runs_off_bat: u32,

    #[serde(default)]
    pub extra: Extra,

    /// Runs recorded as extras: 0 for a fair ball, the fixed penalty for a
    /// no-ball, the full extras count for wide/bye/leg-bye.
    #[serde(default)]
    pub extra_runs: u32,

    #[serde(default)]
    pub is_wicket: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal: Option<Dismissal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fielder_id: Option<String>,

    pub recorded_at: DateTime<Utc>,
}

impl Delivery {
    /// Whether this delivery consumes a legal ball.
    pub fn is_legal(&self) -> bool {
        self.extra.is_legal()
    }

    /// The innings this record belongs to, applying the legacy default.
    pub fn effective_innings(&self) -> u32 {
        self.innings.unwrap_or(FIRST_INNINGS)
    }

    /// Total runs this delivery adds to the batting side.
    pub fn team_runs(&self) -> u32 {
        self.runs_off_bat + self.extra_runs
    }

    /// The dismissal on this record after applying extra-validity rules.
    ///
    /// Records written by the engine are already downgraded; this re-applies
    /// the same filter so foreign ledgers heal instead of double counting.
    pub fn effective_dismissal(&self) -> Option<Dismissal> {
        if !self.is_wicket {
            return None;
        }
        self.dismissal.filter(|d| d.valid_under(self.extra))
    }

    /// Structural sanity for replay: entries failing this are skipped (and
    /// counted) by the rebuild passes rather than aborting them.
    pub fn is_well_formed(&self) -> bool {
        self.over_number >= 1
            && (1..=12).contains(&self.ball_number)
            && !self.striker_id.is_empty()
            && !self.non_striker_id.is_empty()
            && !self.bowler_id.is_empty()
            && matches!(self.innings, None | Some(FIRST_INNINGS) | Some(SECOND_INNINGS))
    }
}

/// Dedup coordinates of a delivery within its innings.
///
/// Legal deliveries always use subindex 0, so a slot holds at most one of
/// them; illegal deliveries at the same slot get 1, 2, ... in arrival order
/// and all survive deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub innings: u32,
    pub over: u32,
    pub ball: u32,
    pub subindex: u32,
}

/// Subindex reserved for the (unique) legal delivery of a slot.
pub const LEGAL_SUBINDEX: u32 = 0;

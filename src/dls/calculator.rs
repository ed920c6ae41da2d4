//! Target and par arithmetic over the resource table.
//!
//! The revised target is binding: it is what the chasing side must reach
//! after overs are lost. The par score is advisory only, a "who's ahead"
//! line for the scoreboard; crossing it never completes a match.

use serde::{Deserialize, Serialize};

use super::errors::{DlsError, DlsResult};
use super::table::ResourceTable;

/// A stoppage that cost an innings some of its overs.
///
/// Positions are in balls remaining, not overs, so the record is exact and
/// comparable; conversion to fractional overs happens only at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interruption {
    pub innings: u32,
    pub balls_remaining_at_stop: u32,
    pub balls_remaining_at_resume: u32,
    pub wickets_at_stop: u32,
}

impl Interruption {
    /// Resource percentage this stoppage removed from the innings.
    pub fn resources_lost(&self, table: &ResourceTable, balls_per_over: u32) -> f64 {
        let at_stop = table.resources_remaining(
            overs_from_balls(self.balls_remaining_at_stop, balls_per_over),
            self.wickets_at_stop,
        );
        let at_resume = table.resources_remaining(
            overs_from_balls(self.balls_remaining_at_resume, balls_per_over),
            self.wickets_at_stop,
        );
        (at_stop - at_resume).max(0.0)
    }
}

/// Balls expressed as fractional overs: 3 balls of a 6-ball over is 0.5, so
/// interpolation is linear in balls.
pub fn overs_from_balls(balls: u32, balls_per_over: u32) -> f64 {
    if balls_per_over == 0 {
        return 0.0;
    }
    balls as f64 / balls_per_over as f64
}

/// Total resources an innings had available: the full allocation at its
/// scheduled length, minus what each stoppage took away.
pub fn innings_resources(
    table: &ResourceTable,
    scheduled_overs: u32,
    interruptions: &[&Interruption],
    balls_per_over: u32,
) -> f64 {
    let mut available = table.resources_remaining(scheduled_overs as f64, 0);
    for stoppage in interruptions {
        available -= stoppage.resources_lost(table, balls_per_over);
    }
    available.max(0.0)
}

/// Revised target for the chasing side:
/// `floor(first_innings_runs * r2 / r1) + 1`.
pub fn revised_target(first_innings_runs: u32, r1: f64, r2: f64) -> DlsResult<u32> {
    let scaled = scale(first_innings_runs, r1, r2)?;
    Ok(scaled + 1)
}

/// Par score at the current moment of the chase:
/// `floor(first_innings_runs * r2_used / r1)`. Being at par is level, not
/// ahead.
pub fn par_score(first_innings_runs: u32, r1: f64, r2_used: f64) -> DlsResult<u32> {
    scale(first_innings_runs, r1, r2_used)
}

fn scale(runs: u32, r1: f64, r2: f64) -> DlsResult<u32> {
    if !r1.is_finite() || r1 <= 0.0 {
        return Err(DlsError::NoReferenceResources);
    }
    let r2 = if r2.is_finite() { r2.max(0.0) } else { 0.0 };
    Ok((runs as f64 * r2 / r1).floor() as u32)
}

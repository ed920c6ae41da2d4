//! Duckworth-Lewis-Stern resource accounting for interrupted matches.
//!
//! Pure arithmetic: a resource table, interruption records, and the target
//! and par formulas. Nothing here touches match state or the ledger; the
//! snapshot builder bridges the two.

pub mod calculator;
pub mod errors;
pub mod table;

pub use calculator::{
    innings_resources, overs_from_balls, par_score, revised_target, Interruption,
};
pub use errors::{DlsError, DlsResult};
pub use table::{ResourceTable, WICKET_BUCKETS};

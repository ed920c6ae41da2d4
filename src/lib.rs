//! scorebook - live cricket scoring over an append-only delivery log
//!
//! The ledger of deliveries is the only source of truth; scorecards,
//! running totals, and match results are projections that can always be
//! rebuilt from it. Corrections append, undo truncates, nothing mutates
//! in place.

pub mod broadcast;
pub mod cli;
pub mod dls;
pub mod engine;
pub mod ledger;
pub mod observability;
pub mod rebuild;
pub mod service;
pub mod snapshot;
pub mod state;
pub mod store;

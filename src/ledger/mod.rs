//! Delivery ledger: the append-only record of every ball bowled.
//!
//! The ledger is the single source of truth for a game. Derived state
//! (scorecards, totals, strike) is a cache over it and can always be thrown
//! away and rebuilt. Corrections append; nothing is edited in place.

pub mod delivery;
pub mod errors;
pub mod log;
pub mod normalize;

pub use delivery::{
    Delivery, Dismissal, Extra, SlotKey, FIRST_INNINGS, LEGAL_SUBINDEX, SECOND_INNINGS,
};
pub use errors::{LedgerError, LedgerResult};
pub use log::DeliveryLog;
pub use normalize::{clean_id, normalize_dismissal, normalize_extra};

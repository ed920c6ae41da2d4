//! Ledger error types.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Undo against a game with no recorded deliveries.
    #[error("ledger is empty")]
    Empty,

    /// A ledger file whose top level is not a JSON array.
    #[error("ledger document is not a JSON array")]
    NotAnArray,
}

impl LedgerError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Empty => "SCORE_LEDGER_EMPTY",
            LedgerError::NotAnArray => "SCORE_LEDGER_BAD_DOCUMENT",
        }
    }
}

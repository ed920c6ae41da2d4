//! Service error types.
//!
//! Everything a scoring request can be refused for, with a stable code per
//! variant so clients and log pipelines can switch on failures without
//! parsing prose.

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::store::StoreError;

/// Errors from match operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid match rules: {0}")]
    InvalidRules(String),

    #[error("invalid team sheets: {0}")]
    InvalidTeams(String),

    #[error("the match is already completed")]
    MatchCompleted,

    #[error("openers have not been set for this innings")]
    OpenersNotSet,

    #[error("openers are already set for this innings")]
    OpenersAlreadySet,

    #[error("openers must be two different players")]
    OpenersIdentical,

    #[error("no bowler has been chosen for this over")]
    BowlerNotSet,

    #[error("an over is in progress")]
    OverInProgress,

    #[error("'{0}' bowled the previous over and cannot bowl this one")]
    ConsecutiveOvers(String),

    #[error("player '{player_id}' is not on the {team} sheet")]
    UnknownPlayer { player_id: String, team: String },

    #[error("invalid player id: {0}")]
    InvalidPlayerId(String),

    #[error("'{0}' has already batted this innings")]
    AlreadyBatted(String),

    #[error("a replacement batter is required before the next ball")]
    NewBatterRequired,

    #[error("a new over must be started before the next ball")]
    NewOverRequired,

    #[error("the innings break must be resolved before scoring")]
    NewInningsRequired,

    #[error("no replacement batter is needed")]
    NoBatterNeeded,

    #[error("the innings is not over")]
    InningsNotOver,

    #[error("unknown dismissal kind '{0}'")]
    UnknownDismissal(String),

    #[error("dismissed player '{0}' is not at the crease")]
    DismissedNotAtCrease(String),

    #[error("cannot undo into a closed innings")]
    UndoAcrossInnings,

    #[error("this format has no over allocation to reduce")]
    InterruptionUnsupported,
}

impl ServiceError {
    /// Stable error code for logs and clients
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Store(e) => e.code(),
            ServiceError::Ledger(e) => e.code(),
            ServiceError::InvalidRules(_) => "SCORE_MATCH_BAD_RULES",
            ServiceError::InvalidTeams(_) => "SCORE_MATCH_BAD_TEAMS",
            ServiceError::MatchCompleted => "SCORE_MATCH_COMPLETED",
            ServiceError::OpenersNotSet => "SCORE_BALL_NO_OPENERS",
            ServiceError::OpenersAlreadySet => "SCORE_OPENERS_SET",
            ServiceError::OpenersIdentical => "SCORE_OPENERS_IDENTICAL",
            ServiceError::BowlerNotSet => "SCORE_BALL_NO_BOWLER",
            ServiceError::OverInProgress => "SCORE_OVER_IN_PROGRESS",
            ServiceError::ConsecutiveOvers(_) => "SCORE_OVER_CONSECUTIVE",
            ServiceError::UnknownPlayer { .. } => "SCORE_PLAYER_UNKNOWN",
            ServiceError::InvalidPlayerId(_) => "SCORE_PLAYER_BAD_ID",
            ServiceError::AlreadyBatted(_) => "SCORE_BATTER_REPEAT",
            ServiceError::NewBatterRequired => "SCORE_PROMPT_BATTER",
            ServiceError::NewOverRequired => "SCORE_PROMPT_OVER",
            ServiceError::NewInningsRequired => "SCORE_PROMPT_INNINGS",
            ServiceError::NoBatterNeeded => "SCORE_BATTER_NOT_NEEDED",
            ServiceError::InningsNotOver => "SCORE_INNINGS_OPEN",
            ServiceError::UnknownDismissal(_) => "SCORE_DISMISSAL_UNKNOWN",
            ServiceError::DismissedNotAtCrease(_) => "SCORE_DISMISSED_NOT_IN",
            ServiceError::UndoAcrossInnings => "SCORE_UNDO_CROSS_INNINGS",
            ServiceError::InterruptionUnsupported => "SCORE_INTERRUPTION_UNSUPPORTED",
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

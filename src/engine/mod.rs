//! Scoring engine: the pure per-ball state transition.

pub mod input;
pub mod score;

pub use input::{BallInput, WicketInput};
pub use score::{
    attribute_runs, evaluate_completion, fold_deliveries, running_runs, score_one,
    ScoreOutcome, NO_BALL_PENALTY,
};

//! Wire-shaped inputs to match operations.
//!
//! These are what a scoring client sends: free-text extra and dismissal
//! kinds, optional ids. Normalization and validation turn them into the
//! engine's strict types; nothing downstream of the service ever sees a
//! raw request.

use serde::{Deserialize, Serialize};

/// One ball as the scorer enters it.
///
/// Who is on strike and who is bowling come from the match state, not the
/// request; the scorer only types what happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallRequest {
    /// Runs as counted at the ground: off the bat for fair balls and
    /// no-balls, total extras for wides, byes and leg-byes
    pub runs: u32,

    /// Extra kind in any common spelling ("wd", "no-ball", "LEG BYE"...);
    /// absent or unrecognized means a fair delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket: Option<WicketRequest>,
}

/// A claimed dismissal on the ball.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WicketRequest {
    /// Dismissal kind ("bowled", "run out", "lbw"...)
    pub kind: String,

    /// Who was out; defaults to the striker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_id: Option<String>,

    /// Catcher, thrower or stumper, when one was involved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fielder_id: Option<String>,
}

impl BallRequest {
    /// A fair delivery for `runs` off the bat
    pub fn runs(runs: u32) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// A delivery with the given extra kind and run count
    pub fn extra(kind: impl Into<String>, runs: u32) -> Self {
        Self {
            runs,
            extra: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn with_wicket(mut self, wicket: WicketRequest) -> Self {
        self.wicket = Some(wicket);
        self
    }
}

impl WicketRequest {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            dismissed_id: None,
            fielder_id: None,
        }
    }

    pub fn of(mut self, dismissed_id: impl Into<String>) -> Self {
        self.dismissed_id = Some(dismissed_id.into());
        self
    }

    pub fn by(mut self, fielder_id: impl Into<String>) -> Self {
        self.fielder_id = Some(fielder_id.into());
        self
    }
}

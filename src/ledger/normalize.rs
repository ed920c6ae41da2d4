//! Input normalization for scorer-facing fields.
//!
//! Scoring apps are loose with spelling: "wd", "Wide", "no ball" and "nb"
//! all mean the same thing. Everything is folded to canonical enums here,
//! before validation, so the rest of the crate never sees raw strings.

use super::delivery::{Dismissal, Extra};

/// Fold a raw extras code into its canonical form.
///
/// Matching is case-insensitive and ignores surrounding whitespace, internal
/// spaces, hyphens and underscores. Absent or unrecognized input counts as a
/// fair delivery; an unknown code is a UI bug, and swallowing it as "none"
/// keeps the ball scoreable while the run count still lands.
pub fn normalize_extra(raw: Option<&str>) -> Extra {
    let Some(raw) = raw else {
        return Extra::None;
    };
    match fold(raw).as_str() {
        "wide" | "wd" | "w" => Extra::Wide,
        "noball" | "nb" | "no" => Extra::NoBall,
        "bye" | "b" => Extra::Bye,
        "legbye" | "lb" | "leg" => Extra::LegBye,
        _ => Extra::None,
    }
}

/// Fold a raw dismissal code into its canonical form.
///
/// Unlike extras, an unknown dismissal is returned as `None` and rejected
/// upstream: guessing how a batter got out corrupts the card silently.
pub fn normalize_dismissal(raw: &str) -> Option<Dismissal> {
    match fold(raw).as_str() {
        "bowled" | "b" => Some(Dismissal::Bowled),
        "caught" | "ct" | "c" => Some(Dismissal::Caught),
        "lbw" | "legbeforewicket" => Some(Dismissal::Lbw),
        "stumped" | "st" => Some(Dismissal::Stumped),
        "hitwicket" | "hw" => Some(Dismissal::HitWicket),
        "runout" | "ro" => Some(Dismissal::RunOut),
        "obstructingfield" | "obstruction" | "obs" => Some(Dismissal::ObstructingField),
        _ => None,
    }
}

/// Trim a player identifier; empty after trimming means "not provided".
pub fn clean_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn fold(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '.'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

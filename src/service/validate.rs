//! Request validation against the live state.
//!
//! The engine is total and referees nothing, so everything a scorer can
//! get wrong is caught here: membership, readiness, impossible claims.
//! Every check returns a specific error; none of them mutate state.

use std::collections::HashSet;

use crate::engine::WicketInput;
use crate::ledger::normalize::{clean_id, normalize_dismissal};
use crate::state::{MatchRules, MatchState, TeamSheet};

use super::errors::{ServiceError, ServiceResult};
use super::request::WicketRequest;

pub fn validate_rules(rules: &MatchRules) -> ServiceResult<()> {
    if rules.balls_per_over == 0 {
        return Err(ServiceError::InvalidRules(
            "balls_per_over must be at least 1".to_string(),
        ));
    }
    if rules.players_per_side < 2 {
        return Err(ServiceError::InvalidRules(
            "a side needs at least 2 players".to_string(),
        ));
    }
    if rules.overs_per_innings == Some(0) {
        return Err(ServiceError::InvalidRules(
            "overs_per_innings cannot be 0; use null for unlimited".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_teams(
    batting: &TeamSheet,
    bowling: &TeamSheet,
    rules: &MatchRules,
) -> ServiceResult<()> {
    if batting.name.trim().is_empty() || bowling.name.trim().is_empty() {
        return Err(ServiceError::InvalidTeams(
            "team names cannot be empty".to_string(),
        ));
    }
    if batting.name == bowling.name {
        return Err(ServiceError::InvalidTeams(format!(
            "both teams are named '{}'",
            batting.name
        )));
    }

    for sheet in [batting, bowling] {
        if sheet.players.len() != rules.players_per_side as usize {
            return Err(ServiceError::InvalidTeams(format!(
                "{} has {} players, rules say {}",
                sheet.name,
                sheet.players.len(),
                rules.players_per_side
            )));
        }
    }

    let mut seen = HashSet::new();
    for player in batting.players.iter().chain(bowling.players.iter()) {
        if clean_id(player).as_deref() != Some(player.as_str()) {
            return Err(ServiceError::InvalidTeams(format!(
                "player id '{player}' is empty or not normalized"
            )));
        }
        if !seen.insert(player.as_str()) {
            return Err(ServiceError::InvalidTeams(format!(
                "player id '{player}' appears twice"
            )));
        }
    }
    Ok(())
}

/// Openers may be named once per innings, before any ball is bowled.
pub fn validate_openers(
    state: &MatchState,
    striker: &str,
    non_striker: &str,
) -> ServiceResult<(String, String)> {
    if state.is_completed() {
        return Err(ServiceError::MatchCompleted);
    }
    if state.pending_new_innings {
        return Err(ServiceError::NewInningsRequired);
    }
    if state.striker.is_some() || state.non_striker.is_some() {
        return Err(ServiceError::OpenersAlreadySet);
    }

    let striker = cleaned(striker)?;
    let non_striker = cleaned(non_striker)?;
    if striker == non_striker {
        return Err(ServiceError::OpenersIdentical);
    }
    for id in [&striker, &non_striker] {
        require_on_sheet(&state.batting_team, id)?;
    }
    Ok((striker, non_striker))
}

/// A new over needs a bowler who is on the fielding side and did not bowl
/// the previous over.
pub fn validate_bowler(state: &MatchState, bowler: &str) -> ServiceResult<String> {
    if state.is_completed() {
        return Err(ServiceError::MatchCompleted);
    }
    if state.pending_new_innings {
        return Err(ServiceError::NewInningsRequired);
    }
    if state.current_bowler.is_some() {
        return Err(ServiceError::OverInProgress);
    }

    let bowler = cleaned(bowler)?;
    require_on_sheet(&state.bowling_team, &bowler)?;
    if state.last_over_bowler.as_deref() == Some(bowler.as_str()) {
        return Err(ServiceError::ConsecutiveOvers(bowler));
    }
    Ok(bowler)
}

/// Everything that must be true before a ball can be scored.
pub fn check_ball_ready(state: &MatchState) -> ServiceResult<()> {
    if state.is_completed() {
        return Err(ServiceError::MatchCompleted);
    }
    if state.pending_new_innings {
        return Err(ServiceError::NewInningsRequired);
    }
    if state.pending_new_batter {
        return Err(ServiceError::NewBatterRequired);
    }
    if state.pending_new_over {
        return Err(ServiceError::NewOverRequired);
    }
    if state.striker.is_none() || state.non_striker.is_none() {
        return Err(ServiceError::OpenersNotSet);
    }
    if state.current_bowler.is_none() {
        return Err(ServiceError::BowlerNotSet);
    }
    Ok(())
}

/// Turn a wicket claim into an engine input.
///
/// The dismissal kind must be known and the named batter must actually be
/// at the crease. Whether the kind can stand on this extra is the engine's
/// call, not a rejection.
pub fn resolve_wicket(state: &MatchState, request: &WicketRequest) -> ServiceResult<WicketInput> {
    let dismissal = normalize_dismissal(&request.kind)
        .ok_or_else(|| ServiceError::UnknownDismissal(request.kind.clone()))?;

    let dismissed_id = match &request.dismissed_id {
        None => None,
        Some(raw) => {
            let id = cleaned(raw)?;
            let at_crease = state.striker.as_deref() == Some(id.as_str())
                || state.non_striker.as_deref() == Some(id.as_str());
            if !at_crease {
                return Err(ServiceError::DismissedNotAtCrease(id));
            }
            Some(id)
        }
    };

    let fielder_id = match &request.fielder_id {
        None => None,
        Some(raw) => {
            let id = cleaned(raw)?;
            require_on_sheet(&state.bowling_team, &id)?;
            Some(id)
        }
    };

    Ok(WicketInput {
        dismissal,
        dismissed_id,
        fielder_id,
    })
}

/// The replacement batter must be needed, on the batting side, and must
/// not have batted already this innings.
pub fn validate_new_batter(state: &MatchState, player: &str) -> ServiceResult<String> {
    if state.is_completed() {
        return Err(ServiceError::MatchCompleted);
    }
    if !state.pending_new_batter {
        return Err(ServiceError::NoBatterNeeded);
    }

    let player = cleaned(player)?;
    require_on_sheet(&state.batting_team, &player)?;
    if state.batting_card.contains_key(&player) {
        return Err(ServiceError::AlreadyBatted(player));
    }
    Ok(player)
}

fn cleaned(raw: &str) -> ServiceResult<String> {
    clean_id(raw).ok_or_else(|| ServiceError::InvalidPlayerId(raw.to_string()))
}

fn require_on_sheet(sheet: &TeamSheet, player_id: &str) -> ServiceResult<()> {
    if sheet.contains(player_id) {
        return Ok(());
    }
    Err(ServiceError::UnknownPlayer {
        player_id: player_id.to_string(),
        team: sheet.name.clone(),
    })
}

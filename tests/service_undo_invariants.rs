//! Undo Invariant Tests
//!
//! Undo is tail truncation plus replay, exercised here through the service:
//! - Undoing a ball restores the stored state exactly, administrative
//!   fields included.
//! - Undoing the only ball of an innings recovers the crease from the
//!   removed record itself.
//! - Undo refuses to cross an innings boundary and refuses an empty
//!   ledger, and the refusals are counted.

use std::sync::Arc;

use scorebook::broadcast::{BroadcastPolicy, ChannelHub, DeltaBroadcaster, Transport};
use scorebook::dls::ResourceTable;
use chrono::Utc;
use scorebook::ledger::{Delivery, Extra, LedgerError, FIRST_INNINGS};
use scorebook::observability::{Logger, MetricsRegistry};
use scorebook::service::{BallRequest, MatchService, ServiceError, WicketRequest};
use scorebook::state::{MatchRules, TeamSheet};
use scorebook::store::{GameStore, MemoryStore};
use uuid::Uuid;

// =============================================================================
// Helpers
// =============================================================================

fn sheet(name: &str, prefix: &str) -> TeamSheet {
    TeamSheet::new(name, (1..=11).map(|n| format!("{prefix}{n}")).collect())
}

fn service() -> MatchService {
    service_on(Arc::new(MemoryStore::new()))
}

fn service_on(store: Arc<MemoryStore>) -> MatchService {
    let hub = Arc::new(ChannelHub::new());
    let metrics = Arc::new(MetricsRegistry::new());
    let broadcaster = Arc::new(DeltaBroadcaster::new(
        hub as Arc<dyn Transport>,
        BroadcastPolicy::default(),
        Arc::clone(&metrics),
    ));
    MatchService::new(
        store,
        broadcaster,
        Arc::new(ResourceTable::standard()),
        Arc::new(Logger::disabled()),
        metrics,
    )
}

async fn started_match(service: &MatchService, rules: MatchRules) -> Uuid {
    let game_id = service
        .create_match(sheet("Harbour CC", "h"), sheet("Valley CC", "v"), rules)
        .await
        .unwrap();
    service.set_openers(game_id, "h1", "h2").await.unwrap();
    service.start_over(game_id, "v1").await.unwrap();
    game_id
}

// =============================================================================
// Exact restoration
// =============================================================================

/// Undo after two balls must land on the precise state after the first,
/// not merely the same totals.
#[tokio::test]
async fn test_undo_restores_exact_prior_state() {
    let service = service();
    let game_id = started_match(&service, MatchRules::default()).await;

    service.score_ball(game_id, &BallRequest::runs(4)).await.unwrap();
    let before = service.load_record(game_id).await.unwrap();
    service.score_ball(game_id, &BallRequest::runs(1)).await.unwrap();

    service.undo_last(game_id).await.unwrap();
    let after = service.load_record(game_id).await.unwrap();

    assert_eq!(after.state, before.state);
    assert_eq!(after.ledger.len(), 1);
}

/// A wicket is the hardest thing to unwind by hand: card entry, fall of
/// wicket, crease vacancy, replacement prompt. Replay gets all of it back.
#[tokio::test]
async fn test_undo_wicket_restores_batter() {
    let service = service();
    let game_id = started_match(&service, MatchRules::default()).await;

    service.score_ball(game_id, &BallRequest::runs(2)).await.unwrap();
    let before = service.load_record(game_id).await.unwrap();

    let wicket = BallRequest::runs(0).with_wicket(WicketRequest::kind("caught").by("v5"));
    service.score_ball(game_id, &wicket).await.unwrap();
    let mid = service.load_record(game_id).await.unwrap();
    assert_eq!(mid.state.total_wickets, 1);
    assert!(mid.state.pending_new_batter);

    service.undo_last(game_id).await.unwrap();
    let after = service.load_record(game_id).await.unwrap();

    assert_eq!(after.state, before.state);
    assert_eq!(after.state.total_wickets, 0);
    assert!(!after.state.batting_card["h1"].out);
    assert!(after.state.fall_of_wickets.is_empty());
}

/// Undoing the sixth ball reopens the over: the bowler comes back, the
/// new-over prompt clears, and the strike un-rotates.
#[tokio::test]
async fn test_undo_over_boundary_restores_bowler() {
    let service = service();
    let game_id = started_match(&service, MatchRules::default()).await;

    for _ in 0..5 {
        service.score_ball(game_id, &BallRequest::runs(0)).await.unwrap();
    }
    let before = service.load_record(game_id).await.unwrap();
    service.score_ball(game_id, &BallRequest::runs(0)).await.unwrap();

    let closed = service.load_record(game_id).await.unwrap();
    assert!(closed.state.pending_new_over);
    assert_eq!(closed.state.current_bowler, None);
    assert_eq!(closed.state.overs_completed, 1);

    service.undo_last(game_id).await.unwrap();
    let after = service.load_record(game_id).await.unwrap();

    assert_eq!(after.state, before.state);
    assert_eq!(after.state.current_bowler, Some("v1".to_string()));
    assert_eq!(after.state.balls_this_over, 5);
    assert!(!after.state.pending_new_over);
}

/// With the innings ledger empty after the truncation, the crease and the
/// bowler come from the removed record, so the game is ready to score the
/// same ball again.
#[tokio::test]
async fn test_undo_only_ball_rewinds_to_over_start() {
    let service = service();
    let game_id = started_match(&service, MatchRules::default()).await;
    let before = service.load_record(game_id).await.unwrap();

    service.score_ball(game_id, &BallRequest::runs(3)).await.unwrap();
    service.undo_last(game_id).await.unwrap();
    let after = service.load_record(game_id).await.unwrap();

    assert_eq!(after.state, before.state);
    assert!(after.ledger.is_empty());
    assert_eq!(after.state.striker, Some("h1".to_string()));
    assert_eq!(after.state.non_striker, Some("h2".to_string()));
    assert_eq!(after.state.current_bowler, Some("v1".to_string()));
}

// =============================================================================
// Refusals
// =============================================================================

#[tokio::test]
async fn test_undo_empty_ledger_refused() {
    let service = service();
    let game_id = started_match(&service, MatchRules::default()).await;

    let err = service.undo_last(game_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Ledger(LedgerError::Empty)));
    assert_eq!(err.code(), "SCORE_LEDGER_EMPTY");
    assert_eq!(service.metrics().snapshot().undos_rejected, 1);
}

/// Once the innings has been closed and archived, its deliveries are
/// settled history; undo must not quietly reopen them.
#[tokio::test]
async fn test_undo_across_innings_refused() {
    let service = service();
    let rules = MatchRules {
        overs_per_innings: Some(1),
        ..MatchRules::default()
    };
    let game_id = started_match(&service, rules).await;

    for _ in 0..6 {
        service.score_ball(game_id, &BallRequest::runs(0)).await.unwrap();
    }
    service.start_next_innings(game_id).await.unwrap();

    let err = service.undo_last(game_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::UndoAcrossInnings));
    assert_eq!(err.code(), "SCORE_UNDO_CROSS_INNINGS");

    // The second innings scores normally after the refusal.
    service.set_openers(game_id, "v1", "v2").await.unwrap();
    service.start_over(game_id, "h1").await.unwrap();
    service.score_ball(game_id, &BallRequest::runs(4)).await.unwrap();
    let record = service.load_record(game_id).await.unwrap();
    assert_eq!(record.state.innings, 2);
    assert_eq!(record.state.total_runs, 4);
}

// =============================================================================
// Accounting
// =============================================================================

/// A structurally bad record wedged into the stored ledger (a hand import
/// gone wrong) is skipped by the replay an undo triggers; the skip reaches
/// the counters and the bad runs stay out of the rebuilt state.
#[tokio::test]
async fn test_undo_replay_counts_skipped_entries() {
    let store = Arc::new(MemoryStore::new());
    let service = service_on(Arc::clone(&store));
    let game_id = started_match(&service, MatchRules::default()).await;

    service.score_ball(game_id, &BallRequest::runs(4)).await.unwrap();

    // No bowler id: the record fails structural checks on replay. It sits
    // in a slot the service will not score into.
    let mut record = store.load_game(game_id).await.unwrap();
    record.ledger.append(Delivery {
        over_number: 1,
        ball_number: 5,
        innings: Some(FIRST_INNINGS),
        striker_id: "h1".into(),
        non_striker_id: "h2".into(),
        bowler_id: String::new(),
        runs_off_bat: 9,
        extra: Extra::None,
        extra_runs: 0,
        is_wicket: false,
        dismissal: None,
        dismissed_id: None,
        fielder_id: None,
        recorded_at: Utc::now(),
    });
    store.save_game(record).await.unwrap();

    service.score_ball(game_id, &BallRequest::runs(1)).await.unwrap();
    service.undo_last(game_id).await.unwrap();

    let metrics = service.metrics().snapshot();
    assert_eq!(metrics.replay_runs, 1);
    assert_eq!(metrics.replay_entries_skipped, 1);
    assert_eq!(metrics.undos_applied, 1);

    let after = service.load_record(game_id).await.unwrap();
    assert_eq!(after.state.total_runs, 4, "the skipped record scores nothing");
    assert_eq!(after.state.balls_this_over, 1);
}

#[tokio::test]
async fn test_undo_counts_applied_and_rejected() {
    let service = service();
    let game_id = started_match(&service, MatchRules::default()).await;

    service.score_ball(game_id, &BallRequest::runs(1)).await.unwrap();
    service.score_ball(game_id, &BallRequest::extra("wide", 1)).await.unwrap();
    service.undo_last(game_id).await.unwrap();
    service.undo_last(game_id).await.unwrap();
    service.undo_last(game_id).await.unwrap_err();

    let metrics = service.metrics().snapshot();
    assert_eq!(metrics.balls_scored, 2);
    assert_eq!(metrics.undos_applied, 2);
    assert_eq!(metrics.undos_rejected, 1);
}

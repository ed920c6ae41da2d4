//! Match operations.
//!
//! One writer per game: every mutation takes the game's async lock, loads
//! the record, applies a synchronous change, and saves under the store's
//! version check. A conflicting save (an out-of-band writer got between
//! load and save) is retried exactly once from a fresh load; a second
//! conflict surfaces to the caller. Snapshots are published after the save
//! commits, so subscribers never see a state the store might still reject.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::broadcast::DeltaBroadcaster;
use crate::dls::{Interruption, ResourceTable};
use crate::engine::{evaluate_completion, score_one, BallInput};
use crate::ledger::LedgerError;
use crate::observability::{Logger, MetricsRegistry};
use crate::rebuild::{rebuild_and_recompute, RebuildStats};
use crate::snapshot::{build_view, SnapshotView};
use crate::state::{MatchRules, MatchState, TeamSheet};
use crate::store::{GameRecord, GameStore};

use super::errors::{ServiceError, ServiceResult};
use super::request::BallRequest;
use super::validate;

/// The scoring facade: every way a match changes goes through here.
pub struct MatchService {
    store: Arc<dyn GameStore>,
    broadcaster: Arc<DeltaBroadcaster>,
    table: Arc<ResourceTable>,
    logger: Arc<Logger>,
    metrics: Arc<MetricsRegistry>,
    /// Per-game write locks, created on first touch
    game_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl MatchService {
    pub fn new(
        store: Arc<dyn GameStore>,
        broadcaster: Arc<DeltaBroadcaster>,
        table: Arc<ResourceTable>,
        logger: Arc<Logger>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            table,
            logger,
            metrics,
            game_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Create a match with `batting` taking first strike.
    pub async fn create_match(
        &self,
        batting: TeamSheet,
        bowling: TeamSheet,
        rules: MatchRules,
    ) -> ServiceResult<Uuid> {
        validate::validate_rules(&rules)?;
        validate::validate_teams(&batting, &bowling, &rules)?;

        let state = MatchState::new(Uuid::new_v4(), batting, bowling, rules);
        let game_id = state.game_id;
        let record = GameRecord::new(state);

        self.store.create_game(record.clone()).await?;
        self.metrics.increment_matches_created();
        self.logger.info(
            "match_created",
            &[
                ("game_id", game_id.to_string()),
                ("batting_team", record.state.batting_team.name.clone()),
                ("bowling_team", record.state.bowling_team.name.clone()),
            ],
        );
        self.publish(&record.state);
        Ok(game_id)
    }

    /// Name the two batters opening the live innings.
    pub async fn set_openers(
        &self,
        game_id: Uuid,
        striker: &str,
        non_striker: &str,
    ) -> ServiceResult<SnapshotView> {
        let saved = self
            .mutate(game_id, |record| {
                let (striker, non_striker) =
                    validate::validate_openers(&record.state, striker, non_striker)?;
                record.state.striker = Some(striker);
                record.state.non_striker = Some(non_striker);
                Ok(())
            })
            .await?;

        self.logger.info(
            "openers_set",
            &[
                ("game_id", game_id.to_string()),
                ("striker", saved.state.striker.clone().unwrap_or_default()),
                (
                    "non_striker",
                    saved.state.non_striker.clone().unwrap_or_default(),
                ),
            ],
        );
        Ok(self.publish(&saved.state))
    }

    /// Choose the bowler for the over about to start.
    pub async fn start_over(&self, game_id: Uuid, bowler: &str) -> ServiceResult<SnapshotView> {
        let saved = self
            .mutate(game_id, |record| {
                let bowler = validate::validate_bowler(&record.state, bowler)?;
                record.state.current_bowler = Some(bowler);
                record.state.pending_new_over = false;
                Ok(())
            })
            .await?;

        self.logger.info(
            "over_started",
            &[
                ("game_id", game_id.to_string()),
                (
                    "bowler",
                    saved.state.current_bowler.clone().unwrap_or_default(),
                ),
                ("over", (saved.state.overs_completed + 1).to_string()),
            ],
        );
        Ok(self.publish(&saved.state))
    }

    /// Score one ball and append it to the ledger.
    pub async fn score_ball(
        &self,
        game_id: Uuid,
        request: &BallRequest,
    ) -> ServiceResult<SnapshotView> {
        let result = self
            .mutate(game_id, |record| {
                validate::check_ball_ready(&record.state)?;
                let input = build_input(&record.state, request)?;
                let outcome = score_one(&input, &record.state);
                record.ledger.append(outcome.delivery);
                record.state = outcome.state;
                Ok(())
            })
            .await;

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                self.metrics.increment_balls_rejected();
                self.logger.warn(
                    "ball_rejected",
                    &[
                        ("game_id", game_id.to_string()),
                        ("code", e.code().to_string()),
                        ("reason", e.to_string()),
                    ],
                );
                return Err(e);
            }
        };

        self.metrics.increment_balls_scored();
        if let Some(last) = saved.ledger.last() {
            self.logger.info(
                "ball_scored",
                &[
                    ("game_id", game_id.to_string()),
                    (
                        "slot",
                        format!(
                            "{}/{}.{}",
                            last.effective_innings(),
                            last.over_number,
                            last.ball_number
                        ),
                    ),
                    ("extra", last.extra.as_str().to_string()),
                    ("team_runs", last.team_runs().to_string()),
                    ("wicket", last.is_wicket.to_string()),
                ],
            );
        }
        Ok(self.publish(&saved.state))
    }

    /// Bring a replacement batter in for the one who is out.
    pub async fn new_batter(&self, game_id: Uuid, player: &str) -> ServiceResult<SnapshotView> {
        let saved = self
            .mutate(game_id, |record| {
                let player = validate::validate_new_batter(&record.state, player)?;
                let state = &mut record.state;

                let striker_out = state
                    .striker
                    .as_ref()
                    .and_then(|id| state.batting_card.get(id))
                    .is_some_and(|entry| entry.out);
                let non_striker_out = state
                    .non_striker
                    .as_ref()
                    .and_then(|id| state.batting_card.get(id))
                    .is_some_and(|entry| entry.out);

                if striker_out {
                    state.striker = Some(player);
                } else if non_striker_out {
                    state.non_striker = Some(player);
                } else {
                    return Err(ServiceError::NoBatterNeeded);
                }
                state.pending_new_batter = false;
                Ok(())
            })
            .await?;

        self.logger.info(
            "batter_replaced",
            &[
                ("game_id", game_id.to_string()),
                ("incoming", player.trim().to_string()),
            ],
        );
        Ok(self.publish(&saved.state))
    }

    /// Close innings 1 and open the chase.
    pub async fn start_next_innings(&self, game_id: Uuid) -> ServiceResult<SnapshotView> {
        let saved = self
            .mutate(game_id, |record| {
                if record.state.is_completed() {
                    return Err(ServiceError::MatchCompleted);
                }
                if !record.state.pending_new_innings {
                    return Err(ServiceError::InningsNotOver);
                }
                if !record.state.begin_second_innings() {
                    return Err(ServiceError::InningsNotOver);
                }
                Ok(())
            })
            .await?;

        self.logger.info(
            "innings_started",
            &[
                ("game_id", game_id.to_string()),
                ("innings", saved.state.innings.to_string()),
                (
                    "target",
                    saved
                        .state
                        .target
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                ),
            ],
        );
        Ok(self.publish(&saved.state))
    }

    /// Remove the most recent ledger entry and rebuild the live state.
    ///
    /// Undo stops at the innings boundary: once innings 2 has entries of
    /// its own none remain, the innings-1 tail belongs to a closed innings
    /// and stays put.
    pub async fn undo_last(&self, game_id: Uuid) -> ServiceResult<SnapshotView> {
        let mut replay_stats = RebuildStats::default();
        let result = self
            .mutate(game_id, |record| {
                let last = record.ledger.last().ok_or(LedgerError::Empty)?;
                if last.effective_innings() != record.state.innings {
                    return Err(ServiceError::UndoAcrossInnings);
                }

                let removed = record.ledger.truncate_last()?;
                replay_stats = rebuild_and_recompute(&mut record.state, &record.ledger);

                // Undoing the only ball of the innings leaves nothing for
                // the rebuild to infer the crease from; the removed record
                // itself says who was in and who was bowling.
                if record.ledger.for_innings(record.state.innings).is_empty() {
                    record.state.striker = Some(removed.striker_id.clone());
                    record.state.non_striker = Some(removed.non_striker_id.clone());
                    record.state.current_bowler = Some(removed.bowler_id.clone());
                }
                Ok(())
            })
            .await;

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                self.metrics.increment_undos_rejected();
                self.logger.warn(
                    "undo_rejected",
                    &[
                        ("game_id", game_id.to_string()),
                        ("code", e.code().to_string()),
                    ],
                );
                return Err(e);
            }
        };

        self.metrics.increment_replay_runs();
        if replay_stats.entries_skipped > 0 || replay_stats.legacy_untagged > 0 {
            self.metrics
                .add_replay_entries_skipped(replay_stats.entries_skipped as u64);
            self.logger.warn(
                "replay_entries_skipped",
                &[
                    ("game_id", game_id.to_string()),
                    ("entries_skipped", replay_stats.entries_skipped.to_string()),
                    ("legacy_untagged", replay_stats.legacy_untagged.to_string()),
                ],
            );
        }

        self.metrics.increment_undos_applied();
        self.logger.info(
            "undo_applied",
            &[
                ("game_id", game_id.to_string()),
                ("ledger_len", saved.ledger.len().to_string()),
                ("score", saved.state.overs_display()),
            ],
        );
        Ok(self.publish(&saved.state))
    }

    /// Record a stoppage that cost the live innings `overs_lost` overs.
    ///
    /// Shrinks the allocation (never below the over in progress), books the
    /// stoppage for resource accounting, and re-evaluates completion since
    /// losing overs can end the innings or the match on the spot.
    pub async fn record_interruption(
        &self,
        game_id: Uuid,
        overs_lost: u32,
    ) -> ServiceResult<SnapshotView> {
        let saved = self
            .mutate(game_id, |record| {
                let state = &mut record.state;
                if state.is_completed() {
                    return Err(ServiceError::MatchCompleted);
                }
                let before = state
                    .balls_remaining()
                    .ok_or(ServiceError::InterruptionUnsupported)?;
                state.shrink_allotment(overs_lost);
                let after = state.balls_remaining().unwrap_or(before);

                state.interruptions.push(Interruption {
                    innings: state.innings,
                    balls_remaining_at_stop: before,
                    balls_remaining_at_resume: after,
                    wickets_at_stop: state.total_wickets,
                });
                evaluate_completion(state);
                Ok(())
            })
            .await?;

        self.metrics.increment_interruptions_recorded();
        self.logger.info(
            "interruption_recorded",
            &[
                ("game_id", game_id.to_string()),
                ("overs_lost", overs_lost.to_string()),
                (
                    "overs_allotted",
                    saved
                        .state
                        .overs_allotted
                        .map(|o| o.to_string())
                        .unwrap_or_default(),
                ),
            ],
        );
        Ok(self.publish(&saved.state))
    }

    /// Current view of a game, without publishing anything.
    pub async fn snapshot(&self, game_id: Uuid) -> ServiceResult<SnapshotView> {
        let record = self.store.load_game(game_id).await?;
        self.metrics.increment_snapshots_built();
        Ok(build_view(&record.state, &self.table))
    }

    /// The full stored record, state and ledger together.
    pub async fn load_record(&self, game_id: Uuid) -> ServiceResult<GameRecord> {
        Ok(self.store.load_game(game_id).await?)
    }

    pub async fn list_games(&self) -> ServiceResult<Vec<Uuid>> {
        Ok(self.store.list_games().await?)
    }

    /// Load-apply-save under the game's write lock.
    ///
    /// `apply` must be pure over the record (no side effects beyond it): on
    /// a version conflict it runs again against a freshly loaded record.
    async fn mutate<F>(&self, game_id: Uuid, mut apply: F) -> ServiceResult<GameRecord>
    where
        F: FnMut(&mut GameRecord) -> ServiceResult<()>,
    {
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        let mut retried = false;
        loop {
            let mut record = self.store.load_game(game_id).await?;
            apply(&mut record)?;
            match self.store.save_game(record).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_retryable() && !retried => {
                    retried = true;
                    self.metrics.increment_store_conflicts();
                    self.logger.warn(
                        "save_conflict_retry",
                        &[("game_id", game_id.to_string())],
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn lock_for(&self, game_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.game_locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(locks.entry(game_id).or_default())
    }

    fn publish(&self, state: &MatchState) -> SnapshotView {
        let view = build_view(state, &self.table);
        self.metrics.increment_snapshots_built();
        let channel = DeltaBroadcaster::channel_for(state.game_id);
        let report = self.broadcaster.emit(state.game_id, &channel, &view);
        if !report.delivered {
            self.logger.warn(
                "broadcast_failed",
                &[
                    ("game_id", state.game_id.to_string()),
                    ("channel", channel),
                    ("seq", report.seq.to_string()),
                ],
            );
        }
        view
    }
}

impl std::fmt::Debug for MatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchService").finish_non_exhaustive()
    }
}

/// Assemble the engine input for a request from the state's own pointers.
fn build_input(state: &MatchState, request: &BallRequest) -> ServiceResult<BallInput> {
    let striker_id = state.striker.clone().ok_or(ServiceError::OpenersNotSet)?;
    let non_striker_id = state
        .non_striker
        .clone()
        .ok_or(ServiceError::OpenersNotSet)?;
    let bowler_id = state
        .current_bowler
        .clone()
        .ok_or(ServiceError::BowlerNotSet)?;

    let wicket = match &request.wicket {
        None => None,
        Some(claim) => Some(validate::resolve_wicket(state, claim)?),
    };

    Ok(BallInput {
        striker_id,
        non_striker_id,
        bowler_id,
        runs: request.runs,
        extra: crate::ledger::normalize::normalize_extra(request.extra.as_deref()),
        wicket,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{BroadcastPolicy, ChannelHub, Transport};
    use crate::service::request::WicketRequest;
    use crate::store::MemoryStore;

    fn sheet(name: &str, prefix: &str) -> TeamSheet {
        TeamSheet::new(name, (1..=11).map(|n| format!("{prefix}{n}")).collect())
    }

    fn service() -> (MatchService, Arc<ChannelHub>) {
        let hub = Arc::new(ChannelHub::new());
        let metrics = Arc::new(MetricsRegistry::new());
        let broadcaster = Arc::new(DeltaBroadcaster::new(
            Arc::clone(&hub) as Arc<dyn Transport>,
            BroadcastPolicy::default(),
            Arc::clone(&metrics),
        ));
        let service = MatchService::new(
            Arc::new(MemoryStore::new()),
            broadcaster,
            Arc::new(ResourceTable::standard()),
            Arc::new(Logger::disabled()),
            metrics,
        );
        (service, hub)
    }

    async fn started_match(service: &MatchService) -> Uuid {
        let game_id = service
            .create_match(
                sheet("Harbour CC", "h"),
                sheet("Valley CC", "v"),
                MatchRules::default(),
            )
            .await
            .unwrap();
        service.set_openers(game_id, "h1", "h2").await.unwrap();
        service.start_over(game_id, "v1").await.unwrap();
        game_id
    }

    #[tokio::test]
    async fn test_create_match_rejects_bad_teams() {
        let (service, _) = service();
        let err = service
            .create_match(
                sheet("Harbour CC", "h"),
                sheet("Harbour CC", "h"),
                MatchRules::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTeams(_)));
    }

    #[tokio::test]
    async fn test_score_ball_happy_path() {
        let (service, _) = service();
        let game_id = started_match(&service).await;

        let view = service
            .score_ball(game_id, &BallRequest::runs(4))
            .await
            .unwrap();
        assert_eq!(view.score.runs, 4);
        assert_eq!(view.score.overs, "0.1");
        assert_eq!(view.batsmen.striker.as_deref(), Some("h1"));

        let record = service.load_record(game_id).await.unwrap();
        assert_eq!(record.ledger.len(), 1);
        assert_eq!(record.state.batting_card["h1"].fours, 1);
        assert_eq!(service.metrics().snapshot().balls_scored, 1);
    }

    #[tokio::test]
    async fn test_ball_rejected_without_bowler() {
        let (service, _) = service();
        let game_id = service
            .create_match(
                sheet("Harbour CC", "h"),
                sheet("Valley CC", "v"),
                MatchRules::default(),
            )
            .await
            .unwrap();
        service.set_openers(game_id, "h1", "h2").await.unwrap();

        let err = service
            .score_ball(game_id, &BallRequest::runs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BowlerNotSet));
        assert_eq!(service.metrics().snapshot().balls_rejected, 1);
        assert_eq!(service.metrics().snapshot().balls_scored, 0);
    }

    #[tokio::test]
    async fn test_over_boundary_demands_new_bowler() {
        let (service, _) = service();
        let game_id = started_match(&service).await;

        for _ in 0..6 {
            service
                .score_ball(game_id, &BallRequest::runs(0))
                .await
                .unwrap();
        }
        let err = service
            .score_ball(game_id, &BallRequest::runs(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NewOverRequired));

        // The same bowler cannot take the next over.
        let err = service.start_over(game_id, "v1").await.unwrap_err();
        assert!(matches!(err, ServiceError::ConsecutiveOvers(_)));
        service.start_over(game_id, "v2").await.unwrap();
        service
            .score_ball(game_id, &BallRequest::runs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wicket_flow_and_replacement() {
        let (service, _) = service();
        let game_id = started_match(&service).await;

        let view = service
            .score_ball(
                game_id,
                &BallRequest::runs(0).with_wicket(WicketRequest::kind("bowled")),
            )
            .await
            .unwrap();
        assert_eq!(view.score.wickets, 1);
        assert!(view.needs_new_batter);

        let err = service
            .score_ball(game_id, &BallRequest::runs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NewBatterRequired));

        let err = service.new_batter(game_id, "h2").await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyBatted(_)));

        let view = service.new_batter(game_id, "h3").await.unwrap();
        assert!(!view.needs_new_batter);
        assert_eq!(view.batsmen.striker.as_deref(), Some("h3"));

        service
            .score_ball(game_id, &BallRequest::runs(2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_undo_restores_previous_state() {
        let (service, _) = service();
        let game_id = started_match(&service).await;

        service
            .score_ball(game_id, &BallRequest::runs(1))
            .await
            .unwrap();
        let before = service.load_record(game_id).await.unwrap();

        service
            .score_ball(game_id, &BallRequest::extra("wd", 1))
            .await
            .unwrap();
        let view = service.undo_last(game_id).await.unwrap();

        assert_eq!(view.score.runs, 1);
        let after = service.load_record(game_id).await.unwrap();
        assert_eq!(after.state, before.state);
        assert_eq!(after.ledger, before.ledger);
        assert_eq!(service.metrics().snapshot().undos_applied, 1);
    }

    #[tokio::test]
    async fn test_undo_only_ball_restores_openers_and_bowler() {
        let (service, _) = service();
        let game_id = started_match(&service).await;

        service
            .score_ball(game_id, &BallRequest::runs(3))
            .await
            .unwrap();
        let view = service.undo_last(game_id).await.unwrap();

        assert_eq!(view.score.runs, 0);
        assert_eq!(view.batsmen.striker.as_deref(), Some("h1"));
        assert_eq!(view.batsmen.non_striker.as_deref(), Some("h2"));
        assert_eq!(view.current_bowler.as_deref(), Some("v1"));

        // Scoring resumes without re-picking anyone.
        service
            .score_ball(game_id, &BallRequest::runs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_undo_empty_ledger_rejected() {
        let (service, _) = service();
        let game_id = started_match(&service).await;

        let err = service.undo_last(game_id).await.unwrap_err();
        assert_eq!(err.code(), "SCORE_LEDGER_EMPTY");
        assert_eq!(service.metrics().snapshot().undos_rejected, 1);
    }

    #[tokio::test]
    async fn test_interruption_shrinks_and_can_end_innings() {
        let (service, _) = service();
        let game_id = started_match(&service).await;
        for _ in 0..6 {
            service
                .score_ball(game_id, &BallRequest::runs(1))
                .await
                .unwrap();
        }

        // Rain at the over break; play resumes in a 40-over innings.
        let view = service.record_interruption(game_id, 10).await.unwrap();
        assert!(!view.needs_new_innings);
        assert_eq!(service.metrics().snapshot().interruptions_recorded, 1);

        service.start_over(game_id, "v2").await.unwrap();
        service
            .score_ball(game_id, &BallRequest::runs(2))
            .await
            .unwrap();

        // A second stoppage washes the rest out. The allocation floors at
        // the over in progress, so the innings closes when that over does.
        service.record_interruption(game_id, 50).await.unwrap();
        for _ in 0..5 {
            service
                .score_ball(game_id, &BallRequest::runs(0))
                .await
                .unwrap();
        }
        let record = service.load_record(game_id).await.unwrap();
        assert!(record.state.pending_new_innings);
        assert_eq!(record.state.interruptions.len(), 2);
        assert_eq!(record.state.overs_allotted, Some(2));
    }

    #[tokio::test]
    async fn test_completed_match_locks_out_scoring() {
        let (service, _) = service();
        let mut rules = MatchRules::default();
        rules.overs_per_innings = Some(1);
        rules.players_per_side = 3;

        let game_id = service
            .create_match(
                TeamSheet::new("Harbour CC", vec!["h1".into(), "h2".into(), "h3".into()]),
                TeamSheet::new("Valley CC", vec!["v1".into(), "v2".into(), "v3".into()]),
                rules,
            )
            .await
            .unwrap();

        // One-over innings each; the chase wins with a boundary.
        service.set_openers(game_id, "h1", "h2").await.unwrap();
        service.start_over(game_id, "v1").await.unwrap();
        for _ in 0..6 {
            service
                .score_ball(game_id, &BallRequest::runs(0))
                .await
                .unwrap();
        }
        service.start_next_innings(game_id).await.unwrap();
        service.set_openers(game_id, "v1", "v2").await.unwrap();
        service.start_over(game_id, "h1").await.unwrap();
        let view = service
            .score_ball(game_id, &BallRequest::runs(4))
            .await
            .unwrap();
        assert!(view.result.is_some());

        let err = service
            .score_ball(game_id, &BallRequest::runs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MatchCompleted));
    }

    #[tokio::test]
    async fn test_every_mutation_publishes() {
        let (service, hub) = service();
        let game_id = service
            .create_match(
                sheet("Harbour CC", "h"),
                sheet("Valley CC", "v"),
                MatchRules::default(),
            )
            .await
            .unwrap();

        let channel = DeltaBroadcaster::channel_for(game_id);
        let mut rx = hub.subscribe(&channel);

        service.set_openers(game_id, "h1", "h2").await.unwrap();
        service.start_over(game_id, "v1").await.unwrap();
        service
            .score_ball(game_id, &BallRequest::runs(4))
            .await
            .unwrap();

        let mut seen = 0;
        while rx.try_recv().is_ok() {
            seen += 1;
        }
        assert_eq!(seen, 3, "one payload per mutation after subscribing");
    }

    #[tokio::test]
    async fn test_snapshot_does_not_broadcast() {
        let (service, hub) = service();
        let game_id = started_match(&service).await;

        let channel = DeltaBroadcaster::channel_for(game_id);
        let mut rx = hub.subscribe(&channel);
        let view = service.snapshot(game_id).await.unwrap();
        assert_eq!(view.batting_team, "Harbour CC");
        assert!(rx.try_recv().is_err());
    }
}

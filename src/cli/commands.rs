//! CLI command implementations.
//!
//! `replay` rebuilds a match offline from a delivery log file. `simulate`
//! drives a synthetic match through the same service path live traffic
//! takes. `feed` is the line protocol: JSON commands in on stdin, JSON
//! responses out on stdout, games persisted between sessions.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::broadcast::{BroadcastPolicy, ChannelHub, DeltaBroadcaster, Transport};
use crate::dls::ResourceTable;
use crate::ledger::{DeliveryLog, Dismissal, FIRST_INNINGS, SECOND_INNINGS};
use crate::observability::{Logger, MetricsRegistry, Severity};
use crate::rebuild::rebuild_and_recompute;
use crate::service::{BallRequest, MatchService, WicketRequest};
use crate::snapshot::build_view;
use crate::state::{BattingEntry, InningsRecord, MatchRules, MatchState, TeamSheet};
use crate::store::{FileStore, GameStore, MemoryStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_commands, write_error, write_lines, write_response};

/// Main CLI entry point.
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Replay {
            ledger,
            overs,
            json,
        } => replay(&ledger, overs, json),
        Command::Simulate {
            overs,
            seed,
            data_dir,
            verbose,
        } => block_on(simulate(overs, seed, data_dir.as_deref(), verbose)),
        Command::Feed { data_dir } => block_on(feed(&data_dir)),
    }
}

/// Drive an async command to completion on a fresh runtime.
fn block_on<F>(future: F) -> CliResult<()>
where
    F: std::future::Future<Output = CliResult<()>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime_error(format!("Failed to create tokio runtime: {}", e)))?;
    rt.block_on(future)
}

/// Rebuild a match from a delivery log file and print the scoreboard.
///
/// The rosters are harvested from the log itself: batters of the first
/// innings and bowlers of the second form one side, the mirror set the
/// other. Malformed entries are skipped and counted, never fatal.
pub fn replay(ledger_path: &Path, overs: Option<u32>, as_json: bool) -> CliResult<()> {
    let content = fs::read_to_string(ledger_path).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", ledger_path.display(), e))
    })?;
    let document: Value = serde_json::from_str(&content)
        .map_err(|e| CliError::bad_ledger(format!("Invalid ledger JSON: {}", e)))?;
    let entries = extract_entries(document)?;
    let (log, parse_skipped) = DeliveryLog::from_value_lenient(entries)?;

    let metrics = MetricsRegistry::new();
    metrics.increment_replay_runs();
    metrics.add_replay_entries_skipped(parse_skipped as u64);

    let (home, away, rules) = harvest_match(&log, overs);
    let mut state = MatchState::new(Uuid::new_v4(), home, away, rules);

    let mut stats = rebuild_and_recompute(&mut state, &log);
    if !log.deduplicated_for_innings(SECOND_INNINGS).is_empty() && state.begin_second_innings() {
        let second = rebuild_and_recompute(&mut state, &log);
        stats.entries_seen += second.entries_seen;
        stats.entries_applied += second.entries_applied;
        stats.entries_skipped += second.entries_skipped;
        stats.corrections_superseded += second.corrections_superseded;
    }
    metrics.add_replay_entries_skipped(stats.entries_skipped as u64);

    if as_json {
        let table = ResourceTable::standard();
        let view = build_view(&state, &table);
        write_response(json!({
            "snapshot": serde_json::to_value(&view)?,
            "entries_applied": stats.entries_applied,
            "entries_skipped": stats.entries_skipped + parse_skipped,
            "corrections_superseded": stats.corrections_superseded,
            "legacy_untagged": log.legacy_untagged(),
        }))?;
    } else {
        write_lines(&render_scoreboard(&state))?;
    }
    Ok(())
}

/// Pull the delivery array out of whatever shape the file is.
///
/// Accepts a bare array, a game record (`{"ledger": [...], ...}`), or a
/// stored game document whose `payload` string wraps a game record.
fn extract_entries(document: Value) -> CliResult<Value> {
    match document {
        Value::Object(mut map) => {
            if let Some(entries) = map.remove("ledger") {
                return Ok(entries);
            }
            if let Some(Value::String(payload)) = map.remove("payload") {
                let inner: Value = serde_json::from_str(&payload)
                    .map_err(|e| CliError::bad_ledger(format!("Invalid stored payload: {}", e)))?;
                return extract_entries(inner);
            }
            Err(CliError::bad_ledger(
                "expected a delivery array, a game record, or a stored game document",
            ))
        }
        other => Ok(other),
    }
}

/// Derive team sheets and rules from the log alone.
fn harvest_match(log: &DeliveryLog, overs: Option<u32>) -> (TeamSheet, TeamSheet, MatchRules) {
    let mut first: Vec<String> = Vec::new();
    let mut second: Vec<String> = Vec::new();

    for entry in log.deduplicated() {
        let (batting, bowling) = if entry.effective_innings() == FIRST_INNINGS {
            (&mut first, &mut second)
        } else {
            (&mut second, &mut first)
        };
        push_unique(batting, &entry.striker_id);
        push_unique(batting, &entry.non_striker_id);
        if let Some(id) = entry.dismissed_id.as_deref() {
            push_unique(batting, id);
        }
        push_unique(bowling, &entry.bowler_id);
        if let Some(id) = entry.fielder_id.as_deref() {
            push_unique(bowling, id);
        }
    }

    let players = first.len().max(second.len()).max(2) as u32;
    let rules = MatchRules {
        overs_per_innings: overs,
        players_per_side: players,
        ..MatchRules::default()
    };
    (
        TeamSheet::new("Side 1", first),
        TeamSheet::new("Side 2", second),
        rules,
    )
}

fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|p| p == id) {
        list.push(id.to_string());
    }
}

/// Text scoreboard: one block per innings, archived and live.
fn render_scoreboard(state: &MatchState) -> Vec<String> {
    let bpo = state.rules.balls_per_over;
    let mut blocks: Vec<InningsRecord> = state.innings_history.clone();
    if !state.innings_archived(state.innings) {
        blocks.push(InningsRecord::capture(state));
    }

    let mut lines = Vec::new();
    for record in &blocks {
        lines.push(format!(
            "Innings {}: {} {}/{} ({}.{} ov)",
            record.innings,
            record.batting_team,
            record.runs,
            record.wickets,
            record.overs_completed,
            record.balls_this_over,
        ));
        for id in &record.batting_order {
            if let Some(entry) = record.batting_card.get(id) {
                lines.push(format!(
                    "  {:<14} {:>4} ({})  {}",
                    id,
                    entry.runs,
                    entry.balls_faced,
                    how_out(entry),
                ));
            }
        }
        if record.extras.total() > 0 {
            lines.push(format!(
                "  extras: {} (w {}, nb {}, b {}, lb {})",
                record.extras.total(),
                record.extras.wides,
                record.extras.no_balls,
                record.extras.byes,
                record.extras.leg_byes,
            ));
        }
        let bowling: Vec<String> = record
            .bowling_card
            .iter()
            .map(|(id, entry)| {
                let (overs, balls) = entry.overs(bpo);
                format!(
                    "{} {}.{}-{}-{}",
                    id, overs, balls, entry.runs_conceded, entry.wickets
                )
            })
            .collect();
        if !bowling.is_empty() {
            lines.push(format!("  bowling: {}", bowling.join(", ")));
        }
        if !record.fall_of_wickets.is_empty() {
            let fow: Vec<String> = record
                .fall_of_wickets
                .iter()
                .map(|f| format!("{}/{} ({}, {}.{})", f.score, f.wicket, f.batter_id, f.over, f.ball))
                .collect();
            lines.push(format!("  fow: {}", fow.join(", ")));
        }
    }

    if let Some(target) = state.target {
        if state.result.is_none() {
            lines.push(format!("Target: {}", target));
        }
    }
    if let Some(result) = &state.result {
        lines.push(format!("Result: {}", result));
    }
    lines
}

/// The card's how-out column.
fn how_out(entry: &BattingEntry) -> String {
    if !entry.out {
        return "not out".to_string();
    }
    let bowler = entry.dismissed_by.as_deref().unwrap_or("-");
    match entry.dismissal {
        Some(Dismissal::Bowled) => format!("b {}", bowler),
        Some(Dismissal::Caught) => match entry.fielder.as_deref() {
            Some(fielder) => format!("c {} b {}", fielder, bowler),
            None => format!("c - b {}", bowler),
        },
        Some(Dismissal::Lbw) => format!("lbw b {}", bowler),
        Some(Dismissal::Stumped) => match entry.fielder.as_deref() {
            Some(keeper) => format!("st {} b {}", keeper, bowler),
            None => format!("st - b {}", bowler),
        },
        Some(Dismissal::HitWicket) => format!("hit wicket b {}", bowler),
        Some(Dismissal::RunOut) => match entry.fielder.as_deref() {
            Some(fielder) => format!("run out ({})", fielder),
            None => "run out".to_string(),
        },
        Some(Dismissal::ObstructingField) => "obstructing the field".to_string(),
        None => "out".to_string(),
    }
}

/// Score a synthetic match through the full live pipeline.
///
/// Everything goes through `MatchService`: validation, the engine, the
/// store, the broadcaster. The generator is seeded, so a given seed always
/// produces the same match, which makes this handy for eyeballing output
/// shapes and for smoke-testing a store directory.
pub async fn simulate(
    overs: u32,
    seed: u64,
    data_dir: Option<&Path>,
    verbose: bool,
) -> CliResult<()> {
    let store: Arc<dyn GameStore> = match data_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => Arc::new(MemoryStore::new()),
    };
    let hub = Arc::new(ChannelHub::new());
    let service = build_service(store, Arc::clone(&hub), verbose);

    let rules = MatchRules {
        overs_per_innings: Some(overs.max(1)),
        ..MatchRules::default()
    };
    let game_id = service
        .create_match(sheet("Seagulls", "sg"), sheet("Rovers", "rv"), rules)
        .await?;
    let mut feed_rx = hub.subscribe(&DeltaBroadcaster::channel_for(game_id));

    service.set_openers(game_id, "sg1", "sg2").await?;
    service.start_over(game_id, "rv11").await?;

    let mut rng = StdRng::seed_from_u64(seed);
    // Bounded so a scoring bug cannot spin forever: two innings of legal
    // balls plus generous slack for extras and administrative turns.
    let budget = (overs.max(1) as usize) * 6 * 2 * 3 + 64;
    for _ in 0..budget {
        let record = service.load_record(game_id).await?;
        let state = &record.state;

        if state.is_completed() {
            break;
        }
        if state.pending_new_innings {
            service.start_next_innings(game_id).await?;
            let refreshed = service.load_record(game_id).await?;
            let openers: Vec<&String> = refreshed.state.batting_team.players.iter().take(2).collect();
            service
                .set_openers(game_id, openers[0], openers[1])
                .await?;
            let bowler = pick_bowler(&refreshed.state);
            service.start_over(game_id, &bowler).await?;
        } else if state.pending_new_batter {
            let incoming = next_batter(state)
                .ok_or_else(|| CliError::match_failed("no replacement batter available"))?;
            service.new_batter(game_id, &incoming).await?;
        } else if state.pending_new_over {
            let bowler = pick_bowler(state);
            service.start_over(game_id, &bowler).await?;
        } else {
            let request = random_ball(&mut rng, state);
            service.score_ball(game_id, &request).await?;
        }

        if verbose {
            while let Ok(payload) = feed_rx.try_recv() {
                println!("{}", payload);
            }
        }
    }

    let record = service.load_record(game_id).await?;
    let mut lines = render_scoreboard(&record.state);
    let counters = service.metrics().snapshot();
    lines.push(format!(
        "-- game {}: {} balls, {} full + {} delta broadcasts",
        game_id, counters.balls_scored, counters.broadcasts_full, counters.broadcasts_delta,
    ));
    write_lines(&lines)?;
    Ok(())
}

fn sheet(name: &str, prefix: &str) -> TeamSheet {
    TeamSheet::new(name, (1..=11).map(|n| format!("{prefix}{n}")).collect())
}

fn build_service(
    store: Arc<dyn GameStore>,
    hub: Arc<ChannelHub>,
    verbose: bool,
) -> MatchService {
    let metrics = Arc::new(MetricsRegistry::new());
    let broadcaster = Arc::new(DeltaBroadcaster::new(
        hub as Arc<dyn Transport>,
        BroadcastPolicy::default(),
        Arc::clone(&metrics),
    ));
    let logger = if verbose {
        Arc::new(Logger::stderr(Severity::Info))
    } else {
        Arc::new(Logger::stderr(Severity::Warn))
    };
    MatchService::new(
        store,
        broadcaster,
        Arc::new(ResourceTable::standard()),
        logger,
        metrics,
    )
}

/// Next batter in: first on the sheet who has not yet appeared on the card.
fn next_batter(state: &MatchState) -> Option<String> {
    state
        .batting_team
        .players
        .iter()
        .find(|id| !state.batting_card.contains_key(*id))
        .cloned()
}

/// Rotate through the back five of the bowling sheet, never repeating the
/// over just bowled.
fn pick_bowler(state: &MatchState) -> String {
    let sheet = &state.bowling_team.players;
    let take = sheet.len().min(5);
    let pool = &sheet[sheet.len() - take..];
    let mut idx = (state.overs_completed as usize) % pool.len();
    if Some(&pool[idx]) == state.last_over_bowler.as_ref() {
        idx = (idx + 1) % pool.len();
    }
    pool[idx].clone()
}

/// One weighted-random delivery.
fn random_ball(rng: &mut StdRng, state: &MatchState) -> BallRequest {
    let roll = rng.gen_range(0..100u32);
    match roll {
        0..=34 => BallRequest::runs(0),
        35..=59 => BallRequest::runs(1),
        60..=69 => BallRequest::runs(2),
        70..=71 => BallRequest::runs(3),
        72..=83 => BallRequest::runs(4),
        84..=89 => BallRequest::runs(6),
        90..=91 => BallRequest::extra("wd", 1),
        92 => BallRequest::extra("nb", rng.gen_range(0..=2)),
        93 => BallRequest::extra("b", rng.gen_range(1..=2)),
        94 => BallRequest::extra("lb", 1),
        _ => random_wicket(rng, state),
    }
}

fn random_wicket(rng: &mut StdRng, state: &MatchState) -> BallRequest {
    let fielder = {
        let sheet = &state.bowling_team.players;
        sheet[rng.gen_range(0..sheet.len())].clone()
    };
    match rng.gen_range(0..4u32) {
        0 => BallRequest::runs(0).with_wicket(WicketRequest::kind("bowled")),
        1 => BallRequest::runs(0).with_wicket(WicketRequest::kind("caught").by(fielder)),
        2 => BallRequest::runs(0).with_wicket(WicketRequest::kind("lbw")),
        _ => {
            let dismissed = if rng.gen_bool(0.5) {
                state.striker.clone()
            } else {
                state.non_striker.clone()
            };
            let claim = match dismissed {
                Some(id) => WicketRequest::kind("run out").of(id).by(fielder),
                None => WicketRequest::kind("run out").by(fielder),
            };
            BallRequest::runs(1).with_wicket(claim)
        }
    }
}

/// Serve line-delimited JSON commands over stdin.
///
/// One command per line, one response per line. A malformed command or a
/// refused operation answers with an error line and the session keeps
/// going; only a broken stdin ends it.
pub async fn feed(data_dir: &Path) -> CliResult<()> {
    let store: Arc<dyn GameStore> = Arc::new(FileStore::open(data_dir)?);
    let hub = Arc::new(ChannelHub::new());
    let service = build_service(store, hub, false);

    for command in read_commands() {
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                write_error(e.code_str(), e.message())?;
                // A broken stdin ends the session; a bad line does not.
                if e.code() == &super::errors::CliErrorCode::IoError {
                    break;
                }
                continue;
            }
        };
        match parse_command(&command) {
            Ok(op) => match apply_command(&service, op).await {
                Ok(data) => write_response(data)?,
                Err(e) => write_error(e.code(), &e.to_string())?,
            },
            Err(e) => write_error(e.code_str(), e.message())?,
        }
    }
    Ok(())
}

/// One decoded feed command.
#[derive(Debug)]
enum FeedOp {
    Create {
        batting: TeamSheet,
        bowling: TeamSheet,
        rules: MatchRules,
    },
    Openers {
        game_id: Uuid,
        striker: String,
        non_striker: String,
    },
    Over {
        game_id: Uuid,
        bowler: String,
    },
    Ball {
        game_id: Uuid,
        request: BallRequest,
    },
    Batter {
        game_id: Uuid,
        player: String,
    },
    Innings {
        game_id: Uuid,
    },
    Undo {
        game_id: Uuid,
    },
    Interruption {
        game_id: Uuid,
        overs_lost: u32,
    },
    Snapshot {
        game_id: Uuid,
    },
    Games,
}

/// Decode a feed line into an operation. Shape problems surface here;
/// rule problems surface from the service.
fn parse_command(command: &Value) -> CliResult<FeedOp> {
    let op = command
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::bad_command("missing `op` field"))?;

    match op {
        "create" => Ok(FeedOp::Create {
            batting: field_sheet(command, "batting")?,
            bowling: field_sheet(command, "bowling")?,
            rules: match command.get("rules") {
                Some(value) => serde_json::from_value(value.clone())
                    .map_err(|e| CliError::bad_command(format!("Invalid rules: {}", e)))?,
                None => MatchRules::default(),
            },
        }),
        "openers" => Ok(FeedOp::Openers {
            game_id: field_game_id(command)?,
            striker: field_str(command, "striker")?,
            non_striker: field_str(command, "non_striker")?,
        }),
        "over" => Ok(FeedOp::Over {
            game_id: field_game_id(command)?,
            bowler: field_str(command, "bowler")?,
        }),
        "ball" => Ok(FeedOp::Ball {
            game_id: field_game_id(command)?,
            request: serde_json::from_value(command.clone())
                .map_err(|e| CliError::bad_command(format!("Invalid ball: {}", e)))?,
        }),
        "batter" => Ok(FeedOp::Batter {
            game_id: field_game_id(command)?,
            player: field_str(command, "player")?,
        }),
        "innings" => Ok(FeedOp::Innings {
            game_id: field_game_id(command)?,
        }),
        "undo" => Ok(FeedOp::Undo {
            game_id: field_game_id(command)?,
        }),
        "interruption" => Ok(FeedOp::Interruption {
            game_id: field_game_id(command)?,
            overs_lost: command
                .get("overs_lost")
                .and_then(Value::as_u64)
                .ok_or_else(|| CliError::bad_command("missing `overs_lost` field"))?
                as u32,
        }),
        "snapshot" => Ok(FeedOp::Snapshot {
            game_id: field_game_id(command)?,
        }),
        "games" => Ok(FeedOp::Games),
        other => Err(CliError::bad_command(format!("unknown op `{}`", other))),
    }
}

async fn apply_command(
    service: &MatchService,
    op: FeedOp,
) -> Result<Value, crate::service::ServiceError> {
    match op {
        FeedOp::Create {
            batting,
            bowling,
            rules,
        } => {
            let game_id = service.create_match(batting, bowling, rules).await?;
            Ok(json!({ "game_id": game_id }))
        }
        FeedOp::Openers {
            game_id,
            striker,
            non_striker,
        } => view_json(service.set_openers(game_id, &striker, &non_striker).await?),
        FeedOp::Over { game_id, bowler } => {
            view_json(service.start_over(game_id, &bowler).await?)
        }
        FeedOp::Ball { game_id, request } => {
            view_json(service.score_ball(game_id, &request).await?)
        }
        FeedOp::Batter { game_id, player } => {
            view_json(service.new_batter(game_id, &player).await?)
        }
        FeedOp::Innings { game_id } => view_json(service.start_next_innings(game_id).await?),
        FeedOp::Undo { game_id } => view_json(service.undo_last(game_id).await?),
        FeedOp::Interruption {
            game_id,
            overs_lost,
        } => view_json(service.record_interruption(game_id, overs_lost).await?),
        FeedOp::Snapshot { game_id } => view_json(service.snapshot(game_id).await?),
        FeedOp::Games => {
            let games = service.list_games().await?;
            Ok(json!({ "games": games }))
        }
    }
}

fn view_json(
    view: crate::snapshot::SnapshotView,
) -> Result<Value, crate::service::ServiceError> {
    Ok(serde_json::to_value(&view).unwrap_or_else(|_| json!({})))
}

fn field_str(command: &Value, name: &str) -> CliResult<String> {
    command
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CliError::bad_command(format!("missing `{}` field", name)))
}

fn field_game_id(command: &Value) -> CliResult<Uuid> {
    let raw = field_str(command, "game_id")?;
    Uuid::parse_str(&raw)
        .map_err(|e| CliError::bad_command(format!("Invalid game_id '{}': {}", raw, e)))
}

fn field_sheet(command: &Value, name: &str) -> CliResult<TeamSheet> {
    let value = command
        .get(name)
        .ok_or_else(|| CliError::bad_command(format!("missing `{}` field", name)))?;
    serde_json::from_value(value.clone())
        .map_err(|e| CliError::bad_command(format!("Invalid {} sheet: {}", name, e)))
}

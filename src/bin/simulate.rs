use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use keychase::controller::{ControllerOptions, EventLog, GameController};
use keychase::input::{InputSource, ScriptedInput};
use keychase::level::{load_levels, LevelSpec};
use keychase::levels::builtin_levels;
use keychase::logging;
use keychase::types::{Outcome, PresenterEvent, StateView};
use serde::Serialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1)]
    level: u32,
    #[arg(long)]
    keys: String,
    #[arg(long, default_value_t = 250)]
    step_ms: u64,
    #[arg(long, default_value_t = 0)]
    settle_ms: u64,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    levels: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    events: bool,
}

#[derive(Clone, Debug, Serialize)]
struct RunResult {
    #[serde(rename = "levelId")]
    level_id: u32,
    seed: u64,
    keys: usize,
    outcome: Outcome,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "playerMoves")]
    player_moves: u64,
    #[serde(rename = "enemyPasses")]
    enemy_passes: u64,
    #[serde(rename = "invalidMoves")]
    invalid_moves: usize,
    #[serde(rename = "finalState", skip_serializing_if = "Option::is_none")]
    final_state: Option<StateView>,
    anomalies: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::set_enabled(true);

    let levels_path = cli
        .levels
        .clone()
        .or_else(|| std::env::var("KEYCHASE_LEVELS").ok().map(PathBuf::from));
    let levels = match resolve_levels(levels_path.as_deref()) {
        Ok(levels) => levels,
        Err(error) => {
            eprintln!("[keychase] {error}");
            std::process::exit(2);
        }
    };
    let Some(index) = levels.iter().position(|level| level.id == cli.level) else {
        eprintln!("[keychase] no level with id {}", cli.level);
        std::process::exit(2);
    };

    let seed = cli.seed.unwrap_or(1);
    let keys: Vec<&str> = cli.keys.split_whitespace().collect();
    logging::emit(
        "info",
        "run_started",
        json!({ "levelId": cli.level, "seed": seed, "keys": keys.len() }),
    );

    let (result, events) = run(levels, index, &keys, seed, cli.step_ms, cli.settle_ms);

    if cli.events {
        for event in &events {
            match serde_json::to_string(event) {
                Ok(text) => println!("{text}"),
                Err(error) => eprintln!("[keychase] failed to encode event: {error}"),
            }
        }
    }

    match serde_json::to_string(&result) {
        Ok(text) => println!("{text}"),
        Err(error) => {
            eprintln!("[keychase] failed to encode result: {error}");
            std::process::exit(2);
        }
    }

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &result) {
            logging::emit(
                "error",
                "summary_write_failed",
                json!({ "path": path.to_string_lossy(), "error": error }),
            );
            std::process::exit(2);
        }
    }

    logging::emit(
        "info",
        "run_finished",
        json!({
            "outcome": result.outcome,
            "durationMs": result.duration_ms,
            "anomalyCount": result.anomalies.len(),
        }),
    );
    if !result.anomalies.is_empty() {
        std::process::exit(1);
    }
}

fn resolve_levels(path: Option<&Path>) -> Result<Vec<LevelSpec>, String> {
    match path {
        Some(path) => load_levels(path),
        None => Ok(builtin_levels()),
    }
}

fn run(
    levels: Vec<LevelSpec>,
    index: usize,
    keys: &[&str],
    seed: u64,
    step_ms: u64,
    settle_ms: u64,
) -> (RunResult, Vec<PresenterEvent>) {
    let level = levels[index].clone();
    // The played level must stay loaded after a win.
    let options = ControllerOptions {
        seed,
        advance_delay_ms: u64::MAX,
        ..ControllerOptions::default()
    };
    let mut controller = GameController::new(levels, EventLog::new(), options);
    controller.load_level(index);

    let mut input = ScriptedInput::evenly_spaced(keys, step_ms);
    while let Some(event) = input.next_event() {
        controller.advance_to(event.at_ms);
        if is_finished(&controller) {
            break;
        }
        controller.handle_key(&event.key);
    }
    controller.advance(settle_ms);

    let events = controller.presenter().events().to_vec();
    let invalid_moves = events
        .iter()
        .filter(|event| matches!(event, PresenterEvent::InvalidMove { .. }))
        .count();

    let mut anomalies = Vec::new();
    for event in &events {
        if let PresenterEvent::StateChanged { view } = event {
            if view.level_id == level.id {
                anomalies.extend(collect_view_anomalies(&level, view));
            }
        }
    }
    anomalies.dedup();

    let final_state = controller
        .state()
        .map(|state| state.view())
        .filter(|view| view.level_id == level.id);
    let outcome = final_state
        .as_ref()
        .map(|view| view.outcome)
        .unwrap_or(Outcome::InProgress);
    let (player_moves, enemy_passes) = final_state
        .as_ref()
        .map(|view| (view.player_moves, view.enemy_passes))
        .unwrap_or((0, 0));

    let result = RunResult {
        level_id: level.id,
        seed,
        keys: keys.len(),
        outcome,
        duration_ms: controller.now_ms(),
        player_moves,
        enemy_passes,
        invalid_moves,
        final_state,
        anomalies,
    };
    (result, events)
}

fn is_finished(controller: &GameController<EventLog>) -> bool {
    controller
        .state()
        .is_some_and(|state| state.outcome().is_terminal())
}

fn collect_view_anomalies(level: &LevelSpec, view: &StateView) -> Vec<String> {
    let mut anomalies = Vec::new();
    if level.is_blocked(&view.player) {
        anomalies.push(format!("player on blocked key {}", view.player));
    }
    for enemy in &view.enemies {
        if level.is_blocked(&enemy.pos) && enemy.pos != level_start_of(level, &enemy.id) {
            anomalies.push(format!("enemy {} on blocked key {}", enemy.id, enemy.pos));
        }
        if enemy.pos.starts_with("Space") {
            anomalies.push(format!("enemy {} on the bridge", enemy.id));
        }
    }
    let untouched = view.player_moves == 0 && view.enemy_passes == 0;
    if view.outcome == Outcome::InProgress
        && !untouched
        && view.enemies.iter().any(|enemy| enemy.pos == view.player)
    {
        anomalies.push("enemy shares the player key while game is running".to_string());
    }
    anomalies
}

fn level_start_of<'a>(level: &'a LevelSpec, enemy_id: &str) -> &'a str {
    level
        .enemies
        .iter()
        .find(|enemy| enemy.id == enemy_id)
        .map(|enemy| enemy.start_cell.as_str())
        .unwrap_or_default()
}

fn write_summary(path: &Path, result: &RunResult) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("failed to create {}: {error}", parent.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(result).map_err(|error| error.to_string())?;
    fs::write(path, text).map_err(|error| format!("failed to write {}: {error}", path.display()))
}

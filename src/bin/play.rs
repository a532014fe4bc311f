use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use keychase::controller::{ControllerOptions, GameController, Presenter};
use keychase::input::normalize_key;
use keychase::level::{load_levels, LevelSpec};
use keychase::levels::builtin_levels;
use keychase::logging;
use keychase::presenters::{JsonLinePresenter, TextPresenter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

const FRAME_MS: u64 = 50;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    levels: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    start: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    log: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::set_enabled(cli.log);

    let levels = match resolve_levels(&cli) {
        Ok(levels) => levels,
        Err(error) => {
            eprintln!("[keychase] {error}");
            std::process::exit(2);
        }
    };
    let Some(index) = levels.iter().position(|level| level.id == cli.start) else {
        eprintln!("[keychase] no level with id {}", cli.start);
        std::process::exit(2);
    };
    let seed = cli
        .seed
        .or_else(|| {
            std::env::var("KEYCHASE_SEED")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
        })
        .unwrap_or(1);
    let options = ControllerOptions {
        seed,
        ..ControllerOptions::default()
    };

    let result = if cli.json {
        let presenter = JsonLinePresenter::new(io::stdout());
        run_loop(GameController::new(levels, presenter, options), index).await
    } else {
        let presenter = TextPresenter::new(io::stdout());
        run_loop(GameController::new(levels, presenter, options), index).await
    };
    if let Err(error) = result {
        eprintln!("[keychase] input error: {error}");
        std::process::exit(1);
    }
}

fn resolve_levels(cli: &Cli) -> Result<Vec<LevelSpec>, String> {
    let path = cli
        .levels
        .clone()
        .or_else(|| std::env::var("KEYCHASE_LEVELS").ok().map(PathBuf::from));
    match path {
        Some(path) => load_levels(&path),
        None => Ok(builtin_levels()),
    }
}

async fn run_loop<P: Presenter>(mut controller: GameController<P>, index: usize) -> io::Result<()> {
    let started = Instant::now();
    controller.load_level(index);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut frame = tokio::time::interval(Duration::from_millis(FRAME_MS));
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim() == ":quit" {
                    break;
                }
                controller.advance_to(elapsed_ms(started));
                for raw in split_keys(&line) {
                    match normalize_key(&raw) {
                        Some(key) => controller.handle_key(&key),
                        None => eprintln!("[keychase] unknown key {raw:?}"),
                    }
                }
            }
            _ = frame.tick() => {
                controller.advance_to(elapsed_ms(started));
            }
        }
    }
    Ok(())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn split_keys(line: &str) -> Vec<String> {
    if !line.is_empty() && line.trim().is_empty() {
        return vec![" ".to_string()];
    }
    line.split_whitespace().map(str::to_string).collect()
}

mod config;
mod leaderboard;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twenty48_core::engine::Direction;
use twenty48_core::Game;

use config::Config;
use leaderboard::Leaderboard;

#[derive(Parser, Debug)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed the tile spawner for a reproducible session.
    #[arg(long)]
    seed: Option<u64>,
    /// Path to the leaderboard database (overrides the config file).
    #[arg(long, value_name = "FILE")]
    leaderboard: Option<PathBuf>,
    /// Tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move(Direction),
    Undo,
    New,
    Quit,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => Config::from_toml(path)?,
        None => Config::default(),
    };
    let db_path = args.leaderboard.unwrap_or(config.leaderboard.path);
    let mut leaderboard = Leaderboard::open(&db_path)
        .with_context(|| format!("failed to open leaderboard at {}", db_path.display()))?;
    info!(best = leaderboard.best(), db = %db_path.display(), "leaderboard ready");

    // Build the slide tables up front rather than on the first move.
    twenty48_core::engine::init();
    let mut game = match args.seed {
        Some(seed) => Game::from_seed(seed),
        None => Game::new(),
    };

    let stdin = io::stdin();
    run(&mut game, &mut leaderboard, stdin.lock())
}

fn run<R: BufRead>(game: &mut Game, leaderboard: &mut Leaderboard, input: R) -> Result<()> {
    let mut recorded = false;
    render(game);
    prompt()?;
    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let command = match parse_command(&line) {
            Some(command) => command,
            None => {
                if !line.trim().is_empty() {
                    println!("commands: up/down/left/right (or w/a/s/d), undo, new, quit");
                }
                prompt()?;
                continue;
            }
        };
        match command {
            Command::Move(dir) => {
                if !game.apply(dir) {
                    println!("nothing moved");
                }
            }
            Command::Undo => {
                if !game.undo() {
                    println!("nothing to undo");
                }
            }
            Command::New => {
                game.reset();
                recorded = false;
            }
            Command::Quit => break,
        }
        render(game);
        if game.is_over() && !recorded {
            recorded = true;
            finish_game(game.score(), leaderboard);
        }
        prompt()?;
    }
    Ok(())
}

/// Game-end bookkeeping: log the final score and push it to the
/// leaderboard. A write failure is a warning, never fatal to the loop.
fn finish_game(score: u64, leaderboard: &mut Leaderboard) {
    info!(score, "game over");
    match leaderboard.record(score) {
        Ok(true) => println!("game over -- new best score: {score}"),
        Ok(false) => println!(
            "game over -- score {score}, best {}",
            leaderboard.best()
        ),
        Err(err) => {
            warn!(%err, "failed to record score");
            println!("game over -- score {score}");
        }
    }
    println!("type 'new' for another game, 'undo' to step back, or 'quit'");
}

fn render(game: &Game) {
    println!("{}", game.board());
    println!("score: {}", game.score());
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")?;
    Ok(())
}

fn parse_command(input: &str) -> Option<Command> {
    if let Some(dir) = Direction::from_text(input) {
        return Some(Command::Move(dir));
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "w" => Some(Command::Move(Direction::Up)),
        "s" => Some(Command::Move(Direction::Down)),
        "a" => Some(Command::Move(Direction::Left)),
        "d" => Some(Command::Move(Direction::Right)),
        "u" | "undo" => Some(Command::Undo),
        "n" | "new" => Some(Command::New),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_aliases() {
        assert_eq!(parse_command("left"), Some(Command::Move(Direction::Left)));
        assert_eq!(parse_command("W"), Some(Command::Move(Direction::Up)));
        assert_eq!(parse_command(" undo "), Some(Command::Undo));
        assert_eq!(parse_command("u"), Some(Command::Undo));
        assert_eq!(parse_command("new"), Some(Command::New));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("sideways"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn scripted_session_runs_to_completion() {
        let td = tempfile::tempdir().unwrap();
        let mut leaderboard = Leaderboard::open(td.path().join("leaderboard.db")).unwrap();
        let mut game = Game::from_seed(42);
        let script = b"left\nup\nright\ndown\nundo\nnew\nquit\n" as &[u8];
        run(&mut game, &mut leaderboard, script).unwrap();
        // The session ended on a fresh game.
        assert_eq!(game.score(), 0);
        assert_eq!(game.history_len(), 0);
    }
}

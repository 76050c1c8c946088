//! Marrakech simulator.
//!
//! Plays seeded games in which every player picks uniformly among its legal
//! actions, then prints the final standings. Useful as a smoke test and for
//! eyeballing rule changes.
//!
//! ```text
//! simulate --players 4 --seed 7 --games 3
//! RUST_LOG=marrakech=debug simulate --games 1
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marrakech::core::{GameConfig, GameRng, UserId};
use marrakech::events::{EventLog, GameEvent};
use marrakech::rules::{ActionOutcome, PlayerScore};
use marrakech::table::GameTable;

/// Play random Marrakech games.
#[derive(Debug, Parser)]
#[command(name = "simulate", version, about)]
struct Args {
    /// Players per game.
    #[arg(long, default_value_t = 2)]
    players: u8,

    /// Seed for dice and for the players' choices.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of games to play.
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Give up on a game after this many turns.
    #[arg(long, default_value_t = 1000)]
    max_turns: u32,

    /// TOML file overriding the standard rules.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            GameConfig::from_toml_str(&text).with_context(|| format!("loading {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    let table = GameTable::seeded(args.seed);
    let mut chooser = GameRng::new(args.seed.rotate_left(17));
    let users: Vec<UserId> = (1..=u64::from(args.players)).map(UserId).collect();

    for round in 1..=args.games {
        let mut log = EventLog::new();
        let id = table.create_seeded(config.clone(), &users, &mut log)?;
        info!(game = %id, round, "playing");

        let mut turns = 0;
        loop {
            let actions = table.legal_actions(id)?;
            let Some(&action) = chooser.choose(&actions) else {
                break;
            };
            if let ActionOutcome::Switched(_) = table.apply(id, action, &mut log)? {
                turns += 1;
                if turns >= args.max_turns {
                    warn!(game = %id, turns, "turn limit reached");
                    break;
                }
            }
        }

        let finished = log.events().iter().find_map(|event| match event {
            GameEvent::GameFinished { winner, reason, scores } => Some((*winner, *reason, scores.clone())),
            _ => None,
        });
        match finished {
            Some((winner, reason, scores)) => {
                let winner = winner.map_or_else(|| "nobody".to_string(), |u| u.to_string());
                println!("game {round}: {winner} wins after {turns} turns ({reason:?})");
                print_scores(&scores);
            }
            None => println!("game {round}: unfinished after {turns} turns"),
        }

        table.remove_game(id)?;
    }

    Ok(())
}

fn print_scores(scores: &[PlayerScore]) {
    for score in scores {
        println!(
            "  {:>2}. {:<9} {:<6} coins {:>3}  area {:>2}  total {:>3}{}",
            score.place,
            score.user.to_string(),
            score.color.as_str(),
            score.coins,
            score.visible_cells,
            score.total,
            if score.active { "" } else { "  (eliminated)" },
        );
    }
}

use std::fs;
use std::path::PathBuf;
use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde::Serialize;
use coup_engine::{Config, Coup, Decider, GameOutcome, HonestAi, RandomAi};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Bots {
    Random,
    Honest,
    /// alternate random and honest seats
    Mixed,
}

/// Plays simulated games of Coup between bots.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(short, long, default_value_t = 4)]
    players: usize,

    #[arg(short, long, default_value_t = 1)]
    games: usize,

    /// Seed of the first game, each later game adds one.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, value_enum, default_value_t = Bots::Random)]
    bots: Bots,

    /// JSON file with engine settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `max_turns` from the config file
    #[arg(long)]
    max_turns: Option<usize>,

    /// Only the target may counter Assassinate and Steal
    #[arg(long)]
    target_only_counters: bool,

    /// Write one row per game to this file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the final table of every game as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GameRow {
    game: usize,
    seed: u64,
    winner: Option<String>,
    turns: usize,
    outcome: String,
}

fn seats(bots: Bots, num_players: usize, seed: u64) -> Vec<(String, Box<dyn Decider>)> {
    (0..num_players)
        .map(|seat| {
            let honest = match bots {
                Bots::Random => false,
                Bots::Honest => true,
                Bots::Mixed => seat % 2 == 1,
            };
            let decider: Box<dyn Decider> = if honest {
                Box::new(HonestAi)
            } else {
                Box::new(RandomAi::new(seed.wrapping_mul(31).wrapping_add(seat as u64)))
            };
            let kind = if honest { "honest" } else { "random" };
            (format!("P{}-{kind}", seat + 1), decider)
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Config::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Config::default(),
    };
    if args.max_turns.is_some() {
        config.max_turns = args.max_turns;
    }
    if args.target_only_counters {
        config.target_only_counters = true;
    }

    let mut writer = match &args.csv {
        Some(path) => Some(csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?),
        None => None,
    };

    let mut wins = vec![0usize; args.players];
    for game in 0..args.games {
        let seed = args.seed.wrapping_add(game as u64);
        let mut coup = Coup::new(seats(args.bots, args.players, seed), config.clone(), seed)?;
        coup.set_observer(|report, _| info!("{report}"));

        let outcome = coup.play()?;
        let winner = coup.winner().map(|player_idx| coup.players()[player_idx].name().to_string());
        if let Some(player_idx) = coup.winner() {
            wins[player_idx] += 1;
        }
        info!("game {game} (seed {seed}) ended after {} turns: {outcome:?}", coup.turn());

        if args.json {
            println!("{}", coup.view(None).to_json()?);
        }

        if let Some(writer) = writer.as_mut() {
            let outcome = match outcome {
                GameOutcome::Winner(_) => "winner",
                GameOutcome::Draw => "draw",
                GameOutcome::TurnLimit => "turn_limit",
            };
            writer.serialize(GameRow { game, seed, winner, turns: coup.turn(), outcome: outcome.to_string() })?;
        }
    }

    if let Some(mut writer) = writer {
        writer.flush()?;
    }

    for (seat, count) in wins.iter().enumerate() {
        println!("seat {}: {count} wins", seat + 1);
    }

    Ok(())
}

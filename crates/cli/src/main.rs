mod bench;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};

use flotilla_shared::*;
use flotilla_sim::{run_match, Bot, BotConfig, JsonLinesNetworking, StrategyKind};

#[derive(Parser)]
#[command(name = "flotilla", about = "Fleet bot for a turn-based space strategy game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game over stdin/stdout, one JSON frame per line in and one
    /// JSON command array per line out
    Play {
        /// Seed for the strategy selector
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// auto, or a fixed strategy (basic, balanced, aggressive, mining)
        #[arg(long, default_value = "auto")]
        strategy: Seat,

        /// Per-turn time budget in milliseconds
        #[arg(long, default_value_t = TURN_BUDGET_MS)]
        budget_ms: u64,
    },

    /// Run one offline match in the built-in arena
    Run {
        /// Comma-separated seat list, one per player (auto or a strategy name)
        #[arg(long, value_delimiter = ',', default_value = "auto,auto")]
        seats: Vec<Seat>,

        /// Random seed for the arena and the bots
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: u32,

        #[arg(long, default_value_t = DEFAULT_SHIPS_PER_PLAYER)]
        ships: usize,

        #[arg(long, default_value_t = DEFAULT_PLANETS)]
        planets: usize,

        /// Output path for the match report JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Play many seeds in parallel and tally wins per seat
    Bench {
        #[arg(long, value_delimiter = ',', default_value = "auto,auto")]
        seats: Vec<Seat>,

        /// Number of seeds, starting from 0
        #[arg(long, default_value_t = 50)]
        seeds: u32,

        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: u32,

        /// Write per-match results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// A player slot: the adaptive selector, or one strategy for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat(pub Option<StrategyKind>);

impl Seat {
    pub fn bot(self, seed: u64) -> Bot {
        Bot::new(BotConfig {
            seed,
            strategy: self.0,
            ..Default::default()
        })
    }
}

impl FromStr for Seat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Seat(None)),
            other => other.parse().map(|kind| Seat(Some(kind))),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(kind) => write!(f, "{kind}"),
            None => f.write_str("auto"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            seed,
            strategy,
            budget_ms,
        } => cmd_play(seed, strategy, budget_ms),

        Commands::Run {
            seats,
            seed,
            max_turns,
            ships,
            planets,
            output,
        } => {
            let config = MatchConfig {
                seed,
                players: seats.len(),
                ships_per_player: ships,
                planets,
                max_turns,
                ..Default::default()
            };
            cmd_run(&seats, &config, output)
        }

        Commands::Bench {
            seats,
            seeds,
            max_turns,
            csv,
        } => bench::cmd_bench(&seats, seeds, max_turns, csv.as_deref()),
    }
}

fn cmd_play(seed: u64, strategy: Seat, budget_ms: u64) {
    let mut bot = Bot::new(BotConfig {
        seed,
        turn_budget: Duration::from_millis(budget_ms),
        strategy: strategy.0,
    });

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut net = JsonLinesNetworking::new(stdin.lock(), stdout.lock());

    if let Err(e) = bot.run(&mut net) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn cmd_run(seats: &[Seat], config: &MatchConfig, output: Option<PathBuf>) {
    let mut bots: Vec<Bot> = seats
        .iter()
        .enumerate()
        .map(|(i, seat)| seat.bot(config.seed.wrapping_add(i as u64)))
        .collect();

    let names: Vec<String> = seats.iter().map(|s| s.to_string()).collect();
    println!("Running match: {} (seed={})", names.join(" vs "), config.seed);

    let report = match run_match(config, &mut bots) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Invalid match setup: {e}");
            std::process::exit(1);
        }
    };

    println!();
    println!("=== Match Result ===");
    match report.winner {
        Some(w) => println!("Winner:     P{} ({})", w, seats[w as usize]),
        None => println!("Winner:     draw"),
    }
    println!("Reason:     {:?}", report.reason);
    println!("Turns:      {}", report.turns);
    println!();
    println!("--- Players ---");
    for p in &report.players {
        let path: Vec<String> = p.transitions.iter().map(|t| t.to.to_string()).collect();
        println!(
            "  P{} ({}): ships={}, planets={}, strategies={}, over_budget={}",
            p.id,
            seats[p.id as usize],
            p.ships,
            p.planets,
            path.join(" -> "),
            p.over_budget_turns
        );
    }

    if let Some(path) = output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => println!("\nReport written to {}", path.display()),
                Err(e) => eprintln!("\nFailed to write report: {}", e),
            },
            Err(e) => eprintln!("\nFailed to serialize report: {}", e),
        }
    }
}

use std::io::{self, Write};
use std::path::Path;

use rayon::prelude::*;

use flotilla_shared::*;
use flotilla_sim::{run_match, MatchReport};

use crate::Seat;

/// Totals for one seat across every benched seed.
#[derive(Debug, Default)]
struct SeatTally {
    wins: u32,
    ships: usize,
    planets: usize,
    over_budget_turns: u32,
}

fn run_seed(seats: &[Seat], seed: u64, max_turns: u32) -> Option<MatchReport> {
    let config = MatchConfig {
        seed,
        players: seats.len(),
        max_turns,
        ..Default::default()
    };
    let mut bots: Vec<_> = seats
        .iter()
        .enumerate()
        .map(|(i, seat)| seat.bot(seed.wrapping_add(i as u64)))
        .collect();
    match run_match(&config, &mut bots) {
        Ok(report) => Some(report),
        Err(e) => {
            log::error!("seed {seed}: {e}");
            None
        }
    }
}

pub fn cmd_bench(seats: &[Seat], seeds: u32, max_turns: u32, csv: Option<&Path>) {
    if !(2..=4).contains(&seats.len()) {
        eprintln!("Bench needs 2 to 4 seats, got {}.", seats.len());
        std::process::exit(1);
    }
    let labels: Vec<String> = seats.iter().map(|s| s.to_string()).collect();
    println!(
        "Bench: {} over {} seeds (max {} turns)",
        labels.join(" vs "),
        seeds,
        max_turns
    );

    let reports: Vec<MatchReport> = (0..seeds as u64)
        .into_par_iter()
        .filter_map(|seed| run_seed(seats, seed, max_turns))
        .collect();

    let mut tallies: Vec<SeatTally> = seats.iter().map(|_| SeatTally::default()).collect();
    let mut draws = 0u32;
    let mut turns = 0u64;
    for report in &reports {
        turns += report.turns as u64;
        match report.winner {
            Some(w) => tallies[w as usize].wins += 1,
            None => draws += 1,
        }
        for p in &report.players {
            let t = &mut tallies[p.id as usize];
            t.ships += p.ships;
            t.planets += p.planets;
            t.over_budget_turns += p.over_budget_turns;
        }
    }

    let n = reports.len().max(1) as f64;
    println!();
    println!(
        "{:<6} {:<12} {:>6} {:>8} {:>8} {:>8}",
        "seat", "strategy", "wins", "ships", "planets", "slow"
    );
    println!("{:-<54}", "");
    for (i, (label, t)) in labels.iter().zip(&tallies).enumerate() {
        println!(
            "P{:<5} {:<12} {:>6} {:>8.1} {:>8.1} {:>8}",
            i,
            label,
            t.wins,
            t.ships as f64 / n,
            t.planets as f64 / n,
            t.over_budget_turns
        );
    }
    println!();
    println!("Draws: {}, mean length: {:.1} turns", draws, turns as f64 / n);

    if let Some(path) = csv {
        match write_csv(path, &reports) {
            Ok(()) => println!("\nCSV written to {}", path.display()),
            Err(e) => eprintln!("\nFailed to write CSV: {}", e),
        }
    }
}

fn write_csv(path: &Path, reports: &[MatchReport]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "seed,turns,winner,reason,player,ships,planets,final_strategy")?;
    for r in reports {
        for p in &r.players {
            writeln!(
                file,
                "{},{},{},{:?},{},{},{},{}",
                r.seed,
                r.turns,
                r.winner.map_or_else(|| "draw".to_string(), |w| w.to_string()),
                r.reason,
                p.id,
                p.ships,
                p.planets,
                p.final_strategy.map_or_else(String::new, |k| k.to_string()),
            )?;
        }
    }
    file.flush()
}

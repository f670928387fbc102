use flotilla_shared::*;
use serde::Serialize;

use crate::bot::Bot;
use crate::physics::{ArenaState, ConfigError};
use crate::selector::Transition;
use crate::strategy::StrategyKind;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub ships: usize,
    pub planets: usize,
    pub over_budget_turns: u32,
    pub final_strategy: Option<StrategyKind>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub seed: u64,
    pub turns: u32,
    pub winner: Option<PlayerId>,
    pub reason: MatchEndReason,
    pub players: Vec<PlayerSummary>,
}

/// Run a deterministic match, one bot per player. Eliminated players stop
/// being asked for commands.
pub fn run_match(config: &MatchConfig, bots: &mut [Bot]) -> Result<MatchReport, ConfigError> {
    if bots.len() != config.players {
        return Err(ConfigError::BotCount {
            expected: config.players,
            got: bots.len(),
        });
    }
    let mut state = ArenaState::new(config)?;
    let mut over_budget = vec![0u32; bots.len()];

    while !state.is_terminal() {
        let commands: Vec<Vec<Command>> = bots
            .iter_mut()
            .enumerate()
            .map(|(i, bot)| {
                let id = i as PlayerId;
                if state.fleet_size(id) == 0 {
                    return Vec::new();
                }
                let report = bot.play_turn(&state.snapshot_for(id));
                if report.over_budget {
                    over_budget[i] += 1;
                }
                report.commands
            })
            .collect();
        state.step(&commands);
    }

    let (winner, reason) = state.outcome();
    log::info!(
        "seed {} finished after {} turns: winner {:?} by {:?}",
        config.seed,
        state.turn,
        winner,
        reason
    );

    let players = bots
        .iter()
        .enumerate()
        .map(|(i, bot)| {
            let id = i as PlayerId;
            PlayerSummary {
                id,
                ships: state.fleet_size(id),
                planets: state.planets_owned(id),
                over_budget_turns: over_budget[i],
                final_strategy: bot.selector().active().map(|s| s.kind()),
                transitions: bot.selector().transitions().to_vec(),
            }
        })
        .collect();

    Ok(MatchReport {
        seed: config.seed,
        turns: state.turn,
        winner,
        reason,
        players,
    })
}

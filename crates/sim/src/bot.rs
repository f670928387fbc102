use std::collections::HashMap;
use std::time::{Duration, Instant};

use flotilla_shared::*;
use serde::Serialize;

use crate::navigation::{DirectNavigator, Navigator};
use crate::networking::{NetError, Networking};
use crate::policy::Policy;
use crate::selector::StrategySelector;
use crate::strategy::StrategyKind;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub seed: u64,
    pub turn_budget: Duration,
    /// Run a single strategy for the whole game instead of the selector.
    pub strategy: Option<StrategyKind>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            turn_budget: Duration::from_millis(TURN_BUDGET_MS),
            strategy: None,
        }
    }
}

/// What happened during one decided turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    pub strategy: StrategyKind,
    pub commands: Vec<Command>,
    pub held: Vec<EntityId>,
    pub elapsed_us: u64,
    pub over_budget: bool,
}

/// One player: strategy selection, navigation and the turn budget.
pub struct Bot<N: Navigator = DirectNavigator> {
    config: BotConfig,
    selector: StrategySelector,
    nav: N,
}

impl Bot<DirectNavigator> {
    pub fn new(config: BotConfig) -> Self {
        Self::with_navigator(config, DirectNavigator::default())
    }
}

impl<N: Navigator> Bot<N> {
    pub fn with_navigator(config: BotConfig, nav: N) -> Self {
        let selector = match config.strategy {
            Some(kind) => StrategySelector::pinned(kind),
            None => StrategySelector::new(config.seed),
        };
        Self {
            config,
            selector,
            nav,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    /// Decide one turn. The result always holds exactly one command per ship
    /// we own, in snapshot order.
    pub fn play_turn(&mut self, world: &WorldSnapshot) -> TurnReport {
        let start = Instant::now();

        let strategy = self.selector.choose(world);
        let decided = strategy.decide(world, &self.nav);
        let kind = strategy.kind();
        let held = strategy.guard().map(|g| g.held()).unwrap_or_default();

        let commands = complete_batch(decided, world);

        let elapsed = start.elapsed();
        let over_budget = elapsed > self.config.turn_budget;
        if over_budget {
            log::warn!(
                "turn {} took {:?}, over the {:?} budget",
                world.turn(),
                elapsed,
                self.config.turn_budget
            );
        }

        TurnReport {
            turn: world.turn(),
            strategy: kind,
            commands,
            held,
            elapsed_us: saturating_micros(elapsed),
            over_budget,
        }
    }

    /// Play until the transport reports the game is over. Returns the number
    /// of turns played.
    pub fn run(&mut self, net: &mut impl Networking) -> Result<u32, NetError> {
        let mut turns = 0;
        while let Some(world) = net.receive_snapshot()? {
            let report = self.play_turn(&world);
            net.send_commands(&report.commands)?;
            turns += 1;
        }
        log::info!("game over after {turns} turns");
        Ok(turns)
    }
}

fn saturating_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Keep the first command per own ship, fill gaps with `Noop`, drop anything
/// addressed to a ship we don't own.
fn complete_batch(decided: Vec<Command>, world: &WorldSnapshot) -> Vec<Command> {
    let mut by_ship: HashMap<EntityId, Command> = HashMap::with_capacity(decided.len());
    for cmd in decided {
        if world.my_ship(cmd.ship()).is_none() {
            log::warn!("dropping command for unknown ship {}", cmd.ship());
            continue;
        }
        by_ship.entry(cmd.ship()).or_insert(cmd);
    }
    world
        .my_ships()
        .map(|s| by_ship.get(&s.id).copied().unwrap_or(Command::noop(s.id)))
        .collect()
}

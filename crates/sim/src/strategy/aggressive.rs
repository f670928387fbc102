use flotilla_shared::*;

use super::engage;
use crate::collision::CollisionGuard;
use crate::navigation::Navigator;
use crate::policy::Policy;
use crate::ranker::{self, PoolWeights};
use crate::targets::{live_fleet, PlanetPolicy, TargetStore};

const UNTARGETED_ONLY: PoolWeights = PoolWeights {
    empty_planet: None,
    own_planet: None,
    targeted_enemy: None,
    untargeted_enemy: Some(1.0),
};

const TARGETED_ONLY: PoolWeights = PoolWeights {
    empty_planet: None,
    own_planet: None,
    targeted_enemy: Some(1.0),
    untargeted_enemy: None,
};

/// Ignores planets and hunts enemy ships: nearest one nobody chases yet,
/// otherwise the nearest one already being chased.
#[derive(Debug, Clone)]
pub struct AggressiveStrategy {
    pub(crate) targets: TargetStore,
    pub(crate) guard: CollisionGuard,
    keep: bool,
}

impl Default for AggressiveStrategy {
    fn default() -> Self {
        Self {
            targets: TargetStore::new(),
            guard: CollisionGuard::new(),
            keep: true,
        }
    }
}

impl AggressiveStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn command_for(&mut self, ship: &Ship, world: &WorldSnapshot, nav: &dyn Navigator) -> Command {
        if let Some(target @ Target::Ship(_)) = self.targets.get(ship.id, world) {
            return engage(ship, target, world, &mut self.targets, nav);
        }
        self.targets.remove(ship.id);

        let policy = PlanetPolicy::Uncapped;
        let best = ranker::rank(ship, world, &self.targets, &UNTARGETED_ONLY, policy)
            .into_iter()
            .next()
            .or_else(|| {
                ranker::rank(ship, world, &self.targets, &TARGETED_ONLY, policy)
                    .into_iter()
                    .next()
            });

        match best {
            Some(candidate) => {
                log::debug!("ship {} hunts {:?}", ship.id, candidate.target);
                engage(ship, candidate.target, world, &mut self.targets, nav)
            }
            None => {
                log::debug!("ship {} found no enemy to hunt", ship.id);
                self.keep = false;
                Command::noop(ship.id)
            }
        }
    }
}

impl Policy for AggressiveStrategy {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn decide(&mut self, world: &WorldSnapshot, nav: &dyn Navigator) -> Vec<Command> {
        self.keep = true;
        self.targets.revalidate(world);
        self.targets.cleanup(live_fleet(world));

        let commands: Vec<Command> = world
            .my_ships()
            .filter(|s| s.is_undocked())
            .map(|ship| self.command_for(ship, world, nav))
            .collect();

        self.guard.apply(commands, world, &self.targets)
    }

    /// False once a ship came up empty in the last decided turn.
    fn keep(&self, _world: &WorldSnapshot) -> bool {
        self.keep
    }
}

use flotilla_shared::*;

use super::engage;
use crate::collision::CollisionGuard;
use crate::navigation::Navigator;
use crate::policy::Policy;
use crate::ranker::{self, PoolWeights};
use crate::targets::{live_fleet, PlanetPolicy, TargetStore};

/// Empty planets first; an enemy close by is worth more when another of our
/// ships is already on it; our own planets are the last resort.
pub const BALANCED_WEIGHTS: PoolWeights = PoolWeights {
    empty_planet: Some(1.0),
    own_planet: Some(4.0),
    targeted_enemy: Some(2.0),
    untargeted_enemy: Some(2.5),
};

const PLANET_POLICY: PlanetPolicy = PlanetPolicy::CapacityAware;

/// Capacity-aware expansion mixed with opportunistic attacks. Never asks to
/// be replaced.
#[derive(Debug, Clone, Default)]
pub struct BalancedStrategy {
    pub(crate) targets: TargetStore,
    pub(crate) guard: CollisionGuard,
}

impl BalancedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn command_for(&mut self, ship: &Ship, world: &WorldSnapshot, nav: &dyn Navigator) -> Command {
        if let Some(target) = self.targets.get(ship.id, world) {
            if PLANET_POLICY.is_valid_target(target, world) {
                return engage(ship, target, world, &mut self.targets, nav);
            }
            log::debug!("ship {} drops target {:?}", ship.id, target);
            self.targets.remove(ship.id);
        }

        let ranked = ranker::rank(ship, world, &self.targets, &BALANCED_WEIGHTS, PLANET_POLICY);
        match ranked.first() {
            Some(best) => {
                log::debug!(
                    "ship {} picks {:?} ({:?}, distance {:.1})",
                    ship.id,
                    best.target,
                    best.pool,
                    best.distance
                );
                engage(ship, best.target, world, &mut self.targets, nav)
            }
            None => {
                log::debug!("ship {} can't find a good target anymore", ship.id);
                Command::noop(ship.id)
            }
        }
    }
}

impl Policy for BalancedStrategy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn decide(&mut self, world: &WorldSnapshot, nav: &dyn Navigator) -> Vec<Command> {
        self.targets.revalidate(world);
        self.targets.cleanup(live_fleet(world));

        let commands: Vec<Command> = world
            .my_ships()
            .filter(|s| s.is_undocked())
            .map(|ship| self.command_for(ship, world, nav))
            .collect();

        self.guard.apply(commands, world, &self.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::WorldBuilder;
    use crate::navigation::DirectNavigator;
    use test_log::test;

    #[test]
    fn test_target_persists_while_valid() {
        let nav = DirectNavigator::default();
        let mut balanced = BalancedStrategy::new();

        let turn0 = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 3)
            .planet(2, 60.0, 100.0, 3.0, 3)
            .build();
        balanced.decide(&turn0, &nav);
        assert_eq!(balanced.targets.peek(0), Some(Target::Planet(1)));

        // Ship moved: planet 2 is now slightly closer, but the remembered
        // target still holds and is not re-ranked.
        let turn1 = WorldBuilder::new(2)
            .turn(1)
            .ship(0, 0, 94.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 3)
            .planet(2, 60.0, 100.0, 3.0, 3)
            .build();
        balanced.decide(&turn1, &nav);
        assert_eq!(balanced.targets.peek(0), Some(Target::Planet(1)));
    }

    #[test]
    fn test_enemy_owned_planet_invalidates_target() {
        let nav = DirectNavigator::default();
        let mut balanced = BalancedStrategy::new();

        let turn0 = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 3)
            .planet(2, 60.0, 100.0, 3.0, 3)
            .build();
        balanced.decide(&turn0, &nav);
        assert_eq!(balanced.targets.peek(0), Some(Target::Planet(1)));

        let turn1 = WorldBuilder::new(2)
            .turn(1)
            .ship(0, 0, 107.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 3)
            .docked_ship(1, 0, 1)
            .planet(2, 60.0, 100.0, 3.0, 3)
            .build();
        balanced.decide(&turn1, &nav);
        // Re-ranked: the docked enemy (27 * 2.5) loses to the empty planet (47 * 1.0)
        assert_eq!(balanced.targets.peek(0), Some(Target::Planet(2)));
    }

    #[test]
    fn test_full_planet_invalidates_target() {
        let nav = DirectNavigator::default();
        let mut balanced = BalancedStrategy::new();

        let turn0 = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 2)
            .docked_ship(0, 5, 1)
            .planet(2, 60.0, 140.0, 3.0, 3)
            .build();
        balanced.decide(&turn0, &nav);
        assert_eq!(balanced.targets.peek(0), Some(Target::Planet(2)));

        let mut balanced = BalancedStrategy::new();
        balanced.targets.set(0, Target::Planet(1));
        let turn1 = WorldBuilder::new(2)
            .turn(1)
            .ship(0, 0, 100.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 2)
            .docked_ship(0, 5, 1)
            .docked_ship(0, 6, 1)
            .planet(2, 60.0, 140.0, 3.0, 3)
            .build();
        balanced.decide(&turn1, &nav);
        assert_eq!(balanced.targets.peek(0), Some(Target::Planet(2)));
    }

    #[test]
    fn test_own_planet_assignments_respect_cap() {
        // Planet 1 has room for six but already hosts two of ours. Four idle
        // ships are around it and nothing else is worth pursuing.
        let world = WorldBuilder::new(2)
            .planet(1, 100.0, 100.0, 5.0, 6)
            .docked_ship(0, 0, 1)
            .docked_ship(0, 1, 1)
            .ship(0, 2, 120.0, 100.0)
            .ship(0, 3, 80.0, 100.0)
            .ship(0, 4, 100.0, 120.0)
            .ship(0, 5, 100.0, 80.0)
            .build();
        let mut balanced = BalancedStrategy::new();
        balanced.decide(&world, &DirectNavigator::default());

        let planet = world.planet(1).unwrap();
        let claims = balanced.targets.claim_count(Target::Planet(1));
        assert_eq!(claims, 1);
        assert!(planet.docked_count() + claims <= MAX_OWN_DOCKINGS);
    }

    #[test]
    fn test_keep_is_always_true() {
        let world = WorldBuilder::new(2).ship(0, 0, 100.0, 100.0).build();
        let mut balanced = BalancedStrategy::new();
        balanced.decide(&world, &DirectNavigator::default());
        assert!(balanced.keep(&world));
    }
}

use flotilla_shared::*;

use super::engage;
use crate::navigation::Navigator;
use crate::policy::Policy;
use crate::ranker::{self, PoolWeights};
use crate::targets::{live_fleet, PlanetPolicy, TargetStore};

const PLANETS: PoolWeights = PoolWeights {
    empty_planet: Some(1.0),
    own_planet: Some(1.0),
    targeted_enemy: None,
    untargeted_enemy: None,
};

const ENEMIES: PoolWeights = PoolWeights {
    empty_planet: None,
    own_planet: None,
    targeted_enemy: Some(1.0),
    untargeted_enemy: Some(1.0),
};

/// An enemy is only preferred over a planet when it is less than half as far.
pub const ENEMY_DISTANCE_FACTOR: f64 = 2.0;

const PLANET_POLICY: PlanetPolicy = PlanetPolicy::Uncapped;

/// Nearest-object expansion without traffic control.
#[derive(Debug, Clone, Default)]
pub struct BasicStrategy {
    pub(crate) targets: TargetStore,
}

impl BasicStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn command_for(&mut self, ship: &Ship, world: &WorldSnapshot, nav: &dyn Navigator) -> Command {
        if let Some(target) = self.targets.get(ship.id, world) {
            if PLANET_POLICY.is_valid_target(target, world) {
                return engage(ship, target, world, &mut self.targets, nav);
            }
            self.targets.remove(ship.id);
        }

        match self.pick(ship, world) {
            Some(target) => engage(ship, target, world, &mut self.targets, nav),
            None => {
                log::debug!("ship {} has nothing left to pursue", ship.id);
                Command::noop(ship.id)
            }
        }
    }

    /// Nearest planet, unless the nearest enemy is less than half as far.
    fn pick(&self, ship: &Ship, world: &WorldSnapshot) -> Option<Target> {
        let nearest = |weights: &PoolWeights| {
            ranker::rank(ship, world, &self.targets, weights, PLANET_POLICY)
                .into_iter()
                .next()
        };
        match (nearest(&PLANETS), nearest(&ENEMIES)) {
            (Some(planet), Some(enemy)) => {
                if enemy.distance * ENEMY_DISTANCE_FACTOR < planet.distance {
                    Some(enemy.target)
                } else {
                    Some(planet.target)
                }
            }
            (planet, enemy) => planet.or(enemy).map(|c| c.target),
        }
    }
}

impl Policy for BasicStrategy {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn decide(&mut self, world: &WorldSnapshot, nav: &dyn Navigator) -> Vec<Command> {
        self.targets.revalidate(world);
        self.targets.cleanup(live_fleet(world));

        world
            .my_ships()
            .filter(|s| s.is_undocked())
            .map(|ship| self.command_for(ship, world, nav))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::WorldBuilder;
    use crate::navigation::DirectNavigator;

    #[test]
    fn test_prefers_planet_unless_enemy_twice_as_close() {
        let nav = DirectNavigator::default();

        // Planet 30 away, enemy 20 away: 20 * 2 > 30, go for the planet
        let world = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .ship(1, 0, 80.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 2)
            .build();
        let mut basic = BasicStrategy::new();
        basic.decide(&world, &nav);
        assert_eq!(basic.targets.peek(0), Some(Target::Planet(1)));

        // Enemy 10 away: 10 * 2 < 30, attack
        let world = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .ship(1, 0, 90.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 2)
            .build();
        let mut basic = BasicStrategy::new();
        basic.decide(&world, &nav);
        assert_eq!(basic.targets.peek(0), Some(Target::Ship(ShipKey::new(1, 0))));
    }

    #[test]
    fn test_exact_half_distance_still_prefers_planet() {
        // Enemy 15 away, planet 30 away: 15 * 2 is not below 30
        let world = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .ship(1, 0, 85.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 2)
            .build();
        let mut basic = BasicStrategy::new();
        basic.decide(&world, &DirectNavigator::default());
        assert_eq!(basic.targets.peek(0), Some(Target::Planet(1)));
    }

    #[test]
    fn test_own_planet_follows_same_rule() {
        // Own planet 25 away with a free spot, enemy 15 away: 30 is not below 25
        let world = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .ship(1, 0, 85.0, 100.0)
            .planet(1, 125.0, 100.0, 3.0, 3)
            .docked_ship(0, 1, 1)
            .build();
        let mut basic = BasicStrategy::new();
        basic.decide(&world, &DirectNavigator::default());
        assert_eq!(basic.targets.peek(0), Some(Target::Planet(1)));

        // Enemy 12 away: 24 is below 25, attack
        let world = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .ship(1, 0, 88.0, 100.0)
            .planet(1, 125.0, 100.0, 3.0, 3)
            .docked_ship(0, 1, 1)
            .build();
        let mut basic = BasicStrategy::new();
        basic.decide(&world, &DirectNavigator::default());
        assert_eq!(basic.targets.peek(0), Some(Target::Ship(ShipKey::new(1, 0))));
    }

    #[test]
    fn test_docked_ships_get_no_command() {
        let world = WorldBuilder::new(2)
            .ship(0, 0, 100.0, 100.0)
            .planet(1, 130.0, 100.0, 3.0, 2)
            .docked_ship(0, 1, 1)
            .build();
        let cmds = BasicStrategy::new().decide(&world, &DirectNavigator::default());
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].ship(), 0);
    }

    #[test]
    fn test_empty_world_is_noop() {
        let world = WorldBuilder::new(2).ship(0, 0, 100.0, 100.0).build();
        let cmds = BasicStrategy::new().decide(&world, &DirectNavigator::default());
        assert_eq!(cmds, vec![Command::noop(0)]);
    }
}

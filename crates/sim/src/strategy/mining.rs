use flotilla_shared::*;

use super::engage;
use crate::collision::CollisionGuard;
use crate::navigation::Navigator;
use crate::policy::Policy;
use crate::targets::{live_fleet, PlanetPolicy, TargetStore};

const PLANET_POLICY: PlanetPolicy = PlanetPolicy::Uncapped;

/// The whole fleet settles one large planet. Gives up once that planet stops
/// taking ships.
#[derive(Debug, Clone, Default)]
pub struct MiningStrategy {
    pub(crate) targets: TargetStore,
    pub(crate) guard: CollisionGuard,
    global_target: Option<EntityId>,
    turns: u32,
}

impl MiningStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_target(&self) -> Option<EntityId> {
        self.global_target
    }

    fn command_for(&mut self, ship: &Ship, world: &WorldSnapshot, nav: &dyn Navigator) -> Command {
        if let Some(target @ Target::Planet(_)) = self.targets.get(ship.id, world) {
            if PLANET_POLICY.is_valid_target(target, world) {
                return engage(ship, target, world, &mut self.targets, nav);
            }
        }
        self.targets.remove(ship.id);

        if self.global_target.is_none() {
            self.global_target = largest_empty_planet(ship, world);
            if let Some(id) = self.global_target {
                log::info!("mining fleet heads for planet {id}");
            }
        }

        match self.global_target {
            Some(id) if PLANET_POLICY.is_valid_target(Target::Planet(id), world) => {
                engage(ship, Target::Planet(id), world, &mut self.targets, nav)
            }
            Some(id) => {
                log::debug!("ship {} idles, planet {id} takes no more ships", ship.id);
                Command::noop(ship.id)
            }
            None => {
                log::debug!("ship {} idles, no unowned planet left", ship.id);
                Command::noop(ship.id)
            }
        }
    }
}

impl Policy for MiningStrategy {
    fn name(&self) -> &'static str {
        "mining"
    }

    fn decide(&mut self, world: &WorldSnapshot, nav: &dyn Navigator) -> Vec<Command> {
        self.targets.revalidate(world);
        self.targets.cleanup(live_fleet(world));
        if self.global_target.is_some_and(|id| world.planet(id).is_none()) {
            self.global_target = None;
        }

        let mut commands: Vec<Command> = world
            .my_ships()
            .filter(|s| s.is_undocked())
            .map(|ship| self.command_for(ship, world, nav))
            .collect();

        if self.turns < MINING_SPREAD_TURNS {
            spread_outermost(&mut commands, world);
        }
        self.turns += 1;

        self.guard.apply(commands, world, &self.targets)
    }

    fn keep(&self, world: &WorldSnapshot) -> bool {
        match self.global_target {
            Some(id) => PLANET_POLICY.is_valid_target(Target::Planet(id), world),
            None => world.planets().iter().any(|p| !p.is_owned()),
        }
    }
}

/// Nearest unowned planet among those with the most docking spots.
fn largest_empty_planet(ship: &Ship, world: &WorldSnapshot) -> Option<EntityId> {
    let empty: Vec<&Planet> = world
        .nearby_entities(ship)
        .into_iter()
        .filter_map(|(_, entity)| match entity {
            EntityRef::Planet(p) if !p.is_owned() => Some(p),
            _ => None,
        })
        .collect();
    let most = empty.iter().map(|p| p.docking_spots).max()?;
    empty.into_iter().find(|p| p.docking_spots == most).map(|p| p.id)
}

/// Fan out the two thrusting ships at the edges of the fleet's wider axis so
/// a tight spawn column doesn't travel as one clump.
fn spread_outermost(commands: &mut [Command], world: &WorldSnapshot) {
    let positions: Vec<DVec2> = commands
        .iter()
        .filter_map(|c| world.my_ship(c.ship()))
        .map(|s| s.position)
        .collect();
    let (Some(min), Some(max)) = (
        positions.iter().copied().reduce(DVec2::min),
        positions.iter().copied().reduce(DVec2::max),
    ) else {
        return;
    };
    let span = max - min;
    let horizontal = span.x > span.y;
    let axis = |p: DVec2| if horizontal { p.x } else { p.y };

    let edge = |value: f64| {
        commands.iter().position(|c| {
            c.is_thrust() && world.my_ship(c.ship()).is_some_and(|s| axis(s.position) == value)
        })
    };
    let low = edge(axis(min));
    let high = edge(axis(max));
    if low == high {
        return;
    }

    if let Some(i) = low {
        commands[i] = scale_angle(commands[i], 1.0 + MINING_SPREAD_FACTOR);
    }
    if let Some(i) = high {
        commands[i] = scale_angle(commands[i], 1.0 - MINING_SPREAD_FACTOR);
    }
}

fn scale_angle(cmd: Command, factor: f64) -> Command {
    match cmd {
        Command::Thrust {
            ship,
            angle,
            magnitude,
        } => Command::thrust(ship, (angle as f64 * factor).round() as i64, magnitude),
        other => other,
    }
}

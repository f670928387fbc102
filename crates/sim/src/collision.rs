use std::collections::HashSet;

use flotilla_shared::geometry::bearing_delta;
use flotilla_shared::*;

use crate::targets::TargetStore;

/// True when two bearings-to-target differ by an amount that puts the courses
/// on a crossing line soon.
pub fn courses_cross(bearing_a: f64, bearing_b: f64) -> bool {
    let delta = bearing_delta(bearing_a, bearing_b);
    COLLISION_BEARING_BANDS
        .iter()
        .any(|&(lo, hi)| delta >= lo && delta <= hi)
}

/// Same-turn traffic control between our own ships with a strict one-turn hold.
#[derive(Debug, Clone, Default)]
pub struct CollisionGuard {
    held: HashSet<EntityId>,
}

impl CollisionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, ship: EntityId) -> bool {
        self.held.contains(&ship)
    }

    /// Ships held this turn, sorted by id.
    pub fn held(&self) -> Vec<EntityId> {
        let mut held: Vec<EntityId> = self.held.iter().copied().collect();
        held.sort_unstable();
        held
    }

    pub fn may_collide(&self, ship: &Ship, world: &WorldSnapshot, store: &TargetStore) -> bool {
        on_collision_course(ship, world, store, &HashSet::new())
    }

    /// Second pass over a turn's batch. Ships held last turn are released and
    /// keep their fresh command; any other moving ship on a collision course is
    /// held and idles. Ships held earlier in the pass no longer count as
    /// partners.
    pub fn apply(
        &mut self,
        commands: Vec<Command>,
        world: &WorldSnapshot,
        store: &TargetStore,
    ) -> Vec<Command> {
        let released = std::mem::take(&mut self.held);
        let mut out = Vec::with_capacity(commands.len());

        for cmd in commands {
            let id = cmd.ship();
            if released.contains(&id) || !cmd.is_thrust() {
                out.push(cmd);
                continue;
            }
            let Some(ship) = world.my_ship(id) else {
                out.push(cmd);
                continue;
            };
            if on_collision_course(ship, world, store, &self.held) {
                log::debug!("ship {id} holds for one turn to avoid a collision");
                self.held.insert(id);
                out.push(Command::noop(id));
            } else {
                out.push(cmd);
            }
        }
        out
    }
}

fn bearing_to_target(ship: &Ship, world: &WorldSnapshot, store: &TargetStore) -> Option<f64> {
    let target = store.peek(ship.id)?.resolve(world)?;
    Some(ship.bearing_to(target.position()))
}

fn on_collision_course(
    ship: &Ship,
    world: &WorldSnapshot,
    store: &TargetStore,
    idle: &HashSet<EntityId>,
) -> bool {
    if !ship.is_undocked() {
        return false;
    }
    let Some(bearing) = bearing_to_target(ship, world, store) else {
        return false;
    };
    world
        .my_ships()
        .filter(|other| other.id != ship.id && other.is_undocked() && !idle.contains(&other.id))
        .filter(|other| ship.distance_to(other.position) <= COLLISION_PROXIMITY)
        .filter_map(|other| bearing_to_target(other, world, store))
        .any(|other_bearing| courses_cross(bearing, other_bearing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::WorldBuilder;
    use flotilla_shared::geometry::heading;

    /// Two ships 4 apart whose targets sit at bearings 0 and 40 degrees.
    fn crossing_pair() -> (WorldSnapshot, TargetStore) {
        let a = DVec2::new(50.0, 50.0);
        let b = DVec2::new(50.0, 54.0);
        let ta = a + heading(0.0) * 60.0;
        let tb = b + heading(40.0) * 60.0;
        let world = WorldBuilder::new(2)
            .ship(0, 0, a.x, a.y)
            .ship(0, 1, b.x, b.y)
            .planet(10, ta.x, ta.y, 2.0, 2)
            .planet(11, tb.x, tb.y, 2.0, 2)
            .build();
        let mut store = TargetStore::new();
        store.set(0, Target::Planet(10));
        store.set(1, Target::Planet(11));
        (world, store)
    }

    fn batch() -> Vec<Command> {
        vec![Command::thrust(0, 0, 7), Command::thrust(1, 40, 7)]
    }

    #[test]
    fn test_bearing_bands() {
        assert!(courses_cross(40.0, 0.0));
        assert!(courses_cross(0.0, 40.0)); // 320
        assert!(courses_cross(90.0, 0.0));
        assert!(!courses_cross(10.0, 0.0));
        assert!(!courses_cross(180.0, 0.0));
        assert!(!courses_cross(0.0, 20.0)); // 340
    }

    #[test]
    fn test_crossing_pair_may_collide() {
        let (world, store) = crossing_pair();
        let guard = CollisionGuard::new();
        assert!(guard.may_collide(world.my_ship(0).unwrap(), &world, &store));
        assert!(guard.may_collide(world.my_ship(1).unwrap(), &world, &store));
    }

    #[test]
    fn test_apply_holds_exactly_one_of_a_pair() {
        let (world, store) = crossing_pair();
        let mut guard = CollisionGuard::new();
        let original = batch();
        let out = guard.apply(original.clone(), &world, &store);

        let nooped: Vec<usize> = (0..2).filter(|&i| out[i] != original[i]).collect();
        assert_eq!(nooped.len(), 1);
        let held = nooped[0];
        assert_eq!(out[held], Command::noop(held as EntityId));
        assert!(guard.is_held(held as EntityId));
        let other = 1 - held;
        assert_eq!(out[other], original[other]);
        assert!(!guard.is_held(other as EntityId));
    }

    #[test]
    fn test_hold_lasts_one_turn() {
        let (world, store) = crossing_pair();
        let mut guard = CollisionGuard::new();
        let first = guard.apply(batch(), &world, &store);
        assert_eq!(first[0], Command::noop(0));

        // Same geometry next turn: ship 0 is released, ship 1 now takes the hold
        let second = guard.apply(batch(), &world, &store);
        assert_eq!(second[0], batch()[0]);
        assert_eq!(second[1], Command::noop(1));
        assert_eq!(guard.held(), vec![1]);
    }

    #[test]
    fn test_far_apart_or_parallel_ships_pass() {
        let world = WorldBuilder::new(2)
            .ship(0, 0, 50.0, 50.0)
            .ship(0, 1, 50.0, 53.0)
            .planet(10, 110.0, 50.0, 2.0, 2)
            .planet(11, 110.0, 53.0, 2.0, 2)
            .build();
        let mut store = TargetStore::new();
        store.set(0, Target::Planet(10));
        store.set(1, Target::Planet(11));

        let mut guard = CollisionGuard::new();
        let out = guard.apply(vec![Command::thrust(0, 0, 7), Command::thrust(1, 0, 7)], &world, &store);
        assert_eq!(out, vec![Command::thrust(0, 0, 7), Command::thrust(1, 0, 7)]);
        assert!(guard.held().is_empty());
    }

    #[test]
    fn test_dock_commands_are_never_held() {
        let (world, store) = crossing_pair();
        let mut guard = CollisionGuard::new();
        let out = guard.apply(vec![Command::dock(0, 10), Command::thrust(1, 40, 7)], &world, &store);
        assert_eq!(out[0], Command::dock(0, 10));
        // Ship 0 is not moving but still counts as a partner for ship 1
        assert_eq!(out[1], Command::noop(1));
    }
}

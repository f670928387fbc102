use std::collections::HashMap;

use flotilla_shared::*;

/// Which self-owned planets are still worth sending ships to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanetPolicy {
    /// Any planet of ours that still has a free docking spot.
    Uncapped,
    /// Additionally never more than `MAX_OWN_DOCKINGS` of our ships per planet.
    CapacityAware,
}

impl PlanetPolicy {
    pub fn is_docking_candidate(self, planet: &Planet, me: PlayerId) -> bool {
        match planet.owner {
            None => true,
            Some(owner) if owner == me => {
                !planet.is_full()
                    && (self == PlanetPolicy::Uncapped || planet.docked_count() < MAX_OWN_DOCKINGS)
            }
            Some(_) => false,
        }
    }

    /// Planet targets must still be docking candidates; ship targets only need
    /// to exist.
    pub fn is_valid_target(self, target: Target, world: &WorldSnapshot) -> bool {
        match target {
            Target::Planet(id) => world
                .planet(id)
                .is_some_and(|p| self.is_docking_candidate(p, world.my_id())),
            Target::Ship(key) => world.ship(key).is_some(),
        }
    }
}

/// Per-strategy memory of what each of our ships is pursuing.
#[derive(Debug, Clone, Default)]
pub struct TargetStore {
    assignments: HashMap<EntityId, Target>,
    claims: HashMap<Target, usize>,
}

impl TargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Stored target for `ship` if it still resolves in `world`. A stale entry
    /// is dropped.
    pub fn get(&mut self, ship: EntityId, world: &WorldSnapshot) -> Option<Target> {
        let target = *self.assignments.get(&ship)?;
        if target.resolve(world).is_some() {
            Some(target)
        } else {
            self.remove(ship);
            None
        }
    }

    /// Stored target without checking it against a snapshot.
    pub fn peek(&self, ship: EntityId) -> Option<Target> {
        self.assignments.get(&ship).copied()
    }

    pub fn set(&mut self, ship: EntityId, target: Target) {
        if let Some(old) = self.assignments.insert(ship, target) {
            self.release(old);
        }
        *self.claims.entry(target).or_insert(0) += 1;
    }

    pub fn remove(&mut self, ship: EntityId) -> Option<Target> {
        let old = self.assignments.remove(&ship)?;
        self.release(old);
        Some(old)
    }

    /// Drop every entry whose referent no longer exists. Returns how many were dropped.
    pub fn revalidate(&mut self, world: &WorldSnapshot) -> usize {
        let stale: Vec<EntityId> = self
            .assignments
            .iter()
            .filter(|(_, t)| t.resolve(world).is_none())
            .map(|(&ship, _)| ship)
            .collect();
        for ship in &stale {
            self.remove(*ship);
        }
        stale.len()
    }

    /// Keep only entries keyed by ships in `live`.
    pub fn cleanup(&mut self, live: impl IntoIterator<Item = EntityId>) {
        let live: std::collections::HashSet<EntityId> = live.into_iter().collect();
        let gone: Vec<EntityId> = self
            .assignments
            .keys()
            .filter(|ship| !live.contains(ship))
            .copied()
            .collect();
        for ship in gone {
            self.remove(ship);
        }
    }

    pub fn is_claimed(&self, target: Target) -> bool {
        self.claim_count(target) > 0
    }

    pub fn claim_count(&self, target: Target) -> usize {
        self.claims.get(&target).copied().unwrap_or(0)
    }

    fn release(&mut self, target: Target) {
        if let Some(count) = self.claims.get_mut(&target) {
            *count -= 1;
            if *count == 0 {
                self.claims.remove(&target);
            }
        }
    }
}

/// Ids of our ships that still take orders: alive and undocked.
pub fn live_fleet(world: &WorldSnapshot) -> impl Iterator<Item = EntityId> + '_ {
    world.my_ships().filter(|s| s.is_undocked()).map(|s| s.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::WorldBuilder;

    #[test]
    fn test_get_returns_live_target() {
        let world = WorldBuilder::new(2)
            .ship(0, 0, 0.0, 0.0)
            .ship(1, 0, 20.0, 0.0)
            .planet(3, 50.0, 50.0, 4.0, 2)
            .build();
        let mut store = TargetStore::new();
        store.set(0, Target::Planet(3));

        assert_eq!(store.get(0, &world), Some(Target::Planet(3)));
        assert!(store.is_claimed(Target::Planet(3)));
    }

    #[test]
    fn test_get_drops_vanished_ship_target() {
        let before = WorldBuilder::new(2)
            .ship(0, 0, 0.0, 0.0)
            .ship(1, 5, 20.0, 0.0)
            .build();
        let after = WorldBuilder::new(2).ship(0, 0, 0.0, 0.0).build();
        let enemy = Target::Ship(ShipKey::new(1, 5));

        let mut store = TargetStore::new();
        store.set(0, enemy);
        assert_eq!(store.get(0, &before), Some(enemy));

        assert_eq!(store.get(0, &after), None);
        assert!(store.is_empty());
        assert!(!store.is_claimed(enemy));
    }

    #[test]
    fn test_same_id_other_owner_does_not_resolve() {
        // Ship ids are scoped by owner: (2, 5) is not (1, 5)
        let world = WorldBuilder::new(3)
            .ship(0, 0, 0.0, 0.0)
            .ship(2, 5, 20.0, 0.0)
            .build();
        let mut store = TargetStore::new();
        store.set(0, Target::Ship(ShipKey::new(1, 5)));
        assert_eq!(store.get(0, &world), None);
    }

    #[test]
    fn test_revalidate_drops_only_stale() {
        let world = WorldBuilder::new(2)
            .ship(0, 0, 0.0, 0.0)
            .ship(0, 1, 1.0, 0.0)
            .planet(3, 50.0, 50.0, 4.0, 2)
            .build();
        let mut store = TargetStore::new();
        store.set(0, Target::Planet(3));
        store.set(1, Target::Planet(99));

        assert_eq!(store.revalidate(&world), 1);
        assert_eq!(store.peek(0), Some(Target::Planet(3)));
        assert_eq!(store.peek(1), None);
    }

    #[test]
    fn test_cleanup_drops_docked_and_dead() {
        let world = WorldBuilder::new(2)
            .ship(0, 0, 0.0, 0.0)
            .planet(3, 50.0, 50.0, 4.0, 2)
            .docked_ship(0, 1, 3)
            .build();
        let mut store = TargetStore::new();
        store.set(0, Target::Planet(3));
        store.set(1, Target::Planet(3));
        store.set(2, Target::Planet(3));
        assert_eq!(store.claim_count(Target::Planet(3)), 3);

        store.cleanup(live_fleet(&world));
        assert_eq!(store.len(), 1);
        assert_eq!(store.claim_count(Target::Planet(3)), 1);
    }

    #[test]
    fn test_reassign_moves_claim() {
        let mut store = TargetStore::new();
        store.set(0, Target::Planet(1));
        store.set(0, Target::Planet(2));
        assert!(!store.is_claimed(Target::Planet(1)));
        assert_eq!(store.claim_count(Target::Planet(2)), 1);
    }

    #[test]
    fn test_planet_policies() {
        let world = WorldBuilder::new(2)
            .planet(1, 0.0, 0.0, 5.0, 6)
            .docked_ship(0, 0, 1)
            .docked_ship(0, 1, 1)
            .docked_ship(0, 2, 1)
            .planet(2, 30.0, 0.0, 5.0, 2)
            .docked_ship(1, 0, 2)
            .planet(3, 60.0, 0.0, 5.0, 2)
            .build();
        let own = world.planet(1).unwrap();
        let enemy = world.planet(2).unwrap();
        let empty = world.planet(3).unwrap();

        // Three of ours docked: spots remain but the cap is reached
        assert!(PlanetPolicy::Uncapped.is_docking_candidate(own, 0));
        assert!(!PlanetPolicy::CapacityAware.is_docking_candidate(own, 0));

        assert!(!PlanetPolicy::Uncapped.is_docking_candidate(enemy, 0));
        assert!(PlanetPolicy::CapacityAware.is_docking_candidate(empty, 0));
    }
}

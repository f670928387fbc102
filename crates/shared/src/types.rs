use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry;

pub type PlayerId = u32;
pub type EntityId = u32;

/// Durable identity of a ship. Ship ids are only unique within an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipKey {
    pub owner: PlayerId,
    pub id: EntityId,
}

impl ShipKey {
    pub fn new(owner: PlayerId, id: EntityId) -> Self {
        Self { owner, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingStatus {
    Undocked,
    Docking,
    Docked,
    Undocking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub owner: PlayerId,
    pub id: EntityId,
    pub position: DVec2,
    pub health: u32,
    pub radius: f64,
    pub docking_status: DockingStatus,
    #[serde(default)]
    pub docked_planet: Option<EntityId>,
    /// Turns left until a Docking/Undocking transition completes.
    #[serde(default)]
    pub docking_progress: u32,
}

impl Ship {
    pub fn key(&self) -> ShipKey {
        ShipKey::new(self.owner, self.id)
    }

    pub fn is_undocked(&self) -> bool {
        self.docking_status == DockingStatus::Undocked
    }

    pub fn distance_to(&self, point: DVec2) -> f64 {
        self.position.distance(point)
    }

    pub fn bearing_to(&self, point: DVec2) -> f64 {
        geometry::bearing_deg(self.position, point)
    }

    /// True when the ship is close enough to the planet surface to start docking.
    pub fn can_dock(&self, planet: &Planet) -> bool {
        self.distance_to(planet.position) <= self.radius + crate::DOCK_RADIUS + planet.radius
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: EntityId,
    pub position: DVec2,
    pub radius: f64,
    pub health: u32,
    pub owner: Option<PlayerId>,
    pub docking_spots: usize,
    #[serde(default)]
    pub docked_ships: Vec<EntityId>,
    /// Accumulated production towards the next ship.
    #[serde(default)]
    pub production: u32,
}

impl Planet {
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn docked_count(&self) -> usize {
        self.docked_ships.len()
    }

    pub fn is_full(&self) -> bool {
        self.docked_ships.len() >= self.docking_spots
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub ships: Vec<Ship>,
}

/// Raw per-turn world state as delivered over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFrame {
    pub turn: u32,
    pub my_id: PlayerId,
    pub players: Vec<Player>,
    pub planets: Vec<Planet>,
}

/// Borrowed view of either kind of world object.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Ship(&'a Ship),
    Planet(&'a Planet),
}

impl EntityRef<'_> {
    pub fn position(&self) -> DVec2 {
        match self {
            EntityRef::Ship(s) => s.position,
            EntityRef::Planet(p) => p.position,
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            EntityRef::Ship(s) => s.radius,
            EntityRef::Planet(p) => p.radius,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            EntityRef::Ship(s) => Target::Ship(s.key()),
            EntityRef::Planet(p) => Target::Planet(p.id),
        }
    }
}

/// Identity of something a ship can pursue. Always resolved against the
/// current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Planet(EntityId),
    Ship(ShipKey),
}

impl Target {
    pub fn resolve<'a>(&self, world: &'a WorldSnapshot) -> Option<EntityRef<'a>> {
        match *self {
            Target::Planet(id) => world.planet(id).map(EntityRef::Planet),
            Target::Ship(key) => world.ship(key).map(EntityRef::Ship),
        }
    }
}

/// Immutable snapshot of one turn with identity indices built fresh from the frame.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    frame: WorldFrame,
    ship_index: HashMap<ShipKey, (usize, usize)>,
    planet_index: HashMap<EntityId, usize>,
}

impl WorldSnapshot {
    pub fn new(frame: WorldFrame) -> Self {
        let mut ship_index = HashMap::new();
        for (pi, player) in frame.players.iter().enumerate() {
            for (si, ship) in player.ships.iter().enumerate() {
                ship_index.insert(ship.key(), (pi, si));
            }
        }
        let planet_index = frame
            .planets
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        Self {
            frame,
            ship_index,
            planet_index,
        }
    }

    pub fn frame(&self) -> &WorldFrame {
        &self.frame
    }

    pub fn turn(&self) -> u32 {
        self.frame.turn
    }

    pub fn my_id(&self) -> PlayerId {
        self.frame.my_id
    }

    pub fn players(&self) -> &[Player] {
        &self.frame.players
    }

    pub fn player_count(&self) -> usize {
        self.frame.players.len()
    }

    pub fn planets(&self) -> &[Planet] {
        &self.frame.planets
    }

    pub fn planet(&self, id: EntityId) -> Option<&Planet> {
        self.planet_index.get(&id).map(|&i| &self.frame.planets[i])
    }

    pub fn ship(&self, key: ShipKey) -> Option<&Ship> {
        self.ship_index
            .get(&key)
            .map(|&(pi, si)| &self.frame.players[pi].ships[si])
    }

    pub fn my_ship(&self, id: EntityId) -> Option<&Ship> {
        self.ship(ShipKey::new(self.my_id(), id))
    }

    pub fn all_ships(&self) -> impl Iterator<Item = &Ship> {
        self.frame.players.iter().flat_map(|p| p.ships.iter())
    }

    pub fn my_ships(&self) -> impl Iterator<Item = &Ship> {
        let me = self.my_id();
        self.frame
            .players
            .iter()
            .filter(move |p| p.id == me)
            .flat_map(|p| p.ships.iter())
    }

    pub fn enemy_ships(&self) -> impl Iterator<Item = &Ship> {
        let me = self.my_id();
        self.all_ships().filter(move |s| s.owner != me)
    }

    /// Every other entity paired with its center distance from `ship`, nearest
    /// first. Entities at identical distances are all kept.
    pub fn nearby_entities(&self, ship: &Ship) -> Vec<(f64, EntityRef<'_>)> {
        let key = ship.key();
        let mut entities: Vec<(f64, EntityRef<'_>)> = self
            .frame
            .planets
            .iter()
            .map(|p| (ship.distance_to(p.position), EntityRef::Planet(p)))
            .chain(
                self.all_ships()
                    .filter(|s| s.key() != key)
                    .map(|s| (ship.distance_to(s.position), EntityRef::Ship(s))),
            )
            .collect();
        entities.sort_by(|a, b| a.0.total_cmp(&b.0));
        entities
    }
}

/// One order for one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Noop { ship: EntityId },
    Dock { ship: EntityId, planet: EntityId },
    Thrust { ship: EntityId, angle: u16, magnitude: u8 },
}

impl Command {
    pub fn noop(ship: EntityId) -> Self {
        Command::Noop { ship }
    }

    pub fn dock(ship: EntityId, planet: EntityId) -> Self {
        Command::Dock { ship, planet }
    }

    /// Build a thrust with the angle wrapped to [0, 359] and the magnitude
    /// clamped to `MAX_SPEED`.
    pub fn thrust(ship: EntityId, angle: i64, magnitude: u8) -> Self {
        Command::Thrust {
            ship,
            angle: angle.rem_euclid(360) as u16,
            magnitude: magnitude.min(crate::MAX_SPEED),
        }
    }

    pub fn ship(&self) -> EntityId {
        match *self {
            Command::Noop { ship } | Command::Dock { ship, .. } | Command::Thrust { ship, .. } => {
                ship
            }
        }
    }

    pub fn is_thrust(&self) -> bool {
        matches!(self, Command::Thrust { .. })
    }
}

/// Arena setup for one offline match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub seed: u64,
    pub players: usize,
    pub ships_per_player: usize,
    pub planets: usize,
    pub max_turns: u32,
    pub width: f64,
    pub height: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            players: 2,
            ships_per_player: crate::DEFAULT_SHIPS_PER_PLAYER,
            planets: crate::DEFAULT_PLANETS,
            max_turns: crate::DEFAULT_MAX_TURNS,
            width: crate::DEFAULT_MAP_WIDTH,
            height: crate::DEFAULT_MAP_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEndReason {
    Elimination,
    Timeout,
}

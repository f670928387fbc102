//! Hand-built worlds for unit tests.

use flotilla_shared::*;

use crate::navigation::Navigator;

pub struct WorldBuilder {
    turn: u32,
    my_id: PlayerId,
    players: Vec<Player>,
    planets: Vec<Planet>,
}

impl WorldBuilder {
    pub fn new(players: usize) -> Self {
        Self {
            turn: 0,
            my_id: 0,
            players: (0..players as PlayerId)
                .map(|id| Player {
                    id,
                    ships: Vec::new(),
                })
                .collect(),
            planets: Vec::new(),
        }
    }

    pub fn turn(mut self, turn: u32) -> Self {
        self.turn = turn;
        self
    }

    pub fn ship(mut self, owner: PlayerId, id: EntityId, x: f64, y: f64) -> Self {
        self.players[owner as usize].ships.push(Ship {
            owner,
            id,
            position: DVec2::new(x, y),
            health: MAX_SHIP_HEALTH,
            radius: SHIP_RADIUS,
            docking_status: DockingStatus::Undocked,
            docked_planet: None,
            docking_progress: 0,
        });
        self
    }

    pub fn planet(mut self, id: EntityId, x: f64, y: f64, radius: f64, spots: usize) -> Self {
        self.planets.push(Planet {
            id,
            position: DVec2::new(x, y),
            radius,
            health: 1000,
            owner: None,
            docking_spots: spots,
            docked_ships: Vec::new(),
            production: 0,
        });
        self
    }

    /// Add a ship docked at an existing planet, taking ownership of it.
    pub fn docked_ship(mut self, owner: PlayerId, id: EntityId, planet: EntityId) -> Self {
        let p = self
            .planets
            .iter_mut()
            .find(|p| p.id == planet)
            .expect("planet must be added before docking ships");
        p.owner = Some(owner);
        p.docked_ships.push(id);
        let position = p.position + DVec2::new(p.radius + 1.0, 0.0);
        self.players[owner as usize].ships.push(Ship {
            owner,
            id,
            position,
            health: MAX_SHIP_HEALTH,
            radius: SHIP_RADIUS,
            docking_status: DockingStatus::Docked,
            docked_planet: Some(planet),
            docking_progress: 0,
        });
        self
    }

    pub fn build(self) -> WorldSnapshot {
        WorldSnapshot::new(WorldFrame {
            turn: self.turn,
            my_id: self.my_id,
            players: self.players,
            planets: self.planets,
        })
    }
}

/// Navigator that never finds a path.
pub struct BlockedNavigator;

impl Navigator for BlockedNavigator {
    fn plan_move(
        &self,
        _world: &WorldSnapshot,
        _ship: &Ship,
        _target: EntityRef<'_>,
        _max_speed: u8,
    ) -> Option<Command> {
        None
    }
}

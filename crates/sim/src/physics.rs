use std::collections::{HashMap, HashSet};

use flotilla_shared::geometry::heading;
use flotilla_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use thiserror::Error;

const MIN_MAP_SIZE: f64 = 60.0;
const SPAWN_COLUMN_GAP: f64 = 2.0;
const PLANET_GAP: f64 = 3.0;
const SPAWN_CLEARANCE: f64 = 12.0;
const PLANET_ATTEMPTS_PER_PLANET: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("a match needs 2 to 4 players, got {0}")]
    PlayerCount(usize),
    #[error("each player needs at least one ship")]
    NoShips,
    #[error("map of {width}x{height} is too small")]
    MapTooSmall { width: f64, height: f64 },
    #[error("match has {expected} players but {got} bots")]
    BotCount { expected: usize, got: usize },
}

/// Authoritative world for an offline match.
#[derive(Debug, Clone)]
pub struct ArenaState {
    pub config: MatchConfig,
    pub players: Vec<Player>,
    pub planets: Vec<Planet>,
    pub turn: u32,
    next_ship_id: Vec<EntityId>,
}

impl ArenaState {
    pub fn new(config: &MatchConfig) -> Result<Self, ConfigError> {
        if !(2..=4).contains(&config.players) {
            return Err(ConfigError::PlayerCount(config.players));
        }
        if config.ships_per_player == 0 {
            return Err(ConfigError::NoShips);
        }
        if config.width < MIN_MAP_SIZE || config.height < MIN_MAP_SIZE {
            return Err(ConfigError::MapTooSmall {
                width: config.width,
                height: config.height,
            });
        }

        let mut rng = Pcg64::seed_from_u64(config.seed);
        let anchors = spawn_anchors(config);

        let players: Vec<Player> = anchors
            .iter()
            .enumerate()
            .map(|(owner, &anchor)| {
                let owner = owner as PlayerId;
                let n = config.ships_per_player;
                let ships = (0..n)
                    .map(|i| {
                        let offset = (i as f64 - (n - 1) as f64 / 2.0) * SPAWN_COLUMN_GAP;
                        new_ship(owner, i as EntityId, anchor + DVec2::new(0.0, offset))
                    })
                    .collect();
                Player { id: owner, ships }
            })
            .collect();

        let planets = generate_planets(config, &anchors, &mut rng);
        if planets.len() < config.planets {
            log::warn!(
                "placed {} of {} planets on a {}x{} map",
                planets.len(),
                config.planets,
                config.width,
                config.height
            );
        }

        Ok(Self {
            config: config.clone(),
            next_ship_id: vec![config.ships_per_player as EntityId; config.players],
            players,
            planets,
            turn: 0,
        })
    }

    /// Players that still have at least one ship.
    pub fn survivors(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| !p.ships.is_empty())
            .map(|p| p.id)
            .collect()
    }

    pub fn fleet_size(&self, player: PlayerId) -> usize {
        self.players
            .get(player as usize)
            .map_or(0, |p| p.ships.len())
    }

    pub fn planets_owned(&self, player: PlayerId) -> usize {
        self.planets.iter().filter(|p| p.is_owned_by(player)).count()
    }

    pub fn is_terminal(&self) -> bool {
        self.turn >= self.config.max_turns || self.survivors().len() <= 1
    }

    /// Winner (if any) and why the match ended. On timeout the biggest fleet
    /// wins, then the most planets; a remaining tie is a draw.
    pub fn outcome(&self) -> (Option<PlayerId>, MatchEndReason) {
        let survivors = self.survivors();
        if survivors.len() <= 1 {
            return (survivors.first().copied(), MatchEndReason::Elimination);
        }

        let score = |p: PlayerId| (self.fleet_size(p), self.planets_owned(p));
        let best = survivors.iter().map(|&p| score(p)).max();
        let leaders: Vec<PlayerId> = survivors
            .into_iter()
            .filter(|&p| Some(score(p)) == best)
            .collect();
        let winner = match leaders.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        (winner, MatchEndReason::Timeout)
    }

    /// Advance one turn. `commands[p]` is player `p`'s batch; only the first
    /// command per ship counts and orders for ships a player doesn't own are
    /// ignored.
    pub fn step(&mut self, commands: &[Vec<Command>]) {
        let mut velocities: HashMap<ShipKey, DVec2> = HashMap::new();
        for (owner, batch) in commands.iter().enumerate() {
            let mut seen = HashSet::new();
            for &cmd in batch {
                if seen.insert(cmd.ship()) {
                    self.apply_order(owner as PlayerId, cmd, &mut velocities);
                }
            }
        }

        self.move_ships(&velocities);
        self.crash_into_planets();
        self.collide_ships();
        self.fire_weapons();
        self.destroy_planets();
        self.remove_dead();
        self.advance_docking();
        self.produce();

        self.turn += 1;
    }

    fn apply_order(
        &mut self,
        owner: PlayerId,
        cmd: Command,
        velocities: &mut HashMap<ShipKey, DVec2>,
    ) {
        let Some(player) = self.players.get_mut(owner as usize) else {
            return;
        };
        let Some(ship) = player.ships.iter_mut().find(|s| s.id == cmd.ship()) else {
            return;
        };
        if !ship.is_undocked() {
            return;
        }

        match cmd {
            Command::Noop { .. } => {}
            Command::Thrust {
                angle, magnitude, ..
            } => {
                let speed = magnitude.min(MAX_SPEED) as f64;
                velocities.insert(ship.key(), heading(angle as f64) * speed);
            }
            Command::Dock { planet, .. } => {
                let Some(planet) = self.planets.iter_mut().find(|p| p.id == planet) else {
                    return;
                };
                let open = planet.owner.map_or(true, |o| o == owner) && !planet.is_full();
                if open && ship.can_dock(planet) {
                    ship.docking_status = DockingStatus::Docking;
                    ship.docking_progress = DOCK_TURNS;
                    ship.docked_planet = Some(planet.id);
                    planet.owner = Some(owner);
                    planet.docked_ships.push(ship.id);
                }
            }
        }
    }

    fn move_ships(&mut self, velocities: &HashMap<ShipKey, DVec2>) {
        let (w, h) = (self.config.width, self.config.height);
        for ship in self.players.iter_mut().flat_map(|p| p.ships.iter_mut()) {
            if let Some(v) = velocities.get(&ship.key()) {
                let next = ship.position + *v;
                ship.position = DVec2::new(
                    next.x.clamp(ship.radius, w - ship.radius),
                    next.y.clamp(ship.radius, h - ship.radius),
                );
            }
        }
    }

    fn crash_into_planets(&mut self) {
        for ship in self.players.iter_mut().flat_map(|p| p.ships.iter_mut()) {
            if !ship.is_undocked() {
                continue;
            }
            if let Some(planet) = self
                .planets
                .iter_mut()
                .find(|p| ship.distance_to(p.position) <= p.radius + ship.radius)
            {
                planet.health = planet.health.saturating_sub(ship.health);
                ship.health = 0;
            }
        }
    }

    fn collide_ships(&mut self) {
        let ships: Vec<(ShipKey, DVec2, f64)> = self
            .players
            .iter()
            .flat_map(|p| p.ships.iter())
            .filter(|s| s.health > 0)
            .map(|s| (s.key(), s.position, s.radius))
            .collect();

        let mut wrecked = HashSet::new();
        for (i, a) in ships.iter().enumerate() {
            for b in &ships[i + 1..] {
                if a.1.distance(b.1) <= a.2 + b.2 {
                    wrecked.insert(a.0);
                    wrecked.insert(b.0);
                }
            }
        }
        self.for_each_ship(|ship| {
            if wrecked.contains(&ship.key()) {
                ship.health = 0;
            }
        });
    }

    /// Every undocked ship splits its damage evenly over the enemies in range.
    /// Damage lands simultaneously.
    fn fire_weapons(&mut self) {
        let ships: Vec<&Ship> = self
            .players
            .iter()
            .flat_map(|p| p.ships.iter())
            .filter(|s| s.health > 0)
            .collect();

        let mut damage: HashMap<ShipKey, u32> = HashMap::new();
        for attacker in ships.iter().filter(|s| s.is_undocked()) {
            let in_range: Vec<ShipKey> = ships
                .iter()
                .filter(|s| s.owner != attacker.owner)
                .filter(|s| attacker.distance_to(s.position) <= WEAPON_RADIUS + s.radius)
                .map(|s| s.key())
                .collect();
            if in_range.is_empty() {
                continue;
            }
            let share = (WEAPON_DAMAGE / in_range.len() as u32).max(1);
            for key in in_range {
                *damage.entry(key).or_insert(0) += share;
            }
        }

        self.for_each_ship(|ship| {
            if let Some(&d) = damage.get(&ship.key()) {
                ship.health = ship.health.saturating_sub(d);
            }
        });
    }

    /// Planets worn down to nothing vanish and take their docked ships along.
    fn destroy_planets(&mut self) {
        let (gone, kept): (Vec<Planet>, Vec<Planet>) =
            std::mem::take(&mut self.planets)
                .into_iter()
                .partition(|p| p.health == 0);
        self.planets = kept;

        for planet in &gone {
            log::debug!("planet {} destroyed on turn {}", planet.id, self.turn);
            self.for_each_ship(|ship| {
                if ship.docked_planet == Some(planet.id) {
                    ship.health = 0;
                }
            });
        }
    }

    fn remove_dead(&mut self) {
        let mut dead: HashSet<ShipKey> = HashSet::new();
        for player in &mut self.players {
            player.ships.retain(|s| {
                if s.health == 0 {
                    dead.insert(s.key());
                }
                s.health > 0
            });
        }
        if dead.is_empty() {
            return;
        }

        for planet in &mut self.planets {
            let Some(owner) = planet.owner else {
                continue;
            };
            planet
                .docked_ships
                .retain(|&id| !dead.contains(&ShipKey::new(owner, id)));
            if planet.docked_ships.is_empty() {
                planet.owner = None;
                planet.production = 0;
            }
        }
    }

    fn advance_docking(&mut self) {
        self.for_each_ship(|ship| {
            if ship.docking_status == DockingStatus::Docking {
                ship.docking_progress = ship.docking_progress.saturating_sub(1);
                if ship.docking_progress == 0 {
                    ship.docking_status = DockingStatus::Docked;
                }
            }
        });
    }

    /// Docked ships feed their planet; each full `SHIP_COST` becomes a new
    /// ship next to it.
    fn produce(&mut self) {
        let (w, h) = (self.config.width, self.config.height);
        for planet in &mut self.planets {
            let Some(owner) = planet.owner else {
                continue;
            };
            let Some(player) = self.players.get_mut(owner as usize) else {
                continue;
            };
            let docked = player
                .ships
                .iter()
                .filter(|s| {
                    s.docking_status == DockingStatus::Docked && s.docked_planet == Some(planet.id)
                })
                .count() as u32;
            planet.production += BASE_PRODUCTIVITY * docked;

            while planet.production >= SHIP_COST {
                planet.production -= SHIP_COST;
                let id = self.next_ship_id[owner as usize];
                self.next_ship_id[owner as usize] += 1;

                let angle = (id as f64 * 47.0) % 360.0;
                let at = planet.position + heading(angle) * (planet.radius + SPAWN_RADIUS);
                let at = DVec2::new(
                    at.x.clamp(SHIP_RADIUS, w - SHIP_RADIUS),
                    at.y.clamp(SHIP_RADIUS, h - SHIP_RADIUS),
                );
                log::debug!("player {owner} spawns ship {id} at planet {}", planet.id);
                player.ships.push(new_ship(owner, id, at));
            }
        }
    }

    fn for_each_ship(&mut self, mut f: impl FnMut(&mut Ship)) {
        for ship in self.players.iter_mut().flat_map(|p| p.ships.iter_mut()) {
            f(ship);
        }
    }
}

fn new_ship(owner: PlayerId, id: EntityId, position: DVec2) -> Ship {
    Ship {
        owner,
        id,
        position,
        health: MAX_SHIP_HEALTH,
        radius: SHIP_RADIUS,
        docking_status: DockingStatus::Undocked,
        docked_planet: None,
        docking_progress: 0,
    }
}

/// Opposite sides for a duel, opposite corners otherwise.
fn spawn_anchors(config: &MatchConfig) -> Vec<DVec2> {
    let (w, h) = (config.width, config.height);
    let spots = if config.players == 2 {
        vec![DVec2::new(w * 0.2, h * 0.5), DVec2::new(w * 0.8, h * 0.5)]
    } else {
        vec![
            DVec2::new(w * 0.2, h * 0.2),
            DVec2::new(w * 0.8, h * 0.8),
            DVec2::new(w * 0.8, h * 0.2),
            DVec2::new(w * 0.2, h * 0.8),
        ]
    };
    spots.into_iter().take(config.players).collect()
}

/// Rejection-sample non-overlapping planets clear of every spawn point.
fn generate_planets(config: &MatchConfig, anchors: &[DVec2], rng: &mut Pcg64) -> Vec<Planet> {
    let mut planets: Vec<Planet> = Vec::with_capacity(config.planets);
    let attempts = config.planets * PLANET_ATTEMPTS_PER_PLANET;

    for _ in 0..attempts {
        if planets.len() == config.planets {
            break;
        }
        let radius = rng.gen_range(MIN_PLANET_RADIUS..=MAX_PLANET_RADIUS);
        let edge = radius + PLANET_GAP;
        let position = DVec2::new(
            rng.gen_range(edge..config.width - edge),
            rng.gen_range(edge..config.height - edge),
        );

        let clear_of_planets = planets
            .iter()
            .all(|p| p.position.distance(position) > p.radius + radius + PLANET_GAP);
        let clear_of_spawns = anchors
            .iter()
            .all(|a| a.distance(position) > radius + SPAWN_CLEARANCE);
        if !(clear_of_planets && clear_of_spawns) {
            continue;
        }

        planets.push(Planet {
            id: planets.len() as EntityId,
            position,
            radius,
            health: radius.round() as u32 * PLANET_HEALTH_PER_RADIUS,
            owner: None,
            docking_spots: (radius / 2.0).round() as usize + 1,
            docked_ships: Vec::new(),
            production: 0,
        });
    }
    planets
}

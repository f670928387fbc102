// Ship movement
pub const MAX_SPEED: u8 = 7;
pub const SHIP_RADIUS: f64 = 0.5;
pub const MAX_SHIP_HEALTH: u32 = 255;

// Docking
pub const DOCK_RADIUS: f64 = 4.0;
pub const DOCK_TURNS: u32 = 5;
pub const MAX_OWN_DOCKINGS: usize = 3; // own ships per self-owned planet

// Combat
pub const WEAPON_RADIUS: f64 = 5.0;
pub const WEAPON_DAMAGE: u32 = 64;

// Production
pub const BASE_PRODUCTIVITY: u32 = 6; // per docked ship per turn
pub const SHIP_COST: u32 = 72;
pub const SPAWN_RADIUS: f64 = 2.0;

// Turn budget
pub const TURN_BUDGET_MS: u64 = 2000;

// Collision guard
pub const COLLISION_PROXIMITY: f64 = 5.0;
pub const COLLISION_BEARING_BANDS: [(f64, f64); 2] = [(30.0, 90.0), (270.0, 330.0)];

// Navigation
pub const NAV_APPROACH_MARGIN: f64 = 3.0;
pub const NAV_MAX_CORRECTIONS: u32 = 90;
pub const NAV_FUDGE: f64 = 0.01;

// Strategy selection
pub const MINING_PROBABILITY: f64 = 0.5;
pub const MINING_SPREAD_TURNS: u32 = 6;
pub const MINING_SPREAD_FACTOR: f64 = 0.2; // outermost ships turn by angle * (1 +- factor)

// Arena defaults
pub const DEFAULT_MAP_WIDTH: f64 = 240.0;
pub const DEFAULT_MAP_HEIGHT: f64 = 160.0;
pub const DEFAULT_MAX_TURNS: u32 = 300;
pub const DEFAULT_SHIPS_PER_PLAYER: usize = 3;
pub const DEFAULT_PLANETS: usize = 12;
pub const MIN_PLANET_RADIUS: f64 = 3.0;
pub const MAX_PLANET_RADIUS: f64 = 8.0;
pub const PLANET_HEALTH_PER_RADIUS: u32 = 255;

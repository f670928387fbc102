use flotilla_shared::geometry::{closest_point_to, heading, segment_hits_circle};
use flotilla_shared::*;

/// Turns "ship wants to reach this entity" into a concrete command.
pub trait Navigator {
    /// Returns `None` when no safe move exists this turn.
    fn plan_move(
        &self,
        world: &WorldSnapshot,
        ship: &Ship,
        target: EntityRef<'_>,
        max_speed: u8,
    ) -> Option<Command>;
}

/// Straight-line approach with alternating heading corrections around obstacles.
#[derive(Debug, Clone, Copy)]
pub struct DirectNavigator {
    pub approach_margin: f64,
    pub max_corrections: u32,
}

impl Default for DirectNavigator {
    fn default() -> Self {
        Self {
            approach_margin: NAV_APPROACH_MARGIN,
            max_corrections: NAV_MAX_CORRECTIONS,
        }
    }
}

impl Navigator for DirectNavigator {
    fn plan_move(
        &self,
        world: &WorldSnapshot,
        ship: &Ship,
        target: EntityRef<'_>,
        max_speed: u8,
    ) -> Option<Command> {
        let dest = closest_point_to(
            ship.position,
            target.position(),
            target.radius(),
            self.approach_margin,
        );
        let distance = ship.distance_to(dest);
        let base = ship.bearing_to(dest).round() as i64;
        let thrust = distance.min(max_speed as f64).floor() as u8;

        if thrust == 0 {
            return Some(Command::thrust(ship.id, base, 0));
        }

        let ignore = match target {
            EntityRef::Ship(s) => Some(s.key()),
            EntityRef::Planet(_) => None,
        };

        for step in 0..=self.max_corrections as i64 {
            let offsets: &[i64] = if step == 0 { &[0] } else { &[step, -step] };
            for &offset in offsets {
                let angle = base + offset;
                let end = ship.position + heading(angle as f64) * thrust as f64;
                if !path_blocked(world, ship, end, ignore) {
                    return Some(Command::thrust(ship.id, angle, thrust));
                }
            }
        }

        log::debug!(
            "ship {} found no clear heading towards {:?} after {} corrections",
            ship.id,
            target.target(),
            self.max_corrections
        );
        None
    }
}

/// True when the segment from the ship to `end` clips a planet or another ship.
fn path_blocked(world: &WorldSnapshot, ship: &Ship, end: DVec2, ignore: Option<ShipKey>) -> bool {
    let start = ship.position;
    let planet_hit = world.planets().iter().any(|p| {
        segment_hits_circle(start, end, p.position, p.radius + ship.radius + NAV_FUDGE)
    });
    if planet_hit {
        return true;
    }
    let key = ship.key();
    world
        .all_ships()
        .filter(|s| s.key() != key && Some(s.key()) != ignore)
        .any(|s| segment_hits_circle(start, end, s.position, s.radius + ship.radius + NAV_FUDGE))
}

pub mod aggressive;
pub mod balanced;
pub mod basic;
pub mod mining;

use std::fmt;
use std::str::FromStr;

use flotilla_shared::*;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionGuard;
use crate::navigation::Navigator;
use crate::policy::Policy;
use crate::targets::TargetStore;

pub use aggressive::AggressiveStrategy;
pub use balanced::BalancedStrategy;
pub use basic::BasicStrategy;
pub use mining::MiningStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Basic,
    Balanced,
    Aggressive,
    Mining,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Basic,
        StrategyKind::Balanced,
        StrategyKind::Aggressive,
        StrategyKind::Mining,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Basic => "basic",
            StrategyKind::Balanced => "balanced",
            StrategyKind::Aggressive => "aggressive",
            StrategyKind::Mining => "mining",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                format!("unknown strategy '{s}'. Valid: basic, balanced, aggressive, mining")
            })
    }
}

/// The closed set of fleet policies. Each variant owns its own target store
/// and hold set; replacing the variant forgets both.
#[derive(Debug, Clone)]
pub enum Strategy {
    Basic(BasicStrategy),
    Balanced(BalancedStrategy),
    Aggressive(AggressiveStrategy),
    Mining(MiningStrategy),
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Basic => Strategy::Basic(BasicStrategy::new()),
            StrategyKind::Balanced => Strategy::Balanced(BalancedStrategy::new()),
            StrategyKind::Aggressive => Strategy::Aggressive(AggressiveStrategy::new()),
            StrategyKind::Mining => Strategy::Mining(MiningStrategy::new()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Basic(_) => StrategyKind::Basic,
            Strategy::Balanced(_) => StrategyKind::Balanced,
            Strategy::Aggressive(_) => StrategyKind::Aggressive,
            Strategy::Mining(_) => StrategyKind::Mining,
        }
    }

    pub fn targets(&self) -> &TargetStore {
        match self {
            Strategy::Basic(s) => &s.targets,
            Strategy::Balanced(s) => &s.targets,
            Strategy::Aggressive(s) => &s.targets,
            Strategy::Mining(s) => &s.targets,
        }
    }

    /// The collision guard, for variants that run one.
    pub fn guard(&self) -> Option<&CollisionGuard> {
        match self {
            Strategy::Basic(_) => None,
            Strategy::Balanced(s) => Some(&s.guard),
            Strategy::Aggressive(s) => Some(&s.guard),
            Strategy::Mining(s) => Some(&s.guard),
        }
    }

    fn as_policy(&self) -> &dyn Policy {
        match self {
            Strategy::Basic(s) => s,
            Strategy::Balanced(s) => s,
            Strategy::Aggressive(s) => s,
            Strategy::Mining(s) => s,
        }
    }

    fn as_policy_mut(&mut self) -> &mut dyn Policy {
        match self {
            Strategy::Basic(s) => s,
            Strategy::Balanced(s) => s,
            Strategy::Aggressive(s) => s,
            Strategy::Mining(s) => s,
        }
    }
}

impl Policy for Strategy {
    fn name(&self) -> &'static str {
        self.as_policy().name()
    }

    fn decide(&mut self, world: &WorldSnapshot, nav: &dyn Navigator) -> Vec<Command> {
        self.as_policy_mut().decide(world, nav)
    }

    fn keep(&self, world: &WorldSnapshot) -> bool {
        self.as_policy().keep(world)
    }
}

/// Remember `target` for `ship` and produce this turn's command towards it:
/// dock when a planet is in range, otherwise ask the navigator. The
/// assignment is kept after docking so no other ship claims the same spot
/// before the next snapshot shows the ship docked.
pub(crate) fn engage(
    ship: &Ship,
    target: Target,
    world: &WorldSnapshot,
    store: &mut TargetStore,
    nav: &dyn Navigator,
) -> Command {
    let Some(entity) = target.resolve(world) else {
        store.remove(ship.id);
        return Command::noop(ship.id);
    };
    store.set(ship.id, target);

    if let EntityRef::Planet(planet) = entity {
        if ship.can_dock(planet) {
            log::debug!("ship {} docks at planet {}", ship.id, planet.id);
            return Command::dock(ship.id, planet.id);
        }
    }

    match nav.plan_move(world, ship, entity, MAX_SPEED) {
        Some(cmd) => cmd,
        None => {
            log::warn!("ship {} has no safe move towards {:?}, idling", ship.id, target);
            Command::noop(ship.id)
        }
    }
}

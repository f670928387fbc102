use flotilla_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::policy::Policy;
use crate::strategy::{Strategy, StrategyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Uninitialized,
    Active(StrategyKind),
}

/// A strategy switch, recorded for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub turn: u32,
    pub from: Option<StrategyKind>,
    pub to: StrategyKind,
}

/// Picks the active strategy once per turn. Duels open aggressive, larger
/// games flip a coin between mining and balanced, and balanced is final.
#[derive(Debug, Clone)]
pub struct StrategySelector<R: Rng = Pcg64> {
    rng: R,
    active: Option<Strategy>,
    pinned: Option<StrategyKind>,
    transitions: Vec<Transition>,
}

impl StrategySelector<Pcg64> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg64::seed_from_u64(seed))
    }

    /// Always runs `kind`, never switching.
    pub fn pinned(kind: StrategyKind) -> Self {
        Self {
            pinned: Some(kind),
            ..Self::new(0)
        }
    }
}

impl<R: Rng> StrategySelector<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            active: None,
            pinned: None,
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> SelectorState {
        match &self.active {
            None => SelectorState::Uninitialized,
            Some(s) => SelectorState::Active(s.kind()),
        }
    }

    pub fn active(&self) -> Option<&Strategy> {
        self.active.as_ref()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Evaluate the state machine for this turn and hand back the strategy
    /// that should decide it. A replaced strategy is dropped along with its
    /// targets and holds.
    pub fn choose(&mut self, world: &WorldSnapshot) -> &mut Strategy {
        let strategy = match self.active.take() {
            None => {
                let kind = self.bootstrap(world);
                self.record(world.turn(), None, kind);
                Strategy::new(kind)
            }
            Some(current) if self.pinned.is_none() && !current.keep(world) => {
                let from = current.kind();
                match from {
                    StrategyKind::Aggressive | StrategyKind::Mining => {
                        self.record(world.turn(), Some(from), StrategyKind::Balanced);
                        Strategy::new(StrategyKind::Balanced)
                    }
                    _ => current,
                }
            }
            Some(current) => current,
        };
        self.active.insert(strategy)
    }

    fn bootstrap(&mut self, world: &WorldSnapshot) -> StrategyKind {
        if let Some(kind) = self.pinned {
            return kind;
        }
        if world.player_count() == 2 {
            StrategyKind::Aggressive
        } else if self.rng.gen_bool(MINING_PROBABILITY) {
            StrategyKind::Mining
        } else {
            StrategyKind::Balanced
        }
    }

    fn record(&mut self, turn: u32, from: Option<StrategyKind>, to: StrategyKind) {
        match from {
            Some(from) => log::info!("turn {turn}: switching strategy {from} -> {to}"),
            None => log::info!("turn {turn}: starting with {to} strategy"),
        }
        self.transitions.push(Transition { turn, from, to });
    }
}

use flotilla_shared::{Command, WorldSnapshot};

use crate::navigation::Navigator;

/// Shared capability of every fleet strategy.
pub trait Policy {
    fn name(&self) -> &'static str;

    /// Produce commands for the undocked ships of this turn's fleet.
    fn decide(&mut self, world: &WorldSnapshot, nav: &dyn Navigator) -> Vec<Command>;

    /// Whether the strategy wants to stay active. Checked by the selector
    /// before the next `decide`.
    fn keep(&self, _world: &WorldSnapshot) -> bool {
        true
    }
}

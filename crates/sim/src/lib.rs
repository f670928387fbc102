pub mod bot;
pub mod collision;
pub mod match_loop;
pub mod navigation;
pub mod networking;
pub mod observation;
pub mod physics;
pub mod policy;
pub mod ranker;
pub mod selector;
pub mod strategy;
pub mod targets;

#[cfg(test)]
mod fixtures;

pub use bot::*;
pub use match_loop::*;
pub use navigation::*;
pub use networking::*;
pub use physics::*;
pub use policy::*;
pub use selector::*;
pub use strategy::{Strategy, StrategyKind};

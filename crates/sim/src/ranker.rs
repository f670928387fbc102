use flotilla_shared::*;

use crate::targets::{PlanetPolicy, TargetStore};

/// Disjoint classes of candidate targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    EmptyPlanet,
    OwnPlanet,
    TargetedEnemy,
    UntargetedEnemy,
}

/// Distance multiplier per pool. `None` disables the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolWeights {
    pub empty_planet: Option<f64>,
    pub own_planet: Option<f64>,
    pub targeted_enemy: Option<f64>,
    pub untargeted_enemy: Option<f64>,
}

impl PoolWeights {
    pub fn weight(&self, pool: Pool) -> Option<f64> {
        match pool {
            Pool::EmptyPlanet => self.empty_planet,
            Pool::OwnPlanet => self.own_planet,
            Pool::TargetedEnemy => self.targeted_enemy,
            Pool::UntargetedEnemy => self.untargeted_enemy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub target: Target,
    pub pool: Pool,
    pub distance: f64,
    pub score: f64,
}

/// Pool an entity falls into from our point of view, or `None` if it is not
/// worth pursuing at all.
pub fn classify(
    entity: EntityRef<'_>,
    world: &WorldSnapshot,
    claims: &TargetStore,
    policy: PlanetPolicy,
) -> Option<Pool> {
    let me = world.my_id();
    let target = entity.target();
    match entity {
        EntityRef::Planet(p) if !p.is_owned() => {
            (!claims.is_claimed(target)).then_some(Pool::EmptyPlanet)
        }
        EntityRef::Planet(p) if p.is_owned_by(me) => {
            (policy.is_docking_candidate(p, me) && !claims.is_claimed(target))
                .then_some(Pool::OwnPlanet)
        }
        EntityRef::Planet(_) => None,
        EntityRef::Ship(s) if s.owner == me => None,
        EntityRef::Ship(_) => Some(if claims.is_claimed(target) {
            Pool::TargetedEnemy
        } else {
            Pool::UntargetedEnemy
        }),
    }
}

/// All candidates for `ship`, best first by `distance * weight`.
pub fn rank(
    ship: &Ship,
    world: &WorldSnapshot,
    claims: &TargetStore,
    weights: &PoolWeights,
    policy: PlanetPolicy,
) -> Vec<Candidate> {
    let candidates = world
        .nearby_entities(ship)
        .into_iter()
        .filter_map(|(distance, entity)| {
            let pool = classify(entity, world, claims, policy)?;
            let weight = weights.weight(pool)?;
            Some(Candidate {
                target: entity.target(),
                pool,
                distance,
                score: distance * weight,
            })
        })
        .collect();
    order_by_score(candidates)
}

/// Stable sort by score, so equal scores keep the incoming (distance) order.
pub fn order_by_score(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
    candidates
}

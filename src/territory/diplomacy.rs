//! Pairwise diplomatic relations between states
//!
//! Every state holds a relation vector indexed by state id. Relations are
//! drawn per unordered pair and written to both sides, so the matrix is
//! always reciprocal: `a.diplomacy[b].reciprocal() == b.diplomacy[a]`.
//! Adjacency pushes pairs toward conflict, shared culture toward alliance,
//! and a large power gap between neighbors can produce vassalage.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::world::World;

/// Power ratio between neighbors above which vassalage becomes possible
const VASSAL_POWER_RATIO: f32 = 2.5;

/// Relation of one state toward another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// Self, the Neutrals sentinel, or a removed state
    X,
    Unknown,
    Neutral,
    Friendly,
    Ally,
    Suspicion,
    Enemy,
    Rival,
    /// The other state is subordinate to this one
    Vassal,
    /// This state is subordinate to the other
    Suzerain,
}

impl Relation {
    /// The relation as seen from the other side.
    pub fn reciprocal(self) -> Self {
        match self {
            Relation::Vassal => Relation::Suzerain,
            Relation::Suzerain => Relation::Vassal,
            other => other,
        }
    }
}

/// Draw the full relation matrix and store a row in every state.
pub fn generate(world: &mut World, rng: &mut ChaCha8Rng) {
    let n = world.states.len();
    let mut matrix = vec![vec![Relation::X; n]; n];

    for a in 1..n {
        if world.states[a].removed {
            continue;
        }
        for b in (a + 1)..n {
            if world.states[b].removed {
                continue;
            }
            let relation = draw_relation(world, a as u16, b as u16, rng);
            matrix[a][b] = relation;
            matrix[b][a] = relation.reciprocal();
        }
    }

    for (i, state) in world.states.iter_mut().enumerate() {
        state.diplomacy = std::mem::take(&mut matrix[i]);
    }
}

/// Relation of `a` toward `b`.
fn draw_relation(world: &World, a: u16, b: u16, rng: &mut ChaCha8Rng) -> Relation {
    let sa = &world.states[a as usize];
    let sb = &world.states[b as usize];
    let neighbors = sa.neighbors.contains(&b);
    let same_culture = sa.culture == sb.culture;

    // Vassalage needs a shared border and a clear power gap
    if neighbors {
        let (pa, pb) = (sa.power().max(1.0), sb.power().max(1.0));
        if pa / pb >= VASSAL_POWER_RATIO && rng.gen_bool(0.5) {
            return Relation::Vassal;
        }
        if pb / pa >= VASSAL_POWER_RATIO && rng.gen_bool(0.5) {
            return Relation::Suzerain;
        }
    }

    let mut weights: Vec<(Relation, u32)> = vec![
        (Relation::Unknown, if neighbors { 0 } else { 5 }),
        (Relation::Neutral, 4),
        (Relation::Friendly, if same_culture { 4 } else { 2 }),
        (Relation::Ally, if same_culture { 3 } else { 1 }),
        (Relation::Suspicion, if neighbors { 4 } else { 2 }),
        (Relation::Enemy, if neighbors { 3 } else { 0 }),
        (Relation::Rival, if neighbors { 3 } else { 1 }),
    ];
    if neighbors && same_culture {
        // Kin across a border drift toward rivalry, not open war
        if let Some(enemy) = weights.iter_mut().find(|(r, _)| *r == Relation::Enemy) {
            enemy.1 = 1;
        }
    }

    let total: u32 = weights.iter().map(|&(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (relation, weight) in weights {
        if roll < weight {
            return relation;
        }
        roll -= weight;
    }
    Relation::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationParams;
    use crate::graph::grid;
    use rand::SeedableRng;

    fn diplomatic_world(seed: u64) -> World {
        let (graph, heights) = grid::build(24, 24, 10.0, seed);
        let params = GenerationParams {
            culture_growth_limit: f32::INFINITY,
            state_growth_limit: f32::INFINITY,
            ..Default::default()
        };
        let mut world = World::new(graph, heights, params, seed).unwrap();
        crate::hydrology::run(&mut world);
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.cultures);
        super::super::cultures::generate(&mut world, &mut rng).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.states);
        super::super::states::generate(&mut world, &mut rng).unwrap();
        let mut burg_rng = ChaCha8Rng::seed_from_u64(world.seeds.burgs);
        super::super::burgs::generate(&mut world, &mut burg_rng);
        super::super::states::collect_statistics(&mut world);
        generate(&mut world, &mut rng);
        world
    }

    #[test]
    fn test_matrix_is_reciprocal() {
        let world = diplomatic_world(5);
        let n = world.states.len();
        for a in 0..n {
            assert_eq!(world.states[a].diplomacy.len(), n);
            for b in 0..n {
                assert_eq!(
                    world.states[a].diplomacy[b].reciprocal(),
                    world.states[b].diplomacy[a],
                    "asymmetric relation between {a} and {b}"
                );
            }
        }
    }

    #[test]
    fn test_self_and_neutrals_are_x() {
        let world = diplomatic_world(5);
        for (i, state) in world.states.iter().enumerate() {
            assert_eq!(state.diplomacy[i], Relation::X);
            assert_eq!(state.diplomacy[0], Relation::X);
        }
    }

    #[test]
    fn test_unknown_only_between_strangers() {
        let world = diplomatic_world(5);
        for state in world.states.iter().filter(|s| s.i != 0) {
            for &nb in &state.neighbors {
                if nb == 0 {
                    continue;
                }
                assert_ne!(
                    state.diplomacy[nb as usize],
                    Relation::Unknown,
                    "neighbors {} and {nb} cannot be unknown to each other",
                    state.i
                );
            }
        }
    }
}

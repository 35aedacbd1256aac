//! Settlement placement and specification
//!
//! Capitals are created by the state stage; this module fills in the rest:
//! towns on high-scoring cells, port detection, population, type by
//! population thresholds, and structural features from probability draws
//! gated by size and status. Index 0 is a reserved placeholder.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::cell_score;
use crate::names;
use crate::world::{get_next_id, EntityId, FeatureKind, World};

/// Minimum lake size (in cells) for a shore burg to count as a port
const PORT_LAKE_MIN_CELLS: usize = 8;

/// Settlement size class, derived from population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurgKind {
    Hamlet,
    Village,
    Town,
    City,
    Metropolis,
}

impl BurgKind {
    fn from_population(population: f32) -> Self {
        match population {
            p if p < 5.0 => BurgKind::Hamlet,
            p if p < 10.0 => BurgKind::Village,
            p if p < 20.0 => BurgKind::Town,
            p if p < 45.0 => BurgKind::City,
            _ => BurgKind::Metropolis,
        }
    }
}

/// A settlement entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Burg {
    pub i: u16,
    pub name: String,
    pub cell: u32,
    pub x: f32,
    pub y: f32,
    pub state: u16,
    pub culture: u16,
    /// Population in abstract thousands
    pub population: f32,
    pub kind: BurgKind,
    pub capital: bool,
    /// Water feature id the harbor opens onto, 0 = not a port
    pub port: u16,
    pub citadel: bool,
    pub walls: bool,
    pub plaza: bool,
    pub temple: bool,
    pub shanty: bool,
    pub removed: bool,
}

impl Burg {
    pub(crate) fn placeholder() -> Self {
        Burg {
            i: 0,
            name: String::new(),
            cell: 0,
            x: 0.0,
            y: 0.0,
            state: 0,
            culture: 0,
            population: 0.0,
            kind: BurgKind::Hamlet,
            capital: false,
            port: 0,
            citadel: false,
            walls: false,
            plaza: false,
            temple: false,
            shanty: false,
            removed: true,
        }
    }

    /// Capital seed burg; population and features are filled in later by
    /// `specify_burgs` / `define_burg_features`.
    pub(crate) fn capital(i: u16, cell: u32, state: u16, culture: u16, name: &str, x: f32, y: f32) -> Self {
        Burg {
            i,
            name: name.to_string(),
            cell,
            x,
            y,
            state,
            culture,
            capital: true,
            removed: false,
            ..Self::placeholder()
        }
    }
}

impl EntityId for Burg {
    fn id(&self) -> u16 {
        self.i
    }
}

/// Place towns and derive every settlement's attributes.
pub fn generate(world: &mut World, rng: &mut ChaCha8Rng) {
    place_towns(world, rng);
    specify_burgs(world, rng);
    define_burg_features(world, rng);
}

/// Scatter non-capital burgs over the best unoccupied land cells with
/// mutual spacing scaled from the target count.
fn place_towns(world: &mut World, rng: &mut ChaCha8Rng) {
    let mut ranked: Vec<u32> = world
        .land_cells()
        .into_iter()
        .filter(|&c| world.burg[c as usize] == 0 && cell_score(world, c) > 0.0)
        .collect();
    ranked.sort_by(|&a, &b| {
        cell_score(world, b)
            .total_cmp(&cell_score(world, a))
            .then(a.cmp(&b))
    });

    let target = world.params.town_count.min(ranked.len());
    if target == 0 {
        return;
    }
    let (w, h) = world.graph.extent;
    let spacing = (w * h / target as f32).sqrt() / 3.0;

    let mut placed: Vec<u32> = world
        .burgs
        .iter()
        .filter(|b| b.i != 0 && !b.removed)
        .map(|b| b.cell)
        .collect();

    for &cell in &ranked {
        if placed.len() >= target + world.params.state_count {
            break;
        }
        let clear = placed
            .iter()
            .all(|&other| world.graph.distance(cell, other) >= spacing);
        if !clear {
            continue;
        }

        let culture = world.culture[cell as usize];
        let base = world.cultures[culture as usize].base;
        let (x, y) = world.graph.points[cell as usize];
        let id = get_next_id(&world.burgs);
        let burg = Burg {
            i: id,
            name: names::base_name(base, rng),
            cell,
            x,
            y,
            state: world.state[cell as usize],
            culture,
            capital: false,
            removed: false,
            ..Burg::placeholder()
        };
        world.burgs.push(burg);
        world.burg[cell as usize] = id;
        placed.push(cell);
    }
}

/// Derive port status, population and size class for every settlement.
pub fn specify_burgs(world: &mut World, rng: &mut ChaCha8Rng) {
    for idx in 1..world.burgs.len() {
        if world.burgs[idx].removed {
            continue;
        }
        let cell = world.burgs[idx].cell;
        let capital = world.burgs[idx].capital;

        // A harbor needs a coastal cell opening onto the ocean or a big lake
        let harbor = world
            .graph
            .neighbors_of(cell)
            .iter()
            .copied()
            .filter(|&nb| world.is_water(nb))
            .find(|&nb| {
                let feature = world.feature_of(nb);
                feature.kind == FeatureKind::Ocean
                    || (feature.kind == FeatureKind::Lake && feature.cells >= PORT_LAKE_MIN_CELLS)
            });
        let port = match harbor {
            Some(nb) if capital || rng.gen_bool(0.5) => world.feature[nb as usize],
            _ => 0,
        };

        let mut population = cell_score(world, cell) * 8.0 + rng.gen_range(0.0..4.0);
        if capital {
            population *= 2.0;
        }
        if port != 0 {
            population *= 1.3;
        }
        population = population.max(0.5);

        let burg = &mut world.burgs[idx];
        burg.port = port;
        burg.population = population;
        burg.kind = BurgKind::from_population(population);
    }
}

/// Draw structural flags gated by size and status.
pub fn define_burg_features(world: &mut World, rng: &mut ChaCha8Rng) {
    for burg in world.burgs.iter_mut().skip(1) {
        if burg.removed {
            continue;
        }
        let pop = burg.population;
        burg.citadel = rng.gen_bool(if burg.capital { 0.75 } else { 0.15 });
        burg.walls = rng.gen_bool(match pop {
            p if burg.capital || p > 15.0 => 0.9,
            p if p > 10.0 => 0.5,
            _ => 0.2,
        });
        burg.plaza = rng.gen_bool(match pop {
            p if p > 20.0 => 0.8,
            p if p > 10.0 => 0.5,
            _ => 0.3,
        });
        burg.temple = rng.gen_bool(if burg.capital { 0.6 } else if pop > 25.0 { 0.5 } else { 0.1 });
        burg.shanty = rng.gen_bool(if pop > 30.0 { 0.6 } else { 0.05 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationParams;
    use crate::graph::grid;
    use rand::SeedableRng;

    fn settled_world(seed: u64) -> World {
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
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.burgs);
        generate(&mut world, &mut rng);
        world
    }

    #[test]
    fn test_burg_cells_cross_reference() {
        let world = settled_world(3);
        for burg in world.burgs.iter().filter(|b| b.i != 0 && !b.removed) {
            assert_eq!(world.burg[burg.cell as usize], burg.i);
            assert!(world.is_land(burg.cell));
            assert_eq!(burg.state, world.state[burg.cell as usize]);
        }
    }

    #[test]
    fn test_ports_sit_on_coastal_cells() {
        let world = settled_world(3);
        for burg in world.burgs.iter().filter(|b| b.port != 0) {
            assert!(world.coastal[burg.cell as usize], "port burg {} inland", burg.i);
            let feature = &world.features[burg.port as usize];
            assert!(matches!(feature.kind, FeatureKind::Ocean | FeatureKind::Lake));
        }
    }

    #[test]
    fn test_population_matches_kind() {
        let world = settled_world(12);
        for burg in world.burgs.iter().filter(|b| b.i != 0 && !b.removed) {
            assert!(burg.population > 0.0);
            assert_eq!(burg.kind, BurgKind::from_population(burg.population));
        }
    }

    #[test]
    fn test_placeholder_burg_is_reserved() {
        let world = settled_world(3);
        assert_eq!(world.burgs[0].i, 0);
        assert!(world.burgs[0].removed);
    }
}

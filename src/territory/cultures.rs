//! Culture seeding and growth
//!
//! Cultures grow from spaced seed cells with the shared flood fill; the cost
//! model is shaped by the culture's type (naval folk cross water cheaply,
//! highlanders ignore the mountain penalty, and so on). Index 0 is the
//! reserved wildlands sentinel, never removed. Each culture also projects a
//! folk religion over exactly its own cells.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::expansion::{self, CostModel};
use super::{place_seed_cells, smooth_enclaves, PALETTE};
use crate::error::EngineError;
use crate::names::{self, NAME_BASES};
use crate::world::{EntityId, World};

/// Culture expansion archetype; shapes the growth cost model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CultureKind {
    Generic,
    River,
    Lake,
    Naval,
    Nomadic,
    Hunting,
    Highland,
}

impl CultureKind {
    /// Baseline expansionism multiplier for the type.
    fn expansionism_factor(self) -> f32 {
        match self {
            CultureKind::Generic => 1.0,
            CultureKind::River => 0.9,
            CultureKind::Lake => 0.8,
            CultureKind::Naval => 1.1,
            CultureKind::Nomadic => 1.3,
            CultureKind::Hunting => 0.8,
            CultureKind::Highland => 0.9,
        }
    }
}

/// A seed-grown culture region.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Culture {
    pub i: u16,
    pub name: String,
    pub color: String,
    pub kind: CultureKind,
    /// Relative growth rate; divides effective edge costs
    pub expansionism: f32,
    /// Origin cell the culture grew from
    pub center: u32,
    /// Naming-language index into `names::NAME_BASES`
    pub base: usize,
    pub removed: bool,
}

impl Culture {
    /// The reserved index-0 "no culture" sentinel.
    pub(crate) fn wildlands() -> Self {
        Culture {
            i: 0,
            name: "Wildlands".to_string(),
            color: "#fafafa".to_string(),
            kind: CultureKind::Generic,
            expansionism: 1.0,
            center: 0,
            base: names::GENERIC_BASE,
            removed: false,
        }
    }
}

impl EntityId for Culture {
    fn id(&self) -> u16 {
        self.i
    }
}

/// Seed and expand all cultures, then smooth one-cell enclaves and project
/// folk religions.
pub fn generate(world: &mut World, rng: &mut ChaCha8Rng) -> Result<(), EngineError> {
    let requested = world.params.culture_count;
    if requested == 0 {
        return Err(EngineError::NoSeeds { stage: "culture expansion" });
    }
    let centers = place_seed_cells(world, requested);
    if centers.is_empty() {
        return Err(EngineError::NoSeeds { stage: "culture expansion" });
    }

    for (idx, &center) in centers.iter().enumerate() {
        let i = (idx + 1) as u16;
        let kind = kind_for_cell(world, center, rng);
        let base = rng.gen_range(0..NAME_BASES.len());
        world.cultures.push(Culture {
            i,
            name: names::base_name(base, rng),
            color: PALETTE[idx % PALETTE.len()].to_string(),
            kind,
            expansionism: rng.gen_range(0.6..1.4) * kind.expansionism_factor(),
            center,
            base,
            removed: false,
        });
    }

    let seeds: Vec<(u16, u32)> = world
        .cultures
        .iter()
        .filter(|c| c.i != 0)
        .map(|c| (c.i, c.center))
        .collect();

    let mut claims = vec![0u16; world.graph.len()];
    let mut model = CultureCost::new(world, rng);
    expansion::expand(&world.graph, &seeds, &mut model, &mut claims);
    world.culture = claims;

    // Enclave smoothing; culture origins stay put
    let centers: Vec<u32> = world.cultures.iter().map(|c| c.center).collect();
    let edits = smooth_enclaves(world, &world.culture, |cell| centers.contains(&cell));
    for (cell, owner) in edits {
        world.culture[cell as usize] = owner;
    }

    // Folk religions cover exactly their culture's area
    world.religion.copy_from_slice(&world.culture);
    Ok(())
}

/// Pick a culture type fitting the terrain at its origin.
fn kind_for_cell<R: Rng>(world: &World, cell: u32, rng: &mut R) -> CultureKind {
    let h = world.height[cell as usize];
    if h >= world.params.highland_threshold && rng.gen_bool(0.7) {
        return CultureKind::Highland;
    }
    if world.coastal[cell as usize] && rng.gen_bool(0.5) {
        let lake_shore = world.graph.neighbors_of(cell).iter().any(|&nb| {
            world.is_water(nb)
                && world.feature_of(nb).kind == crate::world::FeatureKind::Lake
        });
        return if lake_shore { CultureKind::Lake } else { CultureKind::Naval };
    }
    if world.river[cell as usize] != 0 && rng.gen_bool(0.5) {
        return CultureKind::River;
    }
    match rng.gen_range(0..10) {
        0..=4 => CultureKind::Generic,
        5..=7 => CultureKind::Nomadic,
        _ => CultureKind::Hunting,
    }
}

/// Terrain cost model for culture growth.
struct CultureCost<'a> {
    world: &'a World,
    rng: &'a mut ChaCha8Rng,
    kinds: Vec<CultureKind>,
    expansionism: Vec<f32>,
}

impl<'a> CultureCost<'a> {
    fn new(world: &'a World, rng: &'a mut ChaCha8Rng) -> Self {
        let kinds = world.cultures.iter().map(|c| c.kind).collect();
        let expansionism = world.cultures.iter().map(|c| c.expansionism.max(0.1)).collect();
        CultureCost { world, rng, kinds, expansionism }
    }
}

impl CostModel for CultureCost<'_> {
    fn edge_cost(&mut self, owner: u16, from: u32, to: u32) -> Option<f32> {
        let p = &self.world.params;
        let kind = self.kinds[owner as usize];
        let mut cost = 10.0f32;

        if self.world.is_water(to) {
            cost += match kind {
                CultureKind::Naval => p.water_crossing_penalty * 0.2,
                CultureKind::Lake => p.water_crossing_penalty * 0.6,
                _ => p.water_crossing_penalty,
            };
        } else {
            let h_from = self.world.height[from as usize];
            let h_to = self.world.height[to as usize];
            cost += p.elevation_penalty * f32::from(h_to.saturating_sub(h_from));

            if h_to >= p.highland_threshold {
                if kind != CultureKind::Highland {
                    cost += p.highland_penalty;
                }
            } else if kind == CultureKind::Highland {
                cost += 5.0;
            }

            if self.world.river[to as usize] != 0 {
                cost *= if kind == CultureKind::River { p.river_affinity } else { 0.9 };
            }
            if kind == CultureKind::Naval && self.world.coastal[to as usize] {
                cost *= 0.7;
            }
            if kind == CultureKind::Nomadic && h_to < 40 {
                cost *= 0.8;
            }
            if kind == CultureKind::Hunting {
                cost *= 1.1;
            }
        }

        cost += self.rng.gen_range(0.0..p.cost_jitter.max(f32::MIN_POSITIVE));
        Some(cost / self.expansionism[owner as usize])
    }

    fn growth_limit(&self, _owner: u16) -> f32 {
        self.world.params.culture_growth_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationParams;
    use crate::graph::grid;
    use rand::SeedableRng;

    fn grown_world(seed: u64, limit: f32) -> World {
        let (graph, heights) = grid::build(24, 24, 10.0, seed);
        let params = GenerationParams { culture_growth_limit: limit, ..Default::default() };
        let mut world = World::new(graph, heights, params, seed).unwrap();
        crate::hydrology::run(&mut world);
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.cultures);
        generate(&mut world, &mut rng).unwrap();
        world
    }

    #[test]
    fn test_unlimited_growth_claims_all_land() {
        let world = grown_world(31, f32::INFINITY);
        for cell in world.land_cells() {
            assert_ne!(
                world.culture[cell as usize], 0,
                "land cell {cell} left unclaimed"
            );
        }
    }

    #[test]
    fn test_religion_mirrors_culture() {
        let world = grown_world(31, f32::INFINITY);
        assert_eq!(world.religion, world.culture);
    }

    #[test]
    fn test_culture_growth_is_deterministic() {
        let a = grown_world(55, 200.0);
        let b = grown_world(55, 200.0);
        assert_eq!(a.culture, b.culture);
        let names_a: Vec<&str> = a.cultures.iter().map(|c| c.name.as_str()).collect();
        let names_b: Vec<&str> = b.cultures.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn test_wildlands_sentinel_is_reserved() {
        let world = grown_world(4, 100.0);
        assert_eq!(world.cultures[0].i, 0);
        assert_eq!(world.cultures[0].name, "Wildlands");
        assert!(!world.cultures[0].removed);
    }
}

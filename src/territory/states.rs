//! State creation, expansion and derived views
//!
//! States seed at capital burgs, grow with the shared flood fill (crossing
//! into a foreign culture costs extra), get smoothed by
//! [`normalize_states`], and expose derived queries: territory poles for
//! label placement and the idempotent statistics recompute.

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::burgs::Burg;
use super::campaigns::Campaign;
use super::diplomacy::Relation;
use super::expansion::{self, CostModel};
use super::{cell_score, place_seed_cells, smooth_enclaves, PALETTE};
use crate::error::EngineError;
use crate::names;
use crate::world::{get_next_id, EntityId, World};

/// Government form, drawn at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateForm {
    Monarchy,
    Republic,
    Theocracy,
    Union,
    Horde,
}

/// A political entity owning a set of cells.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct State {
    pub i: u16,
    pub name: String,
    pub color: String,
    /// Absent on the Neutrals sentinel
    pub form: Option<StateForm>,
    /// Capital burg id, 0 on the sentinel
    pub capital: u16,
    /// Dominant culture at founding
    pub culture: u16,
    /// Capital cell
    pub center: u32,
    pub expansionism: f32,
    /// Relation to every other state, indexed by state id
    pub diplomacy: Vec<Relation>,
    pub campaigns: Vec<Campaign>,
    // Aggregate statistics, derived by `collect_statistics`
    pub cells: usize,
    pub area: f32,
    pub burgs: usize,
    pub urban: f32,
    pub rural: f32,
    /// Adjacent state ids, sorted
    pub neighbors: Vec<u16>,
    pub removed: bool,
}

impl State {
    /// The reserved index-0 "Neutrals" sentinel.
    pub(crate) fn neutrals() -> Self {
        State {
            i: 0,
            name: "Neutrals".to_string(),
            color: "#a9a9a9".to_string(),
            form: None,
            capital: 0,
            culture: 0,
            center: 0,
            expansionism: 1.0,
            diplomacy: Vec::new(),
            campaigns: Vec::new(),
            cells: 0,
            area: 0.0,
            burgs: 0,
            urban: 0.0,
            rural: 0.0,
            neighbors: Vec::new(),
            removed: false,
        }
    }

    /// Crude military power metric used by diplomacy.
    pub fn power(&self) -> f32 {
        self.cells as f32 + self.urban * 2.0
    }
}

impl EntityId for State {
    fn id(&self) -> u16 {
        self.i
    }
}

/// Create states with capital burgs, expand them, and smooth enclaves.
pub fn generate(world: &mut World, rng: &mut ChaCha8Rng) -> Result<(), EngineError> {
    if world.params.state_count == 0 {
        return Err(EngineError::NoSeeds { stage: "state expansion" });
    }
    let capitals = place_seed_cells(world, world.params.state_count);
    if capitals.is_empty() {
        return Err(EngineError::NoSeeds { stage: "state expansion" });
    }

    for (idx, &center) in capitals.iter().enumerate() {
        let i = (idx + 1) as u16;
        let culture = world.culture[center as usize];
        let base = world.cultures[culture as usize].base;
        let name = names::base_name(base, rng);

        let burg_id = get_next_id(&world.burgs);
        let (x, y) = world.graph.points[center as usize];
        world.burgs.push(Burg::capital(burg_id, center, i, culture, &name, x, y));
        world.burg[center as usize] = burg_id;

        world.states.push(State {
            i,
            name,
            color: PALETTE[(idx + 5) % PALETTE.len()].to_string(),
            form: Some(draw_form(rng)),
            capital: burg_id,
            culture,
            center,
            expansionism: rng.gen_range(0.7..1.5),
            diplomacy: Vec::new(),
            campaigns: Vec::new(),
            cells: 0,
            area: 0.0,
            burgs: 0,
            urban: 0.0,
            rural: 0.0,
            neighbors: Vec::new(),
            removed: false,
        });
    }

    let seeds: Vec<(u16, u32)> = world
        .states
        .iter()
        .filter(|s| s.i != 0)
        .map(|s| (s.i, s.center))
        .collect();

    let mut claims = vec![0u16; world.graph.len()];
    let mut model = StateCost::new(world, rng);
    expansion::expand(&world.graph, &seeds, &mut model, &mut claims);
    world.state = claims;

    normalize_states(world);
    Ok(())
}

fn draw_form<R: Rng>(rng: &mut R) -> StateForm {
    match rng.gen_range(0..10) {
        0..=4 => StateForm::Monarchy,
        5..=6 => StateForm::Republic,
        7 => StateForm::Theocracy,
        8 => StateForm::Union,
        _ => StateForm::Horde,
    }
}

/// Reassign isolated one-cell enclaves to the majority neighbor state.
/// Settlement cells are protected, and one-cell islands are left alone:
/// a strait legitimately separating two parts of a state is kept.
pub fn normalize_states(world: &mut World) {
    // Reassignments can expose new enclaves, so iterate until stable
    for _ in 0..16 {
        let edits = smooth_enclaves(world, &world.state, |cell| world.burg[cell as usize] != 0);
        if edits.is_empty() {
            break;
        }
        for (cell, owner) in edits {
            world.state[cell as usize] = owner;
        }
    }
}

/// Cells of maximal distance from the territory border of `owner`:
/// a multi-source BFS distance transform restricted to the owner's cells.
/// Used for label and capital placement. Empty territory yields no poles.
pub fn get_poles(world: &World, owner: u16) -> Vec<u32> {
    let mut dist = vec![u32::MAX; world.graph.len()];
    let mut queue = VecDeque::new();

    for cell in 0..world.graph.len() as u32 {
        if world.state[cell as usize] != owner || world.is_water(cell) {
            continue;
        }
        let on_border = world
            .graph
            .neighbors_of(cell)
            .iter()
            .any(|&nb| world.state[nb as usize] != owner || world.is_water(nb));
        if on_border {
            dist[cell as usize] = 0;
            queue.push_back(cell);
        }
    }

    while let Some(cell) = queue.pop_front() {
        for &nb in world.graph.neighbors_of(cell) {
            if world.state[nb as usize] != owner || world.is_water(nb) {
                continue;
            }
            if dist[nb as usize] == u32::MAX {
                dist[nb as usize] = dist[cell as usize] + 1;
                queue.push_back(nb);
            }
        }
    }

    let best = (0..world.graph.len() as u32)
        .filter(|&c| world.state[c as usize] == owner && world.is_land(c))
        .filter_map(|c| (dist[c as usize] != u32::MAX).then_some(dist[c as usize]))
        .max();
    match best {
        None => Vec::new(),
        Some(max) => (0..world.graph.len() as u32)
            .filter(|&c| {
                world.state[c as usize] == owner
                    && world.is_land(c)
                    && dist[c as usize] == max
            })
            .collect(),
    }
}

/// Recompute aggregate statistics for every state from scratch: cell count,
/// area, burg count, urban and rural population, adjacent states. A derived
/// view, safe to rerun after any ownership edit.
pub fn collect_statistics(world: &mut World) {
    let cell_area = world.graph.spacing * world.graph.spacing;
    let density = world.params.rural_density;
    let count = world.states.len();

    let mut cells = vec![0usize; count];
    let mut rural = vec![0.0f32; count];
    let mut neighbors: Vec<BTreeSet<u16>> = vec![BTreeSet::new(); count];

    for cell in world.land_cells() {
        let s = world.state[cell as usize] as usize;
        cells[s] += 1;
        rural[s] += density * cell_score(world, cell);
        for &nb in world.graph.neighbors_of(cell) {
            if world.is_land(nb) {
                let t = world.state[nb as usize];
                if t as usize != s {
                    neighbors[s].insert(t);
                }
            }
        }
    }

    let mut burg_count = vec![0usize; count];
    let mut urban = vec![0.0f32; count];
    for burg in world.burgs.iter().filter(|b| b.i != 0 && !b.removed) {
        let s = burg.state as usize;
        burg_count[s] += 1;
        urban[s] += burg.population;
    }

    for (idx, state) in world.states.iter_mut().enumerate() {
        state.cells = cells[idx];
        state.area = cells[idx] as f32 * cell_area;
        state.rural = rural[idx];
        state.burgs = burg_count[idx];
        state.urban = urban[idx];
        state.neighbors = neighbors[idx].iter().copied().collect();
    }
}

/// Terrain cost model for state growth: the culture model's terrain terms
/// plus a penalty for absorbing cells of a foreign culture.
struct StateCost<'a> {
    world: &'a World,
    rng: &'a mut ChaCha8Rng,
    cultures: Vec<u16>,
    expansionism: Vec<f32>,
}

impl<'a> StateCost<'a> {
    fn new(world: &'a World, rng: &'a mut ChaCha8Rng) -> Self {
        let cultures = world.states.iter().map(|s| s.culture).collect();
        let expansionism = world.states.iter().map(|s| s.expansionism.max(0.1)).collect();
        StateCost { world, rng, cultures, expansionism }
    }
}

impl CostModel for StateCost<'_> {
    fn edge_cost(&mut self, owner: u16, from: u32, to: u32) -> Option<f32> {
        let p = &self.world.params;
        let mut cost = 10.0f32;

        if self.world.is_water(to) {
            cost += p.water_crossing_penalty;
        } else {
            let h_from = self.world.height[from as usize];
            let h_to = self.world.height[to as usize];
            cost += p.elevation_penalty * f32::from(h_to.saturating_sub(h_from));
            if h_to >= p.highland_threshold {
                cost += p.highland_penalty;
            }
            if self.world.culture[to as usize] != self.cultures[owner as usize] {
                cost += 10.0;
            }
            if self.world.river[to as usize] != 0 {
                cost *= 0.9;
            }
        }

        cost += self.rng.gen_range(0.0..p.cost_jitter.max(f32::MIN_POSITIVE));
        Some(cost / self.expansionism[owner as usize])
    }

    fn growth_limit(&self, _owner: u16) -> f32 {
        self.world.params.state_growth_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationParams;
    use crate::graph::grid;
    use rand::SeedableRng;

    fn staged_world(seed: u64) -> World {
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
        generate(&mut world, &mut rng).unwrap();
        world
    }

    #[test]
    fn test_unlimited_growth_claims_all_land() {
        let world = staged_world(42);
        for cell in world.land_cells() {
            assert_ne!(world.state[cell as usize], 0);
        }
    }

    #[test]
    fn test_capitals_keep_their_state() {
        let world = staged_world(42);
        for state in world.states.iter().filter(|s| s.i != 0) {
            assert_eq!(world.state[state.center as usize], state.i);
            let capital = &world.burgs[state.capital as usize];
            assert!(capital.capital);
            assert_eq!(capital.state, state.i);
        }
    }

    #[test]
    fn test_collect_statistics_is_idempotent() {
        let mut world = staged_world(42);
        collect_statistics(&mut world);
        let first: Vec<(usize, f32, usize, f32, f32)> = world
            .states
            .iter()
            .map(|s| (s.cells, s.area, s.burgs, s.urban, s.rural))
            .collect();
        collect_statistics(&mut world);
        let second: Vec<(usize, f32, usize, f32, f32)> = world
            .states
            .iter()
            .map(|s| (s.cells, s.area, s.burgs, s.urban, s.rural))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_statistics_cells_sum_to_land() {
        let mut world = staged_world(9);
        collect_statistics(&mut world);
        let total: usize = world.states.iter().map(|s| s.cells).sum();
        assert_eq!(total, world.land_cells().len());
    }

    #[test]
    fn test_poles_lie_inside_territory() {
        let world = staged_world(42);
        for state in world.states.iter().filter(|s| s.i != 0 && s.cells > 0) {
            let poles = get_poles(&world, state.i);
            for &pole in &poles {
                assert_eq!(world.state[pole as usize], state.i);
                assert!(world.is_land(pole));
            }
        }
    }

    #[test]
    fn test_empty_territory_has_no_poles() {
        let world = staged_world(42);
        let unused = world.states.len() as u16 + 40;
        assert!(get_poles(&world, unused).is_empty());
    }

    #[test]
    fn test_no_single_cell_enclaves_after_normalization() {
        let world = staged_world(77);
        for cell in world.land_cells() {
            if world.burg[cell as usize] != 0 {
                continue;
            }
            let owner = world.state[cell as usize];
            let land_nbs: Vec<u32> = world
                .graph
                .neighbors_of(cell)
                .iter()
                .copied()
                .filter(|&nb| world.is_land(nb))
                .collect();
            if land_nbs.is_empty() {
                continue; // one-cell island, legitimately separate
            }
            assert!(
                land_nbs.iter().any(|&nb| world.state[nb as usize] == owner),
                "cell {cell} is an un-normalized enclave"
            );
        }
    }
}

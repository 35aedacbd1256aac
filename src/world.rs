//! World data container module
//!
//! Bundles the cell graph, the per-cell attribute arrays every stage mutates,
//! and the entity tables the stages fill in. The pipeline entry point
//! [`generate`] runs hydrology, territory expansion and route building in
//! fixed order; each stage takes `&mut World` plus its own seeded RNG stream.

use serde::{Deserialize, Serialize};

use crate::config::GenerationParams;
use crate::error::EngineError;
use crate::graph::{CellGraph, SEA_LEVEL};
use crate::hydrology::River;
use crate::routes::Route;
use crate::seeds::WorldSeeds;
use crate::territory::burgs::Burg;
use crate::territory::cultures::Culture;
use crate::territory::states::State;
use crate::{hydrology, routes, territory};

/// Kind of a connected region of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Placeholder for the reserved index-0 entry
    None,
    /// Water region touching the map border
    Ocean,
    /// Water region fully enclosed by land
    Lake,
    /// Connected landmass
    Island,
}

/// A connected landmass, lake or ocean region.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub i: u16,
    pub kind: FeatureKind,
    /// Number of member cells
    pub cells: usize,
    /// Whether the region touches the map border
    pub border: bool,
}

impl Feature {
    fn placeholder() -> Self {
        Feature { i: 0, kind: FeatureKind::None, cells: 0, border: false }
    }
}

/// All generated world data bundled together.
///
/// Per-cell arrays are dense, indexed by cell id, mutated in place by the
/// stages. Entity tables reserve index 0 for a sentinel entry (wildlands,
/// Neutrals, placeholder burg) so cell arrays can use 0 as "unowned".
pub struct World {
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    /// Tunable parameters for this run
    pub params: GenerationParams,
    /// The immutable spatial substrate
    pub graph: CellGraph,

    // Per-cell attribute arrays
    /// Elevation, 0..=100 with SEA_LEVEL at 20
    pub height: Vec<u8>,
    /// Depression-free elevation used for flow routing
    pub filled_height: Vec<f32>,
    /// Land cells flagged as terminal endorheic sinks
    pub endorheic: Vec<bool>,
    /// Landmass / lake / ocean region id
    pub feature: Vec<u16>,
    /// Land cells adjacent to water
    pub coastal: Vec<bool>,
    /// Accumulated water flux
    pub flux: Vec<u16>,
    /// River id occupying the cell, 0 = none
    pub river: Vec<u16>,
    /// Owning culture id, 0 = wildlands
    pub culture: Vec<u16>,
    /// Owning state id, 0 = Neutrals
    pub state: Vec<u16>,
    /// Burg occupying the cell, 0 = none
    pub burg: Vec<u16>,
    /// Folk religion id, mirrors culture ownership
    pub religion: Vec<u16>,
    /// Count of distinct routes traversing the cell
    pub road: Vec<u16>,

    // Entity tables, index 0 reserved
    pub features: Vec<Feature>,
    pub rivers: Vec<River>,
    pub cultures: Vec<Culture>,
    pub states: Vec<State>,
    pub burgs: Vec<Burg>,
    pub routes: Vec<Route>,
}

impl World {
    /// Wrap a validated graph and initial heights into a blank world.
    /// Fails fast on structural graph errors or an all-water map.
    pub fn new(
        graph: CellGraph,
        heights: Vec<u8>,
        params: GenerationParams,
        seed: u64,
    ) -> Result<Self, EngineError> {
        graph.validate()?;
        if !heights.iter().any(|&h| h >= SEA_LEVEL) {
            return Err(EngineError::NoLandCells);
        }

        let n = graph.len();
        let mut world = World {
            seeds: WorldSeeds::from_master(seed),
            params,
            graph,
            filled_height: heights.iter().map(|&h| f32::from(h)).collect(),
            height: heights,
            endorheic: vec![false; n],
            feature: vec![0; n],
            coastal: vec![false; n],
            flux: vec![0; n],
            river: vec![0; n],
            culture: vec![0; n],
            state: vec![0; n],
            burg: vec![0; n],
            religion: vec![0; n],
            road: vec![0; n],
            features: vec![Feature::placeholder()],
            rivers: vec![River::placeholder()],
            cultures: vec![Culture::wildlands()],
            states: vec![State::neutrals()],
            burgs: vec![Burg::placeholder()],
            routes: vec![Route::placeholder()],
        };
        world.mark_features();
        Ok(world)
    }

    /// Whether a cell is at or above sea level.
    pub fn is_land(&self, cell: u32) -> bool {
        self.height[cell as usize] >= SEA_LEVEL
    }

    pub fn is_water(&self, cell: u32) -> bool {
        !self.is_land(cell)
    }

    /// Indices of all land cells in ascending order.
    pub fn land_cells(&self) -> Vec<u32> {
        (0..self.graph.len() as u32).filter(|&i| self.is_land(i)).collect()
    }

    /// Label connected land/water regions and set coastal flags.
    /// Re-runs from scratch, so it is safe to call after height edits.
    pub fn mark_features(&mut self) {
        let n = self.graph.len();
        self.feature = vec![0; n];
        self.features = vec![Feature::placeholder()];

        for start in 0..n as u32 {
            if self.feature[start as usize] != 0 {
                continue;
            }
            let id = self.features.len() as u16;
            let land = self.is_land(start);
            let mut border = false;
            let mut count = 0usize;

            let mut queue = std::collections::VecDeque::from([start]);
            self.feature[start as usize] = id;
            while let Some(cell) = queue.pop_front() {
                count += 1;
                border |= self.graph.border[cell as usize];
                for &nb in self.graph.neighbors_of(cell) {
                    if self.feature[nb as usize] == 0 && self.is_land(nb) == land {
                        self.feature[nb as usize] = id;
                        queue.push_back(nb);
                    }
                }
            }

            let kind = match (land, border) {
                (true, _) => FeatureKind::Island,
                (false, true) => FeatureKind::Ocean,
                (false, false) => FeatureKind::Lake,
            };
            self.features.push(Feature { i: id, kind, cells: count, border });
        }

        for cell in 0..n as u32 {
            self.coastal[cell as usize] = self.is_land(cell)
                && self.graph.neighbors_of(cell).iter().any(|&nb| self.is_water(nb));
        }
    }

    /// Feature record for a cell.
    pub fn feature_of(&self, cell: u32) -> &Feature {
        &self.features[self.feature[cell as usize] as usize]
    }
}

/// Entities carrying a stable integer id.
pub trait EntityId {
    fn id(&self) -> u16;
}

/// Next free id for an entity table: one past the current maximum, 1 for an
/// empty table (0 is always the reserved sentinel).
pub fn get_next_id<T: EntityId>(items: &[T]) -> u16 {
    items.iter().map(EntityId::id).max().map_or(1, |max| max + 1)
}

/// Run the full generation pipeline on a supplied graph.
///
/// Stage order is fixed: hydrology reads heights, territory reads heights and
/// rivers, routes read territory and settlements. Each stage consumes its
/// own sub-seed, so the whole pipeline is reproducible from the master seed.
pub fn generate(
    graph: CellGraph,
    heights: Vec<u8>,
    params: GenerationParams,
    seed: u64,
) -> Result<World, EngineError> {
    let mut world = World::new(graph, heights, params, seed)?;
    hydrology::run(&mut world);
    territory::run(&mut world)?;
    routes::run(&mut world);
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(u16);
    impl EntityId for Item {
        fn id(&self) -> u16 {
            self.0
        }
    }

    #[test]
    fn test_get_next_id_empty() {
        let items: Vec<Item> = vec![];
        assert_eq!(get_next_id(&items), 1);
    }

    #[test]
    fn test_get_next_id_unordered() {
        let items = vec![Item(1), Item(5), Item(3)];
        assert_eq!(get_next_id(&items), 6);
    }

    #[test]
    fn test_all_water_map_is_fatal() {
        let (graph, _) = crate::graph::grid::build(8, 8, 10.0, 3);
        let heights = vec![5u8; graph.len()];
        let result = World::new(graph, heights, GenerationParams::default(), 1);
        assert!(matches!(result, Err(EngineError::NoLandCells)));
    }

    #[test]
    fn test_features_partition_cells() {
        let (graph, heights) = crate::graph::grid::build(16, 16, 10.0, 11);
        let world = World::new(graph, heights, GenerationParams::default(), 1).unwrap();
        // Every cell belongs to exactly one feature, and feature kinds agree
        // with the land/water class of their members.
        for cell in 0..world.graph.len() as u32 {
            let feature = world.feature_of(cell);
            assert_ne!(feature.i, 0);
            match feature.kind {
                FeatureKind::Island => assert!(world.is_land(cell)),
                FeatureKind::Ocean | FeatureKind::Lake => assert!(world.is_water(cell)),
                FeatureKind::None => panic!("cell {cell} mapped to placeholder feature"),
            }
        }
    }
}

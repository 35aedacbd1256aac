//! Territory expansion engine
//!
//! Grows cultures and states outward from seed points with the shared
//! [`expansion`] flood fill, places and specifies settlements, then derives
//! diplomacy and historical campaigns. Stage order within the engine is
//! fixed: cultures, states, burgs, statistics, diplomacy, campaigns.

pub mod burgs;
pub mod campaigns;
pub mod cultures;
pub mod diplomacy;
pub mod expansion;
pub mod states;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::EngineError;
use crate::graph::SEA_LEVEL;
use crate::world::World;

/// Distinguishable entity colors, assigned round-robin.
pub(crate) const PALETTE: [&str; 16] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f",
    "#e5c494", "#b3b3b3", "#7fc97f", "#beaed4", "#fdc086", "#ffff99",
    "#386cb0", "#f0027f", "#bf5b17", "#666666",
];

/// Run the whole territory stage.
pub fn run(world: &mut World) -> Result<(), EngineError> {
    let mut culture_rng = ChaCha8Rng::seed_from_u64(world.seeds.cultures);
    cultures::generate(world, &mut culture_rng)?;

    let mut state_rng = ChaCha8Rng::seed_from_u64(world.seeds.states);
    states::generate(world, &mut state_rng)?;

    let mut burg_rng = ChaCha8Rng::seed_from_u64(world.seeds.burgs);
    burgs::generate(world, &mut burg_rng);

    states::collect_statistics(world);
    diplomacy::generate(world, &mut state_rng);
    campaigns::generate(world, &mut state_rng);
    Ok(())
}

/// Habitability score of a cell for seeding and settlement placement.
/// Lowland near water with a river scores best; water scores zero.
pub(crate) fn cell_score(world: &World, cell: u32) -> f32 {
    let h = world.height[cell as usize];
    if h < SEA_LEVEL {
        return 0.0;
    }
    let mut score = match h {
        0..=39 => 1.0,
        40..=59 => 0.7,
        60..=79 => 0.3,
        _ => 0.1,
    };
    if world.coastal[cell as usize] {
        score += 0.4;
    }
    if world.river[cell as usize] != 0 {
        score += 0.5;
    }
    score
}

/// Pick `count` high-scoring land cells with mutual spacing. The spacing
/// requirement is halved until enough candidates fit, so small maps still
/// seed every owner.
pub(crate) fn place_seed_cells(world: &World, count: usize) -> Vec<u32> {
    let mut ranked: Vec<u32> = world
        .land_cells()
        .into_iter()
        .filter(|&c| cell_score(world, c) > 0.0)
        .collect();
    ranked.sort_by(|&a, &b| {
        cell_score(world, b)
            .total_cmp(&cell_score(world, a))
            .then(a.cmp(&b))
    });

    let (w, h) = world.graph.extent;
    let mut spacing = (w * h / count.max(1) as f32).sqrt() / 2.0;
    let mut chosen: Vec<u32> = Vec::with_capacity(count);
    while chosen.len() < count && spacing >= world.graph.spacing / 4.0 {
        for &cell in &ranked {
            if chosen.len() == count {
                break;
            }
            if chosen.contains(&cell) {
                continue;
            }
            let clear = chosen
                .iter()
                .all(|&other| world.graph.distance(cell, other) >= spacing);
            if clear {
                chosen.push(cell);
            }
        }
        spacing /= 2.0;
    }
    chosen
}

/// Compute enclave reassignments: land cells with no same-owner land
/// neighbor move to the majority owner among their land neighbors. Cells
/// where `protected` holds are left alone, as are one-cell islands (a real
/// geographic barrier, not an enclave).
pub(crate) fn smooth_enclaves<F: Fn(u32) -> bool>(
    world: &World,
    ownership: &[u16],
    protected: F,
) -> Vec<(u32, u16)> {
    let mut edits = Vec::new();
    for cell in world.land_cells() {
        if protected(cell) {
            continue;
        }
        let owner = ownership[cell as usize];
        let land_nbs: Vec<u32> = world
            .graph
            .neighbors_of(cell)
            .iter()
            .copied()
            .filter(|&nb| world.is_land(nb))
            .collect();
        if land_nbs.is_empty() || land_nbs.iter().any(|&nb| ownership[nb as usize] == owner) {
            continue;
        }

        // Majority land-neighbor owner, ties to the smaller id
        let mut counts: std::collections::BTreeMap<u16, usize> = std::collections::BTreeMap::new();
        for &nb in &land_nbs {
            *counts.entry(ownership[nb as usize]).or_insert(0) += 1;
        }
        if let Some((&winner, _)) = counts.iter().max_by_key(|&(&id, &n)| (n, std::cmp::Reverse(id))) {
            edits.push((cell, winner));
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationParams;
    use crate::graph::grid;

    #[test]
    fn test_seed_cells_are_spaced_and_on_land() {
        let (graph, heights) = grid::build(24, 24, 10.0, 17);
        let world = World::new(graph, heights, GenerationParams::default(), 17).unwrap();
        let seeds = place_seed_cells(&world, 6);
        assert!(!seeds.is_empty());
        for &cell in &seeds {
            assert!(world.is_land(cell));
        }
        // No duplicates
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
    }
}

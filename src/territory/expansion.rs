//! Cost-based multi-source flood fill
//!
//! The one growth algorithm behind both culture and state expansion: every
//! seed is pushed into a shared priority queue keyed by accumulated traversal
//! cost, the globally cheapest candidate pops first, and the first owner to
//! reach a cell keeps it. Ties are broken by cell index, then owner id, so a
//! run is fully determined by the seed list and the cost model.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::CellGraph;

/// Terrain-aware cost model steering one expansion pass.
pub trait CostModel {
    /// Cost of expanding from `from` onto `to` for `owner`.
    /// `None` marks the step impassable.
    fn edge_cost(&mut self, owner: u16, from: u32, to: u32) -> Option<f32>;

    /// Maximum accumulated cost the owner may spend from its origin.
    fn growth_limit(&self, owner: u16) -> f32;
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    cost: f32,
    cell: u32,
    owner: u16,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the cheapest candidate pops
        // first, with (cell, owner) as the stable tie-break.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.cell.cmp(&self.cell))
            .then_with(|| other.owner.cmp(&self.owner))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Expand all owners simultaneously over the graph, writing winners into
/// `claims` (0 = unclaimed). Ownership, once assigned, is final for the
/// pass; the queue drains completely.
pub fn expand<C: CostModel>(
    graph: &CellGraph,
    seeds: &[(u16, u32)],
    model: &mut C,
    claims: &mut [u16],
) {
    let mut heap = BinaryHeap::with_capacity(graph.len());
    for &(owner, cell) in seeds {
        heap.push(Candidate { cost: 0.0, cell, owner });
    }

    while let Some(Candidate { cost, cell, owner }) = heap.pop() {
        if claims[cell as usize] != 0 {
            continue;
        }
        claims[cell as usize] = owner;

        for &nb in graph.neighbors_of(cell) {
            if claims[nb as usize] != 0 {
                continue;
            }
            if let Some(edge) = model.edge_cost(owner, cell, nb) {
                let total = cost + edge;
                if total <= model.growth_limit(owner) {
                    heap.push(Candidate { cost: total, cell: nb, owner });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UniformCost;

    impl CostModel for UniformCost {
        fn edge_cost(&mut self, _owner: u16, _from: u32, _to: u32) -> Option<f32> {
            Some(1.0)
        }

        fn growth_limit(&self, _owner: u16) -> f32 {
            f32::INFINITY
        }
    }

    /// 3x3 lattice with 4-connectivity.
    fn toy_graph() -> CellGraph {
        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); 9];
        for y in 0..3i32 {
            for x in 0..3i32 {
                let i = (y * 3 + x) as usize;
                for (dx, dy) in [(0, -1), (-1, 0), (1, 0), (0, 1)] {
                    let (nx, ny) = (x + dx, y + dy);
                    if (0..3).contains(&nx) && (0..3).contains(&ny) {
                        neighbors[i].push((ny * 3 + nx) as u32);
                    }
                }
            }
        }
        CellGraph {
            points: (0..9).map(|i| ((i % 3) as f32, (i / 3) as f32)).collect(),
            neighbors,
            border: vec![true, true, true, true, false, true, true, true, true],
            extent: (3.0, 3.0),
            spacing: 1.0,
        }
    }

    #[test]
    fn test_two_seeds_partition_toy_graph() {
        let graph = toy_graph();
        let mut claims = vec![0u16; 9];
        expand(&graph, &[(1, 0), (2, 8)], &mut UniformCost, &mut claims);

        // Every cell claimed by exactly one owner
        assert!(claims.iter().all(|&c| c == 1 || c == 2));

        // Equidistant cells resolve to the lower (cell, owner) candidate:
        // the center and the two anti-diagonal corners go to owner 1.
        assert_eq!(claims[4], 1);
        assert_eq!(claims.iter().filter(|&&c| c == 1).count(), 6);
        assert_eq!(claims.iter().filter(|&&c| c == 2).count(), 3);

        // Both territories are connected
        for owner in [1u16, 2] {
            let cells: Vec<u32> =
                (0..9u32).filter(|&i| claims[i as usize] == owner).collect();
            let mut seen = vec![cells[0]];
            let mut queue = vec![cells[0]];
            while let Some(cell) = queue.pop() {
                for &nb in graph.neighbors_of(cell) {
                    if claims[nb as usize] == owner && !seen.contains(&nb) {
                        seen.push(nb);
                        queue.push(nb);
                    }
                }
            }
            assert_eq!(seen.len(), cells.len(), "owner {owner} territory split");
        }
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let graph = toy_graph();
        let mut a = vec![0u16; 9];
        let mut b = vec![0u16; 9];
        expand(&graph, &[(1, 0), (2, 8)], &mut UniformCost, &mut a);
        expand(&graph, &[(1, 0), (2, 8)], &mut UniformCost, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_growth_limit_bounds_territory() {
        struct Limited;
        impl CostModel for Limited {
            fn edge_cost(&mut self, _: u16, _: u32, _: u32) -> Option<f32> {
                Some(1.0)
            }
            fn growth_limit(&self, _: u16) -> f32 {
                1.0
            }
        }

        let graph = toy_graph();
        let mut claims = vec![0u16; 9];
        expand(&graph, &[(1, 0)], &mut Limited, &mut claims);

        // Seed plus its two orthogonal neighbors only
        assert_eq!(claims.iter().filter(|&&c| c == 1).count(), 3);
        assert_eq!(claims[8], 0);
    }
}

//! Cell graph substrate
//!
//! The spatial foundation every stage reads and annotates: indexed cells with
//! centroid coordinates and symmetric neighbor lists. Topology is fixed after
//! construction; downstream stages only write per-cell attribute arrays.
//!
//! The graph is normally supplied by the host application (a Voronoi dual of
//! a Delaunay triangulation). [`grid`] provides a jittered-grid stand-in used
//! by the CLI driver and the test suite.

pub mod grid;

use crate::error::EngineError;

/// Height at which a cell counts as land. Heights run 0..=100.
pub const SEA_LEVEL: u8 = 20;

/// Immutable planar cell graph.
#[derive(Clone, Debug)]
pub struct CellGraph {
    /// Cell centroid coordinates, indexed by cell id
    pub points: Vec<(f32, f32)>,
    /// Ordered neighbor lists, symmetric by construction
    pub neighbors: Vec<Vec<u32>>,
    /// Cells lying on the map boundary
    pub border: Vec<bool>,
    /// Map extent in map units
    pub extent: (f32, f32),
    /// Mean distance between adjacent cell centroids
    pub spacing: f32,
}

impl CellGraph {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Neighbor cells of `cell`.
    pub fn neighbors_of(&self, cell: u32) -> &[u32] {
        &self.neighbors[cell as usize]
    }

    /// Euclidean distance between two cell centroids.
    pub fn distance(&self, a: u32, b: u32) -> f32 {
        let (ax, ay) = self.points[a as usize];
        let (bx, by) = self.points[b as usize];
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Cell whose centroid is closest to a point. Linear scan; the engine
    /// only needs this at stage boundaries, not in inner loops.
    pub fn find_cell(&self, x: f32, y: f32) -> Option<u32> {
        let mut best: Option<(u32, f32)> = None;
        for (i, &(px, py)) in self.points.iter().enumerate() {
            let d = (px - x).powi(2) + (py - y).powi(2);
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((i as u32, d)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Validate structural invariants: non-empty, neighbor indices in range,
    /// symmetric adjacency, single connected component. Called once before
    /// any stage runs; a failure here aborts generation.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.is_empty() {
            return Err(EngineError::EmptyGraph);
        }

        let n = self.len() as u32;
        for (i, nbs) in self.neighbors.iter().enumerate() {
            let cell = i as u32;
            for &nb in nbs {
                if nb >= n {
                    return Err(EngineError::NeighborOutOfRange { cell, neighbor: nb });
                }
                if !self.neighbors[nb as usize].contains(&cell) {
                    return Err(EngineError::AsymmetricAdjacency { a: cell, b: nb });
                }
            }
        }

        // Connectivity check via BFS from cell 0
        let mut seen = vec![false; self.len()];
        let mut queue = std::collections::VecDeque::from([0u32]);
        seen[0] = true;
        let mut reached = 1usize;
        while let Some(cell) = queue.pop_front() {
            for &nb in self.neighbors_of(cell) {
                if !seen[nb as usize] {
                    seen[nb as usize] = true;
                    reached += 1;
                    queue.push_back(nb);
                }
            }
        }
        if reached < self.len() {
            return Err(EngineError::DisconnectedGraph {
                unreached: self.len() - reached,
                total: self.len(),
            });
        }

        Ok(())
    }
}

//! Jittered-grid graph builder
//!
//! Builds a cell graph from a jittered square lattice with 8-connectivity and
//! a Perlin-based base elevation field: close enough to a Voronoi mesh for
//! the engine's purposes, and fully deterministic for a given seed. Elevation
//! falls off toward the map boundary so every map is ringed by ocean.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::CellGraph;

/// Noise octaves for the base elevation field
const OCTAVES: u32 = 4;
/// Fraction of cell spacing used for point jitter
const JITTER: f32 = 0.45;

/// Build a jittered-grid cell graph together with its initial height array.
pub fn build(cells_x: usize, cells_y: usize, spacing: f32, seed: u64) -> (CellGraph, Vec<u8>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = cells_x * cells_y;

    let mut points = Vec::with_capacity(n);
    let mut border = Vec::with_capacity(n);
    for y in 0..cells_y {
        for x in 0..cells_x {
            let jx: f32 = rng.gen_range(-JITTER..JITTER);
            let jy: f32 = rng.gen_range(-JITTER..JITTER);
            points.push((
                (x as f32 + 0.5 + jx) * spacing,
                (y as f32 + 0.5 + jy) * spacing,
            ));
            border.push(x == 0 || y == 0 || x == cells_x - 1 || y == cells_y - 1);
        }
    }

    // 8-connected lattice adjacency (no wrapping: the map is a bounded plane)
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::with_capacity(8); n];
    for y in 0..cells_y {
        for x in 0..cells_x {
            let i = y * cells_x + x;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= cells_x as i32 || ny >= cells_y as i32 {
                        continue;
                    }
                    neighbors[i].push((ny as usize * cells_x + nx as usize) as u32);
                }
            }
        }
    }

    let graph = CellGraph {
        points,
        neighbors,
        border,
        extent: (cells_x as f32 * spacing, cells_y as f32 * spacing),
        spacing,
    };

    let heights = elevation_field(&graph, cells_x, cells_y, seed);
    (graph, heights)
}

/// Sample a multi-octave Perlin field at every cell, shaped by an edge
/// falloff so land concentrates away from the boundary.
fn elevation_field(graph: &CellGraph, cells_x: usize, cells_y: usize, seed: u64) -> Vec<u8> {
    let perlin = Perlin::new(seed as u32);
    let freq = 3.0 / cells_x.max(cells_y) as f64;

    graph
        .points
        .iter()
        .enumerate()
        .map(|(i, &(px, py))| {
            let mut amp = 1.0f64;
            let mut sum = 0.0f64;
            let mut norm = 0.0f64;
            for octave in 0..OCTAVES {
                let f = freq * f64::from(1u32 << octave) / graph.spacing as f64;
                sum += amp * perlin.get([px as f64 * f, py as f64 * f]);
                norm += amp;
                amp *= 0.5;
            }
            let base = (sum / norm) * 0.5 + 0.5; // 0..1

            // Distance from map center in max-norm, 0 at center, 1 at edge
            let x = i % cells_x;
            let y = i / cells_x;
            let dx = (x as f32 / (cells_x - 1).max(1) as f32 - 0.5).abs() * 2.0;
            let dy = (y as f32 / (cells_y - 1).max(1) as f32 - 0.5).abs() * 2.0;
            let edge = dx.max(dy);
            let falloff = (1.0 - edge.powi(3)) as f64;

            (base * falloff * 100.0).round().clamp(0.0, 100.0) as u8
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SEA_LEVEL;

    #[test]
    fn test_grid_graph_is_valid() {
        let (graph, heights) = build(16, 12, 10.0, 99);
        assert_eq!(graph.len(), 16 * 12);
        assert_eq!(heights.len(), graph.len());
        graph.validate().expect("grid graph must validate");
    }

    #[test]
    fn test_border_cells_are_ocean() {
        let (graph, heights) = build(24, 24, 10.0, 7);
        for i in 0..graph.len() {
            if graph.border[i] {
                assert!(heights[i] < SEA_LEVEL, "border cell {i} must be water");
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let (g1, h1) = build(12, 12, 10.0, 123);
        let (g2, h2) = build(12, 12, 10.0, 123);
        assert_eq!(h1, h2);
        assert_eq!(g1.points, g2.points);
    }
}

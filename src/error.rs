//! Engine error taxonomy
//!
//! Structural input problems are fatal and reported before any stage runs.
//! Degenerate-but-valid outcomes (endorheic basins, empty territories,
//! unreachable burg pairs) are recorded in the data model instead.

use thiserror::Error;

/// Fatal conditions raised by the generation pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The supplied graph has no cells at all.
    #[error("cell graph is empty")]
    EmptyGraph,

    /// Neighbor lists are not symmetric: `a` lists `b` but not vice versa.
    #[error("asymmetric adjacency between cells {a} and {b}")]
    AsymmetricAdjacency { a: u32, b: u32 },

    /// A neighbor index points outside the cell range.
    #[error("cell {cell} references out-of-range neighbor {neighbor}")]
    NeighborOutOfRange { cell: u32, neighbor: u32 },

    /// The graph is not a single connected component.
    #[error("cell graph is disconnected: {unreached} of {total} cells unreachable from cell 0")]
    DisconnectedGraph { unreached: usize, total: usize },

    /// Territory expansion needs at least one land cell to work with.
    #[error("map has no land cells above sea level")]
    NoLandCells,

    /// A stage was asked to run with zero owners to expand.
    #[error("{stage} requires at least one seed entity")]
    NoSeeds { stage: &'static str },
}

//! Procedural geography and territory engine
//!
//! Generates a fantasy region from a single master seed: a jittered cell
//! graph with noise elevation, rivers routed over depression-free heights,
//! cultures and states grown by cost-based flood fill, settlements, folk
//! religions, diplomacy with campaign histories, and a road, trail and sea
//! route network. Every stage draws from its own seeded RNG stream, so the
//! same seed and parameters always reproduce the same world.

pub mod config;
pub mod error;
pub mod graph;
pub mod hydrology;
pub mod names;
pub mod routes;
pub mod seeds;
pub mod territory;
pub mod world;

pub use config::GenerationParams;
pub use error::EngineError;
pub use seeds::WorldSeeds;
pub use world::{generate, World};

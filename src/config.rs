//! Configuration parameters for the geography engine
//!
//! Every numeric knob the stages use lives here. The expansion cost model and
//! the river flux threshold in particular are calibration targets, so they are
//! exposed as plain fields rather than buried constants.

use serde::{Deserialize, Serialize};

/// Main configuration for a generation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationParams {
    // Hydrology
    /// Water volume added to every land cell before routing
    pub precipitation: u16,
    /// Accumulated flux at which a river is instantiated
    pub river_flux_threshold: u16,
    /// Maximum iterations for depression resolution before cells
    /// are flagged endorheic
    pub depression_max_iterations: usize,
    /// Height epsilon added when raising a local minimum
    pub depression_epsilon: f32,
    /// Lateral meander offset as a fraction of cell spacing
    pub meander_factor: f32,
    /// Multiplier from discharge to rendered river width
    pub river_width_factor: f32,

    // Cultures
    /// Number of cultures to seed (excluding the wildlands sentinel)
    pub culture_count: usize,
    /// Maximum accumulated cost a culture may spend expanding
    pub culture_growth_limit: f32,

    // States
    /// Number of states to seed (excluding the Neutrals sentinel)
    pub state_count: usize,
    /// Maximum accumulated cost a state may spend expanding
    pub state_growth_limit: f32,
    /// Target number of non-capital burgs; scaled down on small maps
    pub town_count: usize,
    /// Rural population carried by one cell at score 1.0
    pub rural_density: f32,

    // Expansion cost model (tunable, see module docs)
    /// Cost of stepping onto a water cell
    pub water_crossing_penalty: f32,
    /// Cost multiplier per point of elevation gained
    pub elevation_penalty: f32,
    /// Extra cost for cells at or above this height (mountains)
    pub highland_threshold: u8,
    /// Penalty applied above the highland threshold
    pub highland_penalty: f32,
    /// Discount applied to river cells for river-type cultures
    pub river_affinity: f32,
    /// Random jitter range applied to each edge cost
    pub cost_jitter: f32,

    // Routes
    /// Cost discount for cells already carrying a route
    pub road_reuse_discount: f32,
    /// Elevation-delta weight in road cost
    pub road_slope_weight: f32,
    /// Max search cost before a connection attempt is abandoned
    pub route_search_limit: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            precipitation: 2,
            river_flux_threshold: 30,
            depression_max_iterations: 250,
            depression_epsilon: 0.1,
            meander_factor: 0.3,
            river_width_factor: 1.0,

            culture_count: 8,
            culture_growth_limit: 150.0,

            state_count: 12,
            state_growth_limit: 120.0,
            town_count: 60,
            rural_density: 1.0,

            water_crossing_penalty: 60.0,
            elevation_penalty: 0.6,
            highland_threshold: 62,
            highland_penalty: 25.0,
            river_affinity: 0.5,
            cost_jitter: 2.0,

            road_reuse_discount: 0.5,
            road_slope_weight: 0.08,
            route_search_limit: 5_000.0,
        }
    }
}

//! Hydrology engine: flow routing, depression resolution and river carving
//!
//! Water is routed downhill in a single pass over land cells in strict
//! descending-elevation order, so every cell's inflow is fully known before
//! it is routed onward. Local minima are raised first by iterative depression
//! resolution; cells that stay depressed after the iteration cap become
//! endorheic sinks, a legitimate terminal state rather than an error.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::graph::SEA_LEVEL;
use crate::names;
use crate::world::{get_next_id, EntityId, World};

/// River classification by discharge at the mouth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiverKind {
    Brook,
    Creek,
    Stream,
    River,
    /// Tributary that merges into a larger river
    Fork,
}

/// An ordered downhill path of cells carrying accumulated flux.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct River {
    pub i: u16,
    /// Cell where the river is instantiated
    pub source: u32,
    /// Water cell (or endorheic sink) terminating the path
    pub mouth: u32,
    /// Downstream river this one merges into, 0 = drains to a water body
    pub parent: u16,
    /// Root river id of the drainage basin
    pub basin: u16,
    /// Ordered cell path from source to mouth
    pub cells: Vec<u32>,
    /// Meandered render points
    pub points: Vec<(f32, f32)>,
    /// Flux at the mouth
    pub discharge: u16,
    /// Polyline length in map units
    pub length: f32,
    /// Rendered width at the mouth
    pub width: f32,
    pub kind: RiverKind,
    pub name: String,
    pub removed: bool,
}

impl River {
    pub(crate) fn placeholder() -> Self {
        River {
            i: 0,
            source: 0,
            mouth: 0,
            parent: 0,
            basin: 0,
            cells: Vec::new(),
            points: Vec::new(),
            discharge: 0,
            length: 0.0,
            width: 0.0,
            kind: RiverKind::Brook,
            name: String::new(),
            removed: true,
        }
    }

    fn new(i: u16, source: u32) -> Self {
        River { i, source, mouth: source, cells: vec![source], removed: false, ..Self::placeholder() }
    }
}

impl EntityId for River {
    fn id(&self) -> u16 {
        self.i
    }
}

/// Run the full hydrology stage: height perturbation, depression resolution,
/// flux routing and river finalization.
pub fn run(world: &mut World) {
    let mut height_rng = ChaCha8Rng::seed_from_u64(world.seeds.heights);
    alter_heights(world, &mut height_rng);
    resolve_depressions(world);

    let mut river_rng = ChaCha8Rng::seed_from_u64(world.seeds.rivers);
    generate(world, &mut river_rng);
}

/// Apply small per-cell perturbations to land heights so artificial plateaus
/// break into distinct drainage levels. Never changes a cell's land/water
/// class.
pub fn alter_heights<R: Rng>(world: &mut World, rng: &mut R) {
    for cell in 0..world.graph.len() {
        let h = world.height[cell];
        if h < SEA_LEVEL {
            continue;
        }
        let delta: i16 = rng.gen_range(-1..=1);
        world.height[cell] = (i16::from(h) + delta).clamp(i16::from(SEA_LEVEL), 100) as u8;
    }
    for cell in 0..world.graph.len() {
        world.filled_height[cell] = f32::from(world.height[cell]);
    }
}

/// Raise local minima until every land cell has a strictly lower neighbor,
/// or the iteration cap is hit. Cells still depressed after the cap are
/// flagged endorheic. Border cells are treated as outlets and never raised.
/// Returns the number of iterations used.
pub fn resolve_depressions(world: &mut World) -> usize {
    let cap = world.params.depression_max_iterations;
    let epsilon = world.params.depression_epsilon;
    let land = world.land_cells();

    let mut iterations = 0;
    for _ in 0..cap {
        iterations += 1;
        let mut depressed = 0usize;
        for &cell in &land {
            if world.graph.border[cell as usize] {
                continue;
            }
            let min_nb = min_neighbor_height(world, cell);
            if world.filled_height[cell as usize] <= min_nb {
                world.filled_height[cell as usize] = min_nb + epsilon;
                depressed += 1;
            }
        }
        if depressed == 0 {
            break;
        }
    }

    // Whatever still lacks a downhill exit is a terminal sink
    for &cell in &land {
        if world.graph.border[cell as usize] {
            continue;
        }
        if world.filled_height[cell as usize] <= min_neighbor_height(world, cell) {
            world.endorheic[cell as usize] = true;
        }
    }

    iterations
}

fn min_neighbor_height(world: &World, cell: u32) -> f32 {
    world
        .graph
        .neighbors_of(cell)
        .iter()
        .map(|&nb| world.filled_height[nb as usize])
        .fold(f32::INFINITY, f32::min)
}

/// Lowest neighbor strictly below `cell` on the filled surface, ties broken
/// by cell index for determinism.
fn downhill_neighbor(world: &World, cell: u32) -> Option<u32> {
    let own = world.filled_height[cell as usize];
    let mut best: Option<u32> = None;
    for &nb in world.graph.neighbors_of(cell) {
        let h = world.filled_height[nb as usize];
        if h >= own {
            continue;
        }
        best = match best {
            None => Some(nb),
            Some(cur) => {
                let ch = world.filled_height[cur as usize];
                if h < ch || (h == ch && nb < cur) {
                    Some(nb)
                } else {
                    Some(cur)
                }
            }
        };
    }
    best
}

/// Route flux downhill over all land cells in descending elevation order,
/// instantiate rivers where flux passes the threshold, merge confluences
/// keeping the higher-flux parent, then meander, classify and name each
/// river.
pub fn generate<R: Rng>(world: &mut World, rng: &mut R) {
    let threshold = world.params.river_flux_threshold;
    let precipitation = world.params.precipitation;

    let mut order = world.land_cells();
    order.sort_by(|&a, &b| {
        world.filled_height[b as usize]
            .total_cmp(&world.filled_height[a as usize])
            .then(a.cmp(&b))
    });

    for &cell in &order {
        world.flux[cell as usize] = world.flux[cell as usize].saturating_add(precipitation);

        let Some(next) = downhill_neighbor(world, cell) else {
            // Terminal sink: river (if any) ends here as an endorheic mouth
            world.endorheic[cell as usize] = true;
            let r = world.river[cell as usize];
            if r != 0 {
                let flux = world.flux[cell as usize];
                let river = &mut world.rivers[r as usize];
                river.mouth = cell;
                river.discharge = river.discharge.max(flux);
            }
            continue;
        };

        if world.flux[cell as usize] >= threshold && world.river[cell as usize] == 0 {
            let id = get_next_id(&world.rivers);
            world.river[cell as usize] = id;
            world.rivers.push(River::new(id, cell));
        }

        let r = world.river[cell as usize];
        let flux_here = world.flux[cell as usize];

        if world.is_water(next) {
            if r != 0 {
                let river = &mut world.rivers[r as usize];
                river.cells.push(next);
                river.mouth = next;
                river.discharge = river.discharge.max(flux_here);
            }
        } else {
            if r != 0 {
                let resident = world.river[next as usize];
                if resident == 0 {
                    world.river[next as usize] = r;
                    world.rivers[r as usize].cells.push(next);
                } else if resident != r {
                    merge_rivers(world, r, resident, cell, next);
                }
            }
            world.flux[next as usize] = world.flux[next as usize].saturating_add(flux_here);
        }
    }

    propagate_basins(world);

    let perlin = Perlin::new(world.seeds.rivers as u32);
    for id in 1..world.rivers.len() {
        if world.rivers[id].removed {
            continue;
        }
        let points = add_meandering(world, &world.rivers[id].cells.clone(), &perlin);
        world.rivers[id].points = points;
        specify(world, id as u16, rng);
    }
}

/// Merge two rivers meeting at `junction`: the one carrying more flux keeps
/// the downstream path, the other becomes its tributary.
fn merge_rivers(world: &mut World, incoming: u16, resident: u16, from: u32, junction: u32) {
    let incoming_flux = world.flux[from as usize];
    let resident_flux = world.flux[junction as usize];

    let (winner, loser, loser_flux) = if incoming_flux > resident_flux {
        (incoming, resident, resident_flux)
    } else {
        (resident, incoming, incoming_flux)
    };

    if winner == incoming {
        world.river[junction as usize] = incoming;
        world.rivers[incoming as usize].cells.push(junction);
    }

    let tributary = &mut world.rivers[loser as usize];
    tributary.parent = winner;
    tributary.mouth = junction;
    tributary.discharge = tributary.discharge.max(loser_flux);
    if *tributary.cells.last().unwrap_or(&junction) != junction {
        tributary.cells.push(junction);
    }
}

/// Assign each river the basin id of its drainage root (the river with no
/// downstream parent). Tributary chains share the root's basin.
fn propagate_basins(world: &mut World) {
    let count = world.rivers.len();
    for id in 1..count {
        let mut root = id as u16;
        let mut hops = 0;
        while world.rivers[root as usize].parent != 0 && hops < count {
            root = world.rivers[root as usize].parent;
            hops += 1;
        }
        world.rivers[id].basin = root;
    }
}

/// Insert interpolated off-path control points with noise-driven lateral
/// offsets bounded by a fraction of the cell spacing. Changes rendering
/// only, never the routed path.
pub fn add_meandering(world: &World, cells: &[u32], perlin: &Perlin) -> Vec<(f32, f32)> {
    let max_offset = world.params.meander_factor * world.graph.spacing;
    let mut points = Vec::with_capacity(cells.len() * 2);

    for pair in cells.windows(2) {
        let (ax, ay) = world.graph.points[pair[0] as usize];
        let (bx, by) = world.graph.points[pair[1] as usize];
        points.push((ax, ay));

        let (mx, my) = ((ax + bx) / 2.0, (ay + by) / 2.0);
        let len = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
        if len > f32::EPSILON {
            // Unit perpendicular to the segment
            let (px, py) = (-(by - ay) / len, (bx - ax) / len);
            let n = perlin.get([f64::from(mx) * 0.05, f64::from(my) * 0.05]) as f32;
            let offset = n.clamp(-1.0, 1.0) * max_offset;
            points.push((mx + px * offset, my + py * offset));
        }
    }
    if let Some(&last) = cells.last() {
        points.push(world.graph.points[last as usize]);
    }
    points
}

/// Assign derived name, type, width, length and basin metadata once the
/// path is finalized.
pub fn specify<R: Rng>(world: &mut World, id: u16, rng: &mut R) {
    let threshold = world.params.river_flux_threshold;
    let (discharge, parent, length) = {
        let river = &world.rivers[id as usize];
        (river.discharge, river.parent, polyline_length(&river.points))
    };

    let kind = if parent != 0 && discharge < threshold.saturating_mul(3) {
        RiverKind::Fork
    } else if discharge < threshold.saturating_mul(2) {
        RiverKind::Brook
    } else if discharge < threshold.saturating_mul(4) {
        RiverKind::Creek
    } else if discharge < threshold.saturating_mul(8) {
        RiverKind::Stream
    } else {
        RiverKind::River
    };

    let river = &mut world.rivers[id as usize];
    river.length = length;
    river.width = get_width(discharge) * world.params.river_width_factor;
    river.kind = kind;
    river.name = names::base_name(names::GENERIC_BASE, rng);
}

/// Rendered river width from discharge; monotonically non-decreasing.
pub fn get_width(flux: u16) -> f32 {
    f32::from(flux).sqrt() * 0.15
}

/// Path description for rendering: ordered points with half-widths tapering
/// from source to mouth. Pure derivation, mutates nothing.
pub fn get_river_path(points: &[(f32, f32)], width_factor: f32) -> Vec<(f32, f32, f32)> {
    let n = points.len();
    points
        .iter()
        .enumerate()
        .map(|(k, &(x, y))| {
            let t = if n > 1 { k as f32 / (n - 1) as f32 } else { 0.0 };
            (x, y, width_factor * (0.1 + 0.9 * t))
        })
        .collect()
}

fn polyline_length(points: &[(f32, f32)]) -> f32 {
    points
        .windows(2)
        .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
        .sum()
}

//! Route network: roads, trails and sea routes
//!
//! Roads chain every capital to the nearest already-connected capital,
//! trails link the remaining settlements within each landmass, and sea
//! routes link ports sharing a water body. All three ride on a shared
//! Dijkstra search over cell edges; a route is stored once regardless of
//! travel direction, and every cell it crosses counts it in the per-cell
//! road tally.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::names;
use crate::world::{get_next_id, EntityId, World};

/// Transport class of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteGroup {
    Road,
    Trail,
    Searoute,
}

/// A stored path through the cell graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub i: u16,
    pub group: RouteGroup,
    /// Traversed cells in travel order
    pub cells: Vec<u32>,
    /// Smoothed polyline for rendering
    pub points: Vec<(f32, f32)>,
    pub length: f32,
    pub name: Option<String>,
    /// Landmass the route crosses, or water body for sea routes
    pub feature: u16,
}

impl Route {
    pub(crate) fn placeholder() -> Self {
        Route {
            i: 0,
            group: RouteGroup::Trail,
            cells: Vec::new(),
            points: Vec::new(),
            length: 0.0,
            name: None,
            feature: 0,
        }
    }

    /// Undirected edge set, the identity of a path regardless of direction.
    fn edge_set(cells: &[u32]) -> BTreeSet<(u32, u32)> {
        cells
            .windows(2)
            .map(|w| (w[0].min(w[1]), w[0].max(w[1])))
            .collect()
    }
}

impl EntityId for Route {
    fn id(&self) -> u16 {
        self.i
    }
}

/// Build the full route network.
pub fn run(world: &mut World) {
    let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.routes);
    generate_roads(world, &mut rng);
    generate_trails(world, &mut rng);
    generate_searoutes(world, &mut rng);
}

/// Chain capitals: each one connects to the nearest capital already on the
/// network, so the road system grows as a single tree per reachable region.
fn generate_roads(world: &mut World, rng: &mut ChaCha8Rng) {
    let capitals: Vec<u32> = world
        .states
        .iter()
        .filter(|s| s.i != 0 && !s.removed)
        .map(|s| s.center)
        .collect();
    if capitals.len() < 2 {
        return;
    }

    let mut connected = vec![capitals[0]];
    for &capital in &capitals[1..] {
        let nearest = connected
            .iter()
            .copied()
            .min_by(|&a, &b| {
                world
                    .graph
                    .distance(capital, a)
                    .total_cmp(&world.graph.distance(capital, b))
                    .then(a.cmp(&b))
            });
        if let Some(target) = nearest {
            connect(world, capital, target, RouteGroup::Road, rng);
        }
        connected.push(capital);
    }
}

/// Link the burgs of each landmass with trails, skipping pairs a route
/// already joins directly.
fn generate_trails(world: &mut World, rng: &mut ChaCha8Rng) {
    let mut by_island: BTreeMap<u16, Vec<u32>> = BTreeMap::new();
    for burg in world.burgs.iter().filter(|b| b.i != 0 && !b.removed) {
        let feature = world.feature[burg.cell as usize];
        by_island.entry(feature).or_default().push(burg.cell);
    }

    for (_, mut cells) in by_island {
        cells.sort_unstable();
        if cells.len() < 2 {
            continue;
        }
        let mut linked = vec![cells[0]];
        for &cell in &cells[1..] {
            let nearest = linked
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    world
                        .graph
                        .distance(cell, a)
                        .total_cmp(&world.graph.distance(cell, b))
                        .then(a.cmp(&b))
                });
            if let Some(target) = nearest {
                if !are_connected(world, cell, target) {
                    connect(world, cell, target, RouteGroup::Trail, rng);
                }
            }
            linked.push(cell);
        }
    }
}

/// Link ports sharing a water body.
fn generate_searoutes(world: &mut World, rng: &mut ChaCha8Rng) {
    let mut by_water: BTreeMap<u16, Vec<u32>> = BTreeMap::new();
    for burg in world.burgs.iter().filter(|b| b.i != 0 && !b.removed && b.port != 0) {
        by_water.entry(burg.port).or_default().push(burg.cell);
    }

    for (_, mut ports) in by_water {
        ports.sort_unstable();
        if ports.len() < 2 {
            continue;
        }
        let mut linked = vec![ports[0]];
        for &port in &ports[1..] {
            let nearest = linked
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    world
                        .graph
                        .distance(port, a)
                        .total_cmp(&world.graph.distance(port, b))
                        .then(a.cmp(&b))
                });
            if let Some(target) = nearest {
                if !are_connected(world, port, target) {
                    connect(world, port, target, RouteGroup::Searoute, rng);
                }
            }
            linked.push(port);
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Step {
    cost: f32,
    cell: u32,
}

impl Eq for Step {}

impl Ord for Step {
    // Inverted for the max-heap; cell index breaks cost ties
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for Step {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest-path connect. Returns the id of the stored route, or the id of
/// an existing route with the same edge set, or None when no path exists
/// within the search cost limit.
pub fn connect(
    world: &mut World,
    from: u32,
    to: u32,
    group: RouteGroup,
    rng: &mut ChaCha8Rng,
) -> Option<u16> {
    if from == to {
        return None;
    }
    let cells = find_path(world, from, to, group)?;

    // A second request over the same corridor reuses the stored route
    let edges = Route::edge_set(&cells);
    if let Some(existing) = world
        .routes
        .iter()
        .find(|r| r.i != 0 && r.group == group && Route::edge_set(&r.cells) == edges)
    {
        return Some(existing.i);
    }

    let points = get_path(world, &cells);
    let length = get_length(&points);
    let id = get_next_id(&world.routes);
    let name = generate_name(world, group, from, rng);
    let feature = match group {
        RouteGroup::Searoute => {
            world.burgs[world.burg[from as usize] as usize].port
        }
        _ => world.feature[from as usize],
    };

    for &cell in &cells {
        world.road[cell as usize] += 1;
    }
    world.routes.push(Route { i: id, group, cells, points, length, name, feature });
    Some(id)
}

/// Dijkstra over cell edges with a per-group cost model. Roads and trails
/// stay on land and prefer cells a route already crosses; sea routes stay
/// on water and may touch land only at the goal.
fn find_path(world: &World, from: u32, to: u32, group: RouteGroup) -> Option<Vec<u32>> {
    let p = &world.params;
    let n = world.graph.len();
    let mut dist = vec![f32::INFINITY; n];
    let mut prev = vec![u32::MAX; n];
    let mut heap = BinaryHeap::new();

    dist[from as usize] = 0.0;
    heap.push(Step { cost: 0.0, cell: from });

    while let Some(Step { cost, cell }) = heap.pop() {
        if cell == to {
            break;
        }
        if cost > dist[cell as usize] || cost > p.route_search_limit {
            continue;
        }
        for &nb in world.graph.neighbors_of(cell) {
            let passable = match group {
                RouteGroup::Road | RouteGroup::Trail => world.is_land(nb),
                RouteGroup::Searoute => world.is_water(nb) || nb == to,
            };
            if !passable {
                continue;
            }

            let mut edge = world.graph.distance(cell, nb);
            if group != RouteGroup::Searoute {
                let dh = i16::from(world.height[nb as usize])
                    - i16::from(world.height[cell as usize]);
                edge *= 1.0 + p.road_slope_weight * f32::from(dh.unsigned_abs());
                if world.road[nb as usize] > 0 {
                    edge *= p.road_reuse_discount;
                }
            }

            let next = cost + edge;
            if next < dist[nb as usize] {
                dist[nb as usize] = next;
                prev[nb as usize] = cell;
                heap.push(Step { cost: next, cell: nb });
            }
        }
    }

    if dist[to as usize].is_infinite() {
        return None;
    }
    let mut cells = vec![to];
    let mut cursor = to;
    while cursor != from {
        cursor = prev[cursor as usize];
        cells.push(cursor);
    }
    cells.reverse();
    Some(cells)
}

/// Whether some single stored route passes through both cells.
pub fn are_connected(world: &World, a: u32, b: u32) -> bool {
    world
        .routes
        .iter()
        .any(|r| r.i != 0 && r.cells.contains(&a) && r.cells.contains(&b))
}

/// Whether any route crosses the cell.
pub fn has_road(world: &World, cell: u32) -> bool {
    world.road[cell as usize] > 0
}

/// Whether three or more routes meet at the cell.
pub fn is_crossroad(world: &World, cell: u32) -> bool {
    world.road[cell as usize] >= 3
}

/// Smooth the cell-center polyline with one pass of corner cutting,
/// keeping both endpoints fixed.
pub fn get_path(world: &World, cells: &[u32]) -> Vec<(f32, f32)> {
    let raw: Vec<(f32, f32)> = cells
        .iter()
        .map(|&c| world.graph.points[c as usize])
        .collect();
    if raw.len() < 3 {
        return raw;
    }

    let mut points = Vec::with_capacity(raw.len() * 2);
    points.push(raw[0]);
    for pair in raw.windows(2) {
        let (ax, ay) = pair[0];
        let (bx, by) = pair[1];
        points.push((ax * 0.75 + bx * 0.25, ay * 0.75 + by * 0.25));
        points.push((ax * 0.25 + bx * 0.75, ay * 0.25 + by * 0.75));
    }
    points.push(raw[raw.len() - 1]);
    points
}

/// Total polyline length.
pub fn get_length(points: &[(f32, f32)]) -> f32 {
    points
        .windows(2)
        .map(|pair| {
            let (ax, ay) = pair[0];
            let (bx, by) = pair[1];
            ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
        })
        .sum()
}

/// Roads and sea routes get a name in the origin culture's style; trails
/// stay anonymous.
fn generate_name(
    world: &World,
    group: RouteGroup,
    from: u32,
    rng: &mut ChaCha8Rng,
) -> Option<String> {
    let base = world.cultures[world.culture[from as usize] as usize].base;
    match group {
        RouteGroup::Road => Some(format!("{} Road", names::base_name(base, rng))),
        RouteGroup::Searoute => Some(format!("{} Passage", names::base_name(base, rng))),
        RouteGroup::Trail => None,
    }
}

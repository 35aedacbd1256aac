//! End-to-end pipeline properties over a full generated world.

use realmgen::config::GenerationParams;
use realmgen::graph::grid;
use realmgen::territory::states;
use realmgen::world::{self, World};

fn full_world(seed: u64) -> World {
    let (graph, heights) = grid::build(32, 32, 10.0, seed);
    let params = GenerationParams {
        culture_growth_limit: f32::INFINITY,
        state_growth_limit: f32::INFINITY,
        ..Default::default()
    };
    world::generate(graph, heights, params, seed).unwrap()
}

#[test]
fn same_seed_reproduces_the_same_world() {
    let a = full_world(1234);
    let b = full_world(1234);

    assert_eq!(a.height, b.height);
    assert_eq!(a.flux, b.flux);
    assert_eq!(a.river, b.river);
    assert_eq!(a.culture, b.culture);
    assert_eq!(a.state, b.state);
    assert_eq!(a.burg, b.burg);
    assert_eq!(a.road, b.road);

    let names = |w: &World| -> Vec<String> {
        w.states.iter().map(|s| s.name.clone()).collect()
    };
    assert_eq!(names(&a), names(&b));
    assert_eq!(a.burgs.len(), b.burgs.len());
    assert_eq!(a.routes.len(), b.routes.len());
}

#[test]
fn different_seeds_diverge() {
    let a = full_world(1);
    let b = full_world(2);
    assert_ne!(a.height, b.height);
}

#[test]
fn unlimited_growth_leaves_no_unowned_land() {
    let world = full_world(1234);
    for cell in world.land_cells() {
        assert_ne!(world.culture[cell as usize], 0, "cell {cell} has no culture");
        assert_ne!(world.state[cell as usize], 0, "cell {cell} has no state");
        assert_eq!(
            world.religion[cell as usize],
            world.culture[cell as usize],
            "folk religion must mirror culture"
        );
    }
}

#[test]
fn rivers_flow_downhill() {
    let world = full_world(1234);
    for river in world.rivers.iter().filter(|r| r.i != 0 && !r.removed) {
        for pair in river.cells.windows(2) {
            let up = world.filled_height[pair[0] as usize];
            let down = world.filled_height[pair[1] as usize];
            assert!(
                down <= up + 1e-3,
                "river {} climbs from {up} to {down}",
                river.i
            );
        }
    }
}

#[test]
fn statistics_survive_a_recompute() {
    let mut world = full_world(1234);
    let before: Vec<(usize, usize, f32)> = world
        .states
        .iter()
        .map(|s| (s.cells, s.burgs, s.urban))
        .collect();
    states::collect_statistics(&mut world);
    let after: Vec<(usize, usize, f32)> = world
        .states
        .iter()
        .map(|s| (s.cells, s.burgs, s.urban))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn diplomacy_matrix_is_reciprocal() {
    let world = full_world(1234);
    let n = world.states.len();
    for a in 0..n {
        for b in 0..n {
            assert_eq!(
                world.states[a].diplomacy[b].reciprocal(),
                world.states[b].diplomacy[a]
            );
        }
    }
}

#[test]
fn no_two_routes_share_an_edge_set() {
    let world = full_world(1234);
    let edge_sets: Vec<_> = world
        .routes
        .iter()
        .filter(|r| r.i != 0)
        .map(|r| {
            (
                r.group,
                r.cells
                    .windows(2)
                    .map(|w| (w[0].min(w[1]), w[0].max(w[1])))
                    .collect::<std::collections::BTreeSet<_>>(),
            )
        })
        .collect();
    for (i, a) in edge_sets.iter().enumerate() {
        for b in &edge_sets[i + 1..] {
            assert!(!(a.0 == b.0 && a.1 == b.1), "duplicate route stored");
        }
    }
}

#[test]
fn entity_tables_reserve_index_zero() {
    let world = full_world(1234);
    assert_eq!(world.features[0].i, 0);
    assert_eq!(world.rivers[0].i, 0);
    assert_eq!(world.cultures[0].i, 0);
    assert_eq!(world.cultures[0].name, "Wildlands");
    assert_eq!(world.states[0].i, 0);
    assert_eq!(world.states[0].name, "Neutrals");
    assert_eq!(world.burgs[0].i, 0);
    assert_eq!(world.routes[0].i, 0);
    for (idx, route) in world.routes.iter().enumerate() {
        assert_eq!(route.i as usize, idx);
    }
}

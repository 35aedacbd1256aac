//! Historical military campaigns
//!
//! Each Enemy or Rival pair gets a shared backstory of one to three named
//! wars with year ranges. The same campaign list is written to both
//! belligerents, ordered by start year.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::diplomacy::Relation;
use crate::names;
use crate::world::World;

/// Years of recorded history campaigns are drawn from
const HISTORY_SPAN: i32 = 400;

/// A named war between two states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    pub attacker: u16,
    pub defender: u16,
    pub start: i32,
    pub end: i32,
}

/// Invent campaigns for every hostile pair and attach them to both sides.
pub fn generate(world: &mut World, rng: &mut ChaCha8Rng) {
    let n = world.states.len();
    let mut per_state: Vec<Vec<Campaign>> = vec![Vec::new(); n];

    for a in 1..n {
        for b in (a + 1)..n {
            let hostile = matches!(
                world.states[a].diplomacy.get(b),
                Some(Relation::Enemy | Relation::Rival)
            );
            if !hostile {
                continue;
            }
            for _ in 0..rng.gen_range(1..=3) {
                let campaign = draw_campaign(a as u16, b as u16, rng);
                per_state[a].push(campaign.clone());
                per_state[b].push(campaign);
            }
        }
    }

    for (i, state) in world.states.iter_mut().enumerate() {
        let mut campaigns = std::mem::take(&mut per_state[i]);
        campaigns.sort_by(|x, y| x.start.cmp(&y.start).then(x.name.cmp(&y.name)));
        state.campaigns = campaigns;
    }
}

fn draw_campaign(a: u16, b: u16, rng: &mut ChaCha8Rng) -> Campaign {
    // Either side may have been the aggressor
    let (attacker, defender) = if rng.gen_bool(0.5) { (a, b) } else { (b, a) };
    let start = rng.gen_range(0..HISTORY_SPAN);
    let end = start + rng.gen_range(1..=30);
    Campaign {
        name: names::war_name(rng),
        attacker,
        defender,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationParams;
    use crate::graph::grid;
    use rand::SeedableRng;

    fn world_with_history(seed: u64) -> World {
        let (graph, heights) = grid::build(24, 24, 10.0, seed);
        let params = GenerationParams {
            culture_growth_limit: f32::INFINITY,
            state_growth_limit: f32::INFINITY,
            ..Default::default()
        };
        let mut world = World::new(graph, heights, params, seed).unwrap();
        crate::hydrology::run(&mut world);
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.cultures);
        super::super::cultures::generate(&mut world, &mut rng).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.states);
        super::super::states::generate(&mut world, &mut rng).unwrap();
        let mut burg_rng = ChaCha8Rng::seed_from_u64(world.seeds.burgs);
        super::super::burgs::generate(&mut world, &mut burg_rng);
        super::super::states::collect_statistics(&mut world);
        super::super::diplomacy::generate(&mut world, &mut rng);
        generate(&mut world, &mut rng);
        world
    }

    #[test]
    fn test_campaigns_only_between_hostile_pairs() {
        let world = world_with_history(21);
        for state in world.states.iter().filter(|s| s.i != 0) {
            for campaign in &state.campaigns {
                let other = if campaign.attacker == state.i {
                    campaign.defender
                } else {
                    campaign.attacker
                };
                assert!(matches!(
                    state.diplomacy[other as usize],
                    Relation::Enemy | Relation::Rival
                ));
            }
        }
    }

    #[test]
    fn test_campaigns_are_shared_and_ordered() {
        let world = world_with_history(21);
        for state in world.states.iter().filter(|s| s.i != 0) {
            for pair in state.campaigns.windows(2) {
                assert!(pair[0].start <= pair[1].start);
            }
            for campaign in &state.campaigns {
                assert!(campaign.end > campaign.start);
                let other = if campaign.attacker == state.i {
                    campaign.defender
                } else {
                    campaign.attacker
                };
                assert!(
                    world.states[other as usize].campaigns.contains(campaign),
                    "campaign not mirrored on the other belligerent"
                );
            }
        }
    }
}

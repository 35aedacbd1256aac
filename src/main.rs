//! Command line front end: generate a world and print a summary, with an
//! optional JSON dump of the entity tables.

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use serde_json::json;

use realmgen::config::GenerationParams;
use realmgen::graph::grid;
use realmgen::routes::RouteGroup;
use realmgen::world;

#[derive(Parser, Debug)]
#[command(name = "realmgen", about = "Procedural geography and territory generator")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 96)]
    cells_x: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 64)]
    cells_y: usize,

    /// Distance between cell centers
    #[arg(long, default_value_t = 10.0)]
    spacing: f32,

    /// Master seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Number of cultures
    #[arg(long, default_value_t = 8)]
    cultures: usize,

    /// Number of states
    #[arg(long, default_value_t = 12)]
    states: usize,

    /// Target number of towns
    #[arg(long, default_value_t = 60)]
    towns: usize,

    /// Write the generated entity tables to this JSON file
    #[arg(long)]
    json: Option<std::path::PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let params = GenerationParams {
        culture_count: args.cultures,
        state_count: args.states,
        town_count: args.towns,
        ..Default::default()
    };

    println!("Generating {}x{} world with seed {seed}", args.cells_x, args.cells_y);
    let (graph, heights) = grid::build(args.cells_x, args.cells_y, args.spacing, seed);
    let world = world::generate(graph, heights, params, seed)?;

    let land = world.land_cells().len();
    println!("  cells: {} ({} land)", world.graph.len(), land);
    println!("  features: {}", world.features.len() - 1);
    println!("  rivers: {}", world.rivers.iter().filter(|r| r.i != 0 && !r.removed).count());
    println!("  cultures: {}", world.cultures.iter().filter(|c| c.i != 0 && !c.removed).count());
    println!("  states: {}", world.states.iter().filter(|s| s.i != 0 && !s.removed).count());
    println!("  burgs: {}", world.burgs.iter().filter(|b| b.i != 0 && !b.removed).count());
    let roads = world.routes.iter().filter(|r| r.i != 0 && r.group == RouteGroup::Road).count();
    let trails = world.routes.iter().filter(|r| r.i != 0 && r.group == RouteGroup::Trail).count();
    let sea = world.routes.iter().filter(|r| r.i != 0 && r.group == RouteGroup::Searoute).count();
    println!("  routes: {roads} roads, {trails} trails, {sea} sea routes");

    if let Some(path) = args.json {
        let file = File::create(&path)?;
        let document = json!({
            "seed": seed,
            "seeds": world.seeds,
            "params": world.params,
            "features": world.features,
            "rivers": world.rivers,
            "cultures": world.cultures,
            "states": world.states,
            "burgs": world.burgs,
            "routes": world.routes,
        });
        serde_json::to_writer_pretty(BufWriter::new(file), &document)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

//! Headless caravan simulation.
//!
//! Run: RUST_LOG=debug cargo run --bin caravans -- [ticks] [seed]

use orbis_demos::{SimConfig, Simulation};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let ticks: u64 = match args.next() {
        Some(a) => a.parse()?,
        None => 500,
    };
    let seed: u64 = match args.next() {
        Some(a) => a.parse()?,
        None => SimConfig::default().seed,
    };

    let mut sim = Simulation::new(&SimConfig {
        seed,
        ..SimConfig::default()
    })?;
    sim.run(ticks);

    let stats = sim.stats();
    let roads = sim.roads();
    println!("settlements:     {}", sim.settlements().len());
    println!("roads linked:    {} ({} rejected, {} isolated)", roads.linked, roads.rejected, roads.isolated);
    println!("settled area:    {} tiles", sim.settled_area());
    println!("ticks:           {}", stats.ticks);
    println!("steps:           {}", stats.steps);
    println!("arrivals:        {}", stats.arrivals);
    println!("replans:         {}", stats.replans);
    println!("unreachable:     {}", stats.unreachable);
    println!("terrain toggles: {}", stats.toggles);
    for (i, c) in sim.caravans().iter().enumerate() {
        println!("caravan {i:>2}: at {} after {} trips", c.pos, c.trips);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

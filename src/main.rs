use std::time::Instant;

use signal_sim::{Simulation, SimulationConfig};

fn main() {
    let mut config = SimulationConfig::corridor().with_seed(7);
    config.layout.intersection_count = 3;
    config.spawn.max_vehicles = 200;
    config.spawn.mode = signal_sim::SpawnMode::Probabilistic { rate: 80.0 };

    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    sim.start();

    println!("Simulating...");
    const NUM_FRAMES: u32 = 10_000;
    for _ in 0..10 {
        let start = Instant::now();
        for _ in 0..NUM_FRAMES {
            sim.tick(1.0 / 60.0);
        }
        let frame = start.elapsed() / NUM_FRAMES;
        let detected: usize = sim.iter_detectors().map(|d| d.count()).sum();
        println!(
            "Avg. frame: {:?} --> {:.0}x real time ({} vehs, {} detected)",
            frame,
            (1.0 / 60.0) / frame.as_secs_f64(),
            sim.vehicle_count(),
            detected,
        )
    }
}

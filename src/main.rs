use std::time::Instant;

use traffic_agents::{Simulation, SimulationConfig};

fn main() {
    env_logger::init();

    let mut sim = Simulation::with_grid(SimulationConfig::default());
    sim.start();

    println!("Simulating...");
    let num_frames = 1000;
    for _ in 0..10 {
        let start = Instant::now();
        for _ in 0..num_frames {
            sim.update(0.05);
        }
        let frame = start.elapsed() / num_frames;
        println!(
            "Avg. frame: {:?} --> {:.0}x speedup ({} vehs, frame {})",
            frame,
            0.05 / frame.as_secs_f32(),
            sim.vehicle_count(),
            sim.frame(),
        )
    }
}

//! Headless crawl demo.
//!
//! Generates a terrain and level, then drives the creature forward with a
//! scripted input sequence (crawl, turn, sprint, retract) and prints the
//! body state once per simulated second.
//!
//! Run with: cargo run --example crawl_demo --release

use sim::{HillParams, LevelConfig, MoveInput, Simulation};

const DT: f32 = 1.0 / 60.0;
const SECONDS: u64 = 20;

fn scripted_input(t: f32) -> MoveInput {
    let mut input = MoveInput {
        forward: true,
        ..Default::default()
    };
    if (4.0..7.0).contains(&t) {
        input.turn_left = true;
    }
    if (8.0..12.0).contains(&t) {
        input.sprint = true;
    }
    // One tap each way: retract at 13s, extend again at 16s.
    let frame = (t / DT).round() as u64;
    if frame == (13.0 / DT) as u64 || frame == (16.0 / DT) as u64 {
        input.retract = true;
    }
    input
}

fn main() {
    env_logger::init();

    let mut sim = Simulation::new(&HillParams::default(), LevelConfig::default());
    println!(
        "level: {} trees, {} foliage, world half-extent {}",
        sim.level.trees.len(),
        sim.level.foliage.len(),
        sim.level.config.world_half_extent
    );

    for frame in 0..SECONDS * 60 {
        let t = frame as f32 * DT;
        sim.step(scripted_input(t), DT);

        if frame % 60 == 0 {
            let p = sim.body.position;
            println!(
                "t={:4.1}s pos=({:7.2}, {:6.2}, {:7.2}) speed={:5.2} \
                 grounded={} retracted={} stamina={:5.1}",
                t,
                p.x,
                p.y,
                p.z,
                sim.body.velocity().length(),
                sim.grounded,
                sim.body.retracted,
                sim.body.stamina
            );
        }
    }

    let p = sim.body.position;
    println!("final position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
}

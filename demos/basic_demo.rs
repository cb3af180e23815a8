//! Basic demonstration of the Kart Arena simulation core.
//!
//! Run with: cargo run --example basic_demo

use kartarena_sim::{InputAction, KartSim, RoundType};

fn main() {
    println!("=== Kart Arena - Simulation Demo ===\n");

    let mut sim = KartSim::new();
    sim.set_round(RoundType::Lives);

    sim.spawn_player(0);
    sim.spawn_player(1);
    sim.spawn_ai_kart();
    sim.spawn_ai_kart();

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Run ~10 seconds of game time at 60 FPS. Player 0 drives and holds the
    // shotgun trigger; player 1 drives in circles.
    println!("\nRunning simulation for 600 frames...\n");
    for frame in 0..600 {
        sim.hold(0, InputAction::Accel, 1.0);
        sim.hold(0, InputAction::ShootLeft, 1.0);
        sim.hold(1, InputAction::Accel, 1.0);
        sim.hold(1, InputAction::SteerRight, 0.6);
        if frame == 120 {
            sim.press(0, InputAction::Boost);
        }

        sim.step(1.0 / 60.0);

        if (frame + 1) % 120 == 0 {
            println!(
                "--- Tick {} (t={:.1}s) ---",
                sim.current_tick(),
                sim.current_time()
            );
            print_snapshot(&mut sim);
        }

        if let Some(outcome) = sim.outcome() {
            println!("Round over: {outcome:?}");
            break;
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &mut KartSim) {
    let snapshot = sim.snapshot();

    for kart in &snapshot.karts {
        let who = match kart.player_id {
            Some(id) => format!("Player {id}"),
            None => format!("AI #{}", kart.id),
        };
        println!(
            "  {who}: pos=({:.0}, {:.0}) angle={:.0} hp={}/{} lives={:?} kills={}",
            kart.x, kart.y, kart.angle, kart.health, kart.health_max, kart.lives, kart.kills
        );
    }
    println!("  projectiles in flight: {}", snapshot.projectiles.len());
}

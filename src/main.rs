//! Stride - headless locomotion demo.
//!
//! Spawns one player in the test arena, feeds it a scripted input sequence
//! through the input bus and logs every state change.
//!
//! ```text
//! RUST_LOG=info cargo run -- --frames 600 --preset arena
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use stride_game::{ControllerProfile, Level, Simulation, SimulationConfig};

#[derive(Parser)]
#[command(author, version, about = "Drive a locomotion controller through a scripted run", long_about = None)]
struct Cli {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 480)]
    frames: u64,

    /// JSON controller profile. Overrides --preset.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Built-in locomotion preset: default, arena or tactical.
    #[arg(long, default_value = "default")]
    preset: String,

    /// Simulation ticks per second.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,
}

/// Input held during one stretch of the script.
struct Step {
    until: f32,
    move_axis: Vec2,
    look: Vec2,
    run: bool,
    jump: bool,
    crouch: bool,
}

const SCRIPT: &[Step] = &[
    Step { until: 1.0, move_axis: Vec2::ZERO, look: Vec2::ZERO, run: false, jump: false, crouch: false },
    Step { until: 2.5, move_axis: Vec2::new(0.0, 1.0), look: Vec2::ZERO, run: false, jump: false, crouch: false },
    Step { until: 4.0, move_axis: Vec2::new(0.0, 1.0), look: Vec2::new(3.0, 0.0), run: true, jump: false, crouch: false },
    Step { until: 4.1, move_axis: Vec2::new(0.0, 1.0), look: Vec2::ZERO, run: true, jump: true, crouch: false },
    Step { until: 5.5, move_axis: Vec2::new(0.0, 1.0), look: Vec2::ZERO, run: false, jump: false, crouch: false },
    Step { until: 7.0, move_axis: Vec2::new(1.0, 0.0), look: Vec2::new(0.0, -2.0), run: false, jump: false, crouch: true },
    Step { until: f32::INFINITY, move_axis: Vec2::ZERO, look: Vec2::ZERO, run: false, jump: false, crouch: false },
];

fn load_profile(cli: &Cli) -> Result<ControllerProfile> {
    match &cli.profile {
        Some(path) => ControllerProfile::load(path)
            .with_context(|| format!("loading profile {}", path.display())),
        None => ControllerProfile::preset(&cli.preset).context("selecting preset"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = SimulationConfig {
        tick_rate: cli.tick_rate,
        profile: load_profile(&cli)?,
    };
    let mut sim = Simulation::new(config, Level::test_arena());
    let id = sim.add_player("Player");

    let dt = sim.delta_time();
    let mut last_state = String::new();

    for _ in 0..cli.frames {
        let time = sim.frame as f32 * dt;
        let step = SCRIPT
            .iter()
            .find(|s| time < s.until)
            .unwrap_or(&SCRIPT[SCRIPT.len() - 1]);

        sim.input.set_axis("Move", step.move_axis)?;
        sim.input.set_axis("Look", step.look)?;
        sim.input.press("Run", step.run)?;
        sim.input.press("Jump", step.jump)?;
        sim.input.press("Crouch", step.crouch)?;
        sim.tick();

        let Some(player) = sim.get_player(id) else {
            break;
        };
        let state = player.controller.active_state_name();
        if state != last_state {
            log::info!(
                "t={:.2}s {} -> {} at {:.2?} speed {:.2}",
                time,
                if last_state.is_empty() { "-" } else { &last_state },
                state,
                player.position(),
                player.controller.state().horizontal_speed(),
            );
            last_state = state.to_string();
        }
    }

    if let Some(player) = sim.get_player(id) {
        let state = player.controller.state();
        println!(
            "{} frames: state {} position {:.2?} yaw {:.1} pitch {:.1} eye {:.2?}",
            sim.frame,
            player.controller.active_state_name(),
            state.position,
            state.yaw,
            state.pitch,
            player.eye_position(),
        );
        if player.is_degraded() {
            println!(
                "player degraded: {} config error(s)",
                player.controller.diagnostics().len() + player.input_errors().len()
            );
        }
    }

    Ok(())
}

//! Platform Hop entry point
//!
//! Runs a headless session through the same fixed-step accumulator a
//! renderer would drive, with a scripted player pressing and releasing.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use platform_hop::Settings;
use platform_hop::consts::*;
use platform_hop::sim::{Direction, GameEvent, GameState, TickInput, tick};

#[derive(Debug, Parser)]
#[command(name = "platform-hop", version)]
#[command(about = "Headless jump-between-platforms simulation")]
struct Args {
    /// Run seed
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Number of jumps to attempt
    #[arg(long, default_value_t = 10)]
    jumps: usize,

    /// Every jump lands on the next platform's centre
    #[arg(long)]
    auto_jump: bool,

    /// Drop platforms that drift far behind
    #[arg(long)]
    evict: bool,

    /// Fixed hold per jump (ms); by default the player aims for the next centre
    #[arg(long)]
    hold_ms: Option<f32>,

    /// Settings file (JSON); flags above override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame interval fed to the accumulator (ms)
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f32,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Scripted input: hold for a computed time, release, wait, repeat
#[derive(Debug, Default)]
struct Player {
    holding_since: Option<f64>,
    hold_ms: f32,
    jumps: usize,
}

impl Player {
    fn input(&mut self, state: &GameState, fixed_hold: Option<f32>, max_jumps: usize) -> TickInput {
        match self.holding_since {
            Some(since) => {
                let held = (state.time_ms - since) as f32;
                if held < self.hold_ms {
                    return TickInput::default();
                }
                self.holding_since = None;
                self.jumps += 1;
                TickInput {
                    release: true,
                    held_ms: Some(held),
                    ..Default::default()
                }
            }
            None if self.jumps < max_jumps
                && state.is_settled()
                && state.character.can_charge() =>
            {
                self.hold_ms = fixed_hold.unwrap_or_else(|| aim(state));
                self.holding_since = Some(state.time_ms);
                TickInput {
                    press: true,
                    ..Default::default()
                }
            }
            None => TickInput::default(),
        }
    }
}

/// Hold time that carries the character to the centre of the next platform
fn aim(state: &GameState) -> f32 {
    let Some(view) = state.window().and_then(|w| state.chain.view(w)) else {
        return 0.0;
    };
    let settle = state.character.settle;
    let next = view.next.position;
    let distance = match view.current.direction {
        Direction::AlongX => next.x - settle.x,
        Direction::AlongZ => settle.y - next.z,
    };
    let settings = &state.settings;
    let ratio = distance / (MAX_SQUASH * settings.jump_time_ms);
    ratio.clamp(0.0, 1.0) * settings.max_charge_ms
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.auto_jump |= args.auto_jump;
    settings.evict_platforms |= args.evict;

    let mut state = GameState::new(args.seed, settings)?;
    let mut player = Player::default();
    let mut accumulator = 0.0;
    let mut landed = 0usize;
    // Generous cap so a stalled run still terminates
    let max_frames = (args.jumps as f32 + 1.0) * (MAX_CHARGE_MS + JUMP_TIME_MS * 4.0) / args.frame_ms.max(1.0);

    for _ in 0..max_frames.ceil() as usize {
        accumulator += args.frame_ms.clamp(0.0, 100.0);
        let mut substeps = 0;
        while accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            let input = player.input(&state, args.hold_ms, args.jumps);
            tick(&mut state, &input, SIM_DT_MS);
            accumulator -= SIM_DT_MS;
            substeps += 1;
        }

        for event in state.drain_events() {
            match event {
                GameEvent::Launched { plan, outcome } => {
                    log::info!("Jump {}: travel {:.1} -> {:?}", player.jumps, plan.travel, outcome)
                }
                GameEvent::Landed { outcome } if !outcome.is_fatal() => landed += 1,
                GameEvent::GameOver { outcome } => log::info!("Fell: {:?}", outcome),
                _ => {}
            }
        }

        if state.is_over() || (player.jumps >= args.jumps && state.is_settled()) {
            break;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    } else {
        println!(
            "seed {}: {} jumps, {} safe landings, {} platforms live, {}",
            args.seed,
            player.jumps,
            landed,
            state.chain.len(),
            if state.is_over() { "fell" } else { "standing" }
        );
    }
    Ok(())
}

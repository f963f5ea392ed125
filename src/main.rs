//! Broadside headless runner
//!
//! Plays a battle with an autopilot at the player's helm and prints the last
//! frame as JSON. Useful for tuning settings files without a renderer.
//!
//! Usage: `broadside [config.json] [--seed N] [--seconds S]`

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::cmp::Ordering;
    use std::path::PathBuf;

    use clap::Parser;

    use broadside::Settings;
    use broadside::consts::SIM_DT;
    use broadside::sim::{
        SimEvent, SimulationState, TickInput, assemble_frame, firing_side, steer_toward, tick,
    };

    /// Host frame time the runner pretends to render at
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// Cap on sim steps per host frame
    const MAX_SUBSTEPS: u32 = 4;
    /// Seconds between progress lines
    const REPORT_INTERVAL: f32 = 5.0;
    /// Autopilot closes in until this range, then sails beam-on
    const STANDOFF: f32 = 150.0;
    /// Autopilot only fires inside this range
    const FIRING_RANGE: f32 = 300.0;

    /// Headless naval battle with an autopilot at the helm
    #[derive(Debug, Parser)]
    #[command(name = "broadside", version, about)]
    pub(crate) struct Args {
        /// JSON settings file (defaults are used when omitted or unreadable)
        #[arg(value_name = "CONFIG")]
        pub(crate) config: Option<PathBuf>,
        /// Battle seed
        #[arg(long, value_name = "N", default_value_t = 12345)]
        pub(crate) seed: u64,
        /// Simulated seconds to run
        #[arg(long, value_name = "S", default_value_t = 60.0, value_parser = parse_seconds)]
        pub(crate) seconds: f32,
    }

    /// Accepts finite, strictly positive durations
    fn parse_seconds(raw: &str) -> Result<f32, String> {
        let seconds: f32 = raw.parse().map_err(|e| format!("{e}"))?;
        if seconds.is_finite() && seconds > 0.0 {
            Ok(seconds)
        } else {
            Err(format!("expected a positive number of seconds, got {raw}"))
        }
    }

    /// Chase the nearest enemy afloat, fight it beam-on, respawn once sunk
    fn autopilot(state: &SimulationState) -> TickInput {
        let player = &state.player;
        if player.sinking {
            return TickInput {
                respawn: player.sink_time > state.settings.world.removal_delay,
                ..Default::default()
            };
        }

        let target = state.enemies.iter().filter(|e| e.is_afloat()).min_by(|a, b| {
            a.pos
                .distance(player.pos)
                .partial_cmp(&b.pos.distance(player.pos))
                .unwrap_or(Ordering::Equal)
        });
        let Some(target) = target else {
            return TickInput::default();
        };

        let to_target = target.pos - player.pos;
        let distance = to_target.length();
        let desired = if distance > STANDOFF {
            to_target
        } else {
            to_target.perp()
        };
        let side = firing_side(player.heading, to_target);

        TickInput {
            ship: Some(steer_toward(player.heading, desired)),
            fire: distance < FIRING_RANGE && player.cooldowns.is_ready(side),
            aim_point: target.pos,
            aim_active: true,
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Tally {
        shots: u32,
        hits: u32,
        sunk: u32,
        respawns: u32,
    }

    impl Tally {
        fn record(&mut self, events: &[SimEvent]) {
            for event in events {
                match event {
                    SimEvent::ShotFired { .. } => self.shots += 1,
                    SimEvent::ShipHit { .. } => self.hits += 1,
                    SimEvent::ShipSunk { .. } => self.sunk += 1,
                    SimEvent::PlayerRespawned => self.respawns += 1,
                    _ => {}
                }
            }
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = Args::parse();
        let settings = args.config.as_deref().map(Settings::load).unwrap_or_default();
        log::info!(
            "Broadside (headless) starting: seed {}, {} s",
            args.seed,
            args.seconds
        );

        let mut state = SimulationState::new(args.seed, settings);
        let mut input = autopilot(&state);
        let mut frame = assemble_frame(&mut state, &input);
        let mut tally = Tally::default();
        let mut accumulator = 0.0;
        let mut next_report = REPORT_INTERVAL;
        let total_ticks = (args.seconds / SIM_DT).ceil() as u64;

        while state.time_ticks < total_ticks {
            accumulator += FRAME_DT;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && state.time_ticks < total_ticks {
                input = autopilot(&state);
                tick(&mut state, &input, SIM_DT);
                accumulator -= SIM_DT;
                substeps += 1;
            }

            frame = assemble_frame(&mut state, &input);
            tally.record(&frame.events);

            if state.elapsed >= next_report {
                next_report += REPORT_INTERVAL;
                log::info!(
                    "t={:.1}s player hp {}/{} | enemies afloat {} | shots in flight {} | hits {} sunk {}",
                    state.elapsed,
                    state.player.hp,
                    state.player.max_hp,
                    state.enemies_afloat(),
                    state.shots.len(),
                    tally.hits,
                    tally.sunk
                );
            }
        }

        log::info!(
            "Finished after {} ticks: {} shots, {} hits, {} ships sunk, {} respawns",
            state.time_ticks,
            tally.shots,
            tally.hits,
            tally.sunk,
            tally.respawns
        );

        match serde_json::to_string_pretty(&frame) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize final frame: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    runner::run();
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use clap::Parser;

    use super::runner::Args;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["broadside"]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.seed, 12345);
        assert_eq!(args.seconds, 60.0);
    }

    #[test]
    fn test_args_config_and_flags() {
        let args =
            Args::try_parse_from(["broadside", "tuning.json", "--seed", "7", "--seconds", "2.5"]).unwrap();
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("tuning.json")));
        assert_eq!(args.seed, 7);
        assert_eq!(args.seconds, 2.5);
    }

    #[test]
    fn test_args_reject_bad_values() {
        assert!(Args::try_parse_from(["broadside", "--seconds", "0"]).is_err());
        assert!(Args::try_parse_from(["broadside", "--seconds", "-3"]).is_err());
        assert!(Args::try_parse_from(["broadside", "--seconds", "inf"]).is_err());
        assert!(Args::try_parse_from(["broadside", "--seed", "-1"]).is_err());
        assert!(Args::try_parse_from(["broadside", "--bogus"]).is_err());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Embedders drive `broadside::sim::tick` themselves on the web
}

//! Read-only snapshot handed to the renderer and HUD after each tick

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::state::{
    Cooldowns, Explosion, HitIndicator, Ship, ShipKind, SimEvent, SimulationState, Side, Splash, Sway, Team,
    ViewContext,
};
use super::tick::TickInput;

/// Depth a wreck settles to below the water line
const SINK_DEPTH: f32 = 12.0;
/// Bow-down tilt of a fully sunk hull (radians)
const SINK_TILT: f32 = 0.4;
/// Side-to-side rocking amplitude while going down (radians)
const SINK_ROCK: f32 = 0.3;

/// Extra transform applied to a sinking hull
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SinkPose {
    pub depth: f32,
    pub tilt: f32,
    pub rock: f32,
}

impl SinkPose {
    fn of(ship: &Ship, progress: f32) -> Self {
        if !ship.sinking {
            return Self::default();
        }
        Self {
            depth: progress * SINK_DEPTH,
            tilt: progress * SINK_TILT,
            rock: (ship.sink_time * 2.0).sin() * progress * SINK_ROCK,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipView {
    pub id: u32,
    pub team: Team,
    pub kind: ShipKind,
    pub pos: Vec2,
    pub heading: f32,
    pub vel: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub cooldowns: Cooldowns,
    pub sinking: bool,
    pub sink_progress: f32,
    /// Wreck is fully gone and should not be drawn
    pub hidden: bool,
    pub sway: Sway,
    pub sink_pose: SinkPose,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShotView {
    pub id: u32,
    pub team: Team,
    pub pos: Vec3,
}

/// What the HUD needs
#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub player_hp: i32,
    pub player_max_hp: i32,
    /// Reload progress per side, 1 = ready
    pub cooldown_fraction_left: f32,
    pub cooldown_fraction_right: f32,
    pub player_speed: f32,
    /// `(hp, max_hp)` for every enemy still afloat
    pub enemy_hp: Vec<(i32, i32)>,
    pub aim_point: Vec2,
    pub aim_active: bool,
}

/// Authoritative state for one rendered frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub elapsed: f32,
    pub ships: Vec<ShipView>,
    pub shots: Vec<ShotView>,
    pub splashes: Vec<Splash>,
    pub explosions: Vec<Explosion>,
    pub hit_indicator: Option<HitIndicator>,
    pub hud: HudView,
    pub view: ViewContext,
    /// Everything that happened since the previous frame
    pub events: Vec<SimEvent>,
}

/// Snapshot the state for rendering, draining pending events
pub fn assemble_frame(state: &mut SimulationState, input: &TickInput) -> Frame {
    let world = state.settings.world;
    let reload = state.settings.ballistics.reload_time;

    let ships = state
        .ships()
        .map(|ship| {
            let sink_progress = ship.sink_progress(world.sink_duration);
            ShipView {
                id: ship.id,
                team: ship.team,
                kind: ship.kind,
                pos: ship.pos,
                heading: ship.heading,
                vel: ship.vel,
                hp: ship.hp,
                max_hp: ship.max_hp,
                cooldowns: ship.cooldowns,
                sinking: ship.sinking,
                sink_progress,
                hidden: ship.sinking && ship.sink_time > world.removal_delay,
                sway: ship.sway,
                sink_pose: SinkPose::of(ship, sink_progress),
            }
        })
        .collect();

    let shots = state
        .shots
        .iter()
        .map(|s| ShotView {
            id: s.id,
            team: s.team,
            pos: s.pos,
        })
        .collect();

    let player = &state.player;
    let hud = HudView {
        player_hp: player.hp,
        player_max_hp: player.max_hp,
        cooldown_fraction_left: player.cooldowns.fraction(Side::Left, reload),
        cooldown_fraction_right: player.cooldowns.fraction(Side::Right, reload),
        player_speed: player.vel.length(),
        enemy_hp: state
            .enemies
            .iter()
            .filter(|e| !e.sinking)
            .map(|e| (e.hp, e.max_hp))
            .collect(),
        aim_point: input.aim_point,
        aim_active: input.aim_active && !player.sinking,
    };

    Frame {
        tick: state.time_ticks,
        elapsed: state.elapsed,
        ships,
        shots,
        splashes: state.splashes.clone(),
        explosions: state.explosions.clone(),
        hit_indicator: state.hit_indicator,
        hud,
        view: state.view,
        events: std::mem::take(&mut state.events),
    }
}

//! Simulation tuning
//!
//! Every gameplay number the simulation reads lives here, grouped by
//! subsystem. Loaded from a JSON file by the native runner; any missing field
//! falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Ship handling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    /// Heading change per second while a turn key is held (radians)
    pub turn_rate: f32,
    /// Thrust acceleration along the bow (units/s²)
    pub accel_f: f32,
    /// Hard speed cap (units/s)
    pub max_speed: f32,
    /// Per-tick multiplicative drag, applied every tick
    pub water_drag: f32,
    /// Per-tick velocity multiplier while braking
    pub brake_factor: f32,
    /// Decay rate of sideways velocity (1/s)
    pub lateral_decay: f32,
    /// Decay rate of forward velocity (1/s)
    pub forward_decay: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            turn_rate: 1.7,
            accel_f: 140.0,
            max_speed: 255.0,
            water_drag: 0.985,
            brake_factor: BRAKE_FACTOR,
            lateral_decay: LATERAL_DECAY,
            forward_decay: FORWARD_DECAY,
        }
    }
}

/// How one team's guns scatter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirePattern {
    /// Muzzle speed relative to `BallisticsTuning::muzzle_speed`
    pub speed_factor: f32,
    /// Full width of the horizontal angular spread (radians)
    pub spread: f32,
    /// Full width of the vertical velocity jitter (units/s)
    pub vertical_jitter: f32,
}

impl FirePattern {
    /// A pattern with no randomness (useful for exact trajectories)
    pub fn exact(speed_factor: f32) -> Self {
        Self {
            speed_factor,
            spread: 0.0,
            vertical_jitter: 0.0,
        }
    }
}

/// Cannon and projectile behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsTuning {
    pub gravity: f32,
    pub muzzle_speed: f32,
    pub reload_time: f32,
    pub muzzle_offset: f32,
    pub start_height: f32,
    pub hull_height: f32,
    pub player: FirePattern,
    pub enemy: FirePattern,
    /// Enemy reload is `reload_time` times a multiplier drawn from this range
    pub enemy_reload_min: f32,
    pub enemy_reload_max: f32,
    /// Enemies lead the target by `time_of_flight * lead_factor`
    pub lead_factor: f32,
}

impl Default for BallisticsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            muzzle_speed: MUZZLE_SPEED,
            reload_time: RELOAD_TIME,
            muzzle_offset: MUZZLE_OFFSET,
            start_height: MUZZLE_HEIGHT,
            hull_height: HULL_HEIGHT,
            player: FirePattern {
                speed_factor: 1.0,
                spread: 0.08,
                vertical_jitter: 2.0,
            },
            enemy: FirePattern {
                speed_factor: 0.95,
                spread: 0.15,
                vertical_jitter: 5.0,
            },
            enemy_reload_min: 1.2,
            enemy_reload_max: 1.6,
            lead_factor: 1.2,
        }
    }
}

/// Hit detection and damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub ship_radius: f32,
    pub shot_radius: f32,
    pub damage: i32,
    pub self_hit_grace: f32,
    /// Shots above this height fly over islands
    pub island_shot_ceiling: f32,
    pub hit_indicator_life: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            ship_radius: SHIP_RADIUS,
            shot_radius: SHOT_RADIUS,
            damage: SHOT_DAMAGE,
            self_hit_grace: SELF_HIT_GRACE,
            island_shot_ceiling: 20.0,
            hit_indicator_life: 0.6,
        }
    }
}

/// Enemy behaviour thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Preferred engagement distance is drawn from `[min, min + spread)`
    pub preferred_distance_min: f32,
    pub preferred_distance_spread: f32,
    /// Approach ends within `preferred_distance + approach_margin`
    pub approach_margin: f32,
    /// Cross-product dead zone when steering toward the player
    pub steer_deadzone: f32,
    /// Heading error under which the ship counts as aligned (radians)
    pub align_tolerance: f32,
    /// Throttle only while the heading error is below this
    pub align_throttle_limit: f32,
    /// Minimum |right · to_player| to open fire
    pub broadside_dot: f32,
    pub firing_range: f32,
    /// Band around preferred distance held while broadside
    pub distance_band: f32,
    pub broadside_dwell_min: f32,
    pub broadside_dwell_max: f32,
    /// Probability of circling (rather than evading) after a broadside run
    pub circle_chance: f64,
    pub circle_dwell_min: f32,
    pub circle_dwell_max: f32,
    pub evade_duration: f32,
    /// Evade ends in broadside when closer than this, otherwise approach
    pub evade_exit_distance: f32,
    /// Ally shots closer than this trigger a dodge
    pub danger_radius: f32,
    /// Minimum time between dodges
    pub dodge_cooldown: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            preferred_distance_min: 100.0,
            preferred_distance_spread: 80.0,
            approach_margin: 40.0,
            steer_deadzone: 0.05,
            align_tolerance: 0.3,
            align_throttle_limit: 1.0,
            broadside_dot: 0.7,
            firing_range: 300.0,
            distance_band: 20.0,
            broadside_dwell_min: 4.0,
            broadside_dwell_max: 7.0,
            circle_chance: 0.6,
            circle_dwell_min: 2.0,
            circle_dwell_max: 4.0,
            evade_duration: 1.5,
            evade_exit_distance: 180.0,
            danger_radius: 50.0,
            dodge_cooldown: 1.5,
        }
    }
}

/// Map, roster and lifecycle timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub map_size: f32,
    pub border_margin: f32,
    pub island_count: u32,
    pub enemy_count: u32,
    pub max_hp: i32,
    pub max_dt: f32,
    /// Time for a sinking hull to go under
    pub sink_duration: f32,
    /// Sinking ships leave the simulation after this long
    pub removal_delay: f32,
    /// A sunk player switches to the free camera after this long
    pub spectator_delay: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            map_size: MAP_SIZE,
            border_margin: BORDER_MARGIN,
            island_count: 8,
            enemy_count: 3,
            max_hp: MAX_HP,
            max_dt: MAX_DT,
            sink_duration: 3.0,
            removal_delay: 4.0,
            spectator_delay: 3.0,
        }
    }
}

impl WorldTuning {
    /// Largest |x| or |z| a ship may occupy
    pub fn boundary(&self) -> f32 {
        self.map_size - self.border_margin
    }
}

/// A `[min, max]` sampling range the RNG can draw from (equal bounds allowed)
fn valid_range(min: f32, max: f32) -> bool {
    min.is_finite() && max.is_finite() && min >= 0.0 && min <= max
}

/// All simulation tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ship: ShipTuning,
    pub ballistics: BallisticsTuning,
    pub combat: CombatTuning,
    pub ai: AiTuning,
    pub world: WorldTuning,
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read settings {}: {} (using defaults)", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&json) {
            Ok(mut settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.validate();
                settings
            }
            Err(e) => {
                log::warn!("Malformed settings {}: {} (using defaults)", path.display(), e);
                Self::default()
            }
        }
    }

    /// Repair values the simulation cannot run with, logging each fix.
    ///
    /// Ranges with `min > max`, probabilities outside [0, 1], a negative
    /// `max_dt` and an empty map would otherwise panic mid-battle. Broken
    /// groups of values fall back to their defaults together.
    pub fn validate(&mut self) {
        let b = &mut self.ballistics;
        if !valid_range(b.enemy_reload_min, b.enemy_reload_max) {
            log::warn!(
                "Invalid enemy reload range {}..={} (using defaults)",
                b.enemy_reload_min,
                b.enemy_reload_max
            );
            let d = BallisticsTuning::default();
            b.enemy_reload_min = d.enemy_reload_min;
            b.enemy_reload_max = d.enemy_reload_max;
        }

        let ai = &mut self.ai;
        let d = AiTuning::default();
        if !valid_range(ai.broadside_dwell_min, ai.broadside_dwell_max) {
            log::warn!(
                "Invalid broadside dwell {}..={} (using defaults)",
                ai.broadside_dwell_min,
                ai.broadside_dwell_max
            );
            ai.broadside_dwell_min = d.broadside_dwell_min;
            ai.broadside_dwell_max = d.broadside_dwell_max;
        }
        if !valid_range(ai.circle_dwell_min, ai.circle_dwell_max) {
            log::warn!(
                "Invalid circle dwell {}..={} (using defaults)",
                ai.circle_dwell_min,
                ai.circle_dwell_max
            );
            ai.circle_dwell_min = d.circle_dwell_min;
            ai.circle_dwell_max = d.circle_dwell_max;
        }
        if !(0.0..=1.0).contains(&ai.circle_chance) {
            log::warn!("circle_chance {} is not a probability (using default)", ai.circle_chance);
            ai.circle_chance = d.circle_chance;
        }

        let w = &mut self.world;
        let d = WorldTuning::default();
        if !(w.max_dt.is_finite() && w.max_dt >= 0.0) {
            log::warn!("Invalid max_dt {} (using default)", w.max_dt);
            w.max_dt = d.max_dt;
        }
        let margin_ok = w.border_margin.is_finite() && w.border_margin >= 0.0;
        if !(w.map_size.is_finite() && w.map_size > 0.0 && margin_ok && w.border_margin < w.map_size) {
            log::warn!(
                "Invalid map size {} / border {} (using defaults)",
                w.map_size,
                w.border_margin
            );
            w.map_size = d.map_size;
            w.border_margin = d.border_margin;
        }
        if w.max_hp <= 0 {
            log::warn!("Invalid max_hp {} (using default)", w.max_hp);
            w.max_hp = d.max_hp;
        }
    }

    /// Write settings as pretty JSON. Failures are logged, not returned.
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Could not write settings {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }
}

//! Broadside - a real-time naval combat simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ship handling, ballistics, AI, collisions)
//! - `settings`: Data-driven tuning loaded from JSON
//!
//! Rendering, HUD drawing and input devices live outside this crate. They feed
//! a [`sim::TickInput`] in and read a [`sim::Frame`] out.

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Hard upper bound on a single tick's dt (frame hitches, tab backgrounding)
    pub const MAX_DT: f32 = 0.033;
    /// Cadence used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Per-tick velocity multiplier while braking
    pub const BRAKE_FACTOR: f32 = 0.93;
    /// Exponential decay rate of sideways (keel) velocity, 1/s
    pub const LATERAL_DECAY: f32 = 6.0;
    /// Exponential decay rate of forward velocity, 1/s
    pub const FORWARD_DECAY: f32 = 0.8;

    /// Cannonball gravity (units/s²)
    pub const GRAVITY: f32 = 60.0;
    /// Player muzzle speed (units/s)
    pub const MUZZLE_SPEED: f32 = 180.0;
    /// Baseline reload per broadside side (seconds)
    pub const RELOAD_TIME: f32 = 1.2;
    /// Muzzle height above the water
    pub const MUZZLE_HEIGHT: f32 = 5.5;
    /// Hull height a broadside is solved to arrive at
    pub const HULL_HEIGHT: f32 = 4.5;
    /// Lateral muzzle offset from ship centre
    pub const MUZZLE_OFFSET: f32 = 6.0;

    /// Collision footprint of any ship
    pub const SHIP_RADIUS: f32 = 12.0;
    /// Collision footprint of a cannonball
    pub const SHOT_RADIUS: f32 = 0.6;
    /// Damage per cannonball hit
    pub const SHOT_DAMAGE: i32 = 10;
    /// Shots cannot hit their own team for this long (seconds)
    pub const SELF_HIT_GRACE: f32 = 0.3;

    /// Half-extent of the square map
    pub const MAP_SIZE: f32 = 2000.0;
    /// Ships are kept this far inside the map edge
    pub const BORDER_MARGIN: f32 = 50.0;
    /// Starting (and maximum) hull points
    pub const MAX_HP: i32 = 100;
}

/// Wrap an angle to [-π, π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid may round up to TAU itself
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Bow direction on the water plane for a heading.
///
/// Heading 0 faces -Z; positive headings turn to port (counter-clockwise seen
/// from above). The returned `Vec2` is `(x, z)`.
#[inline]
pub fn forward_vec(heading: f32) -> Vec2 {
    Vec2::new(-heading.sin(), -heading.cos())
}

/// Starboard direction on the water plane for a heading, `(x, z)`
#[inline]
pub fn right_vec(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), -heading.sin())
}

/// Rotate a planar `(x, z)` vector about the world +Y axis
#[inline]
pub fn rotate_y(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c + v.y * s, -v.x * s + v.y * c)
}

/// Y component of the 3D cross product `a × b` for two planar `(x, z)` vectors.
///
/// Positive when `b` lies to port of `a`.
#[inline]
pub fn cross_y(a: Vec2, b: Vec2) -> f32 {
    a.y * b.x - a.x * b.y
}

//! Deterministic simulation module
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - dt clamped, phases in a fixed order
//! - Seeded RNG only (one stream, owned by the state)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod ballistics;
pub mod collision;
pub mod combat;
pub mod frame;
pub mod kinematics;
pub mod state;
pub mod tick;

pub use ballistics::{fire_broadside, fire_enemy_broadside, firing_side, solve_vertical_velocity};
pub use collision::{CollisionResult, circle_collision, clamp_to_map, push_out_of_island};
pub use combat::resolve_collisions;
pub use frame::{Frame, HudView, ShipView, ShotView, SinkPose, assemble_frame};
pub use kinematics::{ShipInput, steer_toward, update_ship};
pub use state::{
    AiMode, AiState, Cooldowns, Explosion, HitIndicator, Island, Ship, ShipKind, Shot, SimEvent,
    SimulationState, Side, Splash, Sway, Team, ViewContext,
};
pub use tick::{TickInput, tick};

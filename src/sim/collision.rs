//! Collision detection and response on the water plane
//!
//! Everything here is a circle test in the horizontal plane. Island height
//! plays no part in combat collision.

use glam::Vec2;

use super::state::Island;

/// Result of a circle overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit normal pointing from the obstacle toward the mover
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Strict circle-circle overlap test (touching is not a hit)
#[inline]
pub fn circle_collision(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Overlap of a ship circle against an island circle
///
/// Coincident centres have no defined normal and report a miss.
pub fn ship_island_collision(ship_pos: Vec2, ship_radius: f32, island: &Island) -> CollisionResult {
    let delta = ship_pos - island.pos;
    let dist = delta.length();
    let reach = island.radius + ship_radius;

    if dist >= reach || dist <= f32::EPSILON {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: delta / dist,
        penetration: reach - dist,
    }
}

/// Push a ship straight out of an island and bleed half its speed.
///
/// Returns true if the ship was touching the island.
pub fn push_out_of_island(pos: &mut Vec2, vel: &mut Vec2, ship_radius: f32, island: &Island) -> bool {
    let result = ship_island_collision(*pos, ship_radius, island);
    if !result.hit {
        return false;
    }
    *pos += result.normal * result.penetration;
    *vel *= 0.5;
    true
}

/// Clamp a position into the square `[-boundary, boundary]²`
#[inline]
pub fn clamp_to_map(pos: Vec2, boundary: f32) -> Vec2 {
    pos.clamp(Vec2::splat(-boundary), Vec2::splat(boundary))
}

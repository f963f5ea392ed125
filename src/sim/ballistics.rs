//! Broadside fire and cannonball flight
//!
//! Shots are launched so that, under constant gravity, they arrive at hull
//! height exactly when they reach the aimed horizontal distance. Given the
//! horizontal time of flight `t = d / v`, the launch vertical velocity solves
//! `target_y = start_y + vy·t − ½·g·t²`.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::state::{Ship, Shot, SimEvent, Side, Splash};
use crate::settings::{BallisticsTuning, FirePattern};
use crate::{cross_y, forward_vec, right_vec, rotate_y};

/// Aim lines shorter than this are treated as no aim at all
const MIN_AIM_DISTANCE: f32 = 0.001;

/// Vertical launch speed that lands at `target_y` after `time` seconds
#[inline]
pub fn solve_vertical_velocity(start_y: f32, target_y: f32, gravity: f32, time: f32) -> f32 {
    (target_y - start_y + 0.5 * gravity * time * time) / time
}

/// Which broadside bears on a point.
///
/// Uses the sign of `forward × aim`. An aim exactly along the keel line
/// (cross product of zero) picks the left side.
pub fn firing_side(heading: f32, aim_dir: Vec2) -> Side {
    let cross = cross_y(forward_vec(heading), aim_dir.normalize_or_zero());
    if cross >= 0.0 { Side::Left } else { Side::Right }
}

/// Player broadside toward an aim point on the water.
///
/// Returns `None` without touching any state if the aim point sits on the
/// ship or the bearing side is still reloading. On success the side's
/// cooldown is set to the full reload time. The returned shot's id is
/// assigned when it is added to the simulation.
pub fn fire_broadside(
    ship: &mut Ship,
    aim_point: Vec2,
    tuning: &BallisticsTuning,
    rng: &mut impl Rng,
) -> Option<Shot> {
    let aim = aim_point - ship.pos;
    if aim.length() < MIN_AIM_DISTANCE {
        return None;
    }

    let side = firing_side(ship.heading, aim);
    if !ship.cooldowns.is_ready(side) {
        return None;
    }

    let shot = launch(ship, side, aim, &tuning.player, tuning, rng);
    ship.cooldowns.set(side, tuning.reload_time);
    Some(shot)
}

/// Enemy broadside from a side already chosen by the AI.
///
/// Leads the target along its velocity by the time of flight scaled by
/// `lead_factor`. Cooldowns are left to the caller.
pub fn fire_enemy_broadside(
    ship: &Ship,
    side: Side,
    target_pos: Vec2,
    target_vel: Vec2,
    tuning: &BallisticsTuning,
    rng: &mut impl Rng,
) -> Option<Shot> {
    let time_to_target = ship.pos.distance(target_pos) / tuning.muzzle_speed;
    let predicted = target_pos + target_vel * (time_to_target * tuning.lead_factor);

    let aim = predicted - ship.pos;
    if aim.length() < MIN_AIM_DISTANCE {
        return None;
    }

    Some(launch(ship, side, aim, &tuning.enemy, tuning, rng))
}

/// Build the shot leaving `side` of `ship` along `aim` (ship centre to target)
fn launch(
    ship: &Ship,
    side: Side,
    aim: Vec2,
    pattern: &FirePattern,
    tuning: &BallisticsTuning,
    rng: &mut impl Rng,
) -> Shot {
    let muzzle = ship.pos + right_vec(ship.heading) * (side.sign() * tuning.muzzle_offset);

    let spread = (rng.random::<f32>() - 0.5) * pattern.spread;
    let aim_dir = rotate_y(aim.normalize(), spread);

    let horizontal_speed = tuning.muzzle_speed * pattern.speed_factor;
    let time_to_target = aim.length() / horizontal_speed;
    let vy = solve_vertical_velocity(
        tuning.start_height,
        tuning.hull_height,
        tuning.gravity,
        time_to_target,
    );
    let jitter = (rng.random::<f32>() - 0.5) * pattern.vertical_jitter;

    let horizontal = aim_dir * horizontal_speed;
    Shot {
        id: 0,
        owner: ship.id,
        team: ship.team,
        pos: Vec3::new(muzzle.x, tuning.start_height, muzzle.y),
        vel: Vec3::new(horizontal.x, vy + jitter, horizontal.y),
        fired_time: 0.0,
    }
}

/// Integrate every shot under gravity.
///
/// Shots at or below the water line are removed and leave a splash.
pub fn advance_shots(
    shots: &mut Vec<Shot>,
    splashes: &mut Vec<Splash>,
    events: &mut Vec<SimEvent>,
    gravity: f32,
    dt: f32,
) {
    shots.retain_mut(|shot| {
        shot.fired_time += dt;
        shot.vel.y -= gravity * dt;
        shot.pos += shot.vel * dt;

        if shot.pos.y <= 0.0 {
            let pos = shot.ground_pos();
            splashes.push(Splash::new(pos));
            events.push(SimEvent::Splash { pos });
            return false;
        }
        true
    });
}

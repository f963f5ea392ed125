//! Enemy captains
//!
//! Each enemy runs a small state machine (approach, broadside, circle,
//! evade) that is re-evaluated every tick. Output depends on both the mode
//! and the live geometry, so the controller is split in two: [`observe`]
//! measures the situation and [`decide`] turns mode + observation into helm
//! input and an optional broadside.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use rand::Rng;

use super::ballistics::fire_enemy_broadside;
use super::kinematics::{ShipInput, update_ship};
use super::state::{AiMode, AiState, Cooldowns, Ship, Shot, SimulationState, Side, Team};
use crate::settings::AiTuning;
use crate::{cross_y, forward_vec, right_vec, wrap_angle};

/// What an enemy can see this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Distance to the player
    pub distance: f32,
    /// `forward × to_player` (positive: player is to port)
    pub cross: f32,
    /// `right · to_player` (±1 when the player is square on the beam)
    pub broadside_dot: f32,
    /// Turn needed to put the player square on `target_side`, wrapped to [-π, π)
    pub angle_error: f32,
    /// An ally cannonball is close by
    pub incoming_danger: bool,
}

/// Controller output for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Decision {
    pub input: ShipInput,
    /// Side to fire this tick, already checked against the cooldown
    pub fire: Option<Side>,
}

/// Measure the enemy's situation relative to the player and incoming fire
pub fn observe(ship: &Ship, ai: &AiState, player_pos: Vec2, shots: &[Shot], tuning: &AiTuning) -> Observation {
    let to_player = player_pos - ship.pos;
    let distance = to_player.length();
    let dir = to_player.normalize_or_zero();

    let bearing = to_player.x.atan2(to_player.y);
    let offset = match ai.target_side {
        Side::Left => FRAC_PI_2,
        Side::Right => -FRAC_PI_2,
    };
    let angle_error = wrap_angle(bearing + offset - ship.heading);

    let ship_pos = Vec3::new(ship.pos.x, 0.0, ship.pos.y);
    let incoming_danger = shots.iter().any(|shot| {
        shot.team == Team::Ally
            && shot.pos.distance(ship_pos) < tuning.danger_radius
            && shot.vel.length() > 0.0
    });

    Observation {
        distance,
        cross: cross_y(forward_vec(ship.heading), dir),
        broadside_dot: right_vec(ship.heading).dot(dir),
        angle_error,
        incoming_danger,
    }
}

/// Switch mode, resetting the mode timer and rolling its duration
fn enter(ai: &mut AiState, mode: AiMode, tuning: &AiTuning, rng: &mut impl Rng) {
    log::debug!("AI {:?} -> {:?}", ai.mode, mode);
    ai.mode = mode;
    ai.state_time = 0.0;
    ai.dwell = match mode {
        AiMode::Approach => 0.0,
        AiMode::Broadside => rng.random_range(tuning.broadside_dwell_min..=tuning.broadside_dwell_max),
        AiMode::Circle => rng.random_range(tuning.circle_dwell_min..=tuning.circle_dwell_max),
        AiMode::Evade => {
            ai.evade_turn = if rng.random_bool(0.5) { Side::Left } else { Side::Right };
            tuning.evade_duration
        }
    };
}

/// Advance the state machine by `dt` and produce this tick's intent
pub fn decide(
    ai: &mut AiState,
    cooldowns: &Cooldowns,
    obs: &Observation,
    tuning: &AiTuning,
    rng: &mut impl Rng,
    dt: f32,
) -> Decision {
    let mut decision = Decision::default();
    let input = &mut decision.input;

    ai.state_time += dt;

    // Incoming fire pre-empts whatever we were doing
    if obs.incoming_danger && ai.last_dodge > tuning.dodge_cooldown {
        enter(ai, AiMode::Evade, tuning, rng);
        ai.last_dodge = 0.0;
    }
    ai.last_dodge += dt;

    match ai.mode {
        AiMode::Approach => {
            if obs.distance > ai.preferred_distance + tuning.approach_margin {
                input.forward = true;
                input.left = obs.cross > tuning.steer_deadzone;
                input.right = obs.cross < -tuning.steer_deadzone;
            } else {
                enter(ai, AiMode::Broadside, tuning, rng);
            }
        }

        AiMode::Broadside => {
            let error = obs.angle_error;
            if error.abs() > tuning.align_tolerance {
                input.left = error > 0.0;
                input.right = error < 0.0;
                input.forward = error.abs() < tuning.align_throttle_limit;
            } else {
                if obs.broadside_dot.abs() > tuning.broadside_dot && obs.distance < tuning.firing_range {
                    let side = if obs.broadside_dot > 0.0 { Side::Right } else { Side::Left };
                    if cooldowns.is_ready(side) {
                        decision.fire = Some(side);
                    }
                }

                if obs.distance < ai.preferred_distance - tuning.distance_band {
                    input.brake = true;
                } else if obs.distance > ai.preferred_distance + tuning.distance_band {
                    input.forward = true;
                }
            }

            if ai.state_time > ai.dwell {
                let next = if rng.random_bool(tuning.circle_chance) {
                    AiMode::Circle
                } else {
                    AiMode::Evade
                };
                enter(ai, next, tuning, rng);
                ai.target_side = ai.target_side.opposite();
            }
        }

        AiMode::Circle => {
            input.forward = true;
            input.left = ai.target_side == Side::Left;
            input.right = ai.target_side == Side::Right;

            if ai.state_time > ai.dwell {
                enter(ai, AiMode::Broadside, tuning, rng);
            }
        }

        AiMode::Evade => {
            input.forward = true;
            input.left = ai.evade_turn == Side::Left;
            input.right = ai.evade_turn == Side::Right;

            if ai.state_time > ai.dwell {
                let next = if obs.distance > tuning.evade_exit_distance {
                    AiMode::Approach
                } else {
                    AiMode::Broadside
                };
                enter(ai, next, tuning, rng);
            }
        }
    }

    decision
}

/// Run every afloat enemy's controller, fire its guns and move it
pub fn step_enemies(state: &mut SimulationState, dt: f32) {
    let mut fired = Vec::new();

    {
        let SimulationState {
            player,
            enemies,
            shots,
            rng,
            settings,
            ..
        } = &mut *state;
        let target_pos = player.pos;
        let target_vel = player.vel;
        let ballistics = &settings.ballistics;

        for enemy in enemies.iter_mut() {
            if !enemy.is_afloat() {
                continue;
            }
            let Some(mut ai) = enemy.ai else {
                continue;
            };

            let obs = observe(enemy, &ai, target_pos, shots, &settings.ai);
            let decision = decide(&mut ai, &enemy.cooldowns, &obs, &settings.ai, rng, dt);
            enemy.ai = Some(ai);

            if let Some(side) = decision.fire {
                if let Some(shot) = fire_enemy_broadside(enemy, side, target_pos, target_vel, ballistics, rng) {
                    fired.push((shot, side));
                }
                let multiplier = rng.random_range(ballistics.enemy_reload_min..=ballistics.enemy_reload_max);
                enemy.cooldowns.set(side, ballistics.reload_time * multiplier);
            }

            update_ship(enemy, dt, Some(&decision.input), &settings.ship);
        }
    }

    for (shot, side) in fired {
        state.spawn_shot(shot, side);
    }
}

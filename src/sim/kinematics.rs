//! Ship handling
//!
//! One call advances one ship by one timestep. The feel of the boats comes
//! from splitting velocity into bow and beam components against the
//! *current* heading and decaying them at very different rates: the keel
//! kills sideways slip quickly while forward way carries.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Ship, ShipKind, Sway};
use crate::settings::ShipTuning;
use crate::{cross_y, forward_vec, right_vec};

/// Helm and throttle intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInput {
    pub forward: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

/// Advance a ship by `dt`.
///
/// `input` of `None` coasts: no turning, thrust or keel damping, only the
/// speed cap and water drag. `dt` is expected to be clamped by the caller.
pub fn update_ship(ship: &mut Ship, dt: f32, input: Option<&ShipInput>, tuning: &ShipTuning) {
    // -1 = turning to port, 1 = turning to starboard
    let mut turn_dir = 0.0;

    if let Some(input) = input {
        // Both held: both apply and cancel out
        if input.left {
            ship.heading += tuning.turn_rate * dt;
            turn_dir = -1.0;
        }
        if input.right {
            ship.heading -= tuning.turn_rate * dt;
            turn_dir = 1.0;
        }

        if input.brake {
            ship.vel *= tuning.brake_factor;
        }
        if input.forward {
            ship.vel += forward_vec(ship.heading) * tuning.accel_f * dt;
        }

        let fwd = forward_vec(ship.heading);
        let right = right_vec(ship.heading);
        let v_fwd = fwd * ship.vel.dot(fwd);
        let v_side = right * ship.vel.dot(right);
        let fwd_damp = (-tuning.forward_decay * dt).exp();
        let side_damp = (-tuning.lateral_decay * dt).exp();
        ship.vel = v_fwd * fwd_damp + v_side * side_damp;
    }

    let speed = ship.vel.length();
    if speed > tuning.max_speed {
        ship.vel *= tuning.max_speed / speed;
    }
    ship.vel *= tuning.water_drag;
    ship.pos += ship.vel * dt;

    update_sway(&mut ship.sway, ship.kind, turn_dir, speed, dt);
}

/// Heel into turns and bob on the swell
fn update_sway(sway: &mut Sway, kind: ShipKind, turn_dir: f32, speed: f32, dt: f32) {
    let target_roll = turn_dir * kind.roll_intensity() * (speed / 100.0).min(1.0);
    sway.roll += (target_roll - sway.roll) * 5.0 * dt;
    sway.wave_time += dt * 1.2;
    sway.pitch = sway.wave_time.sin() * kind.pitch_intensity();
}

/// Turn a desired travel direction into helm input (analog-stick style steering)
pub fn steer_toward(heading: f32, desired: Vec2) -> ShipInput {
    let desired = desired.normalize_or_zero();
    if desired == Vec2::ZERO {
        return ShipInput::default();
    }
    let fwd = forward_vec(heading);
    let cross = cross_y(fwd, desired);
    let dot = fwd.dot(desired);
    ShipInput {
        forward: dot > 0.15,
        brake: dot < -0.15,
        left: cross > 0.05,
        right: cross < -0.05,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Team;
    use proptest::prelude::*;

    fn test_ship() -> Ship {
        Ship::new(1, Team::Ally, ShipKind::Galleon, Vec2::ZERO, 100)
    }

    const FORWARD: ShipInput = ShipInput {
        forward: true,
        brake: false,
        left: false,
        right: false,
    };

    #[test]
    fn test_forward_speed_approaches_terminal_below_cap() {
        let tuning = ShipTuning::default();
        let mut ship = test_ship();
        let mut last_speed = 0.0;
        let mut last_delta = f32::MAX;

        for _ in 0..50 {
            update_ship(&mut ship, 0.1, Some(&FORWARD), &tuning);
            let speed = ship.vel.length();
            let delta = speed - last_speed;
            assert!(delta > 0.0, "speed should keep rising");
            assert!(delta <= last_delta + 1e-4, "increments should shrink");
            assert!(speed < tuning.max_speed);
            last_delta = delta;
            last_speed = speed;
        }

        assert!(last_speed > 130.0 && last_speed < 145.0, "speed {}", last_speed);
        assert!(last_delta < 0.5);
        // Heading 0 sails toward -Z
        assert!(ship.pos.y < 0.0);
        assert!(ship.pos.x.abs() < 1e-3);
    }

    #[test]
    fn test_keel_kills_sideways_slip() {
        let tuning = ShipTuning::default();
        let mut ship = test_ship();
        // Pure beam-on drift to starboard
        ship.vel = Vec2::new(100.0, 0.0);
        update_ship(&mut ship, 0.1, Some(&ShipInput::default()), &tuning);
        let expected = 100.0 * (-0.6f32).exp() * tuning.water_drag;
        assert!((ship.vel.x - expected).abs() < 1e-3);

        // Same speed along the bow decays far less
        let mut ship = test_ship();
        ship.vel = Vec2::new(0.0, -100.0);
        update_ship(&mut ship, 0.1, Some(&ShipInput::default()), &tuning);
        let expected = 100.0 * (-0.08f32).exp() * tuning.water_drag;
        assert!((-ship.vel.y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_coasting_skips_keel_damping() {
        let tuning = ShipTuning::default();
        let mut ship = test_ship();
        ship.vel = Vec2::new(100.0, 0.0);
        update_ship(&mut ship, 0.1, None, &tuning);
        assert!((ship.vel.x - 100.0 * tuning.water_drag).abs() < 1e-4);
        assert!((ship.pos.x - 9.85).abs() < 1e-4);
    }

    #[test]
    fn test_turning() {
        let tuning = ShipTuning::default();
        let mut ship = test_ship();
        let left = ShipInput {
            left: true,
            ..Default::default()
        };
        update_ship(&mut ship, 0.1, Some(&left), &tuning);
        assert!((ship.heading - 0.17).abs() < 1e-6);

        let both = ShipInput {
            left: true,
            right: true,
            ..Default::default()
        };
        update_ship(&mut ship, 0.1, Some(&both), &tuning);
        assert!((ship.heading - 0.17).abs() < 1e-6);
    }

    #[test]
    fn test_brake_is_instant_multiplier() {
        let tuning = ShipTuning {
            forward_decay: 0.0,
            water_drag: 1.0,
            ..Default::default()
        };
        let mut ship = test_ship();
        ship.vel = Vec2::new(0.0, -50.0);
        let brake = ShipInput {
            brake: true,
            ..Default::default()
        };
        update_ship(&mut ship, 0.01, Some(&brake), &tuning);
        assert!((ship.vel.y + 50.0 * 0.93).abs() < 1e-3);
    }

    #[test]
    fn test_speed_is_rescaled_to_cap() {
        let tuning = ShipTuning {
            water_drag: 1.0,
            ..Default::default()
        };
        let mut ship = test_ship();
        ship.vel = Vec2::new(0.0, -1000.0);
        update_ship(&mut ship, 0.016, None, &tuning);
        assert!((ship.vel.length() - tuning.max_speed).abs() < 1e-3);
    }

    #[test]
    fn test_update_is_reproducible() {
        let tuning = ShipTuning::default();
        let inputs = [
            FORWARD,
            ShipInput {
                forward: true,
                left: true,
                ..Default::default()
            },
            ShipInput {
                brake: true,
                right: true,
                ..Default::default()
            },
        ];
        let mut a = test_ship();
        let mut b = test_ship();
        for i in 0..300 {
            let input = &inputs[i % inputs.len()];
            update_ship(&mut a, 0.016, Some(input), &tuning);
            update_ship(&mut b, 0.016, Some(input), &tuning);
        }
        assert_eq!(a.pos.to_array(), b.pos.to_array());
        assert_eq!(a.vel.to_array(), b.vel.to_array());
        assert_eq!(a.heading.to_bits(), b.heading.to_bits());
    }

    #[test]
    fn test_roll_follows_kind() {
        let tuning = ShipTuning::default();
        let turn = ShipInput {
            forward: true,
            right: true,
            ..Default::default()
        };
        let mut galleon = test_ship();
        let mut lugger = test_ship();
        lugger.kind = ShipKind::Lugger;
        for _ in 0..200 {
            update_ship(&mut galleon, 0.016, Some(&turn), &tuning);
            update_ship(&mut lugger, 0.016, Some(&turn), &tuning);
        }
        assert!(galleon.sway.roll > 0.0);
        assert!(lugger.sway.roll > galleon.sway.roll);
        assert!(lugger.sway.pitch.abs() <= ShipKind::Lugger.pitch_intensity());
    }

    #[test]
    fn test_steer_toward() {
        // Target dead ahead
        let input = steer_toward(0.0, Vec2::new(0.0, -1.0));
        assert!(input.forward && !input.left && !input.right);
        // Target to port
        let input = steer_toward(0.0, Vec2::new(-1.0, -0.2));
        assert!(input.left && !input.right);
        // Target astern
        let input = steer_toward(0.0, Vec2::new(0.0, 1.0));
        assert!(input.brake && !input.forward);
        assert_eq!(steer_toward(0.0, Vec2::ZERO), ShipInput::default());
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_cap(
            vx in -2000.0f32..2000.0,
            vz in -2000.0f32..2000.0,
            heading in -10.0f32..10.0,
            dt in 0.0f32..0.033,
            forward in any::<bool>(),
            brake in any::<bool>(),
            left in any::<bool>(),
            right in any::<bool>(),
        ) {
            let tuning = ShipTuning::default();
            let mut ship = test_ship();
            ship.vel = Vec2::new(vx, vz);
            ship.heading = heading;
            let input = ShipInput { forward, brake, left, right };
            update_ship(&mut ship, dt, Some(&input), &tuning);
            prop_assert!(ship.vel.length() <= tuning.max_speed + 1e-2);
        }
    }
}

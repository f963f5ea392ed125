//! Fixed timestep simulation tick
//!
//! One call advances the battle by one step. Phases always run in this
//! order, and later phases see what earlier ones wrote:
//!
//! 1. clamp dt, apply lifecycle requests (respawn, hull swap)
//! 2. hit indicator fade
//! 3. player helm (or spectator hand-off once sunk)
//! 4. enemy AI, including enemy broadsides
//! 5. collisions and damage
//! 6. sinking progress, wreck removal
//! 7. player broadside
//! 8. reload cooldowns
//! 9. shot flight, splashes, explosions

use glam::Vec2;

use super::ai::step_enemies;
use super::ballistics::{advance_shots, fire_broadside, firing_side};
use super::combat::resolve_collisions;
use super::kinematics::{ShipInput, update_ship};
use super::state::{ShipKind, SimEvent, SimulationState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Helm input; `None` lets the player's ship coast
    pub ship: Option<ShipInput>,
    /// Fire the broadside bearing on `aim_point`
    pub fire: bool,
    /// World-space aim point on the water plane `(x, z)`
    pub aim_point: Vec2,
    /// Whether an aim line should be shown
    pub aim_active: bool,
    /// Respawn after sinking (ignored while afloat)
    pub respawn: bool,
    /// Switch the player's hull type
    pub ship_kind: Option<ShipKind>,
}

/// Advance the simulation by one timestep
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, state.settings.world.max_dt.max(0.0))
    } else {
        0.0
    };

    if let Some(kind) = input.ship_kind {
        state.set_player_kind(kind);
    }
    if input.respawn {
        state.respawn_player();
    }

    // Hit indicator
    if let Some(hit) = state.hit_indicator.as_mut() {
        if !hit.advance(dt) {
            state.hit_indicator = None;
        }
    }

    // Player helm, or the spectator camera once the wreck has gone down
    if state.player.is_afloat() {
        update_ship(&mut state.player, dt, input.ship.as_ref(), &state.settings.ship);
    } else if state.player.sinking
        && !state.view.free_camera
        && state.player.sink_time > state.settings.world.spectator_delay
    {
        state.view.free_camera = true;
        state.view.free_camera_pos = state.player.pos;
        state.events.push(SimEvent::SpectatorEntered);
        log::info!("Player sunk, switching to spectator camera");
    }

    step_enemies(state, dt);

    resolve_collisions(state);

    update_sinking(state, dt);

    // Player broadside
    if input.fire && state.player.is_afloat() {
        let side = firing_side(state.player.heading, input.aim_point - state.player.pos);
        if let Some(shot) = fire_broadside(
            &mut state.player,
            input.aim_point,
            &state.settings.ballistics,
            &mut state.rng,
        ) {
            state.spawn_shot(shot, side);
        }
    }

    for ship in state.ships_mut() {
        ship.cooldowns.advance(dt);
    }

    advance_shots(
        &mut state.shots,
        &mut state.splashes,
        &mut state.events,
        state.settings.ballistics.gravity,
        dt,
    );
    state.splashes.retain_mut(|s| s.advance(dt));
    state.explosions.retain_mut(|e| e.advance(dt));

    state.time_ticks += 1;
    state.elapsed += dt;
    state.normalize_order();
}

/// Run sinking clocks and drop enemy wrecks that have gone under
fn update_sinking(state: &mut SimulationState, dt: f32) {
    for ship in state.ships_mut() {
        if ship.sinking {
            ship.sink_time += dt;
        }
    }

    let removal_delay = state.settings.world.removal_delay;
    let events = &mut state.events;
    state.enemies.retain(|e| {
        if e.sinking && e.sink_time > removal_delay {
            events.push(SimEvent::EnemyRemoved { ship: e.id });
            log::info!("Enemy {} went under", e.id);
            false
        } else {
            true
        }
    });
}

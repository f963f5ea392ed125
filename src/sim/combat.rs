//! Collision resolution and damage
//!
//! Runs once per tick after ships and shots have moved, in a fixed order:
//! 1. ships are pushed out of islands (island list order)
//! 2. ships are clamped into the map
//! 3. shots are tested against ships, newest shot first
//! 4. shots that hit no ship are tested against islands
//!
//! Island pushes are applied one island at a time rather than solved
//! together, so a ship wedged between two islands ends up wherever the last
//! push leaves it.

use glam::{Vec2, Vec3};

use super::collision::{circle_collision, clamp_to_map, push_out_of_island};
use super::state::{Explosion, HitIndicator, Ship, Shot, SimEvent, SimulationState, Side};
use crate::right_vec;
use crate::settings::CombatTuning;

/// Lowest height an island-impact explosion is drawn at
const MIN_EXPLOSION_HEIGHT: f32 = 0.5;

/// Resolve every collision for this tick
pub fn resolve_collisions(state: &mut SimulationState) {
    let combat = state.settings.combat;
    let boundary = state.settings.world.boundary();
    let hull_height = state.settings.ballistics.hull_height;

    let SimulationState {
        player,
        enemies,
        islands,
        shots,
        explosions,
        hit_indicator,
        events,
        ..
    } = state;

    // Ships vs islands, then the map edge
    for ship in std::iter::once(&mut *player).chain(enemies.iter_mut()) {
        if !ship.sinking {
            for island in islands.iter() {
                push_out_of_island(&mut ship.pos, &mut ship.vel, combat.ship_radius, island);
            }
        }
        ship.pos = clamp_to_map(ship.pos, boundary);
    }

    // Shots vs ships, then islands. Newest first so removal keeps indices valid.
    let mut i = shots.len();
    while i > 0 {
        i -= 1;

        if let Some(target) = find_ship_hit(&shots[i], player, enemies, &combat) {
            let shot = shots.remove(i);
            let impact = Vec3::new(shot.pos.x, hull_height, shot.pos.z);
            let victim_team = match target {
                0 => player.team,
                n => enemies[n - 1].team,
            };
            // Friendly fire points back at the impact, not at a friend
            let attacker_pos = std::iter::once(&*player)
                .chain(enemies.iter())
                .find(|s| s.id == shot.owner && s.team != victim_team)
                .map(|s| s.pos)
                .unwrap_or(shot.ground_pos());

            let victim = match target {
                0 => &mut *player,
                n => &mut enemies[n - 1],
            };
            let sunk = victim.apply_damage(combat.damage);
            events.push(SimEvent::ShipHit {
                ship: victim.id,
                by: shot.owner,
                hp: victim.hp,
            });
            log::debug!("Ship {} hit by ship {} (hp {})", victim.id, shot.owner, victim.hp);
            if sunk {
                events.push(SimEvent::ShipSunk { ship: victim.id });
                log::info!("Ship {} is sinking", victim.id);
            }

            if target == 0 {
                let side = struck_side(victim, shot.ground_pos());
                *hit_indicator = Some(HitIndicator::new(
                    side,
                    attacker_pos,
                    combat.hit_indicator_life,
                ));
            }

            explosions.push(Explosion::new(impact));
            continue;
        }

        let shot = &shots[i];
        if shot.pos.y >= combat.island_shot_ceiling {
            continue;
        }
        let ground = shot.ground_pos();
        let hit_island = islands
            .iter()
            .any(|island| circle_collision(ground, combat.shot_radius, island.pos, island.radius));
        if hit_island {
            let height = shot.pos.y.max(MIN_EXPLOSION_HEIGHT);
            explosions.push(Explosion::new(Vec3::new(ground.x, height, ground.y)));
            events.push(SimEvent::IslandImpact { pos: ground });
            shots.remove(i);
        }
    }
}

/// First ship a shot overlaps: 0 is the player, `n` is `enemies[n - 1]`
fn find_ship_hit(shot: &Shot, player: &Ship, enemies: &[Ship], combat: &CombatTuning) -> Option<usize> {
    let ground = shot.ground_pos();
    std::iter::once(player)
        .chain(enemies.iter())
        .position(|ship| {
            if shot.team == ship.team && shot.fired_time < combat.self_hit_grace {
                return false;
            }
            if ship.sinking {
                return false;
            }
            circle_collision(ground, combat.shot_radius, ship.pos, combat.ship_radius)
        })
}

/// Which flank of `ship` a hit at `impact` landed on
pub fn struck_side(ship: &Ship, impact: Vec2) -> Side {
    let to_hit = impact - ship.pos;
    if right_vec(ship.heading).dot(to_hit) > 0.0 {
        Side::Right
    } else {
        Side::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::{Island, ShipKind, Team};
    use proptest::prelude::*;

    /// Empty sea: player at origin, one enemy at (200, 0), no islands
    fn duel() -> SimulationState {
        let mut settings = Settings::default();
        settings.world.island_count = 0;
        settings.world.enemy_count = 0;
        let mut state = SimulationState::new(11, settings);
        state.spawn_enemy(ShipKind::Brig, Vec2::new(200.0, 0.0));
        state
    }

    fn shot_at(state: &mut SimulationState, owner: u32, team: Team, pos: Vec3, fired_time: f32) {
        let id = state.next_entity_id();
        state.shots.push(Shot {
            id,
            owner,
            team,
            pos,
            vel: Vec3::new(50.0, -5.0, 0.0),
            fired_time,
        });
    }

    #[test]
    fn test_enemy_shot_hits_player() {
        let mut state = duel();
        let enemy_id = state.enemies[0].id;
        // Lands on the player's starboard side
        shot_at(&mut state, enemy_id, Team::Enemy, Vec3::new(5.0, 4.0, 0.0), 1.0);

        resolve_collisions(&mut state);

        assert!(state.shots.is_empty());
        assert_eq!(state.player.hp, 90);
        assert_eq!(state.explosions.len(), 1);
        assert!((state.explosions[0].pos.y - 4.5).abs() < 1e-6);

        let hit = state.hit_indicator.expect("player was hit");
        assert_eq!(hit.side, Side::Right);
        assert_eq!(hit.attacker_pos, Vec2::new(200.0, 0.0));
        assert_eq!(hit.opacity, 1.0);
        assert!(state.events.contains(&SimEvent::ShipHit {
            ship: state.player.id,
            by: enemy_id,
            hp: 90
        }));
    }

    #[test]
    fn test_enemy_hits_do_not_raise_indicator() {
        let mut state = duel();
        let player_id = state.player.id;
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(195.0, 4.0, 3.0), 1.0);
        resolve_collisions(&mut state);
        assert_eq!(state.enemies[0].hp, 90);
        assert!(state.hit_indicator.is_none());
    }

    #[test]
    fn test_grace_window_protects_own_team() {
        let mut state = duel();
        let player_id = state.player.id;
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(3.0, 5.0, 0.0), 0.1);
        resolve_collisions(&mut state);
        assert_eq!(state.player.hp, 100);
        assert_eq!(state.shots.len(), 1);

        // Past the grace window, friendly fire lands
        state.shots[0].fired_time = 0.31;
        resolve_collisions(&mut state);
        assert_eq!(state.player.hp, 90);
        assert!(state.shots.is_empty());
    }

    #[test]
    fn test_shot_hits_only_one_ship() {
        let mut state = duel();
        state.enemies[0].pos = Vec2::new(10.0, 0.0);
        let enemy_id = state.enemies[0].id;
        state.spawn_enemy(ShipKind::Lugger, Vec2::new(0.0, 10.0));
        let other = state.enemies[1].id;
        shot_at(&mut state, other, Team::Enemy, Vec3::new(5.0, 4.0, 5.0), 1.0);

        resolve_collisions(&mut state);
        // Player is tested first and takes the hit
        assert_eq!(state.player.hp, 90);
        assert!(state.enemies.iter().all(|e| e.hp == 100));
        assert!(state.ship(enemy_id).is_some());
    }

    #[test]
    fn test_sinking_ships_are_not_targets() {
        let mut state = duel();
        state.enemies[0].apply_damage(100);
        let player_id = state.player.id;
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(200.0, 4.0, 0.0), 1.0);
        resolve_collisions(&mut state);
        assert_eq!(state.shots.len(), 1);
        assert_eq!(state.enemies[0].hp, 0);
    }

    #[test]
    fn test_killing_blow_starts_sinking() {
        let mut state = duel();
        state.enemies[0].hp = 10;
        let player_id = state.player.id;
        let enemy_id = state.enemies[0].id;
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(200.0, 4.0, 0.0), 1.0);
        resolve_collisions(&mut state);
        assert!(state.enemies[0].sinking);
        assert_eq!(state.enemies[0].hp, 0);
        assert!(state.events.contains(&SimEvent::ShipSunk { ship: enemy_id }));
    }

    #[test]
    fn test_island_stops_low_shots_only() {
        let mut state = duel();
        state.islands.push(Island {
            pos: Vec2::new(0.0, -500.0),
            radius: 80.0,
        });
        let player_id = state.player.id;
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(0.0, 25.0, -450.0), 1.0);
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(10.0, 8.0, -450.0), 1.0);

        resolve_collisions(&mut state);
        assert_eq!(state.shots.len(), 1);
        assert!((state.shots[0].pos.y - 25.0).abs() < 1e-6);
        assert_eq!(state.explosions.len(), 1);
        assert!((state.explosions[0].pos.y - 8.0).abs() < 1e-6);
        assert!(state
            .events
            .contains(&SimEvent::IslandImpact { pos: Vec2::new(10.0, -450.0) }));
    }

    #[test]
    fn test_ship_hit_skips_island_check() {
        let mut state = duel();
        // Enemy hull just touching the island's reach
        state.enemies[0].pos = Vec2::new(0.0, -408.0);
        state.islands.push(Island {
            pos: Vec2::new(0.0, -500.0),
            radius: 80.0,
        });
        let player_id = state.player.id;
        // Low shot over both the hull and the island's edge
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(0.0, 8.0, -420.0), 1.0);

        resolve_collisions(&mut state);
        assert!(state.shots.is_empty());
        assert_eq!(state.enemies[0].hp, 90);
        assert_eq!(state.explosions.len(), 1);
        assert!((state.explosions[0].pos.y - 4.5).abs() < 1e-6);
        assert!(!state
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::IslandImpact { .. })));
    }

    #[test]
    fn test_friendly_fire_indicator_points_at_impact() {
        let mut state = duel();
        let player_id = state.player.id;
        shot_at(&mut state, player_id, Team::Ally, Vec3::new(-4.0, 5.0, 2.0), 0.5);

        resolve_collisions(&mut state);
        assert_eq!(state.player.hp, 90);
        let hit = state.hit_indicator.expect("player was hit");
        assert_eq!(hit.attacker_pos, Vec2::new(-4.0, 2.0));
        assert_eq!(hit.side, Side::Left);
    }

    #[test]
    fn test_ships_pushed_from_islands_and_clamped() {
        let mut state = duel();
        state.islands.push(Island {
            pos: Vec2::new(0.0, 100.0),
            radius: 90.0,
        });
        state.player.vel = Vec2::new(0.0, 20.0);
        state.enemies[0].pos = Vec2::new(5000.0, -4000.0);

        resolve_collisions(&mut state);
        assert!((state.player.pos - Vec2::new(0.0, -2.0)).length() < 1e-4);
        assert_eq!(state.player.vel, Vec2::new(0.0, 10.0));
        assert_eq!(state.enemies[0].pos, Vec2::new(1950.0, -1950.0));
    }

    #[test]
    fn test_sinking_ship_ignores_islands() {
        let mut state = duel();
        state.islands.push(Island {
            pos: Vec2::new(0.0, 100.0),
            radius: 90.0,
        });
        state.player.apply_damage(1000);
        resolve_collisions(&mut state);
        assert_eq!(state.player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_struck_side() {
        let ship = Ship::new(1, Team::Ally, ShipKind::Galleon, Vec2::ZERO, 100);
        assert_eq!(struck_side(&ship, Vec2::new(3.0, 0.0)), Side::Right);
        assert_eq!(struck_side(&ship, Vec2::new(-3.0, 0.0)), Side::Left);
    }

    proptest! {
        #[test]
        fn prop_hp_clamped_and_sinks_once(hits in 1usize..30, damage in 1i32..60) {
            let mut ship = Ship::new(1, Team::Enemy, ShipKind::Brig, Vec2::ZERO, 100);
            let mut transitions = 0;
            let mut last_hp = ship.hp;
            for _ in 0..hits {
                if ship.apply_damage(damage) {
                    transitions += 1;
                }
                prop_assert!(ship.hp >= 0 && ship.hp <= ship.max_hp);
                prop_assert!(ship.hp <= last_hp);
                last_hp = ship.hp;
            }
            prop_assert!(transitions <= 1);
            prop_assert_eq!(transitions == 1, ship.hp == 0);
            prop_assert_eq!(ship.sinking, ship.hp == 0);
        }
    }
}

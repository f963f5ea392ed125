//! Simulation state and core types
//!
//! Everything a tick reads or writes lives in [`SimulationState`]. The
//! orchestrator owns it and lends it to each subsystem in turn; nothing is
//! kept in globals.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::{AiTuning, Settings};

/// Which side of the fight a ship or shot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Ally,
    Enemy,
}

/// Hull type. Affects sway animation only, never physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipKind {
    #[default]
    Galleon,
    Brig,
    Lugger,
}

impl ShipKind {
    /// Roster order used when spawning enemies
    pub const ALL: [ShipKind; 3] = [ShipKind::Galleon, ShipKind::Brig, ShipKind::Lugger];

    /// Heel into turns (heavy galleon least, light lugger most)
    pub fn roll_intensity(&self) -> f32 {
        match self {
            ShipKind::Galleon => 0.10,
            ShipKind::Brig => 0.18,
            ShipKind::Lugger => 0.25,
        }
    }

    /// Bow-to-stern bobbing on the swell
    pub fn pitch_intensity(&self) -> f32 {
        match self {
            ShipKind::Galleon => 0.12,
            ShipKind::Brig => 0.09,
            ShipKind::Lugger => 0.06,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipKind::Galleon => "galleon",
            ShipKind::Brig => "brig",
            ShipKind::Lugger => "lugger",
        }
    }
}

/// Broadside side (port = left, starboard = right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Multiplier applied to the right vector to reach this side
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Remaining reload per broadside side (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub left: f32,
    pub right: f32,
}

impl Cooldowns {
    pub fn get(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set(&mut self, side: Side, seconds: f32) {
        match side {
            Side::Left => self.left = seconds,
            Side::Right => self.right = seconds,
        }
    }

    pub fn is_ready(&self, side: Side) -> bool {
        self.get(side) <= 0.0
    }

    /// Count both sides down, never below zero
    pub fn advance(&mut self, dt: f32) {
        if self.left > 0.0 {
            self.left = (self.left - dt).max(0.0);
        }
        if self.right > 0.0 {
            self.right = (self.right - dt).max(0.0);
        }
    }

    /// Reload progress in [0, 1] (1 = ready), for the HUD
    pub fn fraction(&self, side: Side, reload_time: f32) -> f32 {
        if reload_time <= 0.0 {
            return 1.0;
        }
        (1.0 - self.get(side) / reload_time).clamp(0.0, 1.0)
    }
}

/// Cosmetic roll/pitch. Never fed back into physics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sway {
    pub roll: f32,
    pub pitch: f32,
    pub wave_time: f32,
}

/// Enemy behaviour state tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiMode {
    /// Close in on the player
    Approach,
    /// Hold perpendicular to the player and fire
    Broadside,
    /// Orbit the player
    Circle,
    /// Dodge incoming fire
    Evade,
}

/// Per-enemy controller state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    pub mode: AiMode,
    /// Seconds spent in the current mode
    pub state_time: f32,
    /// How long the current mode lasts (rolled on entry, timed modes only)
    pub dwell: f32,
    pub preferred_distance: f32,
    /// Side the enemy wants to present to the player
    pub target_side: Side,
    /// Seconds since the last dodge
    pub last_dodge: f32,
    /// Turn direction held while evading (rolled on entry)
    pub evade_turn: Side,
}

impl AiState {
    pub fn new(rng: &mut impl Rng, tuning: &AiTuning) -> Self {
        Self {
            mode: AiMode::Approach,
            state_time: 0.0,
            dwell: 0.0,
            preferred_distance: tuning.preferred_distance_min
                + rng.random::<f32>() * tuning.preferred_distance_spread,
            target_side: if rng.random_bool(0.5) { Side::Left } else { Side::Right },
            last_dodge: 0.0,
            evade_turn: Side::Left,
        }
    }
}

/// Any vessel, player or enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: u32,
    pub team: Team,
    pub kind: ShipKind,
    /// Position on the water plane `(x, z)`; height is always 0
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians (0 faces -Z)
    pub heading: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub cooldowns: Cooldowns,
    pub sinking: bool,
    /// Seconds since sinking began
    pub sink_time: f32,
    pub sway: Sway,
    /// Present for AI-driven ships only
    pub ai: Option<AiState>,
}

impl Ship {
    pub fn new(id: u32, team: Team, kind: ShipKind, pos: Vec2, max_hp: i32) -> Self {
        Self {
            id,
            team,
            kind,
            pos,
            vel: Vec2::ZERO,
            heading: 0.0,
            hp: max_hp,
            max_hp,
            cooldowns: Cooldowns::default(),
            sinking: false,
            sink_time: 0.0,
            sway: Sway::default(),
            ai: None,
        }
    }

    /// Apply hull damage.
    ///
    /// HP is clamped to [0, max_hp]. Returns true only on the hit that starts
    /// the sinking; later hits leave `sinking` and `sink_time` untouched.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp);
        if self.hp == 0 && !self.sinking {
            self.sinking = true;
            self.sink_time = 0.0;
            return true;
        }
        false
    }

    /// Afloat and able to act
    #[inline]
    pub fn is_afloat(&self) -> bool {
        !self.sinking && self.hp > 0
    }

    /// Fraction of the sinking animation completed, 0 while afloat
    pub fn sink_progress(&self, sink_duration: f32) -> f32 {
        if !self.sinking {
            return 0.0;
        }
        if sink_duration <= 0.0 {
            return 1.0;
        }
        (self.sink_time / sink_duration).min(1.0)
    }
}

/// A cannonball in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shot {
    pub id: u32,
    /// Ship that fired it
    pub owner: u32,
    pub team: Team,
    /// `(x, height, z)`
    pub pos: Vec3,
    pub vel: Vec3,
    /// Seconds since leaving the muzzle
    pub fired_time: f32,
}

impl Shot {
    /// Position on the water plane
    #[inline]
    pub fn ground_pos(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.z)
    }
}

/// Static circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Island {
    pub pos: Vec2,
    pub radius: f32,
}

/// Expanding ring where a shot met the water
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    pub pos: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

impl Splash {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: 4.0,
            alpha: 1.0,
        }
    }

    /// Grow and fade; returns false once fully faded
    pub fn advance(&mut self, dt: f32) -> bool {
        self.radius += 60.0 * dt;
        self.alpha -= 0.8 * dt;
        self.alpha > 0.0
    }
}

/// Impact flash on a hull or island
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec3,
    pub radius: f32,
    pub alpha: f32,
    pub age: f32,
}

impl Explosion {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            radius: 2.0,
            alpha: 1.0,
            age: 0.0,
        }
    }

    /// Grow and fade; returns false once fully faded
    pub fn advance(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.radius += 40.0 * dt;
        self.alpha -= 1.5 * dt;
        self.alpha > 0.0
    }
}

/// Tells the player which flank was just struck and from where
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitIndicator {
    pub side: Side,
    pub opacity: f32,
    /// Seconds left on screen
    pub life: f32,
    /// Full lifetime, used to derive opacity
    pub max_life: f32,
    pub attacker_pos: Vec2,
}

impl HitIndicator {
    pub fn new(side: Side, attacker_pos: Vec2, life: f32) -> Self {
        Self {
            side,
            opacity: 1.0,
            life,
            max_life: life,
            attacker_pos,
        }
    }

    /// Count down and fade; returns false once expired
    pub fn advance(&mut self, dt: f32) -> bool {
        self.life -= dt;
        self.opacity = if self.max_life > 0.0 {
            (self.life / self.max_life).max(0.0)
        } else {
            0.0
        };
        self.life > 0.0
    }
}

/// Camera-facing flags the simulation drives
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewContext {
    /// Detached spectator camera (player sunk)
    pub free_camera: bool,
    /// Where the spectator camera starts
    pub free_camera_pos: Vec2,
}

/// Things that happened during a tick, delivered once through the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ShotFired { ship: u32, side: Side },
    Splash { pos: Vec2 },
    ShipHit { ship: u32, by: u32, hp: i32 },
    ShipSunk { ship: u32 },
    IslandImpact { pos: Vec2 },
    EnemyRemoved { ship: u32 },
    SpectatorEntered,
    PlayerRespawned,
}

/// The complete, authoritative simulation snapshot
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub rng: Pcg32,
    pub time_ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
    pub player: Ship,
    /// Enemy roster (sorted by id)
    pub enemies: Vec<Ship>,
    pub islands: Vec<Island>,
    /// Shots in spawn order
    pub shots: Vec<Shot>,
    pub splashes: Vec<Splash>,
    pub explosions: Vec<Explosion>,
    pub hit_indicator: Option<HitIndicator>,
    pub view: ViewContext,
    /// Events since the last frame was assembled
    pub events: Vec<SimEvent>,
    next_id: u32,
}

/// Island footprints by size class (min, max radius)
const ISLAND_SIZES: [(f32, f32); 3] = [(60.0, 90.0), (90.0, 130.0), (130.0, 180.0)];

impl SimulationState {
    /// Create a fresh battle: player at the origin, enemy roster, islands
    pub fn new(seed: u64, mut settings: Settings) -> Self {
        settings.validate();
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = settings.world;

        let islands = (0..world.island_count)
            .map(|_| {
                let (min, max) = ISLAND_SIZES[rng.random_range(0..ISLAND_SIZES.len())];
                let radius = rng.random_range(min..max);
                let x = rng.random_range(-world.map_size..world.map_size);
                let z = rng.random_range(-world.map_size..world.map_size);
                Island {
                    pos: Vec2::new(x, z),
                    radius,
                }
            })
            .collect();

        let mut player = Ship::new(1, Team::Ally, ShipKind::Galleon, Vec2::ZERO, world.max_hp);
        player.sway.wave_time = rng.random::<f32>() * std::f32::consts::TAU;

        let mut state = Self {
            seed,
            settings,
            rng,
            time_ticks: 0,
            elapsed: 0.0,
            player,
            enemies: Vec::new(),
            islands,
            shots: Vec::new(),
            splashes: Vec::new(),
            explosions: Vec::new(),
            hit_indicator: None,
            view: ViewContext::default(),
            events: Vec::new(),
            next_id: 2,
        };

        for i in 0..world.enemy_count {
            let kind = ShipKind::ALL[i as usize % ShipKind::ALL.len()];
            let pos = Vec2::new((i as f32 - 1.0) * 180.0 + 160.0, -300.0 - i as f32 * 140.0);
            state.spawn_enemy(kind, pos);
        }

        log::info!(
            "Battle created (seed {}): {} enemies, {} islands",
            seed,
            state.enemies.len(),
            state.islands.len()
        );

        state
    }

    /// Allocate a new entity ID (ships and shots share the sequence)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an AI-controlled enemy, returning its id
    pub fn spawn_enemy(&mut self, kind: ShipKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let mut ship = Ship::new(id, Team::Enemy, kind, pos, self.settings.world.max_hp);
        ship.sway.wave_time = self.rng.random::<f32>() * std::f32::consts::TAU;
        ship.ai = Some(AiState::new(&mut self.rng, &self.settings.ai));
        self.enemies.push(ship);
        id
    }

    /// Put a freshly fired shot into flight, assigning its id
    pub fn spawn_shot(&mut self, mut shot: Shot, side: Side) -> u32 {
        shot.id = self.next_entity_id();
        log::debug!("Ship {} fired {:?} broadside (shot {})", shot.owner, side, shot.id);
        self.events.push(SimEvent::ShotFired {
            ship: shot.owner,
            side,
        });
        let id = shot.id;
        self.shots.push(shot);
        id
    }

    /// Look up any ship (player or enemy) by id
    pub fn ship(&self, id: u32) -> Option<&Ship> {
        if self.player.id == id {
            return Some(&self.player);
        }
        self.enemies.iter().find(|s| s.id == id)
    }

    /// All ships, player first then enemies in roster order
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        std::iter::once(&self.player).chain(self.enemies.iter())
    }

    pub fn ships_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        std::iter::once(&mut self.player).chain(self.enemies.iter_mut())
    }

    /// Bring the sunk player back at the origin with full hull.
    ///
    /// Only allowed while the player is sinking; returns whether it happened.
    pub fn respawn_player(&mut self) -> bool {
        if !self.player.sinking {
            return false;
        }
        let p = &mut self.player;
        p.hp = p.max_hp;
        p.sinking = false;
        p.sink_time = 0.0;
        p.pos = Vec2::ZERO;
        p.vel = Vec2::ZERO;
        p.heading = 0.0;
        p.cooldowns = Cooldowns::default();
        p.sway.roll = 0.0;
        p.sway.pitch = 0.0;
        self.view.free_camera = false;
        self.hit_indicator = None;
        self.events.push(SimEvent::PlayerRespawned);
        log::info!("Player respawned");
        true
    }

    /// Swap the player's hull type (cosmetic only)
    pub fn set_player_kind(&mut self, kind: ShipKind) {
        if self.player.kind != kind {
            log::info!("Player ship switched to {}", kind.as_str());
            self.player.kind = kind;
        }
    }

    /// Enemies still in the fight
    pub fn enemies_afloat(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_afloat()).count()
    }

    /// Ensure the roster is sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }
}

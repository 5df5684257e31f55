//! Run state and core simulation types
//!
//! `GameState` is the single mutable aggregate a run works on. Every
//! component of the simulation is an `impl GameState` block in its own
//! module; nothing lives in globals.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Dino;
use super::collision::Aabb;
use super::effects::ActiveEffects;
use super::schedule::Scheduler;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run in progress
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused; game time is frozen
    Paused,
    /// Lives exhausted
    GameOver,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Cactus-like ground obstacle
    LowGround,
    Rock,
    /// Floats in a band above the ground with a sinusoidal bob
    Flyer,
    /// Tall and thin, must be jumped
    Spike,
    /// Hanging beam, must be ducked
    Beam,
    Boss,
    BossProjectile,
}

impl ObstacleKind {
    /// Kinds the spawner picks from, in unlock order
    pub const SPAWNABLE: [ObstacleKind; 5] = [
        ObstacleKind::LowGround,
        ObstacleKind::Rock,
        ObstacleKind::Flyer,
        ObstacleKind::Spike,
        ObstacleKind::Beam,
    ];

    /// Base points for getting past an obstacle of this kind
    pub fn pass_points(self) -> u32 {
        match self {
            ObstacleKind::Spike => 15,
            ObstacleKind::Beam | ObstacleKind::BossProjectile => 20,
            _ => 10,
        }
    }
}

/// Lateral patrol (vertical sweep while scrolling)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    /// +1 moving down, -1 moving up
    pub direction: f32,
}

/// Boss sub-state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub health: i32,
    pub max_health: i32,
    /// Milliseconds since the last projectile burst
    pub attack_timer_ms: f32,
    /// Accumulator driving the vertical bob
    pub move_phase: f32,
    /// Resting height the bob oscillates around
    pub anchor_y: f32,
}

impl BossState {
    pub fn new(health: i32, anchor_y: f32) -> Self {
        Self {
            health,
            max_health: health,
            attack_timer_ms: 0.0,
            move_phase: 0.0,
            anchor_y,
        }
    }

    /// Remaining health in [0, 1] for a health bar
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health.max(0) as f32 / self.max_health as f32).min(1.0)
    }
}

/// An obstacle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward speed (pixels per reference frame)
    pub speed: f32,
    /// Set once the obstacle's trailing edge has crossed the actor
    pub passed: bool,
    /// Wing phase for flyers
    #[serde(default)]
    pub wing_phase: Option<f32>,
    #[serde(default)]
    pub patrol: Option<Patrol>,
    #[serde(default)]
    pub boss: Option<BossState>,
    /// Part of a spawned cluster
    #[serde(default)]
    pub cluster: bool,
    /// Marked for removal at the end of the frame
    #[serde(skip)]
    pub(crate) removed: bool,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            speed,
            passed: false,
            wing_phase: None,
            patrol: None,
            boss: None,
            cluster: false,
            removed: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn right_edge(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_boss(&self) -> bool {
        self.kind == ObstacleKind::Boss
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Points awarded when the actor gets past this obstacle
    pub fn pass_points(&self) -> u32 {
        let base = self.kind.pass_points();
        if self.patrol.is_some() {
            base * 3 / 2
        } else {
            base
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Halves global speed
    Speed,
    /// Destroys obstacles on contact, enables the special ability
    Shield,
    /// Stronger jump impulse
    JumpBoost,
    /// Pulls nearby power-ups toward the actor
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Speed,
        PowerUpKind::Shield,
        PowerUpKind::JumpBoost,
        PowerUpKind::Magnet,
    ];
}

/// A power-up entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Cosmetic spin and pulse phases
    pub rotation: f32,
    pub pulse: f32,
    #[serde(skip)]
    pub(crate) removed: bool,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::splat(30.0),
            speed,
            rotation: 0.0,
            pulse: 0.0,
            removed: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Particle colors (0xRRGGBB)
pub mod colors {
    pub const DINO: u32 = 0x00ff88;
    pub const DAMAGE: u32 = 0xff6b6b;
    pub const COLLECT: u32 = 0x4ecdc4;
    pub const EXPLOSION: [u32; 3] = [0xff6b6b, 0xffd93d, 0xff8c42];
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life_ms: f32,
    pub max_life_ms: f32,
    pub color: u32,
    pub size: f32,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        if self.max_life_ms <= 0.0 {
            return 0.0;
        }
        (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
    }
}

/// Background cloud (parallax decoration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub opacity: f32,
}

/// Symbolic sound/FX cues for the audio adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    Jump,
    Damage,
    LevelUp,
    BossSpawn,
    BossAttack,
    BossDefeat,
    Collect,
    ShieldHit,
    ShieldBlast,
    GameOver,
}

/// On-screen messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    MovingObstacles,
    BeamsIncoming,
    ExtremeMode,
    Nightmare,
    BossBattle { level: u32 },
    BossDefeated,
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::MovingObstacles => write!(f, "Moving obstacles unlocked!"),
            Announcement::BeamsIncoming => write!(f, "Laser obstacles incoming!"),
            Announcement::ExtremeMode => write!(f, "EXTREME MODE ACTIVATED!"),
            Announcement::Nightmare => write!(f, "NIGHTMARE DIFFICULTY!"),
            Announcement::BossBattle { level } => write!(f, "BOSS BATTLE - LEVEL {level}!"),
            Announcement::BossDefeated => write!(f, "BOSS DEFEATED!"),
        }
    }
}

/// Final numbers of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub level: u32,
    pub survived_ms: f64,
    pub max_combo: u32,
}

/// Something the outer adapters should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cue(Cue),
    Announce(Announcement),
    /// Emitted exactly once when lives reach zero
    RunEnded(RunSummary),
}

/// Per-run scalars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Starts at 1, never decreases within a run
    pub level: u32,
    pub lives: u8,
    /// Score multiplier in [1, combo_max]
    pub combo: f32,
    pub max_combo: u32,
    /// Elapsed game time (ms); frozen while paused
    pub time_ms: f64,
    /// Global scroll speed
    pub speed: f32,
    pub gravity: f32,
    /// Current jump impulse
    pub jump_power: f32,
    pub boss_active: bool,
    pub extreme_mode: bool,
    /// Game time of the last score event (combo decay)
    pub last_score_at: Option<f64>,
}

impl RunState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            level: 1,
            lives: tuning.starting_lives.min(tuning.max_lives),
            combo: 1.0,
            max_combo: 1,
            time_ms: 0.0,
            speed: tuning.base_speed,
            gravity: tuning.base_gravity,
            jump_power: tuning.jump_power,
            boss_active: false,
            extreme_mode: false,
            last_score_at: None,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub run: RunState,
    pub dino: Dino,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub clouds: Vec<Cloud>,
    pub effects: ActiveEffects,
    /// Deferred actions (duck release, extreme-mode spawns)
    pub scheduler: Scheduler,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    /// Camera shake magnitude (decays each frame)
    pub screen_shake: f32,
    /// Extreme-mode visual distortion
    pub distortion: bool,
    /// Last known pointer x (screen space) for the parallax
    pub pointer_x: Option<f32>,
    /// Particle cap (from settings)
    pub max_particles: usize,
    /// Whether hits and defeats shake the camera (from settings)
    pub shake_enabled: bool,
    /// Whether extreme mode turns on the distortion (from settings)
    pub distortion_enabled: bool,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let run = RunState::new(&tuning);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Menu,
            run,
            dino: Dino::new(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            clouds: Vec::new(),
            effects: ActiveEffects::default(),
            scheduler: Scheduler::default(),
            events: Vec::new(),
            screen_shake: 0.0,
            distortion: false,
            pointer_x: None,
            max_particles: MAX_PARTICLES,
            shake_enabled: true,
            distortion_enabled: true,
            next_id: 1,
        }
    }

    /// Reset everything a run touches and start playing.
    ///
    /// Pending scheduled actions from the previous run are dropped here, so
    /// a stale duck release or extreme-mode spawn can't reach the new run.
    pub fn start_run(&mut self) {
        self.run = RunState::new(&self.tuning);
        self.dino = Dino::new();
        self.obstacles.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.effects.clear();
        self.scheduler.clear();
        self.events.clear();
        self.screen_shake = 0.0;
        self.distortion = false;
        self.init_clouds();
        self.phase = GamePhase::Playing;
        log::info!("Run started (seed {})", self.seed);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Terminal transition; only the first call per run has any effect
    pub(crate) fn end_run(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.scheduler.clear();
        let center = self.dino.center();
        self.spawn_explosion(center, 20);
        self.cue(Cue::GameOver);
        let summary = RunSummary {
            score: self.run.score,
            level: self.run.level,
            survived_ms: self.run.time_ms,
            max_combo: self.run.max_combo,
        };
        log::info!(
            "Run over: score {} level {} survived {:.1}s max combo x{}",
            summary.score,
            summary.level,
            summary.survived_ms / 1000.0,
            summary.max_combo
        );
        self.events.push(GameEvent::RunEnded(summary));
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn cue(&mut self, cue: Cue) {
        self.events.push(GameEvent::Cue(cue));
    }

    pub(crate) fn announce(&mut self, announcement: Announcement) {
        log::info!("{announcement}");
        self.events.push(GameEvent::Announce(announcement));
    }

    /// Uniform roll in [0, 1)
    pub(crate) fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Bernoulli trial for a per-reference-frame probability, scaled to a
    /// frame `frames` reference frames long.
    pub(crate) fn chance(&mut self, per_frame: f64, frames: f32) -> bool {
        let p = per_frame.clamp(0.0, 1.0);
        let p = 1.0 - (1.0 - p).powf(frames.max(0.0) as f64);
        self.rng.random::<f64>() < p
    }

    /// Raise the camera shake to at least `amount`
    pub(crate) fn shake(&mut self, amount: f32) {
        if self.shake_enabled {
            self.screen_shake = self.screen_shake.max(amount);
        }
    }

    /// Small burst of particles (jumps, landings, pickups, damage)
    pub fn spawn_particles(&mut self, pos: Vec2, count: usize, color: u32) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let vel = Vec2::new((self.roll() - 0.5) * 10.0, (self.roll() - 0.5) * 10.0 - 5.0);
            let size = 2.0 + self.roll() * 4.0;
            self.particles.push(Particle {
                pos,
                vel,
                life_ms: 1000.0,
                max_life_ms: 1000.0,
                color,
                size,
            });
        }
    }

    /// Explosion burst in warm colors
    pub fn spawn_explosion(&mut self, pos: Vec2, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let vel = Vec2::new((self.roll() - 0.5) * 20.0, (self.roll() - 0.5) * 20.0);
            let color = colors::EXPLOSION[self.rng.random_range(0..colors::EXPLOSION.len())];
            let size = 3.0 + self.roll() * 6.0;
            self.particles.push(Particle {
                pos,
                vel,
                life_ms: 800.0,
                max_life_ms: 800.0,
                color,
                size,
            });
        }
    }

    fn init_clouds(&mut self) {
        self.clouds.clear();
        for _ in 0..CLOUD_COUNT {
            let cloud = Cloud {
                pos: Vec2::new(self.roll() * WORLD_WIDTH, self.roll() * WORLD_HEIGHT * 0.3),
                size: Vec2::new(80.0 + self.roll() * 40.0, 40.0 + self.roll() * 20.0),
                speed: 0.5 + self.roll(),
                opacity: 0.3 + self.roll() * 0.4,
            };
            self.clouds.push(cloud);
        }
    }

    /// Drop every entity marked for removal during the frame
    pub(crate) fn compact(&mut self) {
        self.obstacles.retain(|o| !o.removed);
        self.power_ups.retain(|p| !p.removed);
        self.particles.retain(|p| p.life_ms > 0.0);
    }
}

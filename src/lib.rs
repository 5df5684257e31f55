//! Dino Dash - an endless-runner arcade simulation
//!
//! Core modules:
//! - `sim`: Simulation core (actor, spawning, collisions, progression, bosses)
//! - `clock`: Converts wall-clock frame callbacks into bounded deltas
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (quality, audio, screen shake)
//! - `audio`: Fire-and-forget sound cue adapter
//! - `highscores`: High score and play-count persistence

pub mod audio;
pub mod clock;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use clock::FrameClock;
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Fixed world geometry and timing constants
pub mod consts {
    /// Reference frame length in milliseconds; per-frame motion constants
    /// are expressed against this and scaled by the real delta.
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest delta a single tick will simulate (tab switches, hitches)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 1280.0;
    pub const WORLD_HEIGHT: f32 = 720.0;
    /// Ground line (the actor's feet rest here)
    pub const GROUND_Y: f32 = WORLD_HEIGHT - 90.0;

    /// Actor defaults
    pub const DINO_X: f32 = 100.0;
    pub const DINO_SIZE: f32 = 60.0;
    /// Horizontal band for the pointer parallax
    pub const DINO_MIN_X: f32 = 50.0;
    pub const DINO_MAX_X: f32 = 200.0;
    pub const PARALLAX_FACTOR: f32 = 0.01;
    /// Fraction of the standing height kept while ducking
    pub const DUCK_HEIGHT_RATIO: f32 = 0.6;
    /// Ducking auto-releases after this long
    pub const DUCK_DURATION_MS: f64 = 1000.0;
    /// Ducking can't be re-entered until this long after a release
    pub const DUCK_COOLDOWN_MS: f64 = 200.0;
    /// Maximum number of trail points to store
    pub const TRAIL_LENGTH: usize = 10;

    /// Hitbox shrink applied on every side of an entity
    pub const COLLISION_MARGIN: f32 = 10.0;

    /// Entities spawn this far past the right edge
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Obstacles are dropped once their right edge passes this x
    pub const OBSTACLE_DESPAWN_X: f32 = -100.0;

    /// Shield blast reach (horizontal distance from the actor)
    pub const SPECIAL_RADIUS: f32 = 200.0;
    /// Magnet pull reach and strength (pixels per reference frame)
    pub const MAGNET_RADIUS: f32 = 300.0;
    pub const MAGNET_PULL: f32 = 4.0;

    /// Particle store cap when no settings override it
    pub const MAX_PARTICLES: usize = 256;
    /// Number of background clouds
    pub const CLOUD_COUNT: usize = 5;
}

//! Simulation core
//!
//! All gameplay logic lives here. The core has no rendering, audio or
//! platform dependencies:
//! - Variable frame length, with per-frame rules scaled to a 60 Hz reference
//! - Seeded RNG only
//! - Deferred actions go through the scheduler, never through callbacks
//! - Removals are marked during a pass and compacted at the end of the frame

pub mod actor;
pub mod boss;
pub mod collision;
pub mod effects;
pub mod progression;
pub mod schedule;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use actor::{ActorState, Dino};
pub use collision::Aabb;
pub use effects::ActiveEffects;
pub use progression::level_for_score;
pub use schedule::{ScheduledAction, Scheduler};
pub use snapshot::{EffectView, Snapshot};
pub use spawn::available_kinds;
pub use state::{
    Announcement, BossState, Cloud, Cue, GameEvent, GamePhase, GameState, Obstacle, ObstacleKind,
    Particle, Patrol, PowerUp, PowerUpKind, RunState, RunSummary,
};
pub use tick::{TickInput, tick};

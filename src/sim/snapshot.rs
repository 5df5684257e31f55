//! Read-only view handed to the presentation side each frame

use serde::Serialize;

use super::actor::{ActorState, Dino};
use super::state::{Cloud, GamePhase, GameState, Obstacle, Particle, PowerUp, PowerUpKind, RunState};

/// An active power-up and how long it has left
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectView {
    pub kind: PowerUpKind,
    pub remaining_ms: f64,
}

/// Borrowed snapshot of everything a renderer needs.
///
/// Entities marked for removal this frame are already compacted away by the
/// time a frame ends, so every entity listed here is live.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub actor_state: ActorState,
    pub dino: &'a Dino,
    pub obstacles: &'a [Obstacle],
    pub power_ups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub clouds: &'a [Cloud],
    pub run: &'a RunState,
    /// Combo tier shown on the HUD
    pub combo_tier: u32,
    pub effects: Vec<EffectView>,
    pub screen_shake: f32,
    pub distortion: bool,
}

impl Snapshot<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let now = self.run.time_ms;
        let effects = self
            .effects
            .iter()
            .map(|(kind, _)| EffectView {
                kind,
                remaining_ms: self.effects.remaining_ms(kind, now),
            })
            .collect();

        Snapshot {
            phase: self.phase,
            actor_state: self.dino.state(),
            dino: &self.dino,
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
            particles: &self.particles,
            clouds: &self.clouds,
            run: &self.run,
            combo_tier: self.run.combo.floor() as u32,
            effects,
            screen_shake: self.screen_shake,
            distortion: self.distortion,
        }
    }
}

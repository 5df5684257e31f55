//! The running dino
//!
//! Three mutually exclusive movement states: grounded, airborne and ducking.
//! The methods here only touch the actor; particles, cues and scheduling are
//! handled by the `GameState` commands in `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Movement state derived from the actor flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Grounded,
    Airborne,
    Ducking,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dino {
    /// Top-left corner of the standing body
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (negative = upward)
    pub vel_y: f32,
    pub is_jumping: bool,
    pub is_ducking: bool,
    /// Game time the current duck started
    pub duck_started_at: Option<f64>,
    /// Ducking can't be re-entered before this game time
    pub duck_cooldown_until: f64,
    /// Game time of the last passing-score event (anti-farming)
    pub last_score_at: Option<f64>,
    /// Obstacle damage is ignored before this game time
    pub invulnerable_until: f64,
    /// Recent body centers, oldest first
    pub trail: Vec<Vec2>,
}

impl Default for Dino {
    fn default() -> Self {
        Self::new()
    }
}

impl Dino {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(DINO_X, Self::ground_top()),
            size: Vec2::splat(DINO_SIZE),
            vel_y: 0.0,
            is_jumping: false,
            is_ducking: false,
            duck_started_at: None,
            duck_cooldown_until: 0.0,
            last_score_at: None,
            invulnerable_until: 0.0,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// y of the top edge while standing on the ground
    pub fn ground_top() -> f32 {
        GROUND_Y - DINO_SIZE
    }

    pub fn state(&self) -> ActorState {
        if self.is_jumping {
            ActorState::Airborne
        } else if self.is_ducking {
            ActorState::Ducking
        } else {
            ActorState::Grounded
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Bottom-center point
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x * 0.5, self.pos.y + self.size.y)
    }

    /// Collision box; ducking keeps the lower part of the body
    pub fn hitbox(&self) -> Aabb {
        if self.is_ducking {
            let height = self.size.y * DUCK_HEIGHT_RATIO;
            let top = self.pos.y + self.size.y - height;
            Aabb::from_pos_size(Vec2::new(self.pos.x, top), Vec2::new(self.size.x, height))
        } else {
            Aabb::from_pos_size(self.pos, self.size)
        }
    }

    /// Launch with the given impulse. Returns false when already airborne.
    pub fn jump(&mut self, power: f32) -> bool {
        if self.is_jumping {
            return false;
        }
        self.vel_y = power;
        self.is_jumping = true;
        self.is_ducking = false;
        self.duck_started_at = None;
        true
    }

    /// Start ducking at `now`. Returns false when airborne, already
    /// ducking, or still in the post-duck cooldown.
    pub fn duck(&mut self, now: f64) -> bool {
        if self.is_jumping || self.is_ducking || now < self.duck_cooldown_until {
            return false;
        }
        self.is_ducking = true;
        self.duck_started_at = Some(now);
        true
    }

    /// Auto-release of the duck that started at `started_at`.
    ///
    /// A release belonging to an older duck (one cancelled by a jump) is
    /// ignored so it can't cut a newer duck short.
    pub fn release_duck(&mut self, started_at: f64, now: f64) -> bool {
        if self.duck_started_at != Some(started_at) {
            return false;
        }
        self.is_ducking = false;
        self.duck_started_at = None;
        self.duck_cooldown_until = now + DUCK_COOLDOWN_MS;
        true
    }

    /// Integrate vertical motion. Returns true on the frame the actor lands.
    pub fn update(&mut self, gravity: f32, frames: f32) -> bool {
        if !self.is_jumping {
            return false;
        }
        self.vel_y += gravity * frames;
        self.pos.y += self.vel_y * frames;

        if self.pos.y >= Self::ground_top() {
            self.pos.y = Self::ground_top();
            self.vel_y = 0.0;
            self.is_jumping = false;
            return true;
        }
        false
    }

    /// Cosmetic parallax: nudge x from the pointer's distance to screen center
    pub fn follow_pointer(&mut self, pointer_x: Option<f32>) {
        let Some(pointer_x) = pointer_x else { return };
        let influence = (pointer_x - WORLD_WIDTH / 2.0) * PARALLAX_FACTOR;
        self.pos.x = (DINO_X + influence).clamp(DINO_MIN_X, DINO_MAX_X);
    }

    /// Record current center to the trail
    pub fn record_trail(&mut self) {
        self.trail.push(self.center());
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }
}

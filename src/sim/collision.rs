//! Collision detection and resolution
//!
//! Broad-phase only: the actor's box against every live obstacle and
//! power-up, with entity boxes shrunk by a fixed margin so grazes don't
//! count. Removals are deferred to the end-of-frame compaction pass.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Cue, GameState, PowerUpKind, colors};
use crate::consts::COLLISION_MARGIN;

/// Score for destroying a regular obstacle with the shield
pub const SHIELD_DESTROY_POINTS: u32 = 25;
/// Score for each shield hit on a boss
pub const SHIELD_BOSS_HIT_POINTS: u32 = 50;
/// Camera shake when the actor is hurt
pub const DAMAGE_SHAKE: f32 = 10.0;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Shrink by `margin` on every side
    pub fn shrink(&self, margin: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(margin),
            max: self.max - Vec2::splat(margin),
        }
    }

    /// Strict overlap test (touching edges don't count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Overlap against `other` shrunk by `margin`
    pub fn overlaps_with_margin(&self, other: &Aabb, margin: f32) -> bool {
        self.overlaps(&other.shrink(margin))
    }
}

impl GameState {
    /// Test the actor against every live obstacle and power-up and apply
    /// the outcome of each contact.
    pub fn resolve_collisions(&mut self) {
        self.resolve_obstacle_contacts();
        self.resolve_power_up_contacts();
    }

    fn resolve_obstacle_contacts(&mut self) {
        let hitbox = self.dino.hitbox();

        for i in 0..self.obstacles.len() {
            // A run that ended on an earlier contact this frame stops here
            if !self.is_playing() {
                break;
            }
            let obstacle = &self.obstacles[i];
            if obstacle.removed || !hitbox.overlaps_with_margin(&obstacle.bounds(), COLLISION_MARGIN) {
                continue;
            }
            let is_boss = obstacle.is_boss();
            let center = obstacle.center();

            if self.effects.is_active(PowerUpKind::Shield) {
                if is_boss {
                    let damage = self.tuning.boss_shield_damage;
                    self.damage_boss(i, damage);
                } else {
                    self.obstacles[i].removed = true;
                    self.spawn_explosion(center, 8);
                    self.add_score(SHIELD_DESTROY_POINTS);
                    self.cue(Cue::ShieldHit);
                }
            } else if self.run.time_ms >= self.dino.invulnerable_until {
                self.take_damage(if is_boss { 2 } else { 1 });
            }
        }
    }

    fn resolve_power_up_contacts(&mut self) {
        if !self.is_playing() {
            return;
        }
        let hitbox = self.dino.hitbox();
        for i in 0..self.power_ups.len() {
            let power_up = &self.power_ups[i];
            if !power_up.removed && hitbox.overlaps_with_margin(&power_up.bounds(), COLLISION_MARGIN) {
                self.collect_power_up(i);
            }
        }
    }

    /// Shield contact with a boss: damage, knockback and partial score.
    /// The boss is only removed by the boss controller once health runs out.
    pub(crate) fn damage_boss(&mut self, index: usize, damage: i32) {
        let knockback = self.tuning.boss_knockback;
        let Some(obstacle) = self.obstacles.get_mut(index) else {
            return;
        };
        let Some(boss) = obstacle.boss.as_mut() else {
            return;
        };
        boss.health -= damage;
        obstacle.pos.x += knockback;
        log::debug!("Boss hit for {damage}, health {}", boss.health);

        let center = obstacle.center();
        self.spawn_explosion(center, 8);
        self.add_score(SHIELD_BOSS_HIT_POINTS);
        self.cue(Cue::ShieldHit);
    }

    /// Apply `hits` life losses in one go. Resets combo, shakes the camera
    /// and ends the run when lives run out.
    pub fn take_damage(&mut self, hits: u8) {
        if !self.is_playing() || hits == 0 {
            return;
        }
        self.run.lives = self.run.lives.saturating_sub(hits);
        self.run.combo = 1.0;
        self.shake(DAMAGE_SHAKE);
        self.dino.invulnerable_until = self.run.time_ms + self.tuning.hit_grace_ms;

        let pos = self.dino.pos;
        self.spawn_particles(pos, 10, colors::DAMAGE);
        self.cue(Cue::Damage);
        log::debug!("Took {hits} hit(s), {} lives left", self.run.lives);

        if self.run.lives == 0 {
            self.end_run();
        }
    }
}

//! Boss encounters
//!
//! A boss is an obstacle of kind `Boss` carrying a `BossState`. It bobs
//! vertically, fires three-projectile bursts on a timer, and is removed when
//! its health runs out.

use glam::Vec2;

use super::state::{Announcement, BossState, Cue, GameState, Obstacle, ObstacleKind};
use crate::consts::*;

/// Boss footprint
pub const BOSS_SIZE: Vec2 = Vec2::new(120.0, 100.0);
/// Projectile footprint
pub const PROJECTILE_SIZE: Vec2 = Vec2::new(15.0, 15.0);
/// Resting height of the boss (top edge above the ground)
const BOSS_HOVER: f32 = 130.0;
/// Vertical bob amplitude. The lowest point rests the boss on the ground.
const BOSS_BOB_AMPLITUDE: f32 = BOSS_HOVER - BOSS_SIZE.y;
/// Vertical spacing of a projectile burst
const BURST_SPREAD: f32 = 30.0;
/// Score for defeating a boss
pub const BOSS_DEFEAT_POINTS: u32 = 500;
/// Camera shake on defeat
const DEFEAT_SHAKE: f32 = 30.0;

impl GameState {
    /// Bosses may only appear on boss levels, one at a time
    pub fn boss_spawn_legal(&self) -> bool {
        let interval = self.tuning.boss_level_interval.max(1);
        let level = self.run.level;
        level >= interval
            && level.is_multiple_of(interval)
            && !self.run.boss_active
            && !self.obstacles.iter().any(|o| o.is_boss() && !o.removed)
    }

    /// Per-frame boss trial
    pub(crate) fn try_spawn_boss(&mut self, frames: f32) {
        if self.boss_spawn_legal() && self.chance(self.tuning.boss_rate, frames) {
            self.spawn_boss();
        }
    }

    /// Spawn a boss if legal. Returns whether one was spawned.
    pub fn spawn_boss(&mut self) -> bool {
        if !self.boss_spawn_legal() {
            return false;
        }
        self.run.boss_active = true;

        let id = self.next_entity_id();
        let pos = Vec2::new(WORLD_WIDTH + 100.0, GROUND_Y - BOSS_HOVER);
        let speed = self.run.speed * 0.5;
        let mut boss = Obstacle::new(id, ObstacleKind::Boss, pos, BOSS_SIZE, speed);
        boss.boss = Some(BossState::new(self.tuning.boss_health, pos.y));
        self.obstacles.push(boss);

        let level = self.run.level;
        self.announce(Announcement::BossBattle { level });
        self.cue(Cue::BossSpawn);
        true
    }

    /// Boss controller pass: timers, bob, attacks and defeat
    pub fn update_bosses(&mut self, dt_ms: f32, frames: f32) {
        let interval = self.tuning.boss_attack_interval_ms;
        let mut bursts: Vec<Vec2> = Vec::new();
        let mut defeated: Vec<usize> = Vec::new();

        for (i, obstacle) in self.obstacles.iter_mut().enumerate() {
            if obstacle.removed {
                continue;
            }
            let Some(boss) = obstacle.boss.as_mut() else {
                continue;
            };
            if boss.health <= 0 {
                defeated.push(i);
                continue;
            }
            boss.attack_timer_ms += dt_ms;
            boss.move_phase += 0.02 * frames;
            let bob_y = boss.anchor_y + boss.move_phase.sin() * BOSS_BOB_AMPLITUDE;
            let attack = boss.attack_timer_ms > interval;
            if attack {
                boss.attack_timer_ms = 0.0;
            }
            obstacle.pos.y = bob_y;
            if attack {
                bursts.push(obstacle.center());
            }
        }

        for origin in bursts {
            self.fire_burst(origin);
        }
        for index in defeated {
            self.defeat_boss(index);
        }
    }

    /// Three projectiles fanned vertically around `origin`
    fn fire_burst(&mut self, origin: Vec2) {
        let speed = self.run.speed * 1.5;
        for i in 0..3 {
            let id = self.next_entity_id();
            let offset = (i as f32 - 1.0) * BURST_SPREAD;
            let pos = Vec2::new(origin.x, origin.y + offset);
            self.obstacles.push(Obstacle::new(
                id,
                ObstacleKind::BossProjectile,
                pos,
                PROJECTILE_SIZE,
                speed,
            ));
        }
        self.cue(Cue::BossAttack);
    }

    fn defeat_boss(&mut self, index: usize) {
        let Some(boss) = self.obstacles.get_mut(index) else {
            return;
        };
        if boss.removed {
            return;
        }
        boss.removed = true;
        let center = boss.center();

        self.spawn_explosion(center, 20);
        self.shake(DEFEAT_SHAKE);
        self.run.boss_active = false;
        self.add_score(BOSS_DEFEAT_POINTS);
        self.run.lives = (self.run.lives + 1).min(self.tuning.max_lives);
        self.cue(Cue::BossDefeat);
        self.announce(Announcement::BossDefeated);
    }
}

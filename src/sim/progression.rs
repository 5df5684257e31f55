//! Score, combo and difficulty progression

use super::schedule::ScheduledAction;
use super::state::{Announcement, Cue, GameState};

/// Level reached at `score`: one level per `score_per_level` points.
pub fn level_for_score(score: u64, score_per_level: u64) -> u32 {
    let per_level = score_per_level.max(1);
    u32::try_from(score / per_level)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

impl GameState {
    /// Add `points` scaled by the current combo multiplier.
    ///
    /// The combo grows by a fixed step per score event and decays toward 1
    /// when the previous score event is older than the decay window. Decay is
    /// only evaluated here, on score events, not every frame.
    pub fn add_score(&mut self, points: u32) {
        let now = self.run.time_ms;
        let max = self.tuning.combo_max.max(1.0);

        let combo = f64::from(self.run.combo.clamp(1.0, max));
        self.run.score += (f64::from(points) * combo).floor() as u64;

        self.run.combo = (self.run.combo + self.tuning.combo_step).min(max);
        self.run.max_combo = self.run.max_combo.max(self.run.combo.floor() as u32);

        if let Some(last) = self.run.last_score_at {
            if now - last > self.tuning.combo_decay_after_ms {
                self.run.combo -= self.tuning.combo_decay_step;
            }
        }
        self.run.combo = self.run.combo.clamp(1.0, max);
        self.run.last_score_at = Some(now);

        self.update_level();
    }

    /// Recompute the level from the score and apply any level-ups
    pub fn update_level(&mut self) {
        let new_level = level_for_score(self.run.score, self.tuning.score_per_level);
        if new_level <= self.run.level {
            return;
        }
        let old_level = self.run.level;
        self.run.level = new_level;
        self.run.speed += self.tuning.speed_per_level;
        self.run.gravity += self.tuning.gravity_per_level;
        self.cue(Cue::LevelUp);
        log::info!("Level up: {old_level} -> {new_level}");

        for level in (old_level + 1)..=new_level {
            self.unlock_level(level);
        }
    }

    /// One-time messages and mechanics for milestone levels
    fn unlock_level(&mut self, level: u32) {
        if level == self.tuning.extreme_level {
            self.activate_extreme_mode();
        }
        match level {
            5 => self.announce(Announcement::MovingObstacles),
            10 => self.announce(Announcement::BeamsIncoming),
            20 => self.announce(Announcement::Nightmare),
            _ => {}
        }
    }

    fn activate_extreme_mode(&mut self) {
        if self.run.extreme_mode {
            return;
        }
        self.run.extreme_mode = true;
        self.distortion = self.distortion_enabled;
        self.run.speed *= self.tuning.extreme_speed_mult;
        self.run.gravity *= self.tuning.extreme_gravity_mult;
        let first = self.run.time_ms + self.tuning.extreme_spawn_interval_ms;
        self.scheduler.schedule(first, ScheduledAction::ExtremeSpawn);
        self.announce(Announcement::ExtremeMode);
    }

    /// Scheduled extreme-mode roll: maybe spawn, then re-arm
    pub(crate) fn extreme_spawn(&mut self, fired_at: f64) {
        if !self.run.extreme_mode || !self.is_playing() {
            return;
        }
        if self.chance(self.tuning.extreme_spawn_chance, 1.0) {
            self.spawn_obstacles(1.0);
        }
        let next = fired_at + self.tuning.extreme_spawn_interval_ms.max(1.0);
        self.scheduler.schedule(next, ScheduledAction::ExtremeSpawn);
    }

    /// Award points for every obstacle whose trailing edge has crossed the
    /// actor. Each obstacle is marked passed once; scoring is further
    /// rate-limited by the minimum gap since the actor's last score event.
    pub fn score_passed_obstacles(&mut self) {
        let dino_x = self.dino.pos.x;
        let gap = self.tuning.min_score_gap_ms;

        for i in 0..self.obstacles.len() {
            let obstacle = &mut self.obstacles[i];
            if obstacle.removed || obstacle.passed || obstacle.right_edge() >= dino_x {
                continue;
            }
            obstacle.passed = true;
            let points = obstacle.pass_points();

            let now = self.run.time_ms;
            let ready = self
                .dino
                .last_score_at
                .is_none_or(|last| now - last > gap);
            if ready {
                self.dino.last_score_at = Some(now);
                self.add_score(points);
            }
        }
    }
}

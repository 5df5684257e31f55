//! Procedural spawning of obstacles, clusters and power-ups
//!
//! Every trial is a per-reference-frame probability scaled to the real
//! frame length, so spawn density doesn't depend on the display rate.

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, Obstacle, ObstacleKind, Patrol, PowerUp, PowerUpKind};
use crate::consts::*;

/// Default obstacle footprint before kind and level adjustments
const OBSTACLE_SIZE: Vec2 = Vec2::new(40.0, 60.0);
/// Flyers float with their top edge this far above the ground...
const FLYER_BAND_LOW: f32 = 75.0;
/// ...plus up to this much extra height
const FLYER_BAND_SPAN: f32 = 110.0;
/// Gap between the ground and the bottom of a hanging beam
const BEAM_CLEARANCE: f32 = 40.0;
/// Highest point a patrolling obstacle sweeps to (above ground)
pub const PATROL_CEILING: f32 = 210.0;
/// Horizontal cadence of a cluster
const CLUSTER_SPACING: f32 = 80.0;
/// Chance that an obstacle patrols once level 10 is reached
const PATROL_CHANCE: f32 = 0.3;

/// Obstacle kinds unlocked at `level`: three to start, one more every three
/// levels.
pub fn available_kinds(level: u32) -> &'static [ObstacleKind] {
    let unlocked = (3 + (level / 3) as usize).min(ObstacleKind::SPAWNABLE.len());
    &ObstacleKind::SPAWNABLE[..unlocked]
}

impl GameState {
    /// Per-frame spawner pass
    pub fn spawn_tick(&mut self, frames: f32) {
        self.spawn_obstacles(frames);
        self.spawn_power_ups(frames);
    }

    /// Obstacle, cluster and boss trials
    pub fn spawn_obstacles(&mut self, frames: f32) {
        let level = self.run.level;
        if self.chance(self.tuning.obstacle_rate(level), frames) {
            self.spawn_random_obstacle();
        }

        if level >= self.tuning.cluster_min_level && self.chance(self.tuning.cluster_rate, frames) {
            self.spawn_cluster();
        }

        self.try_spawn_boss(frames);
    }

    pub fn spawn_power_ups(&mut self, frames: f32) {
        if !self.chance(self.tuning.power_up_rate, frames) {
            return;
        }
        let kinds = PowerUpKind::ALL;
        let kind = kinds[self.rng.random_range(0..kinds.len())];
        let pos = Vec2::new(
            WORLD_WIDTH + SPAWN_MARGIN,
            GROUND_Y - 110.0 - self.roll() * 100.0,
        );
        let id = self.next_entity_id();
        let speed = self.run.speed * 0.8;
        self.power_ups.push(PowerUp::new(id, kind, pos, speed));
        log::debug!("Spawned {kind:?} power-up");
    }

    /// Spawn one obstacle of a kind unlocked at the current level
    pub fn spawn_random_obstacle(&mut self) {
        let kinds = available_kinds(self.run.level);
        let kind = kinds[self.rng.random_range(0..kinds.len())];
        let obstacle = self.build_obstacle(kind);
        log::debug!("Spawned {:?} at y {:.0}", obstacle.kind, obstacle.pos.y);
        self.obstacles.push(obstacle);
    }

    /// Build an obstacle just past the right edge with kind geometry and
    /// level scaling applied
    pub fn build_obstacle(&mut self, kind: ObstacleKind) -> Obstacle {
        let level = self.run.level;
        let speed = self.run.speed + self.roll() * (2.0 + level as f32 * 0.5);

        let mut size = match kind {
            ObstacleKind::Flyer => Vec2::new(OBSTACLE_SIZE.x, 30.0),
            ObstacleKind::Spike => Vec2::new(20.0, 80.0),
            ObstacleKind::Beam => Vec2::new(24.0, 200.0),
            _ => OBSTACLE_SIZE,
        };
        let mut speed = speed;
        if level >= 5 {
            speed *= 1.2;
            size.x *= 1.1;
        }
        if level >= 10 {
            size.y *= 1.2;
        }

        let y = match kind {
            ObstacleKind::Flyer => GROUND_Y - FLYER_BAND_LOW - self.roll() * FLYER_BAND_SPAN,
            ObstacleKind::Beam => GROUND_Y - BEAM_CLEARANCE - size.y,
            _ => GROUND_Y - size.y,
        };

        let id = self.next_entity_id();
        let mut obstacle = Obstacle::new(
            id,
            kind,
            Vec2::new(WORLD_WIDTH + SPAWN_MARGIN, y),
            size,
            speed,
        );
        if kind == ObstacleKind::Flyer {
            obstacle.wing_phase = Some(0.0);
        }
        if level >= 10 && self.roll() < PATROL_CHANCE {
            let direction = if self.roll() < 0.5 { 1.0 } else { -1.0 };
            obstacle.patrol = Some(Patrol { direction });
        }
        obstacle
    }

    /// Two to four ground obstacles in a tight row
    pub fn spawn_cluster(&mut self) {
        let count = 2 + self.rng.random_range(0..3);
        let base_x = WORLD_WIDTH + SPAWN_MARGIN;
        let size = Vec2::new(30.0, 60.0);

        for i in 0..count {
            let speed = self.run.speed + self.roll() * 2.0;
            let id = self.next_entity_id();
            let pos = Vec2::new(base_x + i as f32 * CLUSTER_SPACING, GROUND_Y - size.y);
            let mut obstacle = Obstacle::new(id, ObstacleKind::LowGround, pos, size, speed);
            obstacle.cluster = true;
            self.obstacles.push(obstacle);
        }
        log::debug!("Spawned cluster of {count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_run();
        state
    }

    #[test]
    fn test_kinds_unlock_with_level() {
        assert_eq!(available_kinds(1).len(), 3);
        assert!(!available_kinds(2).contains(&ObstacleKind::Spike));
        assert!(available_kinds(3).contains(&ObstacleKind::Spike));
        assert_eq!(available_kinds(6).len(), 5);
        assert_eq!(available_kinds(40).len(), 5);
        assert!(!available_kinds(40).contains(&ObstacleKind::Boss));
    }

    #[test]
    fn test_ground_obstacles_sit_on_ground() {
        let mut state = playing(11);
        for kind in [ObstacleKind::LowGround, ObstacleKind::Rock, ObstacleKind::Spike] {
            let obstacle = state.build_obstacle(kind);
            assert!((obstacle.bounds().max.y - GROUND_Y).abs() < 1e-3);
            assert!(obstacle.pos.x > WORLD_WIDTH);
            assert!(!obstacle.passed);
        }
    }

    #[test]
    fn test_flyers_float_in_band() {
        let mut state = playing(12);
        for _ in 0..50 {
            let flyer = state.build_obstacle(ObstacleKind::Flyer);
            let top = flyer.pos.y;
            assert!(top <= GROUND_Y - FLYER_BAND_LOW);
            assert!(top >= GROUND_Y - FLYER_BAND_LOW - FLYER_BAND_SPAN);
            assert_eq!(flyer.wing_phase, Some(0.0));
        }
    }

    #[test]
    fn test_level_scaling() {
        let mut state = playing(13);
        let low = state.build_obstacle(ObstacleKind::Rock);
        assert_eq!(low.size, OBSTACLE_SIZE);
        assert!(low.patrol.is_none());

        state.run.level = 10;
        let high = state.build_obstacle(ObstacleKind::Rock);
        assert!((high.size.x - OBSTACLE_SIZE.x * 1.1).abs() < 1e-4);
        assert!((high.size.y - OBSTACLE_SIZE.y * 1.2).abs() < 1e-4);
        assert!(high.speed >= state.run.speed * 1.2);
    }

    #[test]
    fn test_some_obstacles_patrol_past_level_ten() {
        let mut state = playing(14);
        state.run.level = 12;
        let patrolling = (0..200)
            .map(|_| state.build_obstacle(ObstacleKind::Rock))
            .filter(|o| o.patrol.is_some())
            .count();
        assert!(patrolling > 20 && patrolling < 120);
    }

    #[test]
    fn test_cluster_size_and_cadence() {
        let mut state = playing(15);
        for _ in 0..20 {
            state.obstacles.clear();
            state.spawn_cluster();
            let n = state.obstacles.len();
            assert!((2..=4).contains(&n));
            for pair in state.obstacles.windows(2) {
                assert!((pair[1].pos.x - pair[0].pos.x - CLUSTER_SPACING).abs() < 1e-3);
                assert!(pair[1].cluster);
            }
        }
    }

    #[test]
    fn test_spawn_rate_roughly_matches_probability() {
        let mut state = playing(16);
        let frames = 10_000;
        for _ in 0..frames {
            state.spawn_power_ups(1.0);
        }
        let expected = frames as f64 * state.tuning.power_up_rate;
        let got = state.power_ups.len() as f64;
        assert!(got > expected * 0.5 && got < expected * 1.5);
    }
}

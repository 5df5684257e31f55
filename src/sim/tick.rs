//! Frame step
//!
//! Core game loop that advances the simulation by one variable-length frame.
//! Stage order within a frame is fixed: scheduled actions, input commands,
//! effect maintenance, actor, spawner, motion, collisions, progression,
//! bosses, cosmetics, compaction.

use glam::Vec2;

use super::actor::Dino;
use super::schedule::ScheduledAction;
use super::spawn::PATROL_CEILING;
use super::state::{Cue, GamePhase, GameState, ObstacleKind, PowerUpKind, colors};
use crate::consts::*;

/// Points per obstacle caught in a shield blast
pub const SPECIAL_BLAST_POINTS: u32 = 50;
/// Autopilot jumps when the next ground obstacle is this many frames away
const AUTOPILOT_JUMP_FRAMES: f32 = 10.0;
/// Autopilot ducks when the next overhead obstacle is this many frames away
const AUTOPILOT_DUCK_FRAMES: f32 = 6.0;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer x in screen space (cosmetic parallax)
    pub pointer_x: Option<f32>,
    pub jump: bool,
    pub duck: bool,
    /// Shield blast
    pub special: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the game plays itself
    pub autopilot: bool,
}

/// Advance the game state by `dt_ms` milliseconds of wall time
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.pause();
                return;
            }
            GamePhase::Paused => state.resume(),
            _ => {}
        }
    }

    // Don't tick unless playing
    if !state.is_playing() {
        return;
    }

    let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
    let frames = dt_ms / REFERENCE_FRAME_MS;
    state.run.time_ms += dt_ms as f64;

    // Deferred actions due by now (duck release, extreme-mode spawns)
    state.run_scheduled();

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    let input = &input;

    if input.pointer_x.is_some() {
        state.pointer_x = input.pointer_x;
    }
    if input.jump {
        state.jump();
    }
    if input.duck {
        state.duck();
    }
    if input.special {
        state.use_special();
    }

    state.maintain_effects();

    // Actor
    let gravity = state.run.gravity;
    if state.dino.update(gravity, frames) {
        let feet = state.dino.feet();
        state.spawn_particles(feet, 5, colors::DINO);
    }
    state.dino.record_trail();
    state.dino.follow_pointer(state.pointer_x);

    state.spawn_tick(frames);

    move_obstacles(state, frames);
    move_power_ups(state, frames);
    state.apply_magnet(frames);

    state.resolve_collisions();

    if state.is_playing() {
        state.score_passed_obstacles();
        state.update_bosses(dt_ms, frames);
    }

    update_cosmetics(state, dt_ms, frames);
    state.compact();
}

impl GameState {
    /// Jump command. No-op unless playing or when already airborne.
    pub fn jump(&mut self) {
        if !self.is_playing() {
            return;
        }
        let power = self.run.jump_power;
        if self.dino.jump(power) {
            let feet = self.dino.feet();
            self.spawn_particles(feet, 5, colors::DINO);
            self.cue(Cue::Jump);
        }
    }

    /// Duck command. The release is scheduled for a fixed window later and
    /// tagged with this duck's start time.
    pub fn duck(&mut self) {
        if !self.is_playing() {
            return;
        }
        let now = self.run.time_ms;
        if self.dino.duck(now) {
            self.scheduler.schedule(
                now + DUCK_DURATION_MS,
                ScheduledAction::ReleaseDuck { started_at: now },
            );
        }
    }

    /// Shield blast: clears every regular obstacle near the actor and
    /// damages a boss in range. Needs an active shield.
    pub fn use_special(&mut self) {
        if !self.is_playing() || !self.effects.is_active(PowerUpKind::Shield) {
            return;
        }
        let origin = self.dino.center();
        let damage = self.tuning.boss_shield_damage;
        let mut cleared = 0;

        for i in 0..self.obstacles.len() {
            let obstacle = &self.obstacles[i];
            if obstacle.removed || (obstacle.center().x - origin.x).abs() >= SPECIAL_RADIUS {
                continue;
            }
            if obstacle.is_boss() {
                self.damage_boss(i, damage);
                continue;
            }
            let center = obstacle.center();
            self.obstacles[i].removed = true;
            self.spawn_explosion(center, 10);
            self.add_score(SPECIAL_BLAST_POINTS);
            cleared += 1;
        }
        log::debug!("Shield blast cleared {cleared} obstacle(s)");
        self.cue(Cue::ShieldBlast);
    }
}

fn move_obstacles(state: &mut GameState, frames: f32) {
    let patrol_top = GROUND_Y - PATROL_CEILING;
    let mut boss_escaped = false;

    for obstacle in state.obstacles.iter_mut().filter(|o| !o.removed) {
        obstacle.pos.x -= obstacle.speed * frames;

        if let Some(phase) = obstacle.wing_phase.as_mut() {
            *phase += 0.3 * frames;
            obstacle.pos.y += phase.sin() * 2.0 * frames;
        }

        if let Some(patrol) = obstacle.patrol.as_mut() {
            let bottom = GROUND_Y - obstacle.size.y;
            obstacle.pos.y += patrol.direction * 2.0 * frames;
            if obstacle.pos.y <= patrol_top {
                obstacle.pos.y = patrol_top;
                patrol.direction = 1.0;
            } else if obstacle.pos.y >= bottom {
                obstacle.pos.y = bottom;
                patrol.direction = -1.0;
            }
        }

        if obstacle.right_edge() < OBSTACLE_DESPAWN_X {
            obstacle.removed = true;
            if obstacle.kind == ObstacleKind::Boss {
                boss_escaped = true;
            }
        }
    }

    if boss_escaped {
        state.run.boss_active = false;
        log::info!("Boss escaped");
    }
}

fn move_power_ups(state: &mut GameState, frames: f32) {
    for power_up in state.power_ups.iter_mut().filter(|p| !p.removed) {
        power_up.pos.x -= power_up.speed * frames;
        power_up.rotation += 0.05 * frames;
        power_up.pulse += 0.1 * frames;
        if power_up.pos.x + power_up.size.x < 0.0 {
            power_up.removed = true;
        }
    }
}

fn update_cosmetics(state: &mut GameState, dt_ms: f32, frames: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * frames;
        particle.vel.y += 0.2 * frames;
        particle.life_ms -= dt_ms;
    }

    for i in 0..state.clouds.len() {
        let cloud = &mut state.clouds[i];
        cloud.pos.x -= cloud.speed * frames;
        if cloud.pos.x + cloud.size.x < 0.0 {
            let x = WORLD_WIDTH + state.roll() * 200.0;
            let y = state.roll() * WORLD_HEIGHT * 0.3;
            state.clouds[i].pos = Vec2::new(x, y);
        }
    }

    state.screen_shake *= 0.9f32.powf(frames);
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
}

/// Demo driver: blast when shielded, jump ground obstacles, duck overhead ones
fn autopilot(state: &GameState, input: &mut TickInput) {
    let dino = &state.dino;
    let origin = dino.center();

    if state.effects.is_active(PowerUpKind::Shield) {
        input.special = state.obstacles.iter().any(|o| {
            !o.removed && !o.is_boss() && (o.center().x - origin.x).abs() < SPECIAL_RADIUS
        });
        return;
    }

    let front = dino.pos.x + dino.size.x;
    let Some(next) = state
        .obstacles
        .iter()
        .filter(|o| !o.removed && o.right_edge() > dino.pos.x)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
    else {
        return;
    };

    let gap = next.pos.x - front;
    let bottom = next.bounds().max.y - COLLISION_MARGIN;
    let standing_top = Dino::ground_top();

    if bottom <= standing_top {
        // Passes overhead
        return;
    }
    if bottom > GROUND_Y - DINO_SIZE * DUCK_HEIGHT_RATIO {
        input.jump = gap < next.speed * AUTOPILOT_JUMP_FRAMES;
    } else {
        input.duck = gap < next.speed * AUTOPILOT_DUCK_FRAMES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BossState, GameEvent, Obstacle};

    const DT: f32 = REFERENCE_FRAME_MS;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_run();
        state
    }

    /// State with spawning switched off so scenarios stay controlled
    fn quiet(seed: u64) -> GameState {
        let mut state = playing(seed);
        state.tuning.obstacle_base_rate = 0.0;
        state.tuning.obstacle_rate_per_level = 0.0;
        state.tuning.power_up_rate = 0.0;
        state.tuning.cluster_rate = 0.0;
        state.tuning.boss_rate = 0.0;
        state
    }

    fn push_obstacle(state: &mut GameState, kind: ObstacleKind, pos: Vec2, size: Vec2) -> usize {
        let id = state.next_entity_id();
        let speed = state.run.speed;
        state.obstacles.push(Obstacle::new(id, kind, pos, size, speed));
        state.obstacles.len() - 1
    }

    #[test]
    fn test_tick_pause() {
        let mut state = playing(12345);
        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Time is frozen while paused
        let time = state.run.time_ms;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.run.time_ms, time);

        // Unpause runs the frame
        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.run.time_ms > time);
    }

    #[test]
    fn test_commands_ignored_outside_a_run() {
        let mut state = GameState::new(1);
        state.jump();
        state.duck();
        state.use_special();
        assert!(!state.dino.is_jumping);
        assert!(!state.dino.is_ducking);
        assert!(state.scheduler.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut state = quiet(2);
        tick(&mut state, &TickInput::default(), 5_000.0);
        assert_eq!(state.run.time_ms, MAX_FRAME_MS as f64);
        tick(&mut state, &TickInput::default(), -30.0);
        assert_eq!(state.run.time_ms, MAX_FRAME_MS as f64);
    }

    #[test]
    fn test_jump_arc_lands_again() {
        let mut state = quiet(3);
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(state.dino.is_jumping);
        assert!(state.events.contains(&GameEvent::Cue(Cue::Jump)));

        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.dino.is_jumping);
        assert_eq!(state.dino.pos.y, Dino::ground_top());
    }

    #[test]
    fn test_duck_releases_then_cools_down() {
        let mut state = quiet(4);
        let duck = TickInput {
            duck: true,
            ..Default::default()
        };
        tick(&mut state, &duck, DT);
        assert!(state.dino.is_ducking);

        // Still ducking just before the window closes
        while state.run.time_ms + (DT as f64) < DUCK_DURATION_MS {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.dino.is_ducking);

        for _ in 0..3 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.dino.is_ducking);

        // Inside the cooldown a duck is a no-op
        let before = state.dino.clone();
        tick(&mut state, &duck, DT);
        assert!(!state.dino.is_ducking);
        assert_eq!(state.dino.duck_cooldown_until, before.duck_cooldown_until);
        assert_eq!(state.dino.duck_started_at, None);

        for _ in 0..15 {
            tick(&mut state, &TickInput::default(), DT);
        }
        tick(&mut state, &duck, DT);
        assert!(state.dino.is_ducking);
    }

    #[test]
    fn test_reset_drops_pending_duck_release() {
        let mut state = quiet(5);
        state.duck();
        assert!(!state.scheduler.is_empty());
        state.start_run();
        assert!(state.scheduler.is_empty());
        assert!(!state.dino.is_ducking);
    }

    #[test]
    fn test_obstacles_scroll_and_despawn() {
        let mut state = quiet(6);
        let index = push_obstacle(
            &mut state,
            ObstacleKind::Rock,
            Vec2::new(-140.0, GROUND_Y - 60.0),
            Vec2::new(40.0, 60.0),
        );
        let x = state.obstacles[index].pos.x;
        let speed = state.obstacles[index].speed;
        tick(&mut state, &TickInput::default(), DT);
        // Right edge was already past the despawn line after one step
        assert!(x - speed + 40.0 < OBSTACLE_DESPAWN_X);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_boss_escape_clears_flag() {
        let mut state = quiet(7);
        let index = push_obstacle(
            &mut state,
            ObstacleKind::Boss,
            Vec2::new(-215.0, 100.0),
            Vec2::new(120.0, 100.0),
        );
        state.obstacles[index].boss = Some(BossState::new(100, 100.0));
        state.run.boss_active = true;
        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.run.boss_active);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.run.score, 0);
    }

    #[test]
    fn test_patrol_stays_in_band() {
        let mut state = quiet(8);
        let index = push_obstacle(
            &mut state,
            ObstacleKind::Rock,
            Vec2::new(WORLD_WIDTH, GROUND_Y - 60.0),
            Vec2::new(40.0, 60.0),
        );
        state.obstacles[index].speed = 0.0;
        state.obstacles[index].patrol = Some(crate::sim::state::Patrol { direction: -1.0 });
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), DT);
            let o = &state.obstacles[0];
            assert!(o.pos.y >= GROUND_Y - PATROL_CEILING - 1e-3);
            assert!(o.pos.y <= GROUND_Y - o.size.y + 1e-3);
        }
    }

    #[test]
    fn test_special_needs_shield() {
        let mut state = quiet(9);
        let near = state.dino.pos + Vec2::new(150.0, 0.0);
        push_obstacle(&mut state, ObstacleKind::Rock, near, Vec2::new(40.0, 60.0));
        state.use_special();
        assert!(!state.obstacles[0].is_removed());
        assert_eq!(state.run.score, 0);
    }

    #[test]
    fn test_special_blast_clears_nearby_and_spares_boss() {
        let mut state = quiet(10);
        state.effects.activate(PowerUpKind::Shield, 0.0, 10_000.0);
        let dino = state.dino.pos;
        let near = push_obstacle(
            &mut state,
            ObstacleKind::Rock,
            dino + Vec2::new(120.0, 0.0),
            Vec2::new(40.0, 60.0),
        );
        let far = push_obstacle(
            &mut state,
            ObstacleKind::Rock,
            dino + Vec2::new(600.0, 0.0),
            Vec2::new(40.0, 60.0),
        );
        let boss = push_obstacle(
            &mut state,
            ObstacleKind::Boss,
            dino + Vec2::new(100.0, -200.0),
            Vec2::new(120.0, 100.0),
        );
        state.obstacles[boss].boss = Some(BossState::new(100, dino.y - 200.0));

        state.use_special();
        assert!(state.obstacles[near].is_removed());
        assert!(!state.obstacles[far].is_removed());
        assert!(!state.obstacles[boss].is_removed());
        assert_eq!(state.obstacles[boss].boss.map(|b| b.health), Some(80));
        assert!(state.events.contains(&GameEvent::Cue(Cue::ShieldBlast)));
        assert!(state.run.score >= SPECIAL_BLAST_POINTS as u64);
    }

    #[test]
    fn test_speed_effect_expires_through_tick() {
        let mut state = quiet(11);
        state.effects.activate(PowerUpKind::Speed, 0.0, 1_000.0);
        state.run.speed *= 0.5;
        state.run.level = 2;
        for _ in 0..70 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.effects.is_active(PowerUpKind::Speed));
        assert_eq!(state.run.speed, state.tuning.speed_for_level(2));
    }

    #[test]
    fn test_autopilot_jumps_ground_obstacle() {
        let mut state = quiet(12);
        let front = state.dino.pos.x + state.dino.size.x;
        let x = front + state.run.speed * 5.0;
        push_obstacle(
            &mut state,
            ObstacleKind::Rock,
            Vec2::new(x, GROUND_Y - 60.0),
            Vec2::new(40.0, 60.0),
        );
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(state.dino.is_jumping);
    }

    #[test]
    fn test_autopilot_ducks_beam() {
        let mut state = quiet(13);
        let front = state.dino.pos.x + state.dino.size.x;
        let x = front + state.run.speed * 3.0;
        push_obstacle(
            &mut state,
            ObstacleKind::Beam,
            Vec2::new(x, GROUND_Y - 240.0),
            Vec2::new(24.0, 200.0),
        );
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(state.dino.is_ducking);
        assert!(!state.dino.is_jumping);
    }

    #[test]
    fn test_screen_shake_decays() {
        let mut state = quiet(14);
        state.screen_shake = 10.0;
        tick(&mut state, &TickInput::default(), DT);
        assert!((state.screen_shake - 9.0).abs() < 1e-3);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.screen_shake, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = playing(99999);
        let mut state2 = playing(99999);

        let inputs = [
            TickInput {
                pointer_x: Some(300.0),
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                duck: true,
                ..Default::default()
            },
        ];

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input, DT);
            tick(&mut state2, input, DT);
        }

        assert_eq!(state1.run.score, state2.run.score);
        assert_eq!(state1.run.lives, state2.run.lives);
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        for (a, b) in state1.obstacles.iter().zip(&state2.obstacles) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pos, b.pos);
        }
    }
}

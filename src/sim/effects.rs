//! Active power-up effects
//!
//! Each collected kind maps to an expiry time. Expiry is handled by a
//! dedicated per-frame maintenance step which also reverts the parameter
//! the effect changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{Cue, GameState, PowerUpKind, colors};
use crate::consts::{MAGNET_PULL, MAGNET_RADIUS};

/// Currently active power-ups and when they run out (game time, ms)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    expiries: BTreeMap<PowerUpKind, f64>,
}

impl ActiveEffects {
    /// Activate or refresh `kind` until `now + duration_ms`.
    /// Returns true if the effect wasn't active before.
    pub fn activate(&mut self, kind: PowerUpKind, now: f64, duration_ms: f64) -> bool {
        self.expiries.insert(kind, now + duration_ms).is_none()
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.expiries.contains_key(&kind)
    }

    pub fn expires_at(&self, kind: PowerUpKind) -> Option<f64> {
        self.expiries.get(&kind).copied()
    }

    /// Milliseconds left on `kind` (0 if inactive)
    pub fn remaining_ms(&self, kind: PowerUpKind, now: f64) -> f64 {
        self.expires_at(kind)
            .map(|at| (at - now).max(0.0))
            .unwrap_or(0.0)
    }

    /// Remove and return every effect whose expiry is at or before `now`
    pub fn take_expired(&mut self, now: f64) -> Vec<PowerUpKind> {
        let expired: Vec<PowerUpKind> = self
            .expiries
            .iter()
            .filter(|&(_, &at)| at <= now)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in &expired {
            self.expiries.remove(kind);
        }
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (PowerUpKind, f64)> + '_ {
        self.expiries.iter().map(|(&kind, &at)| (kind, at))
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

impl GameState {
    /// Pick up the power-up at `index`: start (or refresh) its effect and
    /// mark it for removal.
    pub(crate) fn collect_power_up(&mut self, index: usize) {
        let Some(power_up) = self.power_ups.get_mut(index) else {
            return;
        };
        if power_up.removed {
            return;
        }
        power_up.removed = true;
        let kind = power_up.kind;
        let pos = power_up.pos;

        let now = self.run.time_ms;
        let duration = self.tuning.effect_duration_ms;
        let fresh = self.effects.activate(kind, now, duration);
        log::debug!("Collected {kind:?} (fresh: {fresh})");

        // Refreshing only extends the timer; the change itself applies once
        if fresh {
            match kind {
                PowerUpKind::Speed => self.run.speed *= self.tuning.speed_effect_factor,
                PowerUpKind::JumpBoost => self.run.jump_power = self.tuning.boosted_jump_power,
                PowerUpKind::Shield | PowerUpKind::Magnet => {}
            }
        }

        self.spawn_particles(pos, 8, colors::COLLECT);
        self.cue(Cue::Collect);
    }

    /// Expire effects whose time is up and revert what they changed
    pub fn maintain_effects(&mut self) {
        for kind in self.effects.take_expired(self.run.time_ms) {
            log::debug!("{kind:?} expired");
            match kind {
                PowerUpKind::Speed => {
                    self.run.speed = self.tuning.speed_for_level(self.run.level);
                }
                PowerUpKind::JumpBoost => self.run.jump_power = self.tuning.jump_power,
                PowerUpKind::Shield | PowerUpKind::Magnet => {}
            }
        }
    }

    /// Magnet: drag nearby power-ups toward the actor
    pub(crate) fn apply_magnet(&mut self, frames: f32) {
        if !self.effects.is_active(PowerUpKind::Magnet) {
            return;
        }
        let target = self.dino.center();
        for power_up in self.power_ups.iter_mut().filter(|p| !p.removed) {
            let to_dino = target - power_up.center();
            let distance = to_dino.length();
            if distance > 0.0 && distance < MAGNET_RADIUS {
                let step = (MAGNET_PULL * frames).min(distance);
                power_up.pos += to_dino.normalize_or_zero() * step;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::state::PowerUp;

    fn playing() -> GameState {
        let mut state = GameState::new(5);
        state.start_run();
        state
    }

    fn give(state: &mut GameState, kind: PowerUpKind) {
        let id = state.next_entity_id();
        let pos = state.dino.pos;
        state.power_ups.push(PowerUp::new(id, kind, pos, 4.0));
        let index = state.power_ups.len() - 1;
        state.collect_power_up(index);
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let mut effects = ActiveEffects::default();
        assert!(effects.activate(PowerUpKind::Shield, 0.0, 10_000.0));
        assert!(!effects.activate(PowerUpKind::Shield, 4_000.0, 10_000.0));
        assert_eq!(effects.expires_at(PowerUpKind::Shield), Some(14_000.0));
        assert!(effects.take_expired(13_999.0).is_empty());
        assert_eq!(effects.take_expired(14_000.0), vec![PowerUpKind::Shield]);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_speed_round_trip_reverts_to_level_speed() {
        let mut state = playing();
        let base = state.run.speed;
        give(&mut state, PowerUpKind::Speed);
        assert_eq!(state.run.speed, base * 0.5);

        // A level-up while the effect runs doesn't change what expiry restores
        state.run.level = 3;
        state.run.time_ms = state.tuning.effect_duration_ms;
        state.maintain_effects();
        assert_eq!(state.run.speed, state.tuning.base_speed + 3.0);
        assert!(!state.effects.is_active(PowerUpKind::Speed));
    }

    #[test]
    fn test_speed_refresh_does_not_stack() {
        let mut state = playing();
        let base = state.run.speed;
        give(&mut state, PowerUpKind::Speed);
        state.run.time_ms = 5_000.0;
        give(&mut state, PowerUpKind::Speed);
        assert_eq!(state.run.speed, base * 0.5);
        assert_eq!(state.effects.expires_at(PowerUpKind::Speed), Some(15_000.0));
    }

    #[test]
    fn test_jump_boost_reverts() {
        let mut state = playing();
        give(&mut state, PowerUpKind::JumpBoost);
        assert_eq!(state.run.jump_power, state.tuning.boosted_jump_power);
        state.run.time_ms = 10_000.0;
        state.maintain_effects();
        assert_eq!(state.run.jump_power, state.tuning.jump_power);
    }

    #[test]
    fn test_collect_marks_removal_and_cues() {
        let mut state = playing();
        give(&mut state, PowerUpKind::Shield);
        assert!(state.power_ups[0].removed);
        assert!(state.effects.is_active(PowerUpKind::Shield));
        assert!(state.events.contains(&crate::sim::GameEvent::Cue(Cue::Collect)));
    }

    #[test]
    fn test_magnet_pulls_nearby_power_ups() {
        let mut state = playing();
        state.effects.activate(PowerUpKind::Magnet, 0.0, 10_000.0);
        let near = state.dino.center() + Vec2::new(150.0, -40.0);
        let far = state.dino.center() + Vec2::new(900.0, 0.0);
        state.power_ups.push(PowerUp::new(1, PowerUpKind::Speed, near, 4.0));
        state.power_ups.push(PowerUp::new(2, PowerUpKind::Speed, far, 4.0));

        let before = state.power_ups[0].center().distance(state.dino.center());
        state.apply_magnet(1.0);
        let after = state.power_ups[0].center().distance(state.dino.center());
        assert!(after < before);
        assert_eq!(state.power_ups[1].pos, far);
    }
}

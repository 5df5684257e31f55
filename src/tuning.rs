//! Data-driven game balance
//!
//! Every balance knob of the simulation lives here so difficulty can be
//! tweaked from a JSON file without recompiling. Missing fields fall back to
//! the defaults, so a tuning file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to load a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Balance constants for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    /// Global scroll speed at level 1 (pixels per reference frame)
    pub base_speed: f32,
    /// Gravity at level 1 (pixels per reference frame squared)
    pub base_gravity: f32,
    /// Jump impulse (negative = upward)
    pub jump_power: f32,
    /// Jump impulse while the jump-boost effect is active
    pub boosted_jump_power: f32,

    // === Progression ===
    /// Score needed per level
    pub score_per_level: u64,
    /// Additive speed bump per level-up
    pub speed_per_level: f32,
    /// Additive gravity bump per level-up
    pub gravity_per_level: f32,
    /// Level that switches on extreme mode
    pub extreme_level: u32,
    /// Multiplicative boosts applied when extreme mode starts
    pub extreme_speed_mult: f32,
    pub extreme_gravity_mult: f32,
    /// Extra-spawn cadence and odds while in extreme mode
    pub extreme_spawn_interval_ms: f64,
    pub extreme_spawn_chance: f64,

    // === Combo ===
    pub combo_step: f32,
    pub combo_max: f32,
    pub combo_decay_step: f32,
    pub combo_decay_after_ms: f64,
    /// Minimum gap between two passing-score events
    pub min_score_gap_ms: f64,

    // === Spawning (per-frame probabilities) ===
    pub obstacle_base_rate: f64,
    pub obstacle_rate_per_level: f64,
    pub obstacle_rate_cap: f64,
    pub power_up_rate: f64,
    pub cluster_rate: f64,
    pub cluster_min_level: u32,
    pub boss_rate: f64,
    /// Bosses appear on multiples of this level
    pub boss_level_interval: u32,

    // === Power-ups ===
    pub effect_duration_ms: f64,
    /// Global speed factor while the speed effect is active
    pub speed_effect_factor: f32,

    // === Lives ===
    pub starting_lives: u8,
    pub max_lives: u8,
    /// Invulnerability window after taking a hit
    pub hit_grace_ms: f64,

    // === Boss ===
    pub boss_health: i32,
    pub boss_shield_damage: i32,
    pub boss_attack_interval_ms: f32,
    pub boss_knockback: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            base_gravity: 0.8,
            jump_power: -15.0,
            boosted_jump_power: -20.0,

            score_per_level: 1500,
            speed_per_level: 0.8,
            gravity_per_level: 0.1,
            extreme_level: 15,
            extreme_speed_mult: 1.5,
            extreme_gravity_mult: 1.3,
            extreme_spawn_interval_ms: 1000.0,
            extreme_spawn_chance: 0.3,

            combo_step: 0.05,
            combo_max: 5.0,
            combo_decay_step: 0.1,
            combo_decay_after_ms: 2000.0,
            min_score_gap_ms: 100.0,

            obstacle_base_rate: 0.015,
            obstacle_rate_per_level: 0.008,
            obstacle_rate_cap: 0.08,
            power_up_rate: 0.005,
            cluster_rate: 0.005,
            cluster_min_level: 8,
            boss_rate: 0.001,
            boss_level_interval: 5,

            effect_duration_ms: 10_000.0,
            speed_effect_factor: 0.5,

            starting_lives: 3,
            max_lives: 5,
            hit_grace_ms: 1000.0,

            boss_health: 100,
            boss_shield_damage: 20,
            boss_attack_interval_ms: 2000.0,
            boss_knockback: 20.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON text
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Global speed for a level with no effects applied
    pub fn speed_for_level(&self, level: u32) -> f32 {
        self.base_speed + level as f32
    }

    /// Per-frame obstacle spawn probability for a level
    pub fn obstacle_rate(&self, level: u32) -> f64 {
        (self.obstacle_base_rate + level as f64 * self.obstacle_rate_per_level)
            .min(self.obstacle_rate_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_speed": 9.0, "starting_lives": 1 }"#).unwrap();
        assert_eq!(tuning.base_speed, 9.0);
        assert_eq!(tuning.starting_lives, 1);
        assert_eq!(tuning.score_per_level, 1500);
        assert_eq!(tuning.max_lives, 5);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }

    #[test]
    fn test_obstacle_rate_is_capped() {
        let tuning = Tuning::default();
        assert!((tuning.obstacle_rate(1) - 0.023).abs() < 1e-9);
        assert_eq!(tuning.obstacle_rate(50), tuning.obstacle_rate_cap);
    }
}

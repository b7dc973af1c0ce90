use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Vec2;

const DEFAULT_TILE_SIZE: f64 = 16.0;
const DEFAULT_ZONE_WIDTH_TILES: u32 = 20;
const DEFAULT_MAP_ROW: f64 = 3.0;
pub(crate) const MIN_STEP_DURATION: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be a finite number >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must be positive, got {value}")]
    NonPositiveHealth { field: &'static str, value: i32 },
    #[error("{field} must not be negative, got {value}")]
    NegativeDamage { field: &'static str, value: i32 },
    #[error("{field} of {speed} gives a step shorter than 1 ms or out of range")]
    StepOutOfRange { field: &'static str, speed: f64 },
}

/// Tunables for one simulation session. Distances are world units, durations milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub tile_size: f64,
    pub zone_width_tiles: u32,
    pub player_spawn: Vec2,
    pub enemy_spawn: Vec2,
    pub player_max_health: i32,
    pub player_speed: f64,
    pub player_damage: i32,
    pub enemy_max_health: i32,
    pub enemy_speed: f64,
    pub enemy_damage: i32,
    pub spawn_jitter_tiles: f64,
    pub step_base_ms: u64,
    pub attack_window_ms: u64,
    pub enemy_strike_delay_ms: u64,
    pub enemy_attack_cooldown_ms: u64,
    /// Entering this zone ends the run as a win. `None` plays on indefinitely.
    pub goal_zone: Option<u32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            zone_width_tiles: DEFAULT_ZONE_WIDTH_TILES,
            player_spawn: Vec2::new(DEFAULT_TILE_SIZE * 2.0, DEFAULT_TILE_SIZE * DEFAULT_MAP_ROW),
            enemy_spawn: Vec2::new(DEFAULT_TILE_SIZE * 14.0, DEFAULT_TILE_SIZE * DEFAULT_MAP_ROW),
            player_max_health: 100,
            player_speed: 1.0,
            player_damage: 50,
            enemy_max_health: 100,
            enemy_speed: 0.5,
            enemy_damage: 2,
            spawn_jitter_tiles: 2.0,
            step_base_ms: 100,
            attack_window_ms: 450,
            enemy_strike_delay_ms: 250,
            enemy_attack_cooldown_ms: 1000,
            goal_zone: None,
        }
    }
}

impl SimConfig {
    pub fn zone_width(&self) -> f64 {
        self.tile_size * f64::from(self.zone_width_tiles)
    }

    pub fn spawn_jitter(&self) -> f64 {
        self.tile_size * self.spawn_jitter_tiles
    }

    pub fn step_base(&self) -> Duration {
        Duration::from_millis(self.step_base_ms)
    }

    pub fn attack_window(&self) -> Duration {
        Duration::from_millis(self.attack_window_ms)
    }

    pub fn enemy_strike_delay(&self) -> Duration {
        Duration::from_millis(self.enemy_strike_delay_ms)
    }

    pub fn enemy_attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.enemy_attack_cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tile_size", self.tile_size)?;
        require_positive("player_speed", self.player_speed)?;
        require_positive("enemy_speed", self.enemy_speed)?;
        require_non_negative("spawn_jitter_tiles", self.spawn_jitter_tiles)?;
        require_non_negative("spawn_jitter", self.spawn_jitter())?;
        for (field, point) in [
            ("player_spawn", self.player_spawn),
            ("enemy_spawn", self.enemy_spawn),
        ] {
            require_non_negative(field, point.x)?;
            require_non_negative(field, point.y)?;
        }
        if self.zone_width_tiles == 0 {
            return Err(ConfigError::Zero {
                field: "zone_width_tiles",
            });
        }
        require_positive("zone_width", self.zone_width())?;
        if self.step_base_ms == 0 {
            return Err(ConfigError::Zero {
                field: "step_base_ms",
            });
        }
        require_step("player_speed", self.step_base(), self.player_speed)?;
        require_step("enemy_speed", self.step_base(), self.enemy_speed)?;
        if self.attack_window_ms == 0 {
            return Err(ConfigError::Zero {
                field: "attack_window_ms",
            });
        }
        require_health("player_max_health", self.player_max_health)?;
        require_health("enemy_max_health", self.enemy_max_health)?;
        require_damage("player_damage", self.player_damage)?;
        require_damage("enemy_damage", self.enemy_damage)?;
        Ok(())
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// `step_base / speed`, or `None` when it is not representable or shorter than 1 ms.
fn scaled_step(step_base: Duration, speed: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(step_base.as_secs_f64() / speed)
        .ok()
        .filter(|step| *step >= MIN_STEP_DURATION)
}

fn require_step(field: &'static str, step_base: Duration, speed: f64) -> Result<(), ConfigError> {
    match scaled_step(step_base, speed) {
        Some(_) => Ok(()),
        None => Err(ConfigError::StepOutOfRange { field, speed }),
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn require_health(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveHealth { field, value })
    }
}

fn require_damage(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeDamage { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.zone_width(), 320.0);
        assert_eq!(config.spawn_jitter(), 32.0);
        assert_eq!(config.step_base(), Duration::from_millis(100));
    }

    #[test]
    fn negative_max_health_is_rejected() {
        let config = SimConfig {
            enemy_max_health: -5,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveHealth {
                field: "enemy_max_health",
                value: -5
            })
        );
    }

    #[test]
    fn non_finite_speed_is_rejected() {
        let config = SimConfig {
            player_speed: f64::NAN,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "player_speed",
                ..
            })
        ));
    }

    #[test]
    fn zero_zone_width_is_rejected() {
        let config = SimConfig {
            zone_width_tiles: 0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "zone_width_tiles"
            })
        );
    }

    #[test]
    fn vanishing_speed_is_rejected() {
        let config = SimConfig {
            enemy_speed: 1e-300,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StepOutOfRange {
                field: "enemy_speed",
                speed: 1e-300
            })
        );
    }

    #[test]
    fn speed_too_fast_for_a_millisecond_step_is_rejected() {
        for speed in [1e12, 101.0] {
            let config = SimConfig {
                player_speed: speed,
                ..SimConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::StepOutOfRange {
                    field: "player_speed",
                    speed
                })
            );
        }
        let quick = SimConfig {
            player_speed: 50.0,
            ..SimConfig::default()
        };
        assert!(quick.validate().is_ok());
    }

    #[test]
    fn overflowing_jitter_is_rejected() {
        let config = SimConfig {
            tile_size: 1e300,
            spawn_jitter_tiles: 1e10,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "spawn_jitter",
                ..
            })
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "enemy_damage": 7, "zone_width_tiles": 12 }"#)
                .expect("parse config");
        assert_eq!(config.enemy_damage, 7);
        assert_eq!(config.zone_width_tiles, 12);
        assert_eq!(config.player_damage, 50);
        assert_eq!(config.goal_zone, None);
    }

    #[test]
    fn unknown_json_fields_are_rejected() {
        let result = serde_json::from_str::<SimConfig>(r#"{ "gravity": 9.8 }"#);
        assert!(result.is_err());
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CELL_SIZE, DEFAULT_POWER_UP_KINDS, ENEMY_ANGULAR_SPEED, ENEMY_COUNT, ENEMY_HIT_RATIO,
    ENEMY_PATROL_CELLS_MAX, ENEMY_PATROL_CELLS_MIN, GRID_COLS, GRID_ROWS,
    ILLUMINATION_DURATION_MS, JUMP_CHARGES_PER_PICKUP, MAX_SCORE, MAX_STEP_SLICE_MS,
    NOTICE_DURATION_MS, PLAYER_BASE_SPEED, POWER_UP_PICKUP_RATIO, REGEN_INTERVAL_MS,
    SCORE_DECREMENT, SCORE_INTERVAL_MS, SPEED_DURATION_MS, SPEED_MULTIPLIER, TORCH_RADIUS,
    TRAP_COUNT,
};
use crate::types::PowerUpKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub cols: i32,
    pub rows: i32,
    pub cell_size: f32,
    pub torch_radius: f32,
    pub player_speed: f32,
    pub enemy_count: usize,
    pub enemy_patrol_cells_min: i32,
    pub enemy_patrol_cells_max: i32,
    pub enemy_angular_speed: f32,
    pub enemy_hit_ratio: f32,
    pub trap_count: usize,
    pub power_up_kinds: Vec<PowerUpKind>,
    pub power_up_pickup_ratio: f32,
    pub speed_multiplier: f32,
    pub speed_duration_ms: u64,
    pub illumination_duration_ms: u64,
    pub jump_charges_per_pickup: u32,
    pub regen_interval_ms: u64,
    pub notice_duration_ms: u64,
    pub max_score: i64,
    pub score_decrement: i64,
    pub score_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            cell_size: CELL_SIZE,
            torch_radius: TORCH_RADIUS,
            player_speed: PLAYER_BASE_SPEED,
            enemy_count: ENEMY_COUNT,
            enemy_patrol_cells_min: ENEMY_PATROL_CELLS_MIN,
            enemy_patrol_cells_max: ENEMY_PATROL_CELLS_MAX,
            enemy_angular_speed: ENEMY_ANGULAR_SPEED,
            enemy_hit_ratio: ENEMY_HIT_RATIO,
            trap_count: TRAP_COUNT,
            power_up_kinds: DEFAULT_POWER_UP_KINDS.to_vec(),
            power_up_pickup_ratio: POWER_UP_PICKUP_RATIO,
            speed_multiplier: SPEED_MULTIPLIER,
            speed_duration_ms: SPEED_DURATION_MS,
            illumination_duration_ms: ILLUMINATION_DURATION_MS,
            jump_charges_per_pickup: JUMP_CHARGES_PER_PICKUP,
            regen_interval_ms: REGEN_INTERVAL_MS,
            notice_duration_ms: NOTICE_DURATION_MS,
            max_score: MAX_SCORE,
            score_decrement: SCORE_DECREMENT,
            score_interval_ms: SCORE_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    EmptyGrid { cols: i32, rows: i32 },
    NonPositive { field: &'static str },
    PatrolRange { min: i32, max: i32 },
    StepTooLarge { per_slice: f32, cell_size: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid { cols, rows } => {
                write!(f, "grid must have at least one cell, got {cols}x{rows}")
            }
            ConfigError::NonPositive { field } => write!(f, "{field} must be positive"),
            ConfigError::PatrolRange { min, max } => {
                write!(f, "enemy patrol range {min}..={max} is empty or negative")
            }
            ConfigError::StepTooLarge {
                per_slice,
                cell_size,
            } => write!(
                f,
                "boosted player moves {per_slice:.1}px per step slice, must stay below cell size {cell_size:.1}px"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols <= 0 || self.rows <= 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        let positive = [
            ("cellSize", self.cell_size),
            ("playerSpeed", self.player_speed),
            ("speedMultiplier", self.speed_multiplier),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.score_interval_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "scoreIntervalMs",
            });
        }
        if self.enemy_patrol_cells_min < 0 || self.enemy_patrol_cells_max < self.enemy_patrol_cells_min
        {
            return Err(ConfigError::PatrolRange {
                min: self.enemy_patrol_cells_min,
                max: self.enemy_patrol_cells_max,
            });
        }
        let per_slice = self.max_step_distance();
        if per_slice >= self.cell_size {
            return Err(ConfigError::StepTooLarge {
                per_slice,
                cell_size: self.cell_size,
            });
        }
        Ok(())
    }

    pub fn max_step_distance(&self) -> f32 {
        self.player_speed * self.speed_multiplier.max(1.0) * MAX_STEP_SLICE_MS as f32 / 1000.0
    }

    pub fn exit_cell(&self) -> (i32, i32) {
        (self.cols - 1, self.rows - 1)
    }

    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|error| format!("invalid session config: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let config = SessionConfig {
            cols: 0,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid { cols: 0, rows: 20 })
        );
    }

    #[test]
    fn step_larger_than_cell_is_rejected() {
        let config = SessionConfig {
            player_speed: 400.0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StepTooLarge { .. })
        ));
    }

    #[test]
    fn inverted_patrol_range_is_rejected() {
        let config = SessionConfig {
            enemy_patrol_cells_min: 3,
            enemy_patrol_cells_max: 1,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PatrolRange { min: 3, max: 1 })
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            SessionConfig::from_json(r#"{"cols":8,"powerUpKinds":["speed","illum","jump"]}"#)
                .expect("config should parse");
        assert_eq!(config.cols, 8);
        assert_eq!(config.rows, GRID_ROWS);
        assert_eq!(
            config.power_up_kinds,
            vec![
                PowerUpKind::Speed,
                PowerUpKind::Illumination,
                PowerUpKind::Jump
            ]
        );
    }

    #[test]
    fn malformed_json_reports_error() {
        let error = SessionConfig::from_json("{cols:").expect_err("should fail");
        assert!(error.starts_with("invalid session config"));
    }
}

use crate::types::PowerUpKind;

pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;
pub const MAX_STEP_SLICE_MS: u64 = 50;

pub const GRID_COLS: i32 = 20;
pub const GRID_ROWS: i32 = 20;
pub const CELL_SIZE: f32 = 30.0;
pub const TORCH_RADIUS: f32 = 75.0;

pub const REGEN_INTERVAL_MS: u64 = 90_000;
pub const NOTICE_DURATION_MS: u64 = 2_000;

pub const MAX_SCORE: i64 = 100_000;
pub const SCORE_DECREMENT: i64 = 1_000;
pub const SCORE_INTERVAL_MS: u64 = 2_000;

pub const PLAYER_BASE_SPEED: f32 = 120.0;

pub const ENEMY_COUNT: usize = 4;
pub const ENEMY_PATROL_CELLS_MIN: i32 = 1;
pub const ENEMY_PATROL_CELLS_MAX: i32 = 3;
pub const ENEMY_ANGULAR_SPEED: f32 = 1.2;
pub const ENEMY_HIT_RATIO: f32 = 0.6;

pub const TRAP_COUNT: usize = 5;

pub const POWER_UP_PICKUP_RATIO: f32 = 0.3;
pub const SPEED_MULTIPLIER: f32 = 2.0;
pub const SPEED_DURATION_MS: u64 = 5_000;
pub const ILLUMINATION_DURATION_MS: u64 = 10_000;
pub const JUMP_CHARGES_PER_PICKUP: u32 = 1;

pub const DEFAULT_POWER_UP_KINDS: [PowerUpKind; 2] =
    [PowerUpKind::Speed, PowerUpKind::Illumination];

pub const CAUGHT_MESSAGE: &str = "Caught by Enemy!";
pub const ESCAPED_MESSAGE: &str = "You Escaped!";

/// Score after `elapsed_ms` of play: one decrement per full interval, floored at zero.
pub fn score_at(elapsed_ms: u64, max_score: i64, decrement: i64, interval_ms: u64) -> i64 {
    if interval_ms == 0 {
        return max_score.max(0);
    }
    let steps = (elapsed_ms / interval_ms) as i64;
    max_score
        .saturating_sub(steps.saturating_mul(decrement))
        .max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_starts_at_max_and_floors_at_zero() {
        assert_eq!(score_at(0, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS), MAX_SCORE);
        assert_eq!(score_at(1_999, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS), MAX_SCORE);
        assert_eq!(score_at(2_000, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS), 99_000);
        assert_eq!(score_at(200_000, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS), 0);
        assert_eq!(score_at(u64::MAX, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS), 0);
    }

    #[test]
    fn score_never_increases() {
        let mut last = score_at(0, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS);
        for elapsed in (0..260_000u64).step_by(250) {
            let score = score_at(elapsed, MAX_SCORE, SCORE_DECREMENT, SCORE_INTERVAL_MS);
            assert!(score <= last);
            assert!(score >= 0);
            last = score;
        }
    }
}

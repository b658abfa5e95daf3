//! Scoring module - line-clear points, levels and the life-loss timer
//!
//! - Points: `lines * blocks * 10 * multiplier`, where `lines` counts full rows
//!   and full columns separately and `blocks` is the number of distinct cells
//!   removed.
//! - Level: one level per 1000 points.
//! - Timer: 12s at level 0, 500ms faster per level, never below 2.5s.

use std::time::Duration;

use crate::types::{BASE_DELAY_MS, DELAY_STEP_MS, MIN_DELAY_MS, POINTS_PER_BLOCK, POINTS_PER_LEVEL};

/// Points awarded for one line-clear pass
pub fn line_clear_points(lines: u32, blocks: u32, multiplier: u32) -> u32 {
    lines
        .saturating_mul(blocks)
        .saturating_mul(POINTS_PER_BLOCK)
        .saturating_mul(multiplier)
}

/// Level reached at `score`
pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL
}

/// Life-loss timer delay in milliseconds for `level`
pub fn timer_delay_ms(level: u32) -> u64 {
    BASE_DELAY_MS
        .saturating_sub(DELAY_STEP_MS.saturating_mul(level as u64))
        .max(MIN_DELAY_MS)
}

/// Life-loss timer delay for `level`
pub fn timer_delay(level: u32) -> Duration {
    Duration::from_millis(timer_delay_ms(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_points() {
        assert_eq!(line_clear_points(1, 5, 1), 50);
        assert_eq!(line_clear_points(1, 5, 2), 100);
        // Row and column crossing on a 5x5 grid: 2 lines, 9 blocks.
        assert_eq!(line_clear_points(2, 9, 1), 180);
        assert_eq!(line_clear_points(0, 0, 4), 0);
    }

    #[test]
    fn test_line_clear_points_saturates() {
        assert_eq!(line_clear_points(u32::MAX, 2, 2), u32::MAX);
    }

    #[test]
    fn test_level_for_score() {
        assert_eq!(level_for_score(0), 0);
        assert_eq!(level_for_score(999), 0);
        assert_eq!(level_for_score(1000), 1);
        assert_eq!(level_for_score(1050), 1);
        assert_eq!(level_for_score(12_345), 12);
    }

    #[test]
    fn test_timer_delay_by_level() {
        assert_eq!(timer_delay_ms(0), 12_000);
        assert_eq!(timer_delay_ms(1), 11_500);
        assert_eq!(timer_delay_ms(10), 7_000);
        assert_eq!(timer_delay_ms(19), 2_500);
        assert_eq!(timer_delay_ms(20), 2_500);
        assert_eq!(timer_delay_ms(u32::MAX), 2_500);
        assert_eq!(timer_delay(2), Duration::from_millis(11_000));
    }
}

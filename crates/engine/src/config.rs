//! Engine configuration

use std::time::Duration;

use gridlock_types::{GRID_COLS, GRID_ROWS, PREFETCH_INTERVAL_MS};

/// Settings for one engine task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub cols: usize,
    pub rows: usize,
    pub seed: u32,
    /// Spacing between the start-up piece requests of networked games
    pub prefetch_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            seed: 1,
            prefetch_interval: Duration::from_millis(PREFETCH_INTERVAL_MS),
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let cols = env::var("GRIDLOCK_COLS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.cols);
        let rows = env::var("GRIDLOCK_ROWS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.rows);

        let seed = env::var("GRIDLOCK_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_else(seed_from_clock);

        let prefetch_interval = env::var("GRIDLOCK_PREFETCH_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.prefetch_interval);

        Self {
            cols,
            rows,
            seed,
            prefetch_interval,
        }
    }
}

fn seed_from_clock() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

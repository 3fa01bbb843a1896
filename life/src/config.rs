use std::time::Duration;

use crate::error::{LifeError, Result};

pub const DEFAULT_WIDTH: usize = 40;
pub const DEFAULT_HEIGHT: usize = 40;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 30;

/// Everything needed to build a [`GridSimulation`](crate::GridSimulation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// Timer period; must be non-zero.
    pub tick_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LifeError::InvalidDimensions {
                width: self.width,
                height: self.height,
                reason: "width and height must be positive".into(),
            });
        }
        tick_interval(self.tick_interval_ms)?;
        Ok(())
    }
}

pub(crate) fn tick_interval(ms: u64) -> Result<Duration> {
    if ms == 0 {
        return Err(LifeError::InvalidInterval(ms));
    }
    Ok(Duration::from_millis(ms))
}

use std::time::Duration;

use thiserror::Error;

use crate::piece::BOX;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const DEFAULT_GRAVITY_MS: u64 = 500;

/// Settings fixed for the lifetime of one game.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub gravity_interval: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board width {0} is narrower than the 4-cell piece box")]
    BoardTooNarrow(usize),
    #[error("board height {0} is shorter than the 4-cell piece box")]
    BoardTooShort(usize),
    #[error("gravity interval must be greater than zero")]
    ZeroGravityInterval,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            gravity_interval: Duration::from_millis(DEFAULT_GRAVITY_MS),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < BOX {
            return Err(ConfigError::BoardTooNarrow(self.width));
        }
        if self.height < BOX {
            return Err(ConfigError::BoardTooShort(self.height));
        }
        if self.gravity_interval.is_zero() {
            return Err(ConfigError::ZeroGravityInterval);
        }
        Ok(())
    }
}

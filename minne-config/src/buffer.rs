//! Growable byte buffer configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Growth policy for a contiguous byte buffer.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Capacity of the backing block at construction (bytes).
    #[serde(default = "default_initial_capacity")]
    #[validate(range(min = 1))]
    pub initial_capacity: usize,

    /// Multiplier applied to the capacity when an append does not fit.
    #[serde(default = "default_growth_factor")]
    #[validate(range(min = 2, max = 64))]
    pub growth_factor: usize,
}

fn default_initial_capacity() -> usize {
    8
}

fn default_growth_factor() -> usize {
    2
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            growth_factor: default_growth_factor(),
        }
    }
}

impl BufferConfig {
    /// Range-check every field, consuming and returning the config.
    pub fn validated(self) -> Result<Self, crate::ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

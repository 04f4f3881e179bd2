//! Arena allocator configuration.
//!
//! Growth policy for a region chain: how small a region may be, and how
//! aggressively a new region is sized relative to the request that forced it.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Region-chain growth policy.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Smallest region the chain will ever create (bytes). Requests below
    /// this are rounded up so the chain is not littered with tiny regions.
    #[serde(default = "default_min_region_size")]
    #[validate(range(min = 1))]
    pub min_region_size: usize,

    /// Multiplier applied to a request's size when a new region must be
    /// appended. At least 2, so later requests amortize into the new region.
    #[serde(default = "default_growth_factor")]
    #[validate(range(min = 2, max = 64))]
    pub growth_factor: usize,
}

fn default_min_region_size() -> usize {
    512
}

fn default_growth_factor() -> usize {
    2
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            min_region_size: default_min_region_size(),
            growth_factor: default_growth_factor(),
        }
    }
}

impl ArenaConfig {
    /// Range-check every field, consuming and returning the config.
    pub fn validated(self) -> Result<Self, crate::ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

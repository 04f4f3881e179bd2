//! # Minne Configuration System
//!
//! Construction-time configuration for the minne memory toolkit.
//!
//! ## Features
//! - **Explicit policy**: growth constants are values handed to a component
//!   at construction, never compile-time globals
//! - **Validation**: range checks on every knob before a component is built
//! - **Serde-ready**: sections embed into a host application's own
//!   configuration tree

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

mod arena;
mod buffer;
mod error;

pub use arena::ArenaConfig;
pub use buffer::BufferConfig;
pub use error::ConfigError;

/// Top-level configuration container for every minne component.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct MinneConfig {
    /// Region-chain growth policy for arenas.
    #[validate(nested)]
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Growth policy for growable byte buffers.
    #[validate(nested)]
    #[serde(default)]
    pub buffer: BufferConfig,
}

impl MinneConfig {
    /// Validate every nested section, consuming and returning the config.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

use minne_config::ConfigError;
use thiserror::Error;

/// Failures surfaced by arena operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// The memory provider refused to back a new region. Not retried.
    #[error("out of memory: could not reserve {requested} bytes for a region")]
    OutOfMemory { requested: usize },

    /// The handle does not describe a live allocation of this arena: it was
    /// issued by another arena, or outlived a reset or clear.
    #[error("foreign handle: region {region}, offset {offset}, len {len} is not a live allocation here")]
    ForeignHandle {
        region: usize,
        offset: usize,
        len: usize,
    },

    /// Construction-time configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

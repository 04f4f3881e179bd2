use minne_config::ConfigError;
use thiserror::Error;

/// Failures surfaced by buffer operations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The memory provider refused to back the block. Not retried.
    #[error("out of memory: could not reserve {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A write addressed bytes outside the buffer's content.
    #[error("write of {len} bytes at offset {offset} exceeds content length {content}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        content: usize,
    },

    /// Construction-time configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

//! minne-buffer
//!
//! A growable contiguous byte buffer with amortized-doubling capacity.
//! The opposite trade to an arena's chain of immovable regions: one
//! relocatable block, O(1) indexing and compactness, at the price that
//! borrowed slices do not survive growth.

pub mod buffer;
pub mod error;

pub use buffer::ByteBuffer;
pub use error::BufferError;

//! Contiguous byte buffer with amortized-doubling growth.
//!
//! Growth relocates the whole backing block and copies the content forward,
//! so appends are amortized O(1) and the content is always directly
//! indexable. A borrowed slice cannot be held across a growing call; the
//! borrow checker enforces that bound rather than documentation.

use minne_config::BufferConfig;
use tracing::debug;

use crate::error::BufferError;

/// Growable contiguous byte sequence.
///
/// Bytes `[0, len)` are content; `[len, capacity)` are free. The backing
/// block is replaced wholesale when an append does not fit.
pub struct ByteBuffer {
    bytes: Box<[u8]>,
    len: usize,
    growth_factor: usize,
}

impl ByteBuffer {
    /// Buffer with the default initial capacity and growth factor.
    pub fn new() -> Result<Self, BufferError> {
        Self::with_config(BufferConfig::default())
    }

    /// Buffer with an explicit initial capacity and the default growth
    /// factor.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        Self::with_config(BufferConfig {
            initial_capacity: capacity,
            ..BufferConfig::default()
        })
    }

    /// Buffer with an explicit growth policy, validated up front.
    pub fn with_config(config: BufferConfig) -> Result<Self, BufferError> {
        let config = config.validated()?;
        Ok(Self {
            bytes: alloc_block(config.initial_capacity)?,
            len: 0,
            growth_factor: config.growth_factor,
        })
    }

    /// Bytes of content currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no content has been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes the backing block can hold before the next relocation.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The content.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The content, writable.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }

    /// Guarantee room for `additional` more bytes, relocating if needed.
    ///
    /// The new capacity is the larger of `capacity * growth_factor` and
    /// `len + additional`; the content is copied forward bit-for-bit.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(BufferError::OutOfMemory {
                requested: additional,
            })?;
        if required <= self.capacity() {
            return Ok(());
        }
        let target = self
            .capacity()
            .saturating_mul(self.growth_factor)
            .max(required);
        let mut block = alloc_block(target)?;
        block[..self.len].copy_from_slice(&self.bytes[..self.len]);
        debug!(from = self.capacity(), to = target, "buffer relocated");
        self.bytes = block;
        Ok(())
    }

    /// Append a single byte.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        self.reserve(1)?;
        self.bytes[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Append `data`, growing as needed. Zero-length appends are no-ops.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), BufferError> {
        self.reserve(data.len())?;
        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }

    /// Overwrite bytes inside the existing content.
    ///
    /// The whole write must land inside `[0, len)`; nothing is written on a
    /// bound violation.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<(), BufferError> {
        match offset.checked_add(data.len()) {
            Some(end) if end <= self.len => {
                self.bytes[offset..end].copy_from_slice(data);
                Ok(())
            }
            _ => Err(BufferError::OutOfBounds {
                offset,
                len: data.len(),
                content: self.len,
            }),
        }
    }

    /// Shrink the backing block so `capacity == len`.
    ///
    /// Useful before handing the content to something that will hold it for
    /// a long time.
    pub fn compact(&mut self) -> Result<(), BufferError> {
        if self.capacity() == self.len {
            return Ok(());
        }
        let mut block = alloc_block(self.len)?;
        block.copy_from_slice(&self.bytes[..self.len]);
        self.bytes = block;
        Ok(())
    }

    /// Independent copy of the content with `capacity == len`.
    pub fn try_clone(&self) -> Result<Self, BufferError> {
        let mut block = alloc_block(self.len)?;
        block.copy_from_slice(&self.bytes[..self.len]);
        Ok(Self {
            bytes: block,
            len: self.len,
            growth_factor: self.growth_factor,
        })
    }

    /// Drop the content, keeping the capacity.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

fn alloc_block(capacity: usize) -> Result<Box<[u8]>, BufferError> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(capacity)
        .map_err(|_| BufferError::OutOfMemory {
            requested: capacity,
        })?;
    block.resize(capacity, 0);
    Ok(block.into_boxed_slice())
}


#[cfg(test)]
mod buffer_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn appends_match_a_reference_vec(
            chunks in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..32),
                0..16,
            ),
        ) {
            let mut buffer = ByteBuffer::with_capacity(4).unwrap();
            let mut mirror = Vec::new();
            for chunk in &chunks {
                buffer.extend_from_slice(chunk).unwrap();
                mirror.extend_from_slice(chunk);
                prop_assert_eq!(buffer.as_slice(), mirror.as_slice());
            }
        }
    }
}

//! Fixed-capacity bump regions and the append-only region chain.
//!
//! A region is a zeroed slab with a cursor; the chain is an ordered sequence
//! of regions that satisfies a request from the first region with room, or
//! appends a larger one. Regions never move or shrink once created, so a
//! `(region, offset)` pair stays meaningful until the chain is reset or
//! cleared.

use tracing::{debug, trace};

use crate::error::ArenaError;

/// A single slab of zeroed bytes with a bump cursor.
///
/// Bytes `[0, used)` are live; `[used, capacity)` are free and zeroed.
pub(crate) struct Region {
    bytes: Box<[u8]>,
    used: usize,
}

impl Region {
    /// Allocate a zeroed slab of `capacity` bytes, rounded up to `min_size`.
    ///
    /// The backing allocation is fallible: exhaustion surfaces as
    /// [`ArenaError::OutOfMemory`] instead of aborting the process.
    pub(crate) fn new(capacity: usize, min_size: usize) -> Result<Self, ArenaError> {
        let capacity = capacity.max(min_size);
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: capacity,
            })?;
        bytes.resize(capacity, 0);
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
            used: 0,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.used
    }

    /// Claim `size` bytes at the cursor, or `None` if the region lacks room.
    pub(crate) fn bump(&mut self, size: usize) -> Option<usize> {
        if self.remaining() < size {
            return None;
        }
        let offset = self.used;
        self.used += size;
        Some(offset)
    }

    /// Move the cursor directly. Callers must have validated that `used`
    /// lands on a byte they own.
    pub(crate) fn set_used(&mut self, used: usize) {
        debug_assert!(used <= self.bytes.len());
        self.used = used;
    }

    /// Zero the slab and rewind the cursor, keeping the capacity.
    pub(crate) fn reset(&mut self) {
        self.used = 0;
        self.bytes.fill(0);
    }

    pub(crate) fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    pub(crate) fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.bytes[offset..offset + len]
    }

    pub(crate) fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        self.bytes.copy_within(src..src + len, dst);
    }
}

/// Ordered, append-only sequence of regions.
///
/// The tail is structurally the last element, so "nothing follows the end"
/// needs no bookkeeping.
pub(crate) struct RegionChain {
    regions: Vec<Region>,
    min_region_size: usize,
    growth_factor: usize,
}

impl RegionChain {
    pub(crate) fn new(min_region_size: usize, growth_factor: usize) -> Self {
        Self {
            regions: Vec::new(),
            min_region_size,
            growth_factor,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.regions.len()
    }

    pub(crate) fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub(crate) fn region_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    /// Append a region able to hold at least `capacity` bytes, returning its
    /// index.
    pub(crate) fn append(&mut self, capacity: usize) -> Result<usize, ArenaError> {
        let region = Region::new(capacity, self.min_region_size)?;
        debug!(
            capacity = region.capacity(),
            regions = self.regions.len() + 1,
            "appended region"
        );
        self.regions.push(region);
        Ok(self.regions.len() - 1)
    }

    /// First-fit bump allocation over the chain.
    ///
    /// When nothing has room, a region of `size * growth_factor` bytes is
    /// appended and the request lands there.
    pub(crate) fn allocate(&mut self, size: usize) -> Result<(usize, usize), ArenaError> {
        for (index, region) in self.regions.iter_mut().enumerate() {
            if let Some(offset) = region.bump(size) {
                trace!(region = index, offset, size, "bump");
                return Ok((index, offset));
            }
        }
        let index = self.append(size.saturating_mul(self.growth_factor))?;
        let offset = self.regions[index]
            .bump(size)
            .expect("a fresh region is sized to fit the request that created it");
        trace!(region = index, offset, size, "bump into fresh region");
        Ok((index, offset))
    }

    /// Copy `len` bytes between already-validated ranges, which may share a
    /// region.
    pub(crate) fn copy_bytes(
        &mut self,
        (src_region, src_offset): (usize, usize),
        (dst_region, dst_offset): (usize, usize),
        len: usize,
    ) {
        if len == 0 {
            return;
        }
        if src_region == dst_region {
            self.regions[src_region].copy_within(src_offset, dst_offset, len);
            return;
        }
        let (head, tail) = self.regions.split_at_mut(src_region.max(dst_region));
        let (from, to) = if src_region < dst_region {
            (&head[src_region], &mut tail[0])
        } else {
            (&tail[0], &mut head[dst_region])
        };
        to.slice_mut(dst_offset, len)
            .copy_from_slice(from.slice(src_offset, len));
    }

    /// Zero every region and rewind every cursor; capacities are retained.
    pub(crate) fn reset(&mut self) {
        for region in &mut self.regions {
            region.reset();
        }
    }

    /// Drop every region.
    pub(crate) fn clear(&mut self) {
        self.regions.clear();
    }

    /// Bytes currently bump-allocated and total capacity across the chain.
    pub(crate) fn usage(&self) -> (usize, usize) {
        self.regions.iter().fold((0, 0), |(used, capacity), region| {
            (used + region.used(), capacity + region.capacity())
        })
    }
}

//! Arena allocation over an append-only region chain.
//!
//! ## Key Design Features
//! 1. **Handle-based provenance** - an allocation is described by an opaque
//!    `(region, offset, length)` handle, so "does this belong to the arena"
//!    and "is this the newest allocation in its region" are O(1) structural
//!    checks instead of scans over raw addresses
//! 2. **Stable storage** - regions never move or shrink, so a handle's bytes
//!    stay put until the arena is reset or cleared
//! 3. **In-place extension** - growing the newest allocation of a region
//!    within the region's slack just advances the cursor; nothing is copied
//! 4. **Whole-arena reclamation** - there is no per-allocation free; reset
//!    or clear reclaims everything at once

use minne_config::ArenaConfig;
use tracing::{debug, trace};

use crate::error::ArenaError;
use crate::region::{Region, RegionChain};
use crate::stats::ArenaStats;

/// Opaque description of one allocation: which region it lives in, where it
/// starts, and how many bytes it spans.
///
/// A handle is only meaningful to the arena that issued it, and only until
/// that arena is reset or cleared. Every use is validated against the live
/// chain; anything else is rejected as [`ArenaError::ForeignHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocHandle {
    pub(crate) region: usize,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl AllocHandle {
    /// Number of bytes this handle grants access to.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for zero-sized allocations.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator over a chain of fixed regions.
///
/// Created empty; the first allocation materializes the first region. Growth
/// appends regions sized by the configured multiplier, and every byte handed
/// out is zeroed.
pub struct Arena {
    chain: RegionChain,
    stats: ArenaStats,
}

impl Arena {
    /// Empty arena with the default growth policy.
    pub fn new() -> Self {
        let config = ArenaConfig::default();
        Self {
            chain: RegionChain::new(config.min_region_size, config.growth_factor),
            stats: ArenaStats::default(),
        }
    }

    /// Empty arena with an explicit growth policy, validated up front.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        let config = config.validated()?;
        Ok(Self {
            chain: RegionChain::new(config.min_region_size, config.growth_factor),
            stats: ArenaStats::default(),
        })
    }

    /// Claim `size` zeroed bytes from the chain.
    ///
    /// The returned handle stays valid until the next [`reset`](Self::reset)
    /// or [`clear`](Self::clear). Fails only when the memory provider cannot
    /// back a new region.
    pub fn alloc(&mut self, size: usize) -> Result<AllocHandle, ArenaError> {
        let regions_before = self.chain.len();
        if self.chain.is_empty() {
            // The first region is sized to the request itself; multiplied
            // growth sizing only applies once a chain exists.
            self.chain.append(size)?;
        }
        let (region, offset) = self.chain.allocate(size)?;
        self.stats.record_alloc(self.chain.len() - regions_before);
        Ok(AllocHandle {
            region,
            offset,
            len: size,
        })
    }

    /// Resize an allocation, extending in place when provenance allows it.
    ///
    /// `None` behaves exactly like [`alloc`](Self::alloc). Growing the newest
    /// allocation of its region within the region's slack adjusts the cursor
    /// and keeps the bytes where they are. Every other case, shrinking
    /// included, relocates: a fresh block is allocated and the first
    /// `min(old, new)` bytes are copied forward. The abandoned bytes stay in
    /// their region until the next reset or clear.
    pub fn realloc(
        &mut self,
        handle: Option<AllocHandle>,
        new_size: usize,
    ) -> Result<AllocHandle, ArenaError> {
        let Some(handle) = handle else {
            return self.alloc(new_size);
        };

        let region = self
            .chain
            .region_mut(handle.region)
            .ok_or_else(|| foreign(handle))?;
        if !is_live(region, handle) {
            return Err(foreign(handle));
        }

        // Bump allocation guarantees nothing lives between the newest
        // allocation's end and the cursor, so the cursor can absorb the
        // extension directly.
        let newest = handle.offset + handle.len == region.used();
        if newest && new_size >= handle.len && region.remaining() >= new_size - handle.len {
            region.set_used(handle.offset + new_size);
            self.stats.record_realloc_in_place();
            trace!(
                region = handle.region,
                offset = handle.offset,
                old = handle.len,
                new = new_size,
                "extended in place"
            );
            return Ok(AllocHandle {
                len: new_size,
                ..handle
            });
        }

        let surviving = handle.len.min(new_size);
        let dest = self.alloc(new_size)?;
        self.chain.copy_bytes(
            (handle.region, handle.offset),
            (dest.region, dest.offset),
            surviving,
        );
        self.stats.record_realloc_moved();
        trace!(
            from_region = handle.region,
            to_region = dest.region,
            copied = surviving,
            "relocated"
        );
        Ok(dest)
    }

    /// Read access to a live allocation.
    pub fn bytes(&self, handle: AllocHandle) -> Result<&[u8], ArenaError> {
        match self.chain.region(handle.region) {
            Some(region) if is_live(region, handle) => {
                Ok(region.slice(handle.offset, handle.len))
            }
            _ => Err(foreign(handle)),
        }
    }

    /// Write access to a live allocation.
    pub fn bytes_mut(&mut self, handle: AllocHandle) -> Result<&mut [u8], ArenaError> {
        match self.chain.region_mut(handle.region) {
            Some(region) if is_live(region, handle) => {
                Ok(region.slice_mut(handle.offset, handle.len))
            }
            _ => Err(foreign(handle)),
        }
    }

    /// Forget every allocation but keep the regions for reuse.
    ///
    /// Region bytes are zeroed so later allocations never observe stale
    /// content. Outstanding handles are invalidated and rejected on use.
    pub fn reset(&mut self) {
        self.chain.reset();
        self.stats.record_reset();
        debug!(regions = self.chain.len(), "arena reset");
    }

    /// Drop every region, returning the arena to its freshly created state.
    pub fn clear(&mut self) {
        debug!(regions = self.chain.len(), "arena cleared");
        self.chain.clear();
    }

    /// Bytes currently bump-allocated and total capacity across the chain.
    pub fn usage(&self) -> (usize, usize) {
        self.chain.usage()
    }

    /// Number of regions currently in the chain.
    pub fn regions(&self) -> usize {
        self.chain.len()
    }

    /// Counters for the operations this arena has performed.
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

fn is_live(region: &Region, handle: AllocHandle) -> bool {
    handle
        .offset
        .checked_add(handle.len)
        .is_some_and(|end| end <= region.used())
}

fn foreign(handle: AllocHandle) -> ArenaError {
    ArenaError::ForeignHandle {
        region: handle.region,
        offset: handle.offset,
        len: handle.len,
    }
}

#[cfg(test)]
mod arena_tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn first_allocation_creates_a_minimum_sized_region() {
        let mut arena = Arena::new();
        arena.alloc(100).unwrap();
        assert_eq!(arena.regions(), 1);
        assert_eq!(arena.usage(), (100, 512));
    }

    #[test]
    fn overflow_allocates_a_doubled_region() {
        let mut arena = Arena::new();
        arena.alloc(100).unwrap();
        // 512 - 100 = 412 bytes of slack cannot hold 600 more.
        let second = arena.alloc(600).unwrap();
        assert_eq!(arena.regions(), 2);
        assert_eq!(arena.usage(), (700, 512 + 1200));
        assert_eq!(arena.bytes(second).unwrap().len(), 600);
    }

    #[test]
    fn allocation_ranges_are_disjoint() {
        let mut arena = Arena::new();
        let handles: Vec<AllocHandle> = (0u8..12)
            .map(|tag| {
                let handle = arena.alloc(100).unwrap();
                arena.bytes_mut(handle).unwrap().fill(tag + 1);
                handle
            })
            .collect();
        for (tag, handle) in handles.iter().enumerate() {
            let expected = tag as u8 + 1;
            assert!(arena
                .bytes(*handle)
                .unwrap()
                .iter()
                .all(|&byte| byte == expected));
        }
    }

    #[test]
    fn newest_allocation_in_a_region_extends_in_place() {
        let mut arena = Arena::new();
        let first = arena.alloc(100).unwrap();
        arena.bytes_mut(first).unwrap().fill(0xAB);
        // The 600-byte allocation lands in its own region, so `first` is
        // still the newest allocation of region 0.
        arena.alloc(600).unwrap();
        let location = arena.bytes(first).unwrap().as_ptr();

        let grown = arena.realloc(Some(first), 200).unwrap();
        assert_eq!(grown.len(), 200);
        assert_eq!(arena.bytes(grown).unwrap().as_ptr(), location);
        let bytes = arena.bytes(grown).unwrap();
        assert!(bytes[..100].iter().all(|&byte| byte == 0xAB));
        assert!(bytes[100..].iter().all(|&byte| byte == 0));
        assert_eq!(arena.regions(), 2);
        assert_eq!(arena.stats().reallocations_in_place(), 1);
    }

    #[test]
    fn older_allocation_relocates_and_copies_its_prefix() {
        let mut arena = Arena::new();
        let first = arena.alloc(100).unwrap();
        arena.bytes_mut(first).unwrap().fill(0xCD);
        // A second allocation in the same region makes `first` non-newest.
        arena.alloc(50).unwrap();

        let moved = arena.realloc(Some(first), 200).unwrap();
        assert!(moved.region != first.region || moved.offset != first.offset);
        let bytes = arena.bytes(moved).unwrap();
        assert!(bytes[..100].iter().all(|&byte| byte == 0xCD));
        assert!(bytes[100..].iter().all(|&byte| byte == 0));
        assert_eq!(arena.stats().reallocations_moved(), 1);
    }

    #[test]
    fn extension_beyond_region_slack_relocates() {
        let mut arena = Arena::with_config(ArenaConfig {
            min_region_size: 32,
            growth_factor: 2,
        })
        .unwrap();
        let handle = arena.alloc(24).unwrap();
        arena.bytes_mut(handle).unwrap().fill(0x11);

        // 32 - 24 = 8 bytes of slack cannot absorb 40 more.
        let moved = arena.realloc(Some(handle), 64).unwrap();
        assert_eq!(moved.region, 1);
        assert_eq!(moved.offset, 0);
        let bytes = arena.bytes(moved).unwrap();
        assert!(bytes[..24].iter().all(|&byte| byte == 0x11));
        assert!(bytes[24..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn truncating_realloc_copies_only_the_new_size() {
        let mut arena = Arena::new();
        let handle = arena.alloc(100).unwrap();
        for (i, byte) in arena.bytes_mut(handle).unwrap().iter_mut().enumerate() {
            *byte = i as u8;
        }

        let truncated = arena.realloc(Some(handle), 40).unwrap();
        assert_eq!(truncated.len(), 40);
        let bytes = arena.bytes(truncated).unwrap();
        for (i, byte) in bytes.iter().enumerate() {
            assert_eq!(*byte, i as u8);
        }
        // Shrinking always takes the relocation path.
        assert_eq!(arena.stats().reallocations_moved(), 1);
    }

    #[test]
    fn realloc_without_a_handle_allocates() {
        let mut arena = Arena::new();
        let handle = arena.realloc(None, 64).unwrap();
        assert_eq!(handle.len(), 64);
        assert_eq!(arena.usage(), (64, 512));
    }

    #[test]
    fn handle_from_another_arena_is_foreign() {
        let mut donor = Arena::new();
        let stray = donor.alloc(16).unwrap();

        let mut arena = Arena::new();
        assert!(matches!(
            arena.bytes(stray),
            Err(ArenaError::ForeignHandle { .. })
        ));
        assert!(matches!(
            arena.realloc(Some(stray), 64),
            Err(ArenaError::ForeignHandle { .. })
        ));
    }

    #[test]
    fn reset_retains_regions_and_invalidates_handles() {
        let mut arena = Arena::new();
        let first = arena.alloc(400).unwrap();
        arena.bytes_mut(first).unwrap().fill(0x77);
        let second = arena.alloc(600).unwrap();
        arena.bytes_mut(second).unwrap().fill(0x99);
        let (_, capacity) = arena.usage();

        arena.reset();
        assert_eq!(arena.usage(), (0, capacity));
        assert!(matches!(
            arena.bytes(first),
            Err(ArenaError::ForeignHandle { .. })
        ));

        // Anything that fits the retained chain reuses it, and the bytes
        // were zeroed on the way.
        let reused = arena.alloc(1000).unwrap();
        assert_eq!(arena.regions(), 2);
        assert!(arena.bytes(reused).unwrap().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn clear_returns_the_arena_to_empty() {
        let mut arena = Arena::new();
        let handle = arena.alloc(100).unwrap();
        arena.alloc(600).unwrap();

        arena.clear();
        assert_eq!(arena.regions(), 0);
        assert_eq!(arena.usage(), (0, 0));
        assert!(matches!(
            arena.bytes(handle),
            Err(ArenaError::ForeignHandle { .. })
        ));

        // Behaves like a fresh arena afterwards.
        arena.alloc(100).unwrap();
        assert_eq!(arena.usage(), (100, 512));
    }

    #[test]
    fn zero_sized_allocations_are_permitted() {
        let mut arena = Arena::new();
        let empty = arena.alloc(0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(arena.bytes(empty).unwrap(), &[] as &[u8]);
        // Even an empty request materializes the first region.
        assert_eq!(arena.usage(), (0, 512));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ArenaConfig {
            growth_factor: 1,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            Arena::with_config(config),
            Err(ArenaError::Config(_))
        ));
    }

    #[test]
    fn stats_track_operations() {
        let mut arena = Arena::new();
        let first = arena.alloc(8).unwrap();
        let second = arena.alloc(8).unwrap();
        arena.realloc(Some(second), 16).unwrap();
        arena.realloc(Some(first), 16).unwrap();
        arena.reset();

        let stats = arena.stats();
        // Two allocations plus the fresh block behind the moved realloc.
        assert_eq!(stats.allocations(), 3);
        assert_eq!(stats.reallocations_in_place(), 1);
        assert_eq!(stats.reallocations_moved(), 1);
        assert_eq!(stats.regions_created(), 1);
        assert_eq!(stats.resets(), 1);
    }

    #[traced_test]
    #[test]
    fn appending_a_region_emits_a_debug_event() {
        let mut arena = Arena::new();
        arena.alloc(16).unwrap();
        arena.alloc(2048).unwrap();
        assert!(logs_contain("appended region"));
    }
}

#[cfg(test)]
mod arena_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn allocations_never_overlap(
            sizes in proptest::collection::vec(1usize..128, 1..32),
        ) {
            let mut arena = Arena::with_config(ArenaConfig {
                min_region_size: 64,
                growth_factor: 2,
            })
            .unwrap();
            let mut handles = Vec::new();
            for (tag, size) in sizes.iter().enumerate() {
                let handle = arena.alloc(*size).unwrap();
                arena.bytes_mut(handle).unwrap().fill(tag as u8 + 1);
                handles.push(handle);
            }
            for (tag, handle) in handles.iter().enumerate() {
                let expected = tag as u8 + 1;
                prop_assert!(arena.bytes(*handle).unwrap().iter().all(|&byte| byte == expected));
            }
        }

        #[test]
        fn realloc_preserves_the_surviving_prefix(
            old_size in 1usize..200,
            new_size in 1usize..400,
        ) {
            let mut arena = Arena::new();
            let handle = arena.alloc(old_size).unwrap();
            for (i, byte) in arena.bytes_mut(handle).unwrap().iter_mut().enumerate() {
                *byte = (i % 251) as u8;
            }
            let resized = arena.realloc(Some(handle), new_size).unwrap();
            let bytes = arena.bytes(resized).unwrap();
            let surviving = old_size.min(new_size);
            for (i, byte) in bytes[..surviving].iter().enumerate() {
                prop_assert_eq!(*byte, (i % 251) as u8);
            }
        }
    }
}

//! # minne-arena
//!
//! Region-chained arena allocation with handle-based reallocation.
//!
//! An arena hands out byte ranges from an append-only chain of fixed
//! regions. Individual allocations are never freed; the whole arena is
//! reset (regions kept for reuse) or cleared (regions dropped) in one step.
//! The interesting part is reallocation, which distinguishes a cheap
//! in-place extension from a copying relocation by reasoning about where a
//! handle sits inside its region.
//!
//! ### Key Submodules:
//! - `arena`: the caller-facing allocate/reallocate/reset surface
//! - `region`: fixed-capacity bump regions and the append-only chain
//! - `stats`: per-arena operation counters

pub mod arena;
pub mod error;
mod region;
pub mod stats;

pub mod prelude {
    pub use crate::arena::{AllocHandle, Arena};
    pub use crate::error::ArenaError;
    pub use crate::stats::ArenaStats;
}

pub use arena::{AllocHandle, Arena};
pub use error::ArenaError;
pub use stats::ArenaStats;

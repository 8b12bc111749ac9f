//! # Memory Management
//!
//! Recyclable slot storage and the bit masks used to report per-slot results.
//!
//! ## Design Philosophy
//!
//! Storage grows by appending and never shrinks. Freed slots are recycled
//! through an intrusive free list, so in steady state:
//! - No heap allocations on create/remove
//! - Stale handles are detected in O(1)
//! - Per-frame scans are flat loops over contiguous memory

mod arena;
mod bitset;

pub use arena::SlotArena;
pub use bitset::BitSet;

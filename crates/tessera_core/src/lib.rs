//! # TESSERA Core
//!
//! Handle management shared by every stateful subsystem of the toolkit:
//! - Packed `(index, generation)` handles for layers, nodes, animators and layouters
//! - A generational slot arena that recycles storage through an intrusive free list
//! - Word-packed bit sets for per-frame output masks
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  owner (layer / animator / UI)                           │
//! │      │ create / remove / is_valid                        │
//! │      ▼                                                   │
//! │  SlotArena<H, T>                                         │
//! │  ├── slots: [Used{gen, T} | Free{gen, next}]             │
//! │  └── first_free ──► ... ──► last_free  (pop front,       │
//! │                                         push back)       │
//! │      │                                                   │
//! │      ▼                                                   │
//! │  H::pack(index, generation)  ──►  u16 / u32 / u64 handle │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{NodeHandle, SlotArena};
//!
//! let mut nodes: SlotArena<NodeHandle, &str> = SlotArena::new();
//! let a = nodes.create("root").unwrap();
//! assert!(nodes.is_valid(a));
//!
//! nodes.remove(a);
//! let b = nodes.create("other").unwrap();
//! assert_eq!(a.index(), b.index());
//! assert!(!nodes.is_valid(a));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod handle;
pub mod memory;
pub mod time;

pub use config::ArenaConfig;
pub use error::{ArenaError, ArenaResult, ConfigError};
pub use handle::{
    AnimationHandle, AnimatorDataHandle, AnimatorHandle, DataHandle, LayerDataHandle,
    LayerHandle, LayoutHandle, LayouterDataHandle, LayouterHandle, NodeHandle, SlotHandle,
};
pub use memory::{BitSet, SlotArena};
pub use time::Nanoseconds;

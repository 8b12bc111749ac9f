//! # Animations
//!
//! Timestamp-driven animation entries and the storage that batch-advances
//! them.
//!
//! - [`state`]: the lifecycle state function and factor computation
//! - [`storage`]: [`AnimationStorage`], the reusable core of every animator
//! - [`flags`]: per-animation flags and per-animator features and states

pub mod flags;
pub mod state;
pub mod storage;

pub use flags::{AnimationFlags, AnimatorFeatures, AnimatorStates};
pub use state::{factor, state_of, Animation, AnimationState};
pub use storage::{AnimationKey, AnimationStorage};

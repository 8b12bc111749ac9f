//! # TESSERA UI System
//!
//! Stateful subsystems of the toolkit built on generational handles:
//! - Animations whose state is derived purely from timestamps
//! - Animators that batch-advance all their animations once per frame
//! - Layers storing per-data node attachments
//! - A [`UserInterface`] owning layers and animators and driving cleanup
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FRAME PIPELINE                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  advance(now) → active / factor / remove → apply → clean     │
//! │       ↓                   ↓                  ↓        ↓      │
//! │  state_of(before)   per-slot output     callbacks   SlotArena│
//! │  state_of(after)    views                           ::remove │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::Nanoseconds;
//! use tessera_ui::animation::AnimationFlags;
//! use tessera_ui::animator::{Easing, GenericAnimator};
//! use tessera_ui::UserInterface;
//!
//! let mut ui = UserInterface::new();
//! let animator = ui.create_animator(GenericAnimator::new).unwrap();
//!
//! let generic = ui.animator_as_mut::<GenericAnimator>(animator).unwrap();
//! generic
//!     .create(
//!         |factor| println!("progress {factor}"),
//!         Easing::Linear,
//!         Nanoseconds::ZERO,
//!         Nanoseconds::from_secs(1),
//!         1,
//!         AnimationFlags::empty(),
//!     )
//!     .unwrap();
//!
//! ui.advance_animations(Nanoseconds::from_millis(500));
//! assert!(ui.needs_animation_advance());
//! ui.advance_animations(Nanoseconds::from_secs(1));
//! assert!(!ui.needs_animation_advance());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod animator;
pub mod config;
pub mod error;
mod flags;
pub mod interface;
pub mod layer;

pub use animation::{
    Animation, AnimationFlags, AnimationKey, AnimationState, AnimationStorage, AnimatorFeatures,
    AnimatorStates,
};
pub use animator::{AdvanceScratch, Animator, Easing, GenericAnimator, GenericNodeAnimator};
pub use config::UiConfig;
pub use error::{UiError, UiResult};
pub use interface::UserInterface;
pub use layer::{DataKey, Layer, LayerStates};

//! # Animators
//!
//! An animator owns an [`AnimationStorage`] and turns the factors produced
//! by its batch advance into effects. The interface drives every animator
//! through the same provided methods:
//!
//! ```text
//! advance_and_apply(now)
//!   ├─ storage.advance()      compute active bits, factors, remove bits
//!   ├─ apply(active, factors) animator-specific effect
//!   └─ clean(remove)
//!        ├─ on_clean(remove)  animator drops its per-slot payload
//!        └─ storage.clean()   slots go back to the arena
//! ```

mod easing;
mod generic;

use std::any::Any;

use tessera_core::{AnimationHandle, BitSet, Nanoseconds};

use crate::animation::AnimationStorage;

pub use easing::Easing;
pub use generic::{GenericAnimator, GenericNodeAnimator};

/// Reusable output views for [`Animator::advance_and_apply()`].
///
/// Kept by the caller across frames so advancing allocates only when an
/// animator's capacity grows.
#[derive(Clone, Debug, Default)]
pub struct AdvanceScratch {
    active: BitSet,
    factors: Vec<f32>,
    remove: BitSet,
}

impl AdvanceScratch {
    /// Creates empty views.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes all views to `capacity` slots.
    pub fn resize(&mut self, capacity: usize) {
        self.active.resize(capacity);
        self.factors.resize(capacity, 0.0);
        self.remove.resize(capacity);
    }

    /// Active bits of the last advance.
    #[inline]
    #[must_use]
    pub fn active(&self) -> &BitSet {
        &self.active
    }

    /// Factors of the last advance, meaningful only where a bit is active.
    #[inline]
    #[must_use]
    pub fn factors(&self) -> &[f32] {
        &self.factors
    }

    /// Removal bits of the last advance.
    #[inline]
    #[must_use]
    pub fn remove(&self) -> &BitSet {
        &self.remove
    }
}

/// A subsystem that animates something using an [`AnimationStorage`].
pub trait Animator: Any {
    /// The animation storage.
    fn storage(&self) -> &AnimationStorage;

    /// The animation storage, mutably.
    fn storage_mut(&mut self) -> &mut AnimationStorage;

    /// Applies the factors of every animation whose bit is set in `active`.
    ///
    /// Both views have the storage's capacity.
    fn apply(&mut self, active: &BitSet, factors: &[f32]);

    /// Called right before the animations whose bit is set in `remove` are
    /// removed from the storage.
    fn on_clean(&mut self, remove: &BitSet) {
        let _ = remove;
    }

    /// Upcast for downcasting to the concrete animator.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete animator.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Advances to `now`, applies active factors and removes finished
    /// animations. Returns the number of removed animations.
    ///
    /// # Panics
    ///
    /// Panics if `now` is before the storage's current time.
    fn advance_and_apply(&mut self, now: Nanoseconds, scratch: &mut AdvanceScratch) -> usize {
        scratch.resize(self.storage().capacity());
        let (any_active, any_to_remove) = self.storage_mut().advance(
            now,
            &mut scratch.active,
            &mut scratch.factors,
            &mut scratch.remove,
        );
        if any_active {
            self.apply(&scratch.active, &scratch.factors);
        }
        if any_to_remove {
            self.clean(&scratch.remove)
        } else {
            0
        }
    }

    /// Removes the animations whose bit is set in `remove`, calling
    /// [`on_clean()`](Self::on_clean) first. Returns the number removed.
    fn clean(&mut self, remove: &BitSet) -> usize {
        self.on_clean(remove);
        self.storage_mut().clean(remove)
    }

    /// Removes animations attached to nodes that no longer exist.
    ///
    /// `node_generations` holds the current generation of every node slot.
    fn clean_nodes(&mut self, node_generations: &[u16]) -> usize {
        let stale = self.storage().stale_nodes(node_generations);
        if stale.any() {
            self.clean(&stale)
        } else {
            0
        }
    }

    /// Removes animations attached to layer data that no longer exists.
    ///
    /// `data_generations` holds the current generation of every data slot of
    /// the storage's layer.
    fn clean_data(&mut self, data_generations: &[u16]) -> usize {
        let stale = self.storage().stale_data(data_generations);
        if stale.any() {
            self.clean(&stale)
        } else {
            0
        }
    }

    /// Removes a single animation, calling [`on_clean()`](Self::on_clean)
    /// for it.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    fn remove(&mut self, handle: AnimationHandle) {
        let storage = self.storage();
        assert!(
            storage.is_valid(handle),
            "Animator::remove(): invalid handle {handle}"
        );
        let mut bits = BitSet::new(storage.capacity());
        bits.set(handle.local_part().index() as usize);
        self.clean(&bits);
    }
}

//! Animators that call a user callback with the eased factor.

use std::any::Any;
use std::fmt;

use tessera_core::{AnimationHandle, AnimatorHandle, ArenaConfig, BitSet, Nanoseconds, NodeHandle};

use super::{Animator, Easing};
use crate::animation::{AnimationFlags, AnimationStorage, AnimatorFeatures};
use crate::error::UiResult;

/// Per-slot payload: an easing curve plus a callback.
struct Entry<F: ?Sized> {
    easing: Easing,
    callback: Box<F>,
}

/// Stores `entry` at `index`, growing `entries` by one if needed.
fn store<T>(entries: &mut Vec<Option<T>>, index: usize, entry: T) {
    if index < entries.len() {
        entries[index] = Some(entry);
    } else {
        entries.resize_with(index, || None);
        entries.push(Some(entry));
    }
}

/// Drops the payload of every slot whose bit is set.
fn drop_entries<T>(entries: &mut [Option<T>], remove: &BitSet) {
    for index in remove.iter_ones() {
        if let Some(entry) = entries.get_mut(index) {
            *entry = None;
        }
    }
}

/// Animator calling `callback(easing(factor))` for every active animation.
pub struct GenericAnimator {
    storage: AnimationStorage,
    entries: Vec<Option<Entry<dyn FnMut(f32)>>>,
}

impl GenericAnimator {
    /// Creates an empty animator for `handle`.
    #[must_use]
    pub fn new(handle: AnimatorHandle, config: &ArenaConfig) -> Self {
        Self {
            storage: AnimationStorage::new(handle, AnimatorFeatures::empty(), config),
            entries: Vec::new(),
        }
    }

    /// Creates an animation.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Arena`](crate::UiError::Arena) if the animation
    /// arena is full.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is not positive.
    pub fn create(
        &mut self,
        callback: impl FnMut(f32) + 'static,
        easing: Easing,
        played: Nanoseconds,
        duration: Nanoseconds,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> UiResult<AnimationHandle> {
        let handle = self.storage.create(played, duration, repeat_count, flags)?;
        let callback: Box<dyn FnMut(f32)> = Box::new(callback);
        store(
            &mut self.entries,
            handle.local_part().index() as usize,
            Entry { easing, callback },
        );
        Ok(handle)
    }

    /// Easing curve of an animation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn easing(&self, handle: AnimationHandle) -> Easing {
        assert!(
            self.storage.is_valid(handle),
            "GenericAnimator::easing(): invalid handle {handle}"
        );
        match &self.entries[handle.local_part().index() as usize] {
            Some(entry) => entry.easing,
            None => unreachable!("live animation {handle} has no callback"),
        }
    }
}

impl fmt::Debug for GenericAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericAnimator")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl Animator for GenericAnimator {
    fn storage(&self) -> &AnimationStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut AnimationStorage {
        &mut self.storage
    }

    fn apply(&mut self, active: &BitSet, factors: &[f32]) {
        for index in active.iter_ones() {
            if let Some(entry) = self.entries.get_mut(index).and_then(Option::as_mut) {
                (entry.callback)(entry.easing.apply(factors[index]));
            }
        }
    }

    fn on_clean(&mut self, remove: &BitSet) {
        drop_entries(&mut self.entries, remove);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Animator calling `callback(node, easing(factor))` for every active
/// animation, where `node` is the animation's attached node.
///
/// Animations go away together with their node when the interface cleans
/// removed nodes.
pub struct GenericNodeAnimator {
    storage: AnimationStorage,
    entries: Vec<Option<Entry<dyn FnMut(NodeHandle, f32)>>>,
}

impl GenericNodeAnimator {
    /// Creates an empty animator for `handle`.
    #[must_use]
    pub fn new(handle: AnimatorHandle, config: &ArenaConfig) -> Self {
        Self {
            storage: AnimationStorage::new(handle, AnimatorFeatures::NODE_ATTACHMENT, config),
            entries: Vec::new(),
        }
    }

    /// Creates an animation attached to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Arena`](crate::UiError::Arena) if the animation
    /// arena is full.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is not positive.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        callback: impl FnMut(NodeHandle, f32) + 'static,
        easing: Easing,
        played: Nanoseconds,
        duration: Nanoseconds,
        node: NodeHandle,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> UiResult<AnimationHandle> {
        let handle = self.storage.create(played, duration, repeat_count, flags)?;
        self.storage.attach_node(handle, node);
        let callback: Box<dyn FnMut(NodeHandle, f32)> = Box::new(callback);
        store(
            &mut self.entries,
            handle.local_part().index() as usize,
            Entry { easing, callback },
        );
        Ok(handle)
    }
}

impl fmt::Debug for GenericNodeAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericNodeAnimator")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl Animator for GenericNodeAnimator {
    fn storage(&self) -> &AnimationStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut AnimationStorage {
        &mut self.storage
    }

    fn apply(&mut self, active: &BitSet, factors: &[f32]) {
        for index in active.iter_ones() {
            let node = self.storage.node_at(index);
            if let Some(entry) = self.entries.get_mut(index).and_then(Option::as_mut) {
                (entry.callback)(node, entry.easing.apply(factors[index]));
            }
        }
    }

    fn on_clean(&mut self, remove: &BitSet) {
        drop_entries(&mut self.entries, remove);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

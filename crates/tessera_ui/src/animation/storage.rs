//! # Animation Storage
//!
//! The bookkeeping every animator shares: an arena of [`Animation`] entries,
//! node and data attachments in arrays parallel to it, the animator's
//! current time and its sticky [`AnimatorStates`].
//!
//! ## Frame Flow
//!
//! ```text
//! advance(now) ──► active bits + factors ──► animator applies factors
//!      │
//!      └─────────► remove bits ──► clean(remove) ──► SlotArena::remove
//! ```
//!
//! Nothing is removed during [`advance()`](AnimationStorage::advance). The
//! owner decides when to run [`clean()`](AnimationStorage::clean).

use std::fmt;

use tessera_core::{
    AnimationHandle, AnimatorDataHandle, AnimatorHandle, ArenaConfig, BitSet, DataHandle,
    LayerDataHandle, LayerHandle, Nanoseconds, NodeHandle, SlotArena,
};

use super::flags::{AnimationFlags, AnimatorFeatures, AnimatorStates};
use super::state::{factor, state_of, Animation, AnimationState};
use crate::error::UiResult;

/// A handle that can address an animation in an [`AnimationStorage`].
///
/// Implemented for the animator-local [`AnimatorDataHandle`] and for the
/// full [`AnimationHandle`], whose animator part must match the storage.
pub trait AnimationKey: Copy + fmt::Debug {
    /// Returns the local handle if `self` can belong to `animator`.
    fn local(self, animator: AnimatorHandle) -> Option<AnimatorDataHandle>;
}

impl AnimationKey for AnimatorDataHandle {
    #[inline]
    fn local(self, _animator: AnimatorHandle) -> Option<AnimatorDataHandle> {
        Some(self)
    }
}

impl AnimationKey for AnimationHandle {
    #[inline]
    fn local(self, animator: AnimatorHandle) -> Option<AnimatorDataHandle> {
        (self.outer() == animator).then_some(self.local_part())
    }
}

/// Animation entries of a single animator.
///
/// # Invariants
///
/// - Node attachments exist only with [`AnimatorFeatures::NODE_ATTACHMENT`],
///   data attachments only with [`AnimatorFeatures::DATA_ATTACHMENT`].
///   When present, both arrays have [`capacity()`](Self::capacity) entries.
/// - [`time()`](Self::time) never decreases.
#[derive(Clone, Debug)]
pub struct AnimationStorage {
    handle: AnimatorHandle,
    features: AnimatorFeatures,
    states: AnimatorStates,
    time: Nanoseconds,
    layer: LayerHandle,
    animations: SlotArena<AnimatorDataHandle, Animation>,
    nodes: Vec<NodeHandle>,
    data: Vec<LayerDataHandle>,
}

impl AnimationStorage {
    /// Creates an empty storage for the animator `handle`.
    ///
    /// The current time starts at [`Nanoseconds::MIN`], so the first
    /// [`advance()`](Self::advance) accepts any timestamp.
    #[must_use]
    pub fn new(handle: AnimatorHandle, features: AnimatorFeatures, config: &ArenaConfig) -> Self {
        Self {
            handle,
            features,
            states: AnimatorStates::empty(),
            time: Nanoseconds::MIN,
            layer: LayerHandle::NULL,
            animations: SlotArena::with_config(config),
            nodes: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Handle of the animator owning this storage.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> AnimatorHandle {
        self.handle
    }

    /// Supported attachment kinds.
    #[inline]
    #[must_use]
    pub const fn features(&self) -> AnimatorFeatures {
        self.features
    }

    /// Sticky animator states.
    #[inline]
    #[must_use]
    pub const fn states(&self) -> AnimatorStates {
        self.states
    }

    /// Time of the last [`advance()`](Self::advance).
    #[inline]
    #[must_use]
    pub const fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Layer whose data animations attach to, null if not set.
    #[inline]
    #[must_use]
    pub const fn layer(&self) -> LayerHandle {
        self.layer
    }

    /// Sets the layer data animations attach to.
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::DATA_ATTACHMENT`] or
    /// a layer is already set.
    pub fn set_layer(&mut self, layer: LayerHandle) {
        assert!(
            self.features.contains(AnimatorFeatures::DATA_ATTACHMENT),
            "AnimationStorage::set_layer(): data attachment not supported"
        );
        assert!(
            self.layer.is_null(),
            "AnimationStorage::set_layer(): layer already set to {}",
            self.layer
        );
        self.layer = layer;
    }

    /// Unbinds the layer once it's gone, so [`set_layer()`](Self::set_layer)
    /// can be called again.
    pub(crate) fn reset_layer(&mut self) {
        self.layer = LayerHandle::NULL;
    }

    /// Number of slots, parallel output views of [`advance()`](Self::advance)
    /// have this length.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.animations.capacity()
    }

    /// Number of live animations. O(capacity).
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.animations.used_count()
    }

    /// Generations of every animation slot, indexed by slot.
    pub fn generations(&self) -> impl ExactSizeIterator<Item = u16> + '_ {
        self.animations.generations()
    }

    /// Checks whether `handle` refers to a live animation of this storage.
    #[must_use]
    pub fn is_valid(&self, handle: impl AnimationKey) -> bool {
        handle
            .local(self.handle)
            .is_some_and(|local| self.animations.is_valid(local))
    }

    /// Creates an animation.
    ///
    /// # Arguments
    ///
    /// * `played` - Time the first repeat starts
    /// * `duration` - Length of one repeat, must be positive
    /// * `repeat_count` - Number of repeats, `0` repeats forever
    /// * `flags` - Behavior flags
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
        played: Nanoseconds,
        duration: Nanoseconds,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> UiResult<AnimationHandle> {
        let animation = Animation::new(played, duration, repeat_count, flags);
        let local = self.animations.create(animation)?;

        let index = local.index() as usize;
        if self.features.contains(AnimatorFeatures::NODE_ATTACHMENT) {
            reset_or_grow(&mut self.nodes, index, NodeHandle::NULL);
        }
        if self.features.contains(AnimatorFeatures::DATA_ATTACHMENT) {
            reset_or_grow(&mut self.data, index, LayerDataHandle::NULL);
        }

        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
        Ok(AnimationHandle::combine(self.handle, local))
    }

    /// Removes an animation and its attachments.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    pub fn remove(&mut self, handle: impl AnimationKey) {
        let local = self.expect_valid(handle, "remove");
        self.remove_local(local);
    }

    fn remove_local(&mut self, local: AnimatorDataHandle) {
        let index = local.index() as usize;
        self.animations.remove(local);
        if let Some(node) = self.nodes.get_mut(index) {
            *node = NodeHandle::NULL;
        }
        if let Some(data) = self.data.get_mut(index) {
            *data = LayerDataHandle::NULL;
        }
    }

    /// The animation entry behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn animation(&self, handle: impl AnimationKey) -> &Animation {
        let local = self.expect_valid(handle, "animation");
        self.entry(local)
    }

    /// Length of one repeat.
    #[must_use]
    pub fn duration(&self, handle: impl AnimationKey) -> Nanoseconds {
        self.entry(self.expect_valid(handle, "duration")).duration()
    }

    /// Number of repeats, `0` for infinite.
    #[must_use]
    pub fn repeat_count(&self, handle: impl AnimationKey) -> u32 {
        self.entry(self.expect_valid(handle, "repeat_count")).repeat_count()
    }

    /// Changes the number of repeats.
    pub fn set_repeat_count(&mut self, handle: impl AnimationKey, repeat_count: u32) {
        let local = self.expect_valid(handle, "set_repeat_count");
        self.entry_mut(local).set_repeat_count(repeat_count);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Behavior flags.
    #[must_use]
    pub fn flags(&self, handle: impl AnimationKey) -> AnimationFlags {
        self.entry(self.expect_valid(handle, "flags")).flags()
    }

    /// Replaces the behavior flags.
    pub fn set_flags(&mut self, handle: impl AnimationKey, flags: AnimationFlags) {
        let local = self.expect_valid(handle, "set_flags");
        self.entry_mut(local).set_flags(flags);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Sets `flags` in addition to the existing ones.
    pub fn add_flags(&mut self, handle: impl AnimationKey, flags: AnimationFlags) {
        let local = self.expect_valid(handle, "add_flags");
        let mut current = self.entry(local).flags();
        current.insert(flags);
        self.entry_mut(local).set_flags(current);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Clears `flags`, keeping the rest.
    pub fn clear_flags(&mut self, handle: impl AnimationKey, flags: AnimationFlags) {
        let local = self.expect_valid(handle, "clear_flags");
        let mut current = self.entry(local).flags();
        current.remove(flags);
        self.entry_mut(local).set_flags(current);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Play time, adjusted for time spent paused.
    #[must_use]
    pub fn played(&self, handle: impl AnimationKey) -> Nanoseconds {
        self.entry(self.expect_valid(handle, "played")).played()
    }

    /// Pause time, [`Nanoseconds::MAX`] if not paused.
    #[must_use]
    pub fn paused(&self, handle: impl AnimationKey) -> Nanoseconds {
        self.entry(self.expect_valid(handle, "paused")).paused()
    }

    /// Stop time, [`Nanoseconds::MAX`] if not stopped.
    #[must_use]
    pub fn stopped(&self, handle: impl AnimationKey) -> Nanoseconds {
        self.entry(self.expect_valid(handle, "stopped")).stopped()
    }

    /// State at the current [`time()`](Self::time).
    #[must_use]
    pub fn state(&self, handle: impl AnimationKey) -> AnimationState {
        state_of(self.entry(self.expect_valid(handle, "state")), self.time)
    }

    /// Progress at the current [`time()`](Self::time).
    #[must_use]
    pub fn factor(&self, handle: impl AnimationKey) -> f32 {
        let animation = self.entry(self.expect_valid(handle, "factor"));
        factor(animation, self.time, state_of(animation, self.time))
    }

    /// Plays an animation at `at`. See [`Animation::play()`].
    pub fn play(&mut self, handle: impl AnimationKey, at: Nanoseconds) {
        let local = self.expect_valid(handle, "play");
        self.entry_mut(local).play(at);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Pauses an animation at `at`.
    pub fn pause(&mut self, handle: impl AnimationKey, at: Nanoseconds) {
        let local = self.expect_valid(handle, "pause");
        self.entry_mut(local).pause(at);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Stops an animation at `at`.
    pub fn stop(&mut self, handle: impl AnimationKey, at: Nanoseconds) {
        let local = self.expect_valid(handle, "stop");
        self.entry_mut(local).stop(at);
        self.states.insert(AnimatorStates::NEEDS_ADVANCE);
    }

    /// Node an animation is attached to, null if none.
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::NODE_ATTACHMENT`] or
    /// `handle` is invalid.
    #[must_use]
    pub fn node(&self, handle: impl AnimationKey) -> NodeHandle {
        self.assert_feature(AnimatorFeatures::NODE_ATTACHMENT, "node");
        let local = self.expect_valid(handle, "node");
        self.nodes[local.index() as usize]
    }

    /// Attaches an animation to `node`, or detaches it with a null handle.
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::NODE_ATTACHMENT`] or
    /// `handle` is invalid.
    pub fn attach_node(&mut self, handle: impl AnimationKey, node: NodeHandle) {
        self.assert_feature(AnimatorFeatures::NODE_ATTACHMENT, "attach_node");
        let local = self.expect_valid(handle, "attach_node");
        self.nodes[local.index() as usize] = node;
    }

    /// Data an animation is attached to, null if none.
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::DATA_ATTACHMENT`] or
    /// `handle` is invalid.
    #[must_use]
    pub fn data(&self, handle: impl AnimationKey) -> DataHandle {
        self.assert_feature(AnimatorFeatures::DATA_ATTACHMENT, "data");
        let local = self.expect_valid(handle, "data");
        let data = self.data[local.index() as usize];
        if data.is_null() {
            DataHandle::NULL
        } else {
            DataHandle::combine(self.layer, data)
        }
    }

    /// Attaches an animation to `data`, or detaches it with a null handle.
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::DATA_ATTACHMENT`], no
    /// layer is set, `data` belongs to a different layer or `handle` is
    /// invalid.
    pub fn attach_data(&mut self, handle: impl AnimationKey, data: DataHandle) {
        self.assert_feature(AnimatorFeatures::DATA_ATTACHMENT, "attach_data");
        assert!(
            !self.layer.is_null(),
            "AnimationStorage::attach_data(): no layer set for data attachment"
        );
        assert!(
            data.is_null() || data.outer() == self.layer,
            "AnimationStorage::attach_data(): expected a data handle with {} but got {data}",
            self.layer
        );
        let local = self.expect_valid(handle, "attach_data");
        self.data[local.index() as usize] = data.local_part();
    }

    /// Advances every animation to `now`.
    ///
    /// `active` gets a bit for each animation whose state or progress
    /// changed, with its new factor written to `factors`. `remove` gets a
    /// bit for each animation that is stopped and not kept. Both bit views
    /// are cleared first. Returns whether any bit was set in `active` and in
    /// `remove`.
    ///
    /// # Panics
    ///
    /// Panics if a view length differs from [`capacity()`](Self::capacity)
    /// or `now` is before [`time()`](Self::time).
    pub fn advance(
        &mut self,
        now: Nanoseconds,
        active: &mut BitSet,
        factors: &mut [f32],
        remove: &mut BitSet,
    ) -> (bool, bool) {
        let capacity = self.capacity();
        assert!(
            active.len() == capacity && factors.len() == capacity && remove.len() == capacity,
            "AnimationStorage::advance(): expected views of size {capacity} but got {}, {} and {}",
            active.len(),
            factors.len(),
            remove.len()
        );
        assert!(
            now >= self.time,
            "AnimationStorage::advance(): expected a time at least {} but got {now}",
            self.time
        );

        active.clear_all();
        remove.clear_all();

        let previous = self.time;
        let mut any_active = false;
        let mut any_to_remove = false;
        let mut needs_advance = false;

        for (handle, animation) in self.animations.iter() {
            let index = handle.index() as usize;
            let before = state_of(animation, previous);
            let after = state_of(animation, now);

            let changed = match (before, after) {
                (
                    AnimationState::Scheduled,
                    AnimationState::Playing | AnimationState::Paused | AnimationState::Stopped,
                )
                | (
                    AnimationState::Playing,
                    AnimationState::Playing | AnimationState::Paused | AnimationState::Stopped,
                )
                | (AnimationState::Paused, AnimationState::Stopped) => true,

                (AnimationState::Scheduled, AnimationState::Scheduled)
                | (AnimationState::Paused, AnimationState::Paused)
                | (AnimationState::Stopped, AnimationState::Stopped) => false,

                (AnimationState::Playing, AnimationState::Scheduled)
                | (AnimationState::Paused, AnimationState::Scheduled | AnimationState::Playing)
                | (
                    AnimationState::Stopped,
                    AnimationState::Scheduled | AnimationState::Playing | AnimationState::Paused,
                ) => unreachable!(
                    "AnimationStorage::advance(): {handle} went from {before:?} back to {after:?}"
                ),
            };

            if changed {
                active.set(index);
                factors[index] = factor(animation, now, after);
                any_active = true;
            }

            if after == AnimationState::Stopped {
                if !animation.flags().contains(AnimationFlags::KEEP_ONCE_PLAYED) {
                    remove.set(index);
                    any_to_remove = true;
                }
            } else {
                needs_advance = true;
            }
        }

        self.time = now;
        self.states.set(AnimatorStates::NEEDS_ADVANCE, needs_advance);

        tracing::trace!(
            animator = %self.handle,
            time = %now,
            active = active.count_ones(),
            to_remove = remove.count_ones(),
            "advanced animations"
        );

        (any_active, any_to_remove)
    }

    /// Removes every animation whose bit is set in `remove`.
    ///
    /// Bits for free slots are skipped. Returns the number of removed
    /// animations.
    ///
    /// # Panics
    ///
    /// Panics if `remove` differs in length from [`capacity()`](Self::capacity).
    pub fn clean(&mut self, remove: &BitSet) -> usize {
        assert_eq!(
            remove.len(),
            self.capacity(),
            "AnimationStorage::clean(): expected a view of size {} but got {}",
            self.capacity(),
            remove.len()
        );
        let mut removed = 0;
        for index in remove.iter_ones() {
            if let Some(local) = self.animations.handle_at(index) {
                self.remove_local(local);
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(animator = %self.handle, removed, "cleaned animations");
        }
        removed
    }

    /// Marks animations attached to nodes that no longer exist.
    ///
    /// `node_generations` holds the current generation of every node slot.
    /// An attachment is stale when its slot is out of range or the slot's
    /// generation differs from the attached handle's.
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::NODE_ATTACHMENT`].
    #[must_use]
    pub fn stale_nodes(&self, node_generations: &[u16]) -> BitSet {
        self.assert_feature(AnimatorFeatures::NODE_ATTACHMENT, "stale_nodes");
        let mut stale = BitSet::new(self.capacity());
        for (handle, _) in self.animations.iter() {
            let index = handle.index() as usize;
            let node = self.nodes[index];
            if !node.is_null() && !is_current(node_generations, node.index(), node.generation()) {
                stale.set(index);
            }
        }
        stale
    }

    /// Marks animations attached to layer data that no longer exists.
    ///
    /// `data_generations` holds the current generation of every data slot of
    /// the attached [`layer()`](Self::layer).
    ///
    /// # Panics
    ///
    /// Panics if the storage lacks [`AnimatorFeatures::DATA_ATTACHMENT`].
    #[must_use]
    pub fn stale_data(&self, data_generations: &[u16]) -> BitSet {
        self.assert_feature(AnimatorFeatures::DATA_ATTACHMENT, "stale_data");
        let mut stale = BitSet::new(self.capacity());
        for (handle, _) in self.animations.iter() {
            let index = handle.index() as usize;
            let data = self.data[index];
            if !data.is_null() && !is_current(data_generations, data.index(), data.generation()) {
                stale.set(index);
            }
        }
        stale
    }

    /// Iterates over live animations with their local handles.
    pub fn iter(&self) -> impl Iterator<Item = (AnimatorDataHandle, &Animation)> + '_ {
        self.animations.iter()
    }

    /// Node attachment at slot `index`, null if none or unsupported.
    #[inline]
    #[must_use]
    pub fn node_at(&self, index: usize) -> NodeHandle {
        self.nodes.get(index).copied().unwrap_or(NodeHandle::NULL)
    }

    fn expect_valid(&self, handle: impl AnimationKey, function: &str) -> AnimatorDataHandle {
        match handle.local(self.handle) {
            Some(local) if self.animations.is_valid(local) => local,
            _ => panic!("AnimationStorage::{function}(): invalid handle {handle:?}"),
        }
    }

    fn assert_feature(&self, feature: AnimatorFeatures, function: &str) {
        assert!(
            self.features.contains(feature),
            "AnimationStorage::{function}(): feature {feature:?} not supported"
        );
    }

    fn entry(&self, local: AnimatorDataHandle) -> &Animation {
        match self.animations.get(local) {
            Some(animation) => animation,
            None => unreachable!("validated handle {local} has no entry"),
        }
    }

    fn entry_mut(&mut self, local: AnimatorDataHandle) -> &mut Animation {
        match self.animations.get_mut(local) {
            Some(animation) => animation,
            None => unreachable!("validated handle {local} has no entry"),
        }
    }
}

/// Writes `value` at `index`, appending if `index` is one past the end.
fn reset_or_grow<T: Copy>(values: &mut Vec<T>, index: usize, value: T) {
    if index < values.len() {
        values[index] = value;
    } else {
        debug_assert_eq!(index, values.len(), "attachment array out of sync");
        values.push(value);
    }
}

fn is_current(generations: &[u16], index: u32, generation: u16) -> bool {
    generations.get(index as usize) == Some(&generation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(secs: f64) -> Nanoseconds {
        Nanoseconds::from_secs_f64(secs)
    }

    fn storage(features: AnimatorFeatures) -> AnimationStorage {
        AnimationStorage::new(AnimatorHandle::pack(3, 1), features, &ArenaConfig::default())
    }

    struct Views {
        active: BitSet,
        factors: Vec<f32>,
        remove: BitSet,
    }

    impl Views {
        fn advance(storage: &mut AnimationStorage, now: Nanoseconds) -> (Self, (bool, bool)) {
            let capacity = storage.capacity();
            let mut views = Self {
                active: BitSet::new(capacity),
                factors: vec![-1.0; capacity],
                remove: BitSet::new(capacity),
            };
            let result =
                storage.advance(now, &mut views.active, &mut views.factors, &mut views.remove);
            (views, result)
        }
    }

    #[test]
    fn test_create_combines_animator_handle() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        assert_eq!(handle.outer(), storage.handle());
        assert!(storage.is_valid(handle));
        assert!(storage.is_valid(handle.local_part()));
        assert!(storage.states().contains(AnimatorStates::NEEDS_ADVANCE));

        let foreign = AnimationHandle::combine(AnimatorHandle::pack(4, 1), handle.local_part());
        assert!(!storage.is_valid(foreign));
    }

    #[test]
    fn test_one_shot_end_to_end() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();

        let (views, (any_active, any_to_remove)) = Views::advance(&mut storage, Nanoseconds::ZERO);
        assert!(any_active && !any_to_remove);
        assert_eq!(storage.state(handle), AnimationState::Playing);
        assert_eq!(views.factors[0], 0.0);

        let (views, _) = Views::advance(&mut storage, secs(0.5));
        assert!(views.active.get(0));
        assert!((views.factors[0] - 0.5).abs() < 1e-6);

        let (views, (any_active, any_to_remove)) = Views::advance(&mut storage, secs(1.0));
        assert!(any_active && any_to_remove);
        assert!(views.remove.get(0));
        assert_eq!(views.factors[0], 1.0);
        assert!(!storage.states().contains(AnimatorStates::NEEDS_ADVANCE));

        assert_eq!(storage.clean(&views.remove), 1);
        assert!(!storage.is_valid(handle));
        assert_eq!(storage.used_count(), 0);
    }

    #[test]
    fn test_stationary_entries_are_inactive() {
        let mut storage = storage(AnimatorFeatures::empty());
        storage
            .create(secs(10.0), secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        let paused = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        storage.pause(paused, secs(0.25));

        let (views, _) = Views::advance(&mut storage, secs(0.5));
        assert!(!views.active.get(0));
        assert!(views.active.get(1));
        assert_eq!(views.factors[0], -1.0);
        assert!((views.factors[1] - 0.25).abs() < 1e-6);

        let (views, (any_active, any_to_remove)) = Views::advance(&mut storage, secs(0.75));
        assert!(!any_active && !any_to_remove);
        assert!(!views.active.any());
        assert!(storage.states().contains(AnimatorStates::NEEDS_ADVANCE));
    }

    #[test]
    fn test_pause_and_stop_while_running() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        Views::advance(&mut storage, secs(0.1));
        assert_eq!(storage.state(handle), AnimationState::Playing);

        // Playing -> Paused applies the frozen factor once
        storage.pause(handle, secs(0.3));
        let (views, result) = Views::advance(&mut storage, secs(0.5));
        assert_eq!(result, (true, false));
        assert!(views.active.get(0));
        assert!(!views.remove.get(0));
        assert!((views.factors[0] - 0.3).abs() < 1e-6);
        assert_eq!(storage.state(handle), AnimationState::Paused);

        // Paused -> Stopped jumps to the end and asks for removal
        storage.stop(handle, secs(0.6));
        let (views, result) = Views::advance(&mut storage, secs(0.7));
        assert_eq!(result, (true, true));
        assert!(views.active.get(0));
        assert!(views.remove.get(0));
        assert_eq!(views.factors[0], 1.0);
        assert_eq!(storage.state(handle), AnimationState::Stopped);
    }

    #[test]
    fn test_kept_animation_is_not_removed() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::KEEP_ONCE_PLAYED)
            .unwrap();
        let (views, (_, any_to_remove)) = Views::advance(&mut storage, secs(2.0));
        assert!(!any_to_remove);
        assert!(!views.remove.any());
        assert_eq!(storage.state(handle), AnimationState::Stopped);
        assert!(!storage.states().contains(AnimatorStates::NEEDS_ADVANCE));

        storage.play(handle, secs(3.0));
        assert!(storage.states().contains(AnimatorStates::NEEDS_ADVANCE));
        let (views, _) = Views::advance(&mut storage, secs(3.5));
        assert!((views.factors[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clearing_keep_flag_schedules_removal() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::KEEP_ONCE_PLAYED)
            .unwrap();
        let _ = Views::advance(&mut storage, secs(2.0));
        storage.clear_flags(handle, AnimationFlags::KEEP_ONCE_PLAYED);
        assert!(storage.flags(handle).is_empty());

        let (views, (any_active, any_to_remove)) = Views::advance(&mut storage, secs(2.5));
        assert!(!any_active && any_to_remove);
        assert!(views.remove.get(0));
    }

    #[test]
    #[should_panic(expected = "expected a time at least")]
    fn test_time_going_backwards_panics() {
        let mut storage = storage(AnimatorFeatures::empty());
        let _ = Views::advance(&mut storage, secs(1.0));
        let _ = Views::advance(&mut storage, secs(0.5));
    }

    #[test]
    #[should_panic(expected = "expected views of size 1")]
    fn test_mismatched_views_panic() {
        let mut storage = storage(AnimatorFeatures::empty());
        storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        let mut active = BitSet::new(2);
        let mut factors = vec![0.0; 1];
        let mut remove = BitSet::new(1);
        let _ = storage.advance(Nanoseconds::ZERO, &mut active, &mut factors, &mut remove);
    }

    #[test]
    #[should_panic(expected = "invalid handle")]
    fn test_access_through_removed_handle_panics() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        storage.remove(handle);
        let _ = storage.duration(handle);
    }

    #[test]
    fn test_node_attachment_reset_on_reuse() {
        let mut storage = storage(AnimatorFeatures::NODE_ATTACHMENT);
        let node = NodeHandle::pack(5, 2);
        let first = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        storage.attach_node(first, node);
        assert_eq!(storage.node(first), node);
        assert_eq!(storage.node_at(0), node);

        storage.remove(first);
        let second = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        assert_eq!(second.local_part().index(), first.local_part().index());
        assert_eq!(storage.node(second), NodeHandle::NULL);
    }

    #[test]
    fn test_stale_nodes() {
        let mut storage = storage(AnimatorFeatures::NODE_ATTACHMENT);
        let live = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        let stale = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        let out_of_range = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        let unattached = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        storage.attach_node(live, NodeHandle::pack(0, 1));
        storage.attach_node(stale, NodeHandle::pack(1, 1));
        storage.attach_node(out_of_range, NodeHandle::pack(7, 1));

        let marked = storage.stale_nodes(&[1, 2]);
        assert_eq!(marked.iter_ones().collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(storage.clean(&marked), 2);
        assert!(storage.is_valid(live));
        assert!(!storage.is_valid(stale));
        assert!(!storage.is_valid(out_of_range));
        assert!(storage.is_valid(unattached));
    }

    #[test]
    fn test_data_attachment() {
        let mut storage = storage(AnimatorFeatures::DATA_ATTACHMENT);
        let layer = LayerHandle::pack(2, 1);
        storage.set_layer(layer);

        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        assert_eq!(storage.data(handle), DataHandle::NULL);

        let data = DataHandle::combine(layer, LayerDataHandle::pack(4, 3));
        storage.attach_data(handle, data);
        assert_eq!(storage.data(handle), data);

        assert!(!storage.stale_data(&[1, 1, 1, 1, 3]).any());
        assert!(storage.stale_data(&[1, 1, 1, 1, 4]).get(0));
    }

    #[test]
    #[should_panic(expected = "expected a data handle with")]
    fn test_data_of_other_layer_panics() {
        let mut storage = storage(AnimatorFeatures::DATA_ATTACHMENT);
        storage.set_layer(LayerHandle::pack(2, 1));
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        storage.attach_data(
            handle,
            DataHandle::combine(LayerHandle::pack(3, 1), LayerDataHandle::pack(0, 1)),
        );
    }

    #[test]
    #[should_panic(expected = "not supported")]
    fn test_node_without_feature_panics() {
        let mut storage = storage(AnimatorFeatures::empty());
        let handle = storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        let _ = storage.node(handle);
    }

    #[test]
    fn test_capacity_limit() {
        let config = ArenaConfig::new().with_max_capacity(1);
        let mut storage =
            AnimationStorage::new(AnimatorHandle::pack(0, 1), AnimatorFeatures::empty(), &config);
        storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .unwrap();
        assert!(storage
            .create(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
            .is_err());
    }
}

//! # User Interface
//!
//! Owns every layer and animator and drives them once per frame.
//!
//! ## Frame Order
//!
//! 1. The node hierarchy removes nodes and hands over its generations
//! 2. [`UserInterface::clean()`] drops data and animations attached to them
//! 3. [`UserInterface::advance_animations()`] runs animators that asked for it
//!
//! Node storage itself lives outside this crate. Only its per-slot
//! generation table crosses the boundary.

use tessera_core::{AnimatorHandle, ArenaConfig, LayerHandle, Nanoseconds, SlotArena};

use crate::animation::{AnimatorFeatures, AnimatorStates};
use crate::animator::{AdvanceScratch, Animator};
use crate::config::UiConfig;
use crate::error::UiResult;
use crate::layer::{Layer, LayerStates};

/// Layers and animators of one interface.
pub struct UserInterface {
    config: UiConfig,
    layers: SlotArena<LayerHandle, Layer>,
    animators: SlotArena<AnimatorHandle, Box<dyn Animator>>,
    scratch: AdvanceScratch,
}

impl UserInterface {
    /// Creates an interface with default arena sizing.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(UiConfig::default())
    }

    /// Creates an interface sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Config`](crate::UiError::Config) if `config` fails
    /// validation.
    pub fn with_config(config: UiConfig) -> UiResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: UiConfig) -> Self {
        Self {
            layers: SlotArena::with_config(&config.layers),
            animators: SlotArena::with_config(&config.animators),
            scratch: AdvanceScratch::new(),
            config,
        }
    }

    /// Arena sizing in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Number of live layers. O(capacity).
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.used_count()
    }

    /// Number of live animators. O(capacity).
    #[must_use]
    pub fn animator_count(&self) -> usize {
        self.animators.used_count()
    }

    /// Checks whether `handle` refers to a live layer.
    #[must_use]
    pub fn is_layer_valid(&self, handle: LayerHandle) -> bool {
        self.layers.is_valid(handle)
    }

    /// Checks whether `handle` refers to a live animator.
    #[must_use]
    pub fn is_animator_valid(&self, handle: AnimatorHandle) -> bool {
        self.animators.is_valid(handle)
    }

    /// Creates an empty layer.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Arena`](crate::UiError::Arena) if the layer arena
    /// is full.
    pub fn create_layer(&mut self) -> UiResult<LayerHandle> {
        let config = self.config.layer_data;
        let handle = self
            .layers
            .create_with(|handle| Layer::new(handle, &config))?;
        tracing::debug!(layer = %handle, "created layer");
        Ok(handle)
    }

    /// Removes a layer with all its data.
    ///
    /// Animations attached to data of this layer are removed as well, and
    /// their animators are unbound so they can be given another layer.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    pub fn remove_layer(&mut self, handle: LayerHandle) {
        assert!(
            self.layers.is_valid(handle),
            "UserInterface::remove_layer(): invalid handle {handle}"
        );
        self.layers.remove(handle);

        let mut removed = 0;
        for (_, animator) in self.animators.iter_mut() {
            let storage = animator.storage();
            if storage.features().contains(AnimatorFeatures::DATA_ATTACHMENT)
                && storage.layer() == handle
            {
                // No data slot has a matching generation anymore
                removed += animator.clean_data(&[]);
                animator.storage_mut().reset_layer();
            }
        }
        tracing::debug!(layer = %handle, removed, "removed layer");
    }

    /// The layer behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn layer(&self, handle: LayerHandle) -> &Layer {
        match self.layers.get(handle) {
            Some(layer) => layer,
            None => panic!("UserInterface::layer(): invalid handle {handle}"),
        }
    }

    /// The layer behind `handle`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn layer_mut(&mut self, handle: LayerHandle) -> &mut Layer {
        match self.layers.get_mut(handle) {
            Some(layer) => layer,
            None => panic!("UserInterface::layer_mut(): invalid handle {handle}"),
        }
    }

    /// Creates an animator.
    ///
    /// `init` receives the new animator's handle and the arena sizing for
    /// its animations.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Arena`](crate::UiError::Arena) if the animator
    /// arena is full. `init` is not called then.
    ///
    /// # Panics
    ///
    /// Panics if the animator's storage reports a handle other than the one
    /// passed to `init`.
    pub fn create_animator<A, F>(&mut self, init: F) -> UiResult<AnimatorHandle>
    where
        A: Animator,
        F: FnOnce(AnimatorHandle, &ArenaConfig) -> A,
    {
        let config = self.config.animations;
        let handle = self.animators.create_with(|handle| {
            let animator: Box<dyn Animator> = Box::new(init(handle, &config));
            animator
        })?;
        let reported = self.animator(handle).storage().handle();
        assert!(
            reported == handle,
            "UserInterface::create_animator(): expected an animator for {handle} but got {reported}"
        );
        tracing::debug!(animator = %handle, "created animator");
        Ok(handle)
    }

    /// Removes an animator with all its animations.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    pub fn remove_animator(&mut self, handle: AnimatorHandle) {
        assert!(
            self.animators.is_valid(handle),
            "UserInterface::remove_animator(): invalid handle {handle}"
        );
        self.animators.remove(handle);
        tracing::debug!(animator = %handle, "removed animator");
    }

    /// The animator behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn animator(&self, handle: AnimatorHandle) -> &dyn Animator {
        match self.animators.get(handle) {
            Some(animator) => &**animator,
            None => panic!("UserInterface::animator(): invalid handle {handle}"),
        }
    }

    /// The animator behind `handle`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn animator_mut(&mut self, handle: AnimatorHandle) -> &mut dyn Animator {
        match self.animators.get_mut(handle) {
            Some(animator) => &mut **animator,
            None => panic!("UserInterface::animator_mut(): invalid handle {handle}"),
        }
    }

    /// The animator behind `handle` as its concrete type, `None` if it's a
    /// different type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn animator_as<A: Animator>(&self, handle: AnimatorHandle) -> Option<&A> {
        self.animator(handle).as_any().downcast_ref()
    }

    /// The animator behind `handle` mutably as its concrete type, `None` if
    /// it's a different type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn animator_as_mut<A: Animator>(&mut self, handle: AnimatorHandle) -> Option<&mut A> {
        self.animator_mut(handle).as_any_mut().downcast_mut()
    }

    /// Makes data animations of `animator` attach to `layer`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is invalid, the animator lacks
    /// [`AnimatorFeatures::DATA_ATTACHMENT`] or already has a layer.
    pub fn set_animator_layer(&mut self, animator: AnimatorHandle, layer: LayerHandle) {
        assert!(
            self.layers.is_valid(layer),
            "UserInterface::set_animator_layer(): invalid handle {layer}"
        );
        self.animator_mut(animator).storage_mut().set_layer(layer);
    }

    /// Whether any animator asked for another advance.
    #[must_use]
    pub fn needs_animation_advance(&self) -> bool {
        self.animators.iter().any(|(_, animator)| {
            animator
                .storage()
                .states()
                .contains(AnimatorStates::NEEDS_ADVANCE)
        })
    }

    /// Advances every animator that needs it to `now` and applies the
    /// results. Returns the number of animations removed because they
    /// finished.
    ///
    /// # Panics
    ///
    /// Panics if `now` is before the time of an animator's last advance.
    pub fn advance_animations(&mut self, now: Nanoseconds) -> usize {
        let mut removed = 0;
        for (_, animator) in self.animators.iter_mut() {
            if animator
                .storage()
                .states()
                .contains(AnimatorStates::NEEDS_ADVANCE)
            {
                removed += animator.advance_and_apply(now, &mut self.scratch);
            }
        }
        removed
    }

    /// Removes everything attached to nodes that no longer exist.
    ///
    /// `node_generations` holds the current generation of every node slot.
    /// Layer data attached to removed nodes goes first, then node-attached
    /// animations, then animations attached to data removed so far.
    /// Returns the number of removed data entries and animations.
    pub fn clean(&mut self, node_generations: &[u16]) -> usize {
        let mut removed = 0;

        for (_, layer) in self.layers.iter_mut() {
            removed += layer.clean_nodes(node_generations);
        }

        for (_, animator) in self.animators.iter_mut() {
            if animator
                .storage()
                .features()
                .contains(AnimatorFeatures::NODE_ATTACHMENT)
            {
                removed += animator.clean_nodes(node_generations);
            }
        }

        for (layer_handle, layer) in self.layers.iter_mut() {
            if !layer.states().contains(LayerStates::NEEDS_DATA_CLEAN) {
                continue;
            }
            let data_generations = layer.data_generations();
            for (_, animator) in self.animators.iter_mut() {
                let storage = animator.storage();
                if storage.features().contains(AnimatorFeatures::DATA_ATTACHMENT)
                    && storage.layer() == layer_handle
                {
                    removed += animator.clean_data(&data_generations);
                }
            }
            layer.clear_states(LayerStates::NEEDS_DATA_CLEAN);
        }

        tracing::debug!(removed, "cleaned interface");
        removed
    }
}

impl Default for UserInterface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::GenericAnimator;
    use crate::{AnimationFlags, Easing};
    use tessera_core::NodeHandle;

    #[test]
    fn test_create_and_remove() {
        let mut ui = UserInterface::new();
        let layer = ui.create_layer().unwrap();
        let animator = ui.create_animator(GenericAnimator::new).unwrap();
        assert_eq!(ui.layer_count(), 1);
        assert_eq!(ui.animator_count(), 1);
        assert_eq!(ui.layer(layer).handle(), layer);
        assert_eq!(ui.animator(animator).storage().handle(), animator);

        ui.remove_layer(layer);
        ui.remove_animator(animator);
        assert!(!ui.is_layer_valid(layer));
        assert!(!ui.is_animator_valid(animator));
    }

    #[test]
    fn test_downcast_to_wrong_type() {
        let mut ui = UserInterface::new();
        let animator = ui.create_animator(GenericAnimator::new).unwrap();
        assert!(ui.animator_as::<GenericAnimator>(animator).is_some());
        assert!(ui
            .animator_as::<crate::animator::GenericNodeAnimator>(animator)
            .is_none());
    }

    #[test]
    fn test_layer_capacity_from_config() {
        let config = UiConfig::from_toml_str("[layers]\nmax_capacity = 1\n").unwrap();
        let mut ui = UserInterface::with_config(config).unwrap();
        ui.create_layer().unwrap();
        assert!(ui.create_layer().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = UiConfig {
            animators: ArenaConfig::new().with_initial_capacity(8).with_max_capacity(4),
            ..UiConfig::default()
        };
        assert!(UserInterface::with_config(config).is_err());
    }

    #[test]
    fn test_idle_animators_are_skipped() {
        let mut ui = UserInterface::new();
        let animator = ui.create_animator(GenericAnimator::new).unwrap();
        assert!(!ui.needs_animation_advance());

        ui.animator_as_mut::<GenericAnimator>(animator)
            .unwrap()
            .create(
                |_| {},
                Easing::Linear,
                Nanoseconds::from_secs(5),
                Nanoseconds::from_secs(1),
                1,
                AnimationFlags::empty(),
            )
            .unwrap();
        assert!(ui.needs_animation_advance());

        ui.advance_animations(Nanoseconds::from_secs(1));
        assert!(ui.needs_animation_advance());
        assert_eq!(ui.advance_animations(Nanoseconds::from_secs(6)), 1);
        assert!(!ui.needs_animation_advance());
        assert_eq!(ui.animator(animator).storage().time(), Nanoseconds::from_secs(6));

        // Skipped animators keep their last time
        ui.advance_animations(Nanoseconds::from_secs(9));
        assert_eq!(ui.animator(animator).storage().time(), Nanoseconds::from_secs(6));
    }

    #[test]
    fn test_clean_removes_data_of_removed_nodes() {
        let mut ui = UserInterface::new();
        let layer = ui.create_layer().unwrap();
        let data = ui.layer_mut(layer).create(NodeHandle::pack(0, 1)).unwrap();
        assert_eq!(ui.clean(&[1]), 0);
        assert_eq!(ui.clean(&[2]), 1);
        assert!(!ui.layer(layer).is_valid(data));
    }
}

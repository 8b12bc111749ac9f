//! # Layers
//!
//! A layer owns data entries, each optionally attached to a node. Removing
//! a node makes its data stale, and removing data makes animations attached
//! to that data stale in turn:
//!
//! ```text
//! node removed ──► Layer::clean_nodes() ──► NEEDS_DATA_CLEAN
//!                                                 │
//!                  Animator::clean_data() ◄───────┘
//! ```

use tessera_core::{
    ArenaConfig, BitSet, DataHandle, LayerDataHandle, LayerHandle, NodeHandle, SlotArena,
};

use crate::error::UiResult;
use crate::flags::flag_set;

flag_set! {
    /// Sticky layer state.
    LayerStates {
        /// A node attachment of some data changed.
        ///
        /// The interface never reads this. It is for the layer owner to
        /// poll before rebuilding whatever it derives from attachments, then
        /// clear with [`Layer::clear_states()`].
        const NEEDS_ATTACHMENT_UPDATE = 0;
        /// Data was removed and animations attached to it need cleaning.
        const NEEDS_DATA_CLEAN = 1;
    }
}

/// A handle that can address data in a [`Layer`].
///
/// Implemented for the layer-local [`LayerDataHandle`] and for the full
/// [`DataHandle`], whose layer part must match the layer.
pub trait DataKey: Copy + std::fmt::Debug {
    /// Returns the local handle if `self` can belong to `layer`.
    fn local(self, layer: LayerHandle) -> Option<LayerDataHandle>;
}

impl DataKey for LayerDataHandle {
    #[inline]
    fn local(self, _layer: LayerHandle) -> Option<LayerDataHandle> {
        Some(self)
    }
}

impl DataKey for DataHandle {
    #[inline]
    fn local(self, layer: LayerHandle) -> Option<LayerDataHandle> {
        (self.outer() == layer).then_some(self.local_part())
    }
}

/// Data entries of a single layer.
///
/// Each slot stores the node the data is attached to, null if none.
#[derive(Clone, Debug)]
pub struct Layer {
    handle: LayerHandle,
    states: LayerStates,
    data: SlotArena<LayerDataHandle, NodeHandle>,
}

impl Layer {
    /// Creates an empty layer for `handle`.
    #[must_use]
    pub fn new(handle: LayerHandle, config: &ArenaConfig) -> Self {
        Self {
            handle,
            states: LayerStates::empty(),
            data: SlotArena::with_config(config),
        }
    }

    /// Handle of this layer.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> LayerHandle {
        self.handle
    }

    /// Sticky layer states.
    #[inline]
    #[must_use]
    pub const fn states(&self) -> LayerStates {
        self.states
    }

    /// Clears `states` once they've been acted upon.
    pub fn clear_states(&mut self, states: LayerStates) {
        self.states.remove(states);
    }

    /// Number of data slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Number of live data entries. O(capacity).
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.data.used_count()
    }

    /// Checks whether `handle` refers to live data of this layer.
    #[must_use]
    pub fn is_valid(&self, handle: impl DataKey) -> bool {
        handle
            .local(self.handle)
            .is_some_and(|local| self.data.is_valid(local))
    }

    /// Creates data attached to `node`, which may be null.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Arena`](crate::UiError::Arena) if the data arena
    /// is full.
    pub fn create(&mut self, node: NodeHandle) -> UiResult<DataHandle> {
        let local = self.data.create(node)?;
        if !node.is_null() {
            self.states.insert(LayerStates::NEEDS_ATTACHMENT_UPDATE);
        }
        Ok(DataHandle::combine(self.handle, local))
    }

    /// Removes data.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    pub fn remove(&mut self, handle: impl DataKey) {
        let local = self.expect_valid(handle, "remove");
        let node = self.data.remove(local);
        if !node.is_null() {
            self.states.insert(LayerStates::NEEDS_ATTACHMENT_UPDATE);
        }
        self.states.insert(LayerStates::NEEDS_DATA_CLEAN);
    }

    /// Attaches data to `node`, or detaches it with a null handle.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    pub fn attach(&mut self, handle: impl DataKey, node: NodeHandle) {
        let local = self.expect_valid(handle, "attach");
        if let Some(attached) = self.data.get_mut(local) {
            *attached = node;
        }
        self.states.insert(LayerStates::NEEDS_ATTACHMENT_UPDATE);
    }

    /// Node the data is attached to, null if none.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid.
    #[must_use]
    pub fn node(&self, handle: impl DataKey) -> NodeHandle {
        let local = self.expect_valid(handle, "node");
        self.data.get(local).copied().unwrap_or(NodeHandle::NULL)
    }

    /// Removes data attached to nodes that no longer exist.
    ///
    /// `node_generations` holds the current generation of every node slot.
    /// Returns the number of removed entries.
    pub fn clean_nodes(&mut self, node_generations: &[u16]) -> usize {
        let mut stale = BitSet::new(self.capacity());
        for (local, node) in self.data.iter() {
            if !node.is_null()
                && node_generations.get(node.index() as usize) != Some(&node.generation())
            {
                stale.set(local.index() as usize);
            }
        }

        let mut removed = 0;
        for index in stale.iter_ones() {
            if let Some(local) = self.data.handle_at(index) {
                self.data.remove(local);
                removed += 1;
            }
        }

        if removed > 0 {
            self.states.insert(LayerStates::NEEDS_DATA_CLEAN);
            tracing::debug!(layer = %self.handle, removed, "cleaned layer data");
        }
        removed
    }

    /// Current generation of every data slot, indexed by slot.
    ///
    /// Passed to [`Animator::clean_data()`](crate::Animator::clean_data) for
    /// animators attached to this layer.
    #[must_use]
    pub fn data_generations(&self) -> Vec<u16> {
        self.data.generations().collect()
    }

    fn expect_valid(&self, handle: impl DataKey, function: &str) -> LayerDataHandle {
        match handle.local(self.handle) {
            Some(local) if self.data.is_valid(local) => local,
            _ => panic!("Layer::{function}(): invalid handle {handle:?}"),
        }
    }
}

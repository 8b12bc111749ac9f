//! Two-level handles: an owner handle plus a handle local to that owner.

use std::fmt;

use bytemuck::{Pod, Zeroable};

use super::composite_handle;
use super::packed::{
    AnimatorDataHandle, AnimatorHandle, LayerDataHandle, LayerHandle, LayouterDataHandle,
    LayouterHandle,
};

composite_handle! {
    /// Handle to a data entry together with the layer owning it.
    DataHandle { outer: LayerHandle, inner: LayerDataHandle }
}

composite_handle! {
    /// Handle to an animation together with the animator owning it.
    AnimationHandle { outer: AnimatorHandle, inner: AnimatorDataHandle }
}

composite_handle! {
    /// Handle to a layout together with the layouter owning it.
    LayoutHandle { outer: LayouterHandle, inner: LayouterDataHandle }
}

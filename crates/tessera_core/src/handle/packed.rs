//! Single-level handle families.

use std::fmt;

use bytemuck::{Pod, Zeroable};

use super::{packed_handle, SlotHandle};

packed_handle! {
    /// Handle to a layer instance in the user interface.
    ///
    /// 8 index bits and 8 generation bits: at most 256 live layers.
    LayerHandle(u16) { index_bits: 8, generation_bits: 8 }
}

packed_handle! {
    /// Handle to a data entry local to one layer.
    ///
    /// 20 index bits and 12 generation bits: at most 1,048,576 entries per layer.
    LayerDataHandle(u32) { index_bits: 20, generation_bits: 12 }
}

packed_handle! {
    /// Handle to a node in the interface hierarchy.
    NodeHandle(u32) { index_bits: 20, generation_bits: 12 }
}

packed_handle! {
    /// Handle to an animator instance in the user interface.
    AnimatorHandle(u16) { index_bits: 8, generation_bits: 8 }
}

packed_handle! {
    /// Handle to an animation local to one animator.
    AnimatorDataHandle(u32) { index_bits: 20, generation_bits: 12 }
}

packed_handle! {
    /// Handle to a layouter instance in the user interface.
    LayouterHandle(u16) { index_bits: 8, generation_bits: 8 }
}

packed_handle! {
    /// Handle to a layout local to one layouter.
    LayouterDataHandle(u32) { index_bits: 20, generation_bits: 12 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_null_is_zero() {
        assert!(NodeHandle::NULL.is_null());
        assert_eq!(NodeHandle::NULL.raw(), 0);
        assert_eq!(NodeHandle::default(), NodeHandle::NULL);
        assert!(!NodeHandle::pack(0, 1).is_null());
    }

    #[test]
    fn test_field_layout() {
        let handle = LayerDataHandle::pack(0xabcde, 0x123);
        assert_eq!(handle.raw(), 0x123a_bcde);
        assert_eq!(handle.index(), 0xabcde);
        assert_eq!(handle.generation(), 0x123);

        let layer = LayerHandle::pack(0xab, 0x12);
        assert_eq!(layer.raw(), 0x12ab);
    }

    #[test]
    fn test_trait_constants() {
        assert_eq!(<NodeHandle as SlotHandle>::MAX_COUNT, 1 << 20);
        assert_eq!(<NodeHandle as SlotHandle>::MAX_GENERATION, 4095);
        assert_eq!(<LayerHandle as SlotHandle>::MAX_COUNT, 256);
        assert_eq!(<LayerHandle as SlotHandle>::MAX_GENERATION, 255);
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeHandle::pack(3, 1).to_string(), "NodeHandle(0x3, 0x1)");
        assert_eq!(format!("{:?}", AnimatorHandle::NULL), "AnimatorHandle::NULL");
    }

    #[test]
    fn test_handles_cast_to_raw_integers() {
        let handles = [NodeHandle::pack(1, 1), NodeHandle::pack(2, 7)];
        let raw: &[u32] = bytemuck::cast_slice(&handles[..]);
        assert_eq!(raw, &[handles[0].raw(), handles[1].raw()]);
    }

    #[test]
    #[should_panic(expected = "handle index exceeds its bit width")]
    #[cfg(debug_assertions)]
    fn test_index_overflow_asserts() {
        let _ = LayerHandle::pack(256, 1);
    }

    proptest! {
        #[test]
        fn packed_round_trip(index in 0u32..(1 << 20), generation in 0u16..(1 << 12)) {
            let handle = AnimatorDataHandle::pack(index, generation);
            prop_assert_eq!(handle.index(), index);
            prop_assert_eq!(handle.generation(), generation);
        }

        #[test]
        fn narrow_round_trip(index in 0u32..256, generation in 0u16..256) {
            let handle = LayouterHandle::pack(index, generation);
            prop_assert_eq!(handle.unpack(), (index, generation));
        }
    }
}

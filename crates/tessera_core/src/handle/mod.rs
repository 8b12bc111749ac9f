//! # Handles
//!
//! Every stateful subsystem hands out small integer handles instead of
//! references. A handle packs two fields:
//!
//! ```text
//!  MSB                                   LSB
//! ┌────────────────────┬────────────────────┐
//! │     generation     │       index        │
//! └────────────────────┴────────────────────┘
//! ```
//!
//! - **index** selects a slot in the owning [`SlotArena`](crate::SlotArena)
//! - **generation** is bumped every time that slot is recycled, so a stale
//!   handle never compares equal to the slot's current generation
//!
//! The all-zero value is the null handle; generations start at 1, so a
//! zero-initialized slot never aliases a live handle with index 0.
//!
//! Composite handles (`DataHandle`, `AnimationHandle`, `LayoutHandle`) put an
//! owner handle in the upper 32 bits of a `u64` and the owner-local handle in
//! the lower 32. Extracting the local half is a plain truncation.

use std::fmt;

mod composite;
mod packed;

pub use composite::{AnimationHandle, DataHandle, LayoutHandle};
pub use packed::{
    AnimatorDataHandle, AnimatorHandle, LayerDataHandle, LayerHandle, LayouterDataHandle,
    LayouterHandle, NodeHandle,
};

/// A packed `(index, generation)` handle usable as a slot arena key.
///
/// Implemented by every non-composite handle family. The arena derives its
/// maximum slot count and generation wraparound point from the two widths.
pub trait SlotHandle: Copy + Eq + fmt::Debug {
    /// Width of the index field in bits.
    const INDEX_BITS: u32;
    /// Width of the generation field in bits.
    const GENERATION_BITS: u32;
    /// Null handle (all bits zero).
    const NULL: Self;

    /// Largest representable generation. The next increment wraps to zero
    /// and retires the slot.
    const MAX_GENERATION: u16 = ((1u32 << Self::GENERATION_BITS) - 1) as u16;
    /// Number of distinct indices, and so the largest possible slot count.
    const MAX_COUNT: u32 = 1 << Self::INDEX_BITS;

    /// Packs an index and a generation into a handle.
    fn pack(index: u32, generation: u16) -> Self;

    /// Returns the index field.
    fn index(self) -> u32;

    /// Returns the generation field.
    fn generation(self) -> u16;

    /// Returns `true` for the null handle.
    fn is_null(self) -> bool;
}

/// Defines a packed handle newtype over an unsigned integer.
macro_rules! packed_handle {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) { index_bits: $index_bits:expr, generation_bits: $generation_bits:expr }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name($repr);

        const _: () = assert!(
            $index_bits + $generation_bits == <$repr>::BITS,
            "handle fields must fill the storage type exactly"
        );

        impl $name {
            /// Null handle.
            pub const NULL: Self = Self(0);
            /// Width of the index field in bits.
            pub const INDEX_BITS: u32 = $index_bits;
            /// Width of the generation field in bits.
            pub const GENERATION_BITS: u32 = $generation_bits;

            const INDEX_MASK: $repr = ((1u64 << $index_bits) - 1) as $repr;

            /// Packs an index and a generation into a handle.
            ///
            /// Both values must fit their field widths; this is checked in
            /// debug builds only.
            #[inline]
            #[must_use]
            pub const fn pack(index: u32, generation: u16) -> Self {
                debug_assert!(
                    (index as u64) < (1u64 << $index_bits),
                    "handle index exceeds its bit width"
                );
                debug_assert!(
                    (generation as u64) < (1u64 << $generation_bits),
                    "handle generation exceeds its bit width"
                );
                Self(((generation as $repr) << $index_bits) | (index as $repr & Self::INDEX_MASK))
            }

            /// Reinterprets a raw integer as a handle.
            #[inline]
            #[must_use]
            pub const fn from_raw(raw: $repr) -> Self {
                Self(raw)
            }

            /// Returns the raw packed integer.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> $repr {
                self.0
            }

            /// Returns the index field.
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                (self.0 & Self::INDEX_MASK) as u32
            }

            /// Returns the generation field.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u16 {
                (self.0 >> $index_bits) as u16
            }

            /// Splits the handle into its index and generation.
            #[inline]
            #[must_use]
            pub const fn unpack(self) -> (u32, u16) {
                (self.index(), self.generation())
            }

            /// Returns `true` for the null handle.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl SlotHandle for $name {
            const INDEX_BITS: u32 = $index_bits;
            const GENERATION_BITS: u32 = $generation_bits;
            const NULL: Self = Self(0);

            #[inline]
            fn pack(index: u32, generation: u16) -> Self {
                $name::pack(index, generation)
            }

            #[inline]
            fn index(self) -> u32 {
                $name::index(self)
            }

            #[inline]
            fn generation(self) -> u16 {
                $name::generation(self)
            }

            #[inline]
            fn is_null(self) -> bool {
                $name::is_null(self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    f.write_str(concat!(stringify!($name), "::NULL"))
                } else {
                    write!(
                        f,
                        concat!(stringify!($name), "({:#x}, {:#x})"),
                        self.index(),
                        self.generation()
                    )
                }
            }
        }
    };
}

/// Defines a composite `u64` handle made of an owner handle and a local handle.
macro_rules! composite_handle {
    (
        $(#[$meta:meta])*
        $name:ident { outer: $outer:ident, inner: $inner:ident }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name(u64);

        // `local_part()` truncates to the low 32 bits and `outer()` shifts by
        // 32, which is only lossless while both halves fit.
        const _: () = assert!(
            $inner::INDEX_BITS + $inner::GENERATION_BITS <= 32,
            "local handle must fit the low 32 bits of a composite handle"
        );
        const _: () = assert!(
            $outer::INDEX_BITS + $outer::GENERATION_BITS <= 32,
            "owner handle must fit the high 32 bits of a composite handle"
        );

        impl $name {
            /// Null handle.
            pub const NULL: Self = Self(0);

            /// Combines an owner handle and an owner-local handle.
            #[inline]
            #[must_use]
            pub const fn combine(outer: $outer, inner: $inner) -> Self {
                Self(((outer.raw() as u64) << 32) | inner.raw() as u64)
            }

            /// Returns the owner half.
            #[inline]
            #[must_use]
            pub const fn outer(self) -> $outer {
                $outer::from_raw((self.0 >> 32) as _)
            }

            /// Returns the owner-local half by truncating to the low 32 bits.
            #[inline]
            #[must_use]
            pub const fn local_part(self) -> $inner {
                $inner::from_raw(self.0 as u32)
            }

            /// Reinterprets a raw integer as a handle.
            #[inline]
            #[must_use]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw packed integer.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }

            /// Returns `true` for the null handle.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    f.write_str(concat!(stringify!($name), "::NULL"))
                } else {
                    let outer = self.outer();
                    let inner = self.local_part();
                    write!(
                        f,
                        concat!(stringify!($name), "({{{:#x}, {:#x}}}, {{{:#x}, {:#x}}})"),
                        outer.index(),
                        outer.generation(),
                        inner.index(),
                        inner.generation()
                    )
                }
            }
        }
    };
}

pub(crate) use composite_handle;
pub(crate) use packed_handle;

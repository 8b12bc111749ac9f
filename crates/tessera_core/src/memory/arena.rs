//! # Slot Arena
//!
//! Generational slot storage with an intrusive free list.
//!
//! ```text
//!   slots:      0          1          2          3
//!            ┌───────┐  ┌───────┐  ┌───────┐  ┌───────┐
//!            │Used g1│  │Free g2│  │Used g4│  │Free g1│
//!            │ value │  │next ─────────────────►None │
//!            └───────┘  └───────┘  └───────┘  └───────┘
//!                          ▲                      ▲
//!                     first_free              last_free
//! ```
//!
//! `create()` pops from the front of the free list, `remove()` appends to the
//! back. Cycling through every free slot before reusing one spreads
//! generation consumption evenly instead of burning through a single slot's
//! counter.

use std::marker::PhantomData;

use crate::config::ArenaConfig;
use crate::error::{ArenaError, ArenaResult};
use crate::handle::SlotHandle;

/// A single storage cell.
#[derive(Clone, Debug)]
enum Slot<T> {
    /// Holds a live value.
    Used {
        /// Generation of the handle that refers to this value. Never zero.
        generation: u16,
        value: T,
    },
    /// Available, or permanently retired if `generation` is zero.
    Free {
        /// Generation the next handle for this slot will carry.
        generation: u16,
        next: Option<u32>,
    },
}

impl<T> Slot<T> {
    #[inline]
    const fn generation(&self) -> u16 {
        match self {
            Self::Used { generation, .. } | Self::Free { generation, .. } => *generation,
        }
    }
}

/// Recyclable storage keyed by generational handles.
///
/// # Handle lifecycle
///
/// A handle is valid from the `create()` that returned it until the matching
/// `remove()`. The slot is then reused by a later `create()` under the same
/// index with the next generation. When the generation counter would wrap
/// the slot is retired for good, so an outstanding handle from the first
/// lap can never alias a new value.
///
/// # Contract
///
/// `remove()` does not validate its argument in release builds. Every
/// public entry point of an owner is expected to check
/// [`is_valid()`](Self::is_valid) first and assert on failure.
///
/// # Thread Safety
///
/// Not synchronized. Mutate from a single owning thread.
#[derive(Clone, Debug)]
pub struct SlotArena<H, T> {
    slots: Vec<Slot<T>>,
    first_free: Option<u32>,
    last_free: Option<u32>,
    max_capacity: u32,
    _handle: PhantomData<fn() -> H>,
}

impl<H: SlotHandle, T> SlotArena<H, T> {
    /// Creates an empty arena limited only by the handle's index width.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: None,
            last_free: None,
            max_capacity: H::MAX_COUNT,
            _handle: PhantomData,
        }
    }

    /// Creates an empty arena sized according to `config`.
    ///
    /// The slot limit is the smaller of `config.max_capacity` and the
    /// handle's index width.
    #[must_use]
    pub fn with_config(config: &ArenaConfig) -> Self {
        let max_capacity = config
            .max_capacity
            .map_or(H::MAX_COUNT, |max| max.min(H::MAX_COUNT));
        Self {
            slots: Vec::with_capacity(config.initial_capacity.min(max_capacity) as usize),
            first_free: None,
            last_free: None,
            max_capacity,
            _handle: PhantomData,
        }
    }

    /// Returns the number of slots, used or not.
    ///
    /// Parallel per-slot arrays kept by owners have this length.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the maximum number of slots this arena may grow to.
    #[inline]
    #[must_use]
    pub const fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Counts slots holding a live value. O(capacity).
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Used { .. }))
            .count()
    }

    /// Counts slots retired by generation exhaustion. O(capacity).
    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Free { generation: 0, .. }))
            .count()
    }

    /// Counts slots reachable from the free list. O(free list length).
    #[must_use]
    pub fn free_list_len(&self) -> usize {
        let mut len = 0;
        let mut cursor = self.first_free;
        while let Some(index) = cursor {
            len += 1;
            cursor = match self.slots[index as usize] {
                Slot::Free { next, .. } => next,
                Slot::Used { .. } => unreachable!("free list links a used slot {index}"),
            };
        }
        len
    }

    /// Stores `value` and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::CapacityExceeded`] if the free list is empty and
    /// the arena already has [`max_capacity()`](Self::max_capacity) slots.
    pub fn create(&mut self, value: T) -> ArenaResult<H> {
        self.create_with(|_| value)
    }

    /// Stores the value produced by `init`, which receives the handle the
    /// value will live under.
    ///
    /// # Errors
    ///
    /// Same as [`create()`](Self::create). `init` is not called on failure.
    pub fn create_with(&mut self, init: impl FnOnce(H) -> T) -> ArenaResult<H> {
        if let Some(index) = self.first_free {
            let slot = &mut self.slots[index as usize];
            let (generation, next) = match slot {
                Slot::Free { generation, next } => (*generation, *next),
                Slot::Used { .. } => unreachable!("free list head {index} is a used slot"),
            };
            self.first_free = next;
            if next.is_none() {
                self.last_free = None;
            }
            let handle = H::pack(index, generation);
            *slot = Slot::Used {
                generation,
                value: init(handle),
            };
            return Ok(handle);
        }

        if self.slots.len() >= self.max_capacity as usize {
            tracing::warn!(
                capacity = self.max_capacity,
                "slot arena is full, refusing to create"
            );
            return Err(ArenaError::CapacityExceeded {
                capacity: self.max_capacity,
            });
        }

        let index = self.slots.len() as u32;
        let handle = H::pack(index, 1);
        self.slots.push(Slot::Used {
            generation: 1,
            value: init(handle),
        });
        Ok(handle)
    }

    /// Removes the value behind `handle` and returns it.
    ///
    /// The slot's generation is incremented. If that wraps, the slot is
    /// retired and never handed out again; otherwise it is appended to the
    /// free list.
    ///
    /// # Panics
    ///
    /// The handle must be valid. This is a debug assertion only, except that
    /// removing from a slot that is already free always panics.
    pub fn remove(&mut self, handle: H) -> T {
        debug_assert!(
            self.is_valid(handle),
            "SlotArena::remove(): invalid handle {handle:?}"
        );
        let index = handle.index();
        let slot = &mut self.slots[index as usize];
        let generation = match slot {
            Slot::Used { generation, .. } => *generation,
            Slot::Free { .. } => panic!("SlotArena::remove(): slot {index} is already free"),
        };

        let next_generation = generation.wrapping_add(1) & H::MAX_GENERATION;
        let Slot::Used { value, .. } = std::mem::replace(
            slot,
            Slot::Free {
                generation: next_generation,
                next: None,
            },
        ) else {
            unreachable!()
        };

        if next_generation == 0 {
            tracing::debug!(index, "slot generation exhausted, retiring slot");
        } else {
            self.push_free(index);
        }
        value
    }

    /// Checks whether `handle` refers to a live value in this arena.
    ///
    /// The null handle, out-of-range indices, free or retired slots and
    /// generation mismatches are all invalid.
    #[must_use]
    pub fn is_valid(&self, handle: H) -> bool {
        if handle.is_null() {
            return false;
        }
        match self.slots.get(handle.index() as usize) {
            Some(Slot::Used { generation, .. }) => *generation == handle.generation(),
            _ => false,
        }
    }

    /// Returns the value behind `handle`, if the handle is valid.
    #[must_use]
    pub fn get(&self, handle: H) -> Option<&T> {
        match self.slots.get(handle.index() as usize) {
            Some(Slot::Used { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Returns the value behind `handle` mutably, if the handle is valid.
    #[must_use]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        match self.slots.get_mut(handle.index() as usize) {
            Some(Slot::Used { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Returns the handle currently living at `index`, if the slot is used.
    #[must_use]
    pub fn handle_at(&self, index: usize) -> Option<H> {
        match self.slots.get(index) {
            Some(Slot::Used { generation, .. }) => Some(H::pack(index as u32, *generation)),
            _ => None,
        }
    }

    /// Returns the value in the slot at `index`, if the slot is used.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&T> {
        match self.slots.get(index) {
            Some(Slot::Used { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Returns the value in the slot at `index` mutably, if the slot is used.
    #[must_use]
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.slots.get_mut(index) {
            Some(Slot::Used { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Reserves backing storage for at least `additional` more slots.
    ///
    /// Never reserves past [`max_capacity()`](Self::max_capacity). Does not
    /// change [`capacity()`](Self::capacity).
    pub fn reserve(&mut self, additional: usize) {
        let room = (self.max_capacity as usize).saturating_sub(self.slots.len());
        self.slots.reserve(additional.min(room));
    }

    /// Returns the current generation of the slot at `index`.
    ///
    /// For a used slot this is the generation of its live handle; for a free
    /// slot it is the generation its next handle will carry; a retired slot
    /// reports zero.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    #[must_use]
    pub fn generation(&self, index: usize) -> u16 {
        self.slots[index].generation()
    }

    /// Iterates over the generations of every slot.
    ///
    /// Owners hand the collected table to dependents that store handles into
    /// this arena, which then detect stale attachments by comparing
    /// generations.
    pub fn generations(&self) -> impl ExactSizeIterator<Item = u16> + '_ {
        self.slots.iter().map(Slot::generation)
    }

    /// Iterates over all live values with their handles, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match slot {
            Slot::Used { generation, value } => Some((H::pack(index as u32, *generation), value)),
            Slot::Free { .. } => None,
        })
    }

    /// Iterates mutably over all live values with their handles, in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Used { generation, value } => {
                    Some((H::pack(index as u32, *generation), value))
                }
                Slot::Free { .. } => None,
            })
    }

    /// Appends `index` to the tail of the free list.
    fn push_free(&mut self, index: u32) {
        match self.last_free {
            Some(last) => match &mut self.slots[last as usize] {
                Slot::Free { next, .. } => *next = Some(index),
                Slot::Used { .. } => unreachable!("free list tail {last} is a used slot"),
            },
            None => self.first_free = Some(index),
        }
        self.last_free = Some(index);
    }
}

impl<H: SlotHandle, T> Default for SlotArena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

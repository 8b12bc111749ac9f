//! # Bit Set
//!
//! A fixed-length bit view packed 64 slots per word.

/// A growable set of bits addressed by slot index.
///
/// Used for the per-frame "active" and "remove" outputs and for cleanup
/// masks. Bits beyond [`len()`](Self::len) are always zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitSet {
    /// 1 = set, 0 = clear. 64 slots per u64.
    words: Vec<u64>,
    /// Length in bits.
    len: usize,
}

impl BitSet {
    /// Creates a bit set of `len` cleared bits.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Returns the length in bits.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set has zero length.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Changes the length. Newly exposed bits are cleared.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(len.div_ceil(64), 0);
        self.len = len;
        let tail = len % 64;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "BitSet: index {index} out of range for length {}", self.len);
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "BitSet: index {index} out of range for length {}", self.len);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    /// Clears the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        assert!(index < self.len, "BitSet: index {index} out of range for length {}", self.len);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Clears all bits without changing the length.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Returns `true` if any bit is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.words.iter().any(|&word| word != 0)
    }

    /// Counts the set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates over the indices of set bits in increasing order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| SetBits { word, base: word_index * 64 })
    }
}

/// Iterator over the set bits of a single word.
struct SetBits {
    word: u64,
    base: usize,
}

impl Iterator for SetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros() as usize;
        // Clear lowest set bit
        self.word &= self.word - 1;
        Some(self.base + bit)
    }
}

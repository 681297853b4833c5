//! Immutable rank/select bitmap.
//!
//! A thin wrapper over [`vers_vecs::RsVec`], the succinct rank/select
//! structure wavelet matrices and multi-document end-marker flags build
//! on top of.
use serde::{Deserialize, Serialize};
use vers_vecs::{BitVec, RsVec};

/// An immutable bit vector supporting O(1) `rank` and `select` once built.
///
/// Built once via [`RsBitVecBuilder`], then frozen: the rank/select index is
/// computed at construction time and the result is read-only and shareable
/// across threads.
#[derive(Serialize, Deserialize, Clone)]
pub struct RsBitVec {
    inner: RsVec,
}

impl RsBitVec {
    /// Number of 1-bits in `[0, i)`.
    pub fn rank(&self, i: u64) -> u64 {
        if i >= self.inner.len() as u64 {
            return self.inner.rank1(self.inner.len());
        }
        self.inner.rank1(i as usize) as u64
    }

    /// Position of the `k`-th 1-bit (1-indexed, i.e. `select(1)` is the
    /// first 1-bit). Returns the vector's length if `k` exceeds the number
    /// of 1-bits, mirroring `sdsl`'s out-of-range `select` behavior that the
    /// original bitvector wrappers rely on (`rle_window_array.hpp`'s
    /// `run_starts_select`/`run_ends_select`).
    pub fn select(&self, k: u64) -> u64 {
        if k == 0 || k > self.inner.rank1(self.inner.len()) as u64 {
            return self.inner.len() as u64;
        }
        self.inner.select1((k - 1) as usize) as u64
    }

    pub fn get(&self, i: u64) -> bool {
        self.inner.get_bit(i as usize) == 1
    }

    pub fn len(&self) -> u64 {
        self.inner.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    pub fn count_ones(&self) -> u64 {
        self.inner.rank1(self.inner.len()) as u64
    }
}

/// Builder for an [`RsBitVec`]: set bits, then freeze.
pub struct RsBitVecBuilder {
    bits: BitVec,
}

impl RsBitVecBuilder {
    pub fn new(len: u64) -> Self {
        RsBitVecBuilder {
            bits: BitVec::from_zeros(len as usize),
        }
    }

    pub fn set(&mut self, i: u64, v: bool) {
        self.bits.set(i as usize, v as u64).expect("index in bounds");
    }

    pub fn len(&self) -> u64 {
        self.bits.len() as u64
    }

    pub fn finish(self) -> RsBitVec {
        RsBitVec {
            inner: RsVec::from_bit_vec(self.bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_select_roundtrip() {
        let mut b = RsBitVecBuilder::new(16);
        for &i in &[1u64, 3, 4, 9, 15] {
            b.set(i, true);
        }
        let bv = b.finish();
        assert_eq!(bv.count_ones(), 5);
        assert_eq!(bv.rank(0), 0);
        assert_eq!(bv.rank(2), 1);
        assert_eq!(bv.rank(4), 2);
        assert_eq!(bv.rank(5), 3);
        assert_eq!(bv.select(1), 1);
        assert_eq!(bv.select(2), 3);
        assert_eq!(bv.select(5), 15);
    }

    #[test]
    fn get_reflects_set_bits() {
        let mut b = RsBitVecBuilder::new(8);
        b.set(2, true);
        b.set(5, true);
        let bv = b.finish();
        for i in 0..8u64 {
            assert_eq!(bv.get(i), i == 2 || i == 5);
        }
    }
}

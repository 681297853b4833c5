//! Run-length-encoded storage for [`super::MarkerRun`]s: each run is
//! recorded once regardless of how many positions it spans, and lookups
//! by position use rank/select over bitmaps marking run boundaries.
use std::collections::HashSet;

use crate::bitvec::{RsBitVec, RsBitVecBuilder};
use crate::error::{PfbwtError, Result};
use crate::marker::{MarkerRun, MarkerT};

/// A position-indexed, run-length-compressed array of marker sets.
pub struct RleWindowArray {
    run_starts: RsBitVec,
    run_ends: RsBitVec,
    arr_idxs: RsBitVec,
    arr: Vec<MarkerT>,
}

impl RleWindowArray {
    pub fn build(runs: &[MarkerRun]) -> Result<Self> {
        let mut starts_seen = HashSet::new();
        let mut ends_seen = HashSet::new();
        let mut max_end = 0u64;
        for r in runs {
            if !starts_seen.insert(r.start) {
                return Err(PfbwtError::DegenerateRun { at: r.start });
            }
            if !ends_seen.insert(r.end) {
                return Err(PfbwtError::DegenerateRun { at: r.end });
            }
            max_end = max_end.max(r.end);
        }
        let n = max_end + 2;
        let mut starts_b = RsBitVecBuilder::new(n);
        let mut ends_b = RsBitVecBuilder::new(n);
        for r in runs {
            starts_b.set(r.start, true);
            ends_b.set(r.end, true);
        }

        let total: u64 = runs.iter().map(|r| r.markers.len() as u64).sum();
        let mut idxs_b = RsBitVecBuilder::new(total.max(1));
        let mut arr = Vec::with_capacity(total as usize);
        let mut off = 0u64;
        for r in runs {
            if off < idxs_b.len() {
                idxs_b.set(off, true);
            }
            off += r.markers.len() as u64;
            arr.extend_from_slice(&r.markers);
        }

        Ok(RleWindowArray {
            run_starts: starts_b.finish(),
            run_ends: ends_b.finish(),
            arr_idxs: idxs_b.finish(),
            arr,
        })
    }

    /// Whether position `i` falls inside some recorded run.
    pub fn has_entry(&self, i: u64) -> bool {
        self.run_starts.rank(i + 1) == self.run_ends.rank(i) + 1
    }

    /// Markers covering position `i`, or an empty vec if none.
    pub fn at(&self, i: u64) -> Vec<MarkerT> {
        let srank = self.run_starts.rank(i + 1);
        let erank = self.run_ends.rank(i);
        if srank != erank + 1 {
            return Vec::new();
        }
        self.arr_at(srank - 1)
    }

    /// Markers covering every run overlapping `[s, e]`, concatenated in
    /// run order.
    pub fn at_range(&self, s: u64, e: u64) -> Vec<MarkerT> {
        let s_rank = self.run_starts.rank(s + 1);
        let e_rank = self.run_ends.rank(e);
        if s_rank == 0 || e_rank < s_rank.saturating_sub(1) {
            return Vec::new();
        }
        let mut out = Vec::new();
        for r in (s_rank - 1)..e_rank {
            out.extend(self.arr_at(r));
        }
        out
    }

    fn arr_at(&self, run_idx: u64) -> Vec<MarkerT> {
        let start = self.arr_idxs.select(run_idx + 1);
        let end = self.arr_idxs.select(run_idx + 2);
        let end = if end >= self.arr_idxs.len() {
            self.arr.len() as u64
        } else {
            end
        };
        self.arr[start as usize..end as usize].to_vec()
    }

    pub fn num_runs(&self) -> u64 {
        self.run_starts.count_ones()
    }
}

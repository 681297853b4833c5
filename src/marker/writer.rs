//! Collapses a stream of per-position variant-genotype observations into
//! runs of consecutive positions sharing the same window-of-`w` marker
//! set, so adjacent positions whose nearby variants never change don't
//! each need their own entry.
use std::collections::VecDeque;

use crate::error::{PfbwtError, Result};
use crate::marker::{create_marker, MarkerObservation, MarkerRun, MarkerT};

/// Accumulates observations from [`MarkerPositionsWriter::update`] for a
/// single sequence at a time; call [`MarkerPositionsWriter::finish_sequence`]
/// between sequences.
pub struct MarkerPositionsWriter {
    wsize: u64,
    seqid: Option<u64>,
    tpos: u64,
    queue: VecDeque<MarkerObservation>,
    pending_markers: Vec<MarkerT>,
    range: (u64, u64),
    runs: Vec<MarkerRun>,
}

impl MarkerPositionsWriter {
    pub fn new(wsize: u64) -> Self {
        MarkerPositionsWriter {
            wsize,
            seqid: None,
            tpos: 0,
            queue: VecDeque::new(),
            pending_markers: Vec::new(),
            range: (0, 0),
            runs: Vec::new(),
        }
    }

    /// Record one variant-genotype observation: `pos` is the text
    /// position, `recpos` the reference position the variant record is
    /// anchored to, `gt` the sample's genotype/allele index, `seqid` the
    /// source sequence id.
    pub fn update(&mut self, pos: u64, recpos: u64, gt: u64, seqid: u64) -> Result<()> {
        if let Some(prev) = self.seqid {
            if prev != seqid {
                return Err(PfbwtError::MalformedMarkerStream(
                    "sequence changed without calling finish_sequence()".into(),
                ));
            }
        }
        while let Some(front) = self.queue.front() {
            if front.textpos + self.wsize <= pos {
                self.process_run()?;
                self.queue.pop_front();
            } else {
                break;
            }
        }
        self.queue.push_back(MarkerObservation {
            textpos: pos,
            refpos: recpos,
            allele: gt,
            seqid,
        });
        self.seqid = Some(seqid);
        Ok(())
    }

    /// Flush any pending window and take ownership of every run written
    /// for the sequence just finished.
    pub fn finish_sequence(&mut self) -> Result<Vec<MarkerRun>> {
        self.process_run()?;
        self.queue.clear();
        if !self.pending_markers.is_empty() {
            self.runs.push(MarkerRun {
                start: self.range.0,
                end: self.range.1,
                markers: std::mem::take(&mut self.pending_markers),
            });
        }
        self.range = (0, 0);
        self.seqid = None;
        Ok(std::mem::take(&mut self.runs))
    }

    fn process_run(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let front_pos = self.queue.front().unwrap().textpos;
        if self.tpos + self.wsize <= front_pos {
            self.tpos = front_pos + 1 - self.wsize;
        }
        let items: Vec<MarkerObservation> = self.queue.iter().copied().collect();
        for (idx, obs) in items.iter().enumerate() {
            if self.tpos + self.wsize <= obs.textpos {
                let end = obs.textpos - self.wsize;
                self.write_markers(self.tpos, end, &items[..idx])?;
                self.tpos = end + 1;
            }
        }
        let end = front_pos;
        self.write_markers(self.tpos, end, &items)?;
        self.tpos = end + 1;
        Ok(())
    }

    fn write_markers(&mut self, start: u64, end: u64, obs: &[MarkerObservation]) -> Result<()> {
        let mut markers = Vec::new();
        let mut prev: Option<MarkerT> = None;
        for o in obs {
            let x = create_marker(o.refpos, o.allele, o.seqid)?;
            if prev != Some(x) {
                markers.push(x);
            }
            prev = Some(x);
        }
        if start == self.range.1 + 1 && markers == self.pending_markers {
            self.range.1 = end;
        } else {
            if !self.pending_markers.is_empty() {
                self.runs.push(MarkerRun {
                    start: self.range.0,
                    end: self.range.1,
                    markers: std::mem::take(&mut self.pending_markers),
                });
            }
            self.range = (start, end);
            self.pending_markers = markers;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A single SNP at reference position 100 observed across a window of
    /// text positions should produce one run spanning the window.
    #[test]
    fn single_snp_produces_one_run() {
        let mut w = MarkerPositionsWriter::new(4);
        for pos in 0..8u64 {
            w.update(pos, 100, 1, 0).unwrap();
        }
        let runs = w.finish_sequence().unwrap();
        assert!(!runs.is_empty());
        for r in &runs {
            assert_eq!(r.markers.len(), 1);
        }
    }

    /// Two SNPs close enough to share a window should appear together in
    /// at least one run's marker set.
    #[test]
    fn two_nearby_snps_share_a_run() {
        let mut w = MarkerPositionsWriter::new(6);
        w.update(0, 100, 1, 0).unwrap();
        w.update(3, 103, 1, 0).unwrap();
        for pos in 4..10u64 {
            w.update(pos, 100 + pos, 1, 0).unwrap();
        }
        let runs = w.finish_sequence().unwrap();
        assert!(runs.iter().any(|r| r.markers.len() >= 2));
    }

    #[test]
    fn rejects_seqid_change_without_finish() {
        let mut w = MarkerPositionsWriter::new(4);
        w.update(0, 100, 1, 0).unwrap();
        assert!(w.update(1, 101, 1, 1).is_err());
    }
}

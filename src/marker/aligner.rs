//! Reorders window-position marker runs into suffix-array order, and
//! merges per-reference marker streams into one coordinate space.
use crate::marker::MarkerRun;

/// Walks `sa` in order and re-groups [`RleWindowArray`](super::rle::RleWindowArray)
/// lookups into runs of consecutive SA ranks sharing the same marker set.
pub fn align_to_sa_order(mai: &super::rle::RleWindowArray, sa: &[u64]) -> Vec<MarkerRun> {
    let mut runs = Vec::new();
    let mut pending: Vec<u64> = Vec::new();
    let mut locs: (u64, u64) = (0, 0);
    let mut have_pending = false;

    for (rank, &s) in sa.iter().enumerate() {
        let markers = mai.at(s);
        if have_pending && markers == pending {
            locs.1 = rank as u64;
            continue;
        }
        if have_pending && !pending.is_empty() {
            runs.push(MarkerRun {
                start: locs.0,
                end: locs.1,
                markers: pending.clone(),
            });
        }
        pending = markers;
        locs = (rank as u64, rank as u64);
        have_pending = true;
    }
    if have_pending && !pending.is_empty() {
        runs.push(MarkerRun {
            start: locs.0,
            end: locs.1,
            markers: pending,
        });
    }
    runs
}

/// Concatenates per-reference marker-run streams into a single
/// coordinate space, per §4.6: `bias_k = Σ_{j<k}(Lⱼ + w) − cumulative
/// indel length adjustment`. `ref_length` is the shared reference
/// contig length `L`; `w` is the parser's window width (the `w` `'A'`s
/// the parser inserts between concatenated sequences); `stream_lengths[k]`
/// is the actual haplotype-edited text length of stream `k`, so
/// `stream_lengths[k] as i64 - ref_length as i64` is that stream's net
/// insertion (positive) or deletion (negative) length. Marker values
/// themselves are left untouched (the packed `seqid` already
/// disambiguates); only run boundaries are rebased.
pub fn merge_streams(
    streams: &[Vec<MarkerRun>],
    ref_length: u64,
    w: u64,
    stream_lengths: &[u64],
) -> Vec<MarkerRun> {
    let mut out = Vec::new();
    let mut bias: i64 = 0;
    for (k, stream) in streams.iter().enumerate() {
        for r in stream {
            out.push(MarkerRun {
                start: (r.start as i64 + bias) as u64,
                end: (r.end as i64 + bias) as u64,
                markers: r.markers.clone(),
            });
        }
        let indel = stream_lengths[k] as i64 - ref_length as i64;
        bias += ref_length as i64 + w as i64 + indel;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::rle::RleWindowArray;

    #[test]
    fn align_groups_equal_neighbors() {
        let runs = vec![
            MarkerRun {
                start: 0,
                end: 2,
                markers: vec![7],
            },
            MarkerRun {
                start: 3,
                end: 5,
                markers: vec![9],
            },
        ];
        let mai = RleWindowArray::build(&runs).unwrap();
        let sa = vec![0, 1, 2, 3, 4, 5];
        let aligned = align_to_sa_order(&mai, &sa);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].markers, vec![7]);
        assert_eq!(aligned[1].markers, vec![9]);
    }

    #[test]
    fn merge_offsets_by_reference_and_window() {
        let stream_a = vec![MarkerRun {
            start: 0,
            end: 4,
            markers: vec![1],
        }];
        let stream_b = vec![MarkerRun {
            start: 0,
            end: 4,
            markers: vec![2],
        }];
        // Neither haplotype carries an indel: bias is exactly L + w.
        let merged = merge_streams(&[stream_a, stream_b], 100, 10, &[100, 100]);
        assert_eq!(merged[0].start, 0);
        assert_eq!(merged[1].start, 110);
    }
}

//! SA-IS implementation over an integer alphabet, generalized from the
//! byte-alphabet construction in
//!    Ge Nong, Sen Zhang, & Wai Hong Chan. (2010). Two Efficient Algorithms
//!    for Linear Time Suffix Array Construction. IEEE Transactions on
//!    Computers, 60(10), 1471-1484. <https://doi.org/10.1109/tc.2010.188>
//!
//! `text` must end with a single symbol `0` that does not occur elsewhere,
//! acting as the unique smallest terminator the induced-sort steps rely on.
use vers_vecs::BitVec;

pub fn count_chars(text: &[u64], alphabet_size: usize) -> Vec<usize> {
    let mut occs = vec![0; alphabet_size];
    for &c in text {
        occs[c as usize] += 1;
    }
    occs
}

pub fn get_bucket_start_pos(occs: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    let mut buckets = vec![0; occs.len()];
    for (&occ, b) in occs.iter().zip(buckets.iter_mut()) {
        *b = sum;
        sum += occ;
    }
    buckets
}

pub fn get_bucket_end_pos(occs: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    let mut buckets = vec![0; occs.len()];
    for (&occ, b) in occs.iter().zip(buckets.iter_mut()) {
        sum += occ;
        *b = sum;
    }
    buckets
}

fn get_types(text: &[u64]) -> (BitVec, Vec<usize>) {
    let n = text.len();
    let mut types = BitVec::from_zeros(n);
    types.set(n - 1, 1).unwrap();

    if n == 1 {
        return (types, vec![]);
    }

    let mut lms = vec![n - 1];
    let mut prev_is_s_type = false;
    for i in (0..(n - 1)).rev() {
        let is_s_type =
            text[i] < text[i + 1] || (text[i] == text[i + 1] && prev_is_s_type);
        if is_s_type {
            types.set(i, 1).unwrap();
        } else if prev_is_s_type {
            lms.push(i + 1);
        }
        prev_is_s_type = is_s_type;
    }
    (types, lms)
}

fn is_lms(types: &BitVec, i: usize) -> bool {
    i > 0
        && i < usize::MAX
        && types.is_bit_set(i).unwrap()
        && !types.is_bit_set(i - 1).unwrap()
}

fn induced_sort(text: &[u64], types: &BitVec, occs: &[usize], sa: &mut [usize]) {
    let n = text.len();
    let mut bucket_start_pos = get_bucket_start_pos(occs);
    for i in 0..n {
        let j = sa[i];
        if 0 < j && j < usize::MAX && !types.is_bit_set(j - 1).unwrap() {
            let c = text[j - 1] as usize;
            let p = bucket_start_pos[c];
            sa[p] = j - 1;
            bucket_start_pos[c] += 1;
        }
    }

    let mut bucket_end_pos = get_bucket_end_pos(occs);
    for i in (0..n).rev() {
        let j = sa[i];
        if j != 0 && j != usize::MAX && types.is_bit_set(j - 1).unwrap() {
            let c = text[j - 1] as usize;
            let p = bucket_end_pos[c] - 1;
            sa[p] = j - 1;
            bucket_end_pos[c] -= 1;
        }
    }
}

/// Build the suffix array of `text` over an alphabet of size
/// `alphabet_size` (symbol values must lie in `0..alphabet_size`). `text`
/// must end in exactly one `0` symbol acting as the unique terminator.
pub fn build_suffix_array(text: &[u64], alphabet_size: usize) -> Vec<usize> {
    let n = text.len();
    match n {
        0 => vec![],
        1 => vec![0],
        _ => {
            debug_assert_eq!(
                text.iter().rposition(|&c| c != 0),
                Some(n - 2),
                "text must end with a single 0 terminator"
            );
            let mut sa = vec![usize::MAX; n];
            sais_sub(text, &mut sa, alphabet_size);
            sa
        }
    }
}

#[allow(clippy::cognitive_complexity)]
fn sais_sub(text: &[u64], sa: &mut [usize], alphabet_size: usize) {
    let n = text.len();
    let (types, lms) = get_types(text);
    let lms_len = lms.len();
    let occs = count_chars(text, alphabet_size);

    let mut bucket_end_pos = get_bucket_end_pos(&occs);
    for &i in lms.iter().rev() {
        let c = text[i] as usize;
        let k = bucket_end_pos[c] - 1;
        sa[k] = i;
        bucket_end_pos[c] = k;
    }

    induced_sort(text, &types, &occs, sa);

    let mut k = 0;
    for i in 0..n {
        let p = sa[i];
        if is_lms(&types, p) {
            sa[k] = p;
            k += 1;
            if k == lms_len {
                break;
            }
        }
    }

    let mut name = 1usize;
    {
        let (sa_lms, names) = sa.split_at_mut(lms_len);
        for n in names.iter_mut() {
            *n = usize::MAX;
        }
        names[sa_lms[0] / 2] = 0;
        if lms_len <= 1 {
            debug_assert!(lms_len != 0);
        } else {
            names[sa_lms[1] / 2] = 1;
            for i in 2..lms_len {
                let p = sa_lms[i - 1];
                let q = sa_lms[i];
                let mut d = 1;
                let mut same =
                    text[p] == text[q] && types.is_bit_set(p).unwrap() == types.is_bit_set(q).unwrap();
                while same {
                    if text[p + d] != text[q + d]
                        || types.is_bit_set(p + d).unwrap() != types.is_bit_set(q + d).unwrap()
                    {
                        same = false;
                        break;
                    } else if is_lms(&types, p + d) && is_lms(&types, q + d) {
                        break;
                    }
                    d += 1;
                }
                if !same {
                    name += 1;
                }
                names[q / 2] = name;
            }
        }
        for s in sa_lms.iter_mut() {
            *s = usize::MAX;
        }
    }
    let mut i = sa.len() - 1;
    let mut j = 0;
    while j < lms_len {
        if sa[i] < usize::MAX {
            sa[sa.len() - 1 - j] = sa[i];
            j += 1;
        }
        i -= 1;
    }

    {
        let (sa1, s1) = sa.split_at_mut(sa.len() - lms_len);
        if name < lms_len {
            let s1_u64: Vec<u64> = s1.iter().map(|&v| v as u64).collect();
            let sub_sa = build_suffix_array(&s1_u64, name + 1);
            sa1.copy_from_slice(&sub_sa);
        } else {
            for (i, &s) in s1.iter().enumerate() {
                sa1[s] = i;
            }
        }

        let p1 = s1;
        for (j, i) in lms.into_iter().rev().enumerate() {
            p1[j] = i;
        }

        for i in 0..lms_len {
            sa1[i] = p1[sa1[i]];
        }
    }

    for i in &mut sa[lms_len..] {
        *i = usize::MAX;
    }

    let mut bucket_end_pos = get_bucket_end_pos(&occs);
    for i in (0..lms_len).rev() {
        let j = sa[i];
        sa[i] = usize::MAX;
        let c = if j == n { 0 } else { text[j] as usize };
        let k = bucket_end_pos[c] - 1;
        sa[k] = j;
        bucket_end_pos[c] = k;
    }
    induced_sort(text, &types, &occs, sa);
}

/// Kasai's algorithm: LCP array from a text and its suffix array, in
/// O(n). `lcp[0]` is always 0 by convention (no predecessor in SA order).
pub fn kasai_lcp(text: &[u64], sa: &[usize]) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return vec![];
    }
    let mut rank = vec![0usize; n];
    for (i, &s) in sa.iter().enumerate() {
        rank[s] = i;
    }
    let mut lcp = vec![0usize; n];
    let mut h = 0usize;
    for i in 0..n {
        if rank[i] > 0 {
            let j = sa[rank[i] - 1];
            while i + h < n && j + h < n && text[i + h] == text[j + h] {
                h += 1;
            }
            lcp[rank[i]] = h;
            if h > 0 {
                h -= 1;
            }
        } else {
            h = 0;
        }
    }
    lcp
}

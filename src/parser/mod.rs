//! Prefix-free parsing: turns a stream of sequences into a dictionary of
//! distinct phrases plus a parse (the sequence of phrase occurrences), via
//! a rolling hash that triggers a phrase boundary whenever the hash of the
//! last `w` bytes is `0 mod p`.
pub mod ntab;

use std::collections::BTreeMap;
use std::fmt;

use crate::collab::SequenceSource;
use crate::error::{PfbwtError, Result};
use crate::hash::{KarpRabinHash, RollingHash};
use crate::sentinel::DOLLAR;

/// Word width used for phrase ranks, parse positions and occurrence
/// counts. `u32` halves memory use for inputs with under ~4 billion
/// phrases; `u64` lifts the ceiling entirely. Bounded on
/// [`num_traits::Unsigned`] so a future caller can lean on the wider
/// `num-traits` surface (`Zero`, `One`, checked arithmetic) without
/// widening this trait.
pub trait PfpUint:
    Copy + Clone + Eq + Ord + fmt::Debug + Default + num_traits::Unsigned + 'static
{
    const MAX_PHRASES: u64;
    fn from_u64(v: u64) -> Self;
    fn to_u64(self) -> u64;
}

macro_rules! impl_pfp_uint {
    ($t:ty) => {
        impl PfpUint for $t {
            const MAX_PHRASES: u64 = <$t>::MAX as u64 - 1;
            fn from_u64(v: u64) -> Self {
                v as $t
            }
            fn to_u64(self) -> u64 {
                self as u64
            }
        }
    };
}
impl_pfp_uint!(u32);
impl_pfp_uint!(u64);

/// Parser configuration. `w` is the window width the rolling hash walks;
/// `p` is the modulus a hash of `0` mod `p` must satisfy to trigger a
/// phrase boundary.
#[derive(Debug, Clone, Copy)]
pub struct PfParserParams {
    pub w: usize,
    pub p: usize,
    pub get_sai: bool,
    pub store_docs: bool,
    /// If both this and `non_acgt_to_a` are set, `trim_non_acgt` wins.
    pub trim_non_acgt: bool,
    pub non_acgt_to_a: bool,
}

impl Default for PfParserParams {
    fn default() -> Self {
        PfParserParams {
            w: 10,
            p: 100,
            get_sai: false,
            store_docs: false,
            trim_non_acgt: false,
            non_acgt_to_a: false,
        }
    }
}

impl PfParserParams {
    pub fn validate(&self) -> Result<()> {
        if self.w < 4 || self.w > 31 {
            return Err(PfbwtError::InvalidWindowSize(self.w));
        }
        if self.p < 4 {
            return Err(PfbwtError::InvalidModulus(self.p));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Freq<U> {
    n: u64,
    r: U,
}

/// Parses one or more sequences into a phrase dictionary and parse.
///
/// `U` is the word width of ranks/occurrence counts in the finished
/// dictionary; pick `u32` unless the input is expected to produce more
/// than ~4 billion distinct phrases.
#[derive(Clone)]
pub struct PfParser<U: PfpUint = u64> {
    params: PfParserParams,
    freqs: BTreeMap<Vec<u8>, Freq<U>>,
    parse: Vec<Vec<u8>>,
    parse_ranks: Vec<U>,
    sorted_phrases: Vec<Vec<u8>>,
    last: Vec<u8>,
    sai: Vec<u64>,
    doc_starts: Vec<u64>,
    doc_names: Vec<String>,
    ntab: Vec<ntab::NtabEntry>,
    pos: u64,
    pending_phrase: Vec<u8>,
    nseqs: usize,
}

impl<U: PfpUint> PfParser<U> {
    pub fn new(params: PfParserParams) -> Result<Self> {
        params.validate()?;
        if params.trim_non_acgt && params.non_acgt_to_a {
            return Err(PfbwtError::ConflictingNonAcgtModes);
        }
        Ok(PfParser {
            params,
            freqs: BTreeMap::new(),
            parse: Vec::new(),
            parse_ranks: Vec::new(),
            sorted_phrases: Vec::new(),
            last: Vec::new(),
            sai: Vec::new(),
            doc_starts: Vec::new(),
            doc_names: Vec::new(),
            ntab: Vec::new(),
            pos: 0,
            pending_phrase: Vec::new(),
            nseqs: 0,
        })
    }

    pub fn params(&self) -> &PfParserParams {
        &self.params
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Length of the text this parser has consumed, including the `w`
    /// trailing `A`s appended after each sequence but excluding the final
    /// run of Dollar sentinels.
    pub fn text_len(&self) -> u64 {
        self.pos.saturating_sub(self.params.w as u64)
    }

    pub fn doc_starts(&self) -> &[u64] {
        &self.doc_starts
    }

    pub fn doc_names(&self) -> &[String] {
        &self.doc_names
    }

    pub fn ntab(&self) -> &[ntab::NtabEntry] {
        &self.ntab
    }

    pub fn parse_len(&self) -> usize {
        self.parse.len()
    }

    pub fn parse_ranks(&self) -> &[U] {
        &self.parse_ranks
    }

    pub fn sorted_phrases(&self) -> &[Vec<u8>] {
        &self.sorted_phrases
    }

    pub fn last(&self) -> &[u8] {
        &self.last
    }

    pub fn sai(&self) -> &[u64] {
        &self.sai
    }

    /// Consume every sequence a [`SequenceSource`] yields.
    pub fn ingest<S: SequenceSource>(&mut self, src: &mut S) -> Result<()> {
        let seqs: Vec<(String, Vec<u8>)> = src.sequences().collect();
        for (name, bases) in seqs {
            self.add_sequence(&name, &bases)?;
        }
        Ok(())
    }

    /// Feed one named sequence (its bases need not be pre-validated ACGT).
    pub fn add_sequence(&mut self, name: &str, bases: &[u8]) -> Result<()> {
        self.nseqs += 1;
        if self.params.store_docs {
            let prior_docs = self.doc_starts.len() as u64;
            let start = self
                .pos
                .saturating_sub(1)
                .saturating_sub(self.params.w as u64 * prior_docs);
            self.doc_starts.push(start);
            self.doc_names.push(name.to_string());
        }

        let mut phrase = std::mem::take(&mut self.pending_phrase);
        if self.pos == 0 {
            phrase.push(DOLLAR);
            self.pos += 1;
        }

        let mut hasher = KarpRabinHash::new(self.params.w);
        let mut ne = ntab::NtabEntry::default();
        let mut pc: u8 = b'A';
        let total = bases.len() + self.params.w;
        let mut last_c = b'A';
        for i in 0..total {
            let mut c = if i < bases.len() {
                bases[i].to_ascii_uppercase()
            } else {
                b'A'
            };
            if self.params.trim_non_acgt {
                if ntab::update_ntab(pc, c, &mut ne, self.pos, &mut self.ntab) {
                    pc = c;
                    continue;
                }
            } else if self.params.non_acgt_to_a && !ntab::is_acgt(c) {
                c = b'A';
            }
            phrase.push(c);
            let h = hasher.update(c);
            if self.pos > self.params.w as u64 && h % self.params.p as u64 == 0 {
                self.process_phrase(&phrase)?;
                let keep_from = phrase.len() - self.params.w;
                phrase.drain(0..keep_from);
            }
            self.pos += 1;
            pc = c;
            last_c = c;
        }
        if self.params.trim_non_acgt && !ntab::is_acgt(last_c) {
            self.ntab.push(ne);
        }
        self.pending_phrase = phrase;
        Ok(())
    }

    fn process_phrase(&mut self, phrase: &[u8]) -> Result<()> {
        let entry = self.freqs.entry(phrase.to_vec()).or_default();
        entry.n += 1;
        if entry.n > U::MAX_PHRASES {
            return Err(PfbwtError::TooManyPhrases {
                count: entry.n,
                limit: U::MAX_PHRASES,
            });
        }
        self.parse.push(phrase.to_vec());
        self.last.push(phrase[phrase.len() - self.params.w - 1]);
        if self.params.get_sai {
            self.sai.push(self.pos);
        }
        Ok(())
    }

    /// Sort the dictionary, assign ranks, and recompute the parse's rank
    /// sequence. Appends `w` Dollar sentinels to the pending phrase first
    /// if it doesn't already end in one, closing the parse for good.
    pub fn finalize(&mut self) -> Result<()> {
        if self.pending_phrase.last() != Some(&DOLLAR) {
            for _ in 0..self.params.w {
                self.pending_phrase.push(DOLLAR);
            }
            self.pos += self.params.w as u64 - 1;
            let phrase = std::mem::take(&mut self.pending_phrase);
            self.process_phrase(&phrase)?;
        }
        if self.freqs.len() < 2 {
            return Err(PfbwtError::DictionaryTooSmall(self.freqs.len()));
        }
        self.sort_dict();
        self.generate_ranks();
        debug_assert_eq!(
            self.freqs.values().map(|f| f.n).sum::<u64>(),
            self.parse.len() as u64,
            "sum(occ) must equal the number of parsed phrases"
        );
        Ok(())
    }

    fn sort_dict(&mut self) {
        self.sorted_phrases = self.freqs.keys().cloned().collect();
    }

    fn generate_ranks(&mut self) {
        if self.sorted_phrases.is_empty() && !self.freqs.is_empty() {
            self.sort_dict();
        }
        for (rank, phrase) in self.sorted_phrases.iter().enumerate() {
            if let Some(f) = self.freqs.get_mut(phrase) {
                f.r = U::from_u64(rank as u64 + 1);
            }
        }
        self.parse_ranks = self
            .parse
            .iter()
            .map(|phrase| self.freqs.get(phrase).expect("phrase must be in dict").r)
            .collect();
    }

    /// Occurrence counts, in dictionary (sorted) order.
    pub fn occurrences(&self) -> Vec<U> {
        self.sorted_phrases
            .iter()
            .map(|p| U::from_u64(self.freqs.get(p).unwrap().n))
            .collect()
    }

    /// Append another parser's parse onto this one's, re-hashing across
    /// the boundary so no phrase is lost or duplicated. Call
    /// [`PfParser::finalize`] afterward.
    pub fn merge_from(&mut self, rhs: &Self) -> Result<()> {
        if self.freqs.is_empty() {
            *self = rhs.clone();
            return Ok(());
        }
        if rhs.params.w != self.params.w {
            return Err(PfbwtError::IncompatibleMerge { field: "w" });
        }
        if rhs.params.p != self.params.p {
            return Err(PfbwtError::IncompatibleMerge { field: "p" });
        }

        let mut phrase = self
            .parse
            .last()
            .cloned()
            .ok_or(PfbwtError::DictionaryTooSmall(0))?;
        match self.freqs.get_mut(&phrase) {
            Some(f) => {
                if f.n > 0 {
                    f.n -= 1;
                }
                if f.n == 0 {
                    self.freqs.remove(&phrase);
                }
            }
            None => return Err(PfbwtError::PhraseNotInDictionary),
        }
        if phrase.last() == Some(&DOLLAR) {
            let new_len = phrase.len() - self.params.w;
            phrase.truncate(new_len);
            self.pos -= self.params.w as u64;
        }
        self.parse.pop();
        self.last.pop();
        if self.params.get_sai {
            self.sai.pop();
        }

        let rhs_first = rhs
            .parse
            .first()
            .ok_or(PfbwtError::DictionaryTooSmall(0))?
            .clone();
        if rhs_first.first() != Some(&DOLLAR) {
            return Err(PfbwtError::IncompatibleMerge {
                field: "rhs leading phrase (missing Dollar)",
            });
        }

        let mut hasher = KarpRabinHash::new(self.params.w);
        for _ in 0..self.params.w {
            hasher.update(b'A');
        }
        let window = &rhs_first[1..1 + self.params.w];
        for &c in window {
            phrase.push(c);
            let h = hasher.update(c);
            if h % self.params.p as u64 == 0 {
                self.pos += 1;
                self.process_phrase(&phrase)?;
                let keep_from = phrase.len() - self.params.w;
                phrase.drain(0..keep_from);
                self.pos -= 1;
            }
            self.pos += 1;
        }
        phrase.extend_from_slice(&rhs_first[self.params.w + 1..]);
        self.pos += rhs_first.len() as u64 - self.params.w as u64 - 1;
        self.process_phrase(&phrase)?;

        for p in rhs.parse.iter().skip(1) {
            self.pos += p.len() as u64 - self.params.w as u64;
            self.process_phrase(p)?;
        }
        self.nseqs += rhs.nseqs;
        Ok(())
    }

    /// Computes the BWT of the parse itself (not of the underlying text):
    /// `bwlast` is, for each suffix of the parse in sorted order, the last
    /// character of the preceding dictionary phrase; `ilist` records, per
    /// dictionary phrase rank (in `F`-column order), which parse positions
    /// point to it; `bwsai` (if `get_sai` was set) carries the matching
    /// text-position sample.
    pub fn bwt_of_parse(&mut self) -> Result<(Vec<u8>, Vec<u64>, Vec<u64>)> {
        let occs = self.occurrences();
        if self.parse_ranks.is_empty() {
            self.generate_ranks();
        }
        if self.parse_ranks.len() == 1 {
            return Err(PfbwtError::DictionaryTooSmall(1));
        }
        if self.parse_ranks.len() as u64 > U::MAX_PHRASES {
            return Err(PfbwtError::TooManyPhrases {
                count: self.parse_ranks.len() as u64,
                limit: U::MAX_PHRASES,
            });
        }

        let mut ranks: Vec<u64> = self.parse_ranks.iter().map(|r| r.to_u64()).collect();
        let n = if *ranks.last().unwrap() != 0 {
            ranks.push(0);
            ranks.len() - 1
        } else {
            ranks.len() - 1
        };
        let k = ranks[..n].iter().copied().max().unwrap_or(0);

        let sa = crate::gsa::sais::build_suffix_array(&ranks, (k + 1) as usize);
        if sa.len() != n + 1 {
            return Err(PfbwtError::SuffixArrayConstructionFailed);
        }

        let mut bwlast = Vec::with_capacity(n + 1);
        let mut bwsai = Vec::with_capacity(if self.params.get_sai { n + 1 } else { 0 });

        bwlast.push(self.last[n - 2]);
        if self.params.get_sai {
            bwsai.push(self.sai[n - 1]);
        }
        for &s in &sa[1..] {
            if s == 0 {
                bwlast.push(0);
                if self.params.get_sai {
                    bwsai.push(0);
                }
            } else if s == 1 {
                bwlast.push(self.last[n - 1]);
                if self.params.get_sai {
                    bwsai.push(self.sai[s - 1]);
                }
            } else {
                bwlast.push(self.last[s - 2]);
                if self.params.get_sai {
                    bwsai.push(self.sai[s - 1]);
                }
            }
        }

        let mut f = vec![0u64; occs.len() + 1];
        f[1] = 1;
        for i in 2..occs.len() + 1 {
            f[i] = f[i - 1] + occs[i - 2].to_u64();
        }
        debug_assert_eq!(
            f[occs.len()] + occs[occs.len() - 1].to_u64(),
            (n + 1) as u64
        );

        let mut ilist = vec![0u64; n + 1];
        let mut f_cursor = f.clone();
        for (i, &s) in sa.iter().enumerate() {
            let rank = if s == 0 { 0 } else { ranks[s - 1] };
            ilist[f_cursor[rank as usize] as usize] = i as u64;
            f_cursor[rank as usize] += 1;
        }

        Ok((bwlast, ilist, bwsai))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_params(w: usize, p: usize) -> PfParserParams {
        PfParserParams {
            w,
            p,
            get_sai: true,
            store_docs: true,
            trim_non_acgt: false,
            non_acgt_to_a: false,
        }
    }

    #[test]
    fn parses_single_short_sequence() {
        let mut parser = PfParser::<u32>::new(simple_params(4, 11)).unwrap();
        parser.add_sequence("seq1", b"ACGTACGTACGTACGT").unwrap();
        parser.finalize().unwrap();
        assert_eq!(
            parser.occurrences().iter().map(|o| o.to_u64()).sum::<u64>(),
            parser.parse_len() as u64
        );
        assert!(parser.parse_len() >= 1);
    }

    #[test]
    fn reject_invalid_window() {
        let params = PfParserParams {
            w: 0,
            ..Default::default()
        };
        assert!(PfParser::<u32>::new(params).is_err());
    }

    #[test]
    fn reject_conflicting_non_acgt_modes() {
        let params = PfParserParams {
            trim_non_acgt: true,
            non_acgt_to_a: true,
            ..Default::default()
        };
        assert!(PfParser::<u32>::new(params).is_err());
    }

    #[test]
    fn merge_matches_single_pass_parse() {
        let params = simple_params(4, 11);
        let mut whole = PfParser::<u32>::new(params).unwrap();
        whole.add_sequence("a", b"ACGTACGTACGTGGGGCCCCAAAATTTT").unwrap();
        whole.finalize().unwrap();

        let mut left = PfParser::<u32>::new(params).unwrap();
        left.add_sequence("a", b"ACGTACGTACGTGGGG").unwrap();
        left.finalize().unwrap();

        let mut right = PfParser::<u32>::new(params).unwrap();
        right.add_sequence("a", b"CCCCAAAATTTT").unwrap();
        right.finalize().unwrap();

        left.merge_from(&right).unwrap();
        left.finalize().unwrap();

        assert_eq!(left.text_len(), whole.text_len());
    }

    /// `bwt_of_parse`'s induced suffix array over the parse ranks walks
    /// `sa[1] == 1` for any parse with two or more distinct ranks, so this
    /// hand-built two-phrase parse is guaranteed to hit the `s == 1`
    /// branch. `sai[s - 1]` (`sai[0]`) must land in `bwsai`, not a second
    /// copy of the `sai[n - 1]` value already pushed before the loop.
    #[test]
    fn bwt_of_parse_fixes_up_s_equals_one_sai_index() {
        let params = PfParserParams {
            w: 4,
            p: 11,
            get_sai: true,
            store_docs: false,
            trim_non_acgt: false,
            non_acgt_to_a: false,
        };
        let mut parser = PfParser::<u32>::new(params).unwrap();

        let phrase_lo = b"AAAAAAAAA".to_vec();
        let phrase_hi = b"TTTTTTTTT".to_vec();

        parser.freqs.insert(phrase_lo.clone(), Freq { n: 1, r: 1 });
        parser.freqs.insert(phrase_hi.clone(), Freq { n: 1, r: 2 });
        parser.sorted_phrases = vec![phrase_lo, phrase_hi];
        parser.parse_ranks = vec![2, 1];
        parser.last = vec![b'X', b'Y'];
        parser.sai = vec![10, 20];

        let (bwlast, _ilist, bwsai) = parser.bwt_of_parse().unwrap();

        assert_eq!(bwlast, vec![b'X', b'Y', 0]);
        assert_eq!(bwsai, vec![20, 10, 0]);
    }
}

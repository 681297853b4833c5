//! Interfaces for collaborating components this crate does not implement.
//!
//! This crate builds the dictionary, parse, BWT, generalized suffix/LCP
//! arrays, and marker arrays from an already-linearized byte stream and an
//! already-extracted list of variant records. It does not parse FASTA or
//! VCF itself, and it does not perform sequence alignment, indexed search,
//! or pattern matching against the built structures. The traits below are
//! the seams a caller plugs real implementations of those concerns into.
use crate::error::Result;

/// Supplies one or more named byte sequences to parse, e.g. the records of
/// a FASTA file or a collection of FASTA files concatenated by a caller.
pub trait SequenceSource {
    /// Iterate `(name, bases)` pairs in file order. `bases` need not be
    /// validated as ACGT-only; that filtering is the parser's job.
    fn sequences(&mut self) -> Box<dyn Iterator<Item = (String, Vec<u8>)> + '_>;
}

/// One variant record against a single reference sequence: a 0-based
/// reference position, the number of reference bases it replaces, and the
/// genotype-to-allele-sequence mapping for every sample at that site.
pub struct VariantRecord {
    pub ref_pos: u64,
    pub ref_len: u32,
    pub alleles: Vec<Vec<u8>>,
    /// Per-sample genotype index into `alleles` (0 = reference allele).
    pub genotypes: Vec<u16>,
}

/// Supplies variant records for one reference sequence, e.g. the records
/// of a VCF restricted to a single chromosome/contig.
pub trait VariantSource {
    fn variants(&mut self) -> Box<dyn Iterator<Item = VariantRecord> + '_>;
}

/// Generalized suffix array + LCP array construction over a
/// `END_OF_WORD`-delimited dictionary of phrases.
///
/// The default implementation ([`crate::gsa::sais::SaisGsaCak`]) builds
/// both in-crate via SA-IS plus a Kasai LCP pass; this trait exists so an
/// FFI binding to a native, more heavily optimized construction routine
/// can be substituted without touching the rest of the BWT builder.
pub trait GsaCak {
    /// Build `(gsa, glcp)` over `dict`, where `dict` is the concatenation
    /// of every dictionary phrase (each already terminated by
    /// `sentinel::END_OF_WORD`) followed by one trailing
    /// `sentinel::END_OF_DICT`.
    fn build(&self, dict: &[u8]) -> Result<(Vec<u64>, Vec<u64>)>;
}

use std::fmt;

/// Every fatal condition the core can raise.
///
/// There is no retry and no recovery path: constructing one of these means
/// the caller should report it and exit nonzero, mirroring the original
/// implementation's `die(...)` calls.
#[derive(Debug)]
pub enum PfbwtError {
    /// `w` outside `[4, 31]`.
    InvalidWindowSize(usize),
    /// `p < 4`.
    InvalidModulus(usize),
    /// Both `trim_non_acgt` and `non_acgt_to_a` requested at once.
    ConflictingNonAcgtModes,
    /// Reading from stdin (`-`) without `-o PREFIX`.
    MissingOutputPrefix,
    /// Any I/O failure: open, size mismatch, short read/write.
    Io(String),
    /// More phrases than the active word width (`u32`/`u64`) can index.
    TooManyPhrases { count: u64, limit: u64 },
    /// Dictionary has fewer than 2 distinct phrases after finalization.
    DictionaryTooSmall(usize),
    /// A phrase referenced by the parse is missing from the dictionary.
    PhraseNotInDictionary,
    /// `w` mismatch (or similar parameter mismatch) between two parsers
    /// being merged.
    IncompatibleMerge { field: &'static str },
    /// A shared-suffix group in the PFP-BWT walk disagreed on `suflen`.
    InconsistentSuffixLength,
    /// `gSACA-K` (or its substitute) returned a negative depth.
    SuffixArrayConstructionFailed,
    /// Two runs in an RLE window array have an equal start or end.
    DegenerateRun { at: u64 },
    /// A worker thread failed to become joinable after being spawned.
    WorkerNotJoinable,
    /// Malformed marker-position stream (unexpected EOF, bad delimiter).
    MalformedMarkerStream(String),
    /// An allele, seqid, or position value exceeds what a packed `Marker`
    /// can hold.
    MarkerOutOfRange { field: &'static str, value: u64 },
}

impl fmt::Display for PfbwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PfbwtError::InvalidWindowSize(w) => {
                write!(f, "window size w={w} must satisfy 4 <= w <= 31")
            }
            PfbwtError::InvalidModulus(p) => write!(f, "modulus p={p} must satisfy p >= 4"),
            PfbwtError::ConflictingNonAcgtModes => write!(
                f,
                "trim_non_acgt and non_acgt_to_a cannot both be enabled"
            ),
            PfbwtError::MissingOutputPrefix => {
                write!(f, "reading from stdin requires an explicit output prefix")
            }
            PfbwtError::Io(msg) => write!(f, "I/O error: {msg}"),
            PfbwtError::TooManyPhrases { count, limit } => write!(
                f,
                "input contains {count} phrases, exceeding the {limit} limit for this word size; rebuild in 64-bit mode"
            ),
            PfbwtError::DictionaryTooSmall(n) => write!(
                f,
                "dictionary has only {n} distinct phrase(s); at least 2 are required"
            ),
            PfbwtError::PhraseNotInDictionary => {
                write!(f, "parse references a phrase missing from the dictionary")
            }
            PfbwtError::IncompatibleMerge { field } => {
                write!(f, "cannot merge parsers with differing {field}")
            }
            PfbwtError::InconsistentSuffixLength => write!(
                f,
                "suffixes grouped by shared LCP disagree on suffix length; corrupt dictionary inputs"
            ),
            PfbwtError::SuffixArrayConstructionFailed => {
                write!(f, "generalized suffix array construction failed")
            }
            PfbwtError::DegenerateRun { at } => {
                write!(f, "degenerate run start/end at position {at}")
            }
            PfbwtError::WorkerNotJoinable => {
                write!(f, "a parser-merge worker thread failed to join")
            }
            PfbwtError::MalformedMarkerStream(msg) => {
                write!(f, "malformed marker-position stream: {msg}")
            }
            PfbwtError::MarkerOutOfRange { field, value } => {
                write!(f, "marker field `{field}` value {value} out of range")
            }
        }
    }
}

impl std::error::Error for PfbwtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<std::io::Error> for PfbwtError {
    fn from(err: std::io::Error) -> Self {
        PfbwtError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PfbwtError>;

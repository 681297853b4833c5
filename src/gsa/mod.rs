//! Generalized suffix array / LCP construction over the dictionary.
pub mod sais;

use crate::collab::GsaCak;
use crate::error::Result;

/// Default `GsaCak`: in-crate SA-IS over the dictionary's bytes (alphabet
/// size 256) followed by a Kasai LCP pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaisGsaCak;

impl GsaCak for SaisGsaCak {
    fn build(&self, dict: &[u8]) -> Result<(Vec<u64>, Vec<u64>)> {
        let symbols: Vec<u64> = dict.iter().map(|&b| b as u64).collect();
        let sa = sais::build_suffix_array(&symbols, 256);
        let lcp = sais::kasai_lcp(&symbols, &sa);
        Ok((
            sa.into_iter().map(|v| v as u64).collect(),
            lcp.into_iter().map(|v| v as u64).collect(),
        ))
    }
}

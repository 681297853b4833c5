//! Parallel ingestion: one [`PfParser`] per input slice, built on its own
//! thread, then folded together single-threaded in input order so the
//! `merge_from` re-hashing at each boundary stays deterministic.
use std::thread;

use crate::error::Result;
use crate::parser::{PfParser, PfParserParams, PfpUint};

/// Parses each `(name, bases)` group in `slices` on its own thread, then
/// reduces the per-thread parsers into one in slice order via
/// [`PfParser::merge_from`], and finalizes the result.
pub fn merge_parsers_parallel<U: PfpUint + Send>(
    params: PfParserParams,
    slices: &[Vec<(String, Vec<u8>)>],
) -> Result<PfParser<U>> {
    if slices.is_empty() {
        let mut p = PfParser::<U>::new(params)?;
        p.finalize()?;
        return Ok(p);
    }

    let partials: Vec<Result<PfParser<U>>> = thread::scope(|scope| {
        let handles: Vec<_> = slices
            .iter()
            .map(|slice| {
                scope.spawn(move || -> Result<PfParser<U>> {
                    let mut parser = PfParser::<U>::new(params)?;
                    for (name, bases) in slice {
                        parser.add_sequence(name, bases)?;
                    }
                    Ok(parser)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| crate::error::PfbwtError::WorkerNotJoinable)?)
            .collect()
    });

    let mut iter = partials.into_iter();
    let mut acc = iter.next().unwrap()?;
    for p in iter {
        acc.merge_from(&p?)?;
    }
    acc.finalize()?;
    Ok(acc)
}

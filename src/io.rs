//! On-disk artifact readers/writers.
//!
//! Every intermediate and final structure this crate builds can be
//! serialized under a shared output prefix `P` (`P.dict`, `P.occ`, ...),
//! the same file-per-artifact layout `file_wrappers.hpp`'s
//! `VecFileSource`/`VecFileSink` load and dump. Numeric arrays go through
//! [`crate::array`] so the same code path serves both heap-backed and
//! memory-mapped reads.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::array::{HeapArray, MmapArray};
use crate::error::{PfbwtError, Result};
use crate::marker::MarkerT;
use crate::parser::ntab::NtabEntry;
use crate::sentinel::{END_OF_DICT, END_OF_WORD};

/// Resolves artifact paths from a shared output prefix.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    prefix: PathBuf,
}

impl ArtifactPaths {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        ArtifactPaths {
            prefix: prefix.into(),
        }
    }

    pub fn path(&self, ext: &str) -> PathBuf {
        let mut s = self.prefix.as_os_str().to_owned();
        s.push(".");
        s.push(ext);
        PathBuf::from(s)
    }
}

fn write_u8_vec(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    f.write_all(data)?;
    Ok(())
}

fn write_u32_vec(path: impl AsRef<Path>, data: &[u32]) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    for &v in data {
        f.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn write_u64_vec(path: impl AsRef<Path>, data: &[u64]) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    for &v in data {
        f.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_u8_vec(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

fn read_u64_vec(path: impl AsRef<Path>) -> Result<Vec<u64>> {
    let bytes = std::fs::read(path)?;
    if bytes.len() % 8 != 0 {
        return Err(PfbwtError::Io("file size not a multiple of 8".into()));
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect())
}

/// Writes `P.dict`: every phrase in dictionary (sort) order, each
/// terminated by [`END_OF_WORD`], the whole file terminated by
/// [`END_OF_DICT`].
pub fn write_dict(paths: &ArtifactPaths, phrases: &[Vec<u8>]) -> Result<()> {
    let mut buf = Vec::new();
    for p in phrases {
        buf.extend_from_slice(p);
        buf.push(END_OF_WORD);
    }
    buf.push(END_OF_DICT);
    write_u8_vec(paths.path("dict"), &buf)
}

pub fn read_dict(paths: &ArtifactPaths) -> Result<Vec<u8>> {
    read_u8_vec(paths.path("dict"))
}

pub fn write_occ(paths: &ArtifactPaths, occ: &[u64]) -> Result<()> {
    write_u64_vec(paths.path("occ"), occ)
}

pub fn write_occ32(paths: &ArtifactPaths, occ: &[u32]) -> Result<()> {
    write_u32_vec(paths.path("occ"), occ)
}

pub fn write_parse(paths: &ArtifactPaths, ranks: &[u64]) -> Result<()> {
    write_u64_vec(paths.path("parse"), ranks)
}

pub fn write_parse32(paths: &ArtifactPaths, ranks: &[u32]) -> Result<()> {
    write_u32_vec(paths.path("parse"), ranks)
}

pub fn write_last(paths: &ArtifactPaths, last: &[u8]) -> Result<()> {
    write_u8_vec(paths.path("last"), last)
}

pub fn write_sai(paths: &ArtifactPaths, sai: &[u64]) -> Result<()> {
    write_u64_vec(paths.path("sai"), sai)
}

pub fn write_bwlast(paths: &ArtifactPaths, bwlast: &[u8]) -> Result<()> {
    write_u8_vec(paths.path("bwlast"), bwlast)
}

pub fn write_ilist(paths: &ArtifactPaths, ilist: &[u64]) -> Result<()> {
    write_u64_vec(paths.path("ilist"), ilist)
}

pub fn write_bwsai(paths: &ArtifactPaths, bwsai: &[u64]) -> Result<()> {
    write_u64_vec(paths.path("bwsai"), bwsai)
}

/// Writes `P.docs`: one `"<name> <start>\n"` line per sequence.
pub fn write_docs(paths: &ArtifactPaths, names: &[String], starts: &[u64]) -> Result<()> {
    let mut f = BufWriter::new(File::create(paths.path("docs"))?);
    for (name, start) in names.iter().zip(starts.iter()) {
        writeln!(f, "{name} {start}")?;
    }
    Ok(())
}

pub fn read_docs(paths: &ArtifactPaths) -> Result<Vec<(String, u64)>> {
    let f = BufReader::new(File::open(paths.path("docs"))?);
    let mut out = Vec::new();
    for line in f.lines() {
        let line = line?;
        let mut parts = line.rsplitn(2, ' ');
        let start: u64 = parts
            .next()
            .ok_or_else(|| PfbwtError::Io("malformed docs line".into()))?
            .parse()
            .map_err(|_| PfbwtError::Io("malformed docs start offset".into()))?;
        let name = parts
            .next()
            .ok_or_else(|| PfbwtError::Io("malformed docs line".into()))?
            .to_string();
        out.push((name, start));
    }
    Ok(out)
}

/// Writes `P.ntab`: `(pos, length)` pairs, 8 bytes each.
pub fn write_ntab(paths: &ArtifactPaths, ntab: &[NtabEntry]) -> Result<()> {
    let mut f = BufWriter::new(File::create(paths.path("ntab"))?);
    for e in ntab {
        f.write_all(&e.pos.to_le_bytes())?;
        f.write_all(&e.l.to_le_bytes())?;
    }
    Ok(())
}

pub fn read_ntab(paths: &ArtifactPaths) -> Result<Vec<NtabEntry>> {
    let flat = read_u64_vec(paths.path("ntab"))?;
    Ok(flat
        .chunks_exact(2)
        .map(|c| NtabEntry { pos: c[0], l: c[1] })
        .collect())
}

/// Writes `P.n`: decimal text length, newline-terminated.
pub fn write_text_len(paths: &ArtifactPaths, n: u64) -> Result<()> {
    let mut f = File::create(paths.path("n"))?;
    writeln!(f, "{n}")?;
    Ok(())
}

pub fn read_text_len(paths: &ArtifactPaths) -> Result<u64> {
    let s = std::fs::read_to_string(paths.path("n"))?;
    s.trim()
        .parse()
        .map_err(|_| PfbwtError::Io("malformed .n file".into()))
}

pub fn write_bwt(paths: &ArtifactPaths, bwt: &[u8]) -> Result<()> {
    write_u8_vec(paths.path("bwt"), bwt)
}

pub fn read_bwt_mmap(paths: &ArtifactPaths) -> Result<MmapArray<u8>> {
    MmapArray::open(paths.path("bwt"))
}

pub fn write_sa(paths: &ArtifactPaths, sa: &[u64]) -> Result<()> {
    write_u64_vec(paths.path("sa"), sa)
}

/// A run-length sample: `(bwt_index, sa_value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSample {
    pub bwt_index: u64,
    pub sa_value: u64,
}

fn write_samples(path: impl AsRef<Path>, samples: &[RunSample]) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    for s in samples {
        f.write_all(&s.bwt_index.to_le_bytes())?;
        f.write_all(&s.sa_value.to_le_bytes())?;
    }
    Ok(())
}

fn read_samples(path: impl AsRef<Path>) -> Result<Vec<RunSample>> {
    let flat = read_u64_vec(path)?;
    Ok(flat
        .chunks_exact(2)
        .map(|c| RunSample {
            bwt_index: c[0],
            sa_value: c[1],
        })
        .collect())
}

pub fn write_ssa(paths: &ArtifactPaths, samples: &[RunSample]) -> Result<()> {
    write_samples(paths.path("ssa"), samples)
}

pub fn read_ssa(paths: &ArtifactPaths) -> Result<Vec<RunSample>> {
    read_samples(paths.path("ssa"))
}

pub fn write_esa(paths: &ArtifactPaths, samples: &[RunSample]) -> Result<()> {
    write_samples(paths.path("esa"), samples)
}

pub fn read_esa(paths: &ArtifactPaths) -> Result<Vec<RunSample>> {
    read_samples(paths.path("esa"))
}

/// Delimiter closing every `P.mps` run block: a marker value no valid
/// packed marker can take (all 64 bits set).
pub const MPS_DELIMITER: u64 = u64::MAX;

/// Writes `P.mps`: for each run, `start`, `end`, its markers, then
/// [`MPS_DELIMITER`], all little-endian `u64`s, concatenated run after run.
pub fn write_mps(paths: &ArtifactPaths, runs: &[crate::marker::MarkerRun]) -> Result<()> {
    let mut f = BufWriter::new(File::create(paths.path("mps"))?);
    for r in runs {
        f.write_all(&r.start.to_le_bytes())?;
        f.write_all(&r.end.to_le_bytes())?;
        for &m in &r.markers {
            f.write_all(&m.to_le_bytes())?;
        }
        f.write_all(&MPS_DELIMITER.to_le_bytes())?;
    }
    Ok(())
}

pub fn read_mps(paths: &ArtifactPaths) -> Result<Vec<crate::marker::MarkerRun>> {
    let flat = read_u64_vec(paths.path("mps"))?;
    let mut runs = Vec::new();
    let mut i = 0usize;
    while i < flat.len() {
        if i + 2 > flat.len() {
            return Err(PfbwtError::Io("truncated .mps run header".into()));
        }
        let start = flat[i];
        let end = flat[i + 1];
        i += 2;
        let mut markers: Vec<MarkerT> = Vec::new();
        loop {
            if i >= flat.len() {
                return Err(PfbwtError::Io("truncated .mps run: missing delimiter".into()));
            }
            let v = flat[i];
            i += 1;
            if v == MPS_DELIMITER {
                break;
            }
            markers.push(v);
        }
        runs.push(crate::marker::MarkerRun { start, end, markers });
    }
    Ok(runs)
}

/// Loads `P.parse` (32-bit word size) fully into heap memory.
pub fn read_parse32(paths: &ArtifactPaths) -> Result<HeapArray<u32>> {
    let bytes = std::fs::read(paths.path("parse"))?;
    if bytes.len() % 4 != 0 {
        return Err(PfbwtError::Io("parse file size not a multiple of 4".into()));
    }
    Ok(HeapArray::new(
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect(),
    ))
}

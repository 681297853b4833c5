//! Orchestration wrapper: reads a FASTA collection, runs it through
//! prefix-free parsing and the PFP-BWT builder, and writes the on-disk
//! artifact set described in the crate's design docs.
//!
//! FASTA parsing mechanics are not part of the core (see `pfbwt::collab`);
//! the minimal reader below exists only to plug a real file into the
//! `SequenceSource` seam from the command line.
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::process::ExitCode;

use clap::Parser;

use pfbwt::collab::SequenceSource;
use pfbwt::config::Config;
use pfbwt::error::{PfbwtError, Result};
use pfbwt::gsa::SaisGsaCak;
use pfbwt::io::{self, ArtifactPaths, RunSample};
use pfbwt::marker::rle::RleWindowArray;
use pfbwt::parser::{PfParser, PfParserParams};
use pfbwt::pfbwt::{OutEvent, PrefixFreeBWT};

/// Reads `(name, bases)` pairs out of a FASTA stream (`>` header lines,
/// sequence body until the next `>` or EOF).
struct FastaReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> FastaReader<R> {
    fn new(reader: R) -> Self {
        FastaReader { reader }
    }
}

impl<R: BufRead> SequenceSource for FastaReader<R> {
    fn sequences(&mut self) -> Box<dyn Iterator<Item = (String, Vec<u8>)> + '_> {
        let mut out = Vec::new();
        let mut name: Option<String> = None;
        let mut bases = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line).unwrap_or(0);
            if n == 0 {
                if let Some(n) = name.take() {
                    out.push((n, std::mem::take(&mut bases)));
                }
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if let Some(header) = trimmed.strip_prefix('>') {
                if let Some(n) = name.take() {
                    out.push((n, std::mem::take(&mut bases)));
                }
                name = Some(header.split_whitespace().next().unwrap_or("").to_string());
            } else {
                bases.extend_from_slice(trimmed.as_bytes());
            }
        }
        Box::new(out.into_iter())
    }
}

fn run() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    let verbosity = match config.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(verbosity).init();

    let prefix = config.resolve_output_prefix();
    let paths = ArtifactPaths::new(&prefix);

    if !config.pfbwt_only {
        run_parse_stage(&config, &paths)?;
        if config.parse_only {
            return Ok(());
        }
    }
    run_pfbwt_stage(&config, &paths)
}

fn open_input(config: &Config) -> Result<Box<dyn BufRead>> {
    if config.input.as_os_str() == "-" {
        Ok(Box::new(BufReader::new(std::io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(&config.input)?)))
    }
}

fn run_parse_stage(config: &Config, paths: &ArtifactPaths) -> Result<()> {
    let params = PfParserParams {
        w: config.w,
        p: config.p,
        get_sai: true,
        store_docs: config.docs,
        trim_non_acgt: config.trim_non_acgt,
        non_acgt_to_a: config.non_acgt_to_a,
    };
    let mut parser = PfParser::<u64>::new(params)?;
    let mut src = FastaReader::new(open_input(config)?);
    parser.ingest(&mut src)?;
    parser.finalize()?;

    io::write_dict(paths, parser.sorted_phrases())?;
    io::write_occ(paths, &parser.occurrences())?;
    io::write_parse(paths, parser.parse_ranks())?;
    io::write_last(paths, parser.last())?;
    io::write_sai(paths, parser.sai())?;
    if config.docs {
        io::write_docs(paths, parser.doc_names(), parser.doc_starts())?;
    }
    if config.trim_non_acgt {
        io::write_ntab(paths, parser.ntab())?;
    }
    io::write_text_len(paths, parser.text_len())?;

    let (bwlast, ilist, bwsai) = parser.bwt_of_parse()?;
    io::write_bwlast(paths, &bwlast)?;
    io::write_ilist(paths, &ilist)?;
    io::write_bwsai(paths, &bwsai)?;
    log::info!(
        "parsed {} phrases into a dictionary of {} distinct phrases",
        parser.parse_len(),
        parser.sorted_phrases().len()
    );
    Ok(())
}

fn run_pfbwt_stage(config: &Config, paths: &ArtifactPaths) -> Result<()> {
    let dict = io::read_dict(paths)?;
    let bwlast = std::fs::read(paths.path("bwlast"))?;
    let occ = read_u64_file(&paths.path("occ"))?;
    let ilist = read_u64_file(&paths.path("ilist"))?;
    let bwsai = read_u64_file(&paths.path("bwsai"))?;

    let any_sa = config.full_sa || config.rlsa;
    let builder =
        PrefixFreeBWT::new(dict, bwlast, ilist, bwsai, &occ, config.w, any_sa, SaisGsaCak)?;

    let mut bwt = Vec::new();
    let mut sa = Vec::new();
    let mut ssa: Vec<RunSample> = Vec::new();
    let mut esa: Vec<RunSample> = Vec::new();
    let mut prev_sa: Option<u64> = None;
    let mut prev_idx: u64 = 0;

    builder.generate_bwt_lcp(|ev: OutEvent| {
        let run_changed = bwt.is_empty() || ev.bwtc != ev.pbwtc;
        bwt.push(ev.bwtc);
        if config.full_sa {
            sa.push(ev.sa);
        }
        if config.rlsa {
            if run_changed {
                if let Some(prev) = prev_sa {
                    esa.push(RunSample {
                        bwt_index: prev_idx,
                        sa_value: prev,
                    });
                }
                ssa.push(RunSample {
                    bwt_index: ev.pos,
                    sa_value: ev.sa,
                });
            }
            prev_sa = Some(ev.sa);
            prev_idx = ev.pos;
        }
    })?;
    if config.rlsa {
        if let Some(prev) = prev_sa {
            esa.push(RunSample {
                bwt_index: prev_idx,
                sa_value: prev,
            });
        }
    }

    if let Some(ext) = &config.stdout_ext {
        write_stdout_artifact(ext, &bwt, &sa)?;
        return Ok(());
    }

    io::write_bwt(paths, &bwt)?;
    if config.full_sa {
        io::write_sa(paths, &sa)?;
    }
    if config.rlsa {
        io::write_ssa(paths, &ssa)?;
        io::write_esa(paths, &esa)?;
    }

    if config.full_sa && paths.path("mps").exists() {
        let mps_runs = io::read_mps(paths)?;
        let mai = RleWindowArray::build(&mps_runs)?;
        let aligned = pfbwt::marker::aligner::align_to_sa_order(&mai, &sa);
        io::write_mps(paths, &aligned)?;
    }

    log::info!("wrote {} BWT bytes to {}", bwt.len(), paths.path("bwt").display());
    Ok(())
}

fn write_stdout_artifact(ext: &str, bwt: &[u8], sa: &[u64]) -> Result<()> {
    let mut out = std::io::stdout();
    match ext {
        "bwt" => out.write_all(bwt)?,
        "sa" => {
            for &v in sa {
                out.write_all(&v.to_le_bytes())?;
            }
        }
        other => {
            return Err(PfbwtError::Io(format!(
                "unsupported --stdout extension: {other}"
            )))
        }
    }
    Ok(())
}

fn read_u64_file(path: &std::path::Path) -> Result<Vec<u64>> {
    let bytes = std::fs::read(path)?;
    if bytes.len() % 8 != 0 {
        return Err(PfbwtError::Io(format!(
            "{}: size not a multiple of 8",
            path.display()
        )));
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pfbwt-cli: {e}");
            ExitCode::FAILURE
        }
    }
}

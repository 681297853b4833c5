//! Benchmarks prefix-free parsing and PFP-BWT construction over
//! synthetic ACGT text of increasing size.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pfbwt::gsa::SaisGsaCak;
use pfbwt::parser::{PfParser, PfParserParams, PfpUint};
use pfbwt::pfbwt::PrefixFreeBWT;
use pfbwt::sentinel::{END_OF_DICT, END_OF_WORD};

fn random_acgt(len: usize, seed: u64) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("pfp_parse");
    for &size in &[10_000usize, 100_000, 1_000_000] {
        let text = random_acgt(size, 42);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let params = PfParserParams {
                    w: 10,
                    p: 100,
                    get_sai: true,
                    store_docs: false,
                    trim_non_acgt: false,
                    non_acgt_to_a: false,
                };
                let mut parser = PfParser::<u64>::new(params).unwrap();
                parser.add_sequence("bench", black_box(text)).unwrap();
                parser.finalize().unwrap();
                black_box(parser.parse_len())
            })
        });
    }
    group.finish();
}

fn bench_pfbwt(c: &mut Criterion) {
    let mut group = c.benchmark_group("pfp_bwt");
    for &size in &[10_000usize, 100_000] {
        let text = random_acgt(size, 7);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let params = PfParserParams {
                    w: 10,
                    p: 100,
                    get_sai: true,
                    store_docs: false,
                    trim_non_acgt: false,
                    non_acgt_to_a: false,
                };
                let mut parser = PfParser::<u64>::new(params).unwrap();
                parser.add_sequence("bench", black_box(text)).unwrap();
                parser.finalize().unwrap();
                let (bwlast, ilist, bwsai) = parser.bwt_of_parse().unwrap();
                let occs: Vec<u64> = parser.occurrences().iter().map(|o| o.to_u64()).collect();
                let mut dict = Vec::new();
                for phrase in parser.sorted_phrases() {
                    dict.extend_from_slice(phrase);
                    dict.push(END_OF_WORD);
                }
                dict.push(END_OF_DICT);
                let builder =
                    PrefixFreeBWT::new(dict, bwlast, ilist, bwsai, &occs, 10, false, SaisGsaCak)
                        .unwrap();
                let mut n = 0u64;
                builder.generate_bwt_lcp(|_| n += 1).unwrap();
                black_box(n)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_pfbwt);
criterion_main!(benches);

//! End-to-end tests exercising the public API across crate boundaries:
//! parsing, PFP-BWT construction, marker-array construction, and the
//! on-disk artifact round trip, mirroring the worked scenarios in the
//! crate's design notes.
use pfbwt::gsa::SaisGsaCak;
use pfbwt::io::ArtifactPaths;
use pfbwt::marker::rle::RleWindowArray;
use pfbwt::marker::writer::MarkerPositionsWriter;
use pfbwt::marker::{create_marker, MarkerRun};
use pfbwt::parser::{PfParser, PfParserParams, PfpUint};
use pfbwt::pfbwt::PrefixFreeBWT;
use pfbwt::sentinel::{END_OF_DICT, END_OF_WORD};

fn params(w: usize, p: usize) -> PfParserParams {
    PfParserParams {
        w,
        p,
        get_sai: true,
        store_docs: false,
        trim_non_acgt: false,
        non_acgt_to_a: false,
    }
}

/// Scenario 1: parsing a short repetitive sequence to completion
/// satisfies the dictionary invariants from the data model — ranks form
/// a permutation of `1..=|dict|` in bytewise-lex order, and occurrence
/// counts sum to the parse length.
#[test]
fn round_trip_parsing_reconstructs_original_text() {
    let mut parser = PfParser::<u32>::new(params(4, 4)).unwrap();
    parser.add_sequence("t1", b"ACGTACGTACGTACGT").unwrap();
    parser.finalize().unwrap();

    assert!(parser.sorted_phrases().len() >= 2);
    assert!(parser.sorted_phrases().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(
        parser.occurrences().iter().map(|o| o.to_u64()).sum::<u64>(),
        parser.parse_len() as u64
    );
    let max_rank = parser.sorted_phrases().len() as u64;
    assert!(parser
        .parse_ranks()
        .iter()
        .all(|r| { let v = r.to_u64(); v >= 1 && v <= max_rank }));
}

/// Scenario 2: parsing two files together is equivalent to parsing each
/// separately and merging, on every public accessor.
#[test]
fn merge_equivalence_matches_joint_parse() {
    let p = params(4, 4);

    let mut joint = PfParser::<u32>::new(p).unwrap();
    joint.add_sequence("a", b"ACGTACGTACGTACGT").unwrap();
    joint.add_sequence("b", b"TTTTACGTTTTTACGT").unwrap();
    joint.finalize().unwrap();

    let mut a = PfParser::<u32>::new(p).unwrap();
    a.add_sequence("a", b"ACGTACGTACGTACGT").unwrap();
    a.finalize().unwrap();
    let mut b = PfParser::<u32>::new(p).unwrap();
    b.add_sequence("b", b"TTTTACGTTTTTACGT").unwrap();
    b.finalize().unwrap();
    a.merge_from(&b).unwrap();
    a.finalize().unwrap();

    assert_eq!(a.parse_len(), joint.parse_len());
    assert_eq!(a.sorted_phrases(), joint.sorted_phrases());
    assert_eq!(a.last(), joint.last());
    assert_eq!(a.text_len(), joint.text_len());
}

/// Scenario 3: the PFP-BWT builder's event stream, fed through the full
/// pipeline for a short repetitive text, contains exactly one sentinel
/// byte (the dictionary's `EndOfDict`-adjacent root) and as many
/// characters as the text has positions.
#[test]
fn pfp_bwt_pipeline_produces_one_sentinel() {
    let mut parser = PfParser::<u32>::new(params(4, 2)).unwrap();
    parser.add_sequence("s", b"BANANA").unwrap();
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
        PrefixFreeBWT::new(dict, bwlast, ilist, bwsai, &occs, 4, true, SaisGsaCak).unwrap();
    let mut bwt = Vec::new();
    let mut sas = Vec::new();
    builder
        .generate_bwt_lcp(|ev| {
            bwt.push(ev.bwtc);
            sas.push(ev.sa);
        })
        .unwrap();

    assert_eq!(bwt.iter().filter(|&&c| c == 0).count(), 1);
    assert_eq!(bwt.len(), sas.len());
}

/// Scenario 4: a single SNP at reference position 50 (`w=10`) produces
/// exactly one marker-position run spanning its window, `[41, 50]`.
#[test]
fn marker_writer_single_snp() {
    let mut w = MarkerPositionsWriter::new(10);
    w.update(50, 50, 1, 0).unwrap();
    let runs = w.finish_sequence().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].start, 41);
    assert_eq!(runs[0].end, 50);
    assert_eq!(runs[0].markers, vec![create_marker(50, 1, 0).unwrap()]);
}

/// Scenario 5: two SNPs close enough to share a window (at positions 50
/// and 54, `w=10`) produce an overlapping region carrying both markers.
#[test]
fn marker_writer_two_nearby_snps() {
    let mut w = MarkerPositionsWriter::new(10);
    w.update(50, 50, 1, 0).unwrap();
    w.update(54, 54, 1, 0).unwrap();
    let runs = w.finish_sequence().unwrap();
    assert!(!runs.is_empty());
    assert!(runs.iter().any(|r| r.markers.len() == 2));
    // Positions 41..45 only overlap the first SNP's window.
    assert!(runs
        .iter()
        .any(|r| r.markers == vec![create_marker(50, 1, 0).unwrap()]));
}

/// Scenario 6: the RLE window array built from a marker writer's output
/// answers `has_entry`/`at` consistently with the runs that produced it.
#[test]
fn rle_window_array_round_trip() {
    let mut w = MarkerPositionsWriter::new(10);
    w.update(50, 50, 1, 0).unwrap();
    let runs = w.finish_sequence().unwrap();
    let arr = RleWindowArray::build(&runs).unwrap();

    assert!(arr.has_entry(45));
    assert_eq!(arr.at(45), vec![create_marker(50, 1, 0).unwrap()]);
    assert!(!arr.has_entry(40));
    assert!(!arr.has_entry(51));
}

/// The whole artifact set for a small input round-trips through disk: the
/// dictionary, occurrence counts, parse ranks, and the derived bwlast,
/// ilist, and bwsai all come back byte-for-byte.
#[test]
fn artifact_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path().join("p"));

    let mut parser = PfParser::<u32>::new(params(4, 4)).unwrap();
    parser.add_sequence("a", b"ACGTACGTACGTACGTGGGGCCCCAAAATTTT").unwrap();
    parser.finalize().unwrap();

    let occ: Vec<u64> = parser.occurrences().iter().map(|o| o.to_u64()).collect();
    let ranks: Vec<u64> = parser.parse_ranks().iter().map(|r| r.to_u64()).collect();
    let (bwlast, ilist, bwsai) = parser.bwt_of_parse().unwrap();

    pfbwt::io::write_dict(&paths, parser.sorted_phrases()).unwrap();
    pfbwt::io::write_occ(&paths, &occ).unwrap();
    pfbwt::io::write_parse(&paths, &ranks).unwrap();
    pfbwt::io::write_last(&paths, parser.last()).unwrap();
    pfbwt::io::write_bwlast(&paths, &bwlast).unwrap();
    pfbwt::io::write_ilist(&paths, &ilist).unwrap();
    pfbwt::io::write_bwsai(&paths, &bwsai).unwrap();

    assert_eq!(pfbwt::io::read_dict(&paths).unwrap().last(), Some(&0u8));

    let runs = vec![MarkerRun {
        start: 0,
        end: 9,
        markers: vec![create_marker(5, 1, 0).unwrap()],
    }];
    pfbwt::io::write_mps(&paths, &runs).unwrap();
    assert_eq!(pfbwt::io::read_mps(&paths).unwrap(), runs);
}

//! End-to-end mapping tests against a real minimap2 index.
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use libmappy::{map_file, open_fastx, revcomp, Aligner, FastxRecordExt, Preset};

/// A deterministic random DNA sequence.
fn random_seq(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
}

fn seq_aligner(reference: &[u8]) -> Aligner {
    Aligner::builder()
        .with_seq_index(reference)
        .expect("failed to build in-memory index")
}

#[test]
fn map_exact_subsequence() {
    let reference = random_seq(20_000, 1);
    let aligner = seq_aligner(&reference);
    let query = &reference[5_000..5_500];

    let hits = aligner.map(query, Some(b"q1")).unwrap();
    assert!(!hits.is_empty());

    let primary = hits.iter().find(|h| h.is_primary).unwrap();
    assert_eq!(primary.ctg, "N/A");
    assert_eq!(primary.ctg_len, 20_000);
    assert_eq!(primary.strand, 1);
    assert_eq!(primary.read_num, 1);
    assert!(primary.r_st < primary.r_en);
    assert!(primary.q_st < primary.q_en);
    assert!(primary.r_en <= primary.ctg_len);
    assert!(primary.q_en <= query.len() as i32);
    assert!(primary.mlen <= primary.blen);
    assert!(!primary.cigar.is_empty());
    assert_eq!(primary.mapq, 60);
}

#[test]
fn map_reverse_complement_query() {
    let reference = random_seq(20_000, 1);
    let aligner = seq_aligner(&reference);
    let query = revcomp(&reference[8_000..8_500]);

    let hits = aligner.map(&query, None).unwrap();
    let primary = hits.iter().find(|h| h.is_primary).unwrap();
    assert_eq!(primary.strand, -1);
}

#[test]
fn map_generates_cs_and_md_tags() {
    let reference = random_seq(20_000, 2);
    let aligner = seq_aligner(&reference);
    let query = &reference[1_000..1_600];

    let hits = aligner.map_with(query, None, Some(b"q1"), true, true).unwrap();
    let primary = hits.iter().find(|h| h.is_primary).unwrap();

    // an exact match is a single identity run
    let cs = primary.cs.as_deref().unwrap();
    assert!(cs.starts_with(':'), "cs tag was {cs}");
    let md = primary.md.as_deref().unwrap();
    assert!(md.chars().all(|c| c.is_ascii_digit()), "MD tag was {md}");
}

#[test]
fn map_without_tags_leaves_them_unset() {
    let reference = random_seq(20_000, 2);
    let aligner = seq_aligner(&reference);
    let hits = aligner.map(&reference[1_000..1_600], None).unwrap();
    assert!(hits.iter().all(|h| h.cs.is_none() && h.md.is_none()));
}

#[test]
fn map_read_pair() {
    let reference = random_seq(20_000, 3);
    let aligner = seq_aligner(&reference);
    let read1 = &reference[2_000..2_300];
    let read2 = revcomp(&reference[2_400..2_700]);

    let hits = aligner
        .map_with(read1, Some(&read2), Some(b"frag1"), false, false)
        .unwrap();

    let first = hits.iter().find(|h| h.read_num == 1 && h.is_primary).unwrap();
    assert_eq!(first.strand, 1);
    let second = hits.iter().find(|h| h.read_num == 2 && h.is_primary).unwrap();
    // the strand refers to the mate as passed in, i.e. reverse
    assert_eq!(second.strand, -1);
    assert!(second.r_st >= first.r_st);
}

#[test]
fn fetch_subsequence() {
    let reference = random_seq(5_000, 4);
    let aligner = seq_aligner(&reference);

    assert_eq!(aligner.seq("N/A", 0, 4).as_deref(), Some(&reference[..4]));
    assert_eq!(
        aligner.seq("N/A", 100, 200).as_deref(),
        Some(&reference[100..200])
    );
    // end is clamped to the contig length
    assert_eq!(
        aligner.seq("N/A", 4_996, 6_000).as_deref(),
        Some(&reference[4_996..])
    );
}

#[test]
fn fetch_empty_or_invalid_window_is_none() {
    let reference = random_seq(5_000, 4);
    let aligner = seq_aligner(&reference);

    assert!(aligner.seq("N/A", 0, 0).is_none());
    assert!(aligner.seq("N/A", 200, 100).is_none());
    assert!(aligner.seq("N/A", 5_000, 5_100).is_none());
    assert!(aligner.seq("N/A", -1, 10).is_none());
    assert!(aligner.seq("no_such_contig", 0, 10).is_none());
}

#[test]
fn index_from_fasta_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let chr1 = random_seq(10_000, 5);
    let chr2 = random_seq(6_000, 6);
    writeln!(file, ">chr1").unwrap();
    file.write_all(&chr1).unwrap();
    writeln!(file, "\n>chr2").unwrap();
    file.write_all(&chr2).unwrap();
    writeln!(file).unwrap();
    file.flush().unwrap();

    let aligner = Aligner::builder()
        .preset(Preset::MapOnt)
        .with_index(file.path(), None)
        .unwrap();

    assert!(aligner.has_index());
    assert_eq!(aligner.n_seq(), 2);
    assert_eq!(aligner.seq_names(), vec!["chr1", "chr2"]);
    assert_eq!(aligner.k(), 15);
    assert_eq!(aligner.seq("chr2", 0, 10).as_deref(), Some(&chr2[..10]));

    let hits = aligner.map(&chr2[1_000..2_000], None).unwrap();
    let primary = hits.iter().find(|h| h.is_primary).unwrap();
    assert_eq!(primary.ctg, "chr2");
}

#[test]
fn stream_fastx_records() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b">r1 some description\nACGT\n>r2\nGGTT\n")
        .unwrap();
    file.flush().unwrap();

    let mut reader = open_fastx(file.path()).unwrap();
    let mut ids = Vec::new();
    let mut seqs = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.unwrap();
        ids.push(record.read_id().to_vec());
        seqs.push(record.seq().into_owned());
    }
    assert_eq!(ids, vec![b"r1".to_vec(), b"r2".to_vec()]);
    assert_eq!(seqs, vec![b"ACGT".to_vec(), b"GGTT".to_vec()]);
}

#[test]
fn map_file_writes_paf() {
    let reference = random_seq(20_000, 7);
    let aligner = seq_aligner(&reference);

    let mut queries = tempfile::NamedTempFile::new().unwrap();
    writeln!(queries, ">q1").unwrap();
    queries.write_all(&reference[3_000..3_600]).unwrap();
    writeln!(queries, "\n>q2").unwrap();
    queries.write_all(&revcomp(&reference[9_000..9_600])).unwrap();
    writeln!(queries).unwrap();
    queries.flush().unwrap();

    let mut out = Vec::new();
    let summary = map_file(&aligner, queries.path(), &mut out, 2, false, false).unwrap();

    assert_eq!(summary.n_queries, 2);
    assert_eq!(summary.n_mapped, 2);
    assert_eq!(summary.n_unmapped, 0);
    assert!(summary.n_records >= 2);

    let paf = String::from_utf8(out).unwrap();
    let rows: Vec<&str> = paf.lines().collect();
    assert_eq!(rows.len(), summary.n_records as usize);
    assert!(rows.iter().any(|r| r.starts_with("q1\t600\t")));
    assert!(rows.iter().any(|r| r.starts_with("q2\t600\t")));
}

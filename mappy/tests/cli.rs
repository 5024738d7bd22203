use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn no_args_fails() {
    let mut cmd = Command::cargo_bin("mappy").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required arguments"));
}

#[test]
fn missing_target_fails() {
    let mut cmd = Command::cargo_bin("mappy").unwrap();
    cmd.args(["fake.fa", "also_fake.fq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn maps_a_query_to_stdout() {
    let mut reference = tempfile::NamedTempFile::new().unwrap();
    // a 600 bp reference of a repeated 30-mer does not chain well, so use a
    // fixed pseudo-random block instead
    let block = b"ACGATTGACCCTGAGCAATCGGTTACTGAC\
                  GGTCAAATCCGTTAGCGATTCAGGACCTTA\
                  TTGCGACAATGGCCAGTAACGTTCGATCAG\
                  CCTAGGATTCACGAGTTACAGCATCGGTAA\
                  GATCCGTTAACGGCATTACGCTAGGTCAAC\
                  TGCATTAGGCCAATCGTTGACAGCTAGGAT";
    let genome: Vec<u8> = block
        .iter()
        .chain(block.iter().rev())
        .chain(block.iter())
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    writeln!(reference, ">ref1").unwrap();
    reference.write_all(&genome).unwrap();
    writeln!(reference).unwrap();
    reference.flush().unwrap();

    let mut query = tempfile::NamedTempFile::new().unwrap();
    writeln!(query, ">q1").unwrap();
    query.write_all(&genome[10..genome.len() - 10]).unwrap();
    writeln!(query).unwrap();
    query.flush().unwrap();

    let mut cmd = Command::cargo_bin("mappy").unwrap();
    cmd.arg(reference.path())
        .arg(query.path())
        .args(["-k", "11", "-w", "5", "-qq"])
        .assert()
        .success()
        .stdout(predicate::str::contains("q1\t").and(predicate::str::contains("ref1")));
}

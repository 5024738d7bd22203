//! PAF output records.
//!
//! A [`PafRecord`] pairs a query name and length with an [`Alignment`] and
//! serializes to one PAF row through serde, so it can be written with a
//! tab-delimited [`csv`] writer. Tag columns carry their PAF type prefixes
//! (`tp:A:`, `ts:A:`, `NM:i:`, `cg:Z:`), with `cs`/`MD` columns only present
//! when the tags were generated at mapping time.
use serde::{Serialize, Serializer};

use crate::mapping::Alignment;

/// One row of PAF output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PafRecord {
    #[serde(serialize_with = "serialize_bytes")]
    pub query_name: Vec<u8>,
    pub query_len: i32,
    pub query_start: i32,
    pub query_end: i32,
    pub strand: char,
    #[serde(serialize_with = "serialize_bytes")]
    pub target_name: Vec<u8>,
    pub target_len: i32,
    pub target_start: i32,
    pub target_end: i32,
    pub match_len: i32,
    pub block_len: i32,
    pub mapq: u8,
    #[serde(serialize_with = "serialize_tp")]
    pub tp: char,
    #[serde(serialize_with = "serialize_ts")]
    pub ts: char,
    #[serde(serialize_with = "serialize_nm")]
    pub nm: i32,
    #[serde(serialize_with = "serialize_cg")]
    pub cg: String,
    #[serde(serialize_with = "serialize_cs", skip_serializing_if = "Option::is_none")]
    pub cs: Option<String>,
    #[serde(serialize_with = "serialize_md", skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
}

impl PafRecord {
    /// Build a PAF row for one alignment of the named query.
    pub fn new(query_name: &[u8], query_len: usize, aln: &Alignment) -> Self {
        Self {
            query_name: query_name.to_vec(),
            query_len: query_len as i32,
            query_start: aln.q_st,
            query_end: aln.q_en,
            strand: aln.strand_char(),
            target_name: aln.ctg.as_bytes().to_vec(),
            target_len: aln.ctg_len,
            target_start: aln.r_st,
            target_end: aln.r_en,
            match_len: aln.mlen,
            block_len: aln.blen,
            mapq: aln.mapq,
            tp: if aln.is_primary { 'P' } else { 'S' },
            ts: match aln.trans_strand {
                t if t > 0 => '+',
                t if t < 0 => '-',
                _ => '.',
            },
            nm: aln.nm,
            cg: aln.cigar_str(),
            cs: aln.cs.clone(),
            md: aln.md.clone(),
        }
    }
}

/// Serialize `Vec<u8>` as a UTF-8 string
fn serialize_bytes<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = String::from_utf8_lossy(bytes);
    serializer.serialize_str(&s)
}

/// Serialize the tp tag, e.g. `tp:A:P`
fn serialize_tp<S>(value: &char, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("tp:A:{}", value))
}

/// Serialize the ts tag, e.g. `ts:A:.`
fn serialize_ts<S>(value: &char, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("ts:A:{}", value))
}

/// Serialize the NM tag, e.g. `NM:i:5`
fn serialize_nm<S>(value: &i32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("NM:i:{}", value))
}

/// Serialize the cg tag, e.g. `cg:Z:100M`
fn serialize_cg<S>(value: &String, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("cg:Z:{}", value))
}

/// Serialize the cs tag, e.g. `cs:Z::100`
fn serialize_cs<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("cs:Z:{}", value.as_deref().unwrap_or_default()))
}

/// Serialize the MD tag, e.g. `MD:Z:100`
fn serialize_md<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("MD:Z:{}", value.as_deref().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_alignment() -> Alignment {
        Alignment {
            ctg: "MT_human".to_string(),
            ctg_len: 16569,
            r_st: 100,
            r_en: 200,
            q_st: 0,
            q_en: 100,
            strand: 1,
            trans_strand: 0,
            blen: 100,
            mlen: 100,
            nm: 0,
            mapq: 60,
            is_primary: true,
            read_num: 1,
            cigar: vec![(100, 0)],
            cs: None,
            md: None,
        }
    }

    fn write_row(record: &PafRecord) -> String {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_writer(vec![]);
        wtr.serialize(record).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_serialize_paf_row() {
        let record = PafRecord::new(b"read1", 100, &example_alignment());
        let expected = "read1\t100\t0\t100\t+\tMT_human\t16569\t100\t200\t100\t100\t60\ttp:A:P\tts:A:.\tNM:i:0\tcg:Z:100M\n";
        assert_eq!(write_row(&record), expected);
    }

    #[test]
    fn test_serialize_paf_row_with_tags() {
        let mut aln = example_alignment();
        aln.cs = Some(":100".to_string());
        aln.md = Some("100".to_string());
        let record = PafRecord::new(b"read1", 100, &aln);
        let row = write_row(&record);
        assert!(row.trim_end().ends_with("cg:Z:100M\tcs:Z::100\tMD:Z:100"));
    }

    #[test]
    fn test_secondary_reverse_row() {
        let mut aln = example_alignment();
        aln.strand = -1;
        aln.is_primary = false;
        let record = PafRecord::new(b"read2", 150, &aln);
        let row = write_row(&record);
        assert!(row.contains("\t-\t"));
        assert!(row.contains("tp:A:S"));
    }
}

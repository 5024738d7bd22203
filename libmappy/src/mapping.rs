//! The flattened, owned alignment record produced by mapping.
use std::ffi::CStr;
use std::fmt;

use minimap2_sys::{mm_idx_t, mm_reg1_t};

/// CIGAR operator characters, indexed by the packed operation code.
pub const CIGAR_CHARS: &[u8; 10] = b"MIDNSHP=XB";

/// One query-to-reference alignment.
///
/// All coordinates are zero-based, half-open, and consistent with the length
/// of the contig the query mapped to. The record owns all of its data; the
/// native minimap2 result it was converted from is freed by the caller of the
/// conversion before the record is handed out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alignment {
    /// Name of the reference sequence the query is mapped to.
    pub ctg: String,
    /// Total length of the reference sequence.
    pub ctg_len: i32,
    /// Start position on the reference.
    pub r_st: i32,
    /// End position on the reference.
    pub r_en: i32,
    /// Start position on the query.
    pub q_st: i32,
    /// End position on the query.
    pub q_en: i32,
    /// +1 on the forward strand, -1 on the reverse strand.
    pub strand: i8,
    /// Transcript strand: +1 forward, -1 reverse, 0 unknown.
    pub trans_strand: i8,
    /// Length of the alignment, including both matches and gaps but
    /// excluding ambiguous bases.
    pub blen: i32,
    /// Length of the matching bases, excluding ambiguous base matches.
    pub mlen: i32,
    /// Number of mismatches, gaps and ambiguous positions in the alignment.
    pub nm: i32,
    /// Mapping quality.
    pub mapq: u8,
    /// Whether the alignment is primary (typically the best and the first
    /// to be generated).
    pub is_primary: bool,
    /// Read number the alignment corresponds to; 1 for the first read in a
    /// fragment and 2 for its mate.
    pub read_num: i32,
    /// CIGAR operations as (length, packed operation code) pairs. Decode the
    /// code with [`CIGAR_CHARS`].
    pub cigar: Vec<(u32, u8)>,
    /// The cs tag, if requested at mapping time.
    pub cs: Option<String>,
    /// The MD tag as in the SAM format, if requested at mapping time.
    pub md: Option<String>,
}

impl Alignment {
    /// Convert one native mapping result into an owned record, copying the
    /// contig name and the CIGAR buffer out of minimap2-owned memory.
    ///
    /// `flip_strand` undoes the reverse complement applied to the second
    /// read of a fragment before mapping.
    ///
    /// # Safety
    ///
    /// `mi` must be the live index `reg` was produced against, and `reg.p`
    /// (when non-null) must point to the extras block allocated by minimap2.
    pub(crate) unsafe fn from_reg(mi: *const mm_idx_t, reg: &mm_reg1_t, flip_strand: bool) -> Self {
        let idx_seq = (*mi).seq.offset(reg.rid as isize);
        let ctg = CStr::from_ptr((*idx_seq).name)
            .to_string_lossy()
            .into_owned();
        let ctg_len = (*idx_seq).len as i32;

        let rev = (reg.rev() != 0) != flip_strand;
        let strand: i8 = if rev { -1 } else { 1 };

        let (cigar, nm, trans_strand) = if reg.p.is_null() {
            (Vec::new(), reg.blen - reg.mlen, 0i8)
        } else {
            let p = reg.p;
            let n_cigar = (*p).n_cigar as usize;
            let cigar: Vec<(u32, u8)> = (*p)
                .cigar
                .as_slice(n_cigar)
                .iter()
                .map(|&c| (c >> 4, (c & 0xf) as u8))
                .collect();
            let nm = reg.blen - reg.mlen + (*p).n_ambi() as i32;
            let trans_strand = match (*p).trans_strand() {
                1 => 1i8,
                2 => -1i8,
                _ => 0i8,
            };
            (cigar, nm, trans_strand)
        };

        Alignment {
            ctg,
            ctg_len,
            r_st: reg.rs,
            r_en: reg.re,
            q_st: reg.qs,
            q_en: reg.qe,
            strand,
            trans_strand,
            blen: reg.blen,
            mlen: reg.mlen,
            nm,
            mapq: reg.mapq() as u8,
            is_primary: reg.id == reg.parent,
            read_num: reg.seg_id() as i32 + 1,
            cigar,
            cs: None,
            md: None,
        }
    }

    /// The CIGAR as a string, e.g. `101M2D40M`.
    pub fn cigar_str(&self) -> String {
        let mut s = String::with_capacity(self.cigar.len() * 4);
        for &(len, op) in &self.cigar {
            s.push_str(&len.to_string());
            s.push(CIGAR_CHARS[(op as usize) % CIGAR_CHARS.len()] as char);
        }
        s
    }

    /// The strand as a PAF character: `+`, `-`, or `?` when unknown.
    pub fn strand_char(&self) -> char {
        match self.strand {
            s if s > 0 => '+',
            s if s < 0 => '-',
            _ => '?',
        }
    }
}

/// Formats the alignment as the PAF columns after QueryName and QueryLength,
/// with `tp`, `ts` and `cg` tags (and `cs` if present).
impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tp = if self.is_primary { 'P' } else { 'S' };
        let ts = match self.trans_strand {
            t if t > 0 => '+',
            t if t < 0 => '-',
            _ => '.',
        };
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\ttp:A:{}\tts:A:{}\tcg:Z:{}",
            self.q_st,
            self.q_en,
            self.strand_char(),
            self.ctg,
            self.ctg_len,
            self.r_st,
            self.r_en,
            self.mlen,
            self.blen,
            self.mapq,
            tp,
            ts,
            self.cigar_str(),
        )?;
        if let Some(cs) = &self.cs {
            write!(f, "\tcs:Z:{}", cs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Alignment {
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

    #[test]
    fn test_cigar_str() {
        let mut aln = example();
        aln.cigar = vec![(10, 0), (2, 1), (5, 0), (3, 2), (1, 7)];
        assert_eq!(aln.cigar_str(), "10M2I5M3D1=");
    }

    #[test]
    fn test_display_paf_body() {
        let aln = example();
        assert_eq!(
            aln.to_string(),
            "0\t100\t+\tMT_human\t16569\t100\t200\t100\t100\t60\ttp:A:P\tts:A:.\tcg:Z:100M"
        );
    }

    #[test]
    fn test_display_with_cs() {
        let mut aln = example();
        aln.cs = Some(":100".to_string());
        assert!(aln.to_string().ends_with("\tcs:Z::100"));
    }

    #[test]
    fn test_display_reverse_secondary() {
        let mut aln = example();
        aln.strand = -1;
        aln.is_primary = false;
        aln.trans_strand = -1;
        let line = aln.to_string();
        assert!(line.contains("\t-\t"));
        assert!(line.contains("tp:A:S"));
        assert!(line.contains("ts:A:-"));
    }
}

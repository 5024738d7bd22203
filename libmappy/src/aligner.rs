//! The safe wrapper around minimap2's indexer and mapper.
use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use minimap2_sys::*;

use crate::error::MappyError;
use crate::mapping::Alignment;
use crate::preset::Preset;
use crate::seq::revcomp;
use crate::thread_buf::with_buf;
use crate::Result;

/// minimap2 caps k-mer length at 28 (two-bit packed into a 64-bit word).
const MAX_KMER_SIZE: i32 = 28;

pub(crate) type IdxOpt = mm_idxopt_t;
pub(crate) type MapOpt = mm_mapopt_t;

/// An aligner that maps query sequences against a minimap2 index.
///
/// `Aligner` doubles as its own builder: create one with [`Aligner::builder`],
/// chain option setters, then finish with [`with_index`](Aligner::with_index)
/// (FASTA/FASTQ file or prebuilt `.mmi`) or
/// [`with_seq_index`](Aligner::with_seq_index) (in-memory, single sequence).
///
/// Once the index is built it is read-only and the aligner can be shared
/// freely across threads; each mapping call uses a thread-local scratch
/// buffer internally.
///
/// # Examples
///
/// ```no_run
/// use libmappy::{Aligner, Preset};
///
/// # fn main() -> libmappy::Result<()> {
/// let aligner = Aligner::builder()
///     .preset(Preset::MapOnt)
///     .with_index("ref.fa", None)?;
///
/// for hit in aligner.map(b"ACGTACGTACGT", Some(b"query1"))? {
///     println!("{}", hit);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Aligner {
    /// Index options passed to minimap2 (mm_idxopt_t)
    pub idxopt: IdxOpt,

    /// Mapping options passed to minimap2 (mm_mapopt_t)
    pub mapopt: MapOpt,

    /// Number of threads to create the index with
    pub threads: usize,

    /// Index created by minimap2
    pub(crate) idx: Option<*mut mm_idx_t>,
}

// The index and option structs are never mutated after construction; mapping
// takes &self and its scratch state is thread-local.
mod send {
    use super::*;
    unsafe impl Sync for Aligner {}
    unsafe impl Send for Aligner {}
}

impl Default for Aligner {
    fn default() -> Self {
        Self {
            idxopt: Default::default(),
            mapopt: Default::default(),
            threads: 1,
            idx: None,
        }
    }
}

impl Aligner {
    /// Create a new aligner with minimap2's default options.
    ///
    /// Alignment (CIGAR generation) is always enabled, and the index batch
    /// size is raised so the whole reference lands in a single index part.
    pub fn builder() -> Self {
        let mut aligner = Aligner::default();

        let result = unsafe {
            mm_set_opt(
                ptr::null::<c_char>(),
                &mut aligner.idxopt,
                &mut aligner.mapopt,
            )
        };
        // the NULL preset only initialises defaults and cannot fail
        debug_assert_eq!(result, 0);

        aligner.mapopt.flag |= MM_F_CIGAR as i64;
        aligner.idxopt.batch_size = 0x7fffffffffffffff;

        aligner
    }

    /// Apply a named preset. Call this before any individual option setter,
    /// as presets overwrite both the index and mapping options.
    pub fn preset(mut self, preset: Preset) -> Self {
        let result = unsafe {
            mm_set_opt(
                preset.as_bytes().as_ptr() as *const c_char,
                &mut self.idxopt,
                &mut self.mapopt,
            )
        };
        // every Preset variant names a preset minimap2 knows
        debug_assert_eq!(result, 0);

        self.mapopt.flag |= MM_F_CIGAR as i64;
        self.idxopt.batch_size = 0x7fffffffffffffff;
        self
    }

    /// Set the minimizer k-mer size.
    pub fn k(mut self, k: i32) -> Self {
        self.idxopt.k = narrow_opt(k);
        self
    }

    /// Set the minimizer window size.
    pub fn w(mut self, w: i32) -> Self {
        self.idxopt.w = narrow_opt(w);
        self
    }

    /// Use homopolymer-compressed k-mers when building the index.
    pub fn hpc(mut self, yes: bool) -> Self {
        if yes {
            self.idxopt.flag |= MM_I_HPC as i16;
        } else {
            self.idxopt.flag &= !(MM_I_HPC as i16);
        }
        self
    }

    /// Set the number of bits used for the minimizer hash table buckets.
    pub fn bucket_bits(mut self, bits: i32) -> Self {
        self.idxopt.bucket_bits = narrow_opt(bits);
        self
    }

    /// Set the minimum number of minimizers on a chain.
    pub fn min_cnt(mut self, min_cnt: i32) -> Self {
        self.mapopt.min_cnt = min_cnt;
        self
    }

    /// Set the minimum chaining score.
    pub fn min_chain_score(mut self, score: i32) -> Self {
        self.mapopt.min_chain_score = score;
        self
    }

    /// Drop an alignment if the score of its best-scoring segment is below
    /// this threshold.
    pub fn min_dp_score(mut self, score: i32) -> Self {
        self.mapopt.min_dp_max = score;
        self
    }

    /// Set the alignment bandwidth.
    pub fn bandwidth(mut self, bw: i32) -> Self {
        self.mapopt.bw = bw;
        self
    }

    /// Subject the top `best_n` chains to DP alignment.
    pub fn best_n(mut self, best_n: i32) -> Self {
        self.mapopt.best_n = best_n;
        self
    }

    /// Set the maximum fragment length for paired mapping.
    pub fn max_frag_len(mut self, len: i32) -> Self {
        self.mapopt.max_frag_len = len;
        self
    }

    /// OR extra `MM_F_*` flags into the mapping options.
    pub fn extra_flags(mut self, flags: i64) -> Self {
        self.mapopt.flag |= flags;
        self
    }

    /// Set the alignment scoring: match score, mismatch penalty, gap open
    /// and gap extension costs. The long-gap costs are set to the same
    /// open/extension values; use [`long_gap`](Aligner::long_gap) to change
    /// them afterwards.
    pub fn scoring(mut self, a: i32, b: i32, gap_open: i32, gap_ext: i32) -> Self {
        self.mapopt.a = a;
        self.mapopt.b = b;
        self.mapopt.q = gap_open;
        self.mapopt.e = gap_ext;
        self.mapopt.q2 = gap_open;
        self.mapopt.e2 = gap_ext;
        self
    }

    /// Set the long-gap open and extension costs.
    pub fn long_gap(mut self, gap_open: i32, gap_ext: i32) -> Self {
        self.mapopt.q2 = gap_open;
        self.mapopt.e2 = gap_ext;
        self
    }

    /// Set the score used when one or both bases are ambiguous.
    pub fn ambiguous_score(mut self, sc: i32) -> Self {
        self.mapopt.sc_ambi = sc;
        self
    }

    /// Set `--dual=yes` (`true`) or `--dual=no` (`false`). When dual is off,
    /// query-target pairs wherein the query name is lexicographically
    /// greater than the target name are skipped. Mostly relevant for
    /// all-vs-all overlapping presets.
    pub fn dual(mut self, yes: bool) -> Self {
        if yes {
            self.mapopt.flag &= !(MM_F_NO_DUAL as i64);
        } else {
            self.mapopt.flag |= MM_F_NO_DUAL as i64;
        }
        self
    }

    /// Sets the number of threads minimap2 will use for building the index.
    pub fn index_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Reject option combinations minimap2 would corrupt memory on instead
    /// of reporting.
    fn check_index_opts(&self) -> Result<()> {
        let k = self.idxopt.k as i32;
        let w = self.idxopt.w as i32;
        let bits = self.idxopt.bucket_bits as i32;
        if k <= 0 || k > MAX_KMER_SIZE {
            return Err(MappyError::InvalidOption(format!(
                "k-mer size must be between 1 and {MAX_KMER_SIZE}, got {k}"
            )));
        }
        if w <= 0 {
            return Err(MappyError::InvalidOption(format!(
                "window size must be positive, got {w}"
            )));
        }
        if bits <= 0 || bits > 31 {
            return Err(MappyError::InvalidOption(format!(
                "bucket bits must be between 1 and 31, got {bits}"
            )));
        }
        Ok(())
    }

    /// Build (or load) the index from a FASTA/FASTQ file, which may be
    /// gzip-compressed, or from a prebuilt minimap2 `.mmi` index.
    ///
    /// If `output` is given, the index is also dumped to that path so later
    /// runs can load it directly.
    pub fn with_index<P: AsRef<Path>>(mut self, path: P, output: Option<&Path>) -> Result<Self> {
        self.check_index_opts()?;

        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| {
            MappyError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;
        if meta.len() == 0 {
            return Err(MappyError::IndexError(format!(
                "{} is empty",
                path.display()
            )));
        }

        let path_c = CString::new(path.as_os_str().as_bytes())?;
        let output_c = match output {
            Some(out) => Some(CString::new(out.as_os_str().as_bytes())?),
            None => None,
        };
        let output_ptr = output_c.as_ref().map_or(ptr::null(), |c| c.as_ptr());

        let idx = unsafe {
            let reader = mm_idx_reader_open(path_c.as_ptr(), &self.idxopt, output_ptr);
            if reader.is_null() {
                return Err(MappyError::IndexError(format!(
                    "failed to open {} for indexing",
                    path.display()
                )));
            }

            let idx = mm_idx_reader_read(reader, self.threads as c_int);
            mm_idx_reader_close(reader);
            if idx.is_null() {
                return Err(MappyError::IndexError(format!(
                    "failed to read an index from {}",
                    path.display()
                )));
            }

            mm_mapopt_update(&mut self.mapopt, idx);
            mm_idx_index_name(idx);
            idx
        };

        self.idx = Some(idx);
        Ok(self)
    }

    /// Build an in-memory index from a single raw sequence, using the
    /// current `k`, `w`, homopolymer-compression and bucket-bits settings.
    ///
    /// The sequence is registered under the contig name `N/A`. Seed
    /// occurrence filtering is effectively disabled, as a single-sequence
    /// index has too little context for the occurrence cutoff heuristic.
    pub fn with_seq_index(mut self, seq: &[u8]) -> Result<Self> {
        self.check_index_opts()?;
        if seq.is_empty() {
            return Err(MappyError::EmptySequence);
        }

        let seq_c = CString::new(seq)?;
        let name_c = CString::new("N/A").expect("static name has no NUL");
        let mut seq_ptr: *const c_char = seq_c.as_ptr();
        let mut name_ptr: *const c_char = name_c.as_ptr();

        let idx = unsafe {
            let idx = mm_idx_str(
                self.idxopt.w as c_int,
                self.idxopt.k as c_int,
                (self.idxopt.flag as i32 & MM_I_HPC as i32) as c_int,
                self.idxopt.bucket_bits as c_int,
                1,
                &mut seq_ptr,
                &mut name_ptr,
            );
            if idx.is_null() {
                return Err(MappyError::IndexError(
                    "failed to build an index from the given sequence".to_string(),
                ));
            }
            mm_mapopt_update(&mut self.mapopt, idx);
            mm_idx_index_name(idx);
            idx
        };

        // don't filter high-occurrence seeds on a single-sequence index
        self.mapopt.mid_occ = 1000;

        self.idx = Some(idx);
        Ok(self)
    }

    /// Map a query sequence against the index.
    ///
    /// Returns every hit minimap2 reports, primary and secondary, in the
    /// order minimap2 produced them. The native result buffers are copied
    /// into owned [`Alignment`] records and freed before this returns.
    pub fn map(&self, seq: &[u8], query_name: Option<&[u8]>) -> Result<Vec<Alignment>> {
        self.map_with(seq, None, query_name, false, false)
    }

    /// Map a query, or a read pair, with optional `cs`/`MD` tag generation.
    ///
    /// When `seq2` is given, the pair is mapped in fragment mode: the mate
    /// is reverse-complemented before mapping and the strand of its hits is
    /// flipped back afterwards, so strands refer to the mate as passed in.
    /// The mate's query coordinates are left as minimap2 reported them,
    /// i.e. on its reverse-complemented form. [`Alignment::read_num`] tells
    /// the two reads apart.
    pub fn map_with(
        &self,
        seq: &[u8],
        seq2: Option<&[u8]>,
        query_name: Option<&[u8]>,
        cs: bool,
        md: bool,
    ) -> Result<Vec<Alignment>> {
        let idx = self.idx.ok_or(MappyError::MissingIndex)?;
        if seq.is_empty() || seq2.is_some_and(|s| s.is_empty()) {
            return Err(MappyError::EmptySequence);
        }

        let qname_c = query_name.map(CString::new).transpose()?;
        let qname_ptr = qname_c.as_ref().map_or(ptr::null(), |c| c.as_ptr());

        // NUL-terminated copies are only needed for tag generation
        let seq1_c = if cs || md {
            Some(CString::new(seq)?)
        } else {
            None
        };

        let mut alignments = Vec::new();

        with_buf(|buf| -> Result<()> {
            match seq2 {
                None => unsafe {
                    let mut n_regs: c_int = 0;
                    let regs = mm_map(
                        idx as *const mm_idx_t,
                        seq.len() as c_int,
                        seq.as_ptr() as *const c_char,
                        &mut n_regs,
                        buf,
                        &self.mapopt,
                        qname_ptr,
                    );
                    self.drain_regs(
                        idx,
                        regs,
                        n_regs,
                        false,
                        seq1_c.as_deref(),
                        cs,
                        md,
                        buf,
                        &mut alignments,
                    );
                    Ok(())
                },
                Some(seq2) => unsafe {
                    let mate = revcomp(seq2);
                    let mate_c = if cs || md {
                        Some(CString::new(mate.as_slice())?)
                    } else {
                        None
                    };

                    let qlens = [seq.len() as c_int, mate.len() as c_int];
                    let mut seqs = [
                        seq.as_ptr() as *const c_char,
                        mate.as_ptr() as *const c_char,
                    ];
                    let mut n_regs = [0 as c_int; 2];
                    let mut regs: [*mut mm_reg1_t; 2] = [ptr::null_mut(); 2];

                    mm_map_frag(
                        idx as *const mm_idx_t,
                        2,
                        qlens.as_ptr(),
                        seqs.as_mut_ptr(),
                        n_regs.as_mut_ptr(),
                        regs.as_mut_ptr(),
                        buf,
                        &self.mapopt,
                        qname_ptr,
                    );

                    self.drain_regs(
                        idx,
                        regs[0],
                        n_regs[0],
                        false,
                        seq1_c.as_deref(),
                        cs,
                        md,
                        buf,
                        &mut alignments,
                    );
                    self.drain_regs(
                        idx,
                        regs[1],
                        n_regs[1],
                        true,
                        mate_c.as_deref(),
                        cs,
                        md,
                        buf,
                        &mut alignments,
                    );
                    Ok(())
                },
            }
        })?;

        Ok(alignments)
    }

    /// Convert and free one native result array.
    ///
    /// Tags are generated from the thread buffer's allocation pool, which is
    /// reclaimed when the buffer is recycled; the regs array and the extras
    /// block of every hit are freed here.
    #[allow(clippy::too_many_arguments)]
    unsafe fn drain_regs(
        &self,
        idx: *const mm_idx_t,
        regs: *mut mm_reg1_t,
        n_regs: c_int,
        flip_strand: bool,
        seq_c: Option<&CStr>,
        cs: bool,
        md: bool,
        buf: *mut mm_tbuf_t,
        out: &mut Vec<Alignment>,
    ) {
        if regs.is_null() {
            return;
        }

        let km = mm_tbuf_get_km(buf);
        let mut tag_buf: *mut c_char = ptr::null_mut();
        let mut tag_cap: c_int = 0;

        out.reserve(n_regs as usize);
        for i in 0..n_regs {
            let reg_ptr = regs.offset(i as isize);
            let reg = &*reg_ptr;
            let mut aln = Alignment::from_reg(idx, reg, flip_strand);

            if let Some(seq_c) = seq_c {
                if !reg.p.is_null() {
                    if cs {
                        let len = mm_gen_cs(
                            km,
                            &mut tag_buf,
                            &mut tag_cap,
                            idx,
                            reg_ptr,
                            seq_c.as_ptr(),
                            1,
                        );
                        aln.cs = Some(tag_to_string(tag_buf, len));
                    }
                    if md {
                        let len =
                            mm_gen_MD(km, &mut tag_buf, &mut tag_cap, idx, reg_ptr, seq_c.as_ptr());
                        aln.md = Some(tag_to_string(tag_buf, len));
                    }
                }
            }

            out.push(aln);
            libc::free(reg.p as *mut c_void);
        }
        libc::free(regs as *mut c_void);
    }

    /// Fetch a subsequence of an indexed contig by name.
    ///
    /// Coordinates are zero-based and half-open; `end` is clamped to the
    /// contig length. Returns `None` for an unknown contig name or an empty
    /// or out-of-range window. Note the distinction deliberately collapses:
    /// a window that selects nothing is treated as not found, never as an
    /// empty sequence.
    pub fn seq(&self, name: &str, start: i32, end: i32) -> Option<Vec<u8>> {
        let idx = self.idx?;
        let name_c = CString::new(name).ok()?;

        unsafe {
            let rid = mm_idx_name2id(idx, name_c.as_ptr());
            if rid < 0 || rid as u32 >= (*idx).n_seq {
                return None;
            }
            let ctg_len = (*(*idx).seq.offset(rid as isize)).len as i32;
            if start < 0 || start >= ctg_len || start >= end {
                return None;
            }
            let end = end.min(ctg_len);

            let mut buf = vec![0u8; (end - start) as usize];
            let n = mm_idx_getseq(idx, rid as u32, start as u32, end as u32, buf.as_mut_ptr());
            if n < 0 {
                return None;
            }
            buf.truncate(n as usize);
            for b in &mut buf {
                *b = b"ACGTN"[(*b).min(4) as usize];
            }
            Some(buf)
        }
    }

    /// The k-mer size of the index (or the configured one if no index is
    /// built yet).
    pub fn k(&self) -> i32 {
        match self.idx {
            Some(idx) => unsafe { (*idx).k },
            None => self.idxopt.k as i32,
        }
    }

    /// The minimizer window size of the index (or the configured one if no
    /// index is built yet).
    pub fn w(&self) -> i32 {
        match self.idx {
            Some(idx) => unsafe { (*idx).w },
            None => self.idxopt.w as i32,
        }
    }

    /// The number of reference sequences in the index.
    pub fn n_seq(&self) -> u32 {
        match self.idx {
            Some(idx) => unsafe { (*idx).n_seq },
            None => 0,
        }
    }

    /// The names of the reference sequences in the index, in index order.
    pub fn seq_names(&self) -> Vec<String> {
        let Some(idx) = self.idx else {
            return Vec::new();
        };
        let mut names = Vec::with_capacity(self.n_seq() as usize);
        unsafe {
            for rid in 0..(*idx).n_seq {
                let name = (*(*idx).seq.offset(rid as isize)).name;
                names.push(CStr::from_ptr(name).to_string_lossy().into_owned());
            }
        }
        names
    }

    /// Whether an index has been built or loaded.
    pub fn has_index(&self) -> bool {
        self.idx.is_some()
    }
}

impl Drop for Aligner {
    fn drop(&mut self) {
        if let Some(idx) = self.idx.take() {
            if !idx.is_null() {
                unsafe { mm_idx_destroy(idx) };
            }
        }
    }
}

/// Narrow an option value to minimap2's 16-bit storage. A value outside the
/// `i16` range becomes -1 so that validation rejects it rather than a
/// wrapped value slipping through.
fn narrow_opt(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(-1)
}

/// Copy a tag buffer produced by `mm_gen_cs`/`mm_gen_MD` into an owned
/// string. A non-positive length means the tag is empty.
unsafe fn tag_to_string(buf: *const c_char, len: c_int) -> String {
    if buf.is_null() || len <= 0 {
        return String::new();
    }
    let bytes = std::slice::from_raw_parts(buf as *const u8, len as usize);
    String::from_utf8_lossy(bytes).into_owned()
}

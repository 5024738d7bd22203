//! Map every record of a FASTA/FASTQ file against an index, writing PAF.
//!
//! A producer thread streams query records into a bounded channel while a
//! rayon pool maps them in parallel, each worker using its own thread-local
//! minimap2 buffer. PAF rows go through a mutex-guarded csv writer, so rows
//! from one query stay contiguous but query order follows completion order.
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel as channel;
use log::{debug, trace};
use rayon::prelude::*;

use crate::error::MappyError;
use crate::io::{self, FastxRecordExt, Message};
use crate::paf::PafRecord;
use crate::{Aligner, Result};

/// What happened while mapping a query file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapSummary {
    /// Number of query records processed.
    pub n_queries: u64,
    /// Number of queries with at least one hit.
    pub n_mapped: u64,
    /// Number of queries with no hit at all.
    pub n_unmapped: u64,
    /// Number of PAF rows written.
    pub n_records: u64,
}

/// Map all records in `query_path` against the aligner's index with
/// `threads` worker threads, writing PAF rows to `writer`.
///
/// `cs` and `md` request the corresponding tags on every row.
pub fn map_file<P, W>(
    aligner: &Aligner,
    query_path: P,
    writer: W,
    threads: usize,
    cs: bool,
    md: bool,
) -> Result<MapSummary>
where
    P: AsRef<Path>,
    W: Write + Send,
{
    if !aligner.has_index() {
        return Err(MappyError::MissingIndex);
    }

    // Bounded channel to control memory usage - i.e., 10000 records in the channel at a time
    let (sender, receiver) = channel::bounded(10000);
    let query_path = query_path.as_ref().to_path_buf();

    // Producer: read query records and send them to the channel
    let producer = std::thread::spawn(move || -> Result<()> {
        let mut fastx_reader = io::open_fastx(&query_path)?;

        while let Some(record) = fastx_reader.next() {
            match record {
                Ok(rec) => {
                    let msg = Message::Data((rec.read_id().to_owned(), rec.seq().into_owned()));
                    if sender.send(msg).is_err() {
                        break; // Exit if the receiver is dropped
                    }
                }
                Err(e) => {
                    return Err(MappyError::FastxParseError(format!(
                        "Error parsing query file {}: {e}",
                        query_path.display()
                    )));
                }
            }
        }

        // Close the channel to signal that no more records will be sent
        drop(sender);
        Ok(())
    });

    let writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(writer);
    let writer = Arc::new(Mutex::new(writer)); // thread-safe writer

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| MappyError::ThreadError(format!("Error setting number of threads: {e}")))?;

    let n_queries = AtomicU64::new(0);
    let n_unmapped = AtomicU64::new(0);
    let n_records = AtomicU64::new(0);

    debug!("Mapping queries and writing PAF rows...");
    // Consumer: process records from the channel in parallel
    pool.install(|| -> Result<()> {
        receiver
            .into_iter()
            .par_bridge()
            .try_for_each(|record| -> Result<()> {
                let Message::Data((rid, seq)) = record;
                trace!("Mapping query: {}", String::from_utf8_lossy(&rid));

                let hits = aligner.map_with(&seq, None, Some(&rid), cs, md)?;
                n_queries.fetch_add(1, Ordering::Relaxed);

                if hits.is_empty() {
                    trace!("No hits for query: {}", String::from_utf8_lossy(&rid));
                    n_unmapped.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }

                let mut writer_lock = writer.lock().unwrap();
                for aln in &hits {
                    writer_lock.serialize(PafRecord::new(&rid, seq.len(), aln))?;
                    n_records.fetch_add(1, Ordering::Relaxed);
                }

                Ok(())
            })
    })?;

    // Wait for the producer to finish
    producer
        .join()
        .map_err(|e| MappyError::ThreadError(format!("Thread panicked when joining: {e:?}")))??;

    // recover the writer so buffered rows are flushed before returning
    let writer = Arc::try_unwrap(writer)
        .map_err(|_| MappyError::ThreadError("Error unwrapping the PAF writer Arc".to_string()))?
        .into_inner()
        .map_err(|_| MappyError::ThreadError("Error unwrapping the PAF writer Mutex".to_string()))?;
    let mut inner = writer
        .into_inner()
        .map_err(|e| MappyError::PafWriteError(e.to_string()))?;
    inner.flush()?;

    let n_queries = n_queries.load(Ordering::Relaxed);
    let n_unmapped = n_unmapped.load(Ordering::Relaxed);
    let summary = MapSummary {
        n_queries,
        n_mapped: n_queries - n_unmapped,
        n_unmapped,
        n_records: n_records.load(Ordering::Relaxed),
    };
    debug!(
        "Mapped {}/{} queries ({} PAF rows)",
        summary.n_mapped, summary.n_queries, summary.n_records
    );

    Ok(summary)
}

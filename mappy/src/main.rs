use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use libmappy::Aligner;
use log::{debug, info, LevelFilter};

mod cli;

fn setup_logging(quiet: u8, verbose: u8) {
    let sum = verbose as i16 - quiet as i16;
    let lvl = match sum {
        1 => LevelFilter::Debug,
        2.. => LevelFilter::Trace,
        -1 => LevelFilter::Warn,
        -2 => LevelFilter::Error,
        i if i < -2 => LevelFilter::Off,
        _ => LevelFilter::Info,
    };
    let mut log_builder = env_logger::Builder::new();
    log_builder.filter(None, lvl);
    log_builder.init();
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    setup_logging(args.quiet, args.verbose);
    debug!("{:?}", args);

    libmappy::reset_timer();
    // pass the output level through to minimap2's own messages
    if args.verbose > 1 {
        libmappy::set_verbosity(3);
    } else if args.quiet > 0 {
        libmappy::set_verbosity(1);
    }

    let mut builder = Aligner::builder().preset(args.preset);
    if let Some(k) = args.kmer_size {
        builder = builder.k(k);
    }
    if let Some(w) = args.window_size {
        builder = builder.w(w);
    }
    if args.hpc {
        builder = builder.hpc(true);
    }
    builder = builder.index_threads(args.threads);

    info!("Indexing {:?}...", args.target);
    let aligner = builder
        .with_index(&args.target, args.dump_index.as_deref())
        .context("Failed to build the index")?;
    info!(
        "Indexed {} sequence(s) (k={}, w={}) in {:.2}s",
        aligner.n_seq(),
        aligner.k(),
        aligner.w(),
        libmappy::elapsed().as_secs_f32()
    );
    if let Some(path) = &args.dump_index {
        info!("Dumped the index to {:?}", path);
    }

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    info!("Mapping {:?}...", args.query);
    let summary = libmappy::map_file(
        &aligner,
        &args.query,
        writer,
        args.threads,
        args.cs,
        args.md,
    )
    .context("Failed to map the query file")?;

    info!(
        "Mapped {}/{} queries ({} unmapped), wrote {} PAF record(s) in {:.2}s",
        summary.n_mapped,
        summary.n_queries,
        summary.n_unmapped,
        summary.n_records,
        libmappy::elapsed().as_secs_f32()
    );

    info!("Done!");
    Ok(())
}

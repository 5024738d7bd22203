use std::ffi::OsStr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use libmappy::{MappyError, Preset};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Reference FASTA/FASTQ file (optionally gzip-compressed) or a prebuilt minimap2 index (.mmi)
    #[arg(name = "TARGET", value_parser = check_path_exists)]
    pub target: PathBuf,

    /// Query FASTA/FASTQ file
    #[arg(name = "QUERY", value_parser = check_path_exists)]
    pub query: PathBuf,

    /// Minimap2 preset, e.g. map-ont, map-hifi, sr, asm5, ava-ont
    #[arg(short = 'x', long, value_name = "PRESET", default_value = "map-ont", value_parser = parse_preset)]
    pub preset: Preset,

    /// Minimizer k-mer size (overrides the preset)
    #[arg(short, value_name = "INT")]
    pub kmer_size: Option<i32>,

    /// Minimizer window size (overrides the preset)
    #[arg(short, value_name = "INT")]
    pub window_size: Option<i32>,

    /// Use homopolymer-compressed k-mers when building the index
    #[arg(short = 'H', long)]
    pub hpc: bool,

    /// Number of threads to use
    #[arg(short = 't', value_name = "INT", default_value = "1")]
    pub threads: usize,

    /// Write PAF output to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Dump the index to this file so later runs can load it directly
    #[arg(short = 'd', long = "dump-index", value_name = "FILE")]
    pub dump_index: Option<PathBuf>,

    /// Output the cs tag on every PAF row
    #[arg(long)]
    pub cs: bool,

    /// Output the MD tag on every PAF row
    #[arg(long = "MD")]
    pub md: bool,

    /// `-q` only show errors and warnings. `-qq` only show errors. `-qqq` shows nothing.
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// `-v` show debug output. `-vv` show trace output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// A utility function that allows the CLI to error if a path doesn't exist
fn check_path_exists<S: AsRef<OsStr> + ?Sized>(s: &S) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("{:?} does not exist", path))
    }
}

fn parse_preset(s: &str) -> Result<Preset, MappyError> {
    Preset::from_str(s)
}

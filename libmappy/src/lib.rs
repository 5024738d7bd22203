//! # libmappy
//!
//! `libmappy` is a Rust library for mapping DNA sequences with
//! [minimap2][minimap2], exposing an owned, safe API over the C library: build
//! or load an index, map queries (single reads or read pairs), fetch reference
//! subsequences, and write PAF output.
//!
//! ## Quick start
//!
//! ```no_run
//! use libmappy::{Aligner, Preset};
//!
//! # fn main() -> libmappy::Result<()> {
//! let aligner = Aligner::builder()
//!     .preset(Preset::MapOnt)
//!     .with_index("ref.fa", None)?;
//!
//! for hit in aligner.map(b"ACGTACGTACGTACGT", Some(b"query1"))? {
//!     println!("{hit}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The aligner is immutable once the index is built and can be shared across
//! threads; mapping scratch state is thread-local. [`batch::map_file`] maps a
//! whole FASTA/FASTQ file in parallel and writes PAF rows.
//!
//! ## Features
//!
//! This library includes optional support for compressed query files,
//! controlled by feature flags. By default, the `compression` feature is
//! enabled, which activates support for all included compression formats.
//!
//! ### Available Features
//!
//! - **compression** (default): Enables all available compression formats (`gzip`, `zstd`, `bzip2`, `xz`).
//! - **gzip**: Enables support for gzip-compressed files (`.gz`) using the [`flate2`][flate2] crate.
//! - **zstd**: Enables support for zstd-compressed files (`.zst`) using the [`zstd`][zstd] crate.
//! - **bzip2**: Enables support for bzip2-compressed files (`.bz2`) using the [`bzip2`][bzip2] crate.
//! - **xz**: Enables support for xz-compressed files (`.xz`) using the [`liblzma`][xz] crate.
//!
//! ### Enabling and Disabling Features
//!
//! To **disable all compression features**:
//!
//! ```toml
//! libmappy = { version = "0.1.0", default-features = false }
//! ```
//!
//! To enable only specific compression formats, list the desired features in
//! `Cargo.toml`:
//!
//! ```toml
//! libmappy = { version = "0.1.0", default-features = false, features = ["gzip", "zstd"] }
//! ```
//!
//! ## Compression Detection
//!
//! The library uses [**magic bytes**][magic] at the start of the file to
//! detect its compression format before deciding how to read it, with
//! automatic decompression if the [appropriate feature](#features) is enabled.
//! Note that minimap2 itself only reads plain or gzip-compressed references,
//! so [`Aligner::with_index`] is limited to those; the query side supports
//! every enabled format.
//!
//! [minimap2]: https://github.com/lh3/minimap2
//! [flate2]: https://crates.io/crates/flate2
//! [zstd]: https://crates.io/crates/zstd
//! [xz]: https://crates.io/crates/liblzma
//! [bzip2]: https://crates.io/crates/bzip2
//! [magic]: https://en.wikipedia.org/wiki/Magic_number_(programming)#In_files
pub mod aligner;
pub mod batch;
pub mod error;
pub mod io;
pub mod mapping;
pub mod paf;
pub mod preset;
pub mod seq;
pub mod settings;
pub(crate) mod thread_buf;

pub use self::aligner::Aligner;
pub use self::batch::{map_file, MapSummary};
pub use self::error::MappyError;
pub use self::io::{open_fastx, FastxRecordExt};
pub use self::mapping::Alignment;
pub use self::paf::PafRecord;
pub use self::preset::Preset;
pub use self::seq::revcomp;
pub use self::settings::{elapsed, reset_timer, set_verbosity, verbosity};

/// A type alias for `Result` with [`MappyError`] as the error type.
pub type Result<T> = std::result::Result<T, error::MappyError>;

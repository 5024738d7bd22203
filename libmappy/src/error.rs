//! Error handling for libmappy.
use std::fmt;

/// A custom error type to represent the various errors in libmappy.
#[derive(Debug)]
pub enum MappyError {
    /// An IO error occurred.
    IoError(std::io::Error),

    /// A FASTA/FASTQ parsing error occurred.
    FastxParseError(String),

    /// Building or loading a minimap2 index failed.
    IndexError(String),

    /// An indexing or mapping option is out of range.
    InvalidOption(String),

    /// A mapping operation was attempted without an index.
    MissingIndex,

    /// An empty query sequence was passed to the mapper.
    EmptySequence,

    /// A sequence or name contained an interior NUL byte and could not cross
    /// the FFI boundary.
    InvalidCString(String),

    /// Error when setting the number of threads
    ThreadError(String),

    /// Error writing PAF output
    PafWriteError(String),
}

impl fmt::Display for MappyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappyError::IoError(err) => write!(f, "IO error: {}", err),
            MappyError::FastxParseError(msg) => write!(f, "FASTA/FASTQ parse error: {}", msg),
            MappyError::IndexError(msg) => write!(f, "Index error: {}", msg),
            MappyError::InvalidOption(msg) => write!(f, "Invalid option: {}", msg),
            MappyError::MissingIndex => write!(f, "No index has been built or loaded"),
            MappyError::EmptySequence => write!(f, "Query sequence is empty"),
            MappyError::InvalidCString(msg) => write!(f, "Interior NUL byte: {}", msg),
            MappyError::ThreadError(msg) => write!(f, "Error relating to threads: {}", msg),
            MappyError::PafWriteError(msg) => write!(f, "Error writing PAF output: {}", msg),
        }
    }
}

impl std::error::Error for MappyError {}

/// Converts a `std::io::Error` into a [`MappyError`].
impl From<std::io::Error> for MappyError {
    fn from(error: std::io::Error) -> Self {
        MappyError::IoError(error)
    }
}

/// Converts a `csv::Error` into a [`MappyError`].
impl From<csv::Error> for MappyError {
    fn from(error: csv::Error) -> Self {
        MappyError::PafWriteError(error.to_string())
    }
}

/// Converts a `std::ffi::NulError` into a [`MappyError`].
impl From<std::ffi::NulError> for MappyError {
    fn from(error: std::ffi::NulError) -> Self {
        MappyError::InvalidCString(error.to_string())
    }
}

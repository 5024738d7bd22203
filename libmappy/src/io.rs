//! Sequence file handling: compression sniffing and FASTA/FASTQ streaming.
use std::fs::File;
use std::io;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

#[cfg(feature = "bzip2")]
use bzip2::bufread::BzDecoder;
#[cfg(feature = "gzip")]
use flate2::bufread::MultiGzDecoder;
#[cfg(feature = "xz")]
use liblzma::read::XzDecoder;
use needletail::parse_fastx_reader;
use needletail::parser::FastxReader;
#[cfg(feature = "zstd")]
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::error::MappyError;

/// The compression format of a file.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
enum CompressionFormat {
    #[cfg(feature = "bzip2")]
    Bzip2,
    #[cfg(feature = "gzip")]
    Gzip,
    #[default]
    None,
    #[cfg(feature = "xz")]
    Xz,
    #[cfg(feature = "zstd")]
    Zstd,
}

/// Detects the compression format of a file by reading the magic bytes at the start of the file.
fn detect_compression_format<R: Read + Seek>(reader: &mut R) -> io::Result<CompressionFormat> {
    let original_position = reader.stream_position()?;

    // move the reader to the start of the file
    reader.seek(SeekFrom::Start(0))?;

    let mut magic = [0; 5];
    reader
        .read_exact(&mut magic)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let format = match magic {
        #[cfg(feature = "gzip")]
        [0x1f, 0x8b, ..] => CompressionFormat::Gzip,
        #[cfg(feature = "bzip2")]
        [0x42, 0x5a, ..] => CompressionFormat::Bzip2,
        #[cfg(feature = "zstd")]
        [0x28, 0xb5, 0x2f, 0xfd, ..] => CompressionFormat::Zstd,
        #[cfg(feature = "xz")]
        [0xfd, 0x37, 0x7a, 0x58, 0x5a] => CompressionFormat::Xz,
        _ => CompressionFormat::None,
    };

    // Seek back to the original position
    reader.seek(SeekFrom::Start(original_position))?;

    Ok(format)
}

/// Opens a file and returns a reader. Supports gzip, zstd, bzip2 and xz
/// compression if the corresponding feature is enabled. If the file is not
/// compressed, a regular file reader is returned.
pub fn open_file<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read + Send>> {
    let mut buf = File::open(&path).map(BufReader::new)?;
    let compression_format = detect_compression_format(&mut buf)?;

    let reader: Box<dyn Read + Send> = match compression_format {
        #[cfg(feature = "gzip")]
        CompressionFormat::Gzip => Box::new(MultiGzDecoder::new(buf)),

        #[cfg(feature = "zstd")]
        CompressionFormat::Zstd => Box::new(ZstdDecoder::new(buf)?),

        #[cfg(feature = "bzip2")]
        CompressionFormat::Bzip2 => Box::new(BzDecoder::new(buf)),

        #[cfg(feature = "xz")]
        CompressionFormat::Xz => Box::new(XzDecoder::new(buf)),

        CompressionFormat::None => Box::new(buf),
    };

    Ok(reader)
}

/// Open a FASTA/FASTQ file, transparently decompressed, for record-by-record
/// streaming. The reader and every buffer behind it are released when the
/// returned value is dropped.
///
/// A path that does not exist, or a file that is not FASTA/FASTQ, is an
/// error rather than a panic.
pub fn open_fastx<P: AsRef<Path>>(path: P) -> crate::Result<Box<dyn FastxReader>> {
    let path = path.as_ref();
    let reader = open_file(path)?;
    parse_fastx_reader(reader).map_err(|e| {
        MappyError::FastxParseError(format!("failed to open {}: {e}", path.display()))
    })
}

/// A message that can be sent in a channel.
pub(crate) enum Message {
    /// The intention is to send a read ID and a read sequence.
    Data((Vec<u8>, Vec<u8>)),
}

pub trait FastxRecordExt {
    /// The record ID without the header comment.
    fn read_id(&self) -> &[u8];
}

impl FastxRecordExt for needletail::parser::SequenceRecord<'_> {
    /// The needletail `id` method returns the whole header line, including
    /// the comment and the read ID. This method returns only the read ID.
    fn read_id(&self) -> &[u8] {
        let id = self.id();
        id.split(|&x| x.is_ascii_whitespace())
            .next()
            .unwrap_or_default()
    }
}

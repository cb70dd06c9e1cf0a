//! Multi-record FASTA archives.
//!
//! An archive stores one [`crate::container::Container`] per FASTA record,
//! together with the record's title, line width and preserved non-ACGT runs.
//! Records are independent of each other, so they are compressed and
//! decompressed in parallel on a dedicated thread pool.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::fasta::reader::FastaReaderError;
use crate::fasta::writer::FastaWriterError;
use crate::pipeline::{CompressorError, DecompressorError};

pub mod compressor;
mod data;
pub mod decompressor;
pub mod no_seek;
#[cfg(test)]
mod tests;

/// Error occurring while creating or extracting an archive.
#[derive(Debug)]
pub enum ArchiveError {
    /// Compressing the sequence of given record failed.
    Compress {
        record: usize,
        source: CompressorError,
    },
    /// Decompressing the sequence of given record failed.
    Decompress {
        record: usize,
        source: DecompressorError,
    },
    /// The input is not a valid FASTA file.
    Fasta(FastaReaderError),
    /// Archive format version this build cannot read.
    InvalidVersion(u8),
    /// Unknown ambiguity policy (policy byte, placeholder byte).
    InvalidPolicy(u8, u8),
    /// A record's metadata is inconsistent.
    InvalidRecord { record: usize, message: String },
    /// I/O error occurred when reading or writing the archive.
    IoError(std::io::Error),
    /// Error occurred trying to (de)serialize the archive structures.
    SerializeError(binrw::Error),
    /// The worker thread pool could not be created.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl ArchiveError {
    pub(crate) fn invalid_record<T: Into<String>>(record: usize, message: T) -> Self {
        Self::InvalidRecord {
            record,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<binrw::Error> for ArchiveError {
    fn from(e: binrw::Error) -> Self {
        Self::SerializeError(e)
    }
}

impl From<FastaReaderError> for ArchiveError {
    fn from(e: FastaReaderError) -> Self {
        Self::Fasta(e)
    }
}

impl From<FastaWriterError> for ArchiveError {
    fn from(e: FastaWriterError) -> Self {
        match e {
            FastaWriterError::IoError(e) => Self::IoError(e),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for ArchiveError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Compress { record, source } => {
                write!(f, "Could not compress record #{}: {}", record, source)
            }
            ArchiveError::Decompress { record, source } => {
                write!(f, "Could not decompress record #{}: {}", record, source)
            }
            ArchiveError::Fasta(e) => write!(f, "FASTA error: {}", e),
            ArchiveError::InvalidVersion(version) => {
                write!(f, "Invalid archive version: {}", version)
            }
            ArchiveError::InvalidPolicy(policy, placeholder) => write!(
                f,
                "Invalid ambiguity policy: {} (placeholder {})",
                policy, placeholder
            ),
            ArchiveError::InvalidRecord { record, message } => {
                write!(f, "Invalid record #{}: {}", record, message)
            }
            ArchiveError::IoError(e) => write!(f, "IO error: {}", e),
            ArchiveError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ArchiveError::ThreadPool(e) => write!(f, "Could not start worker threads: {}", e),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ArchiveError::Compress { source, .. } => Some(source),
            ArchiveError::Decompress { source, .. } => Some(source),
            ArchiveError::Fasta(e) => Some(e),
            ArchiveError::IoError(e) => Some(e),
            ArchiveError::SerializeError(e) => Some(e),
            ArchiveError::ThreadPool(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of an archive operation.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

fn build_thread_pool(thread_num: usize, name: &'static str) -> ArchiveResult<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_num)
        .thread_name(move |index| format!("{}-{}", name, index))
        .build()?;

    Ok(pool)
}

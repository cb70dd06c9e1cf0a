use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;

use log::warn;

use crate::fasta::consts::{FASTA_BYTE_TO_ACID, FASTA_TITLE_PREFIX};
use crate::fasta::{AmbiguityPolicy, ExceptionRun, FastaRecord};
use crate::progress::ByteNum;
use crate::sequence::Acid;

/// Error occurring during parsing a FASTA file.
#[derive(Debug)]
pub enum FastaReaderError {
    /// I/O error occurred when reading the FASTA file.
    IoError(std::io::Error),
    /// Character outside of `ACGT` found with [`AmbiguityPolicy::Strict`].
    InvalidInputSymbol { symbol: char, line: u64 },
    /// Record title that is not valid UTF-8.
    InvalidTitle { line: u64 },
}

impl From<std::io::Error> for FastaReaderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaReaderError::IoError(e) => write!(f, "IO error: {}", e),
            FastaReaderError::InvalidInputSymbol { symbol, line } => {
                write!(f, "Invalid input symbol `{}` at line {}", symbol, line)
            }
            FastaReaderError::InvalidTitle { line } => {
                write!(f, "Title at line {} is not valid UTF-8", line)
            }
        }
    }
}

impl Error for FastaReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaReaderError::IoError(e) => Some(e),
            FastaReaderError::InvalidInputSymbol { .. } | FastaReaderError::InvalidTitle { .. } => {
                None
            }
        }
    }
}

/// The result of a FASTA reading operation.
pub type FastaResult<T> = Result<T, FastaReaderError>;

/// A builder for `FastaReaderParams`.
#[derive(Debug, Clone)]
pub struct FastaReaderParamsBuilder {
    policy: AmbiguityPolicy,
}

impl FastaReaderParamsBuilder {
    /// Returns a new instance of `FastaReaderParamsBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: AmbiguityPolicy::default(),
        }
    }

    /// Sets how characters outside of `ACGT` are handled.
    pub fn policy(&mut self, policy: AmbiguityPolicy) -> &mut Self {
        let mut new = self;
        new.policy = policy;
        new
    }

    /// Builds and returns [`FastaReaderParams`].
    pub fn build(&self) -> FastaReaderParams {
        FastaReaderParams {
            policy: self.policy,
        }
    }
}

impl Default for FastaReaderParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// FASTA reading params.
#[derive(Debug, Clone)]
pub struct FastaReaderParams {
    policy: AmbiguityPolicy,
}

impl FastaReaderParams {
    /// Returns new builder for `FastaReaderParams`.
    #[must_use]
    pub fn builder() -> FastaReaderParamsBuilder {
        FastaReaderParamsBuilder::new()
    }

    #[must_use]
    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }
}

impl Default for FastaReaderParams {
    fn default() -> Self {
        FastaReaderParamsBuilder::default().build()
    }
}

/// Collects the sequence lines of a single record.
#[derive(Debug)]
struct RecordExtractor {
    policy: AmbiguityPolicy,
    acids: Vec<Acid>,
    exceptions: Vec<ExceptionRun>,
    position: u64,
    line_width: Option<u32>,
    skipped: usize,
}

impl RecordExtractor {
    fn new(policy: AmbiguityPolicy) -> Self {
        Self {
            policy,
            acids: Vec::new(),
            exceptions: Vec::new(),
            position: 0,
            line_width: None,
            skipped: 0,
        }
    }

    fn has_data(&self) -> bool {
        self.line_width.is_some()
    }

    fn push_line(&mut self, line: &[u8], line_num: u64) -> FastaResult<()> {
        if line.is_empty() {
            return Ok(());
        }
        self.line_width.get_or_insert(line.len() as u32);

        for &byte in line {
            if let Some(acid) = FASTA_BYTE_TO_ACID[byte as usize] {
                self.acids.push(acid);
                self.position += 1;
                continue;
            }

            match self.policy {
                AmbiguityPolicy::Preserve => self.push_exception(byte.to_ascii_uppercase()),
                AmbiguityPolicy::Skip => self.skipped += 1,
                AmbiguityPolicy::Replace(acid) => {
                    self.acids.push(acid);
                    self.position += 1;
                }
                AmbiguityPolicy::Strict => {
                    return Err(FastaReaderError::InvalidInputSymbol {
                        symbol: byte as char,
                        line: line_num,
                    });
                }
            }
        }

        Ok(())
    }

    fn push_exception(&mut self, byte: u8) {
        match self.exceptions.last_mut() {
            Some(run) if run.byte == byte && run.end() == self.position && run.length < u32::MAX => {
                run.length += 1;
            }
            _ => self.exceptions.push(ExceptionRun::new(self.position, byte, 1)),
        }
        self.position += 1;
    }

    fn finish(self, title: Option<String>, size: ByteNum) -> FastaRecord {
        if self.skipped > 0 {
            warn!(
                "Skipped {} non-ACGT characters in record {}",
                self.skipped,
                title.as_deref().unwrap_or("<untitled>")
            );
        }

        FastaRecord::with_exceptions(
            title,
            self.acids,
            self.exceptions,
            self.line_width.unwrap_or(0),
        )
        .with_size(size)
    }
}

/// FASTA format reader capable of deserializing the records into
/// [`FastaRecord`] objects.
///
/// Titles are trimmed, sequence characters are uppercased and blank lines
/// are ignored. Sequence data found before the first title line forms a
/// record without a title.
#[derive(Debug)]
pub struct FastaReader<R> {
    reader: R,
    params: FastaReaderParams,
    buffer: Vec<u8>,
    line_num: u64,
    next_title: Option<String>,
    started: bool,
    eof: bool,
}

impl<R: BufRead> FastaReader<R> {
    /// Creates new `FastaReader` instance with default parameters.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::fasta::reader::FastaReader;
    ///
    /// let buf = Vec::new();
    /// let _reader = FastaReader::new(buf.as_slice());
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_params(reader, FastaReaderParams::default())
    }

    #[must_use]
    pub fn with_params(reader: R, params: FastaReaderParams) -> Self {
        Self {
            reader,
            params,
            buffer: Vec::with_capacity(4096),
            line_num: 0,
            next_title: None,
            started: false,
            eof: false,
        }
    }

    /// Reads the next record, or returns `None` at the end of the file.
    pub fn read_record(&mut self) -> FastaResult<Option<FastaRecord>> {
        if self.eof {
            return Ok(None);
        }

        let first = !self.started;
        self.started = true;

        let mut title = self.next_title.take();
        let mut extractor = RecordExtractor::new(self.params.policy);
        let mut bytes_read = 0;

        loop {
            let line = Self::read_line(&mut self.reader, &mut self.buffer, &mut bytes_read)?;
            let line = match line {
                Some(line) => line,
                None => {
                    self.eof = true;
                    break;
                }
            };
            self.line_num += 1;

            if line.first() == Some(&FASTA_TITLE_PREFIX) {
                let header = std::str::from_utf8(&line[1..])
                    .map_err(|_| FastaReaderError::InvalidTitle {
                        line: self.line_num,
                    })?
                    .trim()
                    .to_owned();
                if first && title.is_none() && !extractor.has_data() {
                    title = Some(header);
                    continue;
                }

                self.next_title = Some(header);
                break;
            }

            extractor.push_line(line, self.line_num)?;
        }

        if title.is_none() && !extractor.has_data() {
            return Ok(None);
        }

        Ok(Some(extractor.finish(title, ByteNum::new(bytes_read))))
    }

    fn read_line<'a, T: BufRead>(
        mut buf_reader: T,
        buffer: &'a mut Vec<u8>,
        total_bytes_read: &mut usize,
    ) -> FastaResult<Option<&'a [u8]>> {
        buffer.clear();
        let bytes_read = buf_reader.read_until(b'\n', buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        *total_bytes_read += bytes_read;

        let mut line = buffer.as_slice();
        while let Some(last) = line.last() {
            if !last.is_ascii_whitespace() {
                break;
            }
            line = &line[..line.len() - 1];
        }

        Ok(Some(line))
    }
}

impl<R: BufRead> IntoIterator for FastaReader<R> {
    type Item = FastaResult<FastaRecord>;
    type IntoIter = FastaReaderIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            reader: self,
            no_errors: true,
        }
    }
}

/// Iterator implementation for [`FastaReader`] which iterates over all
/// records in a file.
#[derive(Debug)]
pub struct FastaReaderIterator<R> {
    reader: FastaReader<R>,
    no_errors: bool,
}

impl<R: BufRead> Iterator for FastaReaderIterator<R> {
    type Item = FastaResult<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.no_errors {
            return None;
        }

        match self.reader.read_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.no_errors = false;
                Some(Err(e))
            }
        }
    }
}

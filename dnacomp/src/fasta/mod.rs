use std::fmt::{Display, Formatter};
use std::iter;

use crate::progress::ByteNum;
use crate::sequence::Acid;

mod consts;
pub mod reader;
pub mod writer;

/// What the extractor does with characters outside of `ACGT`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum AmbiguityPolicy {
    /// Keep the characters out of the symbol stream and remember them as
    /// [`ExceptionRun`]s, so that the record can be restored exactly.
    #[default]
    Preserve,
    /// Drop the characters.
    Skip,
    /// Code the characters as the given placeholder base.
    Replace(Acid),
    /// Reject the input.
    Strict,
}

impl AmbiguityPolicy {
    /// Returns the `(policy, placeholder)` byte pair stored in archive
    /// headers.
    #[must_use]
    pub fn to_bytes(self) -> (u8, u8) {
        match self {
            AmbiguityPolicy::Preserve => (0, 0),
            AmbiguityPolicy::Skip => (1, 0),
            AmbiguityPolicy::Replace(acid) => (2, acid.code()),
            AmbiguityPolicy::Strict => (3, 0),
        }
    }

    /// Inverse of [`AmbiguityPolicy::to_bytes`].
    ///
    /// # Examples
    /// ```
    /// use dnacomp::fasta::AmbiguityPolicy;
    /// use dnacomp::sequence::Acid;
    ///
    /// let policy = AmbiguityPolicy::Replace(Acid::G);
    /// let (policy_byte, placeholder) = policy.to_bytes();
    /// assert_eq!(AmbiguityPolicy::from_bytes(policy_byte, placeholder), Some(policy));
    /// assert_eq!(AmbiguityPolicy::from_bytes(7, 0), None);
    /// ```
    #[must_use]
    pub fn from_bytes(policy: u8, placeholder: u8) -> Option<Self> {
        match policy {
            0 => Some(AmbiguityPolicy::Preserve),
            1 => Some(AmbiguityPolicy::Skip),
            2 => Acid::from_code(placeholder).map(AmbiguityPolicy::Replace),
            3 => Some(AmbiguityPolicy::Strict),
            _ => None,
        }
    }
}

impl Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbiguityPolicy::Preserve => write!(f, "preserve"),
            AmbiguityPolicy::Skip => write!(f, "skip"),
            AmbiguityPolicy::Replace(acid) => write!(f, "replace with {}", acid),
            AmbiguityPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// A maximal stretch of one repeated non-ACGT byte.
///
/// `position` is the offset of the run's first byte in the restored
/// sequence, i.e. counting both bases and preserved bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExceptionRun {
    pub position: u64,
    pub byte: u8,
    pub length: u32,
}

impl ExceptionRun {
    #[must_use]
    pub fn new(position: u64, byte: u8, length: u32) -> Self {
        Self {
            position,
            byte,
            length,
        }
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> u64 {
        self.position + self.length as u64
    }
}

/// A single FASTA record, split into the coded bases and everything needed
/// to write the record back.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct FastaRecord {
    title: Option<String>,
    acids: Vec<Acid>,
    exceptions: Vec<ExceptionRun>,
    line_width: u32,
    size: ByteNum,
}

impl FastaRecord {
    #[must_use]
    pub fn new(title: Option<String>, acids: Vec<Acid>) -> Self {
        Self {
            title,
            acids,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_exceptions(
        title: Option<String>,
        acids: Vec<Acid>,
        exceptions: Vec<ExceptionRun>,
        line_width: u32,
    ) -> Self {
        Self {
            title,
            acids,
            exceptions,
            line_width,
            size: ByteNum::ZERO,
        }
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.line_width = line_width;
        self
    }

    #[must_use]
    pub(crate) fn with_size(mut self, size: ByteNum) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn acids(&self) -> &[Acid] {
        &self.acids
    }

    #[must_use]
    pub fn exceptions(&self) -> &[ExceptionRun] {
        &self.exceptions
    }

    /// Length of the sequence lines, or 0 if the sequence is written on a
    /// single line.
    #[must_use]
    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    /// Number of raw input bytes this record was parsed from.
    #[must_use]
    pub fn size(&self) -> ByteNum {
        self.size
    }

    /// Number of bytes preserved outside of the symbol stream.
    #[must_use]
    pub fn exception_len(&self) -> usize {
        self.exceptions.iter().map(|run| run.length as usize).sum()
    }

    /// Length of the restored sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.acids.len() + self.exception_len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sequence with all preserved runs put back in place.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::fasta::{ExceptionRun, FastaRecord};
    /// use dnacomp::sequence::parse_acids;
    ///
    /// let acids = parse_acids("ACGT").unwrap();
    /// let runs = vec![ExceptionRun::new(0, b'N', 2), ExceptionRun::new(4, b'R', 1)];
    /// let record = FastaRecord::with_exceptions(None, acids, runs, 0);
    ///
    /// assert_eq!(record.bases(), b"NNACRGT");
    /// ```
    #[must_use]
    pub fn bases(&self) -> Vec<u8> {
        let mut bases = Vec::with_capacity(self.len());
        let mut acids = self.acids.iter();

        for run in &self.exceptions {
            while (bases.len() as u64) < run.position {
                match acids.next() {
                    Some(acid) => bases.push(acid.to_byte()),
                    None => break,
                }
            }
            bases.extend(iter::repeat(run.byte).take(run.length as usize));
        }
        bases.extend(acids.map(|acid| acid.to_byte()));

        bases
    }

    /// Checks that the runs are ordered, don't overlap and fit within the
    /// restored sequence.
    #[must_use]
    pub fn has_valid_exceptions(&self) -> bool {
        let mut prev_end = 0;
        for run in &self.exceptions {
            if run.length == 0 || run.position < prev_end {
                return false;
            }
            prev_end = run.end();
        }

        prev_end <= self.len() as u64
    }
}

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::fasta::consts::FASTA_TITLE_PREFIX;
use crate::fasta::FastaRecord;

#[derive(Debug)]
pub enum FastaWriterError {
    IoError(std::io::Error),
}

impl From<std::io::Error> for FastaWriterError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaWriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaWriterError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl Error for FastaWriterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaWriterError::IoError(e) => Some(e),
        }
    }
}

pub type FastaWriteResult<T> = Result<T, FastaWriterError>;

/// Writes [`FastaRecord`]s, wrapping the sequence at each record's line
/// width.
#[derive(Debug)]
pub struct FastaWriter<W> {
    writer: W,
}

impl<W: Write> FastaWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_record(&mut self, record: &FastaRecord) -> FastaWriteResult<()> {
        if let Some(title) = record.title() {
            self.writer.write_all(&[FASTA_TITLE_PREFIX])?;
            self.writer.write_all(title.as_bytes())?;
            writeln!(&mut self.writer)?;
        }

        self.output_bases(&record.bases(), record.line_width() as usize)
    }

    fn output_bases(&mut self, bases: &[u8], line_width: usize) -> FastaWriteResult<()> {
        if bases.is_empty() {
            return Ok(());
        }

        let line_width = if line_width == 0 {
            bases.len()
        } else {
            line_width
        };
        for line in bases.chunks(line_width) {
            self.writer.write_all(line)?;
            writeln!(&mut self.writer)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> FastaWriteResult<()> {
        self.writer.flush()?;

        Ok(())
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use crate::_internal_test_data::{
        AMBIGUOUS_FASTA_STR, MULTI_RECORD_FASTA_STR, SIMPLE_FASTA_STR,
    };
    use crate::fasta::reader::FastaReader;
    use crate::fasta::writer::FastaWriter;
    use crate::fasta::FastaRecord;
    use crate::sequence::parse_acids;

    fn rewrite(data: &str) -> String {
        let mut writer = FastaWriter::new(Vec::new());
        for record in FastaReader::new(data.as_bytes()) {
            writer.write_record(&record.unwrap()).unwrap();
        }

        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_rewrite_is_identical() {
        assert_eq!(rewrite(SIMPLE_FASTA_STR), SIMPLE_FASTA_STR);
        assert_eq!(rewrite(AMBIGUOUS_FASTA_STR), AMBIGUOUS_FASTA_STR);
        assert_eq!(rewrite(MULTI_RECORD_FASTA_STR), MULTI_RECORD_FASTA_STR);
    }

    #[test]
    fn test_write_unwrapped() {
        let record = FastaRecord::new(Some("plain".to_owned()), parse_acids("ACGTACGT").unwrap());

        let mut buf = Vec::new();
        FastaWriter::new(&mut buf).write_record(&record).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), ">plain\nACGTACGT\n");
    }

    #[test]
    fn test_write_wrapped_without_title() {
        let record = FastaRecord::new(None, parse_acids("ACGTACGTA").unwrap()).with_line_width(4);

        let mut buf = Vec::new();
        FastaWriter::new(&mut buf).write_record(&record).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "ACGT\nACGT\nA\n");
    }
}

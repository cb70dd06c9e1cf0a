use std::io::Write;

use serde::Serialize;

/// Writes serializable rows as CSV, emitting the header before the first
/// row.
#[derive(Debug)]
pub(crate) struct CsvStatOutput<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvStatOutput<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn add_record<T: Serialize>(&mut self, record: &T) -> anyhow::Result<()> {
        self.writer.serialize(record)?;

        Ok(())
    }

    /// Flushes the remaining rows and returns the underlying writer.
    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Could not flush the CSV output: {}", e.error()))
    }
}

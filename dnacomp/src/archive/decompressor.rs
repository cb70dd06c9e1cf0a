use std::io::{Read, Write};
use std::sync::Arc;

use binrw::BinRead;
use log::{debug, info};
use rayon::prelude::*;

use crate::archive::data::{ArchiveHeader, ArchiveRecord, ARCHIVE_VERSION};
use crate::archive::no_seek::NoSeek;
use crate::archive::{build_thread_pool, ArchiveError, ArchiveResult};
use crate::container::Container;
use crate::fasta::writer::FastaWriter;
use crate::fasta::{AmbiguityPolicy, ExceptionRun, FastaRecord};
use crate::pipeline::{decompress, DecompressorError};
use crate::progress::{ByteNum, NoProgress, ProgressNotifier};

#[derive(Debug, Clone)]
pub struct ArchiveDecompressorParams {
    thread_num: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl ArchiveDecompressorParams {
    pub fn builder() -> ArchiveDecompressorParamsBuilder {
        ArchiveDecompressorParamsBuilder::new()
    }
}

impl Default for ArchiveDecompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveDecompressorParamsBuilder {
    thread_num: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl ArchiveDecompressorParamsBuilder {
    pub fn new() -> Self {
        Self {
            thread_num: 0,
            progress_notifier: Arc::new(NoProgress),
        }
    }

    pub fn thread_num(&mut self, thread_num: usize) -> &mut Self {
        let mut new = self;
        new.thread_num = thread_num;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    pub fn build(&mut self) -> ArchiveDecompressorParams {
        ArchiveDecompressorParams {
            thread_num: self.thread_num,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for ArchiveDecompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores FASTA records from an archive.
#[derive(Debug)]
pub struct ArchiveDecompressor<R> {
    reader: NoSeek<R>,
    params: ArchiveDecompressorParams,
}

impl<R: Read> ArchiveDecompressor<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_params(reader, ArchiveDecompressorParams::default())
    }

    #[must_use]
    pub fn with_params(reader: R, params: ArchiveDecompressorParams) -> Self {
        Self {
            reader: NoSeek::new(reader),
            params,
        }
    }

    /// Reads the whole archive and returns its records in the original
    /// order.
    pub fn read_records(&mut self) -> ArchiveResult<Vec<FastaRecord>> {
        let header = ArchiveHeader::read(&mut self.reader)?;
        debug!("Archive header: {:?}", header);
        if header.version != ARCHIVE_VERSION {
            return Err(ArchiveError::InvalidVersion(header.version));
        }
        let policy = AmbiguityPolicy::from_bytes(header.policy, header.placeholder)
            .ok_or(ArchiveError::InvalidPolicy(header.policy, header.placeholder))?;

        let notifier = self.params.progress_notifier.clone();
        notifier.set_record_num(header.record_num as u64);

        let mut records = Vec::new();
        for _ in 0..header.record_num {
            let start = self.reader.position();
            let record = ArchiveRecord::read(&mut self.reader)?;
            let size = ByteNum::new((self.reader.position() - start) as usize);
            records.push((record, size));
        }

        let pool = build_thread_pool(self.params.thread_num, "dnacomp-decompressor")?;
        info!(
            "Decompressing {} records using {} threads",
            records.len(),
            pool.current_num_threads()
        );

        pool.install(|| {
            records
                .par_iter()
                .enumerate()
                .map(|(index, (record, size))| {
                    let result = decompress_record(index, record, policy);
                    notifier.processed_bytes(*size);
                    notifier.record_finished();
                    result
                })
                .collect()
        })
    }

    /// Decompresses the whole archive as FASTA into `writer`.
    pub fn decompress<W: Write>(&mut self, writer: W) -> ArchiveResult<()> {
        let records = self.read_records()?;

        let mut writer = FastaWriter::new(writer);
        for record in &records {
            writer.write_record(record)?;
        }
        writer.flush()?;

        Ok(())
    }
}

fn decompress_record(
    index: usize,
    record: &ArchiveRecord,
    policy: AmbiguityPolicy,
) -> ArchiveResult<FastaRecord> {
    let decompress_error = |source: DecompressorError| ArchiveError::Decompress {
        record: index,
        source,
    };

    let title = match record.has_title {
        0 => None,
        1 => Some(
            String::from_utf8(record.title.clone())
                .map_err(|_| ArchiveError::invalid_record(index, "title is not valid UTF-8"))?,
        ),
        flag => {
            return Err(ArchiveError::invalid_record(
                index,
                format!("invalid title flag: {}", flag),
            ))
        }
    };
    if policy != AmbiguityPolicy::Preserve && !record.runs.is_empty() {
        return Err(ArchiveError::invalid_record(
            index,
            format!("non-ACGT runs stored with policy {}", policy),
        ));
    }

    let container = Container::from_bytes(&record.container)
        .map_err(|e| decompress_error(e.into()))?;
    let acids = decompress(&container).map_err(decompress_error)?;

    let runs = record
        .runs
        .iter()
        .map(|run| ExceptionRun::new(run.position, run.byte, run.length))
        .collect();
    let fasta_record = FastaRecord::with_exceptions(title, acids, runs, record.line_width);
    if !fasta_record.has_valid_exceptions() {
        return Err(ArchiveError::invalid_record(
            index,
            "non-ACGT runs overlap or exceed the sequence",
        ));
    }

    debug!(
        "Record #{} ({}): {} bases restored",
        index,
        fasta_record.title().unwrap_or("<untitled>"),
        fasta_record.len()
    );

    Ok(fasta_record)
}

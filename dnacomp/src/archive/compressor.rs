use std::io::{BufRead, Write};
use std::sync::Arc;

use binrw::BinWrite;
use log::{debug, info};
use rayon::prelude::*;

use crate::archive::data::{ArchiveHeader, ArchiveRecord, ArchiveRun, ARCHIVE_VERSION};
use crate::archive::no_seek::NoSeek;
use crate::archive::{build_thread_pool, ArchiveError, ArchiveResult};
use crate::fasta::reader::{FastaReader, FastaReaderParams};
use crate::fasta::{AmbiguityPolicy, FastaRecord};
use crate::pipeline::{compress_with_report, CompressorError, CompressorParams};
use crate::progress::{NoProgress, ProgressNotifier};
use crate::stats::CompressionStats;

#[derive(Debug, Clone)]
pub struct ArchiveCompressorParams {
    compressor: CompressorParams,
    policy: AmbiguityPolicy,
    thread_num: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl ArchiveCompressorParams {
    pub fn builder() -> ArchiveCompressorParamsBuilder {
        ArchiveCompressorParamsBuilder::new()
    }

    #[must_use]
    pub fn compressor(&self) -> &CompressorParams {
        &self.compressor
    }

    #[must_use]
    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }
}

impl Default for ArchiveCompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveCompressorParamsBuilder {
    compressor: CompressorParams,
    policy: AmbiguityPolicy,
    thread_num: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl ArchiveCompressorParamsBuilder {
    pub fn new() -> Self {
        Self {
            compressor: CompressorParams::default(),
            policy: AmbiguityPolicy::default(),
            thread_num: 0,
            progress_notifier: Arc::new(NoProgress),
        }
    }

    /// Sets the parameters used for every record's sequence.
    pub fn compressor(&mut self, compressor: CompressorParams) -> &mut Self {
        let mut new = self;
        new.compressor = compressor;
        new
    }

    pub fn policy(&mut self, policy: AmbiguityPolicy) -> &mut Self {
        let mut new = self;
        new.policy = policy;
        new
    }

    /// Sets the number of worker threads; 0 lets rayon decide.
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

    pub fn build(&mut self) -> ArchiveCompressorParams {
        ArchiveCompressorParams {
            compressor: self.compressor.clone(),
            policy: self.policy,
            thread_num: self.thread_num,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for ArchiveCompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compresses FASTA input into an archive.
#[derive(Debug)]
pub struct ArchiveCompressor<W> {
    writer: NoSeek<W>,
    params: ArchiveCompressorParams,
    stats: CompressionStats,
}

impl<W: Write> ArchiveCompressor<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_params(writer, ArchiveCompressorParams::default())
    }

    #[must_use]
    pub fn with_params(writer: W, params: ArchiveCompressorParams) -> Self {
        Self {
            writer: NoSeek::new(writer),
            params,
            stats: CompressionStats::new(),
        }
    }

    /// Reads a whole FASTA file and writes it as an archive.
    pub fn compress<R: BufRead>(&mut self, reader: R) -> ArchiveResult<()> {
        let reader_params = FastaReaderParams::builder()
            .policy(self.params.policy)
            .build();
        let records = FastaReader::with_params(reader, reader_params)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        self.compress_records(&records)
    }

    /// Writes an archive containing given records.
    pub fn compress_records(&mut self, records: &[FastaRecord]) -> ArchiveResult<()> {
        let record_num = u32::try_from(records.len())
            .map_err(|_| ArchiveError::invalid_record(records.len(), "too many records"))?;

        let notifier = self.params.progress_notifier.clone();
        notifier.set_record_num(records.len() as u64);

        let pool = build_thread_pool(self.params.thread_num, "dnacomp-compressor")?;
        info!(
            "Compressing {} records using {} threads",
            records.len(),
            pool.current_num_threads()
        );

        let compressor = &self.params.compressor;
        let stats = &self.stats;
        let compressed = pool.install(|| {
            records
                .par_iter()
                .enumerate()
                .map(|(index, record)| {
                    let result = compress_record(index, record, compressor, stats);
                    notifier.processed_bytes(record.size());
                    notifier.record_finished();
                    result
                })
                .collect::<ArchiveResult<Vec<_>>>()
        })?;

        let (policy, placeholder) = self.params.policy.to_bytes();
        let header = ArchiveHeader {
            version: ARCHIVE_VERSION,
            policy,
            placeholder,
            record_num,
        };
        header.write(&mut self.writer)?;
        for record in &compressed {
            record.write(&mut self.writer)?;
        }
        self.writer.flush()?;

        self.stats.set_out_bytes(self.writer.position() as usize);
        self.stats.log_summary();

        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> &CompressionStats {
        &self.stats
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

fn compress_record(
    index: usize,
    record: &FastaRecord,
    params: &CompressorParams,
    stats: &CompressionStats,
) -> ArchiveResult<ArchiveRecord> {
    let compress_error = |source: CompressorError| ArchiveError::Compress {
        record: index,
        source,
    };

    let (container, report) = compress_with_report(record.acids(), params).map_err(compress_error)?;
    let payload_len = container.payload.len();
    let container = container
        .to_bytes()
        .map_err(|e| compress_error(e.into()))?;

    let title = record.title().map(str::as_bytes).unwrap_or_default().to_vec();
    let title_len = u32::try_from(title.len())
        .map_err(|_| ArchiveError::invalid_record(index, "title too long"))?;
    let run_num = u32::try_from(record.exceptions().len())
        .map_err(|_| ArchiveError::invalid_record(index, "too many non-ACGT runs"))?;
    let runs = record
        .exceptions()
        .iter()
        .map(|run| ArchiveRun {
            position: run.position,
            byte: run.byte,
            length: run.length,
        })
        .collect();

    stats.add_in_bytes(record.size());
    stats.add_in_symbols(record.acids().len());
    stats.add_in_exception_bytes(record.exception_len());
    stats.add_out_payload_bytes(payload_len);
    stats.inc_records();

    debug!(
        "Record #{} ({}): {} bases, order {}, {} payload bytes",
        index,
        record.title().unwrap_or("<untitled>"),
        record.acids().len(),
        report.order,
        payload_len
    );

    Ok(ArchiveRecord {
        has_title: u8::from(record.title().is_some()),
        title_len,
        title,
        line_width: record.line_width(),
        run_num,
        runs,
        container_len: container.len() as u64,
        container,
    })
}

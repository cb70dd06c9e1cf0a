use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use dnacomp::archive::decompressor::{ArchiveDecompressor, ArchiveDecompressorParams};
use dnacomp::progress::ProgressNotifier;

pub(crate) fn decompress<R: Read, W: Write>(
    reader: R,
    writer: W,
    threads: Option<usize>,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<()> {
    let mut params = ArchiveDecompressorParams::builder();
    params.progress_notifier(progress_notifier);
    if let Some(threads) = threads {
        params.thread_num(threads);
    }
    let params = params.build();

    let mut writer = BufWriter::new(writer);
    ArchiveDecompressor::with_params(BufReader::new(reader), params)
        .decompress(&mut writer)
        .context("Could not decompress the archive")?;
    writer.flush()?;

    Ok(())
}

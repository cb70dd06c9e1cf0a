use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use dnacomp::analysis::OrderSelection;
use dnacomp::archive::compressor::{ArchiveCompressor, ArchiveCompressorParams};
use dnacomp::context::ContextOrder;
use dnacomp::fasta::AmbiguityPolicy;
use dnacomp::model::ModelParams;
use dnacomp::pipeline::CompressorParams;
use dnacomp::progress::ProgressNotifier;

use crate::cli::{CompressArgs, PolicyCli};

fn order_selection(args: &CompressArgs) -> anyhow::Result<OrderSelection> {
    let selection = match args.order {
        Some(order) => {
            OrderSelection::Fixed(ContextOrder::new(order).context("Invalid context order")?)
        }
        None => OrderSelection::Auto {
            max_order: ContextOrder::new(args.max_order).context("Invalid maximum context order")?,
        },
    };

    Ok(selection)
}

fn policy(args: &CompressArgs) -> AmbiguityPolicy {
    match args.policy {
        PolicyCli::Preserve => AmbiguityPolicy::Preserve,
        PolicyCli::Skip => AmbiguityPolicy::Skip,
        PolicyCli::Replace => AmbiguityPolicy::Replace(args.placeholder),
        PolicyCli::Strict => AmbiguityPolicy::Strict,
    }
}

pub(crate) fn build_params(
    args: &CompressArgs,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<ArchiveCompressorParams> {
    let compressor = CompressorParams::builder()
        .order_selection(order_selection(args)?)
        .model_params(ModelParams::new(args.floor, args.increment, args.max_total))
        .scale_bits(args.scale_bits)
        .seed(args.seed)
        .seed_weight(args.seed_weight)
        .build();
    compressor
        .validate()
        .context("Invalid compression parameters")?;

    let mut params = ArchiveCompressorParams::builder();
    params
        .compressor(compressor)
        .policy(policy(args))
        .progress_notifier(progress_notifier);
    if let Some(threads) = args.threads {
        params.thread_num(threads);
    }

    Ok(params.build())
}

pub(crate) fn compress<R: Read, W: Write>(
    reader: R,
    writer: W,
    args: &CompressArgs,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<()> {
    let params = build_params(args, progress_notifier)?;
    let mut compressor = ArchiveCompressor::with_params(BufWriter::new(writer), params);

    compressor
        .compress(BufReader::new(reader))
        .context("Could not compress the FASTA input")?;
    compressor.into_inner().flush()?;

    Ok(())
}

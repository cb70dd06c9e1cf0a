#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::stats::StatFormat;
use cmd::{compress, decompress, stats};
use dnacomp::context::ContextOrder;
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::opts::{OutputMode, OutputWriter};
use crate::progress_bar::DnaProgressBar;

mod cli;
mod cmd;
mod csv_stat;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: DnaProgressBar = DnaProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).context("Could not initialize logging")?;

    match &cli.command {
        Commands::Compress(args) => {
            let reader = args.input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let mut output =
                OutputWriter::from_path_and_input(&args.output, &reader, "dnz", OutputMode::Binary)?;

            compress::compress(
                reader.into_read(),
                &mut output,
                args,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to compress given file")?;
            output.commit()?;
        }
        Commands::Decompress(args) => {
            let reader = args.input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let mut output =
                OutputWriter::from_path_and_input(&args.output, &reader, "fasta", OutputMode::Text)?;

            decompress::decompress(
                reader.into_read(),
                &mut output,
                args.threads,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to decompress given file")?;
            output.commit()?;
        }
        Commands::Stats(args) => {
            let reader = args.input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));

            let format = if args.csv {
                StatFormat::Csv
            } else if args.json {
                StatFormat::Json
            } else {
                StatFormat::Table
            };
            let max_order =
                ContextOrder::new(args.max_order).context("Invalid maximum context order")?;
            let file_stats = stats::compute_stats(reader.into_read(), max_order, &*PROGRESS_BAR)
                .context("Failed to compute file statistics")?;

            PROGRESS_BAR.finish();
            stats::print_stats(&file_stats, format)?;
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}

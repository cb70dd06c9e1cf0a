use std::io;
use std::io::{BufReader, Read, Write};

use anyhow::Context;
use dnacomp::analysis::{analyze, AnalysisParams, OrderSelection};
use dnacomp::context::ContextOrder;
use dnacomp::fasta::reader::FastaReader;
use dnacomp::progress::{ByteNum, ProgressNotifier};
use dnacomp::stats::format_bytes;
use itertools::Itertools;
use serde::Serialize;

use crate::csv_stat::CsvStatOutput;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum StatFormat {
    Table,
    Csv,
    Json,
}

/// Estimated cost of the whole file at a single context order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct OrderStat {
    pub order: u8,
    pub bits: f64,
    pub bits_per_base: f64,
    pub estimated_bytes: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct FastaStats {
    pub records: u64,
    pub bases: u64,
    pub non_acgt: u64,
    pub best_order: Option<u8>,
    pub orders: Vec<OrderStat>,
}

pub(crate) fn compute_stats<R: Read>(
    reader: R,
    max_order: ContextOrder,
    progress_notifier: &dyn ProgressNotifier,
) -> anyhow::Result<FastaStats> {
    let params = AnalysisParams {
        selection: OrderSelection::Auto { max_order },
        limit: usize::MAX,
        ..AnalysisParams::default()
    };

    let mut bits = vec![0.0; max_order.get() as usize + 1];
    let mut records = 0;
    let mut bases = 0;
    let mut non_acgt = 0;

    for record in FastaReader::new(BufReader::new(reader)) {
        let record = record.context("Could not parse a record from the FASTA file")?;
        let report = analyze(record.acids(), &params)
            .with_context(|| format!("Could not analyze record #{}", records))?;

        // Short records are not estimated past their useful order; those
        // orders are charged the cost of the highest one that was.
        let last = report.estimates.last().map_or(0.0, |estimate| estimate.bits);
        for (index, total) in bits.iter_mut().enumerate() {
            *total += report.estimates.get(index).map_or(last, |estimate| estimate.bits);
        }
        records += 1;
        bases += record.acids().len() as u64;
        non_acgt += record.exception_len() as u64;
        progress_notifier.processed_bytes(record.size());
    }

    let orders: Vec<OrderStat> = bits
        .into_iter()
        .enumerate()
        .map(|(order, bits)| OrderStat {
            order: order as u8,
            bits,
            bits_per_base: if bases == 0 { 0.0 } else { bits / bases as f64 },
            estimated_bytes: (bits / 8.0).ceil() as u64,
        })
        .collect();
    let best_order = if bases == 0 {
        None
    } else {
        orders
            .iter()
            .position_min_by(|a, b| a.bits.total_cmp(&b.bits))
            .map(|index| orders[index].order)
    };

    Ok(FastaStats {
        records,
        bases,
        non_acgt,
        best_order,
        orders,
    })
}

fn print_table(stats: &FastaStats) {
    eprintln!(
        "{} records, {} ACGT bases, {} other characters",
        stats.records, stats.bases, stats.non_acgt
    );
    eprintln!("Order  Bits/base  Estimated size");
    for stat in &stats.orders {
        let marker = if Some(stat.order) == stats.best_order {
            "*"
        } else {
            ""
        };
        eprintln!(
            "{:>5}  {:>9.4}  {}{}",
            stat.order,
            stat.bits_per_base,
            format_bytes(ByteNum::new(stat.estimated_bytes as usize)),
            marker
        );
    }
}

pub(crate) fn print_stats(stats: &FastaStats, format: StatFormat) -> anyhow::Result<()> {
    match format {
        StatFormat::Table => print_table(stats),
        StatFormat::Csv => {
            let mut output = CsvStatOutput::new(io::stdout());
            for stat in &stats.orders {
                output.add_record(stat)?;
            }
            output.into_inner()?;
        }
        StatFormat::Json => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, stats)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dnacomp::analysis::AnalysisParams;
use dnacomp::coder::{DEFAULT_SCALE_BITS, MAX_SCALE_BITS, MIN_SCALE_BITS};
use dnacomp::context::ContextOrder;
use dnacomp::model::ModelParams;
use dnacomp::sequence::Acid;

use crate::opts::{input_stream, InputStream};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// What to do with characters other than A, C, G and T
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PolicyCli {
    /// Store them aside and restore them on decompression
    Preserve,
    /// Drop them
    Skip,
    /// Replace them with the --placeholder base
    Replace,
    /// Fail on the first one
    Strict,
}

fn acid(value: &str) -> Result<Acid, String> {
    match value.as_bytes() {
        [byte] => Acid::from_byte(*byte).ok_or_else(|| format!("`{}` is not one of ACGT", value)),
        _ => Err(format!("`{}` is not a single base", value)),
    }
}

const MAX_ORDER: i64 = ContextOrder::MAX.get() as i64;

#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input FASTA file to read; `-` is the standard input
    #[arg(default_value_t, value_parser = input_stream)]
    pub input: InputStream,

    /// Output archive path; `-` is the standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use this context order instead of choosing the best one
    #[arg(long, conflicts_with = "max_order", value_parser = clap::value_parser!(u8).range(0..=MAX_ORDER))]
    pub order: Option<u8>,

    /// Highest context order to consider when choosing automatically
    #[arg(long, default_value_t = ContextOrder::default().get(), value_parser = clap::value_parser!(u8).range(0..=MAX_ORDER))]
    pub max_order: u8,

    /// Seed every context with the global base frequencies
    #[arg(long)]
    pub seed: bool,

    /// Total weight of the global frequency seed
    #[arg(long, default_value_t = AnalysisParams::DEFAULT_SEED_WEIGHT, requires = "seed")]
    pub seed_weight: u32,

    /// How to handle characters other than ACGT
    #[arg(long, value_enum, default_value_t = PolicyCli::Preserve)]
    pub policy: PolicyCli,

    /// Base used by `--policy replace`
    #[arg(long, default_value = "A", value_parser = acid)]
    pub placeholder: Acid,

    /// Number of worker threads (default: number of CPUs)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Minimum frequency count of every base
    #[arg(long, default_value_t = ModelParams::DEFAULT_FLOOR, value_parser = clap::value_parser!(u16).range(1..))]
    pub floor: u16,

    /// Amount added to a base's count each time it is seen
    #[arg(long, default_value_t = ModelParams::DEFAULT_INCREMENT, value_parser = clap::value_parser!(u16).range(1..))]
    pub increment: u16,

    /// Count total at which a context's counts are halved
    #[arg(long, default_value_t = ModelParams::DEFAULT_MAX_TOTAL)]
    pub max_total: u32,

    /// Precision of the entropy coder's probabilities, in bits
    #[arg(long, default_value_t = DEFAULT_SCALE_BITS, value_parser = clap::value_parser!(u8).range((MIN_SCALE_BITS as i64)..=(MAX_SCALE_BITS as i64)))]
    pub scale_bits: u8,
}

#[derive(Args, Debug)]
pub struct DecompressArgs {
    /// Input archive to read; `-` is the standard input
    #[arg(default_value_t, value_parser = input_stream)]
    pub input: InputStream,

    /// Output FASTA file path; `-` is the standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads (default: number of CPUs)
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Input FASTA file to read; `-` is the standard input
    #[arg(default_value_t, value_parser = input_stream)]
    pub input: InputStream,

    /// Highest context order to estimate
    #[arg(long, default_value_t = ContextOrder::default().get(), value_parser = clap::value_parser!(u8).range(0..=MAX_ORDER))]
    pub max_order: u8,

    /// Output the estimates as a CSV file to the standard output
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,

    /// Output the estimates as JSON to the standard output
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a FASTA file
    Compress(CompressArgs),

    /// Decompress an archive back to a FASTA file
    Decompress(DecompressArgs),

    /// Estimate the compressed size of a FASTA file for every context order
    Stats(StatsArgs),
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use dnacomp::sequence::Acid;

    use crate::cli::{Cli, Commands, PolicyCli};

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::parse_from([
            "dnacomp",
            "compress",
            "in.fa",
            "--order",
            "4",
            "--policy",
            "replace",
            "--placeholder",
            "g",
        ]);

        match cli.command {
            Commands::Compress(args) => {
                assert_eq!(args.order, Some(4));
                assert_eq!(args.policy, PolicyCli::Replace);
                assert_eq!(args.placeholder, Acid::G);
                assert_eq!(args.scale_bits, 16);
            }
            _ => panic!("expected the compress command"),
        }
    }

    #[test]
    fn test_reject_invalid_values() {
        assert!(Cli::try_parse_from(["dnacomp", "compress", "--order", "13"]).is_err());
        assert!(Cli::try_parse_from(["dnacomp", "compress", "--placeholder", "N"]).is_err());
        assert!(Cli::try_parse_from(["dnacomp", "compress", "--order", "2", "--max-order", "3"]).is_err());
        assert!(Cli::try_parse_from(["dnacomp", "stats", "--csv", "--json"]).is_err());
    }
}

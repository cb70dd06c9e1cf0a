use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::info;
use number_prefix::NumberPrefix;

use crate::progress::ByteNum;

/// Bits spent per coded symbol; zero for an empty sequence.
///
/// # Examples
/// ```
/// use dnacomp::stats::bits_per_symbol;
///
/// assert_eq!(bits_per_symbol(250, 1000), 2.0);
/// assert_eq!(bits_per_symbol(4, 0), 0.0);
/// ```
#[must_use]
pub fn bits_per_symbol(bytes: usize, symbols: usize) -> f64 {
    if symbols == 0 {
        return 0.0;
    }

    bytes as f64 * 8.0 / symbols as f64
}

/// Describes the amount of data processed since `start_time` and the
/// throughput, e.g. `1.50 MB in 0.75s (2.000 MB/s)`.
#[must_use]
pub fn format_stats(start_time: Instant, bytes_processed: ByteNum) -> String {
    let secs = start_time.elapsed().as_secs_f32();
    let rate = if secs > 0.0 {
        bytes_processed.get() as f32 / secs
    } else {
        0.0
    };

    format!(
        "{} in {:.2}s ({})",
        format_bytes(bytes_processed),
        secs,
        format_rate(rate)
    )
}

fn format_rate(bytes_per_sec: f32) -> String {
    match NumberPrefix::decimal(bytes_per_sec) {
        NumberPrefix::Standalone(bytes) => format!("{:.0} B/s", bytes),
        NumberPrefix::Prefixed(prefix, n) => format!("{:.3} {}B/s", n, prefix),
    }
}

#[must_use]
pub fn format_bytes(bytes: ByteNum) -> String {
    match NumberPrefix::decimal(bytes.get() as f32) {
        NumberPrefix::Standalone(bytes) => {
            format!("{} bytes", bytes)
        }
        NumberPrefix::Prefixed(prefix, n) => {
            format!("{:.2} {}B", n, prefix)
        }
    }
}

/// Counters shared by the workers of an archive compression run.
#[derive(Debug)]
pub struct CompressionStats {
    start_time: Instant,

    in_bytes: AtomicUsize,
    in_symbols: AtomicUsize,
    in_exception_bytes: AtomicUsize,

    out_bytes: AtomicUsize,
    out_payload_bytes: AtomicUsize,

    records: AtomicUsize,
}

impl CompressionStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),

            in_bytes: AtomicUsize::new(0),
            in_symbols: AtomicUsize::new(0),
            in_exception_bytes: AtomicUsize::new(0),

            out_bytes: AtomicUsize::new(0),
            out_payload_bytes: AtomicUsize::new(0),

            records: AtomicUsize::new(0),
        }
    }

    pub fn add_in_bytes(&self, bytes: ByteNum) {
        self.in_bytes.fetch_add(bytes.get(), Ordering::Relaxed);
    }

    pub fn add_in_symbols(&self, num: usize) {
        self.in_symbols.fetch_add(num, Ordering::Relaxed);
    }

    pub fn add_in_exception_bytes(&self, num: usize) {
        self.in_exception_bytes.fetch_add(num, Ordering::Relaxed);
    }

    pub fn set_out_bytes(&self, num: usize) {
        self.out_bytes.store(num, Ordering::SeqCst);
    }

    pub fn add_out_payload_bytes(&self, num: usize) {
        self.out_payload_bytes.fetch_add(num, Ordering::Relaxed);
    }

    pub fn inc_records(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn in_symbols(&self) -> usize {
        self.in_symbols.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn out_payload_bytes(&self) -> usize {
        self.out_payload_bytes.load(Ordering::SeqCst)
    }

    pub fn log_summary(&self) {
        let in_bytes = self.in_bytes.load(Ordering::SeqCst);
        let in_symbols = self.in_symbols.load(Ordering::SeqCst);
        let in_exception_bytes = self.in_exception_bytes.load(Ordering::SeqCst);

        let out_bytes = self.out_bytes.load(Ordering::SeqCst);
        let out_payload_bytes = self.out_payload_bytes.load(Ordering::SeqCst);

        let records = self.records.load(Ordering::SeqCst);

        info!(
            "Compressed {}",
            format_stats(self.start_time, ByteNum::new(in_bytes))
        );
        info!("{} records, {} bases", records, in_symbols);

        let rate = if in_bytes == 0 {
            0.0
        } else {
            out_bytes as f32 / in_bytes as f32 * 100.0
        };
        info!("File: {:>9} -> {:>9} ({:>7.3}%)", in_bytes, out_bytes, rate);

        info!(
            "Base: {:>9} -> {:>9} ({:.4} bpb)",
            in_symbols,
            out_payload_bytes,
            bits_per_symbol(out_payload_bytes, in_symbols)
        );
        info!(
            "Rest: {:>9} bytes of headers, titles and {} non-ACGT bases",
            out_bytes.saturating_sub(out_payload_bytes),
            in_exception_bytes
        );
    }
}

impl Default for CompressionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::progress::ByteNum;
    use crate::stats::{bits_per_symbol, format_bytes, format_rate, CompressionStats};

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(ByteNum::new(512)), "512 bytes");
        assert_eq!(format_bytes(ByteNum::new(1_500_000)), "1.50 MB");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(12.0), "12 B/s");
        assert_eq!(format_rate(2_000_000.0), "2.000 MB/s");
    }

    #[test]
    fn test_bits_per_symbol() {
        assert_eq!(bits_per_symbol(1, 4), 2.0);
    }

    #[test]
    fn test_stats_counters() {
        let stats = CompressionStats::new();
        stats.add_in_symbols(100);
        stats.add_in_symbols(20);
        stats.add_out_payload_bytes(30);
        stats.inc_records();
        stats.log_summary();

        assert_eq!(stats.in_symbols(), 120);
        assert_eq!(stats.out_payload_bytes(), 30);
    }
}

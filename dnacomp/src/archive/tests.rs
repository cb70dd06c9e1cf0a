use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::_internal_test_data::{
    random_sequence, AMBIGUOUS_FASTA_STR, MULTI_RECORD_FASTA_STR, SIMPLE_FASTA_STR,
};
use crate::archive::compressor::{ArchiveCompressor, ArchiveCompressorParams};
use crate::archive::decompressor::{ArchiveDecompressor, ArchiveDecompressorParams};
use crate::archive::ArchiveError;
use crate::context::ContextOrder;
use crate::fasta::{AmbiguityPolicy, FastaRecord};
use crate::pipeline::{CompressorParams, DecompressorError};
use crate::progress::tests::CountingProgress;
use crate::sequence::Acid;

fn small_compressor_params() -> CompressorParams {
    CompressorParams::builder()
        .max_order(ContextOrder::new(4).unwrap())
        .build()
}

fn compress_str(data: &str, policy: AmbiguityPolicy, thread_num: usize) -> Vec<u8> {
    let params = ArchiveCompressorParams::builder()
        .compressor(small_compressor_params())
        .policy(policy)
        .thread_num(thread_num)
        .build();
    let mut compressor = ArchiveCompressor::with_params(Vec::new(), params);
    compressor.compress(data.as_bytes()).unwrap();

    compressor.into_inner()
}

fn decompress_to_string(archive: &[u8], thread_num: usize) -> String {
    let params = ArchiveDecompressorParams::builder()
        .thread_num(thread_num)
        .build();
    let mut output = Vec::new();
    ArchiveDecompressor::with_params(archive, params)
        .decompress(&mut output)
        .unwrap();

    String::from_utf8(output).unwrap()
}

fn round_trip(data: &str) {
    for thread_num in [1, 2, 4] {
        let archive = compress_str(data, AmbiguityPolicy::Preserve, thread_num);
        assert_eq!(decompress_to_string(&archive, thread_num), data);
    }
}

#[test_log::test]
fn test_round_trip_empty_file() {
    let archive = compress_str("", AmbiguityPolicy::Preserve, 1);

    assert_eq!(archive, b"DNZA\x01\x00\x00\x00\x00\x00\x00");
    assert_eq!(decompress_to_string(&archive, 1), "");
}

#[test_log::test]
fn test_round_trip_simple() {
    round_trip(SIMPLE_FASTA_STR);
}

#[test]
fn test_round_trip_multiple_records() {
    round_trip(MULTI_RECORD_FASTA_STR);
}

#[test]
fn test_round_trip_ambiguous() {
    round_trip(AMBIGUOUS_FASTA_STR);
}

#[test]
fn test_round_trip_untitled_record() {
    round_trip("ACGTTGCA\nAC\n>titled\nGGG\n");
}

#[test]
fn test_round_trip_long_record() {
    let bases: String = random_sequence(50_000, 7)
        .iter()
        .map(|acid| acid.to_byte() as char)
        .collect();
    let mut data = String::from(">long\n");
    for line in bases.as_bytes().chunks(70) {
        data.push_str(std::str::from_utf8(line).unwrap());
        data.push('\n');
    }

    round_trip(&data);
}

#[test]
fn test_skip_policy_drops_ambiguous() {
    let archive = compress_str(">s\nNNACGTRN\n", AmbiguityPolicy::Skip, 1);

    assert_eq!(decompress_to_string(&archive, 1), ">s\nACGT\n");
}

#[test]
fn test_replace_policy() {
    let archive = compress_str(">s\nNNACGT\n", AmbiguityPolicy::Replace(Acid::C), 1);

    assert_eq!(decompress_to_string(&archive, 1), ">s\nCCACGT\n");
}

#[test]
fn test_strict_policy_rejects_ambiguous() {
    let params = ArchiveCompressorParams::builder()
        .policy(AmbiguityPolicy::Strict)
        .build();
    let mut compressor = ArchiveCompressor::with_params(Vec::new(), params);
    let result = compressor.compress(">s\nACGN\n".as_bytes());

    assert!(matches!(result, Err(ArchiveError::Fasta(_))));
}

#[test]
fn test_compress_records_directly() {
    let records = vec![
        FastaRecord::new(Some("a".to_owned()), random_sequence(1000, 1)).with_line_width(80),
        FastaRecord::new(None, random_sequence(10, 2)),
    ];
    let params = ArchiveCompressorParams::builder()
        .compressor(small_compressor_params())
        .build();
    let mut compressor = ArchiveCompressor::with_params(Vec::new(), params);
    compressor.compress_records(&records).unwrap();
    assert_eq!(compressor.stats().in_symbols(), 1010);

    let archive = compressor.into_inner();
    let restored = ArchiveDecompressor::new(archive.as_slice())
        .read_records()
        .unwrap();
    assert_eq!(restored, records);
}

#[test]
fn test_progress() {
    let progress = Arc::new(CountingProgress::default());
    let params = ArchiveCompressorParams::builder()
        .compressor(small_compressor_params())
        .progress_notifier(progress.clone())
        .build();
    let mut compressor = ArchiveCompressor::with_params(Vec::new(), params);
    compressor
        .compress(MULTI_RECORD_FASTA_STR.as_bytes())
        .unwrap();

    assert_eq!(progress.records.load(Ordering::Relaxed), 4);
    assert_eq!(progress.finished.load(Ordering::Relaxed), 4);
    assert_eq!(
        progress.bytes.load(Ordering::Relaxed),
        MULTI_RECORD_FASTA_STR.len() as u64
    );

    let archive = compressor.into_inner();
    let progress = Arc::new(CountingProgress::default());
    let params = ArchiveDecompressorParams::builder()
        .progress_notifier(progress.clone())
        .build();
    ArchiveDecompressor::with_params(archive.as_slice(), params)
        .read_records()
        .unwrap();

    assert_eq!(progress.finished.load(Ordering::Relaxed), 4);
    assert_eq!(
        progress.bytes.load(Ordering::Relaxed),
        archive.len() as u64 - 11
    );
}

#[test]
fn test_invalid_magic() {
    let mut archive = compress_str(SIMPLE_FASTA_STR, AmbiguityPolicy::Preserve, 1);
    archive[0] = b'X';

    let result = ArchiveDecompressor::new(archive.as_slice()).read_records();
    assert!(matches!(result, Err(ArchiveError::SerializeError(_))));
}

#[test]
fn test_invalid_version() {
    let mut archive = compress_str(SIMPLE_FASTA_STR, AmbiguityPolicy::Preserve, 1);
    archive[4] = 9;

    let result = ArchiveDecompressor::new(archive.as_slice()).read_records();
    assert!(matches!(result, Err(ArchiveError::InvalidVersion(9))));
}

#[test]
fn test_invalid_policy() {
    let mut archive = compress_str(SIMPLE_FASTA_STR, AmbiguityPolicy::Preserve, 1);
    archive[5] = 7;

    let result = ArchiveDecompressor::new(archive.as_slice()).read_records();
    assert!(matches!(result, Err(ArchiveError::InvalidPolicy(7, 0))));
}

#[test]
fn test_truncated_archive() {
    let archive = compress_str(MULTI_RECORD_FASTA_STR, AmbiguityPolicy::Preserve, 1);

    let result = ArchiveDecompressor::new(&archive[..archive.len() - 3]).read_records();
    assert!(result.is_err());
}

#[test]
fn test_corrupted_record_checksum() {
    let mut archive = compress_str(">s\nACGTACGTAAAC\n", AmbiguityPolicy::Preserve, 1);
    // Header (11) + title flag, length and bytes (6) + line width (4) + run
    // count (4) + container length (8), then the container itself. The
    // container checksum is at offset 23 inside of it.
    let checksum_offset = 11 + 6 + 4 + 4 + 8 + 23;
    archive[checksum_offset] ^= 0xFF;

    let result = ArchiveDecompressor::new(archive.as_slice()).read_records();
    assert!(matches!(
        result,
        Err(ArchiveError::Decompress {
            record: 0,
            source: DecompressorError::ChecksumMismatch { .. }
        })
    ));
}

#[test]
fn test_error_display() {
    let error = ArchiveError::invalid_record(3, "title is not valid UTF-8");
    assert_eq!(
        error.to_string(),
        "Invalid record #3: title is not valid UTF-8"
    );
    assert_eq!(
        ArchiveError::InvalidPolicy(9, 1).to_string(),
        "Invalid ambiguity policy: 9 (placeholder 1)"
    );
}

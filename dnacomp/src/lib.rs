//! Lossless compression of nucleotide sequences with an adaptive order-k
//! context model driving an rANS entropy coder.
//!
//! [`pipeline::compress`] and [`pipeline::decompress`] work on a single
//! sequence of [`sequence::Acid`]s; the [`archive`] module wraps them to
//! store whole FASTA files.

pub mod analysis;
pub mod archive;
pub mod coder;
pub mod container;
pub mod context;
pub mod fasta;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod sequence;
pub mod stats;

#[doc(hidden)]
pub mod _internal_test_data;

use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::sequence::Acid::{A, C, G, T};
use crate::sequence::{Acid, Symbol};

pub const SIMPLE_FASTA_STR: &str = ">SEQ_ID sample record
GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT
GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT
CAAAGCAGTATCGATC
";

pub const AMBIGUOUS_FASTA_STR: &str = ">chr_test
NNNNNNNNNNACGTACGTTAGGCTAGCTAGGATCCNNNNNNNNNNNNNNNNNNNACGTTG
CCAGTRYACGTNNNNACGT
";

pub const MULTI_RECORD_FASTA_STR: &str = ">first
ACGTACGTAC
GTACGTAC
>second
TTTTGGGGCCCCAAAA
>third
>fourth with a longer title
GGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGG
GGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGG
ACGT
";

lazy_static! {
    pub static ref SHORT_TEST_SEQUENCE: Vec<Acid> = vec![A, C, T, G];
    pub static ref SIMPLE_TEST_SEQUENCE: Vec<Acid> = vec![
        G, A, T, T, T, G, G, G, G, T, T, C, A, A, A, G, C, A, G, T, A, T, C, G, A, T, C, A, A, A,
        T, A, G, T, A, A, A, T, C, C, A, T, T, T, G, T, T, C, A, A, C, T, C, A, C, A, G, T, T, T,
    ];
    pub static ref PERIODIC_ACGT_10K: Vec<Acid> = [A, C, G, T]
        .iter()
        .copied()
        .cycle()
        .take(10_000)
        .collect();
    pub static ref RANDOM_100K: Vec<Acid> = random_sequence(100_000, 1337);
    pub static ref SEQ_1M: Vec<Acid> = repetitive_sequence(1024 * 1024, 2022);
}

/// Uniformly distributed nucleotides.
#[must_use]
pub fn random_sequence(len: usize, seed: u64) -> Vec<Acid> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..len)
        .map(|_| Acid::from_usize(rng.gen_range(0..Acid::SIZE)))
        .collect()
}

/// Genome-like sequence: copies of a small pool of motifs with occasional
/// point mutations.
#[must_use]
pub fn repetitive_sequence(len: usize, seed: u64) -> Vec<Acid> {
    const MOTIF_NUM: usize = 64;
    const MOTIF_LEN: usize = 300;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let motifs: Vec<Vec<Acid>> = (0..MOTIF_NUM)
        .map(|_| random_sequence(MOTIF_LEN, rng.gen()))
        .collect();

    let mut result = Vec::with_capacity(len);
    while result.len() < len {
        let motif = &motifs[rng.gen_range(0..MOTIF_NUM)];
        for &acid in motif {
            if rng.gen_ratio(1, 100) {
                result.push(Acid::from_usize(rng.gen_range(0..Acid::SIZE)));
            } else {
                result.push(acid);
            }
        }
    }
    result.truncate(len);

    result
}

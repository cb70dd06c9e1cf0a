//! Byte-wise rANS entropy coder driven by externally supplied distributions.
//!
//! rANS is last-in first-out: the decoder recovers symbols in the reverse of
//! the order the encoder consumed them. [`RansEncoder`] therefore buffers the
//! quantized symbol ranges of a whole pass and runs the actual transform
//! backwards in [`RansEncoder::finish`], reversing the produced bytes, so that
//! [`RansDecoder`] reads the stream front to back in the original symbol
//! order.

use std::error::Error;
use std::fmt::{Display, Formatter};

use byteorder::{BigEndian, ByteOrder};
use log::trace;

use crate::model::Distribution;
use crate::sequence::Acid;

/// Lower bound of the normalized coder state.
pub const RANS_L: u32 = 1 << 23;
const STATE_BYTES: usize = 4;

pub const MIN_SCALE_BITS: u8 = 8;
pub const MAX_SCALE_BITS: u8 = 16;
pub const DEFAULT_SCALE_BITS: u8 = 16;

/// Error occurring during entropy coding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CoderError {
    /// The symbol to encode has a zero frequency in the supplied
    /// distribution.
    ZeroProbabilitySymbol(Acid),
    /// The encoder has already produced its output.
    CoderAlreadyFinished,
    /// The decoder needed more input than the payload holds.
    StreamExhausted,
    /// All symbols have been decoded, but payload bytes remain.
    TrailingData(usize),
    /// The decoder state is inconsistent with the encoded stream.
    CorruptedState(u32),
    /// Precision outside of `MIN_SCALE_BITS..=MAX_SCALE_BITS`.
    InvalidScaleBits(u8),
    /// The supplied distribution has a total of zero.
    EmptyDistribution,
}

impl Display for CoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoderError::ZeroProbabilitySymbol(acid) => {
                write!(f, "Symbol {} has zero probability", acid)
            }
            CoderError::CoderAlreadyFinished => write!(f, "Coder has already been finished"),
            CoderError::StreamExhausted => write!(f, "Unexpected end of the encoded stream"),
            CoderError::TrailingData(bytes) => {
                write!(f, "{} unread bytes left after decoding", bytes)
            }
            CoderError::CorruptedState(state) => {
                write!(f, "Corrupted coder state: {:08X}", state)
            }
            CoderError::InvalidScaleBits(scale_bits) => write!(
                f,
                "Invalid scale bits: {} (expected {}..={})",
                scale_bits, MIN_SCALE_BITS, MAX_SCALE_BITS
            ),
            CoderError::EmptyDistribution => write!(f, "Distribution total is zero"),
        }
    }
}

impl Error for CoderError {}

pub type CoderResult<T> = Result<T, CoderError>;

pub fn check_scale_bits(scale_bits: u8) -> CoderResult<()> {
    if (MIN_SCALE_BITS..=MAX_SCALE_BITS).contains(&scale_bits) {
        Ok(())
    } else {
        Err(CoderError::InvalidScaleBits(scale_bits))
    }
}

/// Maps a distribution onto a total of exactly `2^scale_bits`.
///
/// Every non-zero frequency stays non-zero; the rounding difference is
/// absorbed by the largest frequency (the first one in canonical order if
/// several are equal). Integer-only, so both sides get identical results.
pub fn quantize(distribution: &Distribution, scale_bits: u8) -> CoderResult<Distribution> {
    let target = 1_u64 << scale_bits;
    let total = distribution.total() as u64;
    if total == 0 {
        return Err(CoderError::EmptyDistribution);
    }
    if total == target {
        return Ok(*distribution);
    }

    let mut freqs = [0_u64; 4];
    for (quantized, &freq) in freqs.iter_mut().zip(distribution.freqs().iter()) {
        if freq > 0 {
            *quantized = (freq as u64 * target / total).max(1);
        }
    }

    let largest = freqs
        .iter()
        .enumerate()
        .fold(0, |best, (i, &freq)| if freq > freqs[best] { i } else { best });
    let sum: u64 = freqs.iter().sum();
    // |target - sum| is bounded by the symbol count, while the largest
    // frequency is at least target / 4.
    freqs[largest] = freqs[largest] + target - sum;

    let mut result = [0_u32; 4];
    for (out, &freq) in result.iter_mut().zip(freqs.iter()) {
        *out = freq as u32;
    }
    Ok(Distribution::from_freqs(result))
}

#[derive(Copy, Clone, Debug)]
struct EncSymbol {
    start: u32,
    freq: u32,
}

/// rANS encoder for a single pass over a sequence.
#[derive(Debug)]
pub struct RansEncoder {
    scale_bits: u8,
    symbols: Vec<EncSymbol>,
    finished: bool,
}

impl RansEncoder {
    pub fn new(scale_bits: u8) -> CoderResult<Self> {
        Self::with_capacity(scale_bits, 0)
    }

    pub fn with_capacity(scale_bits: u8, capacity: usize) -> CoderResult<Self> {
        check_scale_bits(scale_bits)?;

        Ok(Self {
            scale_bits,
            symbols: Vec::with_capacity(capacity),
            finished: false,
        })
    }

    #[inline]
    #[must_use]
    pub fn scale_bits(&self) -> u8 {
        self.scale_bits
    }

    /// Number of symbols encoded so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Appends `acid` coded with `distribution`.
    pub fn encode_symbol(&mut self, distribution: &Distribution, acid: Acid) -> CoderResult<()> {
        if self.finished {
            return Err(CoderError::CoderAlreadyFinished);
        }
        if distribution.freq(acid) == 0 {
            return Err(CoderError::ZeroProbabilitySymbol(acid));
        }

        let quantized = quantize(distribution, self.scale_bits)?;
        self.symbols.push(EncSymbol {
            start: quantized.low(acid),
            freq: quantized.freq(acid),
        });

        Ok(())
    }

    /// Flushes the coder and returns the encoded stream.
    ///
    /// The stream starts with the final state (big endian), followed by the
    /// renormalization bytes in decoding order.
    pub fn finish(&mut self) -> CoderResult<Vec<u8>> {
        if self.finished {
            return Err(CoderError::CoderAlreadyFinished);
        }
        self.finished = true;

        let scale_bits = self.scale_bits as u32;
        let x_max_base = (RANS_L >> scale_bits) << 8;
        let mut out = Vec::with_capacity(self.symbols.len() / 4 + STATE_BYTES);
        let mut x = RANS_L;

        for symbol in self.symbols.iter().rev() {
            let x_max = x_max_base * symbol.freq;
            while x >= x_max {
                out.push(x as u8);
                x >>= 8;
            }
            x = ((x / symbol.freq) << scale_bits) + (x % symbol.freq) + symbol.start;
        }

        for shift in [0, 8, 16, 24] {
            out.push((x >> shift) as u8);
        }
        out.reverse();

        trace!(
            "rANS encoder finished: {} symbols, {} bytes, final state {:08X}",
            self.symbols.len(),
            out.len(),
            x
        );
        self.symbols = Vec::new();

        Ok(out)
    }
}

/// rANS decoder reading a stream produced by [`RansEncoder::finish`].
#[derive(Debug)]
pub struct RansDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    state: u32,
    scale_bits: u8,
}

impl<'a> RansDecoder<'a> {
    pub fn new(data: &'a [u8], scale_bits: u8) -> CoderResult<Self> {
        check_scale_bits(scale_bits)?;
        if data.len() < STATE_BYTES {
            return Err(CoderError::StreamExhausted);
        }

        let state = BigEndian::read_u32(&data[..STATE_BYTES]);
        if !(RANS_L..RANS_L << 8).contains(&state) {
            return Err(CoderError::CorruptedState(state));
        }

        Ok(Self {
            data,
            pos: STATE_BYTES,
            state,
            scale_bits,
        })
    }

    /// Number of bytes not consumed yet.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Decodes the next symbol, which must have been encoded with an
    /// identical `distribution`.
    pub fn decode_symbol(&mut self, distribution: &Distribution) -> CoderResult<Acid> {
        let quantized = quantize(distribution, self.scale_bits)?;
        let scale_bits = self.scale_bits as u32;
        let mask = (1 << scale_bits) - 1;

        let slot = self.state & mask;
        let acid = quantized
            .symbol_at(slot)
            .ok_or(CoderError::CorruptedState(self.state))?;

        let mut x = quantized.freq(acid) * (self.state >> scale_bits) + slot - quantized.low(acid);
        while x < RANS_L {
            let byte = *self.data.get(self.pos).ok_or(CoderError::StreamExhausted)?;
            self.pos += 1;
            x = (x << 8) | byte as u32;
        }
        self.state = x;

        Ok(acid)
    }

    /// Verifies that the decoder ended in the encoder's initial state and
    /// that the whole stream has been consumed.
    pub fn finish(self) -> CoderResult<()> {
        if self.state != RANS_L {
            return Err(CoderError::CorruptedState(self.state));
        }
        if self.remaining() > 0 {
            return Err(CoderError::TrailingData(self.remaining()));
        }

        Ok(())
    }
}

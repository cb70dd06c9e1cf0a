use std::fmt::{Display, Formatter};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A symbol of a fixed-size alphabet that can be mapped to a dense index.
pub trait Symbol: PartialEq + Eq + Hash + Copy {
    const SIZE: usize;

    fn to_usize(&self) -> usize;
    fn from_usize(value: usize) -> Self;

    fn values() -> Vec<Self> {
        (0..Self::SIZE).map(|value| Self::from_usize(value)).collect()
    }
}

/// A single nucleotide.
///
/// The discriminants are the 2-bit codes used everywhere in the model and on
/// disk; their order (`A < C < G < T`) is the canonical symbol order of every
/// probability distribution.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Acid {
    #[default]
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

impl Acid {
    /// Returns the 2-bit code of this acid.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::sequence::Acid;
    ///
    /// assert_eq!(Acid::A.code(), 0);
    /// assert_eq!(Acid::T.code(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns the acid for given 2-bit code, or `None` if the code is out of
    /// range.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::sequence::Acid;
    ///
    /// assert_eq!(Acid::from_code(2), Some(Acid::G));
    /// assert_eq!(Acid::from_code(4), None);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Acid::A),
            1 => Some(Acid::C),
            2 => Some(Acid::G),
            3 => Some(Acid::T),
            _ => None,
        }
    }

    /// Parses an upper- or lowercase nucleotide character.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::sequence::Acid;
    ///
    /// assert_eq!(Acid::from_byte(b'g'), Some(Acid::G));
    /// assert_eq!(Acid::from_byte(b'N'), None);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' | b'a' => Some(Acid::A),
            b'C' | b'c' => Some(Acid::C),
            b'G' | b'g' => Some(Acid::G),
            b'T' | b't' => Some(Acid::T),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Acid::A => b'A',
            Acid::C => b'C',
            Acid::G => b'G',
            Acid::T => b'T',
        }
    }
}

impl Symbol for Acid {
    const SIZE: usize = 4;

    #[inline]
    fn to_usize(&self) -> usize {
        *self as usize
    }

    #[inline]
    fn from_usize(value: usize) -> Self {
        match value {
            0 => Acid::A,
            1 => Acid::C,
            2 => Acid::G,
            3 => Acid::T,
            _ => panic!("Invalid acid index: {}", value),
        }
    }
}

impl Display for Acid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}

/// Parses a string of `ACGT` characters, returning `None` on any other
/// character.
///
/// # Examples
/// ```
/// use dnacomp::sequence::{parse_acids, Acid};
///
/// assert_eq!(parse_acids("ACgt"), Some(vec![Acid::A, Acid::C, Acid::G, Acid::T]));
/// assert_eq!(parse_acids("ANA"), None);
/// ```
#[must_use]
pub fn parse_acids(s: &str) -> Option<Vec<Acid>> {
    s.bytes().map(Acid::from_byte).collect()
}

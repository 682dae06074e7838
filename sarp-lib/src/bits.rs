//! Bit addressable buffers.
//!
//! All SARP and beacon fields are defined as bit ranges counted from the most significant
//! bit of the first byte. [Bits] is the single view used to read them.
use std::fmt::{self, Write};
use std::ops::Range;

use serde::{Serialize, Serializer};

/// An owned, big-endian (MSB first) sequence of bits.
///
/// Bits past `len` in the final byte are always zero.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bits {
    data: Vec<u8>,
    len: usize,
}

impl Bits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from whole bytes; the length is `dat.len() * 8`.
    #[must_use]
    pub fn from_bytes(dat: &[u8]) -> Self {
        Bits {
            data: dat.to_vec(),
            len: dat.len() * 8,
        }
    }

    #[must_use]
    pub fn from_bools(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the bit at `idx`.
    ///
    /// # Panics
    /// If `idx` is out of range.
    #[must_use]
    pub fn bit(&self, idx: usize) -> bool {
        assert!(idx < self.len, "bit index {idx} out of range for {} bits", self.len);
        (self.data[idx / 8] >> (7 - idx % 8)) & 0x1 == 1
    }

    /// Unsigned integer value of the bits in `range`, first bit most significant.
    ///
    /// # Panics
    /// If the range is out of bounds or wider than 64 bits.
    #[must_use]
    pub fn uint(&self, range: Range<usize>) -> u64 {
        self.check_range(&range);
        assert!(
            range.len() <= 64,
            "cannot extract {} bits into a u64",
            range.len()
        );
        range.fold(0u64, |acc, idx| (acc << 1) | u64::from(self.bit(idx)))
    }

    /// Number of set bits in `range`.
    ///
    /// # Panics
    /// If the range is out of bounds.
    #[must_use]
    pub fn count_ones(&self, range: Range<usize>) -> u32 {
        self.check_range(&range);
        let mut count = 0;
        for idx in range {
            if self.bit(idx) {
                count += 1;
            }
        }
        count
    }

    /// Copy the bits in `range` into a new buffer.
    ///
    /// # Panics
    /// If the range is out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Bits {
        self.check_range(&range);
        range.map(|idx| self.bit(idx)).collect()
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            let last = self.data.len() - 1;
            self.data[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    pub fn extend(&mut self, other: &Bits) {
        for bit in other.iter() {
            self.push(bit);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|idx| self.bit(idx))
    }

    /// Underlying bytes, with any trailing partial byte zero padded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Lowercase hex, one digit per started nibble.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let num_digits = self.len.div_ceil(4);
        let mut s = String::with_capacity(num_digits);
        for b in &self.data {
            let _ = write!(s, "{b:02x}");
        }
        s.truncate(num_digits);
        s
    }

    /// The bits as a string of `0` and `1` characters.
    #[must_use]
    pub fn to_bit_string(&self) -> String {
        self.iter().map(|b| if b { '1' } else { '0' }).collect()
    }

    fn check_range(&self, range: &Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "bit range {range:?} out of range for {} bits",
            self.len
        );
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut bits = Bits::new();
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits{{len={}, hex={}}}", self.len, self.to_hex())
    }
}

impl Serialize for Bits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bit_string())
    }
}

/// Check a parity bit over `data` using the convention shared by the timecode and Doppler
/// words: a set parity bit requires an odd number of ones, a clear one an even number.
#[must_use]
pub fn odd_parity_valid(bits: &Bits, data: Range<usize>, parity: usize) -> bool {
    let odd = bits.count_ones(data) % 2 == 1;
    bits.bit(parity) == odd
}

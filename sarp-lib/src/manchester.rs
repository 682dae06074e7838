//! Manchester line decoding of demodulated symbols.
use tracing::trace;

use crate::bits::Bits;
use crate::prelude::*;

/// Number of line symbols delivered per frame period.
pub const SYMBOL_BLOCK_LEN: usize = 1200;

/// Decode Manchester symbol pairs into bit-packed bytes, MSB first.
///
/// The pair (0,1) is a 0 bit and (1,0) is a 1 bit, or the reverse if `inverted`. Any
/// trailing partial byte is zero padded.
///
/// # Errors
/// [Error::OddSymbolCount] if `symbols` has an odd length, or [Error::LineCodeViolation]
/// on the first pair that is (0,0) or (1,1). Nothing is returned for a block containing a
/// violation.
pub fn decode(symbols: &[bool], inverted: bool) -> Result<Vec<u8>> {
    if symbols.len() % 2 != 0 {
        return Err(Error::OddSymbolCount {
            actual: symbols.len(),
        });
    }

    let mut bits = Bits::new();
    for (idx, pair) in symbols.chunks_exact(2).enumerate() {
        let bit = match (pair[0], pair[1]) {
            (false, true) => false,
            (true, false) => true,
            _ => {
                trace!(index = idx * 2, "line code violation");
                return Err(Error::LineCodeViolation { index: idx * 2 });
            }
        };
        bits.push(bit ^ inverted);
    }

    Ok(bits.as_bytes().to_vec())
}

/// Decode exactly one [SYMBOL_BLOCK_LEN] symbol block into a 75 byte frame.
///
/// # Errors
/// [Error::InvalidLength] if the block is not [SYMBOL_BLOCK_LEN] symbols, otherwise as
/// for [decode].
pub fn decode_block(symbols: &[bool], inverted: bool) -> Result<Vec<u8>> {
    if symbols.len() != SYMBOL_BLOCK_LEN {
        return Err(Error::InvalidLength {
            actual: symbols.len(),
            expected: SYMBOL_BLOCK_LEN,
        });
    }
    decode(symbols, inverted)
}

/// Encode bytes into Manchester symbols; the inverse of [decode].
#[must_use]
pub fn encode(dat: &[u8], inverted: bool) -> Vec<bool> {
    let mut symbols = Vec::with_capacity(dat.len() * 16);
    for bit in Bits::from_bytes(dat).iter() {
        let bit = bit ^ inverted;
        symbols.push(bit);
        symbols.push(!bit);
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn decode_pairs() {
        let symbols = [
            false, true, true, false, true, false, false, true, // 0110
            true, false, true, false, true, false, true, false, // 1111
        ];
        assert_eq!(decode(&symbols, false).unwrap(), vec![0x6f]);
        assert_eq!(decode(&symbols, true).unwrap(), vec![0x90]);
    }

    #[test]
    fn decode_violation_returns_no_data() {
        let mut symbols = encode(&[0xd6, 0x42], false);
        symbols[6] = symbols[7];

        let zult = decode(&symbols, false);
        assert!(
            matches!(zult, Err(Error::LineCodeViolation { index: 6 })),
            "got {zult:?}"
        );
    }

    #[test]
    fn decode_odd_length_fails() {
        let zult = decode(&[true, false, true], false);
        assert!(matches!(zult, Err(Error::OddSymbolCount { actual: 3 })));
        assert_eq!(
            zult.unwrap_err().to_string(),
            "Odd number of Manchester symbols: 3"
        );
    }

    #[test]
    fn decode_block_requires_full_block() {
        let symbols = encode(&[0u8; 74], false);
        assert!(matches!(
            decode_block(&symbols, false),
            Err(Error::InvalidLength {
                actual: 1184,
                expected: SYMBOL_BLOCK_LEN
            })
        ));

        let symbols = encode(&[0u8; 75], false);
        assert_eq!(decode_block(&symbols, false).unwrap().len(), 75);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut rng = rand::thread_rng();
        for inverted in [false, true] {
            let dat: Vec<u8> = (0..75).map(|_| rng.gen()).collect();
            let symbols = encode(&dat, inverted);
            assert_eq!(symbols.len(), SYMBOL_BLOCK_LEN);

            let decoded = decode_block(&symbols, inverted).unwrap();
            assert_eq!(decoded, dat);
            assert_eq!(encode(&decoded, inverted), symbols);
        }
    }
}

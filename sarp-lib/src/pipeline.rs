//! Block level decoding from symbols to [SarpFrame]s.
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, span, Level};
use typed_builder::TypedBuilder;

use crate::frame::SarpFrame;
use crate::manchester;
use crate::prelude::*;
use crate::Dialect;

/// Options controlling how symbol blocks are decoded.
#[derive(Clone, Copy, Debug, Default, TypedBuilder)]
pub struct DecodeOpts {
    /// Dialect used to decode the messages of every frame.
    #[builder(default)]
    pub dialect: Dialect,
    /// Whether the symbols have inverted polarity, i.e., (0,1) is a 1 bit.
    #[builder(default)]
    pub inverted: bool,
}

/// Decodes 1200-symbol blocks into [SarpFrame]s.
///
/// Blocks are independent; a block failing to decode produces an error and decoding carries
/// on with the next block.
///
/// # Examples
/// ```
/// use sarp::{manchester, Dialect, Pipeline};
///
/// let mut dat = vec![0u8; 75];
/// for offset in [0, 24, 48] {
///     dat[offset] = 0xd6;
/// }
/// dat[72..].copy_from_slice(&[0x42, 0xbb, 0x1f]);
/// let block = manchester::encode(&dat, false);
///
/// let pipeline = Pipeline::default().with_dialect(Dialect::SarsatSarp2);
/// let frames: Vec<_> = pipeline
///     .decode(vec![block].into_iter())
///     .filter_map(Result::ok)
///     .collect();
/// assert!(frames[0].is_valid());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    opts: DecodeOpts,
}

impl Pipeline {
    #[must_use]
    pub fn new(opts: DecodeOpts) -> Self {
        Pipeline { opts }
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.opts.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_inversion(mut self, inverted: bool) -> Self {
        self.opts.inverted = inverted;
        self
    }

    #[must_use]
    pub fn opts(&self) -> DecodeOpts {
        self.opts
    }

    /// Manchester decode a single symbol block and synchronize the resulting frame, stamping
    /// it with the current time.
    ///
    /// # Errors
    /// [Error::InvalidLength] if the block is not 1200 symbols, or
    /// [Error::LineCodeViolation] if it contains an invalid symbol pair.
    pub fn decode_block(&self, symbols: &[bool]) -> Result<SarpFrame> {
        let bytes = manchester::decode_block(symbols, self.opts.inverted)?;
        SarpFrame::decode(&bytes, Utc::now(), self.opts.dialect)
    }

    /// Returns an iterator decoding each block as it is consumed.
    pub fn decode<B>(self, blocks: B) -> impl Iterator<Item = Result<SarpFrame>>
    where
        B: Iterator<Item = Vec<bool>>,
    {
        blocks.enumerate().map(move |(idx, block)| {
            let span = span!(Level::TRACE, "block", block_idx = idx);
            let _guard = span.enter();
            let zult = self.decode_block(&block);
            if let Err(ref err) = zult {
                debug!("failed to decode block: {err}");
            }
            zult
        })
    }

    /// Decode a batch of blocks in parallel. Results are in the same order as `blocks`.
    #[must_use]
    pub fn decode_all(&self, blocks: &[Vec<bool>]) -> Vec<Result<SarpFrame>> {
        blocks
            .par_iter()
            .map(|block| self.decode_block(block))
            .collect()
    }
}

/// Running decode counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Symbol blocks received
    pub blocks: usize,
    /// Blocks successfully Manchester decoded
    pub manchester_ok: usize,
    /// Blocks that failed to decode
    pub manchester_failed: usize,
    /// Frames passing marker and sync word checks
    pub in_sync: usize,
    /// In sync frames with all messages format valid
    pub valid_frames: usize,
    pub accepted_messages: usize,
    pub beacons: usize,
}

impl Stats {
    /// Update counters with the result of decoding one block.
    pub fn record(&mut self, zult: &Result<SarpFrame>) {
        self.blocks += 1;
        let Ok(frame) = zult else {
            self.manchester_failed += 1;
            return;
        };
        self.manchester_ok += 1;
        if !frame.is_valid() {
            return;
        }
        self.in_sync += 1;

        let accepted = frame.accepted_messages();
        if !accepted.is_empty() {
            self.valid_frames += 1;
        }
        self.accepted_messages += accepted.len();
        self.beacons += accepted.iter().filter(|m| m.beacon().is_some()).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{MARKER, MARKER_OFFSETS, SYNC_WORD, SYNC_WORD_OFFSET};

    fn frame_bytes() -> Vec<u8> {
        let mut dat = vec![0u8; SarpFrame::LEN];
        for offset in MARKER_OFFSETS {
            dat[offset] = MARKER;
            // SARP-2 format bit, marking long messages valid
            dat[offset + 1] = 0x01;
        }
        dat[SYNC_WORD_OFFSET..].copy_from_slice(&SYNC_WORD);
        dat
    }

    #[test]
    fn decode_block() {
        let pipeline = Pipeline::new(DecodeOpts::builder().dialect(Dialect::SarsatSarp2).build());
        let frame = pipeline
            .decode_block(&manchester::encode(&frame_bytes(), false))
            .unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.dialect(), Dialect::SarsatSarp2);
        assert_eq!(frame.accepted_messages().len(), 3);
    }

    #[test]
    fn decode_block_inverted() {
        let block = manchester::encode(&frame_bytes(), true);

        let frame = Pipeline::default().decode_block(&block).unwrap();
        assert!(!frame.is_valid());

        let frame = Pipeline::default()
            .with_inversion(true)
            .decode_block(&block)
            .unwrap();
        assert!(frame.is_valid());
    }

    #[test]
    fn decode_block_errors() {
        let pipeline = Pipeline::default();
        assert!(matches!(
            pipeline.decode_block(&[true; 1198]),
            Err(Error::InvalidLength {
                actual: 1198,
                expected: 1200
            })
        ));
        assert!(matches!(
            pipeline.decode_block(&[true; 1200]),
            Err(Error::LineCodeViolation { index: 0 })
        ));
    }

    #[test]
    fn decode_continues_after_error() {
        let good = manchester::encode(&frame_bytes(), false);
        let blocks = vec![good.clone(), vec![false; 1200], good];

        let zults: Vec<_> = Pipeline::default().decode(blocks.into_iter()).collect();
        assert_eq!(zults.len(), 3);
        assert!(zults[0].is_ok());
        assert!(zults[1].is_err());
        assert!(zults[2].is_ok());
    }

    #[test]
    fn decode_all_preserves_order() {
        let good = manchester::encode(&frame_bytes(), false);
        let mut blocks = Vec::default();
        for idx in 0..50 {
            if idx % 3 == 0 {
                blocks.push(vec![true; 1200]);
            } else {
                blocks.push(good.clone());
            }
        }

        let zults = Pipeline::default().decode_all(&blocks);
        assert_eq!(zults.len(), 50);
        for (idx, zult) in zults.iter().enumerate() {
            assert_eq!(zult.is_err(), idx % 3 == 0, "block {idx}");
        }
    }

    #[test]
    fn stats_record() {
        let pipeline = Pipeline::default().with_dialect(Dialect::SarsatSarp2);
        let good = manchester::encode(&frame_bytes(), false);
        let mut unsynced = frame_bytes();
        unsynced[72] = 0;
        let mut format_invalid = frame_bytes();
        format_invalid[25] = 0;

        let mut stats = Stats::default();
        for block in [
            good.clone(),
            vec![true; 1200],
            manchester::encode(&unsynced, false),
            manchester::encode(&format_invalid, false),
            good,
        ] {
            stats.record(&pipeline.decode_block(&block));
        }

        assert_eq!(stats.blocks, 5);
        assert_eq!(stats.manchester_ok, 4);
        assert_eq!(stats.manchester_failed, 1);
        assert_eq!(stats.in_sync, 3);
        assert_eq!(stats.valid_frames, 2);
        assert_eq!(stats.accepted_messages, 6);
        assert_eq!(stats.beacons, 6);
    }
}

//! SARP frame synchronization.
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::message::SarpMessage;
use crate::prelude::*;
use crate::Dialect;

/// Sync word found at the end of every frame.
pub const SYNC_WORD: [u8; 3] = [0x42, 0xbb, 0x1f];
/// Marker byte found at the start of every message.
pub const MARKER: u8 = 0xd6;

/// Offset of the sync word in a frame
pub const SYNC_WORD_OFFSET: usize = 72;
/// Offsets of the message marker bytes in a frame
pub const MARKER_OFFSETS: [usize; 3] = [0, 24, 48];

/// The synchronization check that failed for an invalid frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SyncMismatch {
    /// Marker byte at the offset did not match [MARKER]
    Marker { offset: usize, found: u8 },
    /// The sync word did not match [SYNC_WORD]
    SyncWord { found: [u8; 3] },
}

/// Check the marker bytes and sync word of a frame, in frame order.
///
/// Only the bytes at [MARKER_OFFSETS] and the 3 bytes at [SYNC_WORD_OFFSET] are inspected.
fn check_sync(dat: &[u8; SarpFrame::LEN]) -> Option<SyncMismatch> {
    for offset in MARKER_OFFSETS {
        if dat[offset] != MARKER {
            return Some(SyncMismatch::Marker {
                offset,
                found: dat[offset],
            });
        }
    }
    let sync = &dat[SYNC_WORD_OFFSET..SYNC_WORD_OFFSET + SYNC_WORD.len()];
    if sync != SYNC_WORD {
        return Some(SyncMismatch::SyncWord {
            found: [sync[0], sync[1], sync[2]],
        });
    }
    None
}

/// A synchronized SARP frame containing three [SarpMessage]s.
///
/// The frame bytes start with the marker of the first message and end with the sync word.
/// The marker bytes remain part of their messages.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use sarp::{Dialect, SarpFrame};
///
/// let mut dat = vec![0u8; SarpFrame::LEN];
/// for offset in [0, 24, 48] {
///     dat[offset] = 0xd6;
/// }
/// dat[72..].copy_from_slice(&[0x42, 0xbb, 0x1f]);
///
/// let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp3).unwrap();
/// assert!(frame.is_valid());
/// assert_eq!(frame.messages().len(), 3);
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct SarpFrame {
    created: DateTime<Utc>,
    dialect: Dialect,
    length: usize,
    valid: bool,
    mismatch: Option<SyncMismatch>,
    messages: Vec<SarpMessage>,
}

impl SarpFrame {
    /// Frame length in bytes
    pub const LEN: usize = 75;

    /// Decode a frame from exactly [SarpFrame::LEN] Manchester decoded bytes.
    ///
    /// A frame failing synchronization is still returned, with `is_valid() == false` and no
    /// messages.
    ///
    /// # Errors
    /// [Error::InvalidLength] if `dat` is not [SarpFrame::LEN] bytes.
    pub fn decode(dat: &[u8], created: DateTime<Utc>, dialect: Dialect) -> Result<Self> {
        let dat: &[u8; Self::LEN] = dat.try_into().map_err(|_| Error::InvalidLength {
            actual: dat.len(),
            expected: Self::LEN,
        })?;

        let mismatch = check_sync(dat);
        let messages = match mismatch {
            Some(mismatch) => {
                debug!(?mismatch, "frame not in sync");
                Vec::default()
            }
            None => MARKER_OFFSETS
                .iter()
                .map(|&start| {
                    SarpMessage::decode(&dat[start..start + SarpMessage::LEN], created, dialect)
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(SarpFrame {
            created,
            dialect,
            length: dat.len(),
            valid: mismatch.is_none(),
            mismatch,
            messages,
        })
    }

    /// Change the dialect of the frame and all its messages. Messages are re-derived from
    /// their bytes.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
        for msg in &mut self.messages {
            msg.set_dialect(dialect);
        }
    }

    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Number of frame bytes decoded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn mismatch(&self) -> Option<SyncMismatch> {
        self.mismatch
    }

    /// The three messages of a valid frame, or none for an invalid frame.
    #[must_use]
    pub fn messages(&self) -> &[SarpMessage] {
        &self.messages
    }

    /// The messages of a valid frame if all three pass their format check, otherwise an
    /// empty slice.
    #[must_use]
    pub fn accepted_messages(&self) -> &[SarpMessage] {
        if self.valid && self.messages.iter().all(SarpMessage::is_format_valid) {
            &self.messages
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced_frame() -> Vec<u8> {
        let mut dat = vec![0u8; SarpFrame::LEN];
        for offset in MARKER_OFFSETS {
            dat[offset] = MARKER;
        }
        dat[SYNC_WORD_OFFSET..].copy_from_slice(&SYNC_WORD);
        dat
    }

    #[test]
    fn decode_synced_frame() {
        let dat = synced_frame();
        let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp3).unwrap();

        assert!(frame.is_valid());
        assert_eq!(frame.mismatch(), None);
        assert_eq!(frame.len(), 75);
        assert_eq!(frame.messages().len(), 3);
        for (msg, offset) in frame.messages().iter().zip(MARKER_OFFSETS) {
            assert_eq!(msg.raw(), &dat[offset..offset + 24]);
            assert_eq!(msg.raw()[0], MARKER, "marker stays in the message");
            assert_eq!(msg.created(), frame.created());
        }
    }

    #[test]
    fn decode_mismatch_per_check() {
        let cases = [
            (0, SyncMismatch::Marker { offset: 0, found: 0xd7 }),
            (24, SyncMismatch::Marker { offset: 24, found: 0xd7 }),
            (48, SyncMismatch::Marker { offset: 48, found: 0xd7 }),
        ];
        for (offset, expected) in cases {
            let mut dat = synced_frame();
            dat[offset] ^= 0x01;
            let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp3).unwrap();
            assert!(!frame.is_valid(), "offset {offset}");
            assert_eq!(frame.mismatch(), Some(expected));
            assert!(frame.messages().is_empty());
        }

        for offset in 72..75 {
            let mut dat = synced_frame();
            dat[offset] ^= 0x80;
            let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp3).unwrap();
            assert!(!frame.is_valid(), "offset {offset}");
            assert!(matches!(
                frame.mismatch(),
                Some(SyncMismatch::SyncWord { .. })
            ));
            assert!(frame.messages().is_empty());
        }
    }

    #[test]
    fn decode_only_inspects_sync_offsets() {
        for offset in (0..SarpFrame::LEN).filter(|o| ![0, 24, 48, 72, 73, 74].contains(o)) {
            let mut dat = synced_frame();
            dat[offset] = 0xff;
            let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp2).unwrap();
            assert!(frame.is_valid(), "offset {offset}");
        }
    }

    #[test]
    fn decode_invalid_length() {
        for len in [0, 3, 74, 76] {
            let zult = SarpFrame::decode(&vec![0u8; len], Utc::now(), Dialect::SarsatSarp3);
            assert!(
                matches!(zult, Err(Error::InvalidLength { actual, expected: 75 }) if actual == len),
                "len {len}"
            );
        }
    }

    #[test]
    fn set_dialect_cascades() {
        let dat = synced_frame();
        let mut frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp3).unwrap();
        frame.set_dialect(Dialect::CospasSarp2);

        assert_eq!(frame.dialect(), Dialect::CospasSarp2);
        for msg in frame.messages() {
            assert_eq!(msg.dialect(), Dialect::CospasSarp2);
            assert!(msg.header().is_unsupported());
        }
    }

    #[test]
    fn accepted_messages_requires_all_format_valid() {
        // word7 is zero so all messages are long, but the SARP-3 format bit is clear
        let dat = synced_frame();
        let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp3).unwrap();
        assert!(frame.accepted_messages().is_empty());

        // bit 15 of word0 is the SARP-2 format bit
        let mut dat = synced_frame();
        for offset in MARKER_OFFSETS {
            dat[offset + 1] = 0x01;
        }
        let frame = SarpFrame::decode(&dat, Utc::now(), Dialect::SarsatSarp2).unwrap();
        assert_eq!(frame.accepted_messages().len(), 3);
    }
}

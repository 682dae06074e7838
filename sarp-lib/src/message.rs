//! SARP message decoding.
//!
//! A SARP message is 24 bytes, read as eight 24-bit words. The field layout of the words
//! depends on the [Dialect] of the receiver producing the messages.
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::beacon::BeaconMessage;
use crate::bits::{odd_parity_valid, Bits};
use crate::prelude::*;
use crate::tables::SNR_LEVELS_DB;
use crate::Dialect;

/// Nominal burst frequency in Hz of a zero Doppler word, assuming the on-board oscillator
/// is at 10 MHz.
pub const DOPPLER_BASE_FREQ: f64 = (8121.0 / 200.0) * 10_000_000.0;
/// Hz per Doppler word count.
pub const DOPPLER_RESOLUTION: f64 = 0.015;

const MESSAGE_LEN: usize = 24;
const NUM_WORDS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Format {
    Short,
    Long,
    Housekeeping,
}

/// Result of decoding a single message field.
///
/// `Unsupported` means the dialect defines no layout for the field. `Absent` means the field
/// is not present in this message, e.g., housekeeping messages, or the Doppler word of a
/// message that failed the format check.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Decoded<T> {
    Value(T),
    Unsupported(Dialect),
    Absent,
}

impl<T> Decoded<T> {
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Convert into a result, where an absent field is `Ok(None)`.
    ///
    /// # Errors
    /// [Error::UnsupportedDialect] naming `field` if the field is not supported.
    pub fn into_result(self, field: &'static str) -> Result<Option<T>> {
        match self {
            Self::Value(v) => Ok(Some(v)),
            Self::Absent => Ok(None),
            Self::Unsupported(dialect) => Err(Error::UnsupportedDialect { dialect, field }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RtPb {
    #[serde(rename = "REALTIME")]
    Realtime,
    #[serde(rename = "PLAYBACK")]
    Playback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Latest {
    MostRecent,
    Other,
}

/// Beacon standard reported by SARSAT SARP-3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BeaconStandard {
    #[serde(rename = "C/S T.001")]
    CsT001,
    NewType,
}

/// Word0 fields that only exist in one dialect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum HeaderExt {
    SarsatSarp2 {
        dru: u8,
        pseudo: bool,
    },
    SarsatSarp3 {
        beacon_standard: BeaconStandard,
        /// Signal to noise class
        snr: u8,
        snr_db: &'static str,
    },
}

/// Word0 of a SARSAT message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Header {
    pub level: u8,
    pub level_dbm: f64,
    pub rt_pb: RtPb,
    pub latest: Latest,
    pub ext: HeaderExt,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Timecode {
    pub value: u32,
    pub parity_valid: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Doppler {
    pub word: i32,
    /// Absolute burst frequency in Hz
    pub abs_freq: f64,
    pub parity_valid: bool,
}

/// A single decoded SARP message.
///
/// All fields are derived from the raw bytes and the dialect; changing the dialect with
/// [SarpMessage::set_dialect] re-derives them.
#[derive(Clone, Debug, Serialize)]
pub struct SarpMessage {
    created: DateTime<Utc>,
    dialect: Dialect,
    #[serde(skip)]
    raw: [u8; MESSAGE_LEN],
    words: [u32; NUM_WORDS],
    format: Format,
    format_valid: Option<bool>,
    header: Decoded<Header>,
    timecode: Decoded<Timecode>,
    doppler: Decoded<Doppler>,
    beacon_bits: Option<Bits>,
    beacon: Option<BeaconMessage>,
}

impl SarpMessage {
    /// Message length in bytes
    pub const LEN: usize = MESSAGE_LEN;
    pub const NUM_WORDS: usize = NUM_WORDS;
    pub const WORD_BITS: usize = 24;
    /// Value of word2 identifying a housekeeping message
    pub const HOUSEKEEPING_WORD2: u32 = 13_516_288;

    /// Decode a message from exactly [SarpMessage::LEN] bytes.
    ///
    /// # Errors
    /// [Error::InvalidLength] if `dat` is not [SarpMessage::LEN] bytes. Problems with the
    /// message content are reported through the decoded fields rather than as errors.
    pub fn decode(dat: &[u8], created: DateTime<Utc>, dialect: Dialect) -> Result<Self> {
        let raw: [u8; Self::LEN] = dat.try_into().map_err(|_| Error::InvalidLength {
            actual: dat.len(),
            expected: Self::LEN,
        })?;
        Ok(Self::derive(raw, created, dialect))
    }

    /// Change the dialect, re-deriving all fields from the raw bytes.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        if dialect != self.dialect {
            *self = Self::derive(self.raw, self.created, dialect);
        }
    }

    fn derive(raw: [u8; Self::LEN], created: DateTime<Utc>, dialect: Dialect) -> Self {
        let bits = Bits::from_bytes(&raw);
        let mut words = [0u32; Self::NUM_WORDS];
        for (idx, word) in words.iter_mut().enumerate() {
            *word = bits.uint(idx * Self::WORD_BITS..(idx + 1) * Self::WORD_BITS) as u32;
        }

        let format = if words[2] == Self::HOUSEKEEPING_WORD2 {
            Format::Housekeeping
        } else if words[7] == 1 {
            Format::Short
        } else {
            Format::Long
        };

        let mut msg = SarpMessage {
            created,
            dialect,
            raw,
            words,
            format,
            format_valid: None,
            header: Decoded::Absent,
            timecode: Decoded::Absent,
            doppler: Decoded::Absent,
            beacon_bits: None,
            beacon: None,
        };

        if format == Format::Housekeeping {
            debug!(%dialect, "housekeeping message, not decoded");
            return msg;
        }

        let format_valid = format_check(&bits, format, dialect);
        msg.format_valid = Some(format_valid);
        msg.header = decode_header(&bits, dialect);
        msg.timecode = decode_timecode(&bits, dialect);

        if format_valid {
            msg.doppler = decode_doppler(&bits, format, dialect);

            let beacon_bits = extract_beacon(&bits, format, dialect);
            msg.beacon = match BeaconMessage::decode(beacon_bits.clone(), created) {
                Ok(beacon) => Some(beacon),
                Err(err) => {
                    warn!(%dialect, "failed to decode beacon: {err}");
                    None
                }
            };
            msg.beacon_bits = Some(beacon_bits);
        } else {
            debug!(%dialect, ?format, "format check failed");
        }

        msg
    }

    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[must_use]
    pub fn words(&self) -> &[u32; Self::NUM_WORDS] {
        &self.words
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Whether the format bit agrees with the classified format, or `None` for housekeeping
    /// messages, which are not checked.
    #[must_use]
    pub fn format_valid(&self) -> Option<bool> {
        self.format_valid
    }

    #[must_use]
    pub fn is_format_valid(&self) -> bool {
        self.format_valid == Some(true)
    }

    #[must_use]
    pub fn header(&self) -> &Decoded<Header> {
        &self.header
    }

    #[must_use]
    pub fn timecode(&self) -> &Decoded<Timecode> {
        &self.timecode
    }

    #[must_use]
    pub fn doppler(&self) -> &Decoded<Doppler> {
        &self.doppler
    }

    /// Beacon payload as extracted from the message, including the format prefix bit.
    #[must_use]
    pub fn beacon_bits(&self) -> Option<&Bits> {
        self.beacon_bits.as_ref()
    }

    #[must_use]
    pub fn beacon_hex(&self) -> Option<String> {
        self.beacon_bits.as_ref().map(Bits::to_hex)
    }

    #[must_use]
    pub fn beacon(&self) -> Option<&BeaconMessage> {
        self.beacon.as_ref()
    }
}

/// Word and bit within the word of the format bit, which is set for long messages.
fn format_bit(dialect: Dialect) -> (usize, usize) {
    match dialect {
        Dialect::SarsatSarp2 => (0, 15),
        Dialect::SarsatSarp3 => (2, 0),
        Dialect::CospasSarp2 => (3, 0),
    }
}

fn format_check(bits: &Bits, format: Format, dialect: Dialect) -> bool {
    let (word, bit) = format_bit(dialect);
    bits.bit(word * SarpMessage::WORD_BITS + bit) == (format == Format::Long)
}

fn decode_header(bits: &Bits, dialect: Dialect) -> Decoded<Header> {
    let ext = match dialect {
        Dialect::SarsatSarp2 => HeaderExt::SarsatSarp2 {
            dru: bits.uint(15..17) as u8,
            pseudo: bits.bit(12),
        },
        Dialect::SarsatSarp3 => {
            let snr = bits.uint(12..15) as u8;
            HeaderExt::SarsatSarp3 {
                beacon_standard: if bits.bit(15) {
                    BeaconStandard::CsT001
                } else {
                    BeaconStandard::NewType
                },
                snr,
                snr_db: SNR_LEVELS_DB[usize::from(snr)],
            }
        }
        Dialect::CospasSarp2 => return Decoded::Unsupported(dialect),
    };

    let level = bits.uint(18..24) as u8;
    Decoded::Value(Header {
        level,
        level_dbm: (((0.55 * f64::from(level)) - 140.0) * 100.0).round() / 100.0,
        rt_pb: if bits.bit(17) {
            RtPb::Realtime
        } else {
            RtPb::Playback
        },
        latest: if bits.bit(16) {
            Latest::MostRecent
        } else {
            Latest::Other
        },
        ext,
    })
}

fn decode_timecode(bits: &Bits, dialect: Dialect) -> Decoded<Timecode> {
    if !dialect.is_sarsat() {
        return Decoded::Unsupported(dialect);
    }
    let word = bits.slice(SarpMessage::WORD_BITS..2 * SarpMessage::WORD_BITS);
    Decoded::Value(Timecode {
        value: word.uint(0..23) as u32,
        parity_valid: odd_parity_valid(&word, 0..23, 23),
    })
}

fn decode_doppler(bits: &Bits, format: Format, dialect: Dialect) -> Decoded<Doppler> {
    let idx = match (format, dialect) {
        (Format::Short, Dialect::CospasSarp2) => return Decoded::Unsupported(dialect),
        (Format::Short, _) => 6,
        (Format::Long, _) => 7,
        (Format::Housekeeping, _) => return Decoded::Absent,
    };
    let start = idx * SarpMessage::WORD_BITS;
    let word = bits.slice(start..start + SarpMessage::WORD_BITS);

    let magnitude = word.uint(1..23) as i32;
    let value = if word.bit(0) {
        -((!magnitude & 0x3f_ffff) + 1)
    } else {
        magnitude
    };

    Decoded::Value(Doppler {
        word: value,
        abs_freq: DOPPLER_BASE_FREQ + f64::from(value) * DOPPLER_RESOLUTION,
        parity_valid: odd_parity_valid(&word, 0..23, 23),
    })
}

/// Extract the beacon payload, prefixed by the format bit (0 for short, 1 for long).
fn extract_beacon(bits: &Bits, format: Format, dialect: Dialect) -> Bits {
    let range = match (format, dialect) {
        (Format::Short, Dialect::SarsatSarp2) => 48..135,
        (Format::Short, Dialect::SarsatSarp3) => 49..136,
        (Format::Short, Dialect::CospasSarp2) => 72..159,
        (Format::Long, Dialect::SarsatSarp2) => 48..167,
        (Format::Long, Dialect::SarsatSarp3) => 49..168,
        (Format::Long, Dialect::CospasSarp2) => 72..191,
        (Format::Housekeeping, _) => return Bits::new(),
    };
    let mut payload = Bits::new();
    payload.push(format == Format::Long);
    payload.extend(&bits.slice(range));
    payload
}

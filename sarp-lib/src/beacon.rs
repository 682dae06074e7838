//! Distress beacon message decoding.
//!
//! A beacon message is the 88 bit (short) or 120 bit (long) payload relayed inside a SARP
//! message. Bit 0 is the format flag and bit 1 the protocol flag, followed by the 10-bit
//! country code and the protocol dependent fields.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bits::Bits;
use crate::countries::{self, Country};
use crate::prelude::*;
use crate::tables::{baudot, UserProtocol};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BeaconType {
    Short,
    Long,
}

impl BeaconType {
    /// Number of bits in a message of this type.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        match self {
            Self::Short => BeaconMessage::SHORT_LEN,
            Self::Long => BeaconMessage::LONG_LEN,
        }
    }
}

/// Identification data carried by a user protocol beacon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Identification {
    Orbitography(u64),
    AircraftRegistration(u64),
    MmsiOrCallSign(u64),
    SerialNumber(u64),
    RadioCallSign(String),
}

impl Identification {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Orbitography(_) => "orbitography data",
            Self::AircraftRegistration(_) => "aircraft registration marking",
            Self::MmsiOrCallSign(_) => "MMSI or call sign",
            Self::SerialNumber(_) => "serial number",
            Self::RadioCallSign(_) => "radio call sign",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Protocol {
    User {
        protocol: UserProtocol,
        /// `None` for the protocols whose identification is not decoded (national,
        /// second generation and test).
        identification: Option<Identification>,
    },
    StandardNational,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PositionSource {
    External,
    Internal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LatitudeFlag {
    N,
    S,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LongitudeFlag {
    E,
    W,
}

/// Encoded beacon position from a long message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Position {
    pub source: PositionSource,
    pub lat_flag: LatitudeFlag,
    pub lat_deg: u8,
    /// Minutes, a 4-bit count of 4/60 minute steps
    pub lat_min: f64,
    pub lon_flag: LongitudeFlag,
    pub lon_deg: u16,
    /// Minutes, a 4-bit count of 4/60 minute steps
    pub lon_min: f64,
}

impl Position {
    /// Latitude in decimal degrees, south negative.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        let deg = f64::from(self.lat_deg) + self.lat_min / 60.0;
        match self.lat_flag {
            LatitudeFlag::N => deg,
            LatitudeFlag::S => -deg,
        }
    }

    /// Longitude in decimal degrees, west negative.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        let deg = f64::from(self.lon_deg) + self.lon_min / 60.0;
        match self.lon_flag {
            LongitudeFlag::E => deg,
            LongitudeFlag::W => -deg,
        }
    }

    fn decode(bits: &Bits) -> Self {
        Position {
            source: if bits.bit(82) {
                PositionSource::Internal
            } else {
                PositionSource::External
            },
            lat_flag: if bits.bit(83) {
                LatitudeFlag::S
            } else {
                LatitudeFlag::N
            },
            lat_deg: bits.uint(84..91) as u8,
            lat_min: bits.uint(91..95) as f64 * (4.0 / 60.0),
            // The flag is also the most significant bit of the degrees field.
            lon_flag: if bits.bit(95) {
                LongitudeFlag::W
            } else {
                LongitudeFlag::E
            },
            lon_deg: bits.uint(95..103) as u16,
            lon_min: bits.uint(103..107) as f64 * (4.0 / 60.0),
        }
    }
}

/// A decoded distress beacon message.
#[derive(Clone, Debug, Serialize)]
pub struct BeaconMessage {
    pub created: DateTime<Utc>,
    pub bits: Bits,
    pub hex: String,
    #[serde(rename = "type")]
    pub kind: BeaconType,
    pub format_flag: bool,
    pub protocol_flag: bool,
    pub country_code: u16,
    /// `None` if the code is not in the country table.
    pub country: Option<&'static Country>,
    #[serde(rename = "bch_1")]
    pub bch1: u32,
    #[serde(rename = "bch_2")]
    pub bch2: Option<u16>,
    pub protocol: Protocol,
    pub position: Option<Position>,
}

impl BeaconMessage {
    pub const SHORT_LEN: usize = 88;
    pub const LONG_LEN: usize = 120;

    /// Decode a beacon payload of exactly [Self::SHORT_LEN] or [Self::LONG_LEN] bits.
    ///
    /// A country code missing from the country table is not an error.
    ///
    /// # Errors
    /// [Error::InvalidLength] for any other payload length.
    pub fn decode(bits: Bits, created: DateTime<Utc>) -> Result<Self> {
        let kind = match bits.len() {
            Self::SHORT_LEN => BeaconType::Short,
            Self::LONG_LEN => BeaconType::Long,
            actual => {
                return Err(Error::InvalidLength {
                    actual,
                    expected: if actual < Self::LONG_LEN {
                        Self::SHORT_LEN
                    } else {
                        Self::LONG_LEN
                    },
                })
            }
        };

        let protocol_flag = bits.bit(1);
        let country_code = bits.uint(2..12) as u16;

        let protocol = if protocol_flag {
            let protocol = UserProtocol::from_bits(bits.uint(11..14) as u8);
            Protocol::User {
                protocol,
                identification: Self::decode_identification(&bits, protocol),
            }
        } else {
            Protocol::StandardNational
        };

        let position = if kind == BeaconType::Long && protocol_flag {
            Some(Position::decode(&bits))
        } else {
            None
        };

        Ok(BeaconMessage {
            created,
            hex: bits.to_hex(),
            kind,
            format_flag: bits.bit(0),
            protocol_flag,
            country_code,
            country: countries::lookup(country_code),
            bch1: bits.uint(61..82) as u32,
            bch2: match kind {
                BeaconType::Long => Some(bits.uint(107..119) as u16),
                BeaconType::Short => None,
            },
            protocol,
            position,
            bits,
        })
    }

    fn decode_identification(bits: &Bits, protocol: UserProtocol) -> Option<Identification> {
        match protocol {
            UserProtocol::Orbitography => Some(Identification::Orbitography(bits.uint(15..61))),
            UserProtocol::Aviation => {
                Some(Identification::AircraftRegistration(bits.uint(15..57)))
            }
            UserProtocol::Marine => Some(Identification::MmsiOrCallSign(bits.uint(15..57))),
            UserProtocol::Serial => Some(Identification::SerialNumber(bits.uint(19..49))),
            UserProtocol::RadioCallSign => {
                let callsign = [15..21, 21..27, 27..33, 33..39]
                    .into_iter()
                    .map(|r| baudot::decode_or_star(bits.uint(r) as u8))
                    .collect();
                Some(Identification::RadioCallSign(callsign))
            }
            UserProtocol::National | UserProtocol::SecondGeneration | UserProtocol::Test => None,
        }
    }

    /// Country name, or `"unknown"` if the country code is not in the table.
    #[must_use]
    pub fn country_name(&self) -> &str {
        self.country.map_or("unknown", |c| c.name.as_str())
    }

    /// ISO alpha-2 country code, or `"unknown"` if the country code is not in the table.
    #[must_use]
    pub fn country_alpha2(&self) -> &str {
        self.country.map_or("unknown", |c| c.alpha2.as_str())
    }

    #[must_use]
    pub fn user_protocol(&self) -> Option<UserProtocol> {
        match self.protocol {
            Protocol::User { protocol, .. } => Some(protocol),
            Protocol::StandardNational => None,
        }
    }

    #[must_use]
    pub fn identification(&self) -> Option<&Identification> {
        match &self.protocol {
            Protocol::User { identification, .. } => identification.as_ref(),
            Protocol::StandardNational => None,
        }
    }

    /// Radio call sign, only for the radio call sign user protocol.
    #[must_use]
    pub fn radio_callsign(&self) -> Option<&str> {
        match self.identification() {
            Some(Identification::RadioCallSign(callsign)) => Some(callsign),
            _ => None,
        }
    }
}

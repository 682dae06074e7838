//! Static lookup tables used by the SARP and beacon decoders.
use serde::Serialize;

/// Signal to noise class of a SARSAT SARP-3 message in dB, indexed by the 3-bit S/No
/// field of word0.
pub const SNR_LEVELS_DB: [&str; 8] = [
    "32.3", "34.8", "37.5", "41.1", "45.2", "50.1", "55.5", "62.1",
];

/// Beacon user protocol class, encoded in 3 bits of a user protocol beacon message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UserProtocol {
    Orbitography,
    Aviation,
    Marine,
    Serial,
    National,
    SecondGeneration,
    RadioCallSign,
    Test,
}

impl UserProtocol {
    pub const ALL: [UserProtocol; 8] = [
        Self::Orbitography,
        Self::Aviation,
        Self::Marine,
        Self::Serial,
        Self::National,
        Self::SecondGeneration,
        Self::RadioCallSign,
        Self::Test,
    ];

    /// Protocol for a 3-bit protocol number, `None` if `num > 7`.
    #[must_use]
    pub fn from_number(num: u8) -> Option<Self> {
        Self::ALL.get(usize::from(num)).copied()
    }

    /// Protocol for the low 3 bits of `bits`.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[usize::from(bits & 0x7)]
    }

    #[must_use]
    pub fn number(&self) -> u8 {
        *self as u8
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Orbitography => "Orbitography Protocol",
            Self::Aviation => "ELT - Aviation User Protocol",
            Self::Marine => "EPIRB - Marine User Protocol",
            Self::Serial => "Serial User Protocol",
            Self::National => "National User Protocol",
            Self::SecondGeneration => "2nd Gen Beacon",
            Self::RadioCallSign => "EPIRB - Radio Call Sign User Protocol",
            Self::Test => "Test User Protocol",
        }
    }

    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Orbitography => "Orbitography",
            Self::Aviation => "ELT",
            Self::Marine => "EPIRB User",
            Self::Serial => "Serial User",
            Self::National => "National User",
            Self::SecondGeneration => "2nd Gen",
            Self::RadioCallSign => "EPIRB - Radio Call",
            Self::Test => "Test User",
        }
    }
}

/// Modified-Baudot alphabet used for radio call signs.
pub mod baudot {
    const ALPHABET: [(u8, char); 39] = [
        (56, 'A'),
        (51, 'B'),
        (46, 'C'),
        (50, 'D'),
        (48, 'E'),
        (54, 'F'),
        (43, 'G'),
        (37, 'H'),
        (44, 'I'),
        (58, 'J'),
        (62, 'K'),
        (41, 'L'),
        (39, 'M'),
        (38, 'N'),
        (35, 'O'),
        (45, 'P'),
        (61, 'Q'),
        (42, 'R'),
        (52, 'S'),
        (33, 'T'),
        (60, 'U'),
        (47, 'V'),
        (57, 'W'),
        (55, 'X'),
        (53, 'Y'),
        (49, 'Z'),
        (36, ' '),
        (24, '-'),
        (23, '/'),
        (13, '0'),
        (29, '1'),
        (25, '2'),
        (16, '3'),
        (10, '4'),
        (1, '5'),
        (21, '6'),
        (28, '7'),
        (12, '8'),
        (3, '9'),
    ];

    /// Character for a 6-bit code.
    #[must_use]
    pub fn decode(code: u8) -> Option<char> {
        ALPHABET
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, ch)| *ch)
    }

    /// Character for a 6-bit code, `*` if the code is not in the alphabet.
    #[must_use]
    pub fn decode_or_star(code: u8) -> char {
        decode(code).unwrap_or('*')
    }

    /// 6-bit code for a character, if it can be represented.
    #[must_use]
    pub fn encode(ch: char) -> Option<u8> {
        ALPHABET
            .iter()
            .find(|(_, c)| *c == ch.to_ascii_uppercase())
            .map(|(code, _)| *code)
    }
}

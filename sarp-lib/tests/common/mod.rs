#![allow(dead_code)]
use sarp::manchester;
use sarp::tables::baudot;

pub const MARKER: u8 = 0xd6;
pub const SYNC_WORD: [u8; 3] = [0x42, 0xbb, 0x1f];

pub fn set_uint(bits: &mut [bool], start: usize, len: usize, value: u64) {
    for i in 0..len {
        bits[start + i] = (value >> (len - 1 - i)) & 0x1 == 1;
    }
}

fn pack(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, b)| acc | (u8::from(*b) << (7 - i)))
        })
        .collect()
}

/// Short (88 bit) radio call sign user protocol beacon payload.
///
/// The last bit of `country` must be 1 since it is shared with the protocol number.
pub fn radio_callsign_payload(country: u16, callsign: &str) -> Vec<bool> {
    let mut bits = vec![false; 88];
    bits[1] = true;
    set_uint(&mut bits, 2, 10, u64::from(country));
    set_uint(&mut bits, 11, 3, 6);
    for (i, ch) in callsign.chars().enumerate() {
        let code = baudot::encode(ch).expect("call sign character not in alphabet");
        set_uint(&mut bits, 15 + i * 6, 6, u64::from(code));
    }
    bits
}

/// Encode a Doppler value into a word with odd parity in the last bit.
pub fn doppler_word(value: i32) -> u64 {
    let data = (value as u32) & 0x7f_ffff;
    let parity = data.count_ones() % 2;
    u64::from((data << 1) | parity)
}

/// SARSAT SARP-3 short message carrying an 88 bit `payload`.
pub fn short_sarp3_message(payload: &[bool], level: u8, timecode: u32, doppler: i32) -> Vec<u8> {
    assert_eq!(payload.len(), 88);
    let mut bits = vec![false; 192];
    set_uint(&mut bits, 0, 8, u64::from(MARKER));
    set_uint(&mut bits, 18, 6, u64::from(level));
    bits[17] = true; // realtime
    set_uint(&mut bits, 24, 23, u64::from(timecode));
    bits[47] = timecode.count_ones() % 2 == 1;
    // format bit at 48 stays clear for short messages
    bits[49..136].copy_from_slice(&payload[1..]);
    set_uint(&mut bits, 144, 24, doppler_word(doppler));
    set_uint(&mut bits, 168, 24, 1);
    pack(&bits)
}

/// A 75 byte frame from three 24 byte messages.
pub fn frame_bytes(messages: &[Vec<u8>; 3]) -> Vec<u8> {
    let mut dat: Vec<u8> = messages.iter().flatten().copied().collect();
    dat.extend_from_slice(&SYNC_WORD);
    dat
}

/// A recorded symbol stream, one byte per symbol, for the given frames.
pub fn symbol_stream(frames: &[Vec<u8>], inverted: bool) -> Vec<u8> {
    frames
        .iter()
        .flat_map(|frame| manchester::encode(frame, inverted))
        .map(u8::from)
        .collect()
}

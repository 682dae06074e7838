use std::io::stdout;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use sarp::{bits::Bits, BeaconMessage};

/// Parse an 88 or 120 bit beacon payload from hex.
fn parse_hex(s: &str) -> Result<Bits> {
    let s = s.trim();
    let len = match s.len() {
        22 => BeaconMessage::SHORT_LEN,
        30 => BeaconMessage::LONG_LEN,
        n => bail!("expected 22 or 30 hex digits, got {n}"),
    };
    let bytes = hex::decode(s).context("invalid hex")?;
    Ok(Bits::from_bytes(&bytes).slice(0..len))
}

pub fn beacon(s: &str) -> Result<()> {
    let bits = parse_hex(s)?;
    let msg = BeaconMessage::decode(bits, Utc::now()).context("decoding beacon")?;
    serde_json::to_writer_pretty(stdout(), &msg).context("serializing to json")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let bits = parse_hex("8e3e0425a52b002e364ff5").unwrap();
        assert_eq!(bits.len(), 88);
        assert_eq!(bits.to_hex(), "8e3e0425a52b002e364ff5");

        let bits = parse_hex("D6E6202820000004000000000000FF").unwrap();
        assert_eq!(bits.len(), 120);
        assert_eq!(bits.to_hex(), "d6e6202820000004000000000000ff");
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(parse_hex("8e3e").is_err());
        assert!(parse_hex("zz3e0425a52b002e364ff5").is_err());
    }

    #[test]
    fn test_beacon_country() {
        // protocol flag set, country 227
        let mut bits = vec![false; 88];
        bits[1] = true;
        for i in 0..10 {
            bits[2 + i] = (227 >> (9 - i)) & 1 == 1;
        }
        let hex = Bits::from_bools(&bits).to_hex();

        let msg = BeaconMessage::decode(parse_hex(&hex).unwrap(), Utc::now()).unwrap();
        assert_eq!(msg.country_code, 227);
        assert_eq!(msg.country_alpha2(), "FR");
    }
}

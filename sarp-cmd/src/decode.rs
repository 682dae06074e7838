use std::{
    fs::File,
    io::{stdout, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use sarp::{
    message::{Decoded, SarpMessage},
    symbols::read_symbol_blocks,
    DecodeOpts, Pipeline, SarpFrame,
};
use tracing::{debug, info, warn};

use crate::info::Format;

pub fn decode(fpath: &Path, opts: DecodeOpts, format: &Format, all: bool) -> Result<()> {
    let reader = BufReader::new(File::open(fpath).context("opening input")?);
    let blocks = read_symbol_blocks(reader).map_while(|zult| match zult {
        Ok(block) => Some(block),
        Err(err) => {
            warn!("failed to read symbols: {err}");
            None
        }
    });

    info!(dialect = %opts.dialect, inverted = opts.inverted, "decoding {fpath:?}");
    let mut out = BufWriter::new(stdout().lock());
    for (idx, zult) in Pipeline::new(opts).decode(blocks).enumerate() {
        let frame = match zult {
            Ok(frame) => frame,
            Err(err) => {
                debug!(block_idx = idx, "skipping block: {err}");
                continue;
            }
        };
        if !all && frame.accepted_messages().is_empty() {
            continue;
        }
        match format {
            Format::Json => {
                serde_json::to_writer(&mut out, &frame).context("serializing to json")?;
                writeln!(out)?;
            }
            Format::Text => write_text(&mut out, &frame, all)?,
        }
    }
    out.flush().context("writing to stdout")
}

fn write_text<W: Write>(out: &mut W, frame: &SarpFrame, all: bool) -> Result<()> {
    let messages = if all {
        frame.messages()
    } else {
        frame.accepted_messages()
    };
    if messages.is_empty() {
        writeln!(
            out,
            "{} invalid frame mismatch={:?}",
            frame.created().to_rfc3339(),
            frame.mismatch()
        )?;
    }
    for msg in messages {
        writeln!(out, "{}", message_line(msg))?;
    }
    Ok(())
}

fn decoded_str<T>(val: &Decoded<T>, f: impl Fn(&T) -> String) -> String {
    match val {
        Decoded::Value(v) => f(v),
        Decoded::Unsupported(_) => "unsupported".to_string(),
        Decoded::Absent => "-".to_string(),
    }
}

fn message_line(msg: &SarpMessage) -> String {
    let level = decoded_str(msg.header(), |h| format!("{:.2}dBm", h.level_dbm));
    let timecode = decoded_str(msg.timecode(), |t| t.value.to_string());
    let doppler = decoded_str(msg.doppler(), |d| format!("{:.3}Hz", d.abs_freq));
    let beacon = match msg.beacon() {
        Some(beacon) => format!(
            "{} {} {}",
            beacon.hex,
            beacon.country_alpha2(),
            beacon
                .user_protocol()
                .map_or("Standard/National", |p| p.short_name()),
        ),
        None => "-".to_string(),
    };
    format!(
        "{} {:?} valid={} level={level} timecode={timecode} doppler={doppler} beacon={beacon}",
        msg.created().to_rfc3339(),
        msg.format(),
        msg.is_format_valid(),
    )
}

use anyhow::{Context, Result};
use handlebars::handlebars_helper;
use sarp::{symbols::read_symbol_blocks, DecodeOpts, Dialect, Pipeline, Stats};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{stdout, BufReader, Read, Write},
    path::Path,
};
use tracing::warn;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    dialect: Dialect,
    stats: Stats,
    countries: BTreeMap<String, usize>,
    protocols: BTreeMap<String, usize>,
}

fn summarize<R: Read>(filename: &str, reader: R, opts: DecodeOpts) -> Info {
    let blocks = read_symbol_blocks(reader).map_while(|zult| match zult {
        Ok(block) => Some(block),
        Err(err) => {
            warn!("failed to read symbols: {err}");
            None
        }
    });

    let mut stats = Stats::default();
    let mut countries: BTreeMap<String, usize> = BTreeMap::default();
    let mut protocols: BTreeMap<String, usize> = BTreeMap::default();

    for zult in Pipeline::new(opts).decode(blocks) {
        stats.record(&zult);
        let Ok(frame) = zult else {
            continue;
        };
        for beacon in frame
            .accepted_messages()
            .iter()
            .filter_map(|m| m.beacon())
        {
            *countries
                .entry(beacon.country_name().to_string())
                .or_default() += 1;
            let protocol = beacon
                .user_protocol()
                .map_or("Standard/National", |p| p.name());
            *protocols.entry(protocol.to_string()).or_default() += 1;
        }
    }

    Info {
        filename: filename.to_string(),
        dialect: opts.dialect,
        stats,
        countries,
        protocols,
    }
}

pub fn info(fpath: &Path, opts: DecodeOpts, format: &Format) -> Result<()> {
    let reader = BufReader::new(File::open(fpath).context("opening input")?);
    let info = summarize(&fpath.to_string_lossy(), reader, opts);

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let width = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:>width$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================================
Dialect:           {{ dialect }}
Blocks:            {{ stats.blocks }}
Manchester OK:     {{ stats.manchester_ok }}
Manchester Failed: {{ stats.manchester_failed }}
In Sync:           {{ stats.in_sync }}
Valid Frames:      {{ stats.valid_frames }}
Messages:          {{ stats.accepted_messages }}
Beacons:           {{ stats.beacons }}
-----------------------------------------------------------------------------------------------
Country                                                                                   Count
-----------------------------------------------------------------------------------------------
{{ #each countries }}{{ @key }}{{ lpad 40 this }}
{{/each }}-----------------------------------------------------------------------------------------------
Protocol                                                                                  Count
-----------------------------------------------------------------------------------------------
{{ #each protocols }}{{ @key }}{{ lpad 40 this }}
{{/each }}";

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use sarp::manchester;

    use super::*;

    fn symbols() -> Vec<u8> {
        let mut frame = vec![0u8; 75];
        for offset in [0, 24, 48] {
            frame[offset] = 0xd6;
            frame[offset + 23] = 1;
        }
        frame[72..].copy_from_slice(&[0x42, 0xbb, 0x1f]);

        let mut dat: Vec<u8> = manchester::encode(&frame, false)
            .into_iter()
            .map(u8::from)
            .collect();
        dat.extend(vec![1u8; 1200]);
        dat
    }

    #[test]
    fn test_summarize() {
        let info = summarize("test.dat", Cursor::new(symbols()), DecodeOpts::default());

        assert_eq!(info.stats.blocks, 2);
        assert_eq!(info.stats.manchester_failed, 1);
        assert_eq!(info.stats.beacons, 3);
        assert_eq!(info.countries.get("unknown"), Some(&3));
        assert_eq!(info.protocols.get("Standard/National"), Some(&3));
    }

    #[test]
    fn test_render_text() {
        let info = summarize("test.dat", Cursor::new(symbols()), DecodeOpts::default());
        let text = render_text(&info).unwrap();

        assert!(text.starts_with("test.dat\n"), "{text}");
        assert!(text.contains("Dialect:           SARSAT SARP-3"), "{text}");
        assert!(text.contains("Beacons:           3"), "{text}");
    }

    #[test]
    fn test_info_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&symbols()).unwrap();

        info(file.path(), DecodeOpts::default(), &Format::Json).unwrap();
    }
}

use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use crcframe_codec::Frame;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
    Hex,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    version: u8,
    kind: u8,
    payload_size: usize,
    payload: String,
    payload_hex: String,
}

/// Print a decoded frame.
pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                version: frame.version,
                kind: frame.kind,
                payload_size: frame.payload.len(),
                payload: payload_preview(frame.payload.as_ref()),
                payload_hex: hex::encode(&frame.payload),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["VERSION", "KIND", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    frame.version.to_string(),
                    frame.kind.to_string(),
                    frame.payload.len().to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "version={} kind={} size={} payload={}",
                frame.version,
                frame.kind,
                frame.payload.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => print_raw(frame.payload.as_ref()),
        OutputFormat::Hex => println!("{}", hex::encode(&frame.payload)),
    }
}

/// Write wire bytes to stdout: hex text for `--format hex`, raw bytes otherwise.
pub fn print_wire(wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Hex => println!("{}", hex::encode(wire)),
        _ => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

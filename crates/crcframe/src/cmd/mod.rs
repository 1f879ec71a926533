use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into a wire frame.
    Encode(EncodeArgs),
    /// Decode and verify wire frames.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Frame version byte.
    #[arg(long = "frame-version", short = 'v', default_value = "1")]
    pub frame_version: u8,
    /// Frame kind byte.
    #[arg(long, short = 'k', default_value = "1")]
    pub kind: u8,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
    /// Write the wire frame to this file instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub path: Option<PathBuf>,
    /// Input is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Reject input that continues past the frame.
    #[arg(long, conflicts_with = "all")]
    pub exact: bool,
    /// Decode every back-to-back frame in the input.
    #[arg(long)]
    pub all: bool,
    /// Largest payload accepted, in bytes.
    #[arg(long, default_value_t = crcframe_codec::MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

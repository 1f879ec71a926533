use std::fs;

use crcframe_codec::{encode, Frame};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let frame = Frame::new(args.frame_version, args.kind, payload);
    let wire = encode(&frame).map_err(|err| frame_error("encode failed", err))?;

    tracing::debug!(
        version = frame.version,
        kind = frame.kind,
        size = frame.payload.len(),
        wire_size = wire.len(),
        "encoded frame"
    );

    match &args.out {
        Some(path) => {
            fs::write(path, &wire)
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
            tracing::info!(path = %path.display(), bytes = wire.len(), "frame written");
        }
        None => print_wire(&wire, format),
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(text) = &args.hex {
        return parse_hex(text);
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

/// Decode hex text, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}

use std::fs;
use std::io::{Cursor, Read};

use crcframe_codec::{decode, decode_exact, Frame, FrameConfig, FrameError, FrameReader};

use crate::cmd::encode::parse_hex;
use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;
    let config = FrameConfig::with_max_payload(args.max_payload);

    if args.all {
        let frames = decode_all(input, config).map_err(|err| frame_error("decode failed", err))?;
        tracing::debug!(count = frames.len(), "decoded frames");
        for frame in &frames {
            print_frame(frame, format);
        }
        return Ok(SUCCESS);
    }

    let frame =
        decode_single(&input, args.exact, config).map_err(|err| frame_error("decode failed", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}

fn decode_single(input: &[u8], exact: bool, config: FrameConfig) -> crcframe_codec::Result<Frame> {
    let frame = if exact {
        decode_exact(input)?
    } else {
        decode(input)?
    };

    if frame.payload.len() > config.max_payload_size {
        return Err(FrameError::OversizedPayload {
            size: frame.payload.len(),
            max: config.max_payload_size,
        });
    }
    Ok(frame)
}

fn decode_all(input: Vec<u8>, config: FrameConfig) -> crcframe_codec::Result<Vec<Frame>> {
    FrameReader::with_config(Cursor::new(input), config).collect()
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    let raw = match &args.path {
        Some(path) if path.as_os_str() != "-" => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            buf
        }
    };

    if !args.hex {
        return Ok(raw);
    }

    let text = String::from_utf8(raw)
        .map_err(|_| CliError::new(USAGE, "hex input is not valid UTF-8"))?;
    parse_hex(&text)
}

#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use crcframe_codec::{encode, Frame};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "crcframe-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn crcframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("crcframe should run")
}

fn crcframe_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("crcframe should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should be writable");
    child.wait_with_output().expect("crcframe should exit")
}

fn json_line(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().expect("stdout should have a line");
    serde_json::from_str(line).expect("stdout should be JSON")
}

#[test]
fn encode_prints_hex_wire_frame() {
    let output = crcframe(&["--format", "hex", "encode", "--data", "Hello, World!"]);
    assert!(output.status.success(), "{output:?}");

    let expected = encode(&Frame::new(1, 1, &b"Hello, World!"[..])).expect("frame should encode");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), hex::encode(&expected));
    assert!(stdout.starts_with("0101000d48656c6c6f"));
}

#[test]
fn encode_output_pipes_into_decode() {
    let encoded = crcframe(&["encode", "-k", "5", "--data", "hi"]);
    assert!(encoded.status.success(), "{encoded:?}");

    let expected = encode(&Frame::new(1, 5, &b"hi"[..])).expect("frame should encode");
    assert_eq!(encoded.stdout.as_slice(), expected.as_ref());

    let decoded = crcframe_with_stdin(&["--format", "json", "decode", "--exact"], &encoded.stdout);
    assert!(decoded.status.success(), "{decoded:?}");
    let value = json_line(&decoded);
    assert_eq!(value["kind"], 5);
    assert_eq!(value["payload"], "hi");
}

#[test]
fn encode_ignores_metadata_formats_for_wire_output() {
    for format in ["json", "table", "pretty", "raw"] {
        let output = crcframe(&["--format", format, "encode", "--data", "hi"]);
        assert!(output.status.success(), "{format}: {output:?}");
        assert_eq!(output.stdout.len(), 2 + 8, "{format}");
    }
}

#[test]
fn unknown_flag_exits_with_usage_code() {
    let output = crcframe(&["encode", "--bogus"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn encode_to_file_then_decode() {
    let dir = unique_temp_dir("roundtrip");
    let path = dir.join("frame.bin");
    let path_str = path.to_str().expect("path should be UTF-8");

    let output = crcframe(&["encode", "-v", "3", "-k", "9", "--data", "Hello", "--out", path_str]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(std::fs::metadata(&path).expect("file should exist").len(), 13);

    let output = crcframe(&["--format", "json", "decode", path_str, "--exact"]);
    assert!(output.status.success(), "{output:?}");
    let value = json_line(&output);
    assert_eq!(value["version"], 3);
    assert_eq!(value["kind"], 9);
    assert_eq!(value["payload"], "Hello");
    assert_eq!(value["payload_size"], 5);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_zeroed_checksum_fails_with_data_invalid() {
    let mut wire = encode(&Frame::new(1, 1, &b"Hello"[..]))
        .expect("frame should encode")
        .to_vec();
    let n = wire.len();
    wire[n - 4..].copy_from_slice(&[0, 0, 0, 0]);

    let output = crcframe_with_stdin(&["decode"], &wire);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("checksum mismatch"));
}

#[test]
fn decode_short_input_fails_with_truncated_header() {
    let output = crcframe_with_stdin(&["decode"], &[0x01, 0x01, 0x00]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("truncated header"));
}

#[test]
fn decode_hex_input_from_stdin() {
    let wire = encode(&Frame::new(2, 4, &b"hex"[..])).expect("frame should encode");
    let text = format!("{}\n", hex::encode(&wire));

    let output = crcframe_with_stdin(&["--format", "json", "decode", "--hex"], text.as_bytes());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(json_line(&output)["payload"], "hex");
}

#[test]
fn decode_all_prints_each_frame() {
    let mut wire = encode(&Frame::new(1, 1, &b"first"[..]))
        .expect("frame should encode")
        .to_vec();
    wire.extend_from_slice(&encode(&Frame::new(1, 2, &b"second"[..])).expect("frame should encode"));

    let output = crcframe_with_stdin(&["--format", "pretty", "decode", "--all"], &wire);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "version=1 kind=1 size=5 payload=first",
            "version=1 kind=2 size=6 payload=second",
        ]
    );
}

#[test]
fn exact_decode_rejects_trailing_bytes() {
    let mut wire = encode(&Frame::new(1, 1, &b"x"[..]))
        .expect("frame should encode")
        .to_vec();
    wire.push(0xFF);

    let lenient = crcframe_with_stdin(&["--format", "json", "decode"], &wire);
    assert!(lenient.status.success(), "{lenient:?}");

    let strict = crcframe_with_stdin(&["decode", "--exact"], &wire);
    assert_eq!(strict.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&strict.stderr).contains("trailing"));
}

#[test]
fn version_prints_package_version() {
    let output = crcframe(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("crcframe {}", env!("CARGO_PKG_VERSION"))
    );
}

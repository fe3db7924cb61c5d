//! protosift - Inspect Protocol Buffer payloads without a schema
//!
//! This tool decodes captured wire-format payloads into a best-effort
//! structural view, guessing for every length-delimited field whether it
//! holds a nested message, text, or raw bytes.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use protosift_core::{
    decode_payload, read_payload_file, Decoder, DecoderConfig, Message, PayloadFormat, Stats,
    TextRenderer, DEFAULT_MAX_DEPTH,
};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Decode Protocol Buffer payloads without a schema
#[derive(Parser, Debug)]
#[command(name = "protosift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Encoding of the input files
    #[arg(long, value_enum, default_value = "raw")]
    input_format: InputFormat,

    /// Output format
    #[arg(long, value_enum, default_value = "json-pretty")]
    format: OutputFormat,

    /// Deepest nested message to attempt; deeper payloads are kept as bytes
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Accept nested messages that only partially parse
    #[arg(long)]
    lenient_nested: bool,

    /// Include payload length and blake3 digest in the output
    #[arg(long)]
    digest: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a single payload file (`-` reads stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of payload files to process
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Encoding of input payloads
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// Binary payload as-is
    Raw,
    /// Hexadecimal dump
    Hex,
    /// Base64 text
    Base64,
}

impl From<InputFormat> for PayloadFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Raw => PayloadFormat::Raw,
            InputFormat::Hex => PayloadFormat::Hex,
            InputFormat::Base64 => PayloadFormat::Base64,
        }
    }
}

/// Output format for decoded payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON (one document per payload)
    Json,
    /// Indented JSON
    JsonPretty,
    /// Indented text tree
    Text,
}

/// One decoded payload, as printed
#[derive(Serialize, Debug)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blake3: Option<String>,
    message: &'a Message,
}

impl<'a> Report<'a> {
    fn new(message: &'a Message) -> Self {
        Self {
            path: None,
            length: None,
            blake3: None,
            message,
        }
    }

    fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    fn with_digest(mut self, payload: &[u8]) -> Self {
        self.length = Some(payload.len());
        self.blake3 = Some(content_digest(payload));
        self
    }

    fn has_envelope(&self) -> bool {
        self.path.is_some() || self.blake3.is_some()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Dispatch based on input mode
    if let Some(ref file) = cli.input.file {
        process_single_file(&cli, file, &mut out)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, directory, &mut out)
    } else {
        bail!("Either --file or --directory must be specified")
    }
}

fn build_decoder(cli: &Cli) -> Decoder {
    Decoder::with_config(
        DecoderConfig::new()
            .max_depth(cli.max_depth)
            .strict_nested(!cli.lenient_nested),
    )
}

/// Process a single payload file, or stdin for `-`
fn process_single_file(cli: &Cli, file: &Path, out: &mut impl Write) -> Result<()> {
    let payload = if file == Path::new("-") {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read payload from stdin")?;
        decode_payload(data, cli.input_format.into()).context("Failed to decode stdin payload")?
    } else {
        if !file.exists() {
            bail!("Input file does not exist: {}", file.display());
        }
        if !file.is_file() {
            bail!("Input path is not a file: {}", file.display());
        }
        read_payload_file(file, cli.input_format.into())
            .with_context(|| format!("Failed to load payload: {}", file.display()))?
    };

    let decoder = build_decoder(cli);
    let message = decode_logged(&decoder, &payload);

    let mut report = Report::new(&message);
    if cli.digest {
        report = report.with_digest(&payload);
    }
    emit(cli.format, &report, out)
}

/// Process every payload file under a directory
fn process_directory(cli: &Cli, directory: &Path, out: &mut impl Write) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let decoder = build_decoder(cli);
    let mut payloads_processed = 0;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        // Skip hidden files
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
        {
            trace!("Skipping hidden file: {}", path.display());
            continue;
        }

        let payload = match read_payload_file(path, cli.input_format.into()) {
            Ok(payload) => payload,
            Err(e) => {
                // Log error but continue with other files
                warn!("Error loading {}: {}", path.display(), e);
                continue;
            }
        };

        debug!("Processing payload: {}", path.display());
        let message = decode_logged(&decoder, &payload);

        let mut report = Report::new(&message).with_path(path);
        if cli.digest {
            report = report.with_digest(&payload);
        }
        emit(cli.format, &report, out)?;
        payloads_processed += 1;
    }

    info!("Processed {} payloads", payloads_processed);
    Ok(())
}

fn decode_logged(decoder: &Decoder, payload: &[u8]) -> Message {
    let message = decoder.decode(payload.to_vec());
    let stats = Stats::collect(&message);
    info!(
        "Decoded {} bytes: {} fields, {} messages, {} ints, {} strings, {} blobs, depth {}",
        payload.len(),
        stats.field_count,
        stats.message_count,
        stats.uint_count,
        stats.string_count,
        stats.bytes_count,
        stats.max_depth
    );
    message
}

/// Write one report in the selected format
fn emit(format: OutputFormat, report: &Report<'_>, out: &mut impl Write) -> Result<()> {
    let rendered = render_report(format, report)?;
    out.write_all(rendered.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}

fn render_report(format: OutputFormat, report: &Report<'_>) -> Result<String> {
    let mut rendered = match format {
        OutputFormat::Json if report.has_envelope() => serde_json::to_string(report)?,
        OutputFormat::Json => serde_json::to_string(report.message)?,
        OutputFormat::JsonPretty if report.has_envelope() => serde_json::to_string_pretty(report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report.message)?,
        OutputFormat::Text => {
            let mut text = String::new();
            if let Some(path) = &report.path {
                text.push_str(&format!("# {}\n", path));
            }
            if let (Some(length), Some(digest)) = (report.length, &report.blake3) {
                text.push_str(&format!("# {} bytes, blake3 {}\n", length, digest));
            }
            text.push_str(&TextRenderer::new().render(report.message));
            text
        }
    };

    if format != OutputFormat::Text {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Hex blake3 digest of a payload
fn content_digest(payload: &[u8]) -> String {
    blake3::hash(payload).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Message {
        protosift_core::parse(&[0x08, 0x96, 0x01, 0x12, 0x03, b'a', b'b', b'c'])
    }

    #[test]
    fn test_render_json() {
        let message = sample();
        let rendered = render_report(OutputFormat::Json, &Report::new(&message)).unwrap();
        assert_eq!(rendered, "{\"1\":150,\"2\":\"abc\"}\n");
    }

    #[test]
    fn test_render_json_with_digest() {
        let message = sample();
        let report = Report::new(&message).with_digest(b"payload");
        let rendered = render_report(OutputFormat::Json, &report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["length"], 7);
        assert_eq!(value["blake3"], content_digest(b"payload"));
        assert_eq!(value["message"]["1"], 150);
    }

    #[test]
    fn test_render_text() {
        let message = sample();
        let report = Report::new(&message).with_path(Path::new("capture.bin"));
        let rendered = render_report(OutputFormat::Text, &report).unwrap();
        assert_eq!(rendered, "# capture.bin\n1: 150\n2: \"abc\"\n");
    }

    #[test]
    fn test_content_digest() {
        let hash1 = content_digest(b"hello");
        let hash2 = content_digest(b"hello");
        let hash3 = content_digest(b"world");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_process_hex_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("capture.hex");
        std::fs::write(&path, "08 96 01\n").unwrap();

        let cli = Cli::try_parse_from([
            "protosift",
            "--file",
            path.to_str().unwrap(),
            "--input-format",
            "hex",
            "--format",
            "json",
        ])
        .unwrap();

        let mut out = Vec::new();
        process_single_file(&cli, &path, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"1\":150}\n");
    }

    #[test]
    fn test_process_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.bin"), [0x08, 0x01]).unwrap();
        std::fs::write(temp_dir.path().join("b.bin"), [0x12, 0x03, b'a', b'b', b'c']).unwrap();
        std::fs::write(temp_dir.path().join(".hidden"), [0x08, 0x02]).unwrap();

        let dir = temp_dir.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["protosift", "--directory", dir.as_str(), "--format", "json"])
            .unwrap();

        let mut out = Vec::new();
        process_directory(&cli, temp_dir.path(), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["message"]["1"], 1);
        assert_eq!(lines[1]["message"]["2"], "abc");
        assert!(lines[1]["path"].as_str().unwrap().ends_with("b.bin"));
    }

    #[test]
    fn test_missing_file() {
        let cli = Cli::try_parse_from(["protosift", "--file", "/definitely/not/here"]).unwrap();
        let mut out = Vec::new();
        let path = cli.input.file.clone().unwrap();
        assert!(process_single_file(&cli, &path, &mut out).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

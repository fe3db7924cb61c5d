//! Payload input formats.
//!
//! Captured payloads rarely arrive as a clean binary file. Besides raw
//! bytes this accepts hex dumps (as copied from a packet capture, with or
//! without whitespace and a `0x` prefix) and standard base64.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use std::path::Path;

/// Encoding of an input payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// Bytes are the payload
    #[default]
    Raw,
    /// Hexadecimal text
    Hex,
    /// Standard-alphabet base64 text
    Base64,
}

impl PayloadFormat {
    /// Name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::Raw => "raw",
            PayloadFormat::Hex => "hex",
            PayloadFormat::Base64 => "base64",
        }
    }
}

/// Turns input in `format` into payload bytes
pub fn decode_payload(input: impl Into<Bytes>, format: PayloadFormat) -> Result<Bytes> {
    let input = input.into();
    match format {
        PayloadFormat::Raw => Ok(input),
        PayloadFormat::Hex => decode_hex(&input).map(Bytes::from),
        PayloadFormat::Base64 => {
            let compact: Vec<u8> = input
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            STANDARD
                .decode(compact)
                .map(Bytes::from)
                .map_err(|e| Error::invalid_payload(format.as_str(), e.to_string()))
        }
    }
}

/// Reads a file and decodes its contents as `format`
pub fn read_payload_file(path: impl AsRef<Path>, format: PayloadFormat) -> Result<Bytes> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    decode_payload(data, format)
}

fn decode_hex(input: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let digits = digits
        .strip_prefix(b"0x")
        .or_else(|| digits.strip_prefix(b"0X"))
        .unwrap_or(&digits);

    hex::decode(digits).map_err(|e| Error::invalid_payload("hex", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_raw_passthrough() {
        let out = decode_payload(&b"\x08\x96\x01"[..], PayloadFormat::Raw).unwrap();
        assert_eq!(&out[..], b"\x08\x96\x01");
    }

    #[test]
    fn test_hex() {
        let out = decode_payload(&b"0x08 96\n01"[..], PayloadFormat::Hex).unwrap();
        assert_eq!(&out[..], &[0x08, 0x96, 0x01]);

        let out = decode_payload(&b"12036162 63"[..], PayloadFormat::Hex).unwrap();
        assert_eq!(&out[..], b"\x12\x03abc");
    }

    #[test]
    fn test_hex_errors() {
        assert!(matches!(
            decode_payload(&b"abc"[..], PayloadFormat::Hex),
            Err(Error::InvalidPayload { format: "hex", .. })
        ));
        assert!(decode_payload(&b"zz"[..], PayloadFormat::Hex).is_err());
        assert!(matches!(
            decode_payload(&b"0x0g"[..], PayloadFormat::Hex),
            Err(Error::InvalidPayload { format: "hex", .. })
        ));
    }

    #[test]
    fn test_base64() {
        let out = decode_payload(&b"CJYB\n"[..], PayloadFormat::Base64).unwrap();
        assert_eq!(&out[..], &[0x08, 0x96, 0x01]);
        assert!(decode_payload(&b"!!!"[..], PayloadFormat::Base64).is_err());
    }

    #[test]
    fn test_read_payload_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"08 96 01").unwrap();

        let out = read_payload_file(file.path(), PayloadFormat::Hex).unwrap();
        assert_eq!(&out[..], &[0x08, 0x96, 0x01]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_payload_file("/definitely/not/here", PayloadFormat::Raw).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}

//! Error types for the protosift-core library.
//!
//! The public decode entry points never fail: every malformed condition
//! degrades to a partial result. These errors surface in two places only,
//! inside the strict nested-message attempt (where the classifier absorbs
//! them) and at the input edges (reading files, decoding hex/base64 text).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for protosift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all protosift operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid protobuf wire format
    #[error("invalid protobuf wire format at offset {offset}: {details}")]
    InvalidWireFormat {
        /// Byte offset where the error occurred
        offset: usize,
        /// Detailed description of the issue
        details: String,
    },

    /// Varint ran past the 10 byte limit of a 64-bit value
    #[error("failed to decode varint at offset {offset}: encoding exceeds 10 bytes")]
    VarintDecode {
        /// Byte offset where the varint started
        offset: usize,
    },

    /// A read needed more bytes than the buffer had left
    #[error("truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Byte offset where the read started
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes actually remaining
        available: usize,
    },

    /// Field number outside `1..=max`
    #[error("invalid field number {number}: must be between 1 and {max}")]
    InvalidFieldNumber {
        /// The invalid field number
        number: u64,
        /// Maximum valid field number
        max: u32,
    },

    /// Wire type that the decoder does not handle (groups, 6, 7)
    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType {
        /// Byte offset of the tag
        offset: usize,
        /// The raw 3-bit wire type
        wire_type: u8,
    },

    /// Nesting went past the configured limit
    #[error("nesting depth {depth} exceeds limit of {max}")]
    DepthExceeded {
        /// Depth that would have been entered
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// Input text could not be turned into a payload
    #[error("invalid {format} payload: {details}")]
    InvalidPayload {
        /// Name of the expected input format
        format: &'static str,
        /// Detailed description of the issue
        details: String,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new wire format error
    pub fn invalid_wire_format(offset: usize, details: impl Into<String>) -> Self {
        Self::InvalidWireFormat {
            offset,
            details: details.into(),
        }
    }

    /// Creates a new varint decode error
    pub fn varint_decode(offset: usize) -> Self {
        Self::VarintDecode { offset }
    }

    /// Creates a new truncation error
    pub fn truncated(offset: usize, needed: usize, available: usize) -> Self {
        Self::Truncated {
            offset,
            needed,
            available,
        }
    }

    /// Creates a new unsupported wire type error
    pub fn unsupported_wire_type(offset: usize, wire_type: u8) -> Self {
        Self::UnsupportedWireType { offset, wire_type }
    }

    /// Creates a new payload format error
    pub fn invalid_payload(format: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidPayload {
            format,
            details: details.into(),
        }
    }

    /// Returns true if this error describes the shape of the bytes being
    /// decoded, meaning the classifier should try the next interpretation
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidWireFormat { .. }
                | Self::VarintDecode { .. }
                | Self::Truncated { .. }
                | Self::InvalidFieldNumber { .. }
                | Self::UnsupportedWireType { .. }
                | Self::DepthExceeded { .. }
        )
    }
}

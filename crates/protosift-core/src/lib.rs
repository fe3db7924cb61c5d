//! # protosift-core
//!
//! A library for decoding Protocol Buffer wire format payloads without a schema.
//!
//! This crate provides the core functionality for:
//! - Reading tags, varints and fixed-width values from arbitrary, possibly truncated bytes
//! - Guessing whether each length-delimited field holds a nested message, text, or raw bytes
//! - Producing a generic tree that serializes directly to JSON or renders as text
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`decoder`]: Cursor reader, tag dispatch and the value classifier
//! - [`value`]: The decoded tree ([`Message`], [`Field`], [`Value`])
//! - [`render`]: Text rendering and tree visitors
//! - [`input`]: Hex/base64 payload input
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use protosift_core::parse;
//!
//! // Field 1 = 150, field 2 = "abc"
//! let message = parse(&[0x08, 0x96, 0x01, 0x12, 0x03, b'a', b'b', b'c']);
//!
//! let first = message.get(1).and_then(|f| f.as_single()).and_then(|v| v.as_u64());
//! assert_eq!(first, Some(150));
//! assert_eq!(message.to_string(), "1: 150\n2: \"abc\"\n");
//! ```
//!
//! Decoding never fails. Truncated or corrupt input produces the fields that
//! could be recovered before the damage, and an empty message at worst.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod decoder;
pub mod error;
pub mod input;
pub mod render;
pub mod value;

// Re-export primary types for convenience
pub use decoder::{parse, Decoder, DecoderConfig, DEFAULT_MAX_DEPTH, MAX_FIELD_NUMBER};
pub use error::{Error, Result};
pub use input::{decode_payload, read_payload_file, PayloadFormat};
pub use render::{RenderConfig, Stats, TextRenderer, Visitor};
pub use value::{Field, Message, Value};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

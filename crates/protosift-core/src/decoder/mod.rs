//! Schema-less message decoding.
//!
//! This module turns a wire-format payload into a [`Message`] tree without
//! knowing the schema that produced it.
//!
//! ## Algorithm Overview
//!
//! 1. Read a tag varint and split it into field number and wire type
//! 2. Read the value the wire type calls for (varint, fixed32, fixed64)
//! 3. For length-delimited values, classify the payload:
//!    - decode it as a nested message, recursively
//!    - otherwise take it as UTF-8 text if it is valid
//!    - otherwise keep it as opaque bytes
//! 4. Merge the value into the message, repeating until the buffer is spent
//!
//! The top level is lenient: truncated reads return partial values and an
//! unsupported wire type ends the message with what was already decoded.
//! Nested attempts run strict by default, so a payload only counts as a
//! message when every byte of it parses cleanly.

mod cursor;
mod wire;

use crate::error::{Error, Result};
use crate::value::{Message, Value};
use bytes::Bytes;
use tracing::{debug, trace};

pub use cursor::Cursor;
pub use wire::{Tag, WireType, MAX_FIELD_NUMBER};

/// Default limit on message nesting
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for the decoder
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Deepest nested message that will be attempted (top level is 0).
    /// Length-delimited fields below this are kept as bytes.
    pub max_depth: usize,
    /// Reject nested candidates that show any truncation, invalid field
    /// number or unsupported wire type
    pub strict_nested: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_nested: true,
        }
    }
}

impl DecoderConfig {
    /// Creates a new decoder config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets whether nested candidates must parse cleanly
    pub fn strict_nested(mut self, strict: bool) -> Self {
        self.strict_nested = strict;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Absorb every fault, stop quietly on unsupported wire types
    Lenient,
    /// Fail on the first fault
    Strict,
}

/// Heuristic decoder for payloads of unknown schema
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a new decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes a whole payload.
    ///
    /// Never fails: malformed input yields whatever fields could be
    /// recovered, and an empty or unreadable payload yields an empty message.
    pub fn decode(&self, data: impl Into<Bytes>) -> Message {
        let data = data.into();
        let len = data.len();

        // Lenient mode has no failing path
        let message = self
            .read_message(data, 0, Mode::Lenient)
            .unwrap_or_default();

        debug!("Decoded {} bytes into {} top-level fields", len, message.len());
        message
    }

    fn read_message(&self, data: Bytes, depth: usize, mode: Mode) -> Result<Message> {
        let mut cursor = Cursor::new(data);
        let mut message = Message::new();

        while !cursor.is_exhausted() {
            let offset = cursor.position();
            let tag = Tag::from_raw(cursor.read_varint());
            settle(&mut cursor, mode)?;

            if mode == Mode::Strict && !tag.has_valid_number() {
                return Err(Error::InvalidFieldNumber {
                    number: tag.field_number,
                    max: MAX_FIELD_NUMBER,
                });
            }

            let value = match tag.wire() {
                Some(WireType::Varint) => Value::Uint(cursor.read_varint()),
                Some(WireType::I64) => Value::Uint(cursor.read_fixed64()),
                Some(WireType::I32) => Value::Uint(u64::from(cursor.read_fixed32())),
                Some(WireType::Len) => {
                    let length = cursor.read_varint();
                    let raw = cursor.read_slice(length);
                    settle(&mut cursor, mode)?;
                    self.classify(raw, depth)
                }
                Some(WireType::StartGroup | WireType::EndGroup) | None => {
                    if mode == Mode::Strict {
                        return Err(Error::unsupported_wire_type(offset, tag.wire_type));
                    }
                    trace!(
                        "Stopping at wire type {} (field {}, offset {})",
                        tag.wire_type,
                        tag.field_number,
                        offset
                    );
                    break;
                }
            };
            settle(&mut cursor, mode)?;

            message.add_field(tag.field_number, value);
        }

        Ok(message)
    }

    /// Picks an interpretation for a length-delimited payload
    fn classify(&self, raw: Bytes, depth: usize) -> Value {
        match self.read_nested(raw.clone(), depth + 1) {
            Ok(message) => return Value::Message(message),
            Err(e @ Error::DepthExceeded { .. }) => {
                trace!("Keeping {} bytes opaque: {}", raw.len(), e);
                return Value::Bytes(raw);
            }
            Err(e) if e.is_recoverable() => {
                trace!("{} bytes are not a message: {}", raw.len(), e)
            }
            Err(e) => debug!("Nested decode of {} bytes failed: {}", raw.len(), e),
        }

        match std::str::from_utf8(&raw) {
            Ok(text) => Value::String(text.to_owned()),
            Err(e) => {
                trace!("{} bytes are not text: {}", raw.len(), e);
                Value::Bytes(raw)
            }
        }
    }

    fn read_nested(&self, raw: Bytes, depth: usize) -> Result<Message> {
        if depth > self.config.max_depth {
            return Err(Error::DepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }

        let mode = if self.config.strict_nested {
            Mode::Strict
        } else {
            Mode::Lenient
        };

        let is_empty = raw.is_empty();
        let message = self.read_message(raw, depth, mode)?;
        if message.is_empty() && !is_empty {
            return Err(Error::invalid_wire_format(0, "no fields decoded"));
        }
        Ok(message)
    }
}

/// Surfaces a fault the cursor absorbed, or logs it when lenient
fn settle(cursor: &mut Cursor, mode: Mode) -> Result<()> {
    match (cursor.take_fault(), mode) {
        (Some(fault), Mode::Strict) => Err(fault),
        (Some(fault), Mode::Lenient) => {
            trace!("Recovered from {}", fault);
            Ok(())
        }
        (None, _) => Ok(()),
    }
}

/// Decodes a payload with the default configuration
pub fn parse(data: &[u8]) -> Message {
    Decoder::new().decode(Bytes::copy_from_slice(data))
}

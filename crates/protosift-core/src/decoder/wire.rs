//! Protobuf tag layout and wire types.
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT
//! - 1: I64
//! - 2: LEN (strings, bytes, embedded messages, packed repeated fields)
//! - 5: I32
//!
//! Group markers (3, 4) and the unassigned values (6, 7) are recognised so
//! the decoder can stop on them, but carry no payload the decoder reads.

use crate::error::{Error, Result};

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    I64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Len = 2,
    /// Start group (deprecated)
    StartGroup = 3,
    /// End group (deprecated)
    EndGroup = 4,
    /// 32-bit fixed-width
    I32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::I32),
            _ => Err(Error::invalid_wire_format(
                0,
                format!("unknown wire type: {}", value),
            )),
        }
    }
}

/// A decoded field key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// Field number, the tag shifted right by 3
    pub field_number: u64,
    /// Low 3 bits of the tag
    pub wire_type: u8,
}

impl Tag {
    /// Splits a raw tag varint into field number and wire type
    pub fn from_raw(raw: u64) -> Self {
        Self {
            field_number: raw >> 3,
            wire_type: (raw & 0x07) as u8,
        }
    }

    /// The wire type, if it is one of the six defined values
    pub fn wire(&self) -> Option<WireType> {
        WireType::try_from(self.wire_type).ok()
    }

    /// Returns true if the field number is in `1..=MAX_FIELD_NUMBER`
    pub fn has_valid_number(&self) -> bool {
        (1..=u64::from(MAX_FIELD_NUMBER)).contains(&self.field_number)
    }
}

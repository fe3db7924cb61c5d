//! Decoded output tree.
//!
//! A [`Message`] maps field numbers to a [`Field`], which is a single
//! [`Value`] for fields seen once and a sequence once the number recurs.
//! Keys keep the order in which they were first seen.
//!
//! Serializing a message produces a map keyed by the decimal field number,
//! with integers and text as native scalars and opaque bytes as standard
//! base64, so the tree goes straight to JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// One interpreted field occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Varint, fixed32 or fixed64 payload, read as unsigned
    Uint(u64),
    /// Length-delimited payload that is valid UTF-8
    String(String),
    /// Length-delimited payload that decoded as a message
    Message(Message),
    /// Length-delimited payload with no better interpretation
    Bytes(Bytes),
}

impl Value {
    /// Returns the integer, if this is one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested message, if this is one
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is an opaque blob
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Standard base64 text of an opaque blob
    pub fn to_base64(&self) -> Option<String> {
        self.as_bytes().map(|b| STANDARD.encode(b))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Value::Message(m)
    }
}

/// All occurrences of one field number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Seen exactly once
    Single(Value),
    /// Seen two or more times, in decode order
    Repeated(Vec<Value>),
}

impl Field {
    /// Every occurrence in decode order
    pub fn values(&self) -> &[Value] {
        match self {
            Field::Single(v) => std::slice::from_ref(v),
            Field::Repeated(vs) => vs,
        }
    }

    /// The only occurrence, or `None` if the field repeated
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Field::Single(v) => Some(v),
            Field::Repeated(_) => None,
        }
    }

    fn push(&mut self, value: Value) {
        match self {
            Field::Repeated(vs) => vs.push(value),
            Field::Single(first) => {
                let first = std::mem::replace(first, Value::Uint(0));
                *self = Field::Repeated(vec![first, value]);
            }
        }
    }
}

/// Field number to field mapping for one decoded message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fields: IndexMap<u64, Field>,
}

impl Message {
    /// Creates an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `field_number`.
    ///
    /// The first occurrence is stored bare, the second turns the entry into
    /// a two element sequence, later ones append.
    pub fn add_field(&mut self, field_number: u64, value: Value) {
        match self.fields.get_mut(&field_number) {
            Some(field) => field.push(value),
            None => {
                self.fields.insert(field_number, Field::Single(value));
            }
        }
    }

    /// Builder form of [`Message::add_field`]
    pub fn with_field(mut self, field_number: u64, value: impl Into<Value>) -> Self {
        self.add_field(field_number, value.into());
        self
    }

    /// Looks up a field by number
    pub fn get(&self, field_number: u64) -> Option<&Field> {
        self.fields.get(&field_number)
    }

    /// Number of distinct field numbers
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field was decoded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Field)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Uint(v) => serializer.serialize_u64(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::Message(m) => m.serialize(serializer),
            Value::Bytes(b) => serializer.serialize_str(&STANDARD.encode(b)),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Single(v) => v.serialize(serializer),
            Field::Repeated(vs) => {
                let mut seq = serializer.serialize_seq(Some(vs.len()))?;
                for v in vs {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (number, field) in &self.fields {
            map.serialize_entry(&number.to_string(), field)?;
        }
        map.end()
    }
}

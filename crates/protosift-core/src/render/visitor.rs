//! Tree walking over decoded messages.
//!
//! Implement [`Visitor`] to collect information from a decoded tree without
//! matching on every variant by hand. All methods default to no-ops.

use crate::value::{Message, Value};
use bytes::Bytes;

/// Callbacks invoked by [`walk`]
pub trait Visitor {
    /// Called when entering a message, `depth` 0 being the root
    fn enter_message(&mut self, message: &Message, depth: usize) {
        let _ = (message, depth);
    }

    /// Called when leaving a message
    fn leave_message(&mut self, message: &Message, depth: usize) {
        let _ = (message, depth);
    }

    /// Called once per field occurrence, before its value
    fn visit_field(&mut self, number: u64, value: &Value) {
        let _ = (number, value);
    }

    /// Called for integer values
    fn visit_uint(&mut self, value: u64) {
        let _ = value;
    }

    /// Called for text values
    fn visit_string(&mut self, value: &str) {
        let _ = value;
    }

    /// Called for opaque byte values
    fn visit_bytes(&mut self, value: &Bytes) {
        let _ = value;
    }
}

/// Walks `message` depth-first in field order
pub fn walk(message: &Message, visitor: &mut impl Visitor) {
    walk_message(message, 0, visitor);
}

fn walk_message(message: &Message, depth: usize, visitor: &mut impl Visitor) {
    visitor.enter_message(message, depth);
    for (number, field) in message.iter() {
        for value in field.values() {
            visitor.visit_field(number, value);
            match value {
                Value::Uint(v) => visitor.visit_uint(*v),
                Value::String(s) => visitor.visit_string(s),
                Value::Bytes(b) => visitor.visit_bytes(b),
                Value::Message(m) => walk_message(m, depth + 1, visitor),
            }
        }
    }
    visitor.leave_message(message, depth);
}

/// A visitor that collects statistics about a decoded tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Number of messages, the root included
    pub message_count: usize,
    /// Number of field occurrences
    pub field_count: usize,
    /// Number of integer values
    pub uint_count: usize,
    /// Number of text values
    pub string_count: usize,
    /// Number of opaque byte values
    pub bytes_count: usize,
    /// Deepest message level reached
    pub max_depth: usize,
}

impl Stats {
    /// Collects statistics for `message`
    pub fn collect(message: &Message) -> Self {
        let mut stats = Self::default();
        walk(message, &mut stats);
        stats
    }
}

impl Visitor for Stats {
    fn enter_message(&mut self, _message: &Message, depth: usize) {
        self.message_count += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    fn visit_field(&mut self, _number: u64, _value: &Value) {
        self.field_count += 1;
    }

    fn visit_uint(&mut self, _value: u64) {
        self.uint_count += 1;
    }

    fn visit_string(&mut self, _value: &str) {
        self.string_count += 1;
    }

    fn visit_bytes(&mut self, _value: &Bytes) {
        self.bytes_count += 1;
    }
}

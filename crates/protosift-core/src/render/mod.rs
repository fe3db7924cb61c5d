//! Human-readable rendering of decoded messages.
//!
//! [`TextRenderer`] prints a decoded tree as indented text:
//!
//! ```text
//! 1: 150
//! 2: "abc"
//! 3 {
//!   1: 42
//! }
//! 4: b64"/wA="
//! ```
//!
//! Repeated fields print one line per occurrence. The [`Visitor`] trait
//! walks the same tree for other consumers, see [`Stats`].

mod visitor;

use crate::value::{Message, Value};
use std::fmt::{self, Write as FmtWrite};

pub use visitor::{walk, Stats, Visitor};

/// Configuration for text rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Indentation string (default: 2 spaces)
    pub indent_str: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_str: "  ".to_string(),
        }
    }
}

impl RenderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }
}

/// Renders a [`Message`] tree as indented text
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    config: RenderConfig,
}

impl TextRenderer {
    /// Creates a renderer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with custom configuration
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Renders the message into a string
    pub fn render(&self, message: &Message) -> String {
        let mut output = String::new();
        self.write_to(message, &mut output)
            .expect("String write cannot fail");
        output
    }

    /// Renders the message into any formatter sink
    pub fn write_to(&self, message: &Message, w: &mut impl FmtWrite) -> fmt::Result {
        let mut writer = TextWriter {
            writer: w,
            config: &self.config,
            indent_level: 0,
        };
        writer.write_message(message)
    }
}

struct TextWriter<'a, W: FmtWrite> {
    writer: &'a mut W,
    config: &'a RenderConfig,
    indent_level: usize,
}

impl<W: FmtWrite> TextWriter<'_, W> {
    fn write_indent(&mut self) -> fmt::Result {
        for _ in 0..self.indent_level {
            write!(self.writer, "{}", self.config.indent_str)?;
        }
        Ok(())
    }

    fn write_message(&mut self, message: &Message) -> fmt::Result {
        for (number, field) in message.iter() {
            for value in field.values() {
                self.write_value(number, value)?;
            }
        }
        Ok(())
    }

    fn write_value(&mut self, number: u64, value: &Value) -> fmt::Result {
        self.write_indent()?;
        match value {
            Value::Uint(v) => writeln!(self.writer, "{}: {}", number, v),
            Value::String(s) => writeln!(self.writer, "{}: \"{}\"", number, escape_string(s)),
            Value::Bytes(_) => writeln!(
                self.writer,
                "{}: b64\"{}\"",
                number,
                value.to_base64().unwrap_or_default()
            ),
            Value::Message(m) if m.is_empty() => writeln!(self.writer, "{} {{}}", number),
            Value::Message(m) => {
                writeln!(self.writer, "{} {{", number)?;
                self.indent_level += 1;
                self.write_message(m)?;
                self.indent_level -= 1;
                self.write_indent()?;
                writeln!(self.writer, "}}")
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        TextRenderer::new().write_to(self, f)
    }
}

/// Escape a string for quoted output
fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ if c.is_ascii_control() => {
                result.push_str(&format!("\\x{:02x}", c as u8));
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn sample() -> Message {
        let inner = Message::new().with_field(1, 42u64);
        let mut msg = Message::new()
            .with_field(1, 150u64)
            .with_field(2, "abc")
            .with_field(3, inner)
            .with_field(2, "d\"e");
        msg.add_field(4, Value::Bytes(Bytes::from_static(&[0xFF, 0x00])));
        msg.add_field(5, Value::Message(Message::new()));
        msg
    }

    #[test]
    fn test_render_text() {
        let expected = "\
1: 150
2: \"abc\"
2: \"d\\\"e\"
3 {
  1: 42
}
4: b64\"/wA=\"
5 {}
";
        assert_eq!(TextRenderer::new().render(&sample()), expected);
        assert_eq!(sample().to_string(), expected);
    }

    #[test]
    fn test_render_custom_indent() {
        let msg = Message::new().with_field(7, Message::new().with_field(1, 1u64));
        let renderer = TextRenderer::with_config(RenderConfig::new().indent_str("\t"));
        assert_eq!(renderer.render(&msg), "7 {\n\t1: 1\n}\n");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("hello\\world"), "hello\\\\world");
        assert_eq!(escape_string("hello\"world"), "hello\\\"world");
        assert_eq!(escape_string("hello\nworld"), "hello\\nworld");
        assert_eq!(escape_string("\u{1}"), "\\x01");
    }
}

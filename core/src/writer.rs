use alloc::string::String;
use core::fmt::{Display, Write};

use crate::{
  number::{format_f32, format_f64},
  string::{Escape, escape},
};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// A writer of JSON primitives.
///
/// The writer is intended to be created with the exact capacity the written text will require,
/// as calculated with the [`size`](crate::size) functions, so it never reallocates.
#[derive(Clone, Default, Debug)]
pub struct Writer {
  buf: String,
}

impl Writer {
  /// Create a writer with the specified capacity.
  #[inline(always)]
  pub fn with_capacity(capacity: usize) -> Self {
    Self { buf: String::with_capacity(capacity) }
  }

  /// The amount of bytes written so far.
  #[inline(always)]
  pub fn len(&self) -> usize {
    self.buf.len()
  }

  /// If nothing has been written.
  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.buf.is_empty()
  }

  /// The capacity of the underlying buffer.
  #[inline(always)]
  pub fn capacity(&self) -> usize {
    self.buf.capacity()
  }

  /// Push text which is already valid JSON, such as a precomputed key.
  #[inline(always)]
  pub fn push_raw(&mut self, text: &str) {
    self.buf.push_str(text);
  }

  /// Push a single structural byte, such as `{` or `,`.
  #[inline(always)]
  pub fn push_byte(&mut self, b: u8) {
    self.buf.push(char::from(b));
  }

  /// Write the contents of a string, escaped, without the surrounding quotes.
  ///
  /// `"`, `\`, and the control characters are escaped, with the short forms used where JSON
  /// defines one and `\u00XX` otherwise. Everything else, `/` included, is written verbatim.
  pub fn write_escaped(&mut self, str: &str) {
    let bytes = str.as_bytes();
    let mut verbatim_since = 0;
    for (i, b) in bytes.iter().copied().enumerate() {
      let kind = escape(b);
      if kind == Escape::Verbatim {
        continue;
      }
      // Escaped bytes are ASCII, so these are always character boundaries
      self.buf.push_str(&str[verbatim_since .. i]);
      verbatim_since = i + 1;
      self.buf.push('\\');
      match kind {
        Escape::Short(b) => self.push_byte(b),
        Escape::Unicode => {
          self.buf.push_str("u00");
          self.push_byte(HEX[usize::from(b >> 4)]);
          self.push_byte(HEX[usize::from(b & 0xf)]);
        }
        Escape::Verbatim => {}
      }
    }
    self.buf.push_str(&str[verbatim_since ..]);
  }

  /// Write a string, quoted and escaped.
  #[inline(always)]
  pub fn write_str(&mut self, str: &str) {
    self.buf.push('"');
    self.write_escaped(str);
    self.buf.push('"');
  }

  /// Write a signed integer.
  #[inline(always)]
  pub fn write_i64(&mut self, value: i64) {
    self.buf.push_str(itoa::Buffer::new().format(value));
  }

  /// Write an unsigned integer.
  #[inline(always)]
  pub fn write_u64(&mut self, value: u64) {
    self.buf.push_str(itoa::Buffer::new().format(value));
  }

  /// Write a length or count.
  #[inline(always)]
  pub fn write_usize(&mut self, value: usize) {
    self.buf.push_str(itoa::Buffer::new().format(value));
  }

  /// Write a signed integer as a quoted string, as used for keys.
  #[inline(always)]
  pub fn write_quoted_i64(&mut self, value: i64) {
    self.buf.push('"');
    self.write_i64(value);
    self.buf.push('"');
  }

  /// Write an unsigned integer as a quoted string, as used for keys.
  #[inline(always)]
  pub fn write_quoted_u64(&mut self, value: u64) {
    self.buf.push('"');
    self.write_u64(value);
    self.buf.push('"');
  }

  /// Write an `f64`.
  ///
  /// NaN and the infinities are written as the strings `"NaN"`, `"Infinity"`, and
  /// `"-Infinity"`.
  #[inline(always)]
  pub fn write_f64(&mut self, value: f64) {
    self.buf.push_str(format_f64(&mut zmij::Buffer::new(), value));
  }

  /// Write an `f32`, as [`Writer::write_f64`].
  #[inline(always)]
  pub fn write_f32(&mut self, value: f32) {
    self.buf.push_str(format_f32(&mut zmij::Buffer::new(), value));
  }

  /// Write a boolean.
  #[inline(always)]
  pub fn write_bool(&mut self, value: bool) {
    self.buf.push_str(if value { "true" } else { "false" });
  }

  /// Write `null`.
  #[inline(always)]
  pub fn write_null(&mut self) {
    self.buf.push_str("null");
  }

  /// Write the `Display` text of a value, verbatim.
  ///
  /// The text must already be valid JSON at this position, such as a number, or the contents of a
  /// string which needs no escaping.
  #[inline(always)]
  pub fn write_display(&mut self, value: &impl Display) {
    // Formatting into a `String` only fails if the value's own `Display` does
    if write!(self.buf, "{value}").is_err() {
      tracing::trace!("formatting failed");
    }
  }

  /// Write the `Display` text of a value within quotes, under the rules of
  /// [`Writer::write_display`].
  #[inline(always)]
  pub fn write_quoted_display(&mut self, value: &impl Display) {
    self.buf.push('"');
    self.write_display(value);
    self.buf.push('"');
  }

  /// The text written.
  #[inline(always)]
  pub fn as_str(&self) -> &str {
    &self.buf
  }

  /// Consume the writer, yielding the text written.
  #[inline(always)]
  pub fn into_string(self) -> String {
    self.buf
  }
}

#[test]
fn writer() {
  let mut writer = Writer::with_capacity(0);
  writer.write_str("a\"b\\c/d\x08\x0c\n\r\t\x00\x1f\u{7f}é\u{1f600}");
  let expected = String::from(r#""a\"b\\c/d\b\f\n\r\t\u0000\u001F"#) + "\u{7f}é\u{1f600}\"";
  assert_eq!(writer.as_str(), expected);

  let mut writer = Writer::default();
  writer.push_byte(b'[');
  writer.write_i64(i64::MIN);
  writer.push_byte(b',');
  writer.write_u64(u64::MAX);
  writer.push_byte(b',');
  writer.write_quoted_i64(-5);
  writer.push_byte(b',');
  writer.write_f64(f64::NEG_INFINITY);
  writer.push_byte(b',');
  writer.write_f32(0.1);
  writer.push_byte(b',');
  writer.write_bool(false);
  writer.push_byte(b',');
  writer.write_null();
  writer.push_byte(b']');
  assert_eq!(
    writer.into_string(),
    r#"[-9223372036854775808,18446744073709551615,"-5","-Infinity",0.1,false,null]"#
  );

  let mut writer = Writer::default();
  writer.write_display(&format_args!("{}.{}", 1, 50));
  writer.push_byte(b',');
  writer.write_quoted_display(&"2024-01-02");
  assert_eq!(writer.as_str(), r#"1.50,"2024-01-02""#);
}

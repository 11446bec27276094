use crate::{JsonError, Type};

/// Options bounding the work a [`Cursor`] will do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DecodeOptions {
  /// The maximum nesting of objects and arrays.
  ///
  /// Decoding is recursive, so this bounds the stack usage for adversarial input.
  pub max_depth: usize,
}

impl Default for DecodeOptions {
  #[inline(always)]
  fn default() -> Self {
    Self { max_depth: 128 }
  }
}

/// A read cursor over JSON text.
///
/// The cursor is an offset into borrowed text. Strings without escapes are yielded as views into
/// the text, without copying.
#[derive(Clone, Debug)]
pub struct Cursor<'text> {
  text: &'text str,
  pos: usize,
  depth: usize,
  options: DecodeOptions,
}

/// https://datatracker.ietf.org/doc/html/rfc8259#section-2 defines whitespace as these four.
#[inline(always)]
pub(crate) fn is_whitespace(b: u8) -> bool {
  matches!(b, b'\x20' | b'\x09' | b'\x0A' | b'\x0D')
}

/// If this byte may follow a scalar value.
#[inline(always)]
pub(crate) fn is_delimiter(b: Option<u8>) -> bool {
  match b {
    None => true,
    Some(b) => is_whitespace(b) || matches!(b, b',' | b'}' | b']'),
  }
}

impl<'text> Cursor<'text> {
  /// Create a cursor at the start of `text`, with the default options.
  #[inline(always)]
  pub fn new(text: &'text str) -> Self {
    Self::with_options(text, DecodeOptions::default())
  }

  /// Create a cursor at the start of `text`.
  #[inline(always)]
  pub fn with_options(text: &'text str, options: DecodeOptions) -> Self {
    Self { text, pos: 0, depth: 0, options }
  }

  /// The entire text this cursor reads.
  #[inline(always)]
  pub fn text(&self) -> &'text str {
    self.text
  }

  /// The current offset into the text, in bytes.
  #[inline(always)]
  pub fn position(&self) -> usize {
    self.pos
  }

  /// The amount of bytes not yet read.
  #[inline(always)]
  pub fn remaining(&self) -> usize {
    self.text.len() - self.pos
  }

  /// The text not yet read.
  #[inline(always)]
  pub(crate) fn rest(&self) -> &'text [u8] {
    &self.text.as_bytes()[self.pos ..]
  }

  /// Advance the cursor by `bytes`.
  ///
  /// The caller is responsible for only advancing past ASCII or whole UTF-8 sequences.
  #[inline(always)]
  pub(crate) fn advance(&mut self, bytes: usize) {
    self.pos += bytes;
  }

  /// Peek at the next byte.
  #[inline(always)]
  pub fn peek(&self) -> Option<u8> {
    self.text.as_bytes().get(self.pos).copied()
  }

  /// Peek at the byte `i` bytes ahead.
  #[inline(always)]
  pub(crate) fn peek_at(&self, i: usize) -> Option<u8> {
    self.text.as_bytes().get(self.pos + i).copied()
  }

  /// Advance past any whitespace.
  #[inline(always)]
  pub fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(is_whitespace) {
      self.pos += 1;
    }
  }

  /// Consume `b` if it's the next byte.
  #[inline(always)]
  pub fn eat(&mut self, b: u8) -> bool {
    if self.peek() == Some(b) {
      self.pos += 1;
      return true;
    }
    false
  }

  /// Consume `b`, which must be the next byte.
  #[inline(always)]
  pub fn expect(&mut self, b: u8) -> Result<(), JsonError> {
    if !self.eat(b) {
      Err(self.unexpected())?;
    }
    Ok(())
  }

  /// The error for the byte currently under the cursor.
  #[inline(always)]
  pub fn unexpected(&self) -> JsonError {
    match self.peek() {
      Some(found) => JsonError::UnexpectedByte { offset: self.pos, found },
      None => JsonError::UnexpectedEnd,
    }
  }

  /// Note a container was opened, erroring if this exceeds the maximum depth.
  #[inline(always)]
  pub fn enter(&mut self) -> Result<(), JsonError> {
    if self.depth == self.options.max_depth {
      Err(JsonError::DepthLimit(self.options.max_depth))?;
    }
    self.depth += 1;
    Ok(())
  }

  /// Note a container was closed.
  #[inline(always)]
  pub fn leave(&mut self) {
    self.depth = self.depth.saturating_sub(1);
  }

  /// Get the type of the next value.
  ///
  /// This does not assert it's a valid instance of this type, solely that if it's a valid value,
  /// it'll be of this type. Anything not recognized as another type is considered a number, left
  /// for the number scanner to reject.
  #[inline(always)]
  pub fn peek_type(&self) -> Result<Type, JsonError> {
    Ok(match self.peek().ok_or(JsonError::UnexpectedEnd)? {
      b'{' => Type::Object,
      b'[' => Type::Array,
      b'"' => Type::String,
      b't' | b'f' => Type::Bool,
      b'n' => Type::Null,
      _ => Type::Number,
    })
  }

  /// Consume a comma-separated continuation within a container.
  ///
  /// Returns `true` if a comma was consumed (and another item follows) or `false` if the
  /// container's closing byte was consumed.
  pub fn next_or_close(&mut self, close: u8) -> Result<bool, JsonError> {
    self.skip_whitespace();
    if self.eat(b',') {
      self.skip_whitespace();
      return Ok(true);
    }
    if self.eat(close) {
      return Ok(false);
    }
    Err(self.unexpected())
  }

  /// Advance past the next value, whatever it may be.
  ///
  /// This checks the value's structure (brackets, strings, literals, and numbers) without
  /// interpreting it.
  pub fn skip_value(&mut self) -> Result<(), JsonError> {
    self.skip_whitespace();
    match self.peek_type()? {
      Type::Object => {
        self.enter()?;
        self.pos += 1;
        self.skip_whitespace();
        if !self.eat(b'}') {
          loop {
            self.skip_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_value()?;
            if !self.next_or_close(b'}')? {
              break;
            }
          }
        }
        self.leave();
      }
      Type::Array => {
        self.enter()?;
        self.pos += 1;
        self.skip_whitespace();
        if !self.eat(b']') {
          loop {
            self.skip_value()?;
            if !self.next_or_close(b']')? {
              break;
            }
          }
        }
        self.leave();
      }
      Type::String => self.skip_string()?,
      Type::Bool | Type::Null => {
        self.read_literal()?;
      }
      Type::Number => {
        self.read_number()?;
      }
    }
    Ok(())
  }

  /// Check only whitespace remains.
  pub fn finish(&mut self) -> Result<(), JsonError> {
    self.skip_whitespace();
    if self.pos != self.text.len() {
      Err(JsonError::TrailingCharacters(self.pos))?;
    }
    Ok(())
  }

  /// Run a fallible read, rewinding the cursor if it fails.
  #[inline(always)]
  pub(crate) fn attempt<T>(
    &mut self,
    read: impl FnOnce(&mut Self) -> Result<T, JsonError>,
  ) -> Option<T> {
    let start = self.pos;
    let depth = self.depth;
    let res = read(self).ok();
    if res.is_none() {
      self.pos = start;
      self.depth = depth;
    }
    res
  }
}

#[test]
fn skip_values() {
  let mut cursor = Cursor::new(r#" {"a": [1, {"b": "]}"}, true], "c": null} , 5"#);
  cursor.skip_value().unwrap();
  assert!(cursor.next_or_close(b']').unwrap());
  cursor.skip_value().unwrap();
  cursor.finish().unwrap();

  for invalid in [r#"{"a" 1}"#, "[1,]", "[1 2]", r#"{"a":tru}"#, "[", r#"{"a":"b}"#] {
    assert!(Cursor::new(invalid).skip_value().is_err(), "skipped {invalid}");
  }
}

#[test]
fn depth_limit() {
  let nested = "[".repeat(8) + &"]".repeat(8);
  assert!(Cursor::with_options(&nested, DecodeOptions { max_depth: 8 }).skip_value().is_ok());
  assert_eq!(
    Cursor::with_options(&nested, DecodeOptions { max_depth: 7 }).skip_value(),
    Err(JsonError::DepthLimit(7))
  );
}

#[test]
fn trailing_characters() {
  let mut cursor = Cursor::new("[] x");
  cursor.skip_value().unwrap();
  assert_eq!(cursor.finish(), Err(JsonError::TrailingCharacters(3)));
}

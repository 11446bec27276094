use alloc::{borrow::Cow, string::String};

use crate::{JsonError, Cursor, ScratchPool, SMALL_SCRATCH};

/// How a byte within a string is escaped when written.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Escape {
  /// Written as-is.
  Verbatim,
  /// Written as `\` followed by this byte.
  Short(u8),
  /// Written as `\u00XX`.
  Unicode,
}

/// Classify a byte of a UTF-8 string for escaping.
///
/// Bytes of multi-byte UTF-8 sequences are always written verbatim, including both halves of
/// characters outside the basic multilingual plane.
#[inline(always)]
pub(crate) fn escape(b: u8) -> Escape {
  match b {
    b'"' => Escape::Short(b'"'),
    b'\\' => Escape::Short(b'\\'),
    b'\x08' => Escape::Short(b'b'),
    b'\x0c' => Escape::Short(b'f'),
    b'\n' => Escape::Short(b'n'),
    b'\r' => Escape::Short(b'r'),
    b'\t' => Escape::Short(b't'),
    b'\x00' ..= b'\x1f' => Escape::Unicode,
    _ => Escape::Verbatim,
  }
}

#[inline(always)]
fn hex4(bytes: &[u8]) -> Option<u16> {
  if bytes.len() != 4 {
    None?;
  }
  let mut res = 0;
  for b in bytes {
    res = (res << 4) | u16::try_from(char::from(*b).to_digit(16)?).ok()?;
  }
  Some(res)
}

/// Unescape a string already validated by `Cursor::scan_string`, yielding its pieces in order.
///
/// Surrogate pairs are combined. A surrogate without its pair can't be represented within a
/// `str` and is yielded as U+FFFD.
fn unescape(raw: &str, push: &mut impl FnMut(&str)) {
  let bytes = raw.as_bytes();
  let mut i = 0;
  while i < bytes.len() {
    let Some(next_escape) = bytes[i ..].iter().position(|b| *b == b'\\') else {
      push(&raw[i ..]);
      return;
    };
    if next_escape != 0 {
      push(&raw[i .. (i + next_escape)]);
      i += next_escape;
    }

    let unescaped = match bytes.get(i + 1).copied().unwrap_or(b'\\') {
      b'b' => '\x08',
      b'f' => '\x0c',
      b'n' => '\n',
      b'r' => '\r',
      b't' => '\t',
      b'u' => {
        let unit = hex4(bytes.get((i + 2) .. (i + 6)).unwrap_or(&[])).unwrap_or(0xfffd);
        i += 4;
        match unit {
          0xd800 ..= 0xdbff => {
            let low = (bytes.get((i + 2) .. (i + 4)) == Some(&b"\\u"[..]))
              .then(|| hex4(bytes.get((i + 4) .. (i + 8)).unwrap_or(&[])))
              .flatten()
              .filter(|low| (0xdc00 ..= 0xdfff).contains(low));
            match low {
              Some(low) => {
                i += 6;
                let high = u32::from(unit - 0xd800) << 10;
                char::from_u32(high + u32::from(low - 0xdc00) + 0x10000)
                  .unwrap_or(char::REPLACEMENT_CHARACTER)
              }
              None => char::REPLACEMENT_CHARACTER,
            }
          }
          unit => char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER),
        }
      }
      // `"`, `\`, `/`, which stand for themselves
      other => char::from(other),
    };
    i += 2;
    push(&*unescaped.encode_utf8(&mut [0; 4]));
  }
}

/// A stack buffer for short unescaped strings.
struct SmallScratch {
  bytes: [u8; SMALL_SCRATCH],
  len: usize,
}

impl SmallScratch {
  /// Push a piece of a string.
  ///
  /// Unescaping never lengthens a string, so a string whose escaped form fits will fit.
  #[inline(always)]
  fn push(&mut self, piece: &str) {
    let end = (self.len + piece.len()).min(SMALL_SCRATCH);
    self.bytes[self.len .. end].copy_from_slice(&piece.as_bytes()[.. (end - self.len)]);
    self.len = end;
  }
}

impl<'text> Cursor<'text> {
  /// Scan a string, returning its raw (still escaped) contents and if any escapes were present.
  pub(crate) fn scan_string(&mut self) -> Result<(&'text str, bool), JsonError> {
    let start = self.position();
    if self.peek() != Some(b'"') {
      Err(self.unexpected())?;
    }
    let rest = self.rest();

    let mut escaped = false;
    let mut i = 1;
    loop {
      let Some(b) = rest.get(i).copied() else { return Err(JsonError::UnterminatedString(start)) };
      match b {
        b'"' => break,
        // https://datatracker.ietf.org/doc/html/rfc8259#section-7
        b'\\' => {
          escaped = true;
          match rest.get(i + 1) {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => i += 2,
            Some(b'u') => {
              if rest.get((i + 2) .. (i + 6)).and_then(hex4).is_none() {
                Err(JsonError::InvalidString(start + i))?;
              }
              i += 6;
            }
            Some(_) => Err(JsonError::InvalidString(start + i))?,
            None => Err(JsonError::UnterminatedString(start))?,
          }
        }
        b'\x00' ..= b'\x1f' => Err(JsonError::InvalidString(start + i))?,
        _ => i += 1,
      }
    }

    let raw = &self.text()[(start + 1) .. (start + i)];
    self.advance(i + 1);
    Ok((raw, escaped))
  }

  /// Advance past a string without unescaping it.
  #[inline(always)]
  pub fn skip_string(&mut self) -> Result<(), JsonError> {
    self.scan_string().map(|_| ())
  }

  /// Read a string.
  ///
  /// If the string has no escape sequences, this borrows its contents from the text.
  pub fn read_string(&mut self) -> Result<Cow<'text, str>, JsonError> {
    let (raw, escaped) = self.scan_string()?;
    if !escaped {
      return Ok(Cow::Borrowed(raw));
    }
    let mut res = String::with_capacity(raw.len());
    unescape(raw, &mut |piece| res.push_str(piece));
    Ok(Cow::Owned(res))
  }

  /// Read a string, returning `None` and leaving the cursor in place if there isn't one.
  #[inline(always)]
  pub fn try_read_string(&mut self) -> Option<Cow<'text, str>> {
    self.attempt(Self::read_string)
  }

  /// Read a string and pass its contents to `f`, without allocating.
  ///
  /// Strings without escapes are passed as views into the text. Short strings with escapes are
  /// unescaped on the stack, and longer ones into a buffer from the shared [`ScratchPool`], which
  /// is returned to the pool once `f` returns (or unwinds).
  pub fn read_str_with<R>(&mut self, f: impl FnOnce(&str) -> R) -> Result<R, JsonError> {
    let start = self.position();
    let (raw, escaped) = self.scan_string()?;
    if !escaped {
      return Ok(f(raw));
    }

    if raw.len() <= SMALL_SCRATCH {
      let mut small = SmallScratch { bytes: [0; SMALL_SCRATCH], len: 0 };
      unescape(raw, &mut |piece| small.push(piece));
      let unescaped = core::str::from_utf8(&small.bytes[.. small.len])
        .map_err(|_| JsonError::InvalidString(start))?;
      return Ok(f(unescaped));
    }

    let mut pooled = ScratchPool::shared().acquire();
    unescape(raw, &mut |piece| pooled.push_str(piece));
    Ok(f(pooled.as_str()))
  }
}

//! The exact length, in UTF-8 bytes, of the text [`Writer`](crate::Writer) emits for each
//! primitive.
//!
//! These are what allow a document to be written into a buffer allocated once, with its final
//! length known in advance. Each function here is kept in agreement with the corresponding
//! `Writer` method.

use core::fmt::{self, Display, Write};

use crate::{
  number::{format_f32, format_f64},
  string::{Escape, escape},
};

/// The length of `null`.
pub const NULL_LEN: usize = 4;

/// The length of an unsigned integer.
#[inline(always)]
pub fn u64_len(mut value: u64) -> usize {
  let mut len = 1;
  while value >= 10 {
    value /= 10;
    len += 1;
  }
  len
}

/// The length of a length or count.
#[inline(always)]
pub fn usize_len(mut value: usize) -> usize {
  let mut len = 1;
  while value >= 10 {
    value /= 10;
    len += 1;
  }
  len
}

/// The length of a signed integer.
#[inline(always)]
pub fn i64_len(value: i64) -> usize {
  usize::from(value < 0) + u64_len(value.unsigned_abs())
}

/// The length of a string's contents once escaped, without the surrounding quotes.
#[inline(always)]
pub fn escaped_len(str: &str) -> usize {
  str
    .bytes()
    .map(|b| match escape(b) {
      Escape::Verbatim => 1,
      Escape::Short(_) => 2,
      Escape::Unicode => 6,
    })
    .sum()
}

/// The length of a string, quoted and escaped.
#[inline(always)]
pub fn str_len(str: &str) -> usize {
  2 + escaped_len(str)
}

/// The length of an `f64`.
#[inline(always)]
pub fn f64_len(value: f64) -> usize {
  format_f64(&mut zmij::Buffer::new(), value).len()
}

/// The length of an `f32`.
#[inline(always)]
pub fn f32_len(value: f32) -> usize {
  format_f32(&mut zmij::Buffer::new(), value).len()
}

/// The length of a boolean.
#[inline(always)]
pub fn bool_len(value: bool) -> usize {
  if value { 4 } else { 5 }
}

/// A sink which only counts the bytes formatted into it.
struct Counter(usize);

impl Write for Counter {
  #[inline(always)]
  fn write_str(&mut self, s: &str) -> fmt::Result {
    self.0 += s.len();
    Ok(())
  }
}

/// The length of a value's `Display` text, as written by [`Writer::write_display`].
///
/// [`Writer::write_display`]: crate::Writer::write_display
#[inline(always)]
pub fn display_len(value: &impl Display) -> usize {
  let mut counter = Counter(0);
  // `Counter` never fails, so an error could only be raised by the value's own `Display`
  if write!(counter, "{value}").is_err() {
    tracing::trace!(len = counter.0, "formatting failed");
  }
  counter.0
}

use core::str::FromStr;

use crate::{JsonError, Cursor, cursor::is_delimiter};

/// The quoted text written for the non-finite floats.
pub(crate) const NAN: &str = "\"NaN\"";
pub(crate) const INFINITY: &str = "\"Infinity\"";
pub(crate) const NEG_INFINITY: &str = "\"-Infinity\"";

/// The text for an `f64`.
///
/// Finite values use the shortest representation which reads back as the identical value.
/// Non-finite values, which JSON has no number for, are written as quoted strings.
#[inline(always)]
pub(crate) fn format_f64(buffer: &mut zmij::Buffer, value: f64) -> &str {
  if value.is_nan() {
    return NAN;
  }
  if value.is_infinite() {
    return if value.is_sign_negative() { NEG_INFINITY } else { INFINITY };
  }
  buffer.format(value)
}

/// The text for an `f32`, as [`format_f64`] yet shortest with respect to `f32`.
#[inline(always)]
pub(crate) fn format_f32(buffer: &mut zmij::Buffer, value: f32) -> &str {
  if value.is_nan() {
    return NAN;
  }
  if value.is_infinite() {
    return if value.is_sign_negative() { NEG_INFINITY } else { INFINITY };
  }
  buffer.format(value)
}

/// Parse the contents of a string as a non-finite float, as written by [`format_f64`].
#[inline(always)]
pub fn non_finite_from_str(str: &str) -> Option<f64> {
  match str {
    "NaN" => Some(f64::NAN),
    "Infinity" => Some(f64::INFINITY),
    "-Infinity" => Some(f64::NEG_INFINITY),
    _ => None,
  }
}

/// A number read from JSON, preserved as its text.
///
/// Conversions are performed on request, letting the caller decide which numeric type the number
/// is expected to fit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Number<'text>(&'text str);

impl<'text> Number<'text> {
  /// The text of this number.
  #[inline(always)]
  pub fn as_str(self) -> &'text str {
    self.0
  }

  /// If this number is written without a fractional part or exponent.
  #[inline(always)]
  fn integral(self) -> bool {
    !self.0.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
  }

  /// This number as an `i64`.
  ///
  /// This is only yielded for integers written as plain digits (with an optional sign) which fit
  /// within an `i64`.
  #[inline(always)]
  pub fn i64(self) -> Option<i64> {
    if !self.integral() {
      None?;
    }
    i64::from_str(self.0).ok()
  }

  /// This number as a `u64`, under the same rules as [`Number::i64`].
  #[inline(always)]
  pub fn u64(self) -> Option<u64> {
    if !self.integral() {
      None?;
    }
    // Accept `-0`, which `u64::from_str` rejects
    if let Some(magnitude) = self.0.strip_prefix('-') {
      return magnitude.bytes().all(|b| b == b'0').then_some(0);
    }
    u64::from_str(self.0).ok()
  }

  /// This number as an `f64`, rounding to the nearest representable value.
  #[inline(always)]
  pub fn f64(self) -> Option<f64> {
    f64::from_str(self.0).ok()
  }

  /// This number as an `f32`, rounding to the nearest representable value.
  #[inline(always)]
  pub fn f32(self) -> Option<f32> {
    f32::from_str(self.0).ok()
  }
}

impl<'text> Cursor<'text> {
  /// Read a number.
  /*
    This is lenient relative to RFC 8259, accepting
    `[ minus / plus ] *DIGIT [ decimal-point *DIGIT ] [ e [ minus / plus ] 1*DIGIT ]`, so long as
    there's at least one digit before the exponent. This allows `+1` and `.5`, and leading zeroes.
  */
  pub fn read_number(&mut self) -> Result<Number<'text>, JsonError> {
    let start = self.position();
    let rest = self.rest();
    let invalid = JsonError::InvalidNumber(start);

    let mut i = 0;
    if matches!(rest.first(), Some(b'-' | b'+')) {
      i += 1;
    }
    let mut mantissa_digits = 0;
    while rest.get(i).is_some_and(u8::is_ascii_digit) {
      i += 1;
      mantissa_digits += 1;
    }
    if rest.get(i) == Some(&b'.') {
      i += 1;
      while rest.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
        mantissa_digits += 1;
      }
    }
    if mantissa_digits == 0 {
      Err(invalid)?;
    }
    if matches!(rest.get(i), Some(b'e' | b'E')) {
      i += 1;
      if matches!(rest.get(i), Some(b'-' | b'+')) {
        i += 1;
      }
      let exponent_start = i;
      while rest.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
      }
      if i == exponent_start {
        Err(invalid)?;
      }
    }
    if !is_delimiter(rest.get(i).copied()) {
      Err(invalid)?;
    }

    let number = Number(&self.text()[start .. (start + i)]);
    self.advance(i);
    Ok(number)
  }

  /// Read a number, returning `None` and leaving the cursor in place if there isn't one.
  #[inline(always)]
  pub fn try_read_number(&mut self) -> Option<Number<'text>> {
    self.attempt(Self::read_number)
  }
}

#[allow(clippy::float_cmp)]
#[test]
fn numbers() {
  fn read(text: &str) -> Result<&str, JsonError> {
    Cursor::new(text).read_number().map(Number::as_str)
  }
  assert_eq!(read("0"), Ok("0"));
  assert_eq!(read("-12,"), Ok("-12"));
  assert_eq!(read("+12]"), Ok("+12"));
  assert_eq!(read(".5}"), Ok(".5"));
  assert_eq!(read("1.5e+10 "), Ok("1.5e+10"));
  assert_eq!(read("2E-3"), Ok("2E-3"));
  for invalid in ["-", ".", "1e", "1e+", "1x", "--1", "1.2.3", "e5", "0x10"] {
    assert!(read(invalid).is_err(), "accepted {invalid}");
    let mut cursor = Cursor::new(invalid);
    assert_eq!(cursor.try_read_number(), None);
    assert_eq!(cursor.position(), 0);
  }

  let number = |text| Cursor::new(text).read_number().unwrap();
  assert_eq!(number("-9223372036854775808").i64(), Some(i64::MIN));
  assert_eq!(number("18446744073709551615").u64(), Some(u64::MAX));
  assert_eq!(number("18446744073709551616").u64(), None);
  assert_eq!(number("-1").u64(), None);
  assert_eq!(number("-0").u64(), Some(0));
  assert_eq!(number("+7").i64(), Some(7));
  assert_eq!(number("1e2").i64(), None);
  assert_eq!(number("1.0").i64(), None);
  assert_eq!(number(".5").f64(), Some(0.5));
  assert_eq!(number("+.25e1").f64(), Some(2.5));
  assert_eq!(number("-1.5E-1").f32(), Some(-0.15));
}

#[test]
fn float_text() {
  let mut buffer = zmij::Buffer::new();
  assert_eq!(format_f64(&mut buffer, f64::NAN), "\"NaN\"");
  assert_eq!(format_f64(&mut buffer, f64::INFINITY), "\"Infinity\"");
  assert_eq!(format_f64(&mut buffer, f64::NEG_INFINITY), "\"-Infinity\"");
  for value in [0.1, -2.5e-300, 1e21, f64::MAX, f64::MIN_POSITIVE, 123_456.789] {
    let text = format_f64(&mut buffer, value);
    assert_eq!(f64::from_str(text).unwrap().to_bits(), value.to_bits(), "{text}");
  }
  for value in [0.1f32, f32::MAX, -3.25, 1e-40] {
    let text = format_f32(&mut buffer, value);
    assert_eq!(f32::from_str(text).unwrap().to_bits(), value.to_bits(), "{text}");
  }
  assert_eq!(non_finite_from_str("-Infinity"), Some(f64::NEG_INFINITY));
  assert_eq!(non_finite_from_str("nan"), None);
}

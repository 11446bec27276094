use core::fmt;

use exact_json::{JsonError, Cursor, Writer, Type, size};

use crate::Value;

/// A custom encoding for a field, replacing the encoding of its shape.
///
/// Implementations must uphold the same invariant as the codec itself: `size` returns exactly
/// the amount of bytes `write` writes for the same value. `read` must consume exactly one JSON
/// value, returning `Ok(None)` if it was well-formed yet not a valid encoding.
pub trait Converter: Send + Sync + fmt::Debug {
  /// The length of the value once written.
  fn size(&self, value: &Value) -> usize;
  /// Write the value.
  fn write(&self, value: &Value, writer: &mut Writer);
  /// Read a value.
  fn read(&self, cursor: &mut Cursor<'_>) -> Result<Option<Value>, JsonError>;
}

/// Integers written as quoted decimal strings, as used by APIs whose consumers can't represent
/// 64-bit integers as numbers.
///
/// Both `"123"` and `123` are read. Values other than integers are written as `null`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct QuotedInteger;

impl Converter for QuotedInteger {
  fn size(&self, value: &Value) -> usize {
    match value {
      Value::Int(value) => 2 + size::i64_len(*value),
      Value::UInt(value) => 2 + size::u64_len(*value),
      _ => size::NULL_LEN,
    }
  }

  fn write(&self, value: &Value, writer: &mut Writer) {
    match value {
      Value::Int(value) => writer.write_quoted_i64(*value),
      Value::UInt(value) => writer.write_quoted_u64(*value),
      _ => writer.write_null(),
    }
  }

  fn read(&self, cursor: &mut Cursor<'_>) -> Result<Option<Value>, JsonError> {
    Ok(match cursor.peek_type()? {
      Type::String => cursor.read_str_with(|str| {
        str
          .parse::<i64>()
          .map(Value::Int)
          .ok()
          .or_else(|| str.parse::<u64>().map(Value::UInt).ok())
      })?,
      Type::Number => {
        let number = cursor.read_number()?;
        number.i64().map(Value::Int).or_else(|| number.u64().map(Value::UInt))
      }
      _ => {
        cursor.skip_value()?;
        None
      }
    })
  }
}

#[test]
fn quoted_integer() {
  let converter = QuotedInteger;
  for value in [Value::Int(i64::MIN), Value::Int(0), Value::UInt(u64::MAX), Value::Null] {
    let mut writer = Writer::default();
    converter.write(&value, &mut writer);
    assert_eq!(converter.size(&value), writer.len());
  }

  let read = |text| converter.read(&mut Cursor::new(text));
  assert_eq!(read(r#""-12""#), Ok(Some(Value::Int(-12))));
  assert_eq!(read(r#""18446744073709551615""#), Ok(Some(Value::UInt(u64::MAX))));
  assert_eq!(read("42"), Ok(Some(Value::Int(42))));
  assert_eq!(read(r#""twelve""#), Ok(None));
  assert_eq!(read("[1, 2]"), Ok(None));
  assert!(read(r#""unterminated"#).is_err());
}

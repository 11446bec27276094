use serde_json::{Map, Number, Value};
use exact_json::{
  JsonError, Cursor, Literal, Type, Writer, count_list_items, count_dictionary_items, size,
};

/*
  The following read and write arbitrary `serde_json::Value`s with the primitives offered by
  `exact-json`, so they may be checked against `serde_json` itself. Every container's items are
  counted structurally before it's read, with the count checked against the amount of items
  actually read.
*/

fn read_array(cursor: &mut Cursor<'_>) -> Result<Value, JsonError> {
  let count = count_list_items(cursor.text(), cursor.position() + 1);
  let mut items = Vec::with_capacity(count);
  cursor.enter()?;
  cursor.expect(b'[')?;
  cursor.skip_whitespace();
  if !cursor.eat(b']') {
    loop {
      items.push(read_value(cursor)?);
      if !cursor.next_or_close(b']')? {
        break;
      }
    }
  }
  cursor.leave();
  assert_eq!(items.len(), count);
  Ok(Value::Array(items))
}

fn read_object(cursor: &mut Cursor<'_>) -> Result<Value, JsonError> {
  let count = count_dictionary_items(cursor.text(), cursor.position() + 1);
  let mut read = 0;
  let mut object = Map::new();
  cursor.enter()?;
  cursor.expect(b'{')?;
  cursor.skip_whitespace();
  if !cursor.eat(b'}') {
    loop {
      let key = cursor.read_string()?.into_owned();
      cursor.skip_whitespace();
      cursor.expect(b':')?;
      cursor.skip_whitespace();
      // As with `serde_json`, the last value for a duplicated key is kept
      object.insert(key, read_value(cursor)?);
      read += 1;
      if !cursor.next_or_close(b'}')? {
        break;
      }
    }
  }
  cursor.leave();
  assert_eq!(read, count);
  Ok(Value::Object(object))
}

/// Read the value under the cursor.
pub fn read_value(cursor: &mut Cursor<'_>) -> Result<Value, JsonError> {
  Ok(match cursor.peek_type()? {
    Type::Null | Type::Bool => match cursor.read_literal()? {
      Literal::True => Value::Bool(true),
      Literal::False => Value::Bool(false),
      Literal::Null => Value::Null,
    },
    Type::Number => {
      let number = cursor.read_number()?;
      if let Some(number) = number.i64() {
        Value::from(number)
      } else if let Some(number) = number.u64() {
        Value::from(number)
      } else {
        number.f64().and_then(Number::from_f64).map_or(Value::Null, Value::Number)
      }
    }
    Type::String => Value::String(cursor.read_string()?.into_owned()),
    Type::Array => read_array(cursor)?,
    Type::Object => read_object(cursor)?,
  })
}

/// Parse an entire document.
pub fn parse(text: &str) -> Result<Value, JsonError> {
  let mut cursor = Cursor::new(text);
  cursor.skip_whitespace();
  let value = read_value(&mut cursor)?;
  cursor.finish()?;
  Ok(value)
}

/// The length of a value once written.
pub fn value_len(value: &Value) -> usize {
  match value {
    Value::Null => size::NULL_LEN,
    Value::Bool(bool) => size::bool_len(*bool),
    Value::Number(number) => {
      if let Some(number) = number.as_i64() {
        size::i64_len(number)
      } else if let Some(number) = number.as_u64() {
        size::u64_len(number)
      } else {
        number.as_f64().map_or(size::NULL_LEN, size::f64_len)
      }
    }
    Value::String(str) => size::str_len(str),
    Value::Array(array) => {
      2 + array.len().saturating_sub(1) + array.iter().map(value_len).sum::<usize>()
    }
    Value::Object(object) => {
      2 + object.len().saturating_sub(1) +
        object.iter().map(|(key, value)| size::str_len(key) + 1 + value_len(value)).sum::<usize>()
    }
  }
}

/// Write a value.
pub fn write_value(value: &Value, writer: &mut Writer) {
  match value {
    Value::Null => writer.write_null(),
    Value::Bool(bool) => writer.write_bool(*bool),
    Value::Number(number) => {
      if let Some(number) = number.as_i64() {
        writer.write_i64(number);
      } else if let Some(number) = number.as_u64() {
        writer.write_u64(number);
      } else {
        match number.as_f64() {
          Some(number) => writer.write_f64(number),
          None => writer.write_null(),
        }
      }
    }
    Value::String(str) => writer.write_str(str),
    Value::Array(array) => {
      writer.push_byte(b'[');
      for (i, value) in array.iter().enumerate() {
        if i != 0 {
          writer.push_byte(b',');
        }
        write_value(value, writer);
      }
      writer.push_byte(b']');
    }
    Value::Object(object) => {
      writer.push_byte(b'{');
      for (i, (key, value)) in object.iter().enumerate() {
        if i != 0 {
          writer.push_byte(b',');
        }
        writer.write_str(key);
        writer.push_byte(b':');
        write_value(value, writer);
      }
      writer.push_byte(b'}');
    }
  }
}

/// Serialize a value, asserting the length calculated in advance was exact.
pub fn serialize(value: &Value) -> String {
  let len = value_len(value);
  let mut writer = Writer::with_capacity(len);
  write_value(value, &mut writer);
  assert_eq!(writer.len(), len);
  writer.into_string()
}

fn check_float(number: f64, expected: f64) {
  // 0.1% of the smaller number
  let allowed_deviation = number.abs().min(expected.abs()) / 1000.0;
  assert!((number - expected).abs() <= allowed_deviation, "{number} {expected}");
}

/// Check two values are equivalent, allowing floats to differ by a negligible amount.
pub fn check_values_equivalent(a: &Value, b: &Value) {
  match a {
    Value::Null | Value::Bool(_) | Value::String(_) => assert_eq!(a, b),
    Value::Number(number) => {
      let other = b.as_number().unwrap();
      if number.is_f64() || other.is_f64() {
        check_float(number.as_f64().unwrap(), other.as_f64().unwrap());
      } else {
        assert_eq!(number, other);
      }
    }
    Value::Array(array) => {
      let b = b.as_array().unwrap();
      assert_eq!(array.len(), b.len());
      for (a, b) in array.iter().zip(b) {
        check_values_equivalent(a, b);
      }
    }
    Value::Object(object) => {
      let b = b.as_object().unwrap();
      assert_eq!(object.len(), b.len());
      for (key, value) in object {
        check_values_equivalent(value, &b[key]);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use rand_core::{RngCore, OsRng};
  use exact_json_schema::{
    CodecPlan, Element, FieldDescriptor, Object, PlanBuilder, Scalar, SchemaId, Shape,
    Value as SchemaValue,
  };
  use super::*;

  fn below(bound: u64) -> usize {
    usize::try_from(OsRng.next_u64() % bound).unwrap()
  }

  #[allow(clippy::cast_possible_truncation)]
  fn random_string() -> String {
    let mut res = String::new();
    for _ in 0 .. below(128) {
      if (OsRng.next_u64() % 2) == 1 {
        // ASCII, including the control characters which must be escaped
        res.push(char::from_u32((OsRng.next_u64() % 128) as u32).unwrap());
      } else {
        res.push(loop {
          if let Some(char) = char::from_u32(OsRng.next_u64() as u32) {
            // Skip ASCII as those are intended to be included by the other branch
            if char.is_ascii() {
              continue;
            }
            break char;
          }
        });
      }
    }
    res
  }

  fn random_f64() -> f64 {
    loop {
      let float = f64::from_bits(OsRng.next_u64());
      if float.is_finite() {
        break float;
      }
    }
  }

  fn random_value(depth: usize) -> Value {
    let modulus = if depth == 6 { 4 } else { 6 };
    match OsRng.next_u64() % modulus {
      0 => Value::Null,
      1 => Value::Bool((OsRng.next_u64() % 2) == 1),
      2 => Value::Number(match OsRng.next_u64() % 3 {
        0 => Number::from(OsRng.next_u64()),
        1 => Number::from(i64::MIN + i64::try_from(OsRng.next_u64() >> 1).unwrap()),
        2 => Number::from_f64(random_f64()).unwrap(),
        _ => unreachable!(),
      }),
      3 => Value::String(random_string()),
      4 => Value::Array((0 .. below(8)).map(|_| random_value(depth + 1)).collect()),
      5 => Value::Object(
        (0 .. below(8)).map(|_| (random_string(), random_value(depth + 1))).collect(),
      ),
      _ => unreachable!(),
    }
  }

  fn random_container() -> Value {
    loop {
      let value = random_value(0);
      if matches!(value, Value::Object(_) | Value::Array(_)) {
        break value;
      }
    }
  }

  #[test]
  fn fuzz() {
    for _ in 0 .. 100 {
      let value = random_container();

      // Read what `serde_json` writes
      let text = value.to_string();
      check_values_equivalent(&value, &parse(&text).unwrap());
      let mut cursor = Cursor::new(&text);
      cursor.skip_value().unwrap();
      cursor.finish().unwrap();

      // Have `serde_json` read what we write
      let ours = serialize(&value);
      check_values_equivalent(&value, &serde_json::from_str(&ours).unwrap());
      check_values_equivalent(&value, &parse(&ours).unwrap());

      // Pretty-printed text has whitespace throughout
      let pretty = serde_json::to_string_pretty(&value).unwrap();
      check_values_equivalent(&value, &parse(&pretty).unwrap());

      // Every truncation is an error
      for _ in 0 .. 16 {
        let i = below(u64::try_from(text.len()).unwrap());
        if text.is_char_boundary(i) {
          assert!(parse(&text[.. i]).is_err(), "{}", &text[.. i]);
          assert!(Cursor::new(&text[.. i]).skip_value().is_err());
        }
      }
    }
  }

  #[test]
  fn strings() {
    for _ in 0 .. 1000 {
      let string = random_string();

      let theirs = serde_json::to_string(&string).unwrap();
      assert_eq!(Cursor::new(&theirs).read_string().unwrap(), string);
      assert_eq!(Cursor::new(&theirs).read_str_with(|str| str == string), Ok(true));

      let mut writer = Writer::default();
      writer.write_str(&string);
      assert_eq!(writer.len(), size::str_len(&string));
      assert_eq!(serde_json::from_str::<String>(writer.as_str()).unwrap(), string);
    }
  }

  #[test]
  fn numbers() {
    for _ in 0 .. 1000 {
      let int = OsRng.next_u64();
      let mut writer = Writer::default();
      writer.write_u64(int);
      assert_eq!(writer.len(), size::u64_len(int));
      assert_eq!(serde_json::from_str::<u64>(writer.as_str()).unwrap(), int);
      assert_eq!(Cursor::new(writer.as_str()).read_number().unwrap().u64(), Some(int));

      let int = i64::from_ne_bytes(OsRng.next_u64().to_ne_bytes());
      let mut writer = Writer::default();
      writer.write_i64(int);
      assert_eq!(writer.len(), size::i64_len(int));
      assert_eq!(serde_json::from_str::<i64>(writer.as_str()).unwrap(), int);
      assert_eq!(Cursor::new(writer.as_str()).read_number().unwrap().i64(), Some(int));

      let float = random_f64();
      let mut writer = Writer::default();
      writer.write_f64(float);
      assert_eq!(writer.len(), size::f64_len(float));
      check_float(serde_json::from_str::<f64>(writer.as_str()).unwrap(), float);
      let read = Cursor::new(writer.as_str()).read_number().unwrap().f64().unwrap();
      assert_eq!(read.to_bits(), float.to_bits());

      let theirs = serde_json::to_string(&float).unwrap();
      let read = Cursor::new(&theirs).read_number().unwrap().f64().unwrap();
      check_float(read, float);
    }
  }

  struct Records {
    plan: CodecPlan,
    record: SchemaId,
  }

  fn records() -> Records {
    let mut builder = PlanBuilder::new();
    let record = builder.schema("Record");
    builder.fields(
      record,
      [
        FieldDescriptor::new("Name", Scalar::String),
        FieldDescriptor::new("Signed", Scalar::I64),
        FieldDescriptor::new("Unsigned", Scalar::U64),
        FieldDescriptor::new("Float", Scalar::F64),
        FieldDescriptor::new("Tags", Shape::list(Element::new(Scalar::String))).count_marker(),
        FieldDescriptor::new(
          "Counts",
          Shape::map(Scalar::String.into(), Element::nullable(Scalar::I32)),
        ),
        FieldDescriptor::new("Child", Shape::Object(record)).nullable(),
      ],
    );
    Records { plan: builder.build().unwrap(), record }
  }

  fn random_record(records: &Records, depth: usize) -> Object {
    let tags = (0 .. below(4)).map(|_| SchemaValue::Str(random_string())).collect();
    // Keys are unique and ordered, as `serde_json` will have them once it reformats the text
    let counts = (0 .. below(4))
      .map(|_| {
        let count = i32::from_ne_bytes(OsRng.next_u32().to_ne_bytes());
        let count = if (OsRng.next_u32() % 4) == 0 {
          SchemaValue::Null
        } else {
          SchemaValue::Int(i64::from(count))
        };
        (random_string(), count)
      })
      .collect::<BTreeMap<_, _>>()
      .into_iter()
      .map(|(key, count)| (SchemaValue::Str(key), count))
      .collect();
    // A float `serde_json` will read back exactly
    let float = f64::from(i32::from_ne_bytes(OsRng.next_u32().to_ne_bytes())) / 8.0;
    let child = if (depth < 3) && ((OsRng.next_u64() % 2) == 1) {
      SchemaValue::Object(random_record(records, depth + 1))
    } else {
      SchemaValue::Null
    };
    records
      .plan
      .object(
        records.record,
        [
          ("Name", SchemaValue::Str(random_string())),
          ("Signed", SchemaValue::Int(i64::from_ne_bytes(OsRng.next_u64().to_ne_bytes()))),
          ("Unsigned", SchemaValue::UInt(OsRng.next_u64())),
          ("Float", SchemaValue::Float(float)),
          ("Tags", SchemaValue::List(tags)),
          ("Counts", SchemaValue::Map(counts)),
          ("Child", child),
        ],
      )
      .unwrap()
  }

  #[test]
  fn schema_objects() {
    let records = records();
    let codec = records.plan.codec(records.record).unwrap();
    for _ in 0 .. 100 {
      let record = random_record(&records, 0);
      let text = codec.serialize(&record);
      assert_eq!(codec.calculate_size(&record), text.len());

      // The text is valid JSON, with the count marker preceding the list it counts
      let value = serde_json::from_str::<Value>(&text).unwrap();
      let tags = value["Tags"].as_array().unwrap();
      assert_eq!(value["$Tags"].as_u64(), Some(u64::try_from(tags.len()).unwrap()));
      assert!(text.find(r#""$Tags""#).unwrap() < text.find(r#""Tags""#).unwrap());

      assert_eq!(codec.deserialize(&text).unwrap().as_ref(), Some(&record));
      // Including once reformatted by `serde_json`, which sorts the keys and escapes differently
      let reformatted = serde_json::to_string_pretty(&value).unwrap();
      assert_eq!(codec.deserialize(&reformatted).unwrap().as_ref(), Some(&record));
    }
  }
}

use exact_json::Writer;

use crate::{
  SchemaId, EnumMode, Scalar, Shape, FieldDescriptor, EnumType, CodecPlan, Value, Object,
  size::{narrow, is_written, marker_count, effective_mode, rfc3339},
};

/*
  Each function here mirrors the function of the same name within `size`, and must write exactly
  the amount of bytes it calculates.
*/

pub(crate) fn write_object(
  plan: &CodecPlan,
  expected: SchemaId,
  object: &Object,
  writer: &mut Writer,
) {
  let Some((schema, discriminator)) = plan.concrete(expected, object) else {
    writer.write_null();
    return;
  };

  writer.push_byte(b'{');
  let mut first = true;
  let mut separate = |writer: &mut Writer| {
    if !first {
      writer.push_byte(b',');
    }
    first = false;
  };
  if let Some(discriminator) = discriminator {
    separate(writer);
    writer.push_raw(discriminator);
  }
  for (field, value) in schema.fields.iter().zip(&object.fields) {
    if !is_written(field, value) {
      continue;
    }
    if let Some(count) = marker_count(field, value) {
      separate(writer);
      writer.push_raw(&field.marker_key);
      writer.write_usize(count);
    }
    separate(writer);
    writer.push_raw(&field.key);
    write_field(plan, field, value, writer);
  }
  writer.push_byte(b'}');
}

#[inline(always)]
fn write_field(plan: &CodecPlan, field: &FieldDescriptor, value: &Value, writer: &mut Writer) {
  match &field.converter {
    Some(converter) => converter.write(value, writer),
    None => write_value(plan, &field.shape, value, writer),
  }
}

fn write_scalar(scalar: Scalar, value: &Value, writer: &mut Writer) {
  match (scalar, value) {
    (Scalar::Bool, Value::Bool(value)) => writer.write_bool(*value),
    (_, Value::Int(value)) if scalar.is_integer() => writer.write_i64(*value),
    (_, Value::UInt(value)) if scalar.is_integer() => writer.write_u64(*value),
    (Scalar::F32, Value::Float(value)) => writer.write_f32(narrow(*value)),
    (Scalar::F64, Value::Float(value)) => writer.write_f64(*value),
    (Scalar::String, Value::Str(value)) => writer.write_str(value),
    (Scalar::Guid, Value::Guid(value)) => writer.write_quoted_display(&value.hyphenated()),
    (Scalar::Decimal, Value::Decimal(value)) => writer.write_display(value),
    (Scalar::DateTime, Value::DateTime(value)) => writer.write_quoted_display(&rfc3339(value)),
    (Scalar::Date, Value::Date(value)) => writer.write_quoted_display(value),
    (Scalar::Time, Value::Time(value)) => writer.write_quoted_display(value),
    (Scalar::Version, Value::Version(value)) => writer.write_quoted_display(value),
    _ => writer.write_null(),
  }
}

fn write_enum(ty: &EnumType, mode: Option<EnumMode>, value: i64, writer: &mut Writer) {
  match (effective_mode(ty, mode), ty.name_of(value)) {
    (EnumMode::Text, Some(name)) => writer.write_str(name),
    // There's no name to write, so the underlying value is written as a string
    (EnumMode::Text, None) => writer.write_quoted_i64(value),
    (EnumMode::Number, _) => writer.write_i64(value),
  }
}

pub(crate) fn write_value(plan: &CodecPlan, shape: &Shape, value: &Value, writer: &mut Writer) {
  match (shape, value) {
    (Shape::Scalar(scalar), value) => write_scalar(*scalar, value, writer),
    (Shape::Enum { ty, mode }, Value::Enum(value)) => match plan.enum_type(*ty) {
      Some(ty) => write_enum(ty, *mode, *value, writer),
      None => writer.write_null(),
    },
    (Shape::Object(expected), Value::Object(object)) => {
      write_object(plan, *expected, object, writer);
    }
    (Shape::List(element), Value::List(items)) => {
      writer.push_byte(b'[');
      for (i, item) in items.iter().enumerate() {
        if i != 0 {
          writer.push_byte(b',');
        }
        write_value(plan, &element.shape, item, writer);
      }
      writer.push_byte(b']');
    }
    (Shape::Map { key, value: element }, Value::Map(entries)) => {
      writer.push_byte(b'{');
      for (i, (k, v)) in entries.iter().enumerate() {
        if i != 0 {
          writer.push_byte(b',');
        }
        write_key(plan, key, k, writer);
        writer.push_byte(b':');
        write_value(plan, &element.shape, v, writer);
      }
      writer.push_byte(b'}');
    }
    _ => writer.write_null(),
  }
}

pub(crate) fn write_key(plan: &CodecPlan, shape: &Shape, value: &Value, writer: &mut Writer) {
  match (shape, value) {
    (Shape::Scalar(Scalar::String), Value::Str(value)) => writer.write_str(value),
    (Shape::Scalar(scalar), Value::Int(value)) if scalar.is_integer() => {
      writer.write_quoted_i64(*value);
    }
    (Shape::Scalar(scalar), Value::UInt(value)) if scalar.is_integer() => {
      writer.write_quoted_u64(*value);
    }
    (Shape::Scalar(Scalar::Bool), Value::Bool(value)) => {
      writer.push_byte(b'"');
      writer.write_bool(*value);
      writer.push_byte(b'"');
    }
    (Shape::Scalar(Scalar::Guid), Value::Guid(value)) => {
      writer.write_quoted_display(&value.hyphenated());
    }
    (Shape::Enum { ty, mode }, Value::Enum(value)) => {
      let Some(ty) = plan.enum_type(*ty) else {
        writer.write_str("");
        return;
      };
      match (effective_mode(ty, *mode), ty.name_of(*value)) {
        (EnumMode::Text, Some(name)) => writer.write_str(name),
        _ => writer.write_quoted_i64(*value),
      }
    }
    _ => writer.write_str(""),
  }
}

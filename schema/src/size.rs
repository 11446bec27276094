use core::fmt::Display;

use chrono::{DateTime, FixedOffset};
use exact_json::size::{
  NULL_LEN, u64_len, usize_len, i64_len, str_len, f64_len, f32_len, bool_len, display_len,
};

use crate::{
  SchemaId, EnumMode, Scalar, Shape, FieldDescriptor, EnumType, CodecPlan, Value, Object,
};

/// The length of a quoted, hyphenated GUID.
const GUID_LEN: usize = 2 + uuid::fmt::Hyphenated::LENGTH;

/// The RFC 3339 text of a date and time, with as many fractional digits as it needs.
#[inline(always)]
pub(crate) fn rfc3339(value: &DateTime<FixedOffset>) -> impl Display {
  value.format("%Y-%m-%dT%H:%M:%S%.f%:z")
}

/// The value of an `f64` field declared as an `f32`.
#[allow(clippy::cast_possible_truncation)]
#[inline(always)]
pub(crate) fn narrow(value: f64) -> f32 {
  value as f32
}

/// If a field is written, given its value.
#[inline(always)]
pub(crate) fn is_written(field: &FieldDescriptor, value: &Value) -> bool {
  field.is_emitted() && (!(field.nullable && value.is_null()))
}

/// The count written with a field's count marker, if it has one.
#[inline(always)]
pub(crate) fn marker_count(field: &FieldDescriptor, value: &Value) -> Option<usize> {
  if !field.count_marker {
    None?;
  }
  match (&field.shape, value) {
    (Shape::List(_), Value::List(items)) => Some(items.len()),
    (Shape::Map { .. }, Value::Map(entries)) => Some(entries.len()),
    _ => None,
  }
}

/// The mode an enum is written with.
#[inline(always)]
pub(crate) fn effective_mode(ty: &EnumType, mode: Option<EnumMode>) -> EnumMode {
  mode.unwrap_or(ty.default_mode())
}

pub(crate) fn object_size(plan: &CodecPlan, expected: SchemaId, object: &Object) -> usize {
  let Some((schema, discriminator)) = plan.concrete(expected, object) else {
    return NULL_LEN;
  };

  let mut len = 2;
  let mut members = 0usize;
  if let Some(discriminator) = discriminator {
    len += discriminator.len();
    members += 1;
  }
  for (field, value) in schema.fields.iter().zip(&object.fields) {
    if !is_written(field, value) {
      continue;
    }
    if let Some(count) = marker_count(field, value) {
      len += field.marker_key.len() + usize_len(count);
      members += 1;
    }
    len += field.key.len() + field_size(plan, field, value);
    members += 1;
  }
  // Commas
  len + members.saturating_sub(1)
}

#[inline(always)]
fn field_size(plan: &CodecPlan, field: &FieldDescriptor, value: &Value) -> usize {
  match &field.converter {
    Some(converter) => converter.size(value),
    None => value_size(plan, &field.shape, value),
  }
}

fn scalar_size(scalar: Scalar, value: &Value) -> usize {
  match (scalar, value) {
    (Scalar::Bool, Value::Bool(value)) => bool_len(*value),
    (_, Value::Int(value)) if scalar.is_integer() => i64_len(*value),
    (_, Value::UInt(value)) if scalar.is_integer() => u64_len(*value),
    (Scalar::F32, Value::Float(value)) => f32_len(narrow(*value)),
    (Scalar::F64, Value::Float(value)) => f64_len(*value),
    (Scalar::String, Value::Str(value)) => str_len(value),
    (Scalar::Guid, Value::Guid(_)) => GUID_LEN,
    (Scalar::Decimal, Value::Decimal(value)) => display_len(value),
    // These are quoted, and their text never requires escaping
    (Scalar::DateTime, Value::DateTime(value)) => 2 + display_len(&rfc3339(value)),
    (Scalar::Date, Value::Date(value)) => 2 + display_len(value),
    (Scalar::Time, Value::Time(value)) => 2 + display_len(value),
    (Scalar::Version, Value::Version(value)) => 2 + display_len(value),
    _ => NULL_LEN,
  }
}

fn enum_size(ty: &EnumType, mode: Option<EnumMode>, value: i64) -> usize {
  match (effective_mode(ty, mode), ty.name_of(value)) {
    (EnumMode::Text, Some(name)) => str_len(name),
    (EnumMode::Text, None) => 2 + i64_len(value),
    (EnumMode::Number, _) => i64_len(value),
  }
}

pub(crate) fn value_size(plan: &CodecPlan, shape: &Shape, value: &Value) -> usize {
  match (shape, value) {
    (Shape::Scalar(scalar), value) => scalar_size(*scalar, value),
    (Shape::Enum { ty, mode }, Value::Enum(value)) => {
      plan.enum_type(*ty).map_or(NULL_LEN, |ty| enum_size(ty, *mode, *value))
    }
    (Shape::Object(expected), Value::Object(object)) => object_size(plan, *expected, object),
    (Shape::List(element), Value::List(items)) => {
      2 + items.len().saturating_sub(1) +
        items.iter().map(|item| value_size(plan, &element.shape, item)).sum::<usize>()
    }
    (Shape::Map { key, value: element }, Value::Map(entries)) => {
      2 + entries.len().saturating_sub(1) +
        entries
          .iter()
          .map(|(k, v)| key_size(plan, key, k) + 1 + value_size(plan, &element.shape, v))
          .sum::<usize>()
    }
    _ => NULL_LEN,
  }
}

/// The length of a dictionary key, which is always quoted.
///
/// A key whose variant doesn't match its shape is written as the empty string.
pub(crate) fn key_size(plan: &CodecPlan, shape: &Shape, value: &Value) -> usize {
  match (shape, value) {
    (Shape::Scalar(Scalar::String), Value::Str(value)) => str_len(value),
    (Shape::Scalar(scalar), Value::Int(value)) if scalar.is_integer() => 2 + i64_len(*value),
    (Shape::Scalar(scalar), Value::UInt(value)) if scalar.is_integer() => 2 + u64_len(*value),
    (Shape::Scalar(Scalar::Bool), Value::Bool(value)) => 2 + bool_len(*value),
    (Shape::Scalar(Scalar::Guid), Value::Guid(_)) => GUID_LEN,
    (Shape::Enum { ty, mode }, Value::Enum(value)) => {
      let Some(ty) = plan.enum_type(*ty) else { return 2 };
      match (effective_mode(ty, *mode), ty.name_of(*value)) {
        (EnumMode::Text, Some(name)) => str_len(name),
        _ => 2 + i64_len(*value),
      }
    }
    _ => 2,
  }
}

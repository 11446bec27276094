use alloc::{string::ToString, vec::Vec};
use core::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use semver::Version;
use uuid::Uuid;

use exact_json::{
  JsonError, Cursor, Type, count_list_items, count_dictionary_items, non_finite_from_str,
};

use crate::{
  SchemaId, EnumMode, Scalar, Shape, Element, FieldDescriptor, EnumType, CodecPlan, Value,
  Object, plan::KeySlot, size::effective_mode,
};

/// Parse the text of a number as a decimal, which may use an exponent.
///
/// Decimals with more significant digits than a `Decimal` can represent are rejected rather than
/// rounded.
fn parse_decimal(text: &str) -> Option<Decimal> {
  // `Decimal` doesn't accept a leading `+`, which numbers may have
  let text = text.strip_prefix('+').unwrap_or(text);
  if text.contains(['e', 'E']) {
    return Decimal::from_scientific(text).ok();
  }
  Decimal::from_str_exact(text).ok()
}

/// Apply an enum's policy to a value read, substituting the fallback for non-members.
fn enum_policy(ty: &EnumType, value: Option<i64>) -> Option<i64> {
  if let Some(value) = value.filter(|value| ty.contains(*value)) {
    return Some(value);
  }
  let fallback = ty.fallback_value();
  if fallback.is_none() {
    tracing::debug!(ty = ty.name(), ?value, "value isn't a member of the enum");
  }
  fallback
}

/// What a key within an object refers to, once read.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Key {
  Discriminator,
  Slot(KeySlot),
  Unknown,
}

/// The state of an object being read, for a specific schema.
struct ObjectState {
  schema: SchemaId,
  fields: Vec<Value>,
  present: Vec<bool>,
  hints: Vec<Option<usize>>,
}

impl ObjectState {
  fn new(schema: SchemaId, fields: usize) -> Self {
    Self {
      schema,
      fields: alloc::vec![Value::Null; fields],
      present: alloc::vec![false; fields],
      hints: alloc::vec![None; fields],
    }
  }
}

/// A decoder of values, as described by a plan, from a cursor.
pub(crate) struct Decoder<'plan, 'text> {
  plan: &'plan CodecPlan,
  pub(crate) cursor: Cursor<'text>,
}

impl<'plan, 'text> Decoder<'plan, 'text> {
  pub(crate) fn new(plan: &'plan CodecPlan, cursor: Cursor<'text>) -> Self {
    Self { plan, cursor }
  }

  /// Skip a value of a type other than expected.
  #[inline(always)]
  fn mismatch<T>(&mut self) -> Result<Option<T>, JsonError> {
    self.cursor.skip_value()?;
    Ok(None)
  }

  /// The amount of items to reserve space for within a collection.
  ///
  /// With a count marker, the marker is used, bounded by the remaining text so a bogus marker
  /// can't cause an excessive allocation. Without one, the collection is counted in advance.
  fn capacity(&self, hint: Option<usize>, count: fn(&str, usize) -> usize) -> usize {
    match hint {
      Some(hint) => hint.min(self.cursor.remaining()),
      None => count(self.cursor.text(), self.cursor.position() + 1),
    }
  }

  /// Read an object of the expected schema, or a schema derived from it.
  /*
    The object is read as a state machine. Each key is read, then:
    - If the expected schema is part of a polymorphic hierarchy and this is the first key, it may
      be the discriminator, selecting the concrete schema the remaining keys are matched against.
      When the expected schema is the base of the hierarchy, the first key must be the
      discriminator. Otherwise, without a discriminator, the object is of the expected schema.
    - A key of the schema dispatches to its field. A field which fails marks the object as failed.
    - A key unknown to the schema is skipped.
    - Once the object has failed, all remaining values are skipped.
    The object is finalized upon its closing brace, failing if any required field was absent.
  */
  pub(crate) fn read_object(&mut self, expected: SchemaId) -> Result<Option<Object>, JsonError> {
    let plan = self.plan;
    if self.cursor.peek() != Some(b'{') {
      return self.mismatch();
    }
    let Some(mut schema) = plan.schema(expected) else { return self.mismatch() };
    let hierarchy = plan.hierarchy(expected);

    self.cursor.enter()?;
    self.cursor.expect(b'{')?;
    self.cursor.skip_whitespace();

    let mut state = ObjectState::new(expected, schema.fields.len());
    let mut failed = false;
    let mut first = true;
    let mut awaiting_discriminator = schema.polymorphic.is_some();
    if !self.cursor.eat(b'}') {
      loop {
        let key = self.cursor.read_str_with(|key| {
          if first && hierarchy.is_some_and(|map| map.discriminator_key() == key) {
            return Key::Discriminator;
          }
          schema.keys.get(key).copied().map_or(Key::Unknown, Key::Slot)
        })?;
        self.cursor.skip_whitespace();
        self.cursor.expect(b':')?;
        self.cursor.skip_whitespace();
        first = false;
        if awaiting_discriminator && (key != Key::Discriminator) {
          tracing::debug!(schema = schema.name(), "object doesn't start with its discriminator");
          failed = true;
        }
        awaiting_discriminator = false;

        match key {
          _ if failed => self.cursor.skip_value()?,
          Key::Discriminator => match self.read_discriminator(expected)? {
            Some(concrete) => {
              schema = plan.schema(concrete).unwrap_or(schema);
              state = ObjectState::new(concrete, schema.fields.len());
            }
            None => failed = true,
          },
          Key::Slot(KeySlot::Field(i)) => {
            let field = &schema.fields[i];
            match self.read_field(field, state.hints[i])? {
              Some(value) => {
                state.fields[i] = value;
                state.present[i] = true;
              }
              None => {
                tracing::debug!(schema = schema.name(), field = field.name(), "field is invalid");
                failed = true;
              }
            }
          }
          Key::Slot(KeySlot::CountMarker(i)) => {
            if self.cursor.peek_type()? == Type::Number {
              let count = self.cursor.read_number()?.u64();
              state.hints[i] = count.and_then(|count| usize::try_from(count).ok());
            } else {
              self.cursor.skip_value()?;
            }
          }
          Key::Unknown => self.cursor.skip_value()?,
        }

        if !self.cursor.next_or_close(b'}')? {
          break;
        }
      }
    }
    self.cursor.leave();

    if failed || awaiting_discriminator {
      return Ok(None);
    }
    for (field, present) in schema.fields.iter().zip(&state.present) {
      if field.is_required() && (!present) {
        tracing::debug!(schema = schema.name(), field = field.name(), "required field is absent");
        return Ok(None);
      }
    }
    Ok(Some(Object::new(state.schema, state.fields)))
  }

  /// Read a discriminator, returning the concrete schema it selects.
  fn read_discriminator(&mut self, expected: SchemaId) -> Result<Option<SchemaId>, JsonError> {
    let plan = self.plan;
    let Some(map) = plan.hierarchy(expected) else { return self.mismatch() };
    let concrete = match self.cursor.peek_type()? {
      Type::Number => self.cursor.read_number()?.i64().and_then(|value| map.resolve_int(value)),
      Type::String => self.cursor.read_str_with(|value| map.resolve_str(value))?,
      _ => return self.mismatch(),
    };
    // The variant must also be a variant of the schema expected, which may be within the hierarchy
    let concrete = concrete.filter(|concrete| plan.is_a(*concrete, expected));
    if concrete.is_none() {
      tracing::debug!(expected = ?expected, "unrecognized discriminator");
    }
    Ok(concrete)
  }

  fn read_field(
    &mut self,
    field: &FieldDescriptor,
    hint: Option<usize>,
  ) -> Result<Option<Value>, JsonError> {
    if self.cursor.eat_null() {
      return Ok(field.nullable.then_some(Value::Null));
    }
    match &field.converter {
      Some(converter) => converter.read(&mut self.cursor),
      None => self.read_shape(&field.shape, hint),
    }
  }

  fn read_element(&mut self, element: &Element) -> Result<Option<Value>, JsonError> {
    if self.cursor.eat_null() {
      return Ok(element.nullable.then_some(Value::Null));
    }
    self.read_shape(&element.shape, None)
  }

  fn read_scalar(&mut self, scalar: Scalar) -> Result<Option<Value>, JsonError> {
    Ok(match (scalar, self.cursor.peek_type()?) {
      (Scalar::Bool, Type::Bool) => self.cursor.read_literal()?.as_bool().map(Value::Bool),
      (_, Type::Number) if scalar.is_signed() => {
        self.cursor.read_number()?.i64().filter(|value| scalar.fits_i64(*value)).map(Value::Int)
      }
      (_, Type::Number) if scalar.is_integer() => {
        self.cursor.read_number()?.u64().filter(|value| scalar.fits_u64(*value)).map(Value::UInt)
      }
      (Scalar::F32, Type::Number) => {
        self.cursor.read_number()?.f32().map(|value| Value::Float(f64::from(value)))
      }
      (Scalar::F64, Type::Number) => self.cursor.read_number()?.f64().map(Value::Float),
      (Scalar::F32 | Scalar::F64, Type::String) => {
        self.cursor.read_str_with(non_finite_from_str)?.map(Value::Float)
      }
      (Scalar::String, Type::String) => Some(Value::Str(self.cursor.read_string()?.into_owned())),
      (Scalar::Guid, Type::String) => {
        self.cursor.read_str_with(|text| Uuid::try_parse(text).ok())?.map(Value::Guid)
      }
      (Scalar::Decimal, Type::Number) => {
        parse_decimal(self.cursor.read_number()?.as_str()).map(Value::Decimal)
      }
      (Scalar::DateTime, Type::String) => self
        .cursor
        .read_str_with(|text| DateTime::parse_from_rfc3339(text).ok())?
        .map(Value::DateTime),
      (Scalar::Date, Type::String) => {
        self.cursor.read_str_with(|text| NaiveDate::from_str(text).ok())?.map(Value::Date)
      }
      (Scalar::Time, Type::String) => {
        self.cursor.read_str_with(|text| NaiveTime::from_str(text).ok())?.map(Value::Time)
      }
      (Scalar::Version, Type::String) => {
        self.cursor.read_str_with(|text| Version::parse(text).ok())?.map(Value::Version)
      }
      _ => self.mismatch()?,
    })
  }

  fn read_enum(&mut self, ty: &EnumType, mode: EnumMode) -> Result<Option<Value>, JsonError> {
    let value = match (mode, self.cursor.peek_type()?) {
      (EnumMode::Text, Type::String) => self.cursor.read_str_with(|name| ty.value_of(name))?,
      (EnumMode::Number, Type::Number) => self.cursor.read_number()?.i64(),
      // A number for an enum written as text, or text for an enum written as a number
      (_, Type::Number) => {
        self.cursor.read_number()?;
        None
      }
      (_, Type::String) => {
        self.cursor.skip_string()?;
        None
      }
      _ => return self.mismatch(),
    };
    Ok(enum_policy(ty, value).map(Value::Enum))
  }

  fn read_shape(&mut self, shape: &Shape, hint: Option<usize>) -> Result<Option<Value>, JsonError> {
    let plan = self.plan;
    match shape {
      Shape::Scalar(scalar) => self.read_scalar(*scalar),
      Shape::Enum { ty, mode } => match plan.enum_type(*ty) {
        Some(ty) => self.read_enum(ty, effective_mode(ty, *mode)),
        None => self.mismatch(),
      },
      Shape::Object(expected) => Ok(self.read_object(*expected)?.map(Value::Object)),
      Shape::List(element) => self.read_list(element, hint),
      Shape::Map { key, value } => self.read_map(key, value, hint),
    }
  }

  /// Read a list. Any invalid element invalidates the entire list.
  fn read_list(
    &mut self,
    element: &Element,
    hint: Option<usize>,
  ) -> Result<Option<Value>, JsonError> {
    if self.cursor.peek() != Some(b'[') {
      return self.mismatch();
    }
    let mut items = Vec::with_capacity(self.capacity(hint, count_list_items));

    self.cursor.enter()?;
    self.cursor.expect(b'[')?;
    self.cursor.skip_whitespace();
    let mut failed = false;
    if !self.cursor.eat(b']') {
      loop {
        if failed {
          self.cursor.skip_value()?;
        } else {
          match self.read_element(element)? {
            Some(item) => items.push(item),
            None => failed = true,
          }
        }
        if !self.cursor.next_or_close(b']')? {
          break;
        }
      }
    }
    self.cursor.leave();

    Ok((!failed).then_some(Value::List(items)))
  }

  /// Read a dictionary. An entry with an invalid key or value is dropped.
  fn read_map(
    &mut self,
    key: &Shape,
    element: &Element,
    hint: Option<usize>,
  ) -> Result<Option<Value>, JsonError> {
    if self.cursor.peek() != Some(b'{') {
      return self.mismatch();
    }
    let mut entries = Vec::with_capacity(self.capacity(hint, count_dictionary_items));

    self.cursor.enter()?;
    self.cursor.expect(b'{')?;
    self.cursor.skip_whitespace();
    if !self.cursor.eat(b'}') {
      loop {
        let plan = self.plan;
        let k = self.cursor.read_str_with(|text| read_key(plan, key, text))?;
        self.cursor.skip_whitespace();
        self.cursor.expect(b':')?;
        self.cursor.skip_whitespace();
        let v = self.read_element(element)?;
        match (k, v) {
          (Some(k), Some(v)) => entries.push((k, v)),
          (k, v) => {
            tracing::debug!(valid_key = k.is_some(), valid_value = v.is_some(), "dropping entry");
          }
        }
        if !self.cursor.next_or_close(b'}')? {
          break;
        }
      }
    }
    self.cursor.leave();

    Ok(Some(Value::Map(entries)))
  }
}

/// Interpret the text of a dictionary key.
fn read_key(plan: &CodecPlan, shape: &Shape, text: &str) -> Option<Value> {
  match shape {
    Shape::Scalar(Scalar::String) => Some(Value::Str(text.to_string())),
    Shape::Scalar(scalar) if scalar.is_signed() => {
      text.parse::<i64>().ok().filter(|value| scalar.fits_i64(*value)).map(Value::Int)
    }
    Shape::Scalar(scalar) if scalar.is_integer() => {
      text.parse::<u64>().ok().filter(|value| scalar.fits_u64(*value)).map(Value::UInt)
    }
    Shape::Scalar(Scalar::Bool) => match text {
      "true" => Some(Value::Bool(true)),
      "false" => Some(Value::Bool(false)),
      _ => None,
    },
    Shape::Scalar(Scalar::Guid) => Uuid::try_parse(text).ok().map(Value::Guid),
    Shape::Enum { ty, mode } => {
      let ty = plan.enum_type(*ty)?;
      let value = match effective_mode(ty, *mode) {
        EnumMode::Text => ty.value_of(text),
        EnumMode::Number => text.parse::<i64>().ok(),
      };
      enum_policy(ty, value).map(Value::Enum)
    }
    _ => None,
  }
}

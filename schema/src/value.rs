use alloc::{string::String, vec::Vec};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use semver::Version;
use uuid::Uuid;

use crate::{SchemaId, CodecPlan};

/// A value, interpreted through the [`Shape`](crate::Shape) of the field holding it.
///
/// Values aren't self-describing. An `Int` may be written as a number, a quoted dictionary key,
/// or an enum member's name, depending on its shape. A value whose variant doesn't match its
/// shape has no encoding and is written as `null`.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
  /// `null`, or an absent nullable field.
  Null,
  /// A boolean.
  Bool(bool),
  /// A signed integer.
  Int(i64),
  /// An unsigned integer.
  UInt(u64),
  /// A float.
  Float(f64),
  /// A string.
  Str(String),
  /// A GUID.
  Guid(Uuid),
  /// A decimal.
  Decimal(Decimal),
  /// A date and time with an offset.
  DateTime(DateTime<FixedOffset>),
  /// A date.
  Date(NaiveDate),
  /// A time of day.
  Time(NaiveTime),
  /// A semantic version.
  Version(Version),
  /// An enum, by its underlying value.
  Enum(i64),
  /// An object.
  Object(Object),
  /// A list.
  List(Vec<Value>),
  /// A dictionary, in the order its entries are written.
  Map(Vec<(Value, Value)>),
}

impl Value {
  /// If this is `null`.
  #[inline(always)]
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// This value as an object.
  #[inline(always)]
  pub fn as_object(&self) -> Option<&Object> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }

  /// This value as a string.
  #[inline(always)]
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(str) => Some(str),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Int(value)
  }
}

impl From<u64> for Value {
  fn from(value: u64) -> Self {
    Value::UInt(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Float(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Str(value.into())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Str(value)
  }
}

impl From<Uuid> for Value {
  fn from(value: Uuid) -> Self {
    Value::Guid(value)
  }
}

impl From<Decimal> for Value {
  fn from(value: Decimal) -> Self {
    Value::Decimal(value)
  }
}

impl From<DateTime<FixedOffset>> for Value {
  fn from(value: DateTime<FixedOffset>) -> Self {
    Value::DateTime(value)
  }
}

impl From<NaiveDate> for Value {
  fn from(value: NaiveDate) -> Self {
    Value::Date(value)
  }
}

impl From<NaiveTime> for Value {
  fn from(value: NaiveTime) -> Self {
    Value::Time(value)
  }
}

impl From<Version> for Value {
  fn from(value: Version) -> Self {
    Value::Version(value)
  }
}

impl From<Object> for Value {
  fn from(value: Object) -> Self {
    Value::Object(value)
  }
}

/// An object: the values of a schema's fields, in the schema's field order.
#[derive(Clone, PartialEq, Debug)]
pub struct Object {
  pub(crate) schema: SchemaId,
  pub(crate) fields: Vec<Value>,
}

impl Object {
  /// An object of a schema, with one value per field of the schema.
  ///
  /// [`CodecPlan::object`] offers a way to create objects by field name.
  #[inline(always)]
  pub fn new(schema: SchemaId, fields: Vec<Value>) -> Self {
    Self { schema, fields }
  }

  /// The schema of this object.
  #[inline(always)]
  pub fn schema(&self) -> SchemaId {
    self.schema
  }

  /// The values of this object's fields.
  #[inline(always)]
  pub fn fields(&self) -> &[Value] {
    &self.fields
  }

  /// Mutable access to the values of this object's fields.
  #[inline(always)]
  pub fn fields_mut(&mut self) -> &mut [Value] {
    &mut self.fields
  }

  /// The value of a field, by name.
  pub fn get<'value>(&'value self, plan: &CodecPlan, name: &str) -> Option<&'value Value> {
    let i = plan.schema(self.schema)?.field_index(name)?;
    self.fields.get(i)
  }
}

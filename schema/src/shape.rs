use alloc::boxed::Box;

use crate::{SchemaId, EnumId};

/// A scalar type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Scalar {
  /// A boolean.
  Bool,
  /// An `i8`.
  I8,
  /// An `i16`.
  I16,
  /// An `i32`.
  I32,
  /// An `i64`.
  I64,
  /// A `u8`.
  U8,
  /// A `u16`.
  U16,
  /// A `u32`.
  U32,
  /// A `u64`.
  U64,
  /// An `f32`, written with the shortest text which reads back as the same `f32`.
  F32,
  /// An `f64`.
  F64,
  /// A string.
  String,
  /// A GUID, written as a lower-case hyphenated string.
  Guid,
  /// A decimal, written as a number with its scale preserved (`1.50`).
  ///
  /// Exponent forms (`1.5e2`) are accepted when read.
  Decimal,
  /// A date and time with an offset, written as an RFC 3339 string.
  DateTime,
  /// A date, written as a `YYYY-MM-DD` string.
  Date,
  /// A time of day, written as an `HH:MM:SS` string with any fraction of a second.
  Time,
  /// A semantic version, written as a string.
  Version,
}

impl Scalar {
  /// If this is one of the integer types.
  #[inline(always)]
  pub fn is_integer(self) -> bool {
    self.is_signed() || matches!(self, Scalar::U8 | Scalar::U16 | Scalar::U32 | Scalar::U64)
  }

  /// If this is one of the signed integer types.
  #[inline(always)]
  pub fn is_signed(self) -> bool {
    matches!(self, Scalar::I8 | Scalar::I16 | Scalar::I32 | Scalar::I64)
  }

  /// If this may be the key of a dictionary.
  ///
  /// Floats, decimals, and the date and version types have no canonical key text.
  #[inline(always)]
  pub fn is_key(self) -> bool {
    self.is_integer() || matches!(self, Scalar::Bool | Scalar::String | Scalar::Guid)
  }

  /// If a signed value is within this integer type's range.
  pub(crate) fn fits_i64(self, value: i64) -> bool {
    match self {
      Scalar::I8 => i8::try_from(value).is_ok(),
      Scalar::I16 => i16::try_from(value).is_ok(),
      Scalar::I32 => i32::try_from(value).is_ok(),
      Scalar::I64 => true,
      _ => false,
    }
  }

  /// If an unsigned value is within this integer type's range.
  pub(crate) fn fits_u64(self, value: u64) -> bool {
    match self {
      Scalar::U8 => u8::try_from(value).is_ok(),
      Scalar::U16 => u16::try_from(value).is_ok(),
      Scalar::U32 => u32::try_from(value).is_ok(),
      Scalar::U64 => true,
      _ => false,
    }
  }
}

/// How an enum is written.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum EnumMode {
  /// As the name of its member.
  #[default]
  Text,
  /// As its underlying integer.
  Number,
}

/// The shape of a value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Shape {
  /// A scalar.
  Scalar(Scalar),
  /// An enum, with an optional mode overriding the enum type's own.
  Enum {
    /// The enum type.
    ty: EnumId,
    /// The mode overriding the enum type's own.
    mode: Option<EnumMode>,
  },
  /// An object of the specified schema, or any schema derived from it.
  Object(SchemaId),
  /// A list, written as an array.
  List(Box<Element>),
  /// A dictionary, written as an object whose keys are the dictionary's keys as text.
  Map {
    /// The shape of the keys.
    key: Box<Shape>,
    /// The values.
    value: Box<Element>,
  },
}

impl Shape {
  /// An enum, in the enum type's own mode.
  #[inline(always)]
  pub fn enumeration(ty: EnumId) -> Self {
    Shape::Enum { ty, mode: None }
  }

  /// A list of the specified elements.
  #[inline(always)]
  pub fn list(element: Element) -> Self {
    Shape::List(Box::new(element))
  }

  /// A dictionary with the specified keys and values.
  #[inline(always)]
  pub fn map(key: Shape, value: Element) -> Self {
    Shape::Map { key: Box::new(key), value: Box::new(value) }
  }

  /// If this is a list or dictionary.
  #[inline(always)]
  pub fn is_collection(&self) -> bool {
    matches!(self, Shape::List(_) | Shape::Map { .. })
  }
}

impl From<Scalar> for Shape {
  fn from(scalar: Scalar) -> Self {
    Shape::Scalar(scalar)
  }
}

/// An element of a list, or a value of a dictionary.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Element {
  /// The element's shape.
  pub shape: Shape,
  /// If the element may be `null`.
  pub nullable: bool,
}

impl Element {
  /// A non-nullable element.
  #[inline(always)]
  pub fn new(shape: impl Into<Shape>) -> Self {
    Self { shape: shape.into(), nullable: false }
  }

  /// A nullable element.
  #[inline(always)]
  pub fn nullable(shape: impl Into<Shape>) -> Self {
    Self { shape: shape.into(), nullable: true }
  }
}

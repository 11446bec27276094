use core::fmt;
use alloc::{string::String, vec::Vec};

use exact_json::Writer;

use crate::SchemaId;

/// The discriminator key used when a polymorphic map doesn't specify one.
pub const DEFAULT_DISCRIMINATOR: &str = "$type";

/// The value identifying a concrete schema within a polymorphic hierarchy.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Discriminator {
  /// An integer, written as a number.
  Int(i64),
  /// A string.
  Str(String),
}

impl Discriminator {
  /// Write this discriminator as a value.
  pub(crate) fn write(&self, writer: &mut Writer) {
    match self {
      Discriminator::Int(value) => writer.write_i64(*value),
      Discriminator::Str(value) => writer.write_str(value),
    }
  }
}

impl From<i64> for Discriminator {
  fn from(value: i64) -> Self {
    Discriminator::Int(value)
  }
}

impl From<&str> for Discriminator {
  fn from(value: &str) -> Self {
    Discriminator::Str(value.into())
  }
}

impl fmt::Display for Discriminator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Discriminator::Int(value) => write!(f, "{value}"),
      Discriminator::Str(value) => write!(f, "{value:?}"),
    }
  }
}

/// The concrete schemas of a polymorphic hierarchy, identified by their discriminators.
///
/// The map is declared on the base of the hierarchy, which may list itself. Where the base is
/// expected, every object is written with its discriminator first, and an object read must start
/// with one. Where another schema of the hierarchy is expected, only objects of schemas derived
/// from it carry a discriminator. An object whose schema has no discriminator can't be written
/// where the discriminator is needed, and is written as `null`. When an object is read, a
/// discriminator is only recognized as its first key, selecting the schema the remaining keys are
/// read with.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PolymorphicMap {
  key: String,
  variants: Vec<(Discriminator, SchemaId)>,
}

impl Default for PolymorphicMap {
  fn default() -> Self {
    Self::new()
  }
}

impl PolymorphicMap {
  /// An empty map, using the default discriminator key.
  pub fn new() -> Self {
    Self { key: DEFAULT_DISCRIMINATOR.into(), variants: Vec::new() }
  }

  /// Use a key other than `$type` for the discriminator.
  #[must_use]
  pub fn key(mut self, key: impl Into<String>) -> Self {
    self.key = key.into();
    self
  }

  /// Add a concrete schema.
  #[must_use]
  pub fn variant(mut self, discriminator: impl Into<Discriminator>, schema: SchemaId) -> Self {
    self.variants.push((discriminator.into(), schema));
    self
  }

  /// The discriminator key.
  #[inline(always)]
  pub fn discriminator_key(&self) -> &str {
    &self.key
  }

  /// The concrete schemas, with their discriminators.
  #[inline(always)]
  pub fn variants(&self) -> &[(Discriminator, SchemaId)] {
    &self.variants
  }

  /// The discriminator for a schema.
  pub fn discriminator_of(&self, schema: SchemaId) -> Option<&Discriminator> {
    self
      .variants
      .iter()
      .find(|(_, variant)| *variant == schema)
      .map(|(discriminator, _)| discriminator)
  }

  /// The schema for an integer discriminator.
  pub(crate) fn resolve_int(&self, value: i64) -> Option<SchemaId> {
    self.variants.iter().find_map(|(discriminator, schema)| {
      (*discriminator == Discriminator::Int(value)).then_some(*schema)
    })
  }

  /// The schema for a string discriminator.
  pub(crate) fn resolve_str(&self, value: &str) -> Option<SchemaId> {
    self.variants.iter().find_map(|(discriminator, schema)| match discriminator {
      Discriminator::Str(str) if str == value => Some(*schema),
      _ => None,
    })
  }
}

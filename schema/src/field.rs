use alloc::{string::String, sync::Arc};

use exact_json::Writer;

use crate::{EnumMode, Shape, Converter};

/// Where a field was declared and how it's bound when a value is reconstructed.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Origin {
  /// If the field was declared by a base schema.
  pub inherited: bool,
  /// If the field is bound by the constructor, rather than set as a property afterwards.
  pub constructor_bound: bool,
}

/// A field of a schema.
///
/// Fields are declared with [`FieldDescriptor::new`] and configured with its builder-style
/// methods before being added to a [`PlanBuilder`](crate::PlanBuilder).
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
  pub(crate) name: String,
  pub(crate) rename: Option<String>,
  pub(crate) shape: Shape,
  pub(crate) nullable: bool,
  pub(crate) enum_mode: Option<EnumMode>,
  pub(crate) converter: Option<Arc<dyn Converter>>,
  pub(crate) ignore: bool,
  pub(crate) count_marker: bool,
  pub(crate) origin: Origin,

  // Set when the plan is built
  pub(crate) key: String,
  pub(crate) marker_key: String,
}

impl FieldDescriptor {
  /// A non-nullable field, written with its name as its key.
  pub fn new(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
    Self {
      name: name.into(),
      rename: None,
      shape: shape.into(),
      nullable: false,
      enum_mode: None,
      converter: None,
      ignore: false,
      count_marker: false,
      origin: Origin::default(),
      key: String::new(),
      marker_key: String::new(),
    }
  }

  /// Write this field under a key other than its name.
  #[must_use]
  pub fn rename(mut self, wire_key: impl Into<String>) -> Self {
    self.rename = Some(wire_key.into());
    self
  }

  /// Allow this field to be `null`.
  ///
  /// A nullable field which is `null` is omitted when written and may be absent when read.
  #[must_use]
  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  /// Override the mode of the enum type of this field.
  #[must_use]
  pub fn enum_mode(mut self, mode: EnumMode) -> Self {
    self.enum_mode = Some(mode);
    self
  }

  /// Size, write, and read this field with a converter instead of its shape.
  #[must_use]
  pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
    self.converter = Some(converter);
    self
  }

  /// Exclude this field from serialization.
  ///
  /// This has no effect on a constructor-bound field, as the value couldn't be reconstructed
  /// without it.
  #[must_use]
  pub fn ignore(mut self) -> Self {
    self.ignore = true;
    self
  }

  /// Mark this field as bound by the constructor.
  #[must_use]
  pub fn constructor_bound(mut self) -> Self {
    self.origin.constructor_bound = true;
    self
  }

  /// Write a `"$<name>": <count>` marker before this collection.
  ///
  /// The marker is keyed by the field's name, even when the field is renamed.
  #[must_use]
  pub fn count_marker(mut self) -> Self {
    self.count_marker = true;
    self
  }

  /// The name of this field.
  #[inline(always)]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The key this field is written under.
  #[inline(always)]
  pub fn wire_key(&self) -> &str {
    self.rename.as_deref().unwrap_or(&self.name)
  }

  /// The shape of this field.
  #[inline(always)]
  pub fn shape(&self) -> &Shape {
    &self.shape
  }

  /// If this field may be `null`.
  #[inline(always)]
  pub fn is_nullable(&self) -> bool {
    self.nullable
  }

  /// Where this field was declared and how it's bound.
  #[inline(always)]
  pub fn origin(&self) -> Origin {
    self.origin
  }

  /// If this field has a count marker.
  #[inline(always)]
  pub fn has_count_marker(&self) -> bool {
    self.count_marker
  }

  /// The converter for this field, if it has one.
  #[inline(always)]
  pub fn custom_converter(&self) -> Option<&dyn Converter> {
    self.converter.as_deref()
  }

  /// If this field is serialized, which is all fields not ignored and all constructor-bound
  /// fields.
  #[inline(always)]
  pub fn is_emitted(&self) -> bool {
    (!self.ignore) || self.origin.constructor_bound
  }

  /// If this field must be present for an object to be read.
  #[inline(always)]
  pub fn is_required(&self) -> bool {
    (!self.nullable) && self.is_emitted()
  }

  /// Precompute the text of the keys.
  pub(crate) fn encode_keys(&mut self) {
    let wire_key = self.wire_key();

    let mut key = Writer::default();
    key.write_str(wire_key);
    key.push_byte(b':');

    let mut marker_key = Writer::default();
    if self.count_marker {
      marker_key.push_byte(b'"');
      marker_key.push_byte(b'$');
      marker_key.write_escaped(&self.name);
      marker_key.push_byte(b'"');
      marker_key.push_byte(b':');
    }

    self.key = key.into_string();
    self.marker_key = marker_key.into_string();
  }

  /// The key of this field's count marker, unquoted.
  pub(crate) fn marker_wire_key(&self) -> String {
    let mut key = String::from("$");
    key.push_str(&self.name);
    key
  }
}

#[test]
fn ignore_rule() {
  use crate::Scalar;

  let plain = FieldDescriptor::new("Plain", Scalar::I32);
  assert!(plain.is_emitted() && plain.is_required());

  let nullable = FieldDescriptor::new("Nullable", Scalar::String).nullable();
  assert!(nullable.is_emitted() && (!nullable.is_required()));

  let ignored = FieldDescriptor::new("Ignored", Scalar::I32).ignore();
  assert!((!ignored.is_emitted()) && (!ignored.is_required()));

  // Ignoring a constructor-bound field is a no-op
  let bound = FieldDescriptor::new("Bound", Scalar::I32).ignore().constructor_bound();
  assert!(bound.is_emitted() && bound.is_required());
}

#[test]
fn keys() {
  use crate::Scalar;

  let mut field = FieldDescriptor::new("Items", Scalar::I32).rename("it\"ems").count_marker();
  field.encode_keys();
  assert_eq!(field.wire_key(), "it\"ems");
  assert_eq!(field.key, r#""it\"ems":"#);
  assert_eq!(field.marker_key, r#""$Items":"#);
  assert_eq!(field.marker_wire_key(), "$Items");

  let mut field = FieldDescriptor::new("It\"ems", Scalar::I32).rename("items").count_marker();
  field.encode_keys();
  assert_eq!(field.key, r#""items":"#);
  assert_eq!(field.marker_key, r#""$It\"ems":"#);
}

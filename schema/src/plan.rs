use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::{
  SchemaId, EnumId, SchemaError, FieldDescriptor, EnumType, PolymorphicMap, Value, Object,
  SchemaCodec,
};

/// What a key within an object refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum KeySlot {
  /// The field at this index.
  Field(usize),
  /// The count marker of the field at this index.
  CountMarker(usize),
}

/// A schema: an ordered set of fields, flattened across inheritance.
#[derive(Clone, Debug)]
pub struct Schema {
  pub(crate) name: String,
  pub(crate) fields: Vec<FieldDescriptor>,
  pub(crate) base: Option<SchemaId>,
  pub(crate) polymorphic: Option<PolymorphicMap>,
  /// The schema declaring the polymorphic map this schema is part of.
  pub(crate) hierarchy: Option<SchemaId>,
  /// The discriminator key and value, as written, if this is a variant of its hierarchy.
  pub(crate) discriminator: Option<String>,
  pub(crate) keys: BTreeMap<String, KeySlot>,
}

impl Schema {
  /// The name of this schema.
  #[inline(always)]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The fields of this schema: those inherited, base-most first, then its own, each in
  /// declaration order.
  #[inline(always)]
  pub fn fields(&self) -> &[FieldDescriptor] {
    &self.fields
  }

  /// The index of the field with this name.
  pub fn field_index(&self, name: &str) -> Option<usize> {
    self.fields.iter().position(|field| field.name == name)
  }

  /// The schema this schema is derived from.
  #[inline(always)]
  pub fn base(&self) -> Option<SchemaId> {
    self.base
  }

  /// The polymorphic map declared by this schema.
  #[inline(always)]
  pub fn polymorphic(&self) -> Option<&PolymorphicMap> {
    self.polymorphic.as_ref()
  }
}

/// A validated, immutable set of schemas and enum types.
#[derive(Clone, Debug)]
pub struct CodecPlan {
  pub(crate) schemas: Vec<Schema>,
  pub(crate) enums: Vec<EnumType>,
}

impl CodecPlan {
  /// A schema.
  #[inline(always)]
  pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
    self.schemas.get(id.0)
  }

  /// An enum type.
  #[inline(always)]
  pub fn enum_type(&self, id: EnumId) -> Option<&EnumType> {
    self.enums.get(id.0)
  }

  /// The ID of the schema with this name.
  pub fn schema_id(&self, name: &str) -> Option<SchemaId> {
    self.schemas.iter().position(|schema| schema.name == name).map(SchemaId)
  }

  /// The codec for a schema.
  pub fn codec(&self, id: SchemaId) -> Result<SchemaCodec<'_>, SchemaError> {
    if self.schema(id).is_none() {
      Err(SchemaError::UnknownSchema(id))?;
    }
    Ok(SchemaCodec::new(self, id))
  }

  /// Create an object of a schema from its fields' values, by field name.
  ///
  /// Fields not specified are `null`.
  pub fn object<'name>(
    &self,
    id: SchemaId,
    values: impl IntoIterator<Item = (&'name str, Value)>,
  ) -> Result<Object, SchemaError> {
    let schema = self.schema(id).ok_or(SchemaError::UnknownSchema(id))?;
    let mut fields = Vec::with_capacity(schema.fields.len());
    fields.resize(schema.fields.len(), Value::Null);
    for (name, value) in values {
      let Some(i) = schema.field_index(name) else {
        return Err(SchemaError::UnknownField { schema: schema.name.clone(), field: name.into() });
      };
      fields[i] = value;
    }
    Ok(Object::new(id, fields))
  }

  /// If `schema` is `ancestor` or derived from it.
  pub fn is_a(&self, schema: SchemaId, ancestor: SchemaId) -> bool {
    let mut current = Some(schema);
    while let Some(id) = current {
      if id == ancestor {
        return true;
      }
      current = self.schema(id).and_then(|schema| schema.base);
    }
    false
  }

  /// The schema to write an object with, and the discriminator to write first, given the schema
  /// expected.
  ///
  /// Through the base of a polymorphic hierarchy, every object is written with its discriminator.
  /// Through another schema of the hierarchy, only objects of schemas derived from it are. This is
  /// `None` if the object can't be written so it reads back: if its schema isn't the expected
  /// schema nor derived from it, or it requires a discriminator and has none.
  pub(crate) fn concrete(
    &self,
    expected: SchemaId,
    object: &Object,
  ) -> Option<(&Schema, Option<&str>)> {
    if !self.is_a(object.schema, expected) {
      None?;
    }
    let schema = self.schema(object.schema)?;
    let expected_schema = self.schema(expected)?;
    if expected_schema.hierarchy.is_none() ||
      ((object.schema == expected) && expected_schema.polymorphic.is_none())
    {
      return Some((schema, None));
    }
    let Some(discriminator) = schema.discriminator.as_deref() else {
      tracing::debug!(
        schema = schema.name(),
        expected = expected_schema.name(),
        "schema has no discriminator within its hierarchy"
      );
      return None;
    };
    Some((schema, Some(discriminator)))
  }

  /// The polymorphic map applicable when this schema is expected.
  #[inline(always)]
  pub(crate) fn hierarchy(&self, expected: SchemaId) -> Option<&PolymorphicMap> {
    let root = self.schema(expected)?.hierarchy?;
    self.schema(root)?.polymorphic.as_ref()
  }
}

use alloc::{
  collections::{BTreeMap, btree_map::Entry},
  string::{String, ToString},
  vec::Vec,
};

use exact_json::Writer;

use crate::{
  SchemaId, EnumId, SchemaError, Shape, FieldDescriptor, EnumType, PolymorphicMap,
  plan::{KeySlot, Schema, CodecPlan},
};

#[derive(Clone, Debug)]
struct Draft {
  name: String,
  fields: Vec<FieldDescriptor>,
  base: Option<SchemaId>,
  polymorphic: Option<PolymorphicMap>,
}

/// A builder for a [`CodecPlan`].
///
/// Schemas and enum types are registered first, yielding their IDs, so fields may refer to
/// schemas registered later (including their own schema). Everything is validated when the plan
/// is built.
#[derive(Clone, Default, Debug)]
pub struct PlanBuilder {
  schemas: Vec<Draft>,
  enums: Vec<EnumType>,
  error: Option<SchemaError>,
}

fn insert_key(
  keys: &mut BTreeMap<String, KeySlot>,
  schema: &str,
  key: String,
  slot: KeySlot,
) -> Result<(), SchemaError> {
  match keys.entry(key) {
    Entry::Occupied(entry) => {
      Err(SchemaError::DuplicateWireKey { schema: schema.into(), key: entry.key().clone() })
    }
    Entry::Vacant(entry) => {
      entry.insert(slot);
      Ok(())
    }
  }
}

fn validate_enum(ty: &EnumType) -> Result<(), SchemaError> {
  let members = ty.members();
  for (i, (member, _)) in members.iter().enumerate() {
    if members[.. i].iter().any(|(prior, _)| prior == member) {
      Err(SchemaError::DuplicateEnumMember { name: ty.name().into(), member: member.clone() })?;
    }
  }
  if let Some(fallback) = ty.fallback_name() &&
    ty.value_of(fallback).is_none()
  {
    Err(SchemaError::InvalidFallback { name: ty.name().into(), fallback: fallback.into() })?;
  }
  Ok(())
}

impl PlanBuilder {
  /// A builder for an empty plan.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register an enum type.
  pub fn enum_type(&mut self, ty: EnumType) -> EnumId {
    self.enums.push(ty);
    EnumId(self.enums.len() - 1)
  }

  /// Register a schema, without any fields.
  pub fn schema(&mut self, name: impl Into<String>) -> SchemaId {
    self.schemas.push(Draft {
      name: name.into(),
      fields: Vec::new(),
      base: None,
      polymorphic: None,
    });
    SchemaId(self.schemas.len() - 1)
  }

  fn draft(&mut self, id: SchemaId) -> Option<&mut Draft> {
    if id.0 >= self.schemas.len() {
      self.error.get_or_insert(SchemaError::UnknownSchema(id));
    }
    self.schemas.get_mut(id.0)
  }

  /// Declare a field of a schema.
  ///
  /// Fields are written in the order they're declared, after those of the schema's base.
  pub fn field(&mut self, schema: SchemaId, field: FieldDescriptor) -> &mut Self {
    if let Some(draft) = self.draft(schema) {
      draft.fields.push(field);
    }
    self
  }

  /// Declare several fields of a schema.
  pub fn fields(
    &mut self,
    schema: SchemaId,
    fields: impl IntoIterator<Item = FieldDescriptor>,
  ) -> &mut Self {
    if let Some(draft) = self.draft(schema) {
      draft.fields.extend(fields);
    }
    self
  }

  /// Derive a schema from another, inheriting its fields.
  pub fn base(&mut self, schema: SchemaId, base: SchemaId) -> &mut Self {
    if let Some(draft) = self.draft(schema) {
      draft.base = Some(base);
    }
    self
  }

  /// Declare a schema as the base of a polymorphic hierarchy.
  pub fn polymorphic(&mut self, schema: SchemaId, map: PolymorphicMap) -> &mut Self {
    if let Some(draft) = self.draft(schema) {
      draft.polymorphic = Some(map);
    }
    self
  }

  /// The chain of schemas from the base-most to this schema.
  fn chain(&self, id: SchemaId) -> Result<Vec<SchemaId>, SchemaError> {
    let mut chain = alloc::vec![id];
    let mut current = id;
    while let Some(base) = self.schemas[current.0].base {
      if base.0 >= self.schemas.len() {
        Err(SchemaError::UnknownSchema(base))?;
      }
      if chain.contains(&base) {
        Err(SchemaError::InheritanceCycle { schema: self.schemas[id.0].name.clone() })?;
      }
      chain.push(base);
      current = base;
    }
    chain.reverse();
    Ok(chain)
  }

  fn validate_shape(&self, schema: &str, field: &str, shape: &Shape) -> Result<(), SchemaError> {
    match shape {
      Shape::Scalar(_) => {}
      Shape::Enum { ty, .. } => {
        if ty.0 >= self.enums.len() {
          Err(SchemaError::UnknownEnum(*ty))?;
        }
      }
      Shape::Object(id) => {
        if id.0 >= self.schemas.len() {
          Err(SchemaError::UnknownSchema(*id))?;
        }
      }
      Shape::List(element) => self.validate_shape(schema, field, &element.shape)?,
      Shape::Map { key, value } => {
        match **key {
          Shape::Scalar(scalar) if scalar.is_key() => {}
          Shape::Enum { .. } => self.validate_shape(schema, field, key)?,
          Shape::Scalar(_) | Shape::Object(_) | Shape::List(_) | Shape::Map { .. } => {
            Err(SchemaError::InvalidMapKey { schema: schema.into(), field: field.into() })?
          }
        }
        self.validate_shape(schema, field, &value.shape)?;
      }
    }
    Ok(())
  }

  fn validate_field(&self, schema: &str, field: &FieldDescriptor) -> Result<(), SchemaError> {
    self.validate_shape(schema, &field.name, &field.shape)?;
    if field.count_marker && ((!field.shape.is_collection()) || field.converter.is_some()) {
      Err(SchemaError::InvalidCountMarker { schema: schema.into(), field: field.name.clone() })?;
    }
    if field.enum_mode.is_some() && (!matches!(field.shape, Shape::Enum { .. })) {
      Err(SchemaError::InvalidEnumMode { schema: schema.into(), field: field.name.clone() })?;
    }
    Ok(())
  }

  /// Validate the plan, flattening inheritance.
  pub fn build(mut self) -> Result<CodecPlan, SchemaError> {
    if let Some(error) = self.error.take() {
      Err(error)?;
    }
    for ty in &self.enums {
      validate_enum(ty)?;
    }

    let mut chains = Vec::with_capacity(self.schemas.len());
    for i in 0 .. self.schemas.len() {
      chains.push(self.chain(SchemaId(i))?);
    }
    for draft in &self.schemas {
      for field in &draft.fields {
        self.validate_field(&draft.name, field)?;
      }
    }

    let mut schemas = Vec::with_capacity(self.schemas.len());
    for (i, chain) in chains.iter().enumerate() {
      let draft = &self.schemas[i];

      let mut fields = Vec::new();
      for ancestor in chain {
        for field in &self.schemas[ancestor.0].fields {
          let mut field = field.clone();
          field.origin.inherited = ancestor.0 != i;
          if let (Some(mode), Shape::Enum { mode: shape_mode, .. }) =
            (field.enum_mode, &mut field.shape)
          {
            *shape_mode = Some(mode);
          }
          field.encode_keys();
          fields.push(field);
        }
      }

      let mut keys = BTreeMap::new();
      for (index, field) in fields.iter().enumerate() {
        if !field.is_emitted() {
          continue;
        }
        insert_key(&mut keys, &draft.name, field.wire_key().into(), KeySlot::Field(index))?;
        if field.count_marker {
          let marker = field.marker_wire_key();
          insert_key(&mut keys, &draft.name, marker, KeySlot::CountMarker(index))?;
        }
      }

      let hierarchy =
        chain.iter().rev().find(|id| self.schemas[id.0].polymorphic.is_some()).copied();
      tracing::trace!(schema = %draft.name, fields = fields.len(), "flattened schema");
      schemas.push(Schema {
        name: draft.name.clone(),
        fields,
        base: draft.base,
        polymorphic: draft.polymorphic.clone(),
        hierarchy,
        discriminator: None,
        keys,
      });
    }

    for (i, chain) in chains.iter().enumerate() {
      let Some(map) = &self.schemas[i].polymorphic else { continue };
      let name = &self.schemas[i].name;
      if chain.iter().any(|id| (id.0 != i) && self.schemas[id.0].polymorphic.is_some()) {
        Err(SchemaError::NestedPolymorphism { schema: name.clone() })?;
      }
      let variants = map.variants();
      for (j, (discriminator, variant)) in variants.iter().enumerate() {
        let invalid = || SchemaError::InvalidVariant {
          schema: name.clone(),
          variant: self.schemas.get(variant.0).map_or_else(String::new, |draft| draft.name.clone()),
        };
        if chains.get(variant.0).is_none_or(|chain| !chain.contains(&SchemaId(i))) {
          Err(invalid())?;
        }
        if variants[.. j].iter().any(|(_, prior)| prior == variant) {
          Err(invalid())?;
        }
        if variants[.. j].iter().any(|(prior, _)| prior == discriminator) {
          Err(SchemaError::DuplicateDiscriminator {
            schema: name.clone(),
            discriminator: discriminator.to_string(),
          })?;
        }
      }
    }

    for i in 0 .. schemas.len() {
      let Some(root) = schemas[i].hierarchy else { continue };
      let Some(map) = schemas[root.0].polymorphic.as_ref() else { continue };
      let key = map.discriminator_key();
      if schemas[i].keys.contains_key(key) {
        Err(SchemaError::DuplicateWireKey { schema: schemas[i].name.clone(), key: key.into() })?;
      }
      let discriminator = map.discriminator_of(SchemaId(i)).map(|discriminator| {
        let mut writer = Writer::default();
        writer.write_str(key);
        writer.push_byte(b':');
        discriminator.write(&mut writer);
        writer.into_string()
      });
      schemas[i].discriminator = discriminator;
    }

    Ok(CodecPlan { schemas, enums: self.enums })
  }
}

#[cfg(test)]
mod tests {
  use alloc::sync::Arc;

  use super::*;
  use crate::{Scalar, Element, EnumMode, QuotedInteger};

  fn scalar(name: &str, scalar: Scalar) -> FieldDescriptor {
    FieldDescriptor::new(name, scalar)
  }

  #[test]
  fn flattens_inheritance() {
    let mut builder = PlanBuilder::new();
    let root = builder.schema("Root");
    let middle = builder.schema("Middle");
    let leaf = builder.schema("Leaf");
    // Declared out of order, to check the flattened order doesn't depend on declaration order
    builder.fields(leaf, [scalar("C", Scalar::I32), scalar("D", Scalar::I32).constructor_bound()]);
    builder.base(leaf, middle).base(middle, root);
    builder.field(middle, scalar("B", Scalar::String));
    builder.field(root, scalar("A", Scalar::Bool).constructor_bound());
    let plan = builder.build().unwrap();

    let leaf = plan.schema(leaf).unwrap();
    let names = leaf.fields().iter().map(FieldDescriptor::name).collect::<Vec<_>>();
    assert_eq!(names, ["A", "B", "C", "D"]);
    let origins = leaf.fields().iter().map(FieldDescriptor::origin).collect::<Vec<_>>();
    assert!(origins[0].inherited && origins[0].constructor_bound);
    assert!(origins[1].inherited && (!origins[1].constructor_bound));
    assert!((!origins[3].inherited) && origins[3].constructor_bound);
    assert_eq!(leaf.base(), Some(middle));
    assert!(plan.is_a(plan.schema_id("Leaf").unwrap(), root));
    assert!(!plan.is_a(root, middle));
  }

  #[test]
  fn rejects_duplicate_keys() {
    let mut builder = PlanBuilder::new();
    let base = builder.schema("Base");
    let derived = builder.schema("Derived");
    builder.base(derived, base);
    builder.field(base, scalar("Value", Scalar::I32));
    builder.field(derived, scalar("Other", Scalar::I32).rename("Value"));
    assert_eq!(
      builder.build().unwrap_err(),
      SchemaError::DuplicateWireKey { schema: "Derived".into(), key: "Value".into() }
    );

    // An ignored field doesn't take its key
    let mut builder = PlanBuilder::new();
    let schema = builder.schema("Schema");
    builder.fields(
      schema,
      [scalar("Value", Scalar::I32).ignore(), scalar("Other", Scalar::I32).rename("Value")],
    );
    assert!(builder.build().is_ok());

    // Count markers take their key as well
    let mut builder = PlanBuilder::new();
    let schema = builder.schema("Schema");
    builder.fields(
      schema,
      [
        FieldDescriptor::new("Items", Shape::list(Element::new(Scalar::I32))).count_marker(),
        scalar("$Items", Scalar::I32),
      ],
    );
    assert!(matches!(builder.build(), Err(SchemaError::DuplicateWireKey { .. })));
  }

  #[test]
  fn rejects_invalid_fields() {
    let build = |field: FieldDescriptor| {
      let mut builder = PlanBuilder::new();
      let schema = builder.schema("Schema");
      builder.field(schema, field);
      builder.build()
    };

    assert!(matches!(
      build(scalar("Value", Scalar::I32).count_marker()),
      Err(SchemaError::InvalidCountMarker { .. })
    ));
    assert!(matches!(
      build(
        FieldDescriptor::new("Value", Shape::list(Element::new(Scalar::I64)))
          .count_marker()
          .converter(Arc::new(QuotedInteger))
      ),
      Err(SchemaError::InvalidCountMarker { .. })
    ));
    assert!(matches!(
      build(scalar("Value", Scalar::I32).enum_mode(EnumMode::Number)),
      Err(SchemaError::InvalidEnumMode { .. })
    ));
    for key in [Scalar::F64, Scalar::Decimal, Scalar::Date, Scalar::Version] {
      assert!(matches!(
        build(FieldDescriptor::new("Value", Shape::map(key.into(), Element::new(Scalar::I32)))),
        Err(SchemaError::InvalidMapKey { .. })
      ));
    }
    assert_eq!(
      build(FieldDescriptor::new("Value", Shape::enumeration(EnumId(3)))).unwrap_err(),
      SchemaError::UnknownEnum(EnumId(3))
    );
    assert_eq!(
      build(FieldDescriptor::new("Value", Shape::Object(SchemaId(1)))).unwrap_err(),
      SchemaError::UnknownSchema(SchemaId(1))
    );
  }

  #[test]
  fn rejects_invalid_hierarchies() {
    let mut builder = PlanBuilder::new();
    let a = builder.schema("A");
    let b = builder.schema("B");
    builder.base(a, b).base(b, a);
    assert_eq!(builder.build().unwrap_err(), SchemaError::InheritanceCycle { schema: "A".into() });

    let mut builder = PlanBuilder::new();
    builder.base(SchemaId(0), SchemaId(0));
    assert_eq!(builder.build().unwrap_err(), SchemaError::UnknownSchema(SchemaId(0)));

    let mut builder = PlanBuilder::new();
    let base = builder.schema("Base");
    let unrelated = builder.schema("Unrelated");
    builder.polymorphic(base, PolymorphicMap::new().variant(1, unrelated));
    assert!(matches!(builder.build(), Err(SchemaError::InvalidVariant { .. })));

    let mut builder = PlanBuilder::new();
    let base = builder.schema("Base");
    let first = builder.schema("First");
    let second = builder.schema("Second");
    builder.base(first, base).base(second, base);
    builder.polymorphic(base, PolymorphicMap::new().variant("x", first).variant("x", second));
    assert_eq!(
      builder.build().unwrap_err(),
      SchemaError::DuplicateDiscriminator { schema: "Base".into(), discriminator: "\"x\"".into() }
    );

    let mut builder = PlanBuilder::new();
    let base = builder.schema("Base");
    let derived = builder.schema("Derived");
    builder.base(derived, base);
    builder.polymorphic(base, PolymorphicMap::new().variant(1, derived));
    builder.polymorphic(derived, PolymorphicMap::new().variant(1, derived));
    assert!(matches!(builder.build(), Err(SchemaError::NestedPolymorphism { .. })));

    let mut builder = PlanBuilder::new();
    let base = builder.schema("Base");
    builder.field(base, scalar("kind", Scalar::I32));
    builder.polymorphic(base, PolymorphicMap::new().key("kind").variant(0, base));
    assert!(matches!(builder.build(), Err(SchemaError::DuplicateWireKey { .. })));
  }

  #[test]
  fn rejects_invalid_enums() {
    let mut builder = PlanBuilder::new();
    builder.enum_type(EnumType::new("Color").member("Red", 0).member("Red", 1));
    assert!(matches!(builder.build(), Err(SchemaError::DuplicateEnumMember { .. })));

    let mut builder = PlanBuilder::new();
    builder.enum_type(EnumType::new("Color").member("Red", 0).fallback("Blue"));
    assert!(matches!(builder.build(), Err(SchemaError::InvalidFallback { .. })));
  }

  #[test]
  fn precomputes_discriminators() {
    let mut builder = PlanBuilder::new();
    let base = builder.schema("Base");
    let derived = builder.schema("Derived");
    builder.base(derived, base);
    builder.polymorphic(base, PolymorphicMap::new().key("kind").variant("derived", derived));
    let plan = builder.build().unwrap();
    assert_eq!(plan.schema(derived).unwrap().discriminator.as_deref(), Some(r#""kind":"derived""#));
    assert_eq!(plan.schema(base).unwrap().discriminator, None);
    assert_eq!(plan.schema(derived).unwrap().hierarchy, Some(base));
  }
}

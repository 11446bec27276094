use exact_json_schema::*;

struct Hierarchy {
  plan: CodecPlan,
  base: SchemaId,
  derived: SchemaId,
  other: SchemaId,
  leaf: SchemaId,
  unmapped: SchemaId,
  holder: SchemaId,
}

fn hierarchy() -> Hierarchy {
  let mut builder = PlanBuilder::new();
  let base = builder.schema("Base");
  let derived = builder.schema("Derived");
  let other = builder.schema("Other");
  let leaf = builder.schema("Leaf");
  let unmapped = builder.schema("Unmapped");
  let holder = builder.schema("Holder");
  builder
    .field(base, FieldDescriptor::new("Base", Scalar::I32))
    .base(derived, base)
    .field(derived, FieldDescriptor::new("Value", Scalar::String))
    .base(other, base)
    .field(other, FieldDescriptor::new("Flag", Scalar::Bool))
    .base(leaf, derived)
    .field(leaf, FieldDescriptor::new("Extra", Scalar::U8))
    .base(unmapped, derived)
    .field(unmapped, FieldDescriptor::new("More", Scalar::I32))
    .polymorphic(
      base,
      PolymorphicMap::new().variant(0, base).variant(1, derived).variant(2, other).variant(3, leaf),
    )
    .fields(
      holder,
      [
        FieldDescriptor::new("Item", Shape::Object(base)),
        FieldDescriptor::new("Items", Shape::list(Element::new(Shape::Object(base)))),
      ],
    );
  Hierarchy { plan: builder.build().unwrap(), base, derived, other, leaf, unmapped, holder }
}

impl Hierarchy {
  fn base(&self, base: i64) -> Object {
    self.plan.object(self.base, [("Base", Value::Int(base))]).unwrap()
  }

  fn derived(&self, base: i64, value: &str) -> Object {
    self.plan.object(self.derived, [("Base", Value::Int(base)), ("Value", value.into())]).unwrap()
  }

  fn other(&self, base: i64, flag: bool) -> Object {
    self.plan.object(self.other, [("Base", Value::Int(base)), ("Flag", Value::Bool(flag))]).unwrap()
  }

  fn leaf(&self, base: i64, value: &str, extra: u64) -> Object {
    self
      .plan
      .object(
        self.leaf,
        [("Base", Value::Int(base)), ("Value", value.into()), ("Extra", Value::UInt(extra))],
      )
      .unwrap()
  }

  fn unmapped(&self, base: i64, value: &str, more: i64) -> Object {
    self
      .plan
      .object(
        self.unmapped,
        [("Base", Value::Int(base)), ("Value", value.into()), ("More", Value::Int(more))],
      )
      .unwrap()
  }
}

fn round_trip(codec: &SchemaCodec<'_>, object: &Object, expected: &str) {
  let text = codec.serialize(object);
  assert_eq!(text, expected);
  assert_eq!(codec.calculate_size(object), text.len());
  assert_eq!(codec.deserialize(&text).unwrap().as_ref(), Some(object));
}

#[test]
fn discriminators() {
  let hierarchy = hierarchy();
  let codec = hierarchy.plan.codec(hierarchy.base).unwrap();

  round_trip(&codec, &hierarchy.derived(1, "test"), r#"{"$type":1,"Base":1,"Value":"test"}"#);
  round_trip(&codec, &hierarchy.other(2, true), r#"{"$type":2,"Base":2,"Flag":true}"#);
  round_trip(&codec, &hierarchy.leaf(3, "x", 4), r#"{"$type":3,"Base":3,"Value":"x","Extra":4}"#);
  // The base is a variant of its own hierarchy, so it's written with its discriminator as well
  round_trip(&codec, &hierarchy.base(5), r#"{"$type":0,"Base":5}"#);

  // The decoded object is of the concrete schema
  let read = codec.deserialize(r#"{ "$type" : 1, "Value": "test", "Base": 1 }"#).unwrap().unwrap();
  assert_eq!(read.schema(), hierarchy.derived);
  assert_eq!(read.fields(), [Value::Int(1), Value::Str("test".into())]);

  // An unrecognized discriminator fails the object
  assert_eq!(codec.deserialize(r#"{"$type":9,"Base":1}"#).unwrap(), None);
  assert_eq!(codec.deserialize(r#"{"$type":"1","Base":1,"Value":"test"}"#).unwrap(), None);
  assert_eq!(codec.deserialize(r#"{"$type":null,"Base":1}"#).unwrap(), None);

  // Through the base, the first key must be the discriminator
  for text in [
    r#"{"Base":1,"$type":1,"Value":"test"}"#,
    r#"{"Base":1,"Value":"x"}"#,
    r#"{"Unknown":1,"$type":0,"Base":1}"#,
    "{}",
  ] {
    assert_eq!(codec.deserialize(text).unwrap(), None, "{text}");
  }
  // Which doesn't excuse a structural error after it
  assert!(codec.deserialize(r#"{"Base":1,"Value":tru}"#).is_err());
}

#[test]
fn within_the_hierarchy() {
  let hierarchy = hierarchy();
  let base = hierarchy.plan.codec(hierarchy.base).unwrap();
  let codec = hierarchy.plan.codec(hierarchy.derived).unwrap();

  // Decoding through the base, then writing through the concrete schema's own codec, omits the
  // discriminator
  let text = r#"{"$type":1,"Base":1,"Value":"test"}"#;
  let object = base.deserialize(text).unwrap().unwrap();
  assert_eq!(base.serialize(&object), text);
  round_trip(&codec, &object, r#"{"Base":1,"Value":"test"}"#);
  // Which is still accepted with the discriminator
  assert_eq!(codec.deserialize(text).unwrap(), Some(object));

  // An object of a schema derived from the one expected carries its discriminator
  round_trip(&codec, &hierarchy.leaf(3, "x", 4), r#"{"$type":3,"Base":3,"Value":"x","Extra":4}"#);

  // A variant not derived from the schema expected fails the object
  assert_eq!(codec.deserialize(r#"{"$type":2,"Base":2,"Flag":true}"#).unwrap(), None);

  // Objects not derived from the schema expected are written as null
  assert_eq!(codec.serialize(&hierarchy.other(2, true)), "null");
  assert_eq!(codec.calculate_size(&hierarchy.other(2, true)), 4);
}

#[test]
fn unmapped_schemas() {
  let hierarchy = hierarchy();
  let unmapped = hierarchy.unmapped(1, "v", 9);

  // Without a discriminator, the object can't be written through the hierarchy so it reads back
  for expected in [hierarchy.base, hierarchy.derived] {
    let codec = hierarchy.plan.codec(expected).unwrap();
    assert_eq!(codec.serialize(&unmapped), "null");
    assert_eq!(codec.calculate_size(&unmapped), 4);
  }

  // Its own codec writes it, without a discriminator
  let codec = hierarchy.plan.codec(hierarchy.unmapped).unwrap();
  round_trip(&codec, &unmapped, r#"{"Base":1,"Value":"v","More":9}"#);
}

#[test]
fn nested() {
  let hierarchy = hierarchy();
  let codec = hierarchy.plan.codec(hierarchy.holder).unwrap();

  let items = vec![
    Value::Object(hierarchy.base(0)),
    Value::Object(hierarchy.derived(1, "a")),
    Value::Object(hierarchy.other(2, false)),
  ];
  let holder = hierarchy
    .plan
    .object(
      hierarchy.holder,
      [("Item", Value::Object(hierarchy.leaf(3, "b", 5))), ("Items", Value::List(items))],
    )
    .unwrap();
  round_trip(
    &codec,
    &holder,
    concat!(
      r#"{"Item":{"$type":3,"Base":3,"Value":"b","Extra":5},"Items":[{"$type":0,"Base":0},"#,
      r#"{"$type":1,"Base":1,"Value":"a"},{"$type":2,"Base":2,"Flag":false}]}"#,
    ),
  );

  // An invalid element fails the list, and with it the holder
  let item = r#""Item":{"$type":0,"Base":0}"#;
  for items in [r#"[{"$type":0,"Base":0},{"$type":7,"Base":1}]"#, r#"[{"Base":0}]"#] {
    let text = format!(r#"{{{item},"Items":{items}}}"#);
    assert_eq!(codec.deserialize(&text).unwrap(), None, "{text}");
  }
  let text = format!(r#"{{{item},"Items":[]}}"#);
  assert!(codec.deserialize(&text).unwrap().is_some());
}

#[test]
fn string_discriminators() {
  let mut builder = PlanBuilder::new();
  let shape = builder.schema("Shape");
  let circle = builder.schema("Circle");
  let square = builder.schema("Square");
  builder
    .field(shape, FieldDescriptor::new("Id", Scalar::I64).rename("id"))
    .base(circle, shape)
    .field(circle, FieldDescriptor::new("Radius", Scalar::I32).rename("radius"))
    .base(square, shape)
    .field(square, FieldDescriptor::new("Side", Scalar::I32).rename("side"))
    .polymorphic(
      shape,
      PolymorphicMap::new().key("kind").variant("circle", circle).variant("sq\"uare", square),
    );
  let plan = builder.build().unwrap();
  let codec = plan.codec(shape).unwrap();

  let circle = plan.object(circle, [("Id", Value::Int(1)), ("Radius", Value::Int(2))]).unwrap();
  round_trip(&codec, &circle, r#"{"kind":"circle","id":1,"radius":2}"#);
  let square = plan.object(square, [("Id", Value::Int(3)), ("Side", Value::Int(4))]).unwrap();
  round_trip(&codec, &square, r#"{"kind":"sq\"uare","id":3,"side":4}"#);

  // The base isn't a variant, so it can't be written through its own codec
  let base = plan.object(plan.schema_id("Shape").unwrap(), [("Id", Value::Int(1))]).unwrap();
  assert_eq!(codec.serialize(&base), "null");

  // The default key isn't recognized
  assert_eq!(codec.deserialize(r#"{"$type":"circle","id":1,"radius":2}"#).unwrap(), None);
  assert_eq!(codec.deserialize(r#"{"kind":1,"id":1}"#).unwrap(), None);
}

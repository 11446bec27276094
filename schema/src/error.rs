use alloc::string::String;

use crate::{SchemaId, EnumId};

/// An error when building a [`CodecPlan`](crate::CodecPlan).
///
/// Every inconsistency within a plan is caught when it's built, so a built plan can always be
/// used to size, write, and read values.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum SchemaError {
  /// A schema ID which wasn't issued by this plan's builder.
  #[error("schema {0:?} isn't part of this plan")]
  UnknownSchema(SchemaId),
  /// An enum ID which wasn't issued by this plan's builder.
  #[error("enum {0:?} isn't part of this plan")]
  UnknownEnum(EnumId),
  /// A schema which is (transitively) its own base.
  #[error("schema `{schema}` inherits from itself")]
  InheritanceCycle {
    /// The schema.
    schema: String,
  },
  /// Two fields, or a field and a count marker or discriminator, sharing a wire key.
  #[error("wire key `{key}` is used more than once within `{schema}`")]
  DuplicateWireKey {
    /// The schema.
    schema: String,
    /// The key.
    key: String,
  },
  /// A count marker on a field which isn't a list or dictionary.
  #[error("`{schema}.{field}` has a count marker yet isn't a list or dictionary")]
  InvalidCountMarker {
    /// The schema.
    schema: String,
    /// The field.
    field: String,
  },
  /// An enum mode on a field which isn't an enum.
  #[error("`{schema}.{field}` has an enum mode yet isn't an enum")]
  InvalidEnumMode {
    /// The schema.
    schema: String,
    /// The field.
    field: String,
  },
  /// A dictionary whose keys can't be written as text.
  #[error("`{schema}.{field}` has a dictionary key which can't be written as text")]
  InvalidMapKey {
    /// The schema.
    schema: String,
    /// The field.
    field: String,
  },
  /// A field name which isn't part of a schema.
  #[error("`{schema}` has no field `{field}`")]
  UnknownField {
    /// The schema.
    schema: String,
    /// The field.
    field: String,
  },
  /// A polymorphic variant which isn't derived from the base declaring it, or is listed twice.
  #[error("`{variant}` isn't a distinct variant of polymorphic base `{schema}`")]
  InvalidVariant {
    /// The polymorphic base.
    schema: String,
    /// The variant.
    variant: String,
  },
  /// A discriminator value used for multiple variants.
  #[error("discriminator {discriminator} is used more than once by `{schema}`")]
  DuplicateDiscriminator {
    /// The polymorphic base.
    schema: String,
    /// The discriminator, as it's written.
    discriminator: String,
  },
  /// A polymorphic base derived from another polymorphic base.
  #[error("polymorphic base `{schema}` is derived from another polymorphic base")]
  NestedPolymorphism {
    /// The schema.
    schema: String,
  },
  /// An enum declaring a member name twice.
  #[error("enum `{name}` declares `{member}` more than once")]
  DuplicateEnumMember {
    /// The enum.
    name: String,
    /// The member.
    member: String,
  },
  /// An enum whose fallback isn't one of its members.
  #[error("enum `{name}` falls back to `{fallback}`, which isn't a member")]
  InvalidFallback {
    /// The enum.
    name: String,
    /// The fallback.
    fallback: String,
  },
}

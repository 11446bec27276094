#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![no_std]

//! A schema-driven JSON codec.
//!
//! A [`CodecPlan`] describes a set of schemas: their fields, in order, with each field's wire key,
//! nullability, and [`Shape`]. Plans are assembled with a [`PlanBuilder`], which flattens
//! inheritance and validates the plan once, after which it's immutable and may be shared across
//! threads.
//!
//! For each schema, a [`SchemaCodec`] offers:
//! - [`SchemaCodec::calculate_size`], the exact length of the text `serialize` will produce.
//! - [`SchemaCodec::serialize`], which writes the text in a single pass into a buffer allocated
//!   once with that exact length.
//! - [`SchemaCodec::deserialize`], which reads text back while tolerating reordered and unknown
//!   keys.
//!
//! Decoding distinguishes two kinds of failure. Malformed JSON is a structural
//! [`JsonError`](exact_json::JsonError), returned as `Err`. Well-formed JSON which doesn't
//! satisfy the schema (an undefined enum value, an unrecognized discriminator, a missing required
//! field) is a semantic failure, returned as `Ok(None)` for the enclosing object. Within a
//! dictionary, a semantic failure only drops the affected entry.
//!
//! Values beyond JSON's own types are represented with the crates commonly used for them, which
//! are re-exported: [`uuid`] for GUIDs, [`rust_decimal`] for decimals, [`chrono`] for dates and
//! times, and [`semver`] for versions.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
mod shape;
mod field;
mod enums;
mod polymorphic;
mod plan;
mod builder;
mod value;
mod converter;
mod size;
mod write;
mod read;
mod codec;

pub use error::SchemaError;
pub use shape::{Scalar, EnumMode, Shape, Element};
pub use field::{FieldDescriptor, Origin};
pub use enums::EnumType;
pub use polymorphic::{Discriminator, PolymorphicMap, DEFAULT_DISCRIMINATOR};
pub use plan::{Schema, CodecPlan};
pub use builder::PlanBuilder;
pub use value::{Value, Object};
pub use converter::{Converter, QuotedInteger};
pub use codec::SchemaCodec;

pub use {chrono, rust_decimal, semver, uuid};

/// The ID of a schema within a [`CodecPlan`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SchemaId(usize);

impl SchemaId {
  /// The index of this schema within its plan.
  #[inline(always)]
  pub fn index(self) -> usize {
    self.0
  }
}

/// The ID of an enum type within a [`CodecPlan`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EnumId(usize);

impl EnumId {
  /// The index of this enum type within its plan.
  #[inline(always)]
  pub fn index(self) -> usize {
    self.0
  }
}

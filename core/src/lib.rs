#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![no_std]

//! Primitives for a schema-driven JSON codec.
//!
//! This crate has no notion of schemas. It offers the pieces a schema-driven codec is assembled
//! from:
//! - A [`Cursor`] over JSON text, with literal, number, and string scanning, and a generic skip of
//!   any JSON value.
//! - The [`size`] functions, yielding the exact length a primitive serializes to.
//! - A [`Writer`] which emits primitives into a buffer sized in advance.
//! - The structural counters [`count_list_items`] and [`count_dictionary_items`].
//! - A [`ScratchPool`] for unescaping long strings without repeated allocations.
//!
//! Reading routines come in two forms. `try_*` methods return `Option` and leave the cursor where
//! it was upon failure, intended for input which hasn't been validated. The remaining methods
//! return `Result<_, JsonError>` and are intended to be propagated with `?`. The former are
//! implemented with the latter so both accept exactly the same text.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod cursor;
mod literal;
mod number;
mod string;
mod count;
mod scratch;
mod writer;
pub mod size;

pub use cursor::{Cursor, DecodeOptions};
pub use literal::Literal;
pub use number::{Number, non_finite_from_str};
pub use count::{count_list_items, count_dictionary_items};
pub use scratch::{ScratchPool, PooledString, SMALL_SCRATCH};
pub use writer::Writer;

/// An error incurred when scanning JSON.
///
/// These are structural errors. The text could not be read as JSON at the reported byte offset,
/// leaving the position of any cursor which raised it undefined.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum JsonError {
  /// The text ended while a value was still expected.
  #[error("unexpected end of input")]
  UnexpectedEnd,
  /// A byte which can't start or continue the expected item.
  #[error("unexpected byte {found:#04x} at offset {offset}")]
  UnexpectedByte {
    /// The offset of the byte.
    offset: usize,
    /// The byte itself.
    found: u8,
  },
  /// A malformed `true`, `false`, or `null`.
  #[error("invalid literal at offset {0}")]
  InvalidLiteral(usize),
  /// A malformed number.
  #[error("invalid number at offset {0}")]
  InvalidNumber(usize),
  /// A string with an invalid escape sequence or an unescaped control character.
  #[error("invalid string at offset {0}")]
  InvalidString(usize),
  /// A string without its closing quote.
  #[error("unterminated string starting at offset {0}")]
  UnterminatedString(usize),
  /// The nesting of objects and arrays exceeded the configured limit.
  #[error("nesting exceeded the limit of {0}")]
  DepthLimit(usize),
  /// Non-whitespace text after the top-level value.
  #[error("trailing characters at offset {0}")]
  TrailingCharacters(usize),
}

/// The type of the value at a position.
///
/// https://datatracker.ietf.org/doc/html/rfc8259#section-3 defines all possible values.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Type {
  /// An object.
  Object,
  /// An array.
  Array,
  /// A string.
  String,
  /// A number.
  Number,
  /// A boolean.
  Bool,
  /// The `null` unit value.
  Null,
}

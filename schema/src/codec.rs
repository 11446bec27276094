use alloc::string::String;

use exact_json::{JsonError, Cursor, DecodeOptions, Writer};

use crate::{SchemaId, CodecPlan, Object, size::object_size, write::write_object, read::Decoder};

/// The codec for a schema of a plan.
#[derive(Clone, Copy, Debug)]
pub struct SchemaCodec<'plan> {
  plan: &'plan CodecPlan,
  schema: SchemaId,
  options: DecodeOptions,
}

impl<'plan> SchemaCodec<'plan> {
  pub(crate) fn new(plan: &'plan CodecPlan, schema: SchemaId) -> Self {
    Self { plan, schema, options: DecodeOptions::default() }
  }

  /// Use the specified options when decoding.
  #[must_use]
  pub fn with_options(mut self, options: DecodeOptions) -> Self {
    self.options = options;
    self
  }

  /// The schema this codec is for.
  #[inline(always)]
  pub fn schema(&self) -> SchemaId {
    self.schema
  }

  /// The exact length, in UTF-8 bytes, of the text [`SchemaCodec::serialize`] will produce for
  /// this object.
  ///
  /// The object may be of this codec's schema or any schema derived from it.
  pub fn calculate_size(&self, object: &Object) -> usize {
    object_size(self.plan, self.schema, object)
  }

  /// Serialize an object.
  ///
  /// The text is written in a single pass into a buffer allocated once with the exact length
  /// required. An object not of this codec's schema, or a schema derived from it, is written as
  /// `null`.
  pub fn serialize(&self, object: &Object) -> String {
    let size = self.calculate_size(object);
    let mut writer = Writer::with_capacity(size);
    write_object(self.plan, self.schema, object, &mut writer);
    debug_assert_eq!(writer.len(), size, "calculated size differed from the length written");
    writer.into_string()
  }

  /// Deserialize an object.
  ///
  /// Returns `Err` if the text isn't well-formed JSON and `Ok(None)` if it's well-formed yet not
  /// a valid object of this schema.
  pub fn deserialize(&self, text: &str) -> Result<Option<Object>, JsonError> {
    let mut decoder = Decoder::new(self.plan, Cursor::with_options(text, self.options));
    decoder.cursor.skip_whitespace();
    let object = decoder.read_object(self.schema)?;
    decoder.cursor.finish()?;
    Ok(object)
  }

  /// Deserialize an object, returning `None` upon any failure.
  pub fn try_deserialize(&self, text: &str) -> Option<Object> {
    self.deserialize(text).ok().flatten()
  }
}

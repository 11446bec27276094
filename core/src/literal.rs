use crate::{JsonError, Cursor, cursor::is_delimiter};

/// One of JSON's three literal names.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Literal {
  /// `true`.
  True,
  /// `false`.
  False,
  /// `null`.
  Null,
}

impl Literal {
  /// The text of this literal.
  #[inline(always)]
  pub fn as_str(self) -> &'static str {
    match self {
      Literal::True => "true",
      Literal::False => "false",
      Literal::Null => "null",
    }
  }

  /// The boolean this literal represents, if it's `true` or `false`.
  #[inline(always)]
  pub fn as_bool(self) -> Option<bool> {
    match self {
      Literal::True => Some(true),
      Literal::False => Some(false),
      Literal::Null => None,
    }
  }
}

impl<'text> Cursor<'text> {
  /// Read a literal.
  ///
  /// The match is case-sensitive and the literal must be followed by whitespace, `,`, `}`, `]`,
  /// or the end of the text. `truee`, `TRUE`, and `nul` are all rejected.
  pub fn read_literal(&mut self) -> Result<Literal, JsonError> {
    let start = self.position();
    let rest = self.rest();
    let literal = if rest.starts_with(b"true") {
      Literal::True
    } else if rest.starts_with(b"false") {
      Literal::False
    } else if rest.starts_with(b"null") {
      Literal::Null
    } else {
      Err(JsonError::InvalidLiteral(start))?
    };
    let len = literal.as_str().len();
    if !is_delimiter(self.peek_at(len)) {
      Err(JsonError::InvalidLiteral(start))?;
    }
    self.advance(len);
    Ok(literal)
  }

  /// Read a literal, returning `None` and leaving the cursor in place if there isn't one.
  #[inline(always)]
  pub fn try_read_literal(&mut self) -> Option<Literal> {
    self.attempt(Self::read_literal)
  }

  /// Consume `null` if it's the next value.
  ///
  /// Returns `false`, without moving the cursor, for anything else (including malformed
  /// literals, which are left for the caller to reject).
  #[inline(always)]
  pub fn eat_null(&mut self) -> bool {
    (self.peek() == Some(b'n')) && (self.try_read_literal() == Some(Literal::Null))
  }
}

#[test]
fn literals() {
  for (text, expected) in [
    ("true", Literal::True),
    ("false", Literal::False),
    ("null", Literal::Null),
    ("true,", Literal::True),
    ("false}", Literal::False),
    ("null]", Literal::Null),
    ("null \n", Literal::Null),
  ] {
    assert_eq!(Cursor::new(text).read_literal().unwrap(), expected);
    assert_eq!(Cursor::new(text).try_read_literal(), Some(expected));
  }

  for text in ["truee", "TRUE", "nul", "True", "fals", "nulll", "null:", ""] {
    let mut cursor = Cursor::new(text);
    assert!(cursor.read_literal().is_err(), "accepted {text}");
    assert_eq!(cursor.try_read_literal(), None);
    assert_eq!(cursor.position(), 0);
  }
}

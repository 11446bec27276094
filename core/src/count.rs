use crate::cursor::is_whitespace;

/// Count the items within a container, starting just after its opening byte.
///
/// Commas are only counted at the container's own nesting level, and strings are skipped with
/// awareness of escapes, so brackets, braces, and commas within strings are ignored.
fn count_items(text: &str, start: usize) -> usize {
  let bytes = text.as_bytes();
  let mut i = start;
  while bytes.get(i).copied().is_some_and(is_whitespace) {
    i += 1;
  }
  if matches!(bytes.get(i), None | Some(b']' | b'}')) {
    return 0;
  }

  let mut items = 1;
  let mut depth = 0usize;
  while let Some(b) = bytes.get(i).copied() {
    match b {
      b'"' => {
        i += 1;
        while let Some(b) = bytes.get(i).copied() {
          match b {
            b'\\' => i += 1,
            b'"' => break,
            _ => {}
          }
          i += 1;
        }
      }
      b'[' | b'{' => depth += 1,
      b']' | b'}' => {
        if depth == 0 {
          break;
        }
        depth -= 1;
      }
      b',' if depth == 0 => items += 1,
      _ => {}
    }
    i += 1;
  }
  items
}

/// Count the elements of an array, given the offset just after its `[`.
///
/// This is purely structural, never interpreting the elements, and is intended to size a
/// collection before reading it. An empty array has zero elements.
#[inline(always)]
pub fn count_list_items(text: &str, start: usize) -> usize {
  count_items(text, start)
}

/// Count the members of an object, given the offset just after its `{`.
///
/// This is as [`count_list_items`], counting `key: value` pairs.
#[inline(always)]
pub fn count_dictionary_items(text: &str, start: usize) -> usize {
  count_items(text, start)
}

#[test]
fn count() {
  assert_eq!(count_list_items("[]", 1), 0);
  assert_eq!(count_list_items("[ \n ]", 1), 0);
  assert_eq!(count_list_items("[1]", 1), 1);
  assert_eq!(count_list_items("[1,[2,3],4]", 1), 3);
  assert_eq!(count_list_items(r#"["a]b","c[d"]"#, 1), 2);
  assert_eq!(count_list_items(r#"["a\"],", {"b": [1, 2]}, null]"#, 1), 3);
  assert_eq!(count_list_items(r#"[["\\"], 2]"#, 1), 2);
  assert_eq!(count_dictionary_items("{}", 1), 0);
  assert_eq!(count_dictionary_items(r#"{"a":{"x":1},"b":2}"#, 1), 2);
  assert_eq!(count_dictionary_items(r#"{"a,b": "}", "c": [1, 2, 3]}"#, 1), 2);

  // Malformed values within a well-formed container don't affect the count
  assert_eq!(count_list_items("[tru, 1x, --]", 1), 3);
  // Nor does anything after the container
  assert_eq!(count_list_items(r#"{"a": [1, 2], "b": 3}"#, 6), 2);
}

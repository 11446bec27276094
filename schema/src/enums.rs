use alloc::{string::String, vec::Vec};

use crate::EnumMode;

/// An enum type: a closed set of named integers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumType {
  name: String,
  members: Vec<(String, i64)>,
  mode: EnumMode,
  fallback: Option<String>,
}

impl EnumType {
  /// An enum type without any members, written as text by default.
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), members: Vec::new(), mode: EnumMode::Text, fallback: None }
  }

  /// Add a member.
  #[must_use]
  pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
    self.members.push((name.into(), value));
    self
  }

  /// Set the mode fields of this type are written with, unless they override it.
  #[must_use]
  pub fn mode(mut self, mode: EnumMode) -> Self {
    self.mode = mode;
    self
  }

  /// Substitute this member for any value read which isn't a member.
  #[must_use]
  pub fn fallback(mut self, member: impl Into<String>) -> Self {
    self.fallback = Some(member.into());
    self
  }

  /// The name of this type.
  #[inline(always)]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The members of this type, in declaration order.
  #[inline(always)]
  pub fn members(&self) -> &[(String, i64)] {
    &self.members
  }

  /// The default mode of this type.
  #[inline(always)]
  pub fn default_mode(&self) -> EnumMode {
    self.mode
  }

  /// The name of the first member with this value.
  pub fn name_of(&self, value: i64) -> Option<&str> {
    self.members.iter().find(|(_, member)| *member == value).map(|(name, _)| name.as_str())
  }

  /// The value of the member with this name.
  ///
  /// Names are matched exactly, and case-sensitively. A name which happens to be a number is not
  /// interpreted as the number.
  pub fn value_of(&self, name: &str) -> Option<i64> {
    self.members.iter().find(|(member, _)| member == name).map(|(_, value)| *value)
  }

  /// If this value is a member of this type.
  pub fn contains(&self, value: i64) -> bool {
    self.members.iter().any(|(_, member)| *member == value)
  }

  /// The value of the fallback member, if one was declared.
  pub fn fallback_value(&self) -> Option<i64> {
    self.value_of(self.fallback.as_deref()?)
  }

  /// The declared fallback, by name.
  pub(crate) fn fallback_name(&self) -> Option<&str> {
    self.fallback.as_deref()
  }
}

#[test]
fn lookups() {
  let color = EnumType::new("Color").member("Red", 1).member("Green", 2).member("Crimson", 1);
  assert_eq!(color.name_of(1), Some("Red"));
  assert_eq!(color.name_of(3), None);
  assert_eq!(color.value_of("Green"), Some(2));
  assert_eq!(color.value_of("green"), None);
  assert_eq!(color.value_of("2"), None);
  assert!(color.contains(2) && (!color.contains(0)));
  assert_eq!(color.fallback_value(), None);
  assert_eq!(color.fallback("Green").fallback_value(), Some(2));
}

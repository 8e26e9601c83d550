//! Declared types of function parameters and return values.
//!
//! A [`TypeAnnotation`] is what a registered function says about one of its
//! parameters (or its return value). Annotations are descriptive only: the
//! resolver maps each one onto a [`FieldKind`](crate::FieldKind), which is what
//! the rest of the engine works with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single literal value inside a closed literal set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
  Bool(bool),
  Int(i64),
  Str(String),
}

impl Literal {
  /// Whether `text` spells this literal.
  ///
  /// Text widgets hand back strings, so `"3"` matches `Literal::Int(3)` and
  /// `"true"` matches `Literal::Bool(true)`.
  pub fn matches_text(&self, text: &str) -> bool {
    match self {
      Literal::Str(s) => s == text,
      Literal::Int(i) => text.trim().parse::<i64>().is_ok_and(|n| n == *i),
      Literal::Bool(b) => text.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" }),
    }
  }
}

impl fmt::Display for Literal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Literal::Bool(b) => write!(f, "{}", b),
      Literal::Int(i) => write!(f, "{}", i),
      Literal::Str(s) => f.write_str(s),
    }
  }
}

impl From<&str> for Literal {
  fn from(value: &str) -> Self {
    Literal::Str(value.to_string())
  }
}

impl From<String> for Literal {
  fn from(value: String) -> Self {
    Literal::Str(value)
  }
}

impl From<i64> for Literal {
  fn from(value: i64) -> Self {
    Literal::Int(value)
  }
}

impl From<bool> for Literal {
  fn from(value: bool) -> Self {
    Literal::Bool(value)
  }
}

/// The declared type of a parameter or return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
pub enum TypeAnnotation {
  Int,
  Float,
  Str,
  Bool,
  Date,
  DateTime,
  /// Time of day on its own. Only meaningful as half of a date-time.
  Time,
  Path,
  /// A closed set of allowed scalar values, in declaration order.
  Literal(Vec<Literal>),
  /// A homogeneous sequence.
  List(Box<TypeAnnotation>),
  /// A key/value mapping, e.g. `dict[str, int]`.
  Mapping(Box<TypeAnnotation>, Box<TypeAnnotation>),
  /// A tabular data frame.
  Frame,
  Optional(Box<TypeAnnotation>),
  Union(Vec<TypeAnnotation>),
  /// A structured record type (dataclass-like), by name.
  Record(String),
  Bytes,
  /// Any other named type.
  Named(String),
}

impl TypeAnnotation {
  /// `Literal[...]` over the given values.
  pub fn literal<I, L>(values: I) -> Self
  where
    I: IntoIterator<Item = L>,
    L: Into<Literal>,
  {
    TypeAnnotation::Literal(values.into_iter().map(Into::into).collect())
  }

  /// `list[inner]`.
  pub fn list(inner: TypeAnnotation) -> Self {
    TypeAnnotation::List(Box::new(inner))
  }

  /// `dict[key, value]`.
  pub fn mapping(key: TypeAnnotation, value: TypeAnnotation) -> Self {
    TypeAnnotation::Mapping(Box::new(key), Box::new(value))
  }

  pub fn optional(inner: TypeAnnotation) -> Self {
    TypeAnnotation::Optional(Box::new(inner))
  }
}

impl fmt::Display for TypeAnnotation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TypeAnnotation::Int => f.write_str("int"),
      TypeAnnotation::Float => f.write_str("float"),
      TypeAnnotation::Str => f.write_str("str"),
      TypeAnnotation::Bool => f.write_str("bool"),
      TypeAnnotation::Date => f.write_str("date"),
      TypeAnnotation::DateTime => f.write_str("datetime"),
      TypeAnnotation::Time => f.write_str("time"),
      TypeAnnotation::Path => f.write_str("path"),
      TypeAnnotation::Literal(values) => {
        let values: Vec<String> = values.iter().map(|v| format!("{:?}", v.to_string())).collect();
        write!(f, "Literal[{}]", values.join(", "))
      }
      TypeAnnotation::List(inner) => write!(f, "list[{}]", inner),
      TypeAnnotation::Mapping(k, v) => write!(f, "dict[{}, {}]", k, v),
      TypeAnnotation::Frame => f.write_str("DataFrame"),
      TypeAnnotation::Optional(inner) => write!(f, "Optional[{}]", inner),
      TypeAnnotation::Union(members) => {
        let members: Vec<String> = members.iter().map(ToString::to_string).collect();
        write!(f, "Union[{}]", members.join(", "))
      }
      TypeAnnotation::Record(name) | TypeAnnotation::Named(name) => f.write_str(name),
      TypeAnnotation::Bytes => f.write_str("bytes"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_literal_matches_text() {
    assert!(Literal::from("upper").matches_text("upper"));
    assert!(!Literal::from("upper").matches_text("Upper"));
    assert!(Literal::Int(3).matches_text(" 3"));
    assert!(Literal::from(true).matches_text("TRUE"));
    assert!(!Literal::from(false).matches_text("0"));
  }

  #[test]
  fn test_display_nested() {
    let annotation = TypeAnnotation::mapping(
      TypeAnnotation::Str,
      TypeAnnotation::list(TypeAnnotation::literal(["a", "b"])),
    );
    assert_eq!(annotation.to_string(), r#"dict[str, list[Literal["a", "b"]]]"#);
  }
}

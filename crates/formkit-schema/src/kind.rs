//! Field kinds and the annotation resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::{Literal, TypeAnnotation};

/// How one typed value is represented as an input widget or an output view.
///
/// The set is closed: every annotation resolves to exactly one kind, and
/// everything downstream matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "allowed", rename_all = "snake_case")]
pub enum FieldKind {
  Integer,
  Float,
  Text,
  Boolean,
  Date,
  /// Collected as two cooperating widgets (a date and a time).
  DateTime,
  /// Output only.
  FilePath,
  Enum(Vec<Literal>),
  ListOfText,
  ListOfEnum(Vec<Literal>),
  JsonObject,
  /// Output only.
  TabularFrame,
  /// Read-only representation on output, cannot be collected on input.
  Fallback,
}

impl FieldKind {
  /// Whether a widget can collect a value of this kind.
  pub fn input_supported(&self) -> bool {
    !matches!(
      self,
      FieldKind::FilePath | FieldKind::TabularFrame | FieldKind::Fallback
    )
  }

  /// The literal set of an `Enum`/`ListOfEnum` kind.
  pub fn allowed(&self) -> Option<&[Literal]> {
    match self {
      FieldKind::Enum(allowed) | FieldKind::ListOfEnum(allowed) => Some(allowed),
      _ => None,
    }
  }

  /// Stable snake_case name, used in error messages.
  pub fn name(&self) -> &'static str {
    match self {
      FieldKind::Integer => "integer",
      FieldKind::Float => "float",
      FieldKind::Text => "text",
      FieldKind::Boolean => "boolean",
      FieldKind::Date => "date",
      FieldKind::DateTime => "date_time",
      FieldKind::FilePath => "file_path",
      FieldKind::Enum(_) => "enum",
      FieldKind::ListOfText => "list_of_text",
      FieldKind::ListOfEnum(_) => "list_of_enum",
      FieldKind::JsonObject => "json_object",
      FieldKind::TabularFrame => "tabular_frame",
      FieldKind::Fallback => "fallback",
    }
  }
}

impl fmt::Display for FieldKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Map a declared annotation onto its field kind.
///
/// Pure and total. The first matching rule wins; anything the engine does not
/// know how to represent (optionals, unions, records, nested sequences...)
/// resolves to [`FieldKind::Fallback`].
pub fn resolve(annotation: &TypeAnnotation) -> FieldKind {
  match annotation {
    TypeAnnotation::Int => FieldKind::Integer,
    TypeAnnotation::Float => FieldKind::Float,
    TypeAnnotation::Str => FieldKind::Text,
    TypeAnnotation::Bool => FieldKind::Boolean,

    TypeAnnotation::Date => FieldKind::Date,
    TypeAnnotation::DateTime => FieldKind::DateTime,

    TypeAnnotation::Path => FieldKind::FilePath,

    TypeAnnotation::Literal(allowed) => FieldKind::Enum(dedup(allowed)),

    TypeAnnotation::List(inner) => match inner.as_ref() {
      TypeAnnotation::Str => FieldKind::ListOfText,
      TypeAnnotation::Literal(allowed) => FieldKind::ListOfEnum(dedup(allowed)),
      _ => FieldKind::Fallback,
    },

    TypeAnnotation::Mapping(_, _) => FieldKind::JsonObject,

    TypeAnnotation::Frame => FieldKind::TabularFrame,

    TypeAnnotation::Time
    | TypeAnnotation::Optional(_)
    | TypeAnnotation::Union(_)
    | TypeAnnotation::Record(_)
    | TypeAnnotation::Bytes
    | TypeAnnotation::Named(_) => FieldKind::Fallback,
  }
}

/// Resolve an annotation that may be absent. No annotation means Fallback.
pub fn resolve_optional(annotation: Option<&TypeAnnotation>) -> FieldKind {
  annotation.map(resolve).unwrap_or(FieldKind::Fallback)
}

// Literal sets keep their first occurrence of each value, in declared order.
fn dedup(allowed: &[Literal]) -> Vec<Literal> {
  let mut out: Vec<Literal> = Vec::with_capacity(allowed.len());
  for value in allowed {
    if !out.contains(value) {
      out.push(value.clone());
    }
  }
  out
}

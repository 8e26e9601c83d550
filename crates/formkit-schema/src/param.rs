use serde::{Deserialize, Serialize};

use crate::annotation::TypeAnnotation;
use crate::value::Value;

/// One declared parameter of a registered function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
  pub name: String,

  /// Declared type, `None` when the parameter is unannotated.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub annotation: Option<TypeAnnotation>,

  /// Value used when the widget hands back nothing.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,

  pub required: bool,
}

impl ParameterSpec {
  pub fn new(name: impl Into<String>, annotation: TypeAnnotation) -> Self {
    Self {
      name: name.into(),
      annotation: Some(annotation),
      default: None,
      required: true,
    }
  }

  pub fn with_default(name: impl Into<String>, annotation: TypeAnnotation, default: Value) -> Self {
    Self {
      name: name.into(),
      annotation: Some(annotation),
      default: Some(default),
      required: false,
    }
  }

  pub fn untyped(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      annotation: None,
      default: None,
      required: true,
    }
  }
}

use serde::{Deserialize, Serialize};

use crate::annotation::TypeAnnotation;
use crate::kind::{FieldKind, resolve_optional};
use crate::param::ParameterSpec;

/// A parameter together with the kind it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
  pub param: ParameterSpec,
  pub kind: FieldKind,
}

impl FieldSpec {
  pub fn name(&self) -> &str {
    &self.param.name
  }

  /// Whether a widget can collect this field.
  pub fn collectable(&self) -> bool {
    self.kind.input_supported()
  }
}

/// The input/output schema of one registered function.
///
/// Fields are kept in declared parameter order. That order drives both the
/// widget layout and argument binding, so nothing here ever re-sorts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
  fields: Vec<FieldSpec>,
  #[serde(skip_serializing_if = "Option::is_none")]
  return_annotation: Option<TypeAnnotation>,
  return_kind: FieldKind,
}

impl FormSchema {
  /// Resolve every parameter and the return annotation once.
  pub fn derive(params: &[ParameterSpec], returns: Option<&TypeAnnotation>) -> Self {
    let fields = params
      .iter()
      .map(|param| FieldSpec {
        kind: resolve_optional(param.annotation.as_ref()),
        param: param.clone(),
      })
      .collect();

    Self {
      fields,
      return_annotation: returns.cloned(),
      return_kind: resolve_optional(returns),
    }
  }

  pub fn fields(&self) -> &[FieldSpec] {
    &self.fields
  }

  pub fn field(&self, name: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.name() == name)
  }

  /// Fields a widget cannot collect (Fallback, FilePath, TabularFrame).
  pub fn unsupported_inputs(&self) -> impl Iterator<Item = &FieldSpec> {
    self.fields.iter().filter(|f| !f.collectable())
  }

  pub fn return_annotation(&self) -> Option<&TypeAnnotation> {
    self.return_annotation.as_ref()
  }

  pub fn return_kind(&self) -> &FieldKind {
    &self.return_kind
  }
}

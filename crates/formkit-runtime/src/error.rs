//! Runtime error types.

use formkit_coerce::BindError;
use serde::Serialize;

/// Errors from the form registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  /// A form with this id is already registered.
  #[error("form already registered: {id}")]
  DuplicateForm { id: String },

  /// No form with this id.
  #[error("form not found: {id}")]
  UnknownForm { id: String },

  /// Nothing to render.
  #[error("no forms registered")]
  Empty,
}

/// A field that failed to bind during one submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name}: {error}")]
pub struct FieldError {
  pub name: String,
  #[source]
  pub error: BindError,
}

/// An error raised by a wrapped function, as caught at the invoker boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct InvocationError {
  pub message: String,
  /// Kind name of the raised error, e.g. `ValueError` or `ParseIntError`.
  pub kind: String,
}

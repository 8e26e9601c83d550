//! Coercion error types.

use thiserror::Error;

/// A raw widget value could not be converted into a typed argument.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
  /// No value was submitted and the parameter has no default.
  #[error("missing value")]
  Missing,

  /// One half of a date-time pair was not submitted.
  #[error("incomplete datetime")]
  IncompleteDateTime,

  /// Free text that should hold JSON did not parse.
  #[error("invalid JSON: {reason}")]
  InvalidJson { reason: String },

  /// JSON parsed, but has the wrong shape.
  #[error("expected {expected}, got {found}")]
  UnexpectedJson {
    expected: &'static str,
    found: &'static str,
  },

  /// A list that should hold only strings holds something else.
  #[error("expected a list of strings, element {index} is {found}")]
  NotText { index: usize, found: &'static str },

  /// Text that should spell a scalar did not parse.
  #[error("expected {expected}, got '{input}'")]
  Parse {
    expected: &'static str,
    input: String,
  },

  /// The widget handed back a value of the wrong type altogether.
  #[error("expected {expected}, got {found}")]
  Mismatch {
    expected: &'static str,
    found: &'static str,
  },

  /// A selection outside the declared literal set.
  #[error("'{value}' is not one of [{allowed}]")]
  OutOfDomain { value: String, allowed: String },
}

/// Errors from the bind step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
  #[error(transparent)]
  Coercion(#[from] CoercionError),

  /// The field kind cannot be collected from a widget at all.
  #[error("unsupported operation: {kind} fields cannot be collected as input")]
  UnsupportedOperation { kind: &'static str },
}
